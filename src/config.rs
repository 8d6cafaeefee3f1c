use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Destination table, replaced on every run.
pub const TABLE_NAME: &str = "data";
pub const JOIN_KEY: &str = "id";
/// Packed `name-digit;...` label column of the categories input.
pub const CATEGORIES_COLUMN: &str = "categories";

pub const USAGE: &str = "Please provide the filepaths of the messages and categories \
datasets as the first and second argument respectively, as \
well as the filepath of the database to save the cleaned data \
to as the third argument. \n\nExample: message-etl \
disaster_messages.csv disaster_categories.csv \
DisasterResponse.db";

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(
    name = "message-etl",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct PipelineConfig {
    /// Messages CSV with an `id` column.
    pub messages_path: PathBuf,
    /// Categories CSV with `id` and packed `categories` columns.
    pub categories_path: PathBuf,
    /// SQLite file the cleaned table is written to.
    pub database_path: PathBuf,
    #[arg(skip = TABLE_NAME.to_string())]
    pub table_name: String,
    #[arg(skip = JOIN_KEY.to_string())]
    pub join_key: String,
    #[arg(skip = CATEGORIES_COLUMN.to_string())]
    pub categories_column: String,
}

impl PipelineConfig {
    /// Parses the full argument list, program name first.
    /// Returns `None` unless exactly three paths follow it.
    pub fn from_args<I, T>(args: I) -> Option<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Self::try_parse_from(args) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::debug!("Argument parsing failed: {}", e.kind());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_three_paths_are_accepted() {
        let config =
            PipelineConfig::from_args(["message-etl", "m.csv", "c.csv", "out.db"]).unwrap();
        assert_eq!(config.messages_path, PathBuf::from("m.csv"));
        assert_eq!(config.categories_path, PathBuf::from("c.csv"));
        assert_eq!(config.database_path, PathBuf::from("out.db"));
        assert_eq!(config.table_name, "data");
        assert_eq!(config.join_key, "id");
        assert_eq!(config.categories_column, "categories");
    }

    #[test]
    fn other_argument_counts_are_rejected() {
        assert!(PipelineConfig::from_args(["message-etl"]).is_none());
        assert!(PipelineConfig::from_args(["message-etl", "m.csv", "c.csv"]).is_none());
        assert!(
            PipelineConfig::from_args(["message-etl", "m.csv", "c.csv", "out.db", "x"]).is_none()
        );
    }

    #[test]
    fn flags_are_not_accepted() {
        assert!(PipelineConfig::from_args(["message-etl", "--help"]).is_none());
        assert!(PipelineConfig::from_args(["message-etl", "--version"]).is_none());
        assert!(
            PipelineConfig::from_args(["message-etl", "--verbose", "m.csv", "c.csv", "out.db"])
                .is_none()
        );
    }
}
