mod config;
mod loader;
mod model;
mod normalizer;
mod storage;

use config::{PipelineConfig, USAGE};
use loader::{load, CsvSource};
use model::PipelineError;
use normalizer::normalize;
use std::env;
use std::error::Error;
use std::ffi::OsString;
use std::process::ExitCode;
use storage::persist;
use tracing::{error, Level};

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Usage,
    Saved,
}

fn main() -> ExitCode {
    // Logs go to stderr; stdout carries only the progress lines.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(Level::INFO)
        .init();

    match dispatch(env::args_os()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Pipeline failed: {}", e);
            let mut cause = e.source();
            while let Some(inner) = cause {
                error!("  caused by: {}", inner);
                cause = inner.source();
            }
            ExitCode::FAILURE
        }
    }
}

/// A wrong argument list prints the usage text and is not a failure.
fn dispatch<I, T>(args: I) -> Result<Outcome, PipelineError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let Some(config) = PipelineConfig::from_args(args) else {
        println!("{}", USAGE);
        return Ok(Outcome::Usage);
    };
    run(&config)?;
    Ok(Outcome::Saved)
}

/// Load, normalize and persist, printing a status line before each step.
fn run(config: &PipelineConfig) -> Result<(), PipelineError> {
    println!(
        "Loading data...\n    MESSAGES: {}\n    CATEGORIES: {}",
        config.messages_path.display(),
        config.categories_path.display()
    );
    let messages = CsvSource::new(&config.messages_path);
    let categories = CsvSource::new(&config.categories_path);
    let table = load(&messages, &categories, &config.join_key)?;

    println!("Cleaning data...");
    let table = normalize(table, &config.categories_column)?;

    println!("Saving data...\n    DATABASE: {}", config.database_path.display());
    persist(&table, &config.database_path, &config.table_name)?;

    println!("Cleaned data saved to database!");
    Ok(())
}
