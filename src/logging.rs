//! Log file setup
//!
//! The terminal belongs to the UI while a session runs, so tracing output
//! goes to `whosthat.log` in the platform data directory instead.

use directories::ProjectDirs;
use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("could not determine data directory")]
    NoDataDirectory,
    #[error("could not open log file: {0}")]
    Io(#[from] io::Error),
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
}

/// Directory holding the log file
pub fn data_dir() -> Result<PathBuf, LoggingError> {
    ProjectDirs::from("", "", "whosthat")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or(LoggingError::NoDataDirectory)
}

/// Install the global subscriber. Returns the log file path.
pub fn init(filter: &str) -> Result<PathBuf, LoggingError> {
    let dir = data_dir()?;
    fs::create_dir_all(&dir)?;
    let path = dir.join("whosthat.log");
    let file = File::create(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter)?)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(path)
}
