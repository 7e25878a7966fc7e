//! Logging bootstrap errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while bringing up process-wide logging.
///
/// All of them are fatal: the process must not dispatch a command with
/// unconfigured logging.
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("logging config not found: {0}")]
    NotFound(PathBuf),

    #[error("read logging config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse logging config {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("unknown logging level: {0}")]
    UnknownLevel(String),

    #[error("handler '{0}' referenced by root logger is not defined")]
    UnknownHandler(String),

    #[error("handler '{handler}' uses undefined formatter '{formatter}'")]
    UnknownFormatter { handler: String, formatter: String },

    #[error("file handler '{0}' has no path")]
    MissingPath(String),

    #[error("open log file {path}: {message}")]
    OpenFile { path: PathBuf, message: String },

    #[error("logging already initialized")]
    AlreadyInitialized,
}

pub type LoggingResult<T> = Result<T, LoggingError>;
