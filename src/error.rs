//! Error types for the notifier

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Template nesting exceeds {limit} levels")]
    TemplateTooDeep { limit: usize },

    #[error("Template lint found {0} issue(s)")]
    Lint(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
