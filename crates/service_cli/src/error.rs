//! CLI error types

use std::path::PathBuf;

use marketdata_engine::EngineError;
use thiserror::Error;

/// Errors raised by CLI commands
#[derive(Debug, Error)]
pub enum CliError {
    /// A file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// The file
        path: PathBuf,
        /// The cause
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for the expected layout
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration was parsed but is inconsistent
    #[error("Invalid configuration: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// A CSV data file could not be read
    #[error("Failed to read {path}: {source}")]
    Csv {
        /// The file
        path: PathBuf,
        /// The cause
        #[source]
        source: csv::Error,
    },

    /// An argument or environment override is invalid
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The engine could not run the build
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Output could not be serialised
    #[error("Failed to write output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Result type for CLI commands
pub type Result<T> = std::result::Result<T, CliError>;
