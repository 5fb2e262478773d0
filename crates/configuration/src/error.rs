//! Errors that can occur while reading, writing or interpreting configuration.

use std::path::PathBuf;

use query_engine_translation::translation;
use thiserror::Error;

/// The errors that can be thrown when parsing a configuration directory.
#[derive(Debug, Error)]
pub enum ParseConfigurationError {
    #[error("parse error on {file_path}:{line}:{column}: {message}")]
    ParseError {
        file_path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("I/O error: {0}")]
    IoErrorButStringified(String),
}

/// The errors that can be thrown when writing a configuration directory.
#[derive(Debug, Error)]
pub enum WriteParsedConfigurationError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// The errors that can be thrown when turning a parsed configuration into a runtime one.
#[derive(Debug, Error)]
pub enum MakeRuntimeConfigurationError {
    #[error("unsupported configuration version {version}, expected {expected}")]
    UnsupportedVersion { version: u32, expected: u32 },

    #[error("invalid fetchXml: {0}")]
    InvalidFetchTemplate(#[from] translation::error::Error),
}
