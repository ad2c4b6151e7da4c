//! Error types for YAML parsing.

use thiserror::Error;

/// Result type alias for gencfg-yaml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading a YAML document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// YAML syntax error
    #[error("YAML parse error at line {line}, column {col}: {message}")]
    Parse {
        message: String,
        /// 1-based line of the offending character
        line: usize,
        /// 1-based column of the offending character
        col: usize,
    },

    /// Input bytes are not UTF-8
    #[error("YAML input is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
}

impl From<yaml_rust2::ScanError> for Error {
    fn from(err: yaml_rust2::ScanError) -> Self {
        let marker = err.marker();
        Error::Parse {
            message: err.info().to_string(),
            line: marker.line(),
            col: marker.col() + 1,
        }
    }
}
