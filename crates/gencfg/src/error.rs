/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for template expansion and sanitizing.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for template expansion.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while expanding a template document.
#[derive(Debug, Error)]
pub enum Error {
    /// The template itself is not valid YAML
    #[error("failed to parse template")]
    Parse(#[from] gencfg_yaml::Error),

    /// A field expanded to text that is not valid YAML
    #[error("expanded value of field '{field}' is not valid YAML")]
    Fragment {
        field: String,
        #[source]
        source: gencfg_yaml::Error,
    },

    /// A field failed to compile or render
    #[error("failed to expand field '{field}'")]
    Expression {
        field: String,
        #[source]
        source: minijinja::Error,
    },

    /// A host fact could not be determined
    #[error("failed to determine {fact}")]
    Environment {
        fact: &'static str,
        #[source]
        source: io::Error,
    },

    /// Every attempt to reserve a fresh port hit one already handed out
    #[error("no unused local port found after {attempts} attempts")]
    PortExhausted { attempts: u32 },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("failed to determine the current directory")]
    CurrentDir(#[source] io::Error),
}

/// Errors raised while sanitizing a record.
#[derive(Debug, Error)]
pub enum SanitizeError {
    #[error("unknown sanitize tag: {0}")]
    UnknownTag(String),

    #[error("sanitize tag '{tag}' on '{field}' only works on strings")]
    TypeMismatch { tag: String, field: String },

    #[error("sanitize tag 'test_call' on '{field}' needs a function name")]
    MissingTestCall { field: String },

    #[error("no test function registered as '{name}'")]
    UnknownTestCall { name: String },

    #[error("test function '{name}' failed on '{field}': {message}")]
    TestCall {
        name: String,
        field: String,
        message: String,
    },

    #[error("failed to create directory {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to make '{path}' absolute")]
    AbsPath {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("index {index}")]
    Index {
        index: usize,
        #[source]
        source: Box<SanitizeError>,
    },

    #[error("key {key}")]
    Key {
        key: String,
        #[source]
        source: Box<SanitizeError>,
    },
}

impl SanitizeError {
    /// The innermost error, with index and key wrappers removed.
    pub fn root_cause(&self) -> &SanitizeError {
        match self {
            SanitizeError::Index { source, .. } | SanitizeError::Key { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }
}
