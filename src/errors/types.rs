//! Error type definitions for the playlist reconciler
//!
//! Fatal conditions (missing inputs, unreadable catalogs, write failures) are
//! modelled here. Recoverable anomalies such as malformed playlist lines or
//! failed artwork probes never become errors.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// A required input file or directory does not exist
    #[error("Missing input: {kind} {path}")]
    MissingInput { kind: String, path: PathBuf },

    /// Filesystem errors, annotated with the path being accessed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Channel catalog errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Export serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP client construction errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Channel catalog loading errors
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Unsupported catalog file extension
    #[error("Unsupported catalog format: {path}")]
    UnsupportedFormat { path: PathBuf },

    /// TOML catalog could not be parsed
    #[error("Invalid TOML catalog {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// JSON catalog could not be parsed
    #[error("Invalid JSON catalog {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl AppError {
    /// Create a missing-file precondition error
    pub fn missing_file<P: AsRef<Path>>(path: P) -> Self {
        Self::MissingInput {
            kind: "file".to_string(),
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create a missing-directory precondition error
    pub fn missing_directory<P: AsRef<Path>>(path: P) -> Self {
        Self::MissingInput {
            kind: "directory".to_string(),
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Wrap an I/O error with the path that caused it
    pub fn io<P: AsRef<Path>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a validation error with a custom message
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// True for precondition failures that abort a whole batch
    pub fn is_missing_input(&self) -> bool {
        matches!(self, Self::MissingInput { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_mentions_path() {
        let err = AppError::missing_file("/tmp/template.m3u");
        assert!(err.is_missing_input());
        assert_eq!(err.to_string(), "Missing input: file /tmp/template.m3u");
    }

    #[test]
    fn io_error_is_not_a_precondition() {
        let err = AppError::io(
            "out.m3u",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!err.is_missing_input());
        assert!(err.to_string().contains("out.m3u"));
    }
}
