//! Configuration errors.
//!
//! Rendering and analysis failures are [`crate::pdf::PdfError`]; this module
//! only covers problems that stop the server from starting.

use std::path::PathBuf;

use thiserror::Error;

/// A configuration file that could not be loaded.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested file does not exist.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Requested path.
        path: PathBuf,
    },

    /// The file exists but could not be read.
    #[error("cannot read configuration file {path}: {source}")]
    Read {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON or has unknown keys.
    #[error("invalid configuration file {path}: {source}")]
    Parse {
        /// Path to the file.
        path: PathBuf,
        /// Underlying JSON error, including line and column.
        #[source]
        source: serde_json::Error,
    },

    /// A field parsed but holds an unusable value.
    #[error("invalid configuration value for '{field}': {message}")]
    InvalidField {
        /// Dotted field path, e.g. `defaults.quality`.
        field: &'static str,
        /// What is wrong with the value.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_path() {
        let error = ConfigError::NotFound {
            path: PathBuf::from("/path/to/config.json"),
        };
        assert_eq!(
            error.to_string(),
            "configuration file not found: /path/to/config.json"
        );
    }

    #[test]
    fn parse_error_includes_location() {
        let source = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let error = ConfigError::Parse {
            path: PathBuf::from("c.json"),
            source,
        };
        let msg = error.to_string();
        assert!(msg.starts_with("invalid configuration file c.json: "));
        assert!(msg.contains("line 1"));
    }

    #[test]
    fn invalid_field_names_field() {
        let error = ConfigError::InvalidField {
            field: "defaults.quality",
            message: "must be between 1 and 100, got 0".to_string(),
        };
        assert!(error.to_string().contains("'defaults.quality'"));
    }
}
