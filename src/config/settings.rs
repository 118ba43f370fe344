//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::spread::{DEFAULT_BORDER_WIDTH, DEFAULT_QUALITY, MAX_BORDER_WIDTH};

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// PDFium library settings.
    #[serde(default)]
    pub pdfium: PdfiumConfig,

    /// Tool parameter defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Checks values that parse but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.defaults.quality) {
            return Err(ConfigError::InvalidField {
                field: "defaults.quality",
                message: format!("must be between 1 and 100, got {}", self.defaults.quality),
            });
        }
        if self.defaults.border_width > MAX_BORDER_WIDTH {
            return Err(ConfigError::InvalidField {
                field: "defaults.border_width",
                message: format!(
                    "must be at most {MAX_BORDER_WIDTH}, got {}",
                    self.defaults.border_width
                ),
            });
        }
        if self
            .pdfium
            .library_path
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            return Err(ConfigError::InvalidField {
                field: "pdfium.library_path",
                message: "must not be empty; omit it to use the system library".to_string(),
            });
        }
        Ok(())
    }
}

/// PDFium configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PdfiumConfig {
    /// Directory containing the PDFium shared library.
    /// Default: search the system library path.
    #[serde(default)]
    pub library_path: Option<PathBuf>,
}

/// Defaults applied when a tool call omits an optional parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultsConfig {
    /// Spread border width in pixels.
    #[serde(default = "default_border_width")]
    pub border_width: u32,

    /// Rendering quality (1-100).
    #[serde(default = "default_quality")]
    pub quality: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            border_width: default_border_width(),
            quality: default_quality(),
        }
    }
}

const fn default_border_width() -> u32 {
    DEFAULT_BORDER_WIDTH
}

const fn default_quality() -> u32 {
    DEFAULT_QUALITY
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let json = r"{}";
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.defaults, DefaultsConfig::default());
        assert!(config.pdfium.library_path.is_none());
    }

    #[test]
    fn parse_full_config() {
        let json = r#"{
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "_comment": "Test config",
            "pdfium": {
                "library_path": "/opt/pdfium/lib"
            },
            "defaults": {
                "border_width": 4,
                "quality": 75
            },
            "logging": {
                "level": "debug"
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.pdfium.library_path,
            Some(PathBuf::from("/opt/pdfium/lib"))
        );
        assert_eq!(config.defaults.border_width, 4);
        assert_eq!(config.defaults.quality, 75);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn defaults_config_defaults() {
        let config = DefaultsConfig::default();
        assert_eq!(config.border_width, 2);
        assert_eq!(config.quality, 50);
    }

    #[test]
    fn logging_config_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "warn");
    }

    #[test]
    fn reject_invalid_quality() {
        let json = r#"{
            "defaults": {
                "quality": 0
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidField {
                field: "defaults.quality",
                ..
            })
        ));
    }

    #[test]
    fn reject_oversized_border() {
        let json = r#"{"defaults": {"border_width": 100000}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidField {
                field: "defaults.border_width",
                ..
            })
        ));
    }

    #[test]
    fn reject_empty_library_path() {
        let json = r#"{"pdfium": {"library_path": ""}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn reject_unknown_fields() {
        let json = r#"{
            "unknown_field": "value"
        }"#;

        let result: Result<Config, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
