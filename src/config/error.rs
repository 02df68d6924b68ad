use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;

/// Errors raised while loading or checking the configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("configuration validation failed: {0}")]
    Invalid(String),

    #[error("configuration validation failed: invalid {field}: {source}")]
    Address {
        field: &'static str,
        #[source]
        source: DomainError,
    },

    #[error("failed to resolve {field}: {source}")]
    ResolvePath {
        field: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats_correctly() {
        assert_eq!(
            ConfigError::NotFound(PathBuf::from("config.toml")).to_string(),
            "configuration file not found: config.toml"
        );
        assert_eq!(
            ConfigError::Invalid("mark_cells cannot be empty".to_string()).to_string(),
            "configuration validation failed: mark_cells cannot be empty"
        );
    }

    #[test]
    fn toml_error_conversion() {
        let parse_err = toml::from_str::<toml::Value>("not = [valid").unwrap_err();
        let err = ConfigError::from(parse_err);
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
