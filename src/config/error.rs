//! Errors raised while loading or validating settings.

use thiserror::Error;

/// Failure loading, parsing, or validating the layered configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required configuration file is missing (only `default.toml` is
    /// required; the environment and local layers are optional)
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// The merged configuration did not deserialize into `Settings`
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// A settings value failed validation after loading
    #[error("Invalid configuration: {field} {message}")]
    ValidationError {
        field: String,
        message: String,
    },

    /// An environment value could not be interpreted
    #[error("Environment variable error: {0}")]
    EnvVarError(String),

    /// Error surfaced by the underlying config builder
    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

impl ConfigError {
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        ConfigError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn file_not_found<S: Into<String>>(path: S) -> Self {
        ConfigError::FileNotFound(path.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_names_the_offending_field() {
        let error = ConfigError::validation("broker.host", "must not be empty");
        assert_eq!(
            error.to_string(),
            "Invalid configuration: broker.host must not be empty"
        );
    }

    #[test]
    fn file_not_found_reports_the_path() {
        let error = ConfigError::file_not_found("config/default.toml");
        assert!(error.to_string().contains("config/default.toml"));
    }
}
