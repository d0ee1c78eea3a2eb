//! Error types for promptgate
//!
//! Centralized error handling using thiserror. Each collaborator seam has
//! its own error enum; this is the crate-level umbrella.

use thiserror::Error;

use crate::client::ClientError;
use crate::compiler::CompileError;
use crate::lookup::LookupError;
use crate::telemetry::TelemetryError;

/// All error types that can occur in promptgate
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Prompt catalog could not be loaded
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Template compilation failed
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Telemetry dispatch failed
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    /// Span lookup failed
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// Prompt hub client failed
    #[error(transparent)]
    Client(#[from] ClientError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for promptgate operations
pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = GatewayError::Config("bind address is empty".to_string());
        assert_eq!(err.to_string(), "Configuration error: bind address is empty");
    }

    #[test]
    fn test_catalog_error() {
        let err = GatewayError::Catalog("duplicate prompt id".to_string());
        assert_eq!(err.to_string(), "Catalog error: duplicate prompt id");
    }

    #[test]
    fn test_compile_error_is_transparent() {
        let err: GatewayError = CompileError::InvalidApiKey.into();
        assert_eq!(err.to_string(), "Invalid API key");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: GatewayError = io_err.into();
        assert!(matches!(err, GatewayError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: GatewayError = json_err.into();
        assert!(matches!(err, GatewayError::Json(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_err = serde_yaml::from_str::<Vec<String>>("{ not: [a list").unwrap_err();
        let err: GatewayError = yaml_err.into();
        assert!(matches!(err, GatewayError::Yaml(_)));
    }
}
