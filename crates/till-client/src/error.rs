//! # Client Error Types
//!
//! Failures that happen before a cashier action can even be attempted:
//! bad configuration, an unusable base URL, an HTTP client that cannot be
//! built. Per-request outcomes are `LookupError` / `CheckoutError` from
//! till-core and never surface here.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Client Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Endpoint      │  │     HTTP client         │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  InvalidUrl     │  │  HttpClient             │ │
//! │  │  ConfigLoad     │  │                 │  │                         │ │
//! │  │  ConfigSave     │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use till_core::ValidationError;

/// Result type alias for client setup operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// A configuration value is out of range or malformed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to write the config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Endpoint Errors
    // =========================================================================
    /// The backend base URL cannot be used.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    // =========================================================================
    // HTTP Client Errors
    // =========================================================================
    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::HttpClient(err.to_string())
    }
}

impl From<ValidationError> for ClientError {
    fn from(err: ValidationError) -> Self {
        ClientError::InvalidConfig(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// Returns true if fixing the config file or environment would resolve it.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidConfig(_)
                | ClientError::ConfigLoadFailed(_)
                | ClientError::ConfigSaveFailed(_)
                | ClientError::InvalidUrl(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_categories() {
        assert!(ClientError::InvalidConfig("timeout_secs".into()).is_config_error());
        assert!(ClientError::InvalidUrl("ftp://x".into()).is_config_error());
        assert!(!ClientError::HttpClient("tls".into()).is_config_error());
    }

    #[test]
    fn test_conversions() {
        let err: ClientError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, ClientError::InvalidUrl(_)));

        let err: ClientError = toml::from_str::<toml::Value>("= broken").unwrap_err().into();
        assert!(matches!(err, ClientError::ConfigLoadFailed(_)));

        let err: ClientError = ValidationError::Required {
            field: "operator code".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Invalid configuration: operator code is required"
        );
    }
}
