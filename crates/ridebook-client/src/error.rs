//! # Client Error Types
//!
//! Error types for every network collaborator.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Client Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Service             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Communication  │  │  Service{status, msg}   │ │
//! │  │  Io             │  │  (timeout, DNS, │  │  Decode (bad body)      │ │
//! │  │                 │  │   refused)      │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Message shown when a service fails without saying why.
pub const GENERIC_SERVICE_MESSAGE: &str = "The service could not process the request";

/// Client error type covering all collaborator failures.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Service Errors
    // =========================================================================
    /// The service answered with a non-success status.
    ///
    /// `message` is the server's `error` field, or a generic fallback.
    #[error("Service error ({status}): {message}")]
    Service { status: u16, message: String },

    /// The service answered 2xx with a body we could not understand.
    #[error("Malformed response: {0}")]
    Decode(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The request never produced a response (network, timeout, TLS).
    #[error("Could not reach the service: {0}")]
    Communication(String),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to read the config file.
    #[error("I/O error: {0}")]
    Io(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ClientError::Service {
                status: status.as_u16(),
                message: GENERIC_SERVICE_MESSAGE.to_string(),
            }
        } else {
            ClientError::Communication(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidConfig(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::InvalidConfig(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// HTTP status, when the service answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Service { status, .. } => Some(*status),
            _ => None,
        }
    }
}
