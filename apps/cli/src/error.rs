//! # API Error Type
//!
//! Unified error type for CLI commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Ridebook                               │
//! │                                                                         │
//! │  Command Function: Result<T, ApiError>                                 │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ValidationError ───────────────────────► VALIDATION_ERROR             │
//! │  CoreError::NoActiveQuote ──────────────► NO_QUOTE                     │
//! │  CoreError::StaleResponse ──────────────► STALE_RESPONSE               │
//! │  ClientError::Service / Decode ─────────► SERVICE_ERROR                │
//! │  ClientError::Communication ────────────► COMMUNICATION_ERROR          │
//! │  second trigger while in flight ────────► BUSY                         │
//! │  config / I/O / anything else ──────────► INTERNAL                     │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  REPL prints "error: <message>" and keeps going                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Serializable with a machine-readable `code` and a human-readable
//! `message`, so a web binding can reuse it as-is.

use ridebook_client::ClientError;
use ridebook_core::{CoreError, ValidationError};
use serde::Serialize;

use crate::state::Action;

/// API error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "SERVICE_ERROR",
///   "message": "The requested slot is no longer available"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Form input rejected before any request
    ValidationError,

    /// Backend answered with an error
    ServiceError,

    /// Backend could not be reached
    CommunicationError,

    /// Operation needs a quote and there is none
    NoQuote,

    /// Response belonged to a session that has since moved on
    StaleResponse,

    /// Same action already in flight
    Busy,

    /// Anything else
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a busy error for an action that is already running.
    pub fn busy(action: Action) -> Self {
        ApiError::new(
            ErrorCode::Busy,
            format!("{} request already in progress", action),
        )
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts validation errors to API errors.
impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NoActiveQuote => ApiError::new(ErrorCode::NoQuote, err.to_string()),
            CoreError::StaleResponse { issued, current } => {
                tracing::debug!(issued, current, "Stale response discarded");
                ApiError::new(
                    ErrorCode::StaleResponse,
                    "The booking form changed while the request was running; result discarded",
                )
            }
            CoreError::Validation(e) => ApiError::from(e),
        }
    }
}

/// Converts client errors to API errors.
impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Service { message, .. } => ApiError::new(ErrorCode::ServiceError, message),
            ClientError::Decode(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Malformed service response: {}", e);
                ApiError::new(
                    ErrorCode::ServiceError,
                    "The service returned an unexpected response",
                )
            }
            ClientError::Communication(e) => {
                tracing::error!("Communication failure: {}", e);
                ApiError::new(
                    ErrorCode::CommunicationError,
                    "Could not reach the booking service. Check your connection and try again.",
                )
            }
            ClientError::InvalidConfig(e) | ClientError::Io(e) => {
                tracing::error!("Client configuration error: {}", e);
                ApiError::internal(e)
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_serialization() {
        let err = ApiError::new(ErrorCode::NoQuote, "No active quote");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "NO_QUOTE");
        assert_eq!(json["message"], "No active quote");

        let json = serde_json::to_value(ErrorCode::CommunicationError).unwrap();
        assert_eq!(json, "COMMUNICATION_ERROR");
    }

    #[test]
    fn test_client_error_mapping() {
        let err = ApiError::from(ClientError::Service {
            status: 409,
            message: "Slot unavailable".into(),
        });
        assert_eq!(err.code, ErrorCode::ServiceError);
        assert_eq!(err.message, "Slot unavailable");

        let err = ApiError::from(ClientError::Communication("refused".into()));
        assert_eq!(err.code, ErrorCode::CommunicationError);

        let err = ApiError::from(ClientError::Decode("eof".into()));
        assert_eq!(err.code, ErrorCode::ServiceError);
    }

    #[test]
    fn test_core_error_mapping() {
        assert_eq!(ApiError::from(CoreError::NoActiveQuote).code, ErrorCode::NoQuote);
        assert_eq!(
            ApiError::from(CoreError::StaleResponse { issued: 1, current: 2 }).code,
            ErrorCode::StaleResponse
        );
        let err = ApiError::from(CoreError::Validation(ValidationError::Required {
            field: "phone".into(),
        }));
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "phone is required");
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ApiError::busy(Action::Voucher).to_string(),
            "[Busy] Voucher request already in progress"
        );
    }
}
