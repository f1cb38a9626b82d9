//! # Error Types
//!
//! Domain-specific error types for ridebook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  ridebook-core errors (this file)                                      │
//! │  ├── CoreError        - Session state violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  ridebook-client errors (separate crate)                               │
//! │  └── ClientError      - Service / communication failures               │
//! │                                                                         │
//! │  CLI errors (in app)                                                   │
//! │  └── ApiError         - What the user sees                             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → User                   │
//! │                          ClientError ─┘                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, epoch, etc.)
//! 3. Errors are enum variants, never String
//! 4. No error leaves the session in an unrenderable state

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Pricing session errors.
///
/// None of these are fatal: the session is left exactly as it was before the
/// failing call.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An operation needs a priced quote but the session is empty.
    ///
    /// ## When This Occurs
    /// - Applying a voucher before the budget was calculated
    /// - Submitting a booking after a flip-back reset
    #[error("No active quote: calculate the budget first")]
    NoActiveQuote,

    /// A response arrived for a session generation that no longer exists.
    ///
    /// ## User Workflow
    /// ```text
    /// Apply voucher (epoch 3)
    ///      │
    ///      ├──► user clicks "flip back" → reset() → epoch 4
    ///      │
    ///      ▼
    /// Voucher response (epoch 3) ──► StaleResponse { 3, 4 } ──► discarded
    /// ```
    #[error("Discarded stale response (issued at epoch {issued}, session at epoch {current})")]
    StaleResponse { issued: u64, current: u64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any network call and reported inline next to the form.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., bad date, bad country code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A date/time lies in the past.
    #[error("{field} cannot be in the past")]
    InPast { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
