//! # ridebook-core: Pure Pricing Logic for Ridebook
//!
//! This crate is the **heart** of Ridebook. It owns the quote/voucher state
//! machine and the VAT arithmetic, with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Ridebook Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Presentation (apps/cli)                      │   │
//! │  │    quote ──► voucher ──► book ──► flip back                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ commands                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ ridebook-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  session  │  │ validation│  │   │
//! │  │   │   Quote   │  │   Money   │  │  Pricing  │  │   form    │  │   │
//! │  │   │  Voucher  │  │  round2   │  │  Session  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                ▲                                        │
//! │  ┌─────────────────────────────┴───────────────────────────────────┐   │
//! │  │                ridebook-client (HTTP collaborators)             │   │
//! │  │       /calculate-budget, /validate-voucher, /submit-booking     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Quote, VoucherApplication, DerivedTotals, etc.)
//! - [`money`] - Decimal Money and the `round2` rule
//! - [`session`] - The PricingSession state machine
//! - [`error`] - Domain error types
//! - [`validation`] - Booking form validation
//!
//! ## Example Usage
//!
//! ```rust
//! use ridebook_core::{Money, PricingSession, Quote, QuotePricing, TripRequest, VatRate};
//! use rust_decimal::Decimal;
//!
//! let mut session = PricingSession::new();
//! session.apply_quote(Quote::new(
//!     TripRequest {
//!         pickup: "Lisbon Airport".into(),
//!         dropoff: "Sintra".into(),
//!         passengers: 2,
//!         bags: 1,
//!     },
//!     QuotePricing {
//!         original_pre_vat: Money::new(Decimal::from(50)),
//!         vat_rate: Some(VatRate::from_percent(Decimal::from(6))),
//!         duration_minutes: 40,
//!         currency: "EUR".into(),
//!     },
//! ));
//!
//! let totals = session.current_totals().unwrap();
//! assert_eq!(totals.total_with_vat.unwrap().to_string(), "53.00 €");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod session;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{format_amount, round2, Money};
pub use session::{PricingSession, SessionTicket};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Dialling code preselected in the booking form.
pub const DEFAULT_COUNTRY_CODE: &str = "+351";

/// How far in the past a booking instant may lie and still be accepted.
///
/// Covers the time a user spends filling in the form for "right now".
pub const BOOKING_GRACE_MINUTES: i64 = 5;

/// Maximum passengers in a single booking.
pub const MAX_PASSENGERS: u32 = 50;

/// Maximum bags in a single booking.
pub const MAX_BAGS: u32 = 99;

/// Address queries shorter than this never reach the geocoder.
pub const MIN_GEOCODE_QUERY_CHARS: usize = 3;
