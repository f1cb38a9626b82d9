//! # Domain Types
//!
//! Core domain types used throughout Ridebook.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────────┐   ┌─────────────────┐   │
//! │  │  TripRequest    │   │       Quote         │   │ VoucherOutcome  │   │
//! │  │  ─────────────  │──►│  ─────────────────  │   │ ─────────────── │   │
//! │  │  pickup         │   │  original_pre_vat   │   │ Accepted(..)    │   │
//! │  │  dropoff        │   │  vat_rate (opt)     │   │ Rejected{reason}│   │
//! │  │  passengers     │   │  duration_minutes   │   └────────┬────────┘   │
//! │  │  bags           │   └──────────┬──────────┘            │            │
//! │  └─────────────────┘              │                       ▼            │
//! │                                   │          ┌─────────────────────┐   │
//! │                                   │          │ VoucherApplication  │   │
//! │                                   │          │ (0..1 per Quote)    │   │
//! │                                   ▼          └──────────┬──────────┘   │
//! │                          ┌─────────────────┐            │              │
//! │                          │  DerivedTotals  │◄───────────┘              │
//! │                          │  (never stored) │                           │
//! │                          └─────────────────┘                           │
//! │                                                                         │
//! │  BookingDraft + PassengerDetails ──► BookingRequest ──► Confirmation   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

/// Currency the pricing service quotes in when it does not say otherwise.
pub const DEFAULT_CURRENCY: &str = "EUR";

// =============================================================================
// VAT Rate
// =============================================================================

/// VAT rate as a percentage (`6` = 6%, `23` = 23%).
///
/// Kept as a decimal percentage because that is what the pricing service
/// sends; no basis-point conversion happens on the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VatRate(Decimal);

impl VatRate {
    /// Creates a VAT rate from a percentage.
    #[inline]
    pub const fn from_percent(percent: Decimal) -> Self {
        VatRate(percent)
    }

    /// Returns the rate as a percentage.
    #[inline]
    pub const fn percent(&self) -> Decimal {
        self.0
    }
}

impl From<Decimal> for VatRate {
    fn from(percent: Decimal) -> Self {
        VatRate(percent)
    }
}

// =============================================================================
// Trip Request
// =============================================================================

/// What the user typed on the budget form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TripRequest {
    pub pickup: String,
    pub dropoff: String,
    pub passengers: u32,
    pub bags: u32,
}

// =============================================================================
// Quote
// =============================================================================

/// Pricing returned by the quote service for a [`TripRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotePricing {
    pub original_pre_vat: Money,
    /// Absent in degraded responses; totals then render as `N/A`.
    pub vat_rate: Option<VatRate>,
    pub duration_minutes: u32,
    pub currency: String,
}

/// A priced, pre-VAT trip estimate.
///
/// Immutable once created. A new price request replaces it wholesale; a
/// reset clears it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub pickup: String,
    pub dropoff: String,
    pub passengers: u32,
    pub bags: u32,
    pub duration_minutes: u32,
    #[ts(as = "String")]
    pub original_pre_vat: Money,
    #[ts(as = "Option<String>")]
    pub vat_rate: Option<VatRate>,
    pub currency: String,
}

impl Quote {
    /// Builds a quote from the request that produced it and the service's pricing.
    pub fn new(trip: TripRequest, pricing: QuotePricing) -> Self {
        Quote {
            pickup: trip.pickup,
            dropoff: trip.dropoff,
            passengers: trip.passengers,
            bags: trip.bags,
            duration_minutes: pricing.duration_minutes,
            original_pre_vat: pricing.original_pre_vat,
            vat_rate: pricing.vat_rate,
            currency: pricing.currency,
        }
    }
}

// =============================================================================
// Voucher
// =============================================================================

/// Server figures that accompany an accepted voucher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoucherAcceptance {
    pub code: String,
    pub discount_amount: Money,
    pub final_pre_vat: Money,
    pub vat_rate: VatRate,
    pub vat_amount: Money,
    pub total_with_vat: Money,
    /// Human-readable description, e.g. "10% discount applied".
    pub description: Option<String>,
}

/// What the voucher service said about a code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoucherOutcome {
    /// `valid: true` with authoritative figures.
    Accepted(VoucherAcceptance),
    /// `valid: false` or a 4xx with an error message.
    Rejected { reason: Option<String> },
}

/// A voucher successfully applied against the current quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VoucherApplication {
    pub code: String,
    #[ts(as = "String")]
    pub discount_amount: Money,
    #[ts(as = "String")]
    pub final_pre_vat: Money,
    #[ts(as = "String")]
    pub vat_rate: VatRate,
    #[ts(as = "String")]
    pub vat_amount: Money,
    #[ts(as = "String")]
    pub total_with_vat: Money,
    pub description: Option<String>,
}

impl From<VoucherAcceptance> for VoucherApplication {
    fn from(accepted: VoucherAcceptance) -> Self {
        VoucherApplication {
            code: accepted.code,
            discount_amount: accepted.discount_amount,
            final_pre_vat: accepted.final_pre_vat,
            vat_rate: accepted.vat_rate,
            vat_amount: accepted.vat_amount,
            total_with_vat: accepted.total_with_vat,
            description: accepted.description,
        }
    }
}

// =============================================================================
// Derived Totals
// =============================================================================

/// Display totals for the budget card. Computed on demand, never stored.
///
/// ## Budget Card
/// ```text
/// ┌─────────────────────────────────────────────┐
/// │  Base price (excl. VAT):       50.00 €      │  original_pre_vat
/// │  Discount (SUMMER10):         -10.00 €      │  discount_amount
/// │  Subtotal (excl. VAT):         40.00 €      │  pre_vat
/// │  VAT (6.0%):                  + 2.40 €      │  vat_amount
/// │  ─────────────────────────────────────      │
/// │  Total:                        42.40 €      │  total_with_vat
/// │  Estimated duration: 35 minutes             │  duration_minutes
/// └─────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DerivedTotals {
    #[ts(as = "String")]
    pub original_pre_vat: Money,
    #[ts(as = "String")]
    pub discount_amount: Money,
    #[ts(as = "String")]
    pub pre_vat: Money,
    #[ts(as = "Option<String>")]
    pub vat_rate: Option<VatRate>,
    #[ts(as = "Option<String>")]
    pub vat_amount: Option<Money>,
    #[ts(as = "Option<String>")]
    pub total_with_vat: Option<Money>,
    pub duration_minutes: u32,
    pub voucher_code: Option<String>,
    pub currency: String,
}

// =============================================================================
// Session Phase
// =============================================================================

/// Where the pricing session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No quote yet (or reset).
    #[default]
    Empty,
    /// A quote is live, no voucher.
    Quoted,
    /// A quote is live with an accepted voucher.
    Discounted,
}

// =============================================================================
// Booking
// =============================================================================

/// The trip half of a booking, taken from the live quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    pub pickup: String,
    pub dropoff: String,
    pub passengers: u32,
    pub bags: u32,
    pub duration_minutes: u32,
    pub voucher_code: Option<String>,
}

/// Validated passenger half of a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PassengerDetails {
    pub name: String,
    /// Country code + digits, whitespace stripped (e.g. `+351912345678`).
    pub phone: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    #[ts(as = "String")]
    pub time: NaiveTime,
    pub instructions: Option<String>,
}

/// Everything the booking service needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub passenger: PassengerDetails,
    pub trip: BookingDraft,
}

/// The booking service's answer to a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    pub booking_id: String,
    #[ts(as = "Option<String>")]
    pub total_with_vat: Option<Money>,
    pub message: Option<String>,
    pub status: Option<String>,
    pub applied_voucher: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================
