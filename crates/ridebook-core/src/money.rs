//! # Money Module
//!
//! Provides the `Money` type and the `round2` rule every derived amount
//! goes through.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    1.005 is stored as 1.00499999999999989...                            │
//! │    Math.round(1.005 * 100) / 100 = 1.00  ❌ WRONG!                      │
//! │                                                                         │
//! │  OUR SOLUTION: Base-10 Decimal                                          │
//! │    Decimal 1.005 is exactly 1.005                                       │
//! │    round2(1.005) = 1.01 (nearest cent, ties away from zero)             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use ridebook_core::money::{round2, Money};
//! use rust_decimal::Decimal;
//! use std::str::FromStr;
//!
//! let pre_vat = Money::new(Decimal::from_str("50.00").unwrap());
//! let vat = pre_vat.calculate_vat(Decimal::from(6).into());
//! assert_eq!(vat.to_string(), "3.00 €");
//!
//! assert_eq!(round2(Decimal::from_str("1.005").unwrap()).to_string(), "1.01");
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::VatRate;

/// Display placeholder for amounts that cannot be derived (e.g. no VAT rate).
pub const NOT_AVAILABLE: &str = "N/A";

// =============================================================================
// Rounding
// =============================================================================

/// Rounds to the nearest cent, ties away from zero.
///
/// ## Examples
/// ```text
/// 1.005  → 1.01
/// 2.675  → 2.68
/// -1.005 → -1.01
/// 3.004  → 3.00
/// ```
///
/// Operates on the exact decimal value, so there is no binary-float
/// misrounding and no scientific-notation edge case.
#[inline]
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

// =============================================================================
// Money Type
// =============================================================================

/// A euro amount.
///
/// ## Design Decisions
/// - **Decimal (not f64)**: exact cents, the server's amounts survive a round trip
/// - **Not rounded on construction**: server-supplied amounts are kept as sent
/// - **Derivations round**: `calculate_vat` and `add_rounded` go through [`round2`]
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Quote.original_pre_vat ──┬──► DerivedTotals.pre_vat                    │
/// │                           │                                             │
/// │  Voucher.final_pre_vat ───┘        │                                    │
/// │                                    ▼                                    │
/// │                     calculate_vat(rate) ──► vat_amount                  │
/// │                                    │                                    │
/// │                                    ▼                                    │
/// │                     pre_vat + vat ──► total_with_vat                    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Wraps a decimal amount as-is.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Returns the underlying decimal amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Calculates VAT on this amount: `round2(amount * percent / 100)`.
    ///
    /// ## Example
    /// ```rust
    /// use ridebook_core::money::Money;
    /// use ridebook_core::types::VatRate;
    /// use rust_decimal::Decimal;
    ///
    /// let pre_vat = Money::new(Decimal::new(4000, 2));  // 40.00
    /// let vat = pre_vat.calculate_vat(VatRate::from_percent(Decimal::from(6)));
    /// assert_eq!(vat.amount(), Decimal::new(240, 2));   // 2.40
    /// ```
    ///
    /// ## User Workflow
    /// ```text
    /// Voucher rejected, quote pre-VAT: 50.00 €
    ///      │
    ///      ▼
    /// calculate_vat(6%) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// VAT: 3.00 € ──► Total: 53.00 €
    /// ```
    pub fn calculate_vat(&self, rate: VatRate) -> Money {
        Money(round2(self.0 * rate.percent() / Decimal::ONE_HUNDRED))
    }

    /// Adds an amount and rounds the result to cents.
    #[inline]
    pub fn add_rounded(&self, other: Money) -> Money {
        Money(round2(self.0 + other.0))
    }
}

/// Formats an optional amount the way the booking card shows it:
/// two decimals, or `N/A` when the amount could not be derived.
pub fn format_amount(amount: Option<Money>) -> String {
    match amount {
        Some(money) => format!("{:.2}", round2(money.0)),
        None => NOT_AVAILABLE.to_string(),
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount rounded to cents with a euro suffix.
///
/// ## Note
/// This is for logs and the plain-text front end.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} €", round2(self.0))
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
