//! # Pricing Session
//!
//! The authoritative quote/voucher state for one booking form.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Pricing Session Transitions                          │
//! │                                                                         │
//! │               apply_quote                 voucher Accepted              │
//! │   ┌───────┐ ─────────────► ┌────────┐ ─────────────────► ┌──────────┐  │
//! │   │ Empty │                │ Quoted │                    │Discounted│  │
//! │   └───────┘ ◄───────────── └────────┘ ◄───────────────── └──────────┘  │
//! │       ▲         reset          ▲  │    voucher Rejected /      │        │
//! │       │                        │  │    revert_voucher          │        │
//! │       │                        └──┘                            │        │
//! │       │                   apply_quote (replaces,               │        │
//! │       │                   clears voucher)                      │        │
//! │       └────────────────────────────────────────────────────────┘        │
//! │                               reset                                     │
//! │                                                                         │
//! │  Every reset / apply_quote bumps the epoch. Requests carry the epoch   │
//! │  they started at (a SessionTicket); late responses fail                │
//! │  ensure_current() and are discarded.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Totals
//! Totals are derived on every call to [`PricingSession::current_totals`]:
//! - voucher live: the server's own figures for the discounted price
//! - no voucher: `round2(pre_vat * vat% / 100)` and `round2(pre_vat + vat)`
//! - no VAT rate: VAT and total are `None` (rendered "N/A", never "0.00")

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{
    BookingDraft, DerivedTotals, Quote, SessionPhase, VatRate, VoucherApplication,
    VoucherOutcome,
};

// =============================================================================
// Session Ticket
// =============================================================================

/// Snapshot of the session generation taken when a request starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionTicket {
    epoch: u64,
}

impl SessionTicket {
    /// The epoch this ticket was issued at.
    #[inline]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }
}

// =============================================================================
// Pricing Session
// =============================================================================

/// One quote (or none) and at most one voucher applied to it.
///
/// ## Invariants
/// - A voucher never outlives the quote it was applied to
/// - Totals are never stored, so a voucher revert cannot leave stale numbers
/// - Every transition is synchronous and infallible except when it needs a
///   quote that is not there
#[derive(Debug, Clone)]
pub struct PricingSession {
    id: Uuid,
    epoch: u64,
    quote: Option<Quote>,
    voucher: Option<VoucherApplication>,
}

impl PricingSession {
    /// Creates an empty session.
    pub fn new() -> Self {
        PricingSession {
            id: Uuid::new_v4(),
            epoch: 0,
            quote: None,
            voucher: None,
        }
    }

    /// Session identifier, carried in logs.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current generation. Bumped by `reset` and `apply_quote`.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The live quote, if any.
    pub fn quote(&self) -> Option<&Quote> {
        self.quote.as_ref()
    }

    /// The applied voucher, if any.
    pub fn voucher(&self) -> Option<&VoucherApplication> {
        self.voucher.as_ref()
    }

    /// Where the session is in its lifecycle.
    pub fn phase(&self) -> SessionPhase {
        match (&self.quote, &self.voucher) {
            (None, _) => SessionPhase::Empty,
            (Some(_), None) => SessionPhase::Quoted,
            (Some(_), Some(_)) => SessionPhase::Discounted,
        }
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Clears quote and voucher.
    ///
    /// ## When Used
    /// - User flips the budget card back to edit the trip
    /// - After a booking was submitted successfully
    /// - Form reset
    pub fn reset(&mut self) {
        self.quote = None;
        self.voucher = None;
        self.epoch += 1;
        info!(session = %self.id, epoch = self.epoch, "Pricing session reset");
    }

    /// Replaces any existing quote and drops any voucher.
    ///
    /// Only call this with a successful quote-service response; on a service
    /// error the session keeps whatever it had.
    pub fn apply_quote(&mut self, quote: Quote) {
        info!(
            session = %self.id,
            pre_vat = %quote.original_pre_vat,
            vat_rate = ?quote.vat_rate.map(|r| r.percent()),
            duration_minutes = quote.duration_minutes,
            "Quote applied"
        );
        self.quote = Some(quote);
        self.voucher = None;
        self.epoch += 1;
    }

    /// Applies the voucher service's verdict to the current quote.
    ///
    /// ## Behavior
    /// - `Accepted`: stores the server's figures as the applied voucher
    /// - `Rejected`: clears any voucher; totals fall back to the quote
    /// - No quote: `CoreError::NoActiveQuote`, session untouched
    ///
    /// ## Returns
    /// The phase after the transition.
    pub fn apply_voucher_result(&mut self, outcome: VoucherOutcome) -> CoreResult<SessionPhase> {
        let quote = self.quote.as_ref().ok_or(CoreError::NoActiveQuote)?;

        match outcome {
            VoucherOutcome::Accepted(accepted) => {
                if accepted.final_pre_vat > quote.original_pre_vat {
                    warn!(
                        session = %self.id,
                        code = %accepted.code,
                        original = %quote.original_pre_vat,
                        discounted = %accepted.final_pre_vat,
                        "Voucher raised the pre-VAT price; totals will be recomputed locally"
                    );
                }
                info!(
                    session = %self.id,
                    code = %accepted.code,
                    discount = %accepted.discount_amount,
                    "Voucher applied"
                );
                self.voucher = Some(VoucherApplication::from(accepted));
            }
            VoucherOutcome::Rejected { reason } => {
                debug!(session = %self.id, ?reason, "Voucher rejected, reverting to quote totals");
                self.voucher = None;
            }
        }

        Ok(self.phase())
    }

    /// Drops the applied voucher, e.g. after the voucher call failed in transit.
    pub fn revert_voucher(&mut self) -> CoreResult<()> {
        if self.quote.is_none() {
            return Err(CoreError::NoActiveQuote);
        }
        if self.voucher.take().is_some() {
            debug!(session = %self.id, "Voucher reverted");
        }
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Derives display totals. `None` when there is no quote.
    ///
    /// Pure: never mutates the session.
    pub fn current_totals(&self) -> Option<DerivedTotals> {
        let quote = self.quote.as_ref()?;

        let totals = match &self.voucher {
            Some(voucher) if voucher.final_pre_vat <= quote.original_pre_vat => DerivedTotals {
                original_pre_vat: quote.original_pre_vat,
                discount_amount: voucher.discount_amount,
                pre_vat: voucher.final_pre_vat,
                vat_rate: Some(voucher.vat_rate),
                vat_amount: Some(voucher.vat_amount),
                total_with_vat: Some(voucher.total_with_vat),
                duration_minutes: quote.duration_minutes,
                voucher_code: Some(voucher.code.clone()),
                currency: quote.currency.clone(),
            },
            Some(voucher) => {
                let (vat_amount, total_with_vat) =
                    derive_vat(voucher.final_pre_vat, Some(voucher.vat_rate));
                DerivedTotals {
                    original_pre_vat: quote.original_pre_vat,
                    discount_amount: voucher.discount_amount,
                    pre_vat: voucher.final_pre_vat,
                    vat_rate: Some(voucher.vat_rate),
                    vat_amount,
                    total_with_vat,
                    duration_minutes: quote.duration_minutes,
                    voucher_code: Some(voucher.code.clone()),
                    currency: quote.currency.clone(),
                }
            }
            None => {
                let (vat_amount, total_with_vat) =
                    derive_vat(quote.original_pre_vat, quote.vat_rate);
                DerivedTotals {
                    original_pre_vat: quote.original_pre_vat,
                    discount_amount: Money::zero(),
                    pre_vat: quote.original_pre_vat,
                    vat_rate: quote.vat_rate,
                    vat_amount,
                    total_with_vat,
                    duration_minutes: quote.duration_minutes,
                    voucher_code: None,
                    currency: quote.currency.clone(),
                }
            }
        };

        Some(totals)
    }

    /// Trip fields for the booking payload, taken from the live quote.
    pub fn booking_draft(&self) -> CoreResult<BookingDraft> {
        let quote = self.quote.as_ref().ok_or(CoreError::NoActiveQuote)?;
        Ok(BookingDraft {
            pickup: quote.pickup.clone(),
            dropoff: quote.dropoff.clone(),
            passengers: quote.passengers,
            bags: quote.bags,
            duration_minutes: quote.duration_minutes,
            voucher_code: self.voucher.as_ref().map(|v| v.code.clone()),
        })
    }

    // =========================================================================
    // Stale Response Detection
    // =========================================================================

    /// Issues a ticket for a request that is about to start.
    pub fn ticket(&self) -> SessionTicket {
        SessionTicket { epoch: self.epoch }
    }

    /// Fails with `StaleResponse` if the session moved on since `ticket`.
    pub fn ensure_current(&self, ticket: SessionTicket) -> CoreResult<()> {
        if ticket.epoch != self.epoch {
            return Err(CoreError::StaleResponse {
                issued: ticket.epoch,
                current: self.epoch,
            });
        }
        Ok(())
    }
}

impl Default for PricingSession {
    fn default() -> Self {
        Self::new()
    }
}

/// `(vat, total)` for a pre-VAT amount, or `(None, None)` without a rate.
fn derive_vat(pre_vat: Money, rate: Option<VatRate>) -> (Option<Money>, Option<Money>) {
    rate.map(|rate| {
        let vat = pre_vat.calculate_vat(rate);
        (vat, pre_vat.add_rounded(vat))
    })
    .unzip()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::round2;
    use crate::types::{QuotePricing, TripRequest, VoucherAcceptance, DEFAULT_CURRENCY};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn test_quote(pre_vat: Decimal, vat_percent: Option<Decimal>) -> Quote {
        Quote::new(
            TripRequest {
                pickup: "Lisbon Airport".to_string(),
                dropoff: "Sintra".to_string(),
                passengers: 3,
                bags: 2,
            },
            QuotePricing {
                original_pre_vat: Money::new(pre_vat),
                vat_rate: vat_percent.map(VatRate::from_percent),
                duration_minutes: 40,
                currency: DEFAULT_CURRENCY.to_string(),
            },
        )
    }

    fn summer10() -> VoucherOutcome {
        VoucherOutcome::Accepted(VoucherAcceptance {
            code: "SUMMER10".to_string(),
            discount_amount: Money::new(dec!(10.00)),
            final_pre_vat: Money::new(dec!(40.00)),
            vat_rate: VatRate::from_percent(dec!(6)),
            vat_amount: Money::new(dec!(2.40)),
            total_with_vat: Money::new(dec!(42.40)),
            description: Some("10 EUR discount applied".to_string()),
        })
    }

    fn expired() -> VoucherOutcome {
        VoucherOutcome::Rejected {
            reason: Some("expired".to_string()),
        }
    }

    fn quoted_session() -> PricingSession {
        let mut session = PricingSession::new();
        session.apply_quote(test_quote(dec!(50.00), Some(dec!(6))));
        session
    }

    #[test]
    fn test_quote_totals() {
        let session = quoted_session();
        let totals = session.current_totals().unwrap();

        assert_eq!(session.phase(), SessionPhase::Quoted);
        assert_eq!(totals.pre_vat.amount(), dec!(50.00));
        assert_eq!(totals.vat_amount.unwrap().amount(), dec!(3.00));
        assert_eq!(totals.total_with_vat.unwrap().amount(), dec!(53.00));
        assert_eq!(totals.duration_minutes, 40);
        assert_eq!(totals.discount_amount, Money::zero());
        assert!(totals.voucher_code.is_none());
    }

    #[test]
    fn test_accepted_voucher_uses_server_figures() {
        let mut session = quoted_session();
        let phase = session.apply_voucher_result(summer10()).unwrap();
        let totals = session.current_totals().unwrap();

        assert_eq!(phase, SessionPhase::Discounted);
        assert_eq!(totals.pre_vat.amount(), dec!(40.00));
        assert_eq!(totals.vat_rate.unwrap().percent(), dec!(6));
        assert_eq!(totals.vat_amount.unwrap().amount(), dec!(2.40));
        assert_eq!(totals.total_with_vat.unwrap().amount(), dec!(42.40));
        assert_eq!(totals.discount_amount.amount(), dec!(10.00));
        assert_eq!(totals.original_pre_vat.amount(), dec!(50.00));
        assert_eq!(totals.voucher_code.as_deref(), Some("SUMMER10"));
    }

    #[test]
    fn test_rejected_voucher_reverts_to_quote_totals() {
        let mut session = quoted_session();
        session.apply_voucher_result(summer10()).unwrap();

        let phase = session.apply_voucher_result(expired()).unwrap();
        let totals = session.current_totals().unwrap();

        assert_eq!(phase, SessionPhase::Quoted);
        assert!(session.voucher().is_none());
        assert_eq!(totals.pre_vat.amount(), dec!(50.00));
        assert_eq!(totals.vat_amount.unwrap().amount(), dec!(3.00));
        assert_eq!(totals.total_with_vat.unwrap().amount(), dec!(53.00));
        assert_eq!(totals.voucher_code, None);
    }

    #[test]
    fn test_voucher_then_failure_matches_never_applied() {
        let untouched = quoted_session();

        let mut session = untouched.clone();
        session.apply_voucher_result(summer10()).unwrap();
        session.apply_voucher_result(expired()).unwrap();

        assert_eq!(session.current_totals(), untouched.current_totals());

        let mut session = untouched.clone();
        session.apply_voucher_result(summer10()).unwrap();
        session.revert_voucher().unwrap();

        assert_eq!(session.current_totals(), untouched.current_totals());
    }

    #[test]
    fn test_voucher_without_quote_is_rejected() {
        let mut session = PricingSession::new();
        let epoch = session.epoch();

        let result = session.apply_voucher_result(summer10());

        assert!(matches!(result, Err(CoreError::NoActiveQuote)));
        assert_eq!(session.phase(), SessionPhase::Empty);
        assert_eq!(session.epoch(), epoch);
        assert!(session.current_totals().is_none());
        assert!(matches!(session.revert_voucher(), Err(CoreError::NoActiveQuote)));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut session = quoted_session();
        session.apply_voucher_result(summer10()).unwrap();

        session.reset();

        assert!(session.current_totals().is_none());
        assert!(session.quote().is_none());
        assert!(session.voucher().is_none());
        assert!(matches!(session.booking_draft(), Err(CoreError::NoActiveQuote)));
    }

    #[test]
    fn test_missing_vat_rate_yields_no_totals() {
        let mut session = PricingSession::new();
        session.apply_quote(test_quote(dec!(50.00), None));
        session.apply_voucher_result(expired()).unwrap();

        let totals = session.current_totals().unwrap();
        assert_eq!(totals.pre_vat.amount(), dec!(50.00));
        assert_eq!(totals.vat_amount, None);
        assert_eq!(totals.total_with_vat, None);
    }

    #[test]
    fn test_new_quote_clears_voucher() {
        let mut session = quoted_session();
        session.apply_voucher_result(summer10()).unwrap();

        session.apply_quote(test_quote(dec!(80.00), Some(dec!(23))));

        assert_eq!(session.phase(), SessionPhase::Quoted);
        let totals = session.current_totals().unwrap();
        assert_eq!(totals.vat_amount.unwrap().amount(), dec!(18.40));
        assert_eq!(totals.total_with_vat.unwrap().amount(), dec!(98.40));
    }

    #[test]
    fn test_voucher_above_original_price_is_recomputed() {
        let mut session = quoted_session();
        session
            .apply_voucher_result(VoucherOutcome::Accepted(VoucherAcceptance {
                code: "ODD".to_string(),
                discount_amount: Money::new(dec!(-5.00)),
                final_pre_vat: Money::new(dec!(55.00)),
                vat_rate: VatRate::from_percent(dec!(6)),
                vat_amount: Money::new(dec!(0.00)),
                total_with_vat: Money::new(dec!(0.00)),
                description: None,
            }))
            .unwrap();

        let totals = session.current_totals().unwrap();
        assert_eq!(totals.pre_vat.amount(), dec!(55.00));
        assert_eq!(totals.vat_amount.unwrap().amount(), dec!(3.30));
        assert_eq!(totals.total_with_vat.unwrap().amount(), dec!(58.30));
    }

    #[test]
    fn test_derived_totals_follow_rounding_rule() {
        let pre_vats = [dec!(0.01), dec!(10.05), dec!(33.33), dec!(49.99), dec!(1234.56)];
        let rates = [dec!(0), dec!(6), dec!(13), dec!(23), dec!(7.5)];

        for pre_vat in pre_vats {
            for rate in rates {
                let mut session = PricingSession::new();
                session.apply_quote(test_quote(pre_vat, Some(rate)));
                let totals = session.current_totals().unwrap();

                let vat = round2(pre_vat * rate / dec!(100));
                assert_eq!(totals.vat_amount.unwrap().amount(), vat);
                assert_eq!(totals.total_with_vat.unwrap().amount(), round2(pre_vat + vat));
            }
        }
    }

    #[test]
    fn test_tickets_detect_stale_responses() {
        let mut session = quoted_session();
        let ticket = session.ticket();
        assert!(session.ensure_current(ticket).is_ok());

        // Voucher results do not move the epoch
        session.apply_voucher_result(summer10()).unwrap();
        assert!(session.ensure_current(ticket).is_ok());

        session.reset();
        let err = session.ensure_current(ticket).unwrap_err();
        assert!(matches!(
            err,
            CoreError::StaleResponse { issued, current } if issued == ticket.epoch() && current == ticket.epoch() + 1
        ));
    }

    #[test]
    fn test_booking_draft_carries_voucher_code() {
        let mut session = quoted_session();
        let draft = session.booking_draft().unwrap();
        assert_eq!(draft.voucher_code, None);
        assert_eq!(draft.passengers, 3);
        assert_eq!(draft.duration_minutes, 40);

        session.apply_voucher_result(summer10()).unwrap();
        let draft = session.booking_draft().unwrap();
        assert_eq!(draft.voucher_code.as_deref(), Some("SUMMER10"));
    }
}
