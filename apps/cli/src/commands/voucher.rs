//! # Voucher Command
//!
//! Validates a discount code against the live quote.
//!
//! ## Outcomes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    apply_voucher                                        │
//! │                                                                         │
//! │  no quote ─────────────────────────────► NO_QUOTE (nothing sent)       │
//! │  empty code ───────────────────────────► VALIDATION_ERROR              │
//! │                                                                         │
//! │  backend says valid ───────────────────► Discounted, server figures    │
//! │  backend says invalid / 4xx ───────────► Quoted, applied = false       │
//! │  5xx / transport failure ──────────────► Quoted (voucher reverted),    │
//! │                                          error returned                 │
//! │  quote replaced or reset meanwhile ────► STALE_RESPONSE, ignored       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use ridebook_client::BookingBackend;
use ridebook_core::validation::normalize_voucher_code;
use ridebook_core::{CoreError, DerivedTotals, VoucherOutcome};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::{Action, SessionState};

/// Shown when the service rejects a code without saying why.
pub const INVALID_VOUCHER_MESSAGE: &str = "Invalid voucher";

/// Result of a voucher attempt that reached the service.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherResponse {
    /// True when the code now discounts the quote
    pub applied: bool,

    /// Service description on success, rejection reason otherwise
    pub message: String,

    /// Totals after the attempt
    pub totals: DerivedTotals,
}

/// Sends `code` to the voucher service and applies its verdict.
pub async fn apply_voucher(
    session: &SessionState,
    backend: &dyn BookingBackend,
    code: &str,
) -> Result<VoucherResponse, ApiError> {
    debug!(code = %code, "apply_voucher command");

    let code = normalize_voucher_code(code)?;
    let _guard = session
        .begin(Action::Voucher)
        .ok_or_else(|| ApiError::busy(Action::Voucher))?;

    let (ticket, original_pre_vat) = session.with_session(|s| {
        s.quote()
            .map(|q| (s.ticket(), q.original_pre_vat))
            .ok_or(CoreError::NoActiveQuote)
    })?;

    match backend.validate_voucher(&code, original_pre_vat).await {
        Ok(outcome) => session.with_session_mut(|s| {
            s.ensure_current(ticket)?;

            let applied = matches!(outcome, VoucherOutcome::Accepted(_));
            let message = match &outcome {
                VoucherOutcome::Accepted(accepted) => accepted
                    .description
                    .clone()
                    .unwrap_or_else(|| format!("Voucher {} applied", accepted.code)),
                VoucherOutcome::Rejected { reason } => reason
                    .clone()
                    .unwrap_or_else(|| INVALID_VOUCHER_MESSAGE.to_string()),
            };
            s.apply_voucher_result(outcome)?;

            let totals = s
                .current_totals()
                .ok_or_else(|| ApiError::internal("Voucher applied but no totals available"))?;
            Ok(VoucherResponse {
                applied,
                message,
                totals,
            })
        }),
        Err(err) => {
            // Only the session that asked may be rolled back
            session.with_session_mut(|s| {
                if s.ensure_current(ticket).is_ok() {
                    warn!(
                        code = %code,
                        status = ?err.status(),
                        error = %err,
                        "Voucher request failed, reverting totals"
                    );
                    s.revert_voucher()
                } else {
                    Ok(())
                }
            })?;
            Err(err.into())
        }
    }
}
