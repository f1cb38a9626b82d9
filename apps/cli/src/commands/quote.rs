//! # Quote Commands
//!
//! Pricing a trip and flipping the budget card back.
//!
//! ## Budget Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Budget Lifecycle                                     │
//! │                                                                         │
//! │  ┌──────────┐  calculate_budget  ┌──────────┐  apply_voucher  ┌──────┐ │
//! │  │  Trip    │───────────────────►│  Quoted  │────────────────►│ Disc.│ │
//! │  │  form    │                    │  card    │                 │ card │ │
//! │  └──────────┘◄───────────────────└──────────┘◄────────────────└──────┘ │
//! │                   flip_back          (any phase → Empty)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use ridebook_client::BookingBackend;
use ridebook_core::validation::validate_trip;
use ridebook_core::{DerivedTotals, SessionPhase, TripRequest};
use tracing::debug;

use crate::error::ApiError;
use crate::state::{Action, SessionState};

/// Asks the backend to price a trip and makes it the live quote.
///
/// ## Behavior
/// - Trip is validated first; nothing is sent for an incomplete form
/// - A service or transport error leaves the session untouched
/// - A response that arrives after a flip-back is discarded
///
/// ## Returns
/// The totals of the new quote
pub async fn calculate_budget(
    session: &SessionState,
    backend: &dyn BookingBackend,
    trip: TripRequest,
) -> Result<DerivedTotals, ApiError> {
    debug!(pickup = %trip.pickup, dropoff = %trip.dropoff, "calculate_budget command");

    let trip = validate_trip(&trip)?;
    let _guard = session
        .begin(Action::Quote)
        .ok_or_else(|| ApiError::busy(Action::Quote))?;

    let ticket = session.with_session(|s| s.ticket());
    let quote = backend.calculate_budget(&trip).await?;

    session.with_session_mut(|s| {
        s.ensure_current(ticket)?;
        s.apply_quote(quote);
        s.current_totals()
            .ok_or_else(|| ApiError::internal("Quote applied but no totals available"))
    })
}

/// Discards the quote and any voucher so the trip can be edited.
pub fn flip_back(session: &SessionState) -> SessionPhase {
    debug!("flip_back command");
    session.with_session_mut(|s| {
        s.reset();
        s.phase()
    })
}

/// Current totals, or `None` before a quote.
pub fn get_totals(session: &SessionState) -> Option<DerivedTotals> {
    debug!("get_totals command");
    session.with_session(|s| s.current_totals())
}
