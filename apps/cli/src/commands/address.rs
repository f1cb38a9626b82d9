//! # Address Commands
//!
//! Autocomplete for the pickup and drop-off fields.
//!
//! ## Picking a Suggestion
//! ```text
//! suggest rua aug  ──► numbered list (remembered)
//! pickup 2         ──► pickup = list[1].value
//! quote | Sintra   ──► blank pickup filled with the picked address
//! ```

use std::fmt;
use std::sync::{Mutex, MutexGuard};

use ridebook_client::{AddressSuggester, AddressSuggestion};
use ridebook_core::TripRequest;
use tracing::debug;

use crate::error::ApiError;

/// Which end of the trip a picked suggestion fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stop {
    Pickup,
    Dropoff,
}

impl fmt::Display for Stop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stop::Pickup => write!(f, "Pickup"),
            Stop::Dropoff => write!(f, "Drop-off"),
        }
    }
}

#[derive(Debug, Default)]
struct Picks {
    shown: Vec<AddressSuggestion>,
    pickup: Option<String>,
    dropoff: Option<String>,
}

/// The last suggestion list shown and the addresses picked from it.
#[derive(Debug, Default)]
pub struct AddressPicks {
    inner: Mutex<Picks>,
}

impl AddressPicks {
    fn lock(&self) -> MutexGuard<'_, Picks> {
        self.inner.lock().expect("Address picks mutex poisoned")
    }

    /// Fills blank trip locations with the picked addresses.
    pub fn fill(&self, mut trip: TripRequest) -> TripRequest {
        let picks = self.lock();
        if trip.pickup.trim().is_empty() {
            if let Some(pickup) = &picks.pickup {
                trip.pickup = pickup.clone();
            }
        }
        if trip.dropoff.trim().is_empty() {
            if let Some(dropoff) = &picks.dropoff {
                trip.dropoff = dropoff.clone();
            }
        }
        trip
    }
}

/// Debounced suggestions for a partially typed address.
///
/// `Ok(None)` means a newer query superseded this one and nothing should
/// be shown. Short queries yield an empty list. A list that is returned
/// becomes the one [`pick_address`] numbers refer to.
pub async fn suggest_addresses(
    suggester: &AddressSuggester,
    picks: &AddressPicks,
    query: &str,
) -> Result<Option<Vec<AddressSuggestion>>, ApiError> {
    debug!(query = %query, "suggest_addresses command");
    let found = suggester.suggest(query).await?;
    if let Some(list) = &found {
        picks.lock().shown = list.clone();
    }
    Ok(found)
}

/// Puts the full address of suggestion `number` (1-based) into `stop`.
///
/// ## Returns
/// The address now used for that end of the trip
pub fn pick_address(picks: &AddressPicks, stop: Stop, number: usize) -> Result<String, ApiError> {
    debug!(?stop, number, "pick_address command");
    let mut picks = picks.lock();
    let value = number
        .checked_sub(1)
        .and_then(|i| picks.shown.get(i))
        .map(|s| s.value.clone())
        .ok_or_else(|| match picks.shown.len() {
            0 => ApiError::validation("No suggestions to pick from; run 'suggest' first"),
            n => ApiError::validation(format!("Pick a suggestion between 1 and {n}")),
        })?;

    match stop {
        Stop::Pickup => picks.pickup = Some(value.clone()),
        Stop::Dropoff => picks.dropoff = Some(value.clone()),
    }
    Ok(value)
}
