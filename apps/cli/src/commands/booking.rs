//! # Booking Commands
//!
//! Passenger details form and booking submission.
//!
//! ## Submission Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    submit_booking                                       │
//! │                                                                         │
//! │  1. Claim the Booking action ─────────────── busy? ──► BUSY            │
//! │  2. Read trip fields from the live quote ─── none? ──► NO_QUOTE        │
//! │  3. Validate passenger form ─────────────── bad?  ──► VALIDATION_ERROR │
//! │  4. POST /submit-booking ────────────────── fail? ──► SERVICE / COMM   │
//! │  5. Reset the session unless a newer quote replaced it                  │
//! │  6. Return confirmation + display message                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A confirmation is never discarded: once the service has accepted a booking
//! the user sees it, even if the form was flipped back meanwhile. The session
//! is only reset if it still holds the quote that was booked.

use chrono::NaiveDateTime;
use ridebook_client::config::BookingSettings;
use ridebook_client::BookingBackend;
use ridebook_core::validation::{
    default_pickup_slot, validate_passenger_details, PassengerForm, DATE_FORMAT, TIME_FORMAT,
};
use ridebook_core::{BookingConfirmation, BookingRequest};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::{Action, SessionState};
use crate::view;

/// Accepted booking plus the line shown to the user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub confirmation: BookingConfirmation,
    pub message: String,
}

/// Submits the booking for the live quote.
///
/// ## Arguments
/// * `form` - Raw passenger fields as typed
/// * `now` - Local time, for the "not in the past" rule
pub async fn submit_booking(
    session: &SessionState,
    backend: &dyn BookingBackend,
    form: &PassengerForm,
    now: NaiveDateTime,
) -> Result<BookingResponse, ApiError> {
    debug!(name = %form.name, date = %form.date, time = %form.time, "submit_booking command");

    let _guard = session
        .begin(Action::Booking)
        .ok_or_else(|| ApiError::busy(Action::Booking))?;

    let (ticket, trip) = session.with_session(|s| s.booking_draft().map(|d| (s.ticket(), d)))?;
    let passenger = validate_passenger_details(form, now)?;
    let request = BookingRequest { passenger, trip };

    let confirmation = backend.submit_booking(&request).await?;

    // A quote requested while the booking was in flight is left alone
    let session_id = session.with_session_mut(|s| {
        if s.ensure_current(ticket).is_ok() {
            s.reset();
        }
        s.id()
    });
    info!(
        session = %session_id,
        booking_id = %confirmation.booking_id,
        "Booking confirmed"
    );

    let message = view::confirmation_message(&confirmation);
    Ok(BookingResponse {
        confirmation,
        message,
    })
}

/// Passenger form pre-filled with the default pickup slot and country code.
pub fn form_defaults(settings: &BookingSettings, now: NaiveDateTime) -> PassengerForm {
    debug!("form_defaults command");
    let (date, time) = default_pickup_slot(now);
    PassengerForm {
        country_code: settings.default_country_code.clone(),
        date: date.format(DATE_FORMAT).to_string(),
        time: time.format(TIME_FORMAT).to_string(),
        ..PassengerForm::default()
    }
}
