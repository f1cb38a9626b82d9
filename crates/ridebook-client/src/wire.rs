//! # Wire Format
//!
//! JSON bodies exchanged with the booking backend, and their conversion
//! to and from `ridebook-core` types.
//!
//! ## Endpoint Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /calculate-budget                                                 │
//! │    → {pickupLocation, dropoffLocation, passengers, bags}                │
//! │    ← {original_budget_pre_vat, vat_percentage, vat_amount,              │
//! │       total_with_vat, duration_minutes, currency?, message?}            │
//! │                                                                         │
//! │  POST /validate-voucher                                                 │
//! │    → {voucher_code, original_budget_pre_vat}                            │
//! │    ← {valid: true, voucher_code, discount_amount,                       │
//! │       final_budget_pre_vat, vat_percentage, vat_amount,                 │
//! │       total_with_vat, description?, message?}                           │
//! │    ← {valid: false, error?}            (2xx or 4xx)                     │
//! │                                                                         │
//! │  POST /submit-booking                                                   │
//! │    → {passengerName, passengerPhone, date, time, instructions,          │
//! │       pickupLocation, dropoffLocation, passengers, bags,                │
//! │       duration_minutes, voucher_code|null}                              │
//! │    ← 201 {bookingId, total_with_vat, message?, status?,                 │
//! │           appliedVoucher?}                                              │
//! │                                                                         │
//! │  Any failure: non-2xx {error}                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Amounts travel as JSON numbers and land in `Decimal` through
//! `rust_decimal::serde::float`, so `42.4` becomes exactly `42.4`.

use ridebook_core::types::{
    BookingConfirmation, BookingRequest, QuotePricing, VatRate, VoucherAcceptance,
    VoucherOutcome, DEFAULT_CURRENCY,
};
use ridebook_core::validation::{DATE_FORMAT, TIME_FORMAT};
use ridebook_core::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::error::{ClientError, ClientResult};

// =============================================================================
// Errors
// =============================================================================

/// Body of any non-2xx response.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// The human-readable reason, preferring `error` over `message`.
    pub fn reason(self) -> Option<String> {
        self.error
            .or(self.message)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

// =============================================================================
// Quote
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequestBody<'a> {
    pub pickup_location: &'a str,
    pub dropoff_location: &'a str,
    pub passengers: u32,
    pub bags: u32,
}

#[derive(Debug, Deserialize)]
pub struct QuoteResponseBody {
    #[serde(with = "rust_decimal::serde::float")]
    pub original_budget_pre_vat: Decimal,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub vat_percentage: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub vat_amount: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub total_with_vat: Option<Decimal>,
    #[serde(deserialize_with = "whole_minutes")]
    pub duration_minutes: u32,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl From<QuoteResponseBody> for QuotePricing {
    fn from(body: QuoteResponseBody) -> Self {
        QuotePricing {
            original_pre_vat: Money::new(body.original_budget_pre_vat),
            vat_rate: body.vat_percentage.map(VatRate::from_percent),
            duration_minutes: body.duration_minutes,
            currency: body
                .currency
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        }
    }
}

/// Duration may arrive as `40` or `39.6`; both mean whole minutes.
fn whole_minutes<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let minutes = f64::deserialize(deserializer)?;
    if !minutes.is_finite() || minutes < 0.0 || minutes > f64::from(u32::MAX) {
        return Err(serde::de::Error::custom(format!(
            "duration_minutes out of range: {minutes}"
        )));
    }
    Ok(minutes.round() as u32)
}

// =============================================================================
// Voucher
// =============================================================================

#[derive(Debug, Serialize)]
pub struct VoucherRequestBody<'a> {
    pub voucher_code: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    pub original_budget_pre_vat: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct VoucherResponseBody {
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub voucher_code: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub discount_amount: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub final_budget_pre_vat: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub vat_percentage: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub vat_amount: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub total_with_vat: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl VoucherResponseBody {
    /// Interprets a 2xx voucher body.
    ///
    /// `valid: false` is a rejection; `valid: true` must carry every amount.
    pub fn into_outcome(self, requested_code: &str) -> ClientResult<VoucherOutcome> {
        if !self.valid {
            return Ok(VoucherOutcome::Rejected {
                reason: ErrorBody {
                    error: self.error,
                    message: self.message,
                }
                .reason(),
            });
        }

        let acceptance = VoucherAcceptance {
            code: self
                .voucher_code
                .unwrap_or_else(|| requested_code.to_string()),
            discount_amount: Money::new(required_amount("discount_amount", self.discount_amount)?),
            final_pre_vat: Money::new(required_amount(
                "final_budget_pre_vat",
                self.final_budget_pre_vat,
            )?),
            vat_rate: VatRate::from_percent(required_amount("vat_percentage", self.vat_percentage)?),
            vat_amount: Money::new(required_amount("vat_amount", self.vat_amount)?),
            total_with_vat: Money::new(required_amount("total_with_vat", self.total_with_vat)?),
            description: self.description.or(self.message),
        };

        Ok(VoucherOutcome::Accepted(acceptance))
    }
}

fn required_amount(field: &str, value: Option<Decimal>) -> ClientResult<Decimal> {
    value.ok_or_else(|| ClientError::Decode(format!("accepted voucher is missing {field}")))
}

// =============================================================================
// Booking
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequestBody<'a> {
    pub passenger_name: &'a str,
    pub passenger_phone: &'a str,
    pub date: String,
    pub time: String,
    pub instructions: &'a str,
    pub pickup_location: &'a str,
    pub dropoff_location: &'a str,
    pub passengers: u32,
    pub bags: u32,
    #[serde(rename = "duration_minutes")]
    pub duration_minutes: u32,
    #[serde(rename = "voucher_code")]
    pub voucher_code: Option<&'a str>,
}

impl<'a> From<&'a BookingRequest> for BookingRequestBody<'a> {
    fn from(request: &'a BookingRequest) -> Self {
        let passenger = &request.passenger;
        let trip = &request.trip;
        BookingRequestBody {
            passenger_name: &passenger.name,
            passenger_phone: &passenger.phone,
            date: passenger.date.format(DATE_FORMAT).to_string(),
            time: passenger.time.format(TIME_FORMAT).to_string(),
            instructions: passenger.instructions.as_deref().unwrap_or(""),
            pickup_location: &trip.pickup,
            dropoff_location: &trip.dropoff,
            passengers: trip.passengers,
            bags: trip.bags,
            duration_minutes: trip.duration_minutes,
            voucher_code: trip.voucher_code.as_deref(),
        }
    }
}

/// Booking ids are integers today; strings are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum BookingId {
    Number(u64),
    Text(String),
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingId::Number(n) => write!(f, "{}", n),
            BookingId::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BookingResponseBody {
    #[serde(rename = "bookingId")]
    pub booking_id: BookingId,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub total_with_vat: Option<Decimal>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "appliedVoucher", default)]
    pub applied_voucher: Option<String>,
}

impl From<BookingResponseBody> for BookingConfirmation {
    fn from(body: BookingResponseBody) -> Self {
        BookingConfirmation {
            booking_id: body.booking_id.to_string(),
            total_with_vat: body.total_with_vat.map(Money::new),
            message: body.message,
            status: body.status,
            applied_voucher: body.applied_voucher,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use ridebook_core::types::{BookingDraft, PassengerDetails};
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_quote_response_parses_floats() {
        let body: QuoteResponseBody = serde_json::from_value(json!({
            "original_budget_pre_vat": 50.0,
            "vat_percentage": 6,
            "vat_amount": 3.0,
            "total_with_vat": 53.0,
            "duration_minutes": 39.6,
            "currency": "EUR"
        }))
        .unwrap();

        let pricing = QuotePricing::from(body);
        assert_eq!(pricing.original_pre_vat.amount(), dec!(50));
        assert_eq!(pricing.vat_rate.unwrap().percent(), dec!(6));
        assert_eq!(pricing.duration_minutes, 40);
        assert_eq!(pricing.currency, "EUR");
    }

    #[test]
    fn test_degraded_quote_response() {
        let body: QuoteResponseBody = serde_json::from_value(json!({
            "original_budget_pre_vat": 33.33,
            "vat_percentage": null,
            "duration_minutes": 25
        }))
        .unwrap();

        let pricing = QuotePricing::from(body);
        assert_eq!(pricing.original_pre_vat.amount(), dec!(33.33));
        assert_eq!(pricing.vat_rate, None);
        assert_eq!(pricing.currency, DEFAULT_CURRENCY);
    }

    #[test]
    fn test_negative_duration_is_rejected() {
        let result = serde_json::from_value::<QuoteResponseBody>(json!({
            "original_budget_pre_vat": 10,
            "duration_minutes": -5
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_quote_request_keys() {
        let body = QuoteRequestBody {
            pickup_location: "Lisbon Airport",
            dropoff_location: "Sintra",
            passengers: 3,
            bags: 2,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "pickupLocation": "Lisbon Airport",
                "dropoffLocation": "Sintra",
                "passengers": 3,
                "bags": 2
            })
        );
    }

    #[test]
    fn test_voucher_request_sends_number() {
        let body = VoucherRequestBody {
            voucher_code: "SUMMER10",
            original_budget_pre_vat: dec!(50.00),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["voucher_code"], "SUMMER10");
        assert_eq!(value["original_budget_pre_vat"].as_f64(), Some(50.0));
    }

    #[test]
    fn test_accepted_voucher() {
        let body: VoucherResponseBody = serde_json::from_value(json!({
            "valid": true,
            "voucher_code": "SUMMER10",
            "discount_amount": 10.0,
            "final_budget_pre_vat": 40.0,
            "vat_percentage": 6,
            "vat_amount": 2.4,
            "total_with_vat": 42.4,
            "description": "10 EUR discount applied"
        }))
        .unwrap();

        let VoucherOutcome::Accepted(accepted) = body.into_outcome("summer10").unwrap() else {
            panic!("expected acceptance");
        };
        assert_eq!(accepted.code, "SUMMER10");
        assert_eq!(accepted.final_pre_vat.amount(), dec!(40));
        assert_eq!(accepted.vat_amount.amount(), dec!(2.40));
        assert_eq!(accepted.total_with_vat.amount(), dec!(42.40));
    }

    #[test]
    fn test_rejected_voucher() {
        let body: VoucherResponseBody =
            serde_json::from_value(json!({"valid": false, "error": "expired"})).unwrap();

        assert_eq!(
            body.into_outcome("OLD").unwrap(),
            VoucherOutcome::Rejected {
                reason: Some("expired".to_string())
            }
        );
    }

    #[test]
    fn test_accepted_voucher_missing_amount_is_decode_error() {
        let body: VoucherResponseBody = serde_json::from_value(json!({
            "valid": true,
            "voucher_code": "SUMMER10",
            "discount_amount": 10.0
        }))
        .unwrap();

        assert!(matches!(body.into_outcome("SUMMER10"), Err(ClientError::Decode(_))));
    }

    #[test]
    fn test_booking_request_keys() {
        let request = BookingRequest {
            passenger: PassengerDetails {
                name: "Ana Silva".to_string(),
                phone: "+351912345678".to_string(),
                date: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
                time: NaiveTime::from_hms_opt(9, 5, 0).unwrap(),
                instructions: None,
            },
            trip: BookingDraft {
                pickup: "Lisbon Airport".to_string(),
                dropoff: "Sintra".to_string(),
                passengers: 3,
                bags: 2,
                duration_minutes: 40,
                voucher_code: None,
            },
        };

        let value = serde_json::to_value(BookingRequestBody::from(&request)).unwrap();
        assert_eq!(
            value,
            json!({
                "passengerName": "Ana Silva",
                "passengerPhone": "+351912345678",
                "date": "2026-07-01",
                "time": "09:05",
                "instructions": "",
                "pickupLocation": "Lisbon Airport",
                "dropoffLocation": "Sintra",
                "passengers": 3,
                "bags": 2,
                "duration_minutes": 40,
                "voucher_code": null
            })
        );
    }

    #[test]
    fn test_booking_response_numeric_and_text_ids() {
        let body: BookingResponseBody = serde_json::from_value(json!({
            "bookingId": 1234,
            "total_with_vat": 42.4,
            "status": "PENDING",
            "appliedVoucher": "SUMMER10"
        }))
        .unwrap();
        let confirmation = BookingConfirmation::from(body);
        assert_eq!(confirmation.booking_id, "1234");
        assert_eq!(confirmation.total_with_vat, Some(Money::new(dec!(42.40))));
        assert_eq!(confirmation.applied_voucher.as_deref(), Some("SUMMER10"));

        let body: BookingResponseBody =
            serde_json::from_value(json!({"bookingId": "BK-77"})).unwrap();
        assert_eq!(BookingConfirmation::from(body).booking_id, "BK-77");
    }

    #[test]
    fn test_error_body_reason() {
        let body: ErrorBody = serde_json::from_value(json!({"error": " Slot taken "})).unwrap();
        assert_eq!(body.reason().as_deref(), Some("Slot taken"));

        let body: ErrorBody = serde_json::from_value(json!({"error": ""})).unwrap();
        assert_eq!(body.reason(), None);
    }
}
