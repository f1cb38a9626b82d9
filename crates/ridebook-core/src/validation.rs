//! # Validation Module
//!
//! Booking-form checks that run before any network call.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Presentation (CLI / web form)                                │
//! │  ├── Raw text input                                                    │
//! │  └── Immediate feedback                                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required fields, ranges                                           │
//! │  ├── Phone / voucher normalisation                                     │
//! │  └── Date + time parsing, "not in the past"                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend                                                      │
//! │  ├── Pricing, voucher rules                                            │
//! │  └── Slot availability (409)                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is pure: the current time is always passed in.
//!
//! ## Usage
//! ```rust
//! use ridebook_core::validation::{normalize_phone, normalize_voucher_code};
//!
//! assert_eq!(normalize_voucher_code("  summer10 ").unwrap(), "SUMMER10");
//! assert_eq!(normalize_phone("+351", "912 345 678").unwrap(), "+351912345678");
//! ```

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::ValidationError;
use crate::types::{PassengerDetails, TripRequest};
use crate::{BOOKING_GRACE_MINUTES, DEFAULT_COUNTRY_CODE, MAX_BAGS, MAX_PASSENGERS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Dialling codes offered by the booking form, default first.
pub const COUNTRY_CODES: &[(&str, &str)] = &[
    ("PT", DEFAULT_COUNTRY_CODE),
    ("ES", "+34"),
    ("FR", "+33"),
    ("UK", "+44"),
    ("DE", "+49"),
    ("IT", "+39"),
    ("CH", "+41"),
    ("BE", "+32"),
    ("NL", "+31"),
    ("BR", "+55"),
    ("US", "+1"),
    ("AO", "+244"),
    ("MZ", "+258"),
];

/// Date format on the booking wire (`YYYY-MM-DD`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Time format on the booking wire (`HH:MM`).
pub const TIME_FORMAT: &str = "%H:%M";

// =============================================================================
// Trip
// =============================================================================

/// Validates the trip part of the form before asking for a quote.
///
/// ## Rules
/// - Pickup and dropoff are required (trimmed)
/// - Passengers: 1..=MAX_PASSENGERS
/// - Bags: 0..=MAX_BAGS
///
/// ## Returns
/// The trip with trimmed locations.
pub fn validate_trip(trip: &TripRequest) -> ValidationResult<TripRequest> {
    let pickup = required("pickup location", &trip.pickup)?;
    let dropoff = required("dropoff location", &trip.dropoff)?;

    if trip.passengers == 0 {
        return Err(ValidationError::MustBePositive {
            field: "passengers".to_string(),
        });
    }
    if trip.passengers > MAX_PASSENGERS {
        return Err(ValidationError::OutOfRange {
            field: "passengers".to_string(),
            min: 1,
            max: i64::from(MAX_PASSENGERS),
        });
    }
    if trip.bags > MAX_BAGS {
        return Err(ValidationError::OutOfRange {
            field: "bags".to_string(),
            min: 0,
            max: i64::from(MAX_BAGS),
        });
    }

    Ok(TripRequest {
        pickup,
        dropoff,
        passengers: trip.passengers,
        bags: trip.bags,
    })
}

// =============================================================================
// Voucher
// =============================================================================

/// Trims and upper-cases a voucher code.
///
/// ## Example
/// ```rust
/// use ridebook_core::validation::normalize_voucher_code;
///
/// assert_eq!(normalize_voucher_code("summer10").unwrap(), "SUMMER10");
/// assert!(normalize_voucher_code("   ").is_err());
/// ```
pub fn normalize_voucher_code(code: &str) -> ValidationResult<String> {
    Ok(required("voucher code", code)?.to_uppercase())
}

// =============================================================================
// Passenger
// =============================================================================

/// Raw passenger half of the booking form, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassengerForm {
    pub name: String,
    pub country_code: String,
    pub phone: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    pub instructions: String,
}

/// Joins a dialling code and a local number, dropping all whitespace.
///
/// The country code must be `+` followed by digits.
pub fn normalize_phone(country_code: &str, phone: &str) -> ValidationResult<String> {
    let country_code = country_code.trim();
    let digits = country_code.strip_prefix('+').unwrap_or("");
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "country code".to_string(),
            reason: "must be '+' followed by digits".to_string(),
        });
    }

    let number: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    if number.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    Ok(format!("{country_code}{number}"))
}

/// Validates the passenger half of the form against the current local time.
///
/// ## Rules
/// - Name, phone, date and time are required
/// - Date is `YYYY-MM-DD`, time is `HH:MM`
/// - The pickup instant may be at most `BOOKING_GRACE_MINUTES` in the past
/// - Empty instructions become `None`
pub fn validate_passenger_details(
    form: &PassengerForm,
    now: NaiveDateTime,
) -> ValidationResult<PassengerDetails> {
    let name = required("passenger name", &form.name)?;
    let phone = normalize_phone(&form.country_code, &form.phone)?;

    let date_text = required("date", &form.date)?;
    let date = NaiveDate::parse_from_str(&date_text, DATE_FORMAT).map_err(|_| {
        ValidationError::InvalidFormat {
            field: "date".to_string(),
            reason: "expected YYYY-MM-DD".to_string(),
        }
    })?;

    let time_text = required("time", &form.time)?;
    let time = NaiveTime::parse_from_str(&time_text, TIME_FORMAT).map_err(|_| {
        ValidationError::InvalidFormat {
            field: "time".to_string(),
            reason: "expected HH:MM".to_string(),
        }
    })?;

    if date.and_time(time) < now - Duration::minutes(BOOKING_GRACE_MINUTES) {
        return Err(ValidationError::InPast {
            field: "booking date and time".to_string(),
        });
    }

    let instructions = form.instructions.trim();

    Ok(PassengerDetails {
        name,
        phone,
        date,
        time,
        instructions: (!instructions.is_empty()).then(|| instructions.to_string()),
    })
}

// =============================================================================
// Pickup Slot
// =============================================================================

/// Default pickup slot: today, one hour from now rounded up to the next
/// quarter hour.
///
/// The date stays on today even when the time wraps past midnight, so a late
/// evening default has to be moved forward by hand before it validates.
///
/// ## Examples
/// ```text
/// 10:07 → 11:15
/// 10:15 → 11:15
/// 10:52 → 12:00
/// 23:50 → 01:00 (same date)
/// ```
pub fn default_pickup_slot(now: NaiveDateTime) -> (NaiveDate, NaiveTime) {
    let ahead = now + Duration::hours(1);
    let minute = i64::from(ahead.minute());
    let round_up = (15 - minute % 15) % 15;

    let slot = ahead
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ahead)
        + Duration::minutes(round_up);

    (now.date(), slot.time())
}

// =============================================================================
// Helpers
// =============================================================================

fn required(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(value.to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDate::parse_from_str(date, DATE_FORMAT)
            .unwrap()
            .and_time(NaiveTime::parse_from_str(time, "%H:%M:%S").unwrap())
    }

    fn trip(pickup: &str, dropoff: &str, passengers: u32) -> TripRequest {
        TripRequest {
            pickup: pickup.to_string(),
            dropoff: dropoff.to_string(),
            passengers,
            bags: 0,
        }
    }

    fn form() -> PassengerForm {
        PassengerForm {
            name: " Ana Silva ".to_string(),
            country_code: "+351".to_string(),
            phone: "912 345\t678".to_string(),
            date: "2026-07-01".to_string(),
            time: "14:30".to_string(),
            instructions: String::new(),
        }
    }

    #[test]
    fn test_validate_trip() {
        let trip = validate_trip(&trip("  Lisbon Airport ", "Sintra", 2)).unwrap();
        assert_eq!(trip.pickup, "Lisbon Airport");
        assert_eq!(trip.dropoff, "Sintra");
    }

    #[test]
    fn test_validate_trip_requires_locations() {
        assert!(matches!(
            validate_trip(&trip("", "Sintra", 1)),
            Err(ValidationError::Required { field }) if field == "pickup location"
        ));
        assert!(matches!(
            validate_trip(&trip("Lisbon", "   ", 1)),
            Err(ValidationError::Required { field }) if field == "dropoff location"
        ));
    }

    #[test]
    fn test_validate_trip_passenger_range() {
        assert!(matches!(
            validate_trip(&trip("A", "B", 0)),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(matches!(
            validate_trip(&trip("A", "B", MAX_PASSENGERS + 1)),
            Err(ValidationError::OutOfRange { .. })
        ));

        let mut heavy = trip("A", "B", 1);
        heavy.bags = MAX_BAGS + 1;
        assert!(validate_trip(&heavy).is_err());
    }

    #[test]
    fn test_normalize_voucher_code() {
        assert_eq!(normalize_voucher_code(" summer10\n").unwrap(), "SUMMER10");
        assert!(matches!(
            normalize_voucher_code(""),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("+351", "912 345 678").unwrap(), "+351912345678");
        assert_eq!(normalize_phone(" +44 ", "7700 900123").unwrap(), "+447700900123");
        assert!(matches!(
            normalize_phone("351", "912345678"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(normalize_phone("+", "912345678").is_err());
        assert!(matches!(
            normalize_phone("+351", "  "),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_country_codes_are_well_formed() {
        assert_eq!(COUNTRY_CODES[0].1, DEFAULT_COUNTRY_CODE);
        for (_, code) in COUNTRY_CODES {
            assert!(normalize_phone(code, "1").is_ok(), "bad code {code}");
        }
    }

    #[test]
    fn test_validate_passenger_details() {
        let details = validate_passenger_details(&form(), at("2026-06-30", "09:00:00")).unwrap();

        assert_eq!(details.name, "Ana Silva");
        assert_eq!(details.phone, "+351912345678");
        assert_eq!(details.date.format(DATE_FORMAT).to_string(), "2026-07-01");
        assert_eq!(details.time.format(TIME_FORMAT).to_string(), "14:30");
        assert_eq!(details.instructions, None);
    }

    #[test]
    fn test_passenger_details_keep_instructions() {
        let mut form = form();
        form.instructions = "  Meet at arrivals gate B ".to_string();

        let details = validate_passenger_details(&form, at("2026-06-30", "09:00:00")).unwrap();
        assert_eq!(details.instructions.as_deref(), Some("Meet at arrivals gate B"));
    }

    #[test]
    fn test_passenger_details_required_fields() {
        let now = at("2026-06-30", "09:00:00");

        let mut missing_name = form();
        missing_name.name = " ".to_string();
        assert!(matches!(
            validate_passenger_details(&missing_name, now),
            Err(ValidationError::Required { field }) if field == "passenger name"
        ));

        let mut missing_time = form();
        missing_time.time = String::new();
        assert!(matches!(
            validate_passenger_details(&missing_time, now),
            Err(ValidationError::Required { field }) if field == "time"
        ));

        let mut bad_date = form();
        bad_date.date = "01/07/2026".to_string();
        assert!(matches!(
            validate_passenger_details(&bad_date, now),
            Err(ValidationError::InvalidFormat { field, .. }) if field == "date"
        ));
    }

    #[test]
    fn test_booking_in_the_past_respects_grace() {
        // 14:30 booked at 14:34: inside the grace window
        assert!(validate_passenger_details(&form(), at("2026-07-01", "14:34:00")).is_ok());

        // 14:30 booked at 14:36: too late
        assert!(matches!(
            validate_passenger_details(&form(), at("2026-07-01", "14:36:00")),
            Err(ValidationError::InPast { .. })
        ));
    }

    #[test]
    fn test_default_pickup_slot() {
        let cases = [
            ("10:07:31", "2026-07-01", "11:15"),
            ("10:15:00", "2026-07-01", "11:15"),
            ("10:52:10", "2026-07-01", "12:00"),
            ("10:00:59", "2026-07-01", "11:00"),
            ("22:50:00", "2026-07-01", "00:00"),
            ("23:50:00", "2026-07-01", "01:00"),
        ];

        for (now, date, time) in cases {
            let (slot_date, slot_time) = default_pickup_slot(at("2026-07-01", now));
            assert_eq!(slot_date.format(DATE_FORMAT).to_string(), date, "date for {now}");
            assert_eq!(slot_time.format(TIME_FORMAT).to_string(), time, "time for {now}");
        }
    }
}
