//! # Plain-Text View
//!
//! Renders command results for the terminal. Pure string building, so every
//! layout rule is unit tested without a session.
//!
//! ## Budget Card
//! ```text
//! ┌───────────────────────────────────────┐
//! │ Base price:           50.00 €         │
//! │ Discount (SUMMER10): -10.00 €         │ ◄── only with a voucher
//! │ Subtotal:             40.00 €         │
//! │ VAT (6%):              2.40 €         │ ◄── "VAT: N/A" without a rate
//! │ Total:                42.40 €         │
//! │ Duration:             40 min          │
//! └───────────────────────────────────────┘
//! ```

use ridebook_client::AddressSuggestion;
use ridebook_core::validation::COUNTRY_CODES;
use ridebook_core::money::NOT_AVAILABLE;
use ridebook_core::{format_amount, BookingConfirmation, DerivedTotals, Money, DEFAULT_CURRENCY};

use crate::commands::address::Stop;
use crate::commands::config::ConfigView;

const LABEL_WIDTH: usize = 22;

fn currency_symbol(currency: &str) -> &str {
    match currency {
        "EUR" => "€",
        other => other,
    }
}

/// Amount with its currency suffix, or `N/A`.
pub fn amount_in(amount: Option<Money>, currency: &str) -> String {
    match amount {
        Some(_) => format!("{} {}", format_amount(amount), currency_symbol(currency)),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn line(label: &str, value: &str) -> String {
    format!("{:<width$}{}", format!("{label}:"), value, width = LABEL_WIDTH)
}

/// The budget card lines.
pub fn render_totals(totals: &DerivedTotals) -> String {
    let money = |amount: Option<Money>| amount_in(amount, &totals.currency);
    let mut lines = vec![line("Base price", &money(Some(totals.original_pre_vat)))];

    if let Some(code) = &totals.voucher_code {
        lines.push(line(
            &format!("Discount ({code})"),
            &format!("-{}", money(Some(totals.discount_amount))),
        ));
        lines.push(line("Subtotal", &money(Some(totals.pre_vat))));
    }

    let vat_label = match totals.vat_rate {
        Some(rate) => format!("VAT ({}%)", rate.percent().normalize()),
        None => "VAT".to_string(),
    };
    lines.push(line(&vat_label, &money(totals.vat_amount)));
    lines.push(line("Total", &money(totals.total_with_vat)));
    lines.push(line("Duration", &format!("{} min", totals.duration_minutes)));

    lines.join("\n")
}

/// The line shown after the booking service accepted a request.
///
/// The confirmation carries no currency; totals are always in the default one.
pub fn confirmation_message(confirmation: &BookingConfirmation) -> String {
    let mut message = format!(
        "Booking submitted! ID: {}. Total: {}.",
        confirmation.booking_id,
        amount_in(confirmation.total_with_vat, DEFAULT_CURRENCY)
    );
    if let Some(extra) = confirmation.message.as_deref().filter(|m| !m.trim().is_empty()) {
        message.push(' ');
        message.push_str(extra.trim());
    }
    message
}

/// Numbered suggestion list; the numbers are what `pickup <n>` refers to.
pub fn render_suggestions(suggestions: &[AddressSuggestion]) -> String {
    if suggestions.is_empty() {
        return "No matching addresses".to_string();
    }
    suggestions
        .iter()
        .enumerate()
        .map(|(i, s)| {
            if s.context.is_empty() {
                format!("{:>2}. {}", i + 1, s.label)
            } else {
                format!("{:>2}. {} ({})", i + 1, s.label, s.context)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Confirms which full address a picked suggestion put into the trip.
pub fn picked_message(stop: Stop, value: &str) -> String {
    format!("{stop}: {value}")
}

/// Supported dialling codes, marking the configured default.
pub fn render_country_codes(default_code: &str) -> String {
    COUNTRY_CODES
        .iter()
        .map(|(country, code)| {
            if *code == default_code {
                format!("{country} {code} (default)")
            } else {
                format!("{country} {code}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_config(view: &ConfigView) -> String {
    let set = |flag: bool| if flag { "set" } else { "not set" };
    [
        line("Backend", &view.backend_url),
        line("Timeout", &format!("{}s", view.timeout_secs)),
        line("Auth token", set(view.auth_token_set)),
        line(
            "Autocomplete",
            if view.geocode_enabled {
                "enabled"
            } else {
                "disabled (no API key)"
            },
        ),
        line("Geocode country", &view.geocode_country),
        line("Country code", &view.default_country_code),
    ]
    .join("\n")
}
