//! # REPL
//!
//! Line parser and dispatcher for the interactive front end.
//!
//! ## Grammar
//! ```text
//! quote   [<pickup>] | [<dropoff>] [| <passengers> [| <bags>]]
//! voucher <code>
//! book    <name> | <phone> [| <date> [| <time> [| <instructions> [| <country code>]]]]
//! back                      flip the budget card back (discard quote)
//! show                      current totals
//! suggest <partial address> address autocomplete
//! pickup <n> | dropoff <n>  use suggestion n for that end of the trip
//! codes                     supported dialling codes
//! config                    effective configuration
//! help | quit
//! ```
//!
//! Fields are separated by `|` so addresses may contain commas and spaces.
//! Empty optional fields fall back to their defaults, and a blank pickup or
//! drop-off falls back to the picked suggestion.

use chrono::NaiveDateTime;
use ridebook_core::validation::PassengerForm;
use ridebook_core::TripRequest;
use thiserror::Error;

use crate::commands::address::{self, Stop};
use crate::commands::{booking, config, quote, voucher};
use crate::error::{ApiError, ErrorCode};
use crate::view;
use crate::App;

pub const HELP: &str = "\
Commands:
  quote [<pickup>] | [<dropoff>] [| <passengers> [| <bags>]]
                                                           price a trip
  voucher <code>                                           apply a discount code
  book <name> | <phone> [| <date> [| <time> [| <instructions> [| <country code>]]]]
                                                           submit the booking
  back                                                     discard the quote
  show                                                     show current totals
  suggest <partial address>                                address autocomplete
  pickup <n> / dropoff <n>                                 use suggestion n
  codes                                                    list dialling codes
  config                                                   show configuration
  help                                                     this text
  quit                                                     exit";

const QUOTE_USAGE: &str = "quote [<pickup>] | [<dropoff>] [| <passengers> [| <bags>]]";
const PICK_USAGE: &str = "pickup <n> | dropoff <n>";
const BOOK_USAGE: &str = "book <name> | <phone> [| <date> [| <time> [| <instructions> [| <country code>]]]]";

// =============================================================================
// Parsing
// =============================================================================

/// A line that could not be turned into a command.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command '{0}', type 'help' for a list")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("{field} must be a whole number, got '{value}'")]
    NotANumber { field: &'static str, value: String },
}

/// Passenger fields as typed; blanks are filled from the form defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookArgs {
    pub name: String,
    pub phone: String,
    pub date: Option<String>,
    pub time: Option<String>,
    pub instructions: String,
    pub country_code: Option<String>,
}

impl BookArgs {
    /// Overlays the typed fields on `defaults`.
    pub fn into_form(self, defaults: PassengerForm) -> PassengerForm {
        PassengerForm {
            name: self.name,
            phone: self.phone,
            country_code: self.country_code.unwrap_or(defaults.country_code),
            date: self.date.unwrap_or(defaults.date),
            time: self.time.unwrap_or(defaults.time),
            instructions: self.instructions,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quote(TripRequest),
    Voucher(String),
    Book(BookArgs),
    Back,
    Show,
    Suggest(String),
    Pick(Stop, usize),
    Codes,
    Config,
    Help,
    Quit,
}

impl Command {
    /// True for commands that wait on a remote service.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Command::Quote(_) | Command::Voucher(_) | Command::Book(_) | Command::Suggest(_)
        )
    }
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Command>, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "quote" => Command::Quote(parse_trip(rest)?),
        "voucher" => Command::Voucher(rest.to_string()),
        "book" => Command::Book(parse_book(rest)?),
        "back" => Command::Back,
        "show" => Command::Show,
        "suggest" => Command::Suggest(rest.to_string()),
        "pickup" => Command::Pick(Stop::Pickup, parse_pick(rest)?),
        "dropoff" => Command::Pick(Stop::Dropoff, parse_pick(rest)?),
        "codes" => Command::Codes,
        "config" => Command::Config,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn fields(rest: &str) -> Vec<String> {
    if rest.is_empty() {
        return Vec::new();
    }
    rest.split('|').map(|f| f.trim().to_string()).collect()
}

fn optional(fields: &[String], index: usize) -> Option<String> {
    fields.get(index).filter(|f| !f.is_empty()).cloned()
}

fn number(field: &'static str, value: Option<String>, default: u32) -> Result<u32, ParseError> {
    match value {
        None => Ok(default),
        Some(text) => text
            .parse()
            .map_err(|_| ParseError::NotANumber { field, value: text }),
    }
}

fn parse_trip(rest: &str) -> Result<TripRequest, ParseError> {
    let fields = fields(rest);
    if fields.len() > 4 {
        return Err(ParseError::Usage(QUOTE_USAGE));
    }
    Ok(TripRequest {
        pickup: optional(&fields, 0).unwrap_or_default(),
        dropoff: optional(&fields, 1).unwrap_or_default(),
        passengers: number("passengers", optional(&fields, 2), 1)?,
        bags: number("bags", optional(&fields, 3), 0)?,
    })
}

fn parse_pick(rest: &str) -> Result<usize, ParseError> {
    if rest.is_empty() {
        return Err(ParseError::Usage(PICK_USAGE));
    }
    rest.parse().map_err(|_| ParseError::NotANumber {
        field: "suggestion number",
        value: rest.to_string(),
    })
}

fn parse_book(rest: &str) -> Result<BookArgs, ParseError> {
    let fields = fields(rest);
    if fields.len() < 2 || fields.len() > 6 {
        return Err(ParseError::Usage(BOOK_USAGE));
    }
    Ok(BookArgs {
        name: fields[0].clone(),
        phone: fields[1].clone(),
        date: optional(&fields, 2),
        time: optional(&fields, 3),
        instructions: optional(&fields, 4).unwrap_or_default(),
        country_code: optional(&fields, 5),
    })
}

// =============================================================================
// Dispatch
// =============================================================================

/// What the loop should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    /// Nothing to show (e.g. a superseded or stale result)
    Silent,
    Quit,
}

fn error_text(err: &ApiError) -> String {
    format!("error: {}", err.message)
}

fn reply<T>(result: Result<T, ApiError>, render: impl FnOnce(T) -> String) -> Reply {
    match result {
        Ok(value) => Reply::Text(render(value)),
        Err(err) if err.code == ErrorCode::StaleResponse => Reply::Silent,
        Err(err) => Reply::Text(error_text(&err)),
    }
}

/// Runs one command against the app.
///
/// `now` is local wall-clock time, used for booking defaults and validation.
pub async fn execute(app: &App, command: Command, now: NaiveDateTime) -> Reply {
    match command {
        Command::Quote(trip) => reply(
            quote::calculate_budget(&app.session, app.backend.as_ref(), app.picks.fill(trip))
                .await,
            |totals| view::render_totals(&totals),
        ),
        Command::Voucher(code) => reply(
            voucher::apply_voucher(&app.session, app.backend.as_ref(), &code).await,
            |response| {
                let status = if response.applied { "Voucher applied" } else { "Voucher not applied" };
                format!(
                    "{status}: {}\n{}",
                    response.message,
                    view::render_totals(&response.totals)
                )
            },
        ),
        Command::Book(args) => {
            let form = args.into_form(booking::form_defaults(&app.config.booking, now));
            reply(
                booking::submit_booking(&app.session, app.backend.as_ref(), &form, now).await,
                |response| response.message,
            )
        }
        Command::Back => {
            quote::flip_back(&app.session);
            Reply::Text("Budget discarded; edit the trip and quote again".to_string())
        }
        Command::Show => {
            let mut text = match quote::get_totals(&app.session) {
                Some(totals) => view::render_totals(&totals),
                None => "No quote yet. Try: quote <pickup> | <dropoff>".to_string(),
            };
            let busy = app.session.busy_actions();
            if !busy.is_empty() {
                let names: Vec<String> = busy.iter().map(ToString::to_string).collect();
                text.push_str(&format!("\nWaiting on: {}", names.join(", ")));
            }
            Reply::Text(text)
        }
        Command::Suggest(query) => {
            match address::suggest_addresses(&app.suggester, &app.picks, &query).await {
                Ok(Some(found)) => Reply::Text(view::render_suggestions(&found)),
                Ok(None) => Reply::Silent,
                Err(err) => Reply::Text(error_text(&err)),
            }
        }
        Command::Pick(stop, number) => reply(
            address::pick_address(&app.picks, stop, number),
            |value| view::picked_message(stop, &value),
        ),
        Command::Codes => Reply::Text(view::render_country_codes(
            &app.config.booking.default_country_code,
        )),
        Command::Config => Reply::Text(view::render_config(&config::get_config(&app.config))),
        Command::Help => Reply::Text(HELP.to_string()),
        Command::Quit => Reply::Quit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::quote::calculate_budget;
    use crate::commands::testing::{pricing, summer10, trip, ScriptedBackend};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use ridebook_client::{AddressLookup, AddressSuggestion, ClientConfig, ClientResult, GeocodeClient};
    use std::sync::Arc;

    struct TwoStreets;

    #[async_trait]
    impl AddressLookup for TwoStreets {
        async fn autocomplete(&self, _query: &str) -> ClientResult<Vec<AddressSuggestion>> {
            Ok(vec![
                AddressSuggestion {
                    label: "Rua Augusta 24".to_string(),
                    context: "Lisboa".to_string(),
                    value: "Rua Augusta 24, 1100-053 Lisboa, Portugal".to_string(),
                },
                AddressSuggestion {
                    label: "Rua Augusta 2".to_string(),
                    context: "Porto".to_string(),
                    value: "Rua Augusta 2, Porto, Portugal".to_string(),
                },
            ])
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 7, 1)
            .unwrap()
            .and_hms_opt(9, 7, 0)
            .unwrap()
    }

    fn app() -> (App, Arc<ScriptedBackend>) {
        let config = ClientConfig::default();
        let backend = Arc::new(ScriptedBackend::new());
        let geocoder = GeocodeClient::new(&config.geocode, config.timeout()).unwrap();
        let app = App::new(config, backend.clone(), Arc::new(geocoder));
        (app, backend)
    }

    #[test]
    fn test_parse_quote() {
        let command = parse_line("quote Lisbon Airport, T1 | Sintra | 3 | 2").unwrap();
        assert_eq!(
            command,
            Some(Command::Quote(TripRequest {
                pickup: "Lisbon Airport, T1".to_string(),
                dropoff: "Sintra".to_string(),
                passengers: 3,
                bags: 2,
            }))
        );

        let Some(Command::Quote(trip)) = parse_line("QUOTE Porto | Braga").unwrap() else {
            panic!("expected a quote command");
        };
        assert_eq!(trip.passengers, 1);
        assert_eq!(trip.bags, 0);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse_line("quote Porto | Braga | 1 | 0 | 9"),
            Err(ParseError::Usage(QUOTE_USAGE))
        );
        assert_eq!(parse_line("pickup"), Err(ParseError::Usage(PICK_USAGE)));
        assert_eq!(
            parse_line("dropoff first"),
            Err(ParseError::NotANumber {
                field: "suggestion number",
                value: "first".to_string()
            })
        );
        assert_eq!(
            parse_line("quote Porto | Braga | two"),
            Err(ParseError::NotANumber {
                field: "passengers",
                value: "two".to_string()
            })
        );
        assert_eq!(
            parse_line("quote Porto | Braga | 1 | -1"),
            Err(ParseError::NotANumber {
                field: "bags",
                value: "-1".to_string()
            })
        );
        assert_eq!(parse_line("fly away"), Err(ParseError::Unknown("fly".to_string())));
        assert_eq!(parse_line("book Ana"), Err(ParseError::Usage(BOOK_USAGE)));
    }

    #[test]
    fn test_parse_book_with_blanks() {
        let Some(Command::Book(args)) =
            parse_line("book Ana Silva | 912 345 678 | | 14:30 | Gate B").unwrap()
        else {
            panic!("expected a book command");
        };
        assert_eq!(args.name, "Ana Silva");
        assert_eq!(args.date, None);
        assert_eq!(args.time.as_deref(), Some("14:30"));
        assert_eq!(args.instructions, "Gate B");
        assert_eq!(args.country_code, None);

        let form = args.into_form(PassengerForm {
            country_code: "+351".to_string(),
            date: "2026-07-01".to_string(),
            time: "10:15".to_string(),
            ..PassengerForm::default()
        });
        assert_eq!(form.date, "2026-07-01");
        assert_eq!(form.time, "14:30");
        assert_eq!(form.country_code, "+351");
    }

    #[test]
    fn test_blank_and_simple_lines() {
        assert_eq!(parse_line("   "), Ok(None));
        assert_eq!(parse_line("back"), Ok(Some(Command::Back)));
        assert_eq!(parse_line("exit"), Ok(Some(Command::Quit)));
        assert_eq!(
            parse_line("voucher  summer10 "),
            Ok(Some(Command::Voucher("summer10".to_string())))
        );
        assert!(parse_line("suggest rua").unwrap().unwrap().is_remote());
        assert!(!Command::Show.is_remote());
        assert_eq!(parse_line("dropoff 2"), Ok(Some(Command::Pick(Stop::Dropoff, 2))));
        assert!(!Command::Pick(Stop::Pickup, 1).is_remote());

        let Some(Command::Quote(trip)) = parse_line("quote | Sintra").unwrap() else {
            panic!("expected a quote command");
        };
        assert_eq!(trip.pickup, "");
        assert_eq!(trip.dropoff, "Sintra");
    }

    #[tokio::test]
    async fn test_quote_voucher_book_flow() {
        let (app, backend) = app();
        backend.push_quote(Ok(pricing()));
        backend.push_voucher(Ok(summer10()));
        backend.push_booking(Ok(ridebook_core::BookingConfirmation {
            booking_id: "77".to_string(),
            total_with_vat: None,
            message: None,
            status: None,
            applied_voucher: None,
        }));

        let quote = parse_line("quote Lisbon Airport | Sintra | 3 | 2").unwrap().unwrap();
        let Reply::Text(text) = execute(&app, quote, now()).await else {
            panic!("expected text");
        };
        assert!(text.contains("53.00 €"));

        let voucher = parse_line("voucher summer10").unwrap().unwrap();
        let Reply::Text(text) = execute(&app, voucher, now()).await else {
            panic!("expected text");
        };
        assert!(text.starts_with("Voucher applied: 10 EUR discount applied"));
        assert!(text.contains("42.40 €"));

        let book = parse_line("book Ana | 912345678").unwrap().unwrap();
        let reply = execute(&app, book, now()).await;
        assert_eq!(reply, Reply::Text("Booking submitted! ID: 77. Total: N/A.".to_string()));

        let submitted = backend.submitted.lock().unwrap();
        assert_eq!(submitted[0].passenger.phone, "+351912345678");
        assert_eq!(submitted[0].passenger.time.to_string(), "10:15:00");
    }

    #[tokio::test]
    async fn test_errors_are_rendered() {
        let (app, _backend) = app();

        let reply = execute(&app, Command::Voucher("SUMMER10".to_string()), now()).await;

        let Reply::Text(text) = reply else {
            panic!("expected text");
        };
        assert!(text.starts_with("error: No active quote"));
    }

    #[tokio::test]
    async fn test_back_and_show() {
        let (app, backend) = app();
        backend.push_quote(Ok(pricing()));
        execute(&app, parse_line("quote A | B").unwrap().unwrap(), now()).await;

        execute(&app, Command::Back, now()).await;
        let Reply::Text(text) = execute(&app, Command::Show, now()).await else {
            panic!("expected text");
        };
        assert!(text.starts_with("No quote yet"));
        assert_eq!(execute(&app, Command::Quit, now()).await, Reply::Quit);
    }

    #[tokio::test(start_paused = true)]
    async fn test_picked_suggestion_is_quoted() {
        let config = ClientConfig::default();
        let backend = Arc::new(ScriptedBackend::new());
        let app = App::new(config, backend.clone(), Arc::new(TwoStreets));
        backend.push_quote(Ok(pricing()));

        let Reply::Text(list) = execute(&app, Command::Suggest("rua augusta".into()), now()).await
        else {
            panic!("expected text");
        };
        assert_eq!(list, " 1. Rua Augusta 24 (Lisboa)\n 2. Rua Augusta 2 (Porto)");

        let reply = execute(&app, parse_line("pickup 1").unwrap().unwrap(), now()).await;
        assert_eq!(
            reply,
            Reply::Text("Pickup: Rua Augusta 24, 1100-053 Lisboa, Portugal".to_string())
        );

        let reply = execute(&app, Command::Pick(Stop::Dropoff, 3), now()).await;
        assert_eq!(
            reply,
            Reply::Text("error: Pick a suggestion between 1 and 2".to_string())
        );

        execute(&app, parse_line("quote | Sintra | 2").unwrap().unwrap(), now()).await;
        let quoted = app
            .session
            .with_session(|s| s.quote().map(|q| (q.pickup.clone(), q.dropoff.clone())));
        assert_eq!(
            quoted,
            Some((
                "Rua Augusta 24, 1100-053 Lisboa, Portugal".to_string(),
                "Sintra".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_show_lists_pending_requests() {
        let config = ClientConfig::default();
        let (backend, gate) = ScriptedBackend::gated();
        let backend = Arc::new(backend);
        let geocoder = GeocodeClient::new(&config.geocode, config.timeout()).unwrap();
        let app = App::new(config, backend.clone(), Arc::new(geocoder));
        backend.push_quote(Ok(pricing()));

        let pending = tokio::spawn({
            let session = app.session.clone();
            let backend = backend.clone();
            async move { calculate_budget(&session, backend.as_ref(), trip()).await }
        });
        backend.entered.notified().await;

        let Reply::Text(text) = execute(&app, Command::Show, now()).await else {
            panic!("expected text");
        };
        assert!(text.ends_with("Waiting on: Quote"));

        gate.notify_one();
        pending.await.unwrap().unwrap();
        let Reply::Text(text) = execute(&app, Command::Show, now()).await else {
            panic!("expected text");
        };
        assert!(!text.contains("Waiting on"));
        assert!(text.contains("53.00 €"));
    }
}
