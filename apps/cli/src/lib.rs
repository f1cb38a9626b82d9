//! # Ridebook CLI Library
//!
//! Core library for the Ridebook booking front end.
//! This is the main entry point that loads configuration and runs the REPL.
//!
//! ## Module Organization
//! ```text
//! ridebook_cli/
//! ├── lib.rs          ◄─── You are here (startup & REPL loop)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   └── session.rs  ◄─── PricingSession + single-flight flags
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   ├── quote.rs    ◄─── Budget / flip-back commands
//! │   ├── voucher.rs  ◄─── Voucher command
//! │   ├── booking.rs  ◄─── Booking commands
//! │   ├── address.rs  ◄─── Autocomplete command
//! │   └── config.rs   ◄─── Configuration view
//! ├── repl.rs         ◄─── Line parser and dispatcher
//! ├── view.rs         ◄─── Plain-text rendering
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Concurrency
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    REPL Loop                                            │
//! │                                                                         │
//! │  stdin line ──► parse_line ──► local command? ──► execute inline        │
//! │                                     │                                   │
//! │                                     └─ remote ──► tokio::spawn(execute) │
//! │                                                                         │
//! │  The prompt returns while a request runs, so "back" can overtake a     │
//! │  pending quote. Session tickets make the late response a no-op and     │
//! │  the in-flight flags turn a repeated trigger into a BUSY error.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod repl;
pub mod state;
pub mod view;

use std::env;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use ridebook_client::{
    AddressLookup, AddressSuggester, BookingBackend, ClientConfig, ClientResult, GeocodeClient,
    HttpBackend,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use commands::address::AddressPicks;
use repl::{execute, parse_line, Reply};
use state::SessionState;

/// Everything a command may need, shared across spawned requests.
pub struct App {
    pub session: SessionState,
    pub backend: Arc<dyn BookingBackend>,
    pub suggester: AddressSuggester,
    pub picks: AddressPicks,
    pub config: ClientConfig,
}

impl App {
    /// Wires the given collaborators around a fresh session.
    pub fn new(
        config: ClientConfig,
        backend: Arc<dyn BookingBackend>,
        lookup: Arc<dyn AddressLookup>,
    ) -> Self {
        let suggester = AddressSuggester::new(lookup, config.geocode.debounce());
        App {
            session: SessionState::new(),
            backend,
            suggester,
            picks: AddressPicks::default(),
            config,
        }
    }

    /// Builds the HTTP backend and geocoder from configuration.
    pub fn from_config(config: ClientConfig) -> ClientResult<Self> {
        let backend = Arc::new(HttpBackend::new(&config.backend)?);
        let geocoder = Arc::new(GeocodeClient::new(&config.geocode, config.timeout())?);
        Ok(App::new(config, backend, geocoder))
    }
}

/// Command-line options.
#[derive(Debug, Default)]
struct Options {
    config_path: Option<PathBuf>,
    help: bool,
}

fn parse_args(args: &[String]) -> anyhow::Result<Options> {
    let mut options = Options::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                let path = args
                    .get(i + 1)
                    .context("--config needs a file path")?;
                options.config_path = Some(PathBuf::from(path));
                i += 1;
            }
            "--help" | "-h" => options.help = true,
            other => anyhow::bail!("unknown argument '{other}', try --help"),
        }
        i += 1;
    }
    Ok(options)
}

fn print_usage() {
    println!("Ridebook - ride budget, voucher and booking client");
    println!();
    println!("Usage: ridebook [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --config <PATH>  Configuration file (default: platform config dir)");
    println!("  -h, --help           Show this help message");
    println!();
    println!("Environment:");
    println!("  RIDEBOOK_API_BASE_URL, RIDEBOOK_API_TOKEN, RIDEBOOK_TIMEOUT_SECS,");
    println!("  RIDEBOOK_GEOCODE_API_KEY, RIDEBOOK_GEOCODE_BASE_URL,");
    println!("  RIDEBOOK_DEFAULT_COUNTRY_CODE, RUST_LOG");
}

/// Runs the interactive front end until `quit` or end of input.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Application Startup                               │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter, written to stderr             │
/// │     • Default: info,ridebook=debug; override with RUST_LOG              │
/// │                                                                         │
/// │  2. Load Configuration ───────────────────────────────────────────────► │
/// │     • defaults → ridebook.toml → RIDEBOOK_* environment                 │
/// │                                                                         │
/// │  3. Build Collaborators ──────────────────────────────────────────────► │
/// │     • HttpBackend (budget, voucher, booking)                            │
/// │     • GeocodeClient behind a debounced AddressSuggester                 │
/// │                                                                         │
/// │  4. REPL ─────────────────────────────────────────────────────────────► │
/// │     • one line per command, remote commands spawned                     │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let options = parse_args(&args)?;
    if options.help {
        print_usage();
        return Ok(());
    }

    init_tracing();
    info!("Starting Ridebook CLI");

    let config = ClientConfig::load(options.config_path).context("loading configuration")?;
    info!(backend = %config.backend.base_url, "Configuration loaded");
    if !config.geocode_enabled() {
        warn!("No geocoding API key configured; address suggestions are disabled");
    }

    let app = Arc::new(App::from_config(config).context("building service clients")?);

    println!("Ridebook. Type 'help' for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt();
        let Some(line) = lines.next_line().await.context("reading input")? else {
            break;
        };

        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("error: {e}");
                continue;
            }
        };

        let now = chrono::Local::now().naive_local();
        if command.is_remote() {
            let app = Arc::clone(&app);
            tokio::spawn(async move {
                if let Reply::Text(text) = execute(&app, command, now).await {
                    println!("\n{text}");
                    prompt();
                }
            });
            continue;
        }

        match execute(&app, command, now).await {
            Reply::Text(text) => println!("{text}"),
            Reply::Silent => {}
            Reply::Quit => break,
        }
    }

    info!("Ridebook CLI stopped");
    Ok(())
}

fn prompt() {
    print!("> ");
    // A failed flush only loses the prompt
    let _ = std::io::stdout().flush();
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=ridebook=trace` - Show trace for ridebook crates only
/// - Default: INFO, DEBUG for ridebook crates
///
/// Logs go to stderr so they never interleave with REPL output on stdout.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ridebook=debug,reqwest=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("ridebook")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_args() {
        let options = parse_args(&args(&["--config", "/tmp/ridebook.toml"])).unwrap();
        assert_eq!(options.config_path, Some(PathBuf::from("/tmp/ridebook.toml")));
        assert!(!options.help);

        assert!(parse_args(&args(&["-h"])).unwrap().help);
        assert!(parse_args(&args(&[])).unwrap().config_path.is_none());
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(&args(&["--config"])).is_err());
        assert!(parse_args(&args(&["--verbose"])).is_err());
    }

    #[test]
    fn test_app_from_default_config() {
        let app = App::from_config(ClientConfig::default()).unwrap();
        assert!(app.session.busy_actions().is_empty());
        assert_eq!(app.config.booking.default_country_code, "+351");
    }
}
