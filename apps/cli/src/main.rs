//! # Ridebook CLI Entry Point
//!
//! ## Application Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Ridebook CLI                                     │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Terminal: quote / voucher / book / back / suggest               │  │
//! │  └──────────────────────────────┬───────────────────────────────────┘  │
//! │                                 ▼                                       │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  ridebook-cli: REPL, commands, SessionState                     │  │
//! │  └──────────────────────────────┬───────────────────────────────────┘  │
//! │                                 ▼                                       │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  ridebook-core: PricingSession, totals, validation              │  │
//! │  │  ridebook-client: HTTP backend, geocoder, config                │  │
//! │  └──────────────────────────────┬───────────────────────────────────┘  │
//! │                                 ▼                                       │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Booking API  /calculate-budget /validate-voucher               │  │
//! │  │               /submit-booking    + openrouteservice autocomplete │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // The actual setup is in lib.rs for testability
    ridebook_cli::run().await
}
