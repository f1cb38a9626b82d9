//! # ridebook-client: Network Collaborators for Ridebook
//!
//! Everything in the booking flow that leaves the process lives here:
//! the pricing / voucher / booking backend, the address geocoder, and the
//! configuration that points at them.
//!
//! ## Modules
//!
//! - [`backend`] - `BookingBackend` trait and its JSON/HTTP implementation
//! - [`geocode`] - OpenRouteService autocomplete, suggestion shaping, debounce
//! - [`wire`] - Request/response bodies and their mapping to core types
//! - [`config`] - `ClientConfig` (defaults → TOML → env)
//! - [`error`] - `ClientError`
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use ridebook_client::{BookingBackend, ClientConfig, HttpBackend};
//! use ridebook_core::TripRequest;
//!
//! # async fn run() -> ridebook_client::ClientResult<()> {
//! let config = ClientConfig::load(None)?;
//! let backend = HttpBackend::new(&config.backend)?;
//!
//! let quote = backend
//!     .calculate_budget(&TripRequest {
//!         pickup: "Lisbon Airport".into(),
//!         dropoff: "Sintra".into(),
//!         passengers: 2,
//!         bags: 1,
//!     })
//!     .await?;
//! println!("{}", quote.original_pre_vat);
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod geocode;
pub mod wire;

pub use backend::{BookingBackend, HttpBackend};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use geocode::{AddressLookup, AddressSuggester, AddressSuggestion, Debouncer, GeocodeClient};
