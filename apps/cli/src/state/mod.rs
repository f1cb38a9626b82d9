//! # Application State
//!
//! State shared by every command.
//!
//! ## State Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        App (lib.rs)                                     │
//! │                              │                                          │
//! │          ┌──────────────────┼──────────────────┐                       │
//! │          ▼                  ▼                  ▼                        │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌──────────────────┐          │
//! │  │ SessionState │  │ BookingBackend   │  │ AddressSuggester │          │
//! │  │              │  │                  │  │                  │          │
//! │  │  Arc<Mutex<  │  │  HTTP (or a      │  │  geocoder +      │          │
//! │  │   Pricing    │  │  scripted fake   │  │  debounce        │          │
//! │  │   Session>>  │  │  in tests)       │  │                  │          │
//! │  └──────────────┘  └──────────────────┘  └──────────────────┘          │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • SessionState: Arc<Mutex<T>> + one AtomicBool per action             │
//! │  • Backend / suggester: Send + Sync trait objects                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod session;

pub use session::{Action, FlightGuard, SessionState};
