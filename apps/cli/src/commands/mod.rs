//! # Commands Module
//!
//! Every user action the booking front end supports.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (exports)
//! ├── quote.rs    ◄─── calculate_budget, flip_back, get_totals
//! ├── voucher.rs  ◄─── apply_voucher
//! ├── booking.rs  ◄─── submit_booking, form_defaults
//! ├── config.rs   ◄─── get_config
//! └── address.rs  ◄─── suggest_addresses, pick_address
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  REPL line "voucher summer10"                                           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  async fn apply_voucher(                                                │
//! │      session: &SessionState,        ◄── only the state it needs        │
//! │      backend: &dyn BookingBackend,                                      │
//! │      code: &str,                                                        │
//! │  ) -> Result<VoucherResponse, ApiError>                                 │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  view.rs renders the response (or the ApiError message)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod address;
pub mod booking;
pub mod config;
pub mod quote;
pub mod voucher;
