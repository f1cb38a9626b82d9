//! # Session State
//!
//! Owns the pricing session and the "button disabled" flags.
//!
//! ## Thread Safety
//! The session is wrapped in `Arc<Mutex<T>>` because:
//! 1. Commands run on the tokio runtime and may overlap
//! 2. A response must be checked and applied under one lock
//! 3. The lock is never held across an `.await`
//!
//! ## Request Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Single-Flight Request                                │
//! │                                                                         │
//! │  begin(Action::Voucher) ──► FlightGuard     (second begin ──► Busy)    │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  with_session(|s| s.ticket())  ──► ticket (epoch 3)                     │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  backend call (.await, no lock held)                                    │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  with_session_mut(|s| { s.ensure_current(ticket)?; apply })            │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  FlightGuard dropped ──► action enabled again (on every exit path)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use ridebook_core::PricingSession;
use serde::Serialize;

/// A user-triggered request kind. At most one of each runs at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Action {
    Quote,
    Voucher,
    Booking,
}

impl Action {
    const ALL: [Action; 3] = [Action::Quote, Action::Voucher, Action::Booking];

    fn index(self) -> usize {
        match self {
            Action::Quote => 0,
            Action::Voucher => 1,
            Action::Booking => 2,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Quote => write!(f, "Quote"),
            Action::Voucher => write!(f, "Voucher"),
            Action::Booking => write!(f, "Booking"),
        }
    }
}

/// Thread-safe session state.
#[derive(Debug, Clone)]
pub struct SessionState {
    session: Arc<Mutex<PricingSession>>,
    in_flight: Arc<[AtomicBool; 3]>,
}

impl SessionState {
    /// Creates state around a fresh, empty session.
    pub fn new() -> Self {
        SessionState {
            session: Arc::new(Mutex::new(PricingSession::new())),
            in_flight: Arc::new([
                AtomicBool::new(false),
                AtomicBool::new(false),
                AtomicBool::new(false),
            ]),
        }
    }

    /// Executes a function with read access to the session.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let totals = session_state.with_session(|s| s.current_totals());
    /// ```
    pub fn with_session<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&PricingSession) -> R,
    {
        let session = self.session.lock().expect("Session mutex poisoned");
        f(&session)
    }

    /// Executes a function with write access to the session.
    pub fn with_session_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut PricingSession) -> R,
    {
        let mut session = self.session.lock().expect("Session mutex poisoned");
        f(&mut session)
    }

    /// Marks `action` as in flight, or returns `None` if it already is.
    pub fn begin(&self, action: Action) -> Option<FlightGuard> {
        self.in_flight[action.index()]
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightGuard {
                in_flight: Arc::clone(&self.in_flight),
                action,
            })
    }

    /// Returns true while a request for `action` is running.
    pub fn is_in_flight(&self, action: Action) -> bool {
        self.in_flight[action.index()].load(Ordering::Acquire)
    }

    /// Actions currently running, in a fixed order.
    pub fn busy_actions(&self) -> Vec<Action> {
        Action::ALL
            .into_iter()
            .filter(|a| self.is_in_flight(*a))
            .collect()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Releases the in-flight flag when dropped.
#[derive(Debug)]
pub struct FlightGuard {
    in_flight: Arc<[AtomicBool; 3]>,
    action: Action,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.in_flight[self.action.index()].store(false, Ordering::Release);
    }
}
