//! Core abstractions for focusbubble.
//!
//! Time is injected through [`Clock`] so every component can be driven by a
//! simulated clock in tests.

mod clock;

pub use clock::{millis_to_datetime, Clock, ManualClock, SystemClock};
