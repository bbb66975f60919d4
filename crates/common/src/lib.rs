//! Modular common utilities shared across the date-range crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: clock abstraction and day-boundary helpers
//! - `test-utils`: deterministic [`time::MockClock`] for tests

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod time;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "foundation")]
pub use time::{end_of_day, start_of_day, Clock, SystemClock};
#[cfg(feature = "test-utils")]
pub use time::MockClock;
