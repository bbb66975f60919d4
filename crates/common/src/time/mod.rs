//! Time utilities and abstractions
//!
//! - **Clock abstractions**: real and mock wall-clock time, so every "now"
//!   read can be injected and controlled in tests
//! - **[`day`]**: day-boundary truncation used by range-window comparisons
//!
//! ## Usage
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use daterange_common::time::{end_of_day, start_of_day};
//!
//! let t = Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap();
//! assert_eq!(start_of_day(t), Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap());
//! assert!(end_of_day(t) > Utc.with_ymd_and_hms(2024, 3, 5, 23, 59, 59).unwrap());
//! ```

pub mod clock;
pub mod day;

// Re-export commonly used items
#[cfg(feature = "test-utils")]
pub use clock::MockClock;
pub use clock::{Clock, SystemClock};
pub use day::{end_of_day, start_of_day};
