//! Shared test helpers for `daterange-core` integration tests.
//!
//! In-memory stores standing in for the storage collaborators, with knobs
//! to inject write failures.

#![allow(dead_code)]

pub mod stores;

use chrono::{DateTime, TimeZone, Utc};

pub use stores::{InMemoryRangeStore, InMemoryRowStore, Parent, Row};

/// Midnight UTC on the given day.
pub fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}
