//! Activation for entities owning exactly one date range inline

pub mod controller;
pub mod ports;

pub use controller::{BulkReport, SingleRangeController};
