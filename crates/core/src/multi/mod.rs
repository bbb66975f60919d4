//! Activation for entities owning a collection of child date ranges

pub mod controller;
pub mod ports;

pub use controller::{Activation, DeactivationReport, MultiRangeController};
