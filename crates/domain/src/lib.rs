//! # DateRange Domain
//!
//! Domain types for temporal-activity ("valid from / valid until") records.
//!
//! This crate contains:
//! - The [`Interval`] value type and its lifecycle state
//! - Field descriptors for single- and multi-range entities
//! - Domain error types and Result definitions
//! - Configuration structures and defaults
//!
//! ## Architecture
//! - No dependencies on other workspace crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
