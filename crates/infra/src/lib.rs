//! # DateRange Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite storage for single- and multi-range entities
//! - Predicate and ordering compilation to SQL
//! - Configuration loading (environment, TOML, JSON)
//! - Tracing subscriber setup
//!
//! ## Architecture
//! - Implements traits defined in `daterange-core`
//! - Contains all "impure" code (I/O, blocking database calls)

pub mod config;
pub mod database;
pub mod errors;
pub mod observability;

// Re-export commonly used items
pub use database::{
    DatedRow, DbManager, ParentTable, SqliteDateRangeRepository, SqliteSingleRangeRepository,
};
pub use errors::InfraError;
