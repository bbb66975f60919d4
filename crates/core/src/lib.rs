//! # DateRange Core
//!
//! Pure temporal-activity logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - [`ActivityEvaluator`]: started / ended / active questions for one interval
//! - [`PredicateBuilder`]: storage-agnostic filters mirroring the evaluator
//! - Port interfaces (traits) for the storage collaborators
//! - Activation controllers for single- and multi-range entities
//!
//! ## Architecture Principles
//! - Only depends on `daterange-common` and `daterange-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits; "now" comes from an injected
//!   [`Clock`](daterange_common::Clock)

pub mod activity;
pub mod multi;
pub mod query;
pub mod single;

// Re-export specific items to avoid ambiguity
pub use activity::ActivityEvaluator;
pub use multi::ports::{MultiRangeActivatable, MultiRangeStore};
pub use multi::{Activation, DeactivationReport, MultiRangeController};
pub use query::{
    Comparison, DateField, DateRangeOrder, OrderTerm, ParentOrder, ParentPredicate, ParentScopes,
    Predicate, PredicateBuilder,
};
pub use single::ports::{SingleRangeActivatable, SingleRangeStore};
pub use single::{BulkReport, SingleRangeController};
