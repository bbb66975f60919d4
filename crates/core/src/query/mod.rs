//! Storage-agnostic query scopes
//!
//! Filters and orderings are built as data and handed to a storage port,
//! which compiles them for its backend. Every filter can also be evaluated
//! in memory with the same result as the matching
//! [`ActivityEvaluator`](crate::ActivityEvaluator) method.

pub mod builder;
pub mod ordering;
pub mod parent;
pub mod predicate;

pub use builder::PredicateBuilder;
pub use ordering::{DateRangeOrder, OrderTerm, ParentOrder};
pub use parent::{ParentPredicate, ParentScopes};
pub use predicate::{Comparison, DateField, Predicate};
