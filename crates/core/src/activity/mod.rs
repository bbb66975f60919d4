//! Temporal-activity evaluation for a single interval

pub mod evaluator;

pub use evaluator::ActivityEvaluator;
