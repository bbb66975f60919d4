//! Database implementations

pub mod date_range_repository;
pub mod manager;
pub mod single_range_repository;
pub mod sql;

pub use date_range_repository::*;
pub use manager::*;
pub use single_range_repository::*;
pub use sql::{ParentTable, SqlParam};
