//! Domain types and models

pub mod interval;
pub mod options;
pub mod record;

use serde::{Deserialize, Serialize};

use crate::impl_domain_enum_conversions;

// Re-export for convenience
pub use interval::{ActivationPolicy, FieldUpdate, Interval, IntervalPatch, IntervalState};
pub use options::{check_identifier, DateRangeOptions, DateRangesOptions};
pub use record::{DateRangeRecord, ParentRef};

/// Direction for date-range ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Earliest first (`start`, then `end`).
    #[default]
    Ascending,
    /// Latest first (`end`, then `start`).
    Descending,
}

impl_domain_enum_conversions!(SortDirection {
    Ascending => "asc",
    Descending => "desc",
});

impl SortDirection {
    /// SQL keyword for this direction.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// How a parent entity is being removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteMode {
    /// Row is flagged as deleted; child ranges are kept.
    Soft,
    /// Row is removed; child ranges are removed with it.
    Hard,
}

impl_domain_enum_conversions!(DeleteMode {
    Soft => "soft",
    Hard => "hard",
});
