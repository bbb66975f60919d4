//! The date-range value type.
//!
//! An [`Interval`] is a possibly open-ended range with an optional start and
//! an optional end. Whether a missing start means "always started" or "never
//! started" is decided by the `start_optional` policy bit, which is fixed
//! when the interval is built from its owner's options.
//!
//! `start <= end` is not enforced; see [`Interval::is_inverted`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_domain_enum_conversions;

/// One date range plus its start-optional policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    /// Inclusive start instant. `None` is read through [`ActivationPolicy`].
    pub start: Option<DateTime<Utc>>,
    /// End instant. The interval counts as ended *at* this instant.
    pub end: Option<DateTime<Utc>>,
    /// `true` when a missing start means the interval has always been
    /// started.
    #[serde(default)]
    pub start_optional: bool,
}

impl Interval {
    /// Build an interval with an explicit policy.
    #[must_use]
    pub const fn new(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        start_optional: bool,
    ) -> Self {
        Self { start, end, start_optional }
    }

    /// Start-required interval beginning at `start` with no end.
    #[must_use]
    pub const fn starting_at(start: DateTime<Utc>) -> Self {
        Self::new(Some(start), None, false)
    }

    /// Interval with neither date set.
    #[must_use]
    pub const fn unbounded(start_optional: bool) -> Self {
        Self::new(None, None, start_optional)
    }

    /// Same dates, different start policy.
    #[must_use]
    pub const fn with_start_optional(mut self, start_optional: bool) -> Self {
        self.start_optional = start_optional;
        self
    }

    /// Policy applied when `start` is missing.
    #[must_use]
    pub const fn policy(&self) -> ActivationPolicy {
        if self.start_optional {
            ActivationPolicy::StartOptional
        } else {
            ActivationPolicy::StartRequired
        }
    }

    /// `start` is set.
    #[must_use]
    pub const fn has_start(&self) -> bool {
        self.start.is_some()
    }

    /// `end` is set.
    #[must_use]
    pub const fn has_end(&self) -> bool {
        self.end.is_some()
    }

    /// Both dates are set and `end` precedes `start`.
    ///
    /// Such intervals are stored and evaluated as-is: they can never be
    /// active, because every instant at or after `start` is also at or after
    /// `end`.
    #[must_use]
    pub fn is_inverted(&self) -> bool {
        matches!((self.start, self.end), (Some(start), Some(end)) if end < start)
    }

    /// Apply a field patch, returning the patched interval.
    #[must_use]
    pub fn patched(mut self, patch: &IntervalPatch) -> Self {
        patch.start.apply(&mut self.start);
        patch.end.apply(&mut self.end);
        self
    }
}

/// How a missing `start` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationPolicy {
    /// Missing start: active from the beginning of time.
    StartOptional,
    /// Missing start: not yet started.
    StartRequired,
}

/// Lifecycle state of one interval relative to an instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalState {
    /// Not started by the instant.
    Unstarted,
    /// Started and not ended.
    Active,
    /// Ended at or before the instant.
    Ended,
}

impl_domain_enum_conversions!(IntervalState {
    Unstarted => "unstarted",
    Active => "active",
    Ended => "ended",
});

/// Change to a single date field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum FieldUpdate {
    /// Leave the stored value alone.
    #[default]
    Unchanged,
    /// Write this instant.
    Set(DateTime<Utc>),
    /// Write `NULL`.
    Clear,
}

impl FieldUpdate {
    /// From an optional value: `Some` sets, `None` clears.
    #[must_use]
    pub const fn from_option(value: Option<DateTime<Utc>>) -> Self {
        match value {
            Some(instant) => Self::Set(instant),
            None => Self::Clear,
        }
    }

    /// `true` unless [`FieldUpdate::Unchanged`].
    #[must_use]
    pub const fn is_change(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }

    fn apply(self, slot: &mut Option<DateTime<Utc>>) {
        match self {
            Self::Unchanged => {}
            Self::Set(instant) => *slot = Some(instant),
            Self::Clear => *slot = None,
        }
    }
}

/// Field writes handed to the storage collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalPatch {
    /// Change to the start field.
    pub start: FieldUpdate,
    /// Change to the end field.
    pub end: FieldUpdate,
}

impl IntervalPatch {
    /// Set only the end field.
    #[must_use]
    pub const fn close_at(end: DateTime<Utc>) -> Self {
        Self { start: FieldUpdate::Unchanged, end: FieldUpdate::Set(end) }
    }

    /// Patch that writes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !self.start.is_change() && !self.end.is_change()
    }
}
