//! Named query scopes as [`Predicate`] trees.
//!
//! Each scope mirrors the [`ActivityEvaluator`](crate::ActivityEvaluator)
//! method of the same meaning: for an interval carrying the builder's
//! policy, `builder.x(..).matches(&interval) == interval.x(..)`.

use chrono::{DateTime, Utc};
use daterange_common::time::{end_of_day, start_of_day};
use daterange_common::Clock;
use daterange_domain::{DateRangeOptions, Interval};

use super::predicate::{Comparison, DateField, Predicate};

/// Builds predicates for one start-optional policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredicateBuilder {
    start_optional: bool,
}

impl PredicateBuilder {
    /// Builder for the given policy.
    #[must_use]
    pub const fn new(start_optional: bool) -> Self {
        Self { start_optional }
    }

    /// Builder using the policy of an entity's options.
    #[must_use]
    pub const fn for_options(options: &DateRangeOptions) -> Self {
        Self::new(options.start_optional)
    }

    /// Builder using the policy carried by an interval.
    #[must_use]
    pub const fn for_interval(interval: &Interval) -> Self {
        Self::new(interval.start_optional)
    }

    /// Policy this builder encodes.
    #[must_use]
    pub const fn start_optional(&self) -> bool {
        self.start_optional
    }

    // ---- presence leaves ----

    /// Start is set.
    #[must_use]
    pub const fn has_start(&self) -> Predicate {
        Predicate::is_not_null(DateField::Start)
    }

    /// End is set.
    #[must_use]
    pub const fn has_end(&self) -> Predicate {
        Predicate::is_not_null(DateField::End)
    }

    /// Start is missing.
    #[must_use]
    pub const fn doesnt_have_start(&self) -> Predicate {
        Predicate::is_null(DateField::Start)
    }

    /// End is missing.
    #[must_use]
    pub const fn doesnt_have_end(&self) -> Predicate {
        Predicate::is_null(DateField::End)
    }

    // ---- instant scopes ----

    /// Started on or before `at`.
    #[must_use]
    pub fn started_by_date(&self, at: DateTime<Utc>) -> Predicate {
        self.start_or_missing(Predicate::compare(DateField::Start, Comparison::Le, at))
    }

    /// Started on or after `at`.
    #[must_use]
    pub fn started_on_or_after(&self, at: DateTime<Utc>) -> Predicate {
        self.start_or_missing(Predicate::compare(DateField::Start, Comparison::Ge, at))
    }

    /// Not started by `at`.
    ///
    /// Under the start-optional policy a missing start is always started,
    /// so only a start after `at` qualifies.
    #[must_use]
    pub fn hasnt_started_by(&self, at: DateTime<Utc>) -> Predicate {
        let later = Predicate::compare(DateField::Start, Comparison::Gt, at);
        if self.start_optional {
            later
        } else {
            self.doesnt_have_start().or(later)
        }
    }

    /// Ended on or before `at`.
    #[must_use]
    pub fn ended_by(&self, at: DateTime<Utc>) -> Predicate {
        Predicate::compare(DateField::End, Comparison::Le, at)
    }

    /// Still open, or ending after `at`.
    #[must_use]
    pub fn has_not_ended_by(&self, at: DateTime<Utc>) -> Predicate {
        self.doesnt_have_end().or(Predicate::compare(DateField::End, Comparison::Gt, at))
    }

    /// Started by `at` and not ended by `at`.
    #[must_use]
    pub fn active_on(&self, at: DateTime<Utc>) -> Predicate {
        self.started_by_date(at).and(self.has_not_ended_by(at))
    }

    /// Not started by `at`, or ended by `at`.
    #[must_use]
    pub fn inactive_on(&self, at: DateTime<Utc>) -> Predicate {
        self.hasnt_started_by(at).or(self.ended_by(at))
    }

    // ---- window scopes ----

    /// Start inside the whole-day window `[from, to]`.
    #[must_use]
    pub fn started_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Predicate {
        self.start_or_missing(Predicate::between(
            DateField::Start,
            start_of_day(from),
            end_of_day(to),
        ))
    }

    /// End inside the whole-day window `[from, to]`. Open intervals never
    /// qualify.
    #[must_use]
    pub fn ended_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Predicate {
        Predicate::between(DateField::End, start_of_day(from), end_of_day(to))
    }

    /// Overlaps the window.
    #[must_use]
    pub fn date_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Predicate {
        self.started_by_date(to).and(Predicate::any([
            self.started_on_or_after(from),
            self.ended_between(from, to),
            self.doesnt_have_end(),
        ]))
    }

    /// Contained in the window; excludes open intervals.
    #[must_use]
    pub fn date_within(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Predicate {
        self.started_between(from, to).and(self.ended_between(from, to))
    }

    // ---- "now" scopes ----

    /// [`Self::active_on`] at the clock's instant.
    #[must_use]
    pub fn active(&self, clock: &dyn Clock) -> Predicate {
        self.active_on(clock.now())
    }

    /// [`Self::inactive_on`] at the clock's instant.
    #[must_use]
    pub fn inactive(&self, clock: &dyn Clock) -> Predicate {
        self.inactive_on(clock.now())
    }

    /// [`Self::started_by_date`] at the clock's instant.
    #[must_use]
    pub fn started(&self, clock: &dyn Clock) -> Predicate {
        self.started_by_date(clock.now())
    }

    /// [`Self::ended_by`] at the clock's instant.
    #[must_use]
    pub fn ended(&self, clock: &dyn Clock) -> Predicate {
        self.ended_by(clock.now())
    }

    /// [`Self::has_not_ended_by`] at the clock's instant.
    #[must_use]
    pub fn has_not_ended(&self, clock: &dyn Clock) -> Predicate {
        self.has_not_ended_by(clock.now())
    }

    /// [`Self::hasnt_started_by`] at the clock's instant.
    #[must_use]
    pub fn hasnt_started(&self, clock: &dyn Clock) -> Predicate {
        self.hasnt_started_by(clock.now())
    }

    fn start_or_missing(&self, leaf: Predicate) -> Predicate {
        if self.start_optional {
            self.doesnt_have_start().or(leaf)
        } else {
            leaf
        }
    }
}
