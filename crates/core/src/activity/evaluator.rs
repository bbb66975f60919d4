//! Point-in-time and window questions over a single interval.
//!
//! All methods are pure. Instant comparisons are inclusive on the start
//! side and treat the end instant as already ended, so an interval
//! `[start, end)` is active on `start` and inactive on `end`.

use chrono::{DateTime, Utc};
use daterange_common::time::{end_of_day, start_of_day};
use daterange_common::Clock;
use daterange_domain::{DateRangeRecord, Interval, IntervalState};

/// Activity questions answered from an [`Interval`].
///
/// Implementors only provide [`ActivityEvaluator::interval`]; every question
/// is derived from it, so entities owning an interval share one rule set.
pub trait ActivityEvaluator {
    /// The interval being evaluated.
    fn interval(&self) -> &Interval;

    /// Started on or before `at`.
    ///
    /// A missing start reads as started only under the start-optional
    /// policy.
    fn started_by(&self, at: DateTime<Utc>) -> bool {
        let interval = self.interval();
        interval.start.map_or(interval.start_optional, |start| start <= at)
    }

    /// Ended on or before `at`. A missing end never ends.
    fn ended_by(&self, at: DateTime<Utc>) -> bool {
        self.interval().end.is_some_and(|end| end <= at)
    }

    /// Started by `at` and not ended by `at`.
    fn active_on(&self, at: DateTime<Utc>) -> bool {
        self.started_by(at) && !self.ended_by(at)
    }

    /// Negation of [`ActivityEvaluator::started_by`].
    fn hasnt_started_by(&self, at: DateTime<Utc>) -> bool {
        !self.started_by(at)
    }

    /// Negation of [`ActivityEvaluator::ended_by`].
    fn has_not_ended_by(&self, at: DateTime<Utc>) -> bool {
        !self.ended_by(at)
    }

    /// Started on or after `at`; a missing start follows the policy.
    fn started_on_or_after(&self, at: DateTime<Utc>) -> bool {
        let interval = self.interval();
        interval.start.map_or(interval.start_optional, |start| start >= at)
    }

    /// Start falls within the whole-day window `[from, to]`.
    ///
    /// A missing start counts as inside any window under the start-optional
    /// policy.
    fn started_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        let interval = self.interval();
        interval
            .start
            .map_or(interval.start_optional, |start| within_days(start, from, to))
    }

    /// End falls within the whole-day window `[from, to]`.
    ///
    /// There is no fallback for a missing end: an open interval never ended
    /// inside a window.
    fn ended_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        self.interval().end.is_some_and(|end| within_days(end, from, to))
    }

    /// Overlaps the window: started by `to`, and either started on/after
    /// `from`, ended inside the window, or is still open.
    fn date_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        self.started_by(to)
            && (self.started_on_or_after(from)
                || self.ended_between(from, to)
                || !self.interval().has_end())
    }

    /// Contained in the window: both start and end inside it. Excludes
    /// every open-ended interval.
    fn date_within(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        self.started_between(from, to) && self.ended_between(from, to)
    }

    /// Lifecycle state at `at`.
    fn state_on(&self, at: DateTime<Utc>) -> IntervalState {
        if self.ended_by(at) {
            IntervalState::Ended
        } else if self.started_by(at) {
            IntervalState::Active
        } else {
            IntervalState::Unstarted
        }
    }

    /// [`ActivityEvaluator::started_by`] at the clock's current instant.
    fn has_started(&self, clock: &dyn Clock) -> bool {
        self.started_by(clock.now())
    }

    /// [`ActivityEvaluator::ended_by`] at the clock's current instant.
    fn has_ended(&self, clock: &dyn Clock) -> bool {
        self.ended_by(clock.now())
    }

    /// [`ActivityEvaluator::active_on`] at the clock's current instant.
    fn is_active(&self, clock: &dyn Clock) -> bool {
        self.active_on(clock.now())
    }
}

impl ActivityEvaluator for Interval {
    fn interval(&self) -> &Interval {
        self
    }
}

impl ActivityEvaluator for DateRangeRecord {
    fn interval(&self) -> &Interval {
        &self.interval
    }
}

fn within_days(value: DateTime<Utc>, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
    start_of_day(from) <= value && value <= end_of_day(to)
}
