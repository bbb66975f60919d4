//! Parent-level filters for entities owning many child ranges.

use chrono::{DateTime, Utc};
use daterange_common::Clock;
use daterange_domain::{DateRangeOptions, Interval};
use serde::{Deserialize, Serialize};

use super::builder::PredicateBuilder;
use super::predicate::Predicate;

/// Existence filter over a parent's children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "child", rename_all = "snake_case")]
pub enum ParentPredicate {
    /// At least one child matches.
    WhereHas(Predicate),
    /// No child matches. Holds for a parent without children.
    WhereDoesntHave(Predicate),
}

impl ParentPredicate {
    /// Predicate applied to each child.
    #[must_use]
    pub const fn child(&self) -> &Predicate {
        match self {
            Self::WhereHas(child) | Self::WhereDoesntHave(child) => child,
        }
    }

    /// Evaluate against a parent's children.
    pub fn matches<'a>(&self, children: impl IntoIterator<Item = &'a Interval>) -> bool {
        let mut children = children.into_iter();
        match self {
            Self::WhereHas(child) => children.any(|c| child.matches(c)),
            Self::WhereDoesntHave(child) => !children.any(|c| child.matches(c)),
        }
    }
}

/// `is_active` / `is_inactive` scopes for parents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentScopes {
    children: PredicateBuilder,
}

impl ParentScopes {
    /// Scopes for children using the given start policy.
    #[must_use]
    pub const fn new(start_optional: bool) -> Self {
        Self { children: PredicateBuilder::new(start_optional) }
    }

    /// Scopes for children described by `options`.
    #[must_use]
    pub const fn for_options(options: &DateRangeOptions) -> Self {
        Self::new(options.start_optional)
    }

    /// Builder used for the child predicates.
    #[must_use]
    pub const fn children(&self) -> &PredicateBuilder {
        &self.children
    }

    /// Has a child active now.
    #[must_use]
    pub fn is_active(&self, clock: &dyn Clock) -> ParentPredicate {
        self.is_active_on(clock.now())
    }

    /// Has a child active on `at`.
    #[must_use]
    pub fn is_active_on(&self, at: DateTime<Utc>) -> ParentPredicate {
        ParentPredicate::WhereHas(self.children.active_on(at))
    }

    /// Has no child active now.
    #[must_use]
    pub fn is_inactive(&self, clock: &dyn Clock) -> ParentPredicate {
        self.is_inactive_on(clock.now())
    }

    /// Has no child active on `at`.
    #[must_use]
    pub fn is_inactive_on(&self, at: DateTime<Utc>) -> ParentPredicate {
        ParentPredicate::WhereDoesntHave(self.children.active_on(at))
    }
}
