//! Storage-agnostic predicate tree over interval fields.
//!
//! A [`Predicate`] is plain data: storage adapters compile it to their own
//! query language, and [`Predicate::matches`] evaluates it in memory. Leaf
//! comparisons against a missing field are `false`, which is also how the
//! SQL adapter compiles them.

use std::ops::Not;

use chrono::{DateTime, Utc};
use daterange_domain::Interval;
use serde::{Deserialize, Serialize};

use crate::activity::ActivityEvaluator;

/// Which date of an interval a leaf refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateField {
    /// The start instant.
    Start,
    /// The end instant.
    End,
}

impl DateField {
    /// Read this field from an interval.
    #[must_use]
    pub const fn of(self, interval: &Interval) -> Option<DateTime<Utc>> {
        match self {
            Self::Start => interval.start,
            Self::End => interval.end,
        }
    }
}

/// Comparison operator of a leaf, written as `field <op> value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl Comparison {
    /// Evaluate `lhs <op> rhs`.
    #[must_use]
    pub fn holds(self, lhs: DateTime<Utc>, rhs: DateTime<Utc>) -> bool {
        match self {
            Self::Lt => lhs < rhs,
            Self::Le => lhs <= rhs,
            Self::Gt => lhs > rhs,
            Self::Ge => lhs >= rhs,
        }
    }

    /// SQL operator token.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

/// Boolean filter over one interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    /// Field is missing.
    IsNull {
        /// Field tested.
        field: DateField,
    },
    /// Field is present.
    IsNotNull {
        /// Field tested.
        field: DateField,
    },
    /// Field is present and compares against `value`.
    Compare {
        /// Left-hand field.
        field: DateField,
        /// Operator.
        op: Comparison,
        /// Right-hand instant.
        value: DateTime<Utc>,
    },
    /// Field is present and lies in `[from, to]`.
    Between {
        /// Field tested.
        field: DateField,
        /// Inclusive lower bound.
        from: DateTime<Utc>,
        /// Inclusive upper bound.
        to: DateTime<Utc>,
    },
    /// All children hold. Empty is `true`.
    And {
        /// Conjuncts.
        all: Vec<Predicate>,
    },
    /// Any child holds. Empty is `false`.
    Or {
        /// Disjuncts.
        any: Vec<Predicate>,
    },
    /// Child does not hold.
    Not {
        /// Negated predicate.
        inner: Box<Predicate>,
    },
}

impl Predicate {
    /// `field IS NULL`
    #[must_use]
    pub const fn is_null(field: DateField) -> Self {
        Self::IsNull { field }
    }

    /// `field IS NOT NULL`
    #[must_use]
    pub const fn is_not_null(field: DateField) -> Self {
        Self::IsNotNull { field }
    }

    /// `field <op> value`
    #[must_use]
    pub const fn compare(field: DateField, op: Comparison, value: DateTime<Utc>) -> Self {
        Self::Compare { field, op, value }
    }

    /// `field BETWEEN from AND to`
    #[must_use]
    pub const fn between(field: DateField, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self::Between { field, from, to }
    }

    /// Conjunction, flattening nested `And`s.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        let mut all = self.into_conjuncts();
        all.extend(other.into_conjuncts());
        Self::And { all }
    }

    /// Disjunction, flattening nested `Or`s.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        let mut any = self.into_disjuncts();
        any.extend(other.into_disjuncts());
        Self::Or { any }
    }

    /// Conjunction of every predicate given.
    #[must_use]
    pub fn all(predicates: impl IntoIterator<Item = Self>) -> Self {
        Self::And { all: predicates.into_iter().collect() }
    }

    /// Disjunction of every predicate given.
    #[must_use]
    pub fn any(predicates: impl IntoIterator<Item = Self>) -> Self {
        Self::Or { any: predicates.into_iter().collect() }
    }

    /// Evaluate against one interval.
    #[must_use]
    pub fn matches(&self, interval: &Interval) -> bool {
        match self {
            Self::IsNull { field } => field.of(interval).is_none(),
            Self::IsNotNull { field } => field.of(interval).is_some(),
            Self::Compare { field, op, value } => {
                field.of(interval).is_some_and(|actual| op.holds(actual, *value))
            }
            Self::Between { field, from, to } => {
                field.of(interval).is_some_and(|actual| *from <= actual && actual <= *to)
            }
            Self::And { all } => all.iter().all(|p| p.matches(interval)),
            Self::Or { any } => any.iter().any(|p| p.matches(interval)),
            Self::Not { inner } => !inner.matches(interval),
        }
    }

    /// Items whose interval matches, in their original order.
    #[must_use]
    pub fn filter<'a, T: ActivityEvaluator>(&self, items: &'a [T]) -> Vec<&'a T> {
        items.iter().filter(|item| self.matches(item.interval())).collect()
    }

    fn into_conjuncts(self) -> Vec<Self> {
        match self {
            Self::And { all } => all,
            other => vec![other],
        }
    }

    fn into_disjuncts(self) -> Vec<Self> {
        match self {
            Self::Or { any } => any,
            other => vec![other],
        }
    }
}

impl Not for Predicate {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Self::Not { inner } => *inner,
            other => Self::Not { inner: Box::new(other) },
        }
    }
}
