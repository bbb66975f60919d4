//! Date-range ordering for single-range rows and for parents ordered by
//! their first child.
//!
//! Missing dates sort before present ones when ascending and after them
//! when descending, which is how SQLite orders `NULL`.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use daterange_domain::{DateRangeRecord, Interval, SortDirection};
use serde::{Deserialize, Serialize};

use super::predicate::DateField;

/// One `ORDER BY` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderTerm {
    /// Field sorted on.
    pub field: DateField,
    /// Direction of this key.
    pub direction: SortDirection,
}

impl OrderTerm {
    /// Build a term.
    #[must_use]
    pub const fn new(field: DateField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Compare two (possibly missing) values under this term.
    #[must_use]
    pub fn compare_values(
        &self,
        a: Option<DateTime<Utc>>,
        b: Option<DateTime<Utc>>,
    ) -> Ordering {
        match self.direction {
            SortDirection::Ascending => a.cmp(&b),
            SortDirection::Descending => b.cmp(&a),
        }
    }
}

/// Ordered list of keys over one interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRangeOrder {
    terms: Vec<OrderTerm>,
}

impl DateRangeOrder {
    /// Single-range ordering: `start` then `end`, both in `direction`.
    #[must_use]
    pub fn single(direction: SortDirection) -> Self {
        Self {
            terms: vec![
                OrderTerm::new(DateField::Start, direction),
                OrderTerm::new(DateField::End, direction),
            ],
        }
    }

    /// First-child ordering: `start, end` ascending, or `end, start`
    /// descending.
    #[must_use]
    pub fn first_child(direction: SortDirection) -> Self {
        let (first, second) = match direction {
            SortDirection::Ascending => (DateField::Start, DateField::End),
            SortDirection::Descending => (DateField::End, DateField::Start),
        };
        Self {
            terms: vec![OrderTerm::new(first, direction), OrderTerm::new(second, direction)],
        }
    }

    /// Keys in priority order.
    #[must_use]
    pub fn terms(&self) -> &[OrderTerm] {
        &self.terms
    }

    /// Compare two intervals.
    #[must_use]
    pub fn compare(&self, a: &Interval, b: &Interval) -> Ordering {
        self.compare_optional(Some(a), Some(b))
    }

    /// Compare two intervals where either side may be absent; an absent
    /// interval reads every field as missing.
    #[must_use]
    pub fn compare_optional(&self, a: Option<&Interval>, b: Option<&Interval>) -> Ordering {
        self.terms.iter().fold(Ordering::Equal, |acc, term| {
            acc.then_with(|| {
                term.compare_values(
                    a.and_then(|i| term.field.of(i)),
                    b.and_then(|i| term.field.of(i)),
                )
            })
        })
    }

    /// Stable in-place sort.
    pub fn sort_by_interval<T>(&self, items: &mut [T], interval: impl Fn(&T) -> &Interval) {
        items.sort_by(|a, b| self.compare(interval(a), interval(b)));
    }
}

/// Orders parents by a single child each: the first child by identifier in
/// the order's direction (lowest id ascending, highest descending).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentOrder {
    direction: SortDirection,
    children: DateRangeOrder,
}

impl ParentOrder {
    /// Order parents by their first child in `direction`.
    #[must_use]
    pub fn first_child(direction: SortDirection) -> Self {
        Self { direction, children: DateRangeOrder::first_child(direction) }
    }

    /// Direction used both to pick the child and to sort.
    #[must_use]
    pub const fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Keys applied to the selected child.
    #[must_use]
    pub const fn child_order(&self) -> &DateRangeOrder {
        &self.children
    }

    /// The child a parent is ordered by.
    #[must_use]
    pub fn select_first<'a>(&self, children: &'a [DateRangeRecord]) -> Option<&'a DateRangeRecord> {
        match self.direction {
            SortDirection::Ascending => children.iter().min_by_key(|child| child.id),
            SortDirection::Descending => children.iter().max_by_key(|child| child.id),
        }
    }

    /// Compare two parents given their children.
    #[must_use]
    pub fn compare(&self, a: &[DateRangeRecord], b: &[DateRangeRecord]) -> Ordering {
        self.children.compare_optional(
            self.select_first(a).map(|child| &child.interval),
            self.select_first(b).map(|child| &child.interval),
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use daterange_domain::ParentRef;

    use super::*;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn range(start: Option<u32>, end: Option<u32>) -> Interval {
        Interval::new(start.map(|d| day(2024, 1, d)), end.map(|d| day(2024, 1, d)), false)
    }

    fn child(id: i64, start: u32, end: Option<u32>) -> DateRangeRecord {
        DateRangeRecord { id, parent: ParentRef::new("p"), interval: range(Some(start), end) }
    }

    #[test]
    fn single_ascending_puts_missing_first() {
        let mut rows = vec![range(Some(5), None), range(None, None), range(Some(2), Some(9))];
        DateRangeOrder::single(SortDirection::Ascending).sort_by_interval(&mut rows, |r| r);

        assert_eq!(rows, vec![range(None, None), range(Some(2), Some(9)), range(Some(5), None)]);
    }

    #[test]
    fn single_descending_ties_break_on_end() {
        let mut rows = vec![range(Some(3), Some(4)), range(Some(3), Some(8)), range(Some(1), None)];
        DateRangeOrder::single(SortDirection::Descending).sort_by_interval(&mut rows, |r| r);

        assert_eq!(
            rows,
            vec![range(Some(3), Some(8)), range(Some(3), Some(4)), range(Some(1), None)]
        );
    }

    #[test]
    fn first_child_descending_leads_with_end() {
        let order = DateRangeOrder::first_child(SortDirection::Descending);
        assert_eq!(order.terms()[0], OrderTerm::new(DateField::End, SortDirection::Descending));
        assert_eq!(order.terms()[1].field, DateField::Start);

        let asc = DateRangeOrder::first_child(SortDirection::Ascending);
        assert_eq!(asc.terms()[0].field, DateField::Start);
    }

    #[test]
    fn parent_order_uses_first_child_only() {
        let order = ParentOrder::first_child(SortDirection::Ascending);
        // Lowest id child starts late; a later child starts early but is ignored.
        let a = vec![child(1, 20, None), child(7, 1, None)];
        let b = vec![child(2, 10, None)];

        assert_eq!(order.select_first(&a).map(|c| c.id), Some(1));
        assert_eq!(order.compare(&a, &b), Ordering::Greater);

        let desc = ParentOrder::first_child(SortDirection::Descending);
        assert_eq!(desc.select_first(&a).map(|c| c.id), Some(7));
    }

    #[test]
    fn childless_parent_sorts_first_ascending() {
        let order = ParentOrder::first_child(SortDirection::Ascending);
        let with_child = vec![child(1, 5, None)];

        assert_eq!(order.compare(&[], &with_child), Ordering::Less);
        assert_eq!(
            ParentOrder::first_child(SortDirection::Descending).compare(&[], &with_child),
            Ordering::Greater
        );
    }
}
