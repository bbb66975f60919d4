//! Port interfaces for multi-range entities
//!
//! The store owns the child date-range rows. It is configured with the same
//! [`DateRangesOptions`](daterange_domain::DateRangesOptions) as the
//! controller and stamps that policy onto every record it returns.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use daterange_domain::{DateRangeRecord, IntervalPatch, ParentRef, Result};

use crate::query::{ParentOrder, ParentPredicate, Predicate};

/// A parent entity owning a collection of child ranges.
pub trait MultiRangeActivatable: Send + Sync {
    /// Parent key as stored in the child foreign key column.
    fn parent_id(&self) -> String;
}

/// Storage for child date ranges
#[async_trait]
pub trait MultiRangeStore: Send + Sync {
    /// All children of `parent`, by ascending identifier.
    async fn query_children(&self, parent: &ParentRef) -> Result<Vec<DateRangeRecord>>;

    /// Children of `parent` matching `filter`, by ascending identifier.
    ///
    /// The default filters [`Self::query_children`] in memory; backends that
    /// can push the filter down should override it.
    async fn children_matching(
        &self,
        parent: &ParentRef,
        filter: &Predicate,
    ) -> Result<Vec<DateRangeRecord>> {
        let children = self.query_children(parent).await?;
        Ok(children.into_iter().filter(|child| filter.matches(&child.interval)).collect())
    }

    /// Whether any child of `parent` matches `filter`.
    async fn has_child_matching(&self, parent: &ParentRef, filter: &Predicate) -> Result<bool> {
        Ok(!self.children_matching(parent, filter).await?.is_empty())
    }

    /// Insert a child range and return it with its assigned identifier.
    async fn create_child(
        &self,
        parent: &ParentRef,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<DateRangeRecord>;

    /// Write the changed fields of one child. Atomic per child.
    async fn update_child(&self, child: &DateRangeRecord, patch: &IntervalPatch) -> Result<()>;

    /// Remove every child of `parent`, returning how many were removed.
    async fn delete_children(&self, parent: &ParentRef) -> Result<usize>;

    /// Identifiers of parents (of this store's parent type) matching
    /// `filter`, optionally ordered by their first child.
    async fn select_parents(
        &self,
        filter: Option<&ParentPredicate>,
        order: Option<&ParentOrder>,
    ) -> Result<Vec<String>>;
}
