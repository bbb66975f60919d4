//! Multi-range activation - core business logic
//!
//! An ended child is never reopened: activation always creates a new child,
//! and deactivation closes every child active at the given instant. Child
//! closures are independent writes with no rollback; callers needing
//! atomicity wrap the call in their own transaction.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use daterange_common::Clock;
use daterange_domain::{
    DateRangeError, DateRangeRecord, DateRangesOptions, DeleteMode, IntervalPatch, ParentRef,
    Result,
};
use tracing::{debug, info, warn};

use super::ports::{MultiRangeActivatable, MultiRangeStore};
use crate::query::{ParentOrder, ParentPredicate, ParentScopes, PredicateBuilder};

/// Result of [`MultiRangeController::activate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// A child was already active at the instant; nothing was written.
    AlreadyActive,
    /// A new open child was created.
    Created(DateRangeRecord),
}

impl Activation {
    /// The created child, if any.
    #[must_use]
    pub const fn created(&self) -> Option<&DateRangeRecord> {
        match self {
            Self::AlreadyActive => None,
            Self::Created(record) => Some(record),
        }
    }
}

/// Result of [`MultiRangeController::deactivate`].
///
/// A non-empty `failed` list means the parent was only partially
/// deactivated: children in `closed` stay closed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeactivationReport {
    /// Identifiers of children closed.
    pub closed: Vec<i64>,
    /// Children whose write failed, with the storage error.
    pub failed: Vec<(i64, DateRangeError)>,
}

impl DeactivationReport {
    /// Every active child was closed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Nothing was active at the instant.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.closed.is_empty() && self.failed.is_empty()
    }
}

/// Activates and deactivates parents owning many child ranges.
pub struct MultiRangeController {
    store: Arc<dyn MultiRangeStore>,
    clock: Arc<dyn Clock>,
    options: DateRangesOptions,
}

impl MultiRangeController {
    /// Create a controller.
    ///
    /// `options` is checked at the first operation, which fails with
    /// [`DateRangeError::Configuration`] when the child relationship is
    /// incomplete.
    pub fn new(
        store: Arc<dyn MultiRangeStore>,
        clock: Arc<dyn Clock>,
        options: DateRangesOptions,
    ) -> Self {
        Self { store, clock, options }
    }

    /// Create a controller, checking `options` up front.
    ///
    /// # Errors
    /// [`DateRangeError::Configuration`] when the descriptor is incomplete.
    pub fn try_new(
        store: Arc<dyn MultiRangeStore>,
        clock: Arc<dyn Clock>,
        options: DateRangesOptions,
    ) -> Result<Self> {
        options.validate()?;
        Ok(Self::new(store, clock, options))
    }

    /// Child descriptor this controller was built with.
    #[must_use]
    pub const fn options(&self) -> &DateRangesOptions {
        &self.options
    }

    /// Parent-level filter scopes for this child policy.
    #[must_use]
    pub const fn scopes(&self) -> ParentScopes {
        ParentScopes::for_options(&self.options.range)
    }

    /// Whether any child is active now.
    ///
    /// # Errors
    /// Configuration or storage failures.
    pub async fn is_active<P>(&self, parent: &P) -> Result<bool>
    where
        P: MultiRangeActivatable + ?Sized,
    {
        self.is_active_on(parent, self.clock.now()).await
    }

    /// Whether any child is active on `at`.
    ///
    /// # Errors
    /// Configuration or storage failures.
    pub async fn is_active_on<P>(&self, parent: &P, at: DateTime<Utc>) -> Result<bool>
    where
        P: MultiRangeActivatable + ?Sized,
    {
        let parent = self.parent_ref(parent)?;
        self.store.has_child_matching(&parent, &self.children_scope().active_on(at)).await
    }

    /// Ensure the parent is active on `date` (or now).
    ///
    /// Creates one open child starting at that instant unless a child is
    /// already active then.
    ///
    /// # Errors
    /// Configuration or storage failures.
    pub async fn activate<P>(&self, parent: &P, date: Option<DateTime<Utc>>) -> Result<Activation>
    where
        P: MultiRangeActivatable + ?Sized,
    {
        let at = date.unwrap_or_else(|| self.clock.now());
        let parent = self.parent_ref(parent)?;

        if self.store.has_child_matching(&parent, &self.children_scope().active_on(at)).await? {
            debug!(parent_id = %parent.id, at = %at, "Parent already active");
            return Ok(Activation::AlreadyActive);
        }

        let record = self.store.create_child(&parent, Some(at), None).await?;
        info!(parent_id = %parent.id, child_id = record.id, start = %at, "Date range opened");
        Ok(Activation::Created(record))
    }

    /// Close every child active on `date` (or now) by setting its end to
    /// that instant.
    ///
    /// # Errors
    /// Configuration errors and a failing child query. Per-child write
    /// failures are reported in [`DeactivationReport::failed`].
    pub async fn deactivate<P>(
        &self,
        parent: &P,
        date: Option<DateTime<Utc>>,
    ) -> Result<DeactivationReport>
    where
        P: MultiRangeActivatable + ?Sized,
    {
        let at = date.unwrap_or_else(|| self.clock.now());
        let parent = self.parent_ref(parent)?;
        let active =
            self.store.children_matching(&parent, &self.children_scope().active_on(at)).await?;

        let patch = IntervalPatch::close_at(at);
        let mut report = DeactivationReport::default();
        for child in active {
            match self.store.update_child(&child, &patch).await {
                Ok(()) => report.closed.push(child.id),
                Err(err) => {
                    warn!(
                        parent_id = %parent.id,
                        child_id = child.id,
                        error = %err,
                        "Failed to close date range"
                    );
                    report.failed.push((child.id, err));
                }
            }
        }

        info!(
            parent_id = %parent.id,
            closed = report.closed.len(),
            failed = report.failed.len(),
            "Parent deactivated"
        );
        Ok(report)
    }

    /// All children of a parent.
    ///
    /// # Errors
    /// Configuration or storage failures.
    pub async fn children<P>(&self, parent: &P) -> Result<Vec<DateRangeRecord>>
    where
        P: MultiRangeActivatable + ?Sized,
    {
        let parent = self.parent_ref(parent)?;
        self.store.query_children(&parent).await
    }

    /// React to the parent being deleted.
    ///
    /// A hard delete removes every child; a soft delete keeps them. Returns
    /// the number of children removed.
    ///
    /// # Errors
    /// Configuration or storage failures.
    pub async fn parent_deleted<P>(&self, parent: &P, mode: DeleteMode) -> Result<usize>
    where
        P: MultiRangeActivatable + ?Sized,
    {
        let parent = self.parent_ref(parent)?;
        match mode {
            DeleteMode::Soft => {
                debug!(parent_id = %parent.id, "Soft delete keeps date ranges");
                Ok(0)
            }
            DeleteMode::Hard => {
                let removed = self.store.delete_children(&parent).await?;
                info!(parent_id = %parent.id, removed, "Date ranges removed with parent");
                Ok(removed)
            }
        }
    }

    /// Parent identifiers matching `filter`, optionally ordered by first
    /// child.
    ///
    /// # Errors
    /// Configuration or storage failures.
    pub async fn select(
        &self,
        filter: Option<&ParentPredicate>,
        order: Option<&ParentOrder>,
    ) -> Result<Vec<String>> {
        self.options.validate()?;
        self.store.select_parents(filter, order).await
    }

    fn children_scope(&self) -> PredicateBuilder {
        PredicateBuilder::for_options(&self.options.range)
    }

    fn parent_ref<P>(&self, parent: &P) -> Result<ParentRef>
    where
        P: MultiRangeActivatable + ?Sized,
    {
        self.options.validate()?;
        let id = parent.parent_id();
        if id.is_empty() {
            return Err(DateRangeError::InvalidInput("parent has no identifier".to_string()));
        }
        Ok(match (self.options.polymorphic, &self.options.parent_type) {
            (true, Some(morph_type)) => ParentRef::polymorphic(id, morph_type.clone()),
            _ => ParentRef::new(id),
        })
    }
}
