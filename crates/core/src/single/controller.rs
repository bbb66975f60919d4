//! Single-range activation - core business logic

use std::sync::Arc;

use chrono::{DateTime, Utc};
use daterange_common::Clock;
use daterange_domain::{DateRangeError, FieldUpdate, IntervalPatch, Result};
use tracing::{info, warn};

use super::ports::{SingleRangeActivatable, SingleRangeStore};
use crate::query::{DateRangeOrder, Predicate};

/// Outcome of a bulk activation or deactivation.
///
/// Writes are independent; a failure on one entity does not stop the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkReport<Id> {
    /// Entities written successfully.
    pub updated: Vec<Id>,
    /// Entities whose write failed, with the storage error.
    pub failed: Vec<(Id, DateRangeError)>,
}

impl<Id> Default for BulkReport<Id> {
    fn default() -> Self {
        Self { updated: Vec::new(), failed: Vec::new() }
    }
}

impl<Id> BulkReport<Id> {
    /// Every matched entity was written.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of entities the operation was applied to.
    #[must_use]
    pub fn matched(&self) -> usize {
        self.updated.len() + self.failed.len()
    }
}

/// Activates and deactivates entities owning one inline interval.
pub struct SingleRangeController<E>
where
    E: SingleRangeActivatable + 'static,
{
    store: Arc<dyn SingleRangeStore<E>>,
    clock: Arc<dyn Clock>,
}

impl<E> SingleRangeController<E>
where
    E: SingleRangeActivatable + 'static,
{
    /// Create a controller over the given store and clock
    pub fn new(store: Arc<dyn SingleRangeStore<E>>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Fields written by [`Self::activate`].
    ///
    /// An explicit `date` always replaces the start. Without one, a missing
    /// start is filled with `now` only under the start-required policy. The
    /// end is always cleared, which reopens an ended interval.
    #[must_use]
    pub fn activation_patch(
        entity: &E,
        date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> IntervalPatch {
        let interval = entity.interval();
        let start = match date {
            Some(date) => FieldUpdate::Set(date),
            None if interval.start.is_none() && !interval.start_optional => FieldUpdate::Set(now),
            None => FieldUpdate::Unchanged,
        };
        IntervalPatch { start, end: FieldUpdate::Clear }
    }

    /// Fields written by [`Self::deactivate`].
    #[must_use]
    pub fn deactivation_patch(date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> IntervalPatch {
        IntervalPatch::close_at(date.unwrap_or(now))
    }

    /// Activate one entity.
    ///
    /// The entity is updated in memory only after storage accepted the
    /// write.
    ///
    /// # Errors
    /// Storage failures are returned unchanged.
    pub async fn activate(&self, entity: &mut E, date: Option<DateTime<Utc>>) -> Result<()> {
        let patch = Self::activation_patch(entity, date, self.clock.now());
        self.apply(entity, patch).await?;
        info!(entity_id = ?entity.id(), start = ?entity.interval().start, "Entity activated");
        Ok(())
    }

    /// Deactivate one entity by setting its end to `date`, or now.
    ///
    /// # Errors
    /// Storage failures are returned unchanged.
    pub async fn deactivate(&self, entity: &mut E, date: Option<DateTime<Utc>>) -> Result<()> {
        let patch = Self::deactivation_patch(date, self.clock.now());
        self.apply(entity, patch).await?;
        info!(entity_id = ?entity.id(), end = ?entity.interval().end, "Entity deactivated");
        Ok(())
    }

    /// Activate every entity matching `filter`, one write per entity.
    ///
    /// `now` is read once, so entities filled from the clock share one
    /// start instant.
    ///
    /// # Errors
    /// Only a failing selection is an error; per-entity write failures are
    /// collected in the report.
    pub async fn activate_matching(
        &self,
        filter: &Predicate,
        date: Option<DateTime<Utc>>,
    ) -> Result<BulkReport<E::Id>> {
        let now = self.clock.now();
        self.apply_matching(filter, |entity| Self::activation_patch(entity, date, now)).await
    }

    /// Deactivate every entity matching `filter`, one write per entity.
    ///
    /// # Errors
    /// Only a failing selection is an error; per-entity write failures are
    /// collected in the report.
    pub async fn deactivate_matching(
        &self,
        filter: &Predicate,
        date: Option<DateTime<Utc>>,
    ) -> Result<BulkReport<E::Id>> {
        let patch = Self::deactivation_patch(date, self.clock.now());
        self.apply_matching(filter, |_| patch).await
    }

    /// Entities matching `filter`, optionally ordered.
    ///
    /// # Errors
    /// Storage failures are returned unchanged.
    pub async fn select(
        &self,
        filter: &Predicate,
        order: Option<&DateRangeOrder>,
    ) -> Result<Vec<E>> {
        self.store.select(filter, order).await
    }

    async fn apply(&self, entity: &mut E, patch: IntervalPatch) -> Result<()> {
        let stored = self.store.update(entity, &patch).await?;
        *entity.interval_mut() = stored;
        Ok(())
    }

    async fn apply_matching<F>(&self, filter: &Predicate, patch_for: F) -> Result<BulkReport<E::Id>>
    where
        F: Fn(&E) -> IntervalPatch + Send + Sync,
    {
        let entities = self.store.select(filter, None).await?;
        let mut report = BulkReport::default();

        for mut entity in entities {
            let patch = patch_for(&entity);
            match self.apply(&mut entity, patch).await {
                Ok(()) => report.updated.push(entity.id()),
                Err(err) => {
                    warn!(entity_id = ?entity.id(), error = %err, "Failed to update entity");
                    report.failed.push((entity.id(), err));
                }
            }
        }

        info!(
            updated = report.updated.len(),
            failed = report.failed.len(),
            "Bulk date-range update finished"
        );
        Ok(report)
    }
}
