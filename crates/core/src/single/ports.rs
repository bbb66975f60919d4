//! Port interfaces for single-range entities
//!
//! These traits define the boundaries between the activation logic and the
//! storage that owns the entity rows.

use std::fmt::Debug;

use async_trait::async_trait;
use daterange_domain::{Interval, IntervalPatch, Result};

use crate::activity::ActivityEvaluator;
use crate::query::{DateRangeOrder, Predicate};

/// An entity carrying one [`Interval`] inline.
pub trait SingleRangeActivatable: ActivityEvaluator + Send + Sync {
    /// Identifier reported back from bulk operations.
    type Id: Clone + Debug + Send + Sync;

    /// This entity's identifier.
    fn id(&self) -> Self::Id;

    /// Mutable access to the owned interval.
    fn interval_mut(&mut self) -> &mut Interval;
}

/// Storage for single-range entities
#[async_trait]
pub trait SingleRangeStore<E>: Send + Sync
where
    E: SingleRangeActivatable + 'static,
{
    /// Write the changed date fields of one entity and return the interval
    /// as stored, at the backend's precision. Atomic per entity.
    async fn update(&self, entity: &E, patch: &IntervalPatch) -> Result<Interval>;

    /// Entities whose interval matches `filter`, optionally ordered.
    async fn select(&self, filter: &Predicate, order: Option<&DateRangeOrder>) -> Result<Vec<E>>;
}
