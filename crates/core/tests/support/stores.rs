//! In-memory implementations of the storage ports.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use daterange_core::{
    ActivityEvaluator, DateRangeOrder, MultiRangeActivatable, MultiRangeStore, ParentOrder,
    ParentPredicate, Predicate, SingleRangeActivatable, SingleRangeStore,
};
use daterange_domain::{
    DateRangeError, DateRangeRecord, Interval, IntervalPatch, ParentRef, Result,
};

/// Entity with one inline interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: u32,
    pub interval: Interval,
}

impl Row {
    pub fn new(id: u32, interval: Interval) -> Self {
        Self { id, interval }
    }
}

impl ActivityEvaluator for Row {
    fn interval(&self) -> &Interval {
        &self.interval
    }
}

impl SingleRangeActivatable for Row {
    type Id = u32;

    fn id(&self) -> u32 {
        self.id
    }

    fn interval_mut(&mut self) -> &mut Interval {
        &mut self.interval
    }
}

/// Rows keyed by id; updates to ids in `failing` return a persistence error.
#[derive(Default)]
pub struct InMemoryRowStore {
    rows: Mutex<BTreeMap<u32, Interval>>,
    failing: Mutex<HashSet<u32>>,
    writes: AtomicUsize,
}

impl InMemoryRowStore {
    pub fn with_rows(rows: impl IntoIterator<Item = Row>) -> Self {
        let store = Self::default();
        store.rows.lock().unwrap().extend(rows.into_iter().map(|row| (row.id, row.interval)));
        store
    }

    pub fn fail_updates_for(&self, id: u32) {
        self.failing.lock().unwrap().insert(id);
    }

    pub fn stored(&self, id: u32) -> Option<Interval> {
        self.rows.lock().unwrap().get(&id).copied()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SingleRangeStore<Row> for InMemoryRowStore {
    async fn update(&self, entity: &Row, patch: &IntervalPatch) -> Result<Interval> {
        if self.failing.lock().unwrap().contains(&entity.id) {
            return Err(DateRangeError::persistence(format!("row {} is read-only", entity.id)));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        let stored = rows.entry(entity.id).or_insert(entity.interval);
        *stored = stored.patched(patch);
        Ok(*stored)
    }

    async fn select(&self, filter: &Predicate, order: Option<&DateRangeOrder>) -> Result<Vec<Row>> {
        let mut rows: Vec<Row> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, interval)| filter.matches(interval))
            .map(|(id, interval)| Row::new(*id, *interval))
            .collect();
        if let Some(order) = order {
            order.sort_by_interval(&mut rows, |row| &row.interval);
        }
        Ok(rows)
    }
}

/// Parent entity identified by a string key.
#[derive(Debug, Clone)]
pub struct Parent(pub &'static str);

impl MultiRangeActivatable for Parent {
    fn parent_id(&self) -> String {
        self.0.to_string()
    }
}

/// Child ranges in insertion order with increasing ids.
pub struct InMemoryRangeStore {
    start_optional: bool,
    parents: Mutex<Vec<ParentRef>>,
    children: Mutex<Vec<DateRangeRecord>>,
    next_id: AtomicUsize,
    failing: Mutex<HashSet<i64>>,
    fail_queries: Mutex<bool>,
    creates: AtomicUsize,
}

impl InMemoryRangeStore {
    pub fn new(start_optional: bool) -> Self {
        Self {
            start_optional,
            parents: Mutex::new(Vec::new()),
            children: Mutex::new(Vec::new()),
            next_id: AtomicUsize::new(1),
            failing: Mutex::new(HashSet::new()),
            fail_queries: Mutex::new(false),
            creates: AtomicUsize::new(0),
        }
    }

    /// Register a parent so it shows up in `select_parents` even without
    /// children.
    pub fn add_parent(&self, parent: ParentRef) {
        self.parents.lock().unwrap().push(parent);
    }

    /// Seed a child directly, bypassing `create_child` counters.
    pub fn seed(
        &self,
        parent: &ParentRef,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> DateRangeRecord {
        let record = self.insert(parent, start, end);
        let mut parents = self.parents.lock().unwrap();
        if !parents.contains(parent) {
            parents.push(parent.clone());
        }
        record
    }

    pub fn fail_updates_for(&self, id: i64) {
        self.failing.lock().unwrap().insert(id);
    }

    pub fn fail_queries(&self) {
        *self.fail_queries.lock().unwrap() = true;
    }

    pub fn all_children(&self) -> Vec<DateRangeRecord> {
        self.children.lock().unwrap().clone()
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    fn insert(
        &self,
        parent: &ParentRef,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> DateRangeRecord {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64;
        let record = DateRangeRecord {
            id,
            parent: parent.clone(),
            interval: Interval::new(start, end, self.start_optional),
        };
        self.children.lock().unwrap().push(record.clone());
        record
    }

    fn children_of(&self, parent: &ParentRef) -> Vec<DateRangeRecord> {
        self.children.lock().unwrap().iter().filter(|c| &c.parent == parent).cloned().collect()
    }
}

#[async_trait]
impl MultiRangeStore for InMemoryRangeStore {
    async fn query_children(&self, parent: &ParentRef) -> Result<Vec<DateRangeRecord>> {
        if *self.fail_queries.lock().unwrap() {
            return Err(DateRangeError::transient("database is locked"));
        }
        Ok(self.children_of(parent))
    }

    async fn create_child(
        &self,
        parent: &ParentRef,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<DateRangeRecord> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        Ok(self.seed(parent, start, end))
    }

    async fn update_child(&self, child: &DateRangeRecord, patch: &IntervalPatch) -> Result<()> {
        if self.failing.lock().unwrap().contains(&child.id) {
            return Err(DateRangeError::persistence(format!("child {} is read-only", child.id)));
        }
        let mut children = self.children.lock().unwrap();
        let stored = children
            .iter_mut()
            .find(|c| c.id == child.id)
            .ok_or_else(|| DateRangeError::NotFound(format!("child {}", child.id)))?;
        stored.interval = stored.interval.patched(patch);
        Ok(())
    }

    async fn delete_children(&self, parent: &ParentRef) -> Result<usize> {
        let mut children = self.children.lock().unwrap();
        let before = children.len();
        children.retain(|c| &c.parent != parent);
        Ok(before - children.len())
    }

    async fn select_parents(
        &self,
        filter: Option<&ParentPredicate>,
        order: Option<&ParentOrder>,
    ) -> Result<Vec<String>> {
        let parents = self.parents.lock().unwrap().clone();
        let mut selected: Vec<(ParentRef, Vec<DateRangeRecord>)> = parents
            .into_iter()
            .map(|parent| {
                let children = self.children_of(&parent);
                (parent, children)
            })
            .filter(|(_, children)| {
                filter.map_or(true, |f| f.matches(children.iter().map(|c| &c.interval)))
            })
            .collect();
        if let Some(order) = order {
            selected.sort_by(|a, b| order.compare(&a.1, &b.1));
        }
        Ok(selected.into_iter().map(|(parent, _)| parent.id).collect())
    }
}
