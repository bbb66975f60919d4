//! SQLite-backed storage for entities carrying one inline date range
//!
//! Rows live in a caller-named table with an integer key and the two date
//! columns described by [`DateRangeOptions`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use daterange_core::{
    ActivityEvaluator, DateRangeOrder, Predicate, SingleRangeActivatable, SingleRangeStore,
};
use daterange_domain::{
    check_identifier, DateRangeError, DateRangeOptions, Interval, IntervalPatch, Result,
};
use rusqlite::{params_from_iter, OptionalExtension};
use tokio::task;
use tracing::debug;

use super::manager::{map_sql_error, DbManager};
use super::sql::{
    compile_order, compile_patch, compile_predicate, from_micros, stored_instant, stored_patch,
    to_micros, DateColumns, SqlParam,
};
use crate::errors::InfraError;

/// A stored row with its date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatedRow {
    /// Row key.
    pub id: i64,
    /// Stored dates, stamped with the repository's start policy.
    pub interval: Interval,
}

impl ActivityEvaluator for DatedRow {
    fn interval(&self) -> &Interval {
        &self.interval
    }
}

impl SingleRangeActivatable for DatedRow {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }

    fn interval_mut(&mut self) -> &mut Interval {
        &mut self.interval
    }
}

struct Layout {
    table: String,
    key_column: String,
    options: DateRangeOptions,
}

impl Layout {
    fn columns(&self) -> DateColumns {
        DateColumns::new(&self.options, None)
    }

    fn select_list(&self) -> String {
        format!(
            "{key}, {start}, {end}",
            key = self.key_column,
            start = self.options.start_field,
            end = self.options.end_field
        )
    }
}

/// SQLite implementation of [`SingleRangeStore`] over [`DatedRow`]s
pub struct SqliteSingleRangeRepository {
    db: Arc<DbManager>,
    layout: Arc<Layout>,
}

impl SqliteSingleRangeRepository {
    /// Create a repository over `table`, keyed by `key_column`.
    ///
    /// # Errors
    /// [`DateRangeError::Configuration`] when a name is not a plain
    /// identifier.
    pub fn new(
        db: Arc<DbManager>,
        table: impl Into<String>,
        key_column: impl Into<String>,
        options: DateRangeOptions,
    ) -> Result<Self> {
        let layout = Layout { table: table.into(), key_column: key_column.into(), options };
        check_identifier("table", &layout.table)?;
        check_identifier("key column", &layout.key_column)?;
        layout.options.validate()?;
        Ok(Self { db, layout: Arc::new(layout) })
    }

    /// Create the backing table if it does not exist.
    ///
    /// # Errors
    /// Storage failures.
    pub async fn ensure_table(&self) -> Result<()> {
        let db = Arc::clone(&self.db);
        let layout = Arc::clone(&self.layout);

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    {key} INTEGER PRIMARY KEY AUTOINCREMENT,
                    {start} INTEGER,
                    {end} INTEGER
                );",
                table = layout.table,
                key = layout.key_column,
                start = layout.options.start_field,
                end = layout.options.end_field,
            ))
            .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    /// Insert a row and return it with its assigned key.
    ///
    /// # Errors
    /// Storage failures.
    pub async fn insert(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<DatedRow> {
        let (start, end) = (start.map(stored_instant), end.map(stored_instant));
        let db = Arc::clone(&self.db);
        let layout = Arc::clone(&self.layout);

        task::spawn_blocking(move || -> Result<DatedRow> {
            let conn = db.get_connection()?;
            conn.execute(
                &format!(
                    "INSERT INTO {table} ({start}, {end}) VALUES (?1, ?2)",
                    table = layout.table,
                    start = layout.options.start_field,
                    end = layout.options.end_field,
                ),
                rusqlite::params![start.map(to_micros), end.map(to_micros)],
            )
            .map_err(map_sql_error)?;

            let id = conn.last_insert_rowid();
            Ok(DatedRow { id, interval: Interval::new(start, end, layout.options.start_optional) })
        })
        .await
        .map_err(map_join_error)?
    }

    /// Load one row by key.
    ///
    /// # Errors
    /// Storage failures.
    pub async fn find(&self, id: i64) -> Result<Option<DatedRow>> {
        let db = Arc::clone(&self.db);
        let layout = Arc::clone(&self.layout);

        task::spawn_blocking(move || -> Result<Option<DatedRow>> {
            let conn = db.get_connection()?;
            let raw = conn
                .query_row(
                    &format!(
                        "SELECT {columns} FROM {table} WHERE {key} = ?1",
                        columns = layout.select_list(),
                        table = layout.table,
                        key = layout.key_column,
                    ),
                    [id],
                    map_raw_row,
                )
                .optional()
                .map_err(map_sql_error)?;

            raw.map(|raw| to_row(raw, &layout.options)).transpose()
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl SingleRangeStore<DatedRow> for SqliteSingleRangeRepository {
    async fn update(&self, entity: &DatedRow, patch: &IntervalPatch) -> Result<Interval> {
        let patch = stored_patch(patch);
        let stored = entity.interval.patched(&patch);
        let Some(assignments) = compile_patch(&patch, &self.layout.columns()) else {
            return Ok(stored);
        };
        let db = Arc::clone(&self.db);
        let layout = Arc::clone(&self.layout);
        let id = entity.id;

        task::spawn_blocking(move || -> Result<Interval> {
            let conn = db.get_connection()?;
            let sql = format!(
                "UPDATE {table} SET {set} WHERE {key} = ?",
                table = layout.table,
                set = assignments.sql,
                key = layout.key_column,
            );
            let mut params = assignments.params;
            params.push(SqlParam::Int(id));

            let affected = conn.execute(&sql, params_from_iter(params)).map_err(map_sql_error)?;
            if affected == 0 {
                return Err(DateRangeError::NotFound(format!("{} row {id}", layout.table)));
            }
            Ok(stored)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn select(
        &self,
        filter: &Predicate,
        order: Option<&DateRangeOrder>,
    ) -> Result<Vec<DatedRow>> {
        let columns = self.layout.columns();
        let filter = compile_predicate(filter, &columns);
        let order_by = match order {
            Some(order) => {
                format!("{}, {} ASC", compile_order(order, &columns), self.layout.key_column)
            }
            None => format!("{} ASC", self.layout.key_column),
        };
        let sql = format!(
            "SELECT {columns} FROM {table} WHERE {filter} ORDER BY {order_by}",
            columns = self.layout.select_list(),
            table = self.layout.table,
            filter = filter.sql,
        );
        debug!(%sql, "selecting dated rows");

        let db = Arc::clone(&self.db);
        let layout = Arc::clone(&self.layout);
        let params = filter.params;

        task::spawn_blocking(move || -> Result<Vec<DatedRow>> {
            let conn = db.get_connection()?;
            let mut stmt = conn.prepare(&sql).map_err(map_sql_error)?;
            let raw = stmt
                .query_map(params_from_iter(params), map_raw_row)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;

            raw.into_iter().map(|raw| to_row(raw, &layout.options)).collect()
        })
        .await
        .map_err(map_join_error)?
    }
}

type RawRow = (i64, Option<i64>, Option<i64>);

fn map_raw_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
}

fn to_row((id, start, end): RawRow, options: &DateRangeOptions) -> Result<DatedRow> {
    Ok(DatedRow {
        id,
        interval: Interval::new(
            start.map(from_micros).transpose()?,
            end.map(from_micros).transpose()?,
            options.start_optional,
        ),
    })
}

fn map_join_error(err: task::JoinError) -> DateRangeError {
    DateRangeError::from(InfraError::from(err))
}
