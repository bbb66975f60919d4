//! SQLite-backed child date-range table for multi-range parents
//!
//! One table holds the ranges of every parent; rows are linked by a text
//! foreign key and, for polymorphic links, a type discriminator. Filters
//! and parent scopes are compiled to SQL so they run inside the database.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use daterange_core::{MultiRangeStore, ParentOrder, ParentPredicate, Predicate};
use daterange_domain::{
    DateRangeError, DateRangeRecord, DateRangesOptions, Interval, IntervalPatch, ParentRef, Result,
};
use rusqlite::params_from_iter;
use tokio::task;
use tracing::debug;

use super::manager::{map_sql_error, DbManager, SqliteConnection};
use super::sql::{
    compile_parent_order, compile_parent_predicate, compile_patch, compile_predicate, from_micros,
    stored_instant, DateColumns, Fragment, ParentTable, SqlParam, PARENT_ALIAS,
};
use crate::errors::InfraError;

struct Layout {
    options: DateRangesOptions,
    parents: Option<ParentTable>,
}

impl Layout {
    fn columns(&self) -> DateColumns {
        DateColumns::new(&self.options.range, None)
    }

    fn select_list(&self) -> String {
        let type_column = self.options.type_column().unwrap_or_else(|| "NULL".to_string());
        format!(
            "{key}, {fk}, {type_column}, {start}, {end}",
            key = self.options.key_field,
            fk = self.options.foreign_key_column(),
            start = self.options.range.start_field,
            end = self.options.range.end_field,
        )
    }

    /// `WHERE` body restricting rows to one parent.
    fn parent_clause(&self, parent: &ParentRef) -> Result<Fragment> {
        let mut sql = format!("{} = ?", self.options.foreign_key_column());
        let mut params = vec![SqlParam::Text(parent.id.clone())];
        if let Some(type_column) = self.options.type_column() {
            let morph_type = parent.morph_type.as_ref().ok_or_else(|| {
                DateRangeError::InvalidInput(format!(
                    "parent {} has no type for a polymorphic link",
                    parent.id
                ))
            })?;
            sql.push_str(&format!(" AND {type_column} = ?"));
            params.push(SqlParam::Text(morph_type.clone()));
        }
        Ok(Fragment { sql, params })
    }

    fn query(
        &self,
        conn: &SqliteConnection,
        sql: &str,
        params: Vec<SqlParam>,
    ) -> Result<Vec<DateRangeRecord>> {
        let mut stmt = conn.prepare(sql).map_err(map_sql_error)?;
        let raw = stmt
            .query_map(params_from_iter(params), map_raw_row)
            .map_err(map_sql_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(map_sql_error)?;

        raw.into_iter().map(|raw| self.to_record(raw)).collect()
    }

    fn to_record(
        &self,
        (id, parent_id, morph_type, start, end): RawRow,
    ) -> Result<DateRangeRecord> {
        Ok(DateRangeRecord {
            id,
            parent: ParentRef { id: parent_id, morph_type },
            interval: Interval::new(
                start.map(from_micros).transpose()?,
                end.map(from_micros).transpose()?,
                self.options.range.start_optional,
            ),
        })
    }
}

/// SQLite implementation of [`MultiRangeStore`]
pub struct SqliteDateRangeRepository {
    db: Arc<DbManager>,
    layout: Arc<Layout>,
}

impl SqliteDateRangeRepository {
    /// Create a repository over the child table described by `options`.
    pub fn new(db: Arc<DbManager>, options: DateRangesOptions) -> Self {
        Self { db, layout: Arc::new(Layout { options, parents: None }) }
    }

    /// Attach the parent table so parent scopes can be selected.
    ///
    /// # Errors
    /// [`DateRangeError::Configuration`] when a parent name is not a plain
    /// identifier.
    pub fn with_parent_table(self, parents: ParentTable) -> Result<Self> {
        parents.validate()?;
        let options = self.layout.options.clone();
        Ok(Self { db: self.db, layout: Arc::new(Layout { options, parents: Some(parents) }) })
    }

    /// The child table layout.
    pub fn options(&self) -> &DateRangesOptions {
        &self.layout.options
    }

    async fn fetch(
        &self,
        parent: &ParentRef,
        filter: Option<&Predicate>,
    ) -> Result<Vec<DateRangeRecord>> {
        let mut clause = self.layout.parent_clause(parent)?;
        if let Some(filter) = filter {
            let compiled = compile_predicate(filter, &self.layout.columns());
            clause.sql = format!("{} AND {}", clause.sql, compiled.sql);
            clause.params.extend(compiled.params);
        }
        let sql = format!(
            "SELECT {columns} FROM {table} WHERE {clause} ORDER BY {key} ASC",
            columns = self.layout.select_list(),
            table = self.layout.options.table,
            clause = clause.sql,
            key = self.layout.options.key_field,
        );

        let db = Arc::clone(&self.db);
        let layout = Arc::clone(&self.layout);
        let params = clause.params;

        task::spawn_blocking(move || -> Result<Vec<DateRangeRecord>> {
            let conn = db.get_connection()?;
            layout.query(&conn, &sql, params)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl MultiRangeStore for SqliteDateRangeRepository {
    async fn query_children(&self, parent: &ParentRef) -> Result<Vec<DateRangeRecord>> {
        self.fetch(parent, None).await
    }

    async fn children_matching(
        &self,
        parent: &ParentRef,
        filter: &Predicate,
    ) -> Result<Vec<DateRangeRecord>> {
        self.fetch(parent, Some(filter)).await
    }

    async fn has_child_matching(&self, parent: &ParentRef, filter: &Predicate) -> Result<bool> {
        let mut clause = self.layout.parent_clause(parent)?;
        let compiled = compile_predicate(filter, &self.layout.columns());
        clause.params.extend(compiled.params);
        let sql = format!(
            "SELECT EXISTS (SELECT 1 FROM {table} WHERE {parent} AND {filter})",
            table = self.layout.options.table,
            parent = clause.sql,
            filter = compiled.sql,
        );

        let db = Arc::clone(&self.db);
        let params = clause.params;

        task::spawn_blocking(move || -> Result<bool> {
            let conn = db.get_connection()?;
            conn.query_row(&sql, params_from_iter(params), |row| row.get::<_, bool>(0))
                .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn create_child(
        &self,
        parent: &ParentRef,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<DateRangeRecord> {
        // Validates the type discriminator for polymorphic links.
        self.layout.parent_clause(parent)?;
        let (start, end) = (start.map(stored_instant), end.map(stored_instant));

        let options = &self.layout.options;
        let mut columns = vec![options.foreign_key_column()];
        let mut params = vec![SqlParam::Text(parent.id.clone())];
        if let (Some(type_column), Some(morph_type)) = (options.type_column(), &parent.morph_type) {
            columns.push(type_column);
            params.push(SqlParam::Text(morph_type.clone()));
        }
        columns.push(options.range.start_field.clone());
        columns.push(options.range.end_field.clone());
        params.push(SqlParam::from(start));
        params.push(SqlParam::from(end));
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {table} ({columns}) VALUES ({placeholders})",
            table = options.table,
            columns = columns.join(", "),
        );

        let db = Arc::clone(&self.db);
        let record_parent = parent.clone();
        let start_optional = options.range.start_optional;

        task::spawn_blocking(move || -> Result<DateRangeRecord> {
            let conn = db.get_connection()?;
            conn.execute(&sql, params_from_iter(params)).map_err(map_sql_error)?;

            Ok(DateRangeRecord {
                id: conn.last_insert_rowid(),
                parent: record_parent,
                interval: Interval::new(start, end, start_optional),
            })
        })
        .await
        .map_err(map_join_error)?
    }

    async fn update_child(&self, child: &DateRangeRecord, patch: &IntervalPatch) -> Result<()> {
        let Some(assignments) = compile_patch(patch, &self.layout.columns()) else {
            return Ok(());
        };
        let sql = format!(
            "UPDATE {table} SET {set} WHERE {key} = ?",
            table = self.layout.options.table,
            set = assignments.sql,
            key = self.layout.options.key_field,
        );
        let mut params = assignments.params;
        params.push(SqlParam::Int(child.id));

        let db = Arc::clone(&self.db);
        let id = child.id;

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let affected = conn.execute(&sql, params_from_iter(params)).map_err(map_sql_error)?;
            if affected == 0 {
                return Err(DateRangeError::NotFound(format!("date range {id}")));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn delete_children(&self, parent: &ParentRef) -> Result<usize> {
        let clause = self.layout.parent_clause(parent)?;
        let sql = format!("DELETE FROM {} WHERE {}", self.layout.options.table, clause.sql);

        let db = Arc::clone(&self.db);
        let params = clause.params;

        task::spawn_blocking(move || -> Result<usize> {
            let conn = db.get_connection()?;
            conn.execute(&sql, params_from_iter(params)).map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn select_parents(
        &self,
        filter: Option<&ParentPredicate>,
        order: Option<&ParentOrder>,
    ) -> Result<Vec<String>> {
        let parents = self.layout.parents.as_ref().ok_or_else(|| {
            DateRangeError::Configuration("no parent table attached to the repository".into())
        })?;
        let options = &self.layout.options;

        let mut sql = format!(
            "SELECT CAST({PARENT_ALIAS}.{key} AS TEXT) FROM {table} {PARENT_ALIAS}",
            key = parents.key_column,
            table = parents.table,
        );
        let mut params = Vec::new();
        if let Some(filter) = filter {
            let compiled = compile_parent_predicate(filter, options, parents);
            sql.push_str(&format!(" WHERE {}", compiled.sql));
            params.extend(compiled.params);
        }
        sql.push_str(" ORDER BY ");
        if let Some(order) = order {
            let compiled = compile_parent_order(order, options, parents);
            sql.push_str(&compiled.sql);
            sql.push_str(", ");
            params.extend(compiled.params);
        }
        sql.push_str(&format!("{PARENT_ALIAS}.{} ASC", parents.key_column));
        debug!(%sql, "selecting parents");

        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Vec<String>> {
            let conn = db.get_connection()?;
            let mut stmt = conn.prepare(&sql).map_err(map_sql_error)?;
            let ids = stmt
                .query_map(params_from_iter(params), |row| row.get::<_, String>(0))
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(map_sql_error)?;
            Ok(ids)
        })
        .await
        .map_err(map_join_error)?
    }
}

type RawRow = (i64, String, Option<String>, Option<i64>, Option<i64>);

fn map_raw_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn map_join_error(err: task::JoinError) -> DateRangeError {
    DateRangeError::from(InfraError::from(err))
}
