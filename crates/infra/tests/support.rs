#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use daterange_domain::{Config, DateRangesOptions};
use daterange_infra::database::{DbManager, ParentTable, SqliteDateRangeRepository};
use tempfile::TempDir;

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a new temporary database with migrations applied.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("daterange-test.db");

        let manager = DbManager::new(&db_path, 4).expect("db manager should be created");
        manager.run_migrations().expect("schema migrations should apply");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }

    /// Execute a batch of SQL statements against the database.
    pub fn execute_batch(&self, sql: &str) {
        let conn = self
            .manager
            .get_connection()
            .expect("connection should be available for execute_batch");
        conn.execute_batch(sql).expect("SQL batch execution should succeed");
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// Child table layout for `events` parents, polymorphic by default.
pub fn event_ranges(start_optional: bool) -> DateRangesOptions {
    let mut config = Config::default().date_range;
    config.start_optional = start_optional;
    config.ranges_options(Some("event"))
}

/// Database with an `events` parent table, the child range table and a
/// repository attached to both.
pub fn setup_event_db(
    options: &DateRangesOptions,
    event_ids: &[i64],
) -> (TestDatabase, Arc<SqliteDateRangeRepository>) {
    let db = TestDatabase::new();
    db.manager.ensure_date_range_table(options).expect("child table should be created");
    db.execute_batch("CREATE TABLE events (id INTEGER PRIMARY KEY, name TEXT);");
    for id in event_ids {
        db.execute_batch(&format!("INSERT INTO events (id, name) VALUES ({id}, 'event {id}');"));
    }

    let repo = SqliteDateRangeRepository::new(Arc::clone(&db.manager), options.clone())
        .with_parent_table(ParentTable::new("events", "id"))
        .expect("parent table should be accepted");
    (db, Arc::new(repo))
}

pub fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).single().expect("valid calendar date")
}
