//! Database connection manager backed by an r2d2 SQLite pool.

use std::path::{Path, PathBuf};
use std::time::Duration;

use daterange_domain::{
    DatabaseConfig, DateRangeConfig, DateRangeError, DateRangesOptions, Result,
};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection};
use tracing::info;

use crate::errors::InfraError;

const SCHEMA_VERSION: i32 = 1;
const SCHEMA_SQL: &str = include_str!("schema.sql");
const IN_MEMORY_PATH: &str = ":memory:";
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Pooled SQLite connection.
pub type SqliteConnection = PooledConnection<SqliteConnectionManager>;

/// Database manager that wraps an r2d2 SQLite pool.
pub struct DbManager {
    pool: Pool<SqliteConnectionManager>,
    path: PathBuf,
}

impl DbManager {
    /// Create a new manager with the given pool size.
    ///
    /// `:memory:` opens a private in-memory database; the pool is capped at
    /// one connection so every caller sees the same data.
    ///
    /// # Errors
    /// [`DateRangeError::Persistence`] when the pool cannot be built.
    pub fn new<P: AsRef<Path>>(db_path: P, pool_size: u32) -> Result<Self> {
        let path = db_path.as_ref().to_path_buf();
        let in_memory = path.as_os_str() == IN_MEMORY_PATH;

        let manager = if in_memory {
            SqliteConnectionManager::memory()
        } else {
            SqliteConnectionManager::file(&path)
        }
        .with_init(|conn| {
            conn.busy_timeout(BUSY_TIMEOUT)?;
            conn.execute_batch("PRAGMA foreign_keys = ON;")
        });

        let max_size = if in_memory { 1 } else { pool_size.max(1) };
        let pool = Pool::builder().max_size(max_size).build(manager).map_err(map_pool_error)?;

        info!(db_path = %path.display(), max_connections = max_size, "sqlite pool initialised");

        Ok(Self { pool, path })
    }

    /// Create a manager from the database section of the configuration.
    ///
    /// # Errors
    /// See [`DbManager::new`].
    pub fn from_config(config: &DatabaseConfig) -> Result<Self> {
        Self::new(&config.path, config.pool_size)
    }

    /// Acquire a connection from the pool.
    ///
    /// # Errors
    /// Retryable [`DateRangeError::Persistence`] when the pool times out.
    pub fn get_connection(&self) -> Result<SqliteConnection> {
        self.pool.get().map_err(map_pool_error)
    }

    /// Ensure the base schema exists on the current database.
    ///
    /// # Errors
    /// Storage failures.
    pub fn run_migrations(&self) -> Result<()> {
        let conn = self.get_connection()?;
        create_schema(&conn)
    }

    /// Apply the base schema and, when `config.multiple_dates` is set, the
    /// child table for the configured layout.
    ///
    /// # Errors
    /// See [`DbManager::run_migrations`] and
    /// [`DbManager::ensure_date_range_table`].
    pub fn migrate(&self, config: &DateRangeConfig) -> Result<()> {
        self.run_migrations()?;
        if config.multiple_dates {
            self.ensure_date_range_table(&config.ranges_options(None))?;
        }
        Ok(())
    }

    /// Create the child date-range table described by `options` if missing.
    ///
    /// # Errors
    /// [`DateRangeError::Configuration`] for an unusable layout, otherwise
    /// storage failures.
    pub fn ensure_date_range_table(&self, options: &DateRangesOptions) -> Result<()> {
        options.validate_layout()?;
        let conn = self.get_connection()?;
        conn.execute_batch(&date_range_table_ddl(options)).map_err(map_sql_error)?;
        info!(table = %options.table, "date range table ready");
        Ok(())
    }

    /// Return the configured database path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Perform a health check to verify database connectivity.
    ///
    /// # Errors
    /// Storage failures.
    pub fn health_check(&self) -> Result<()> {
        let conn = self.get_connection()?;
        conn.query_row("SELECT 1", params![], |row| row.get::<_, i32>(0))
            .map_err(map_sql_error)?;
        Ok(())
    }
}

fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL).map_err(map_sql_error)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at) \
         VALUES (?, CAST(strftime('%s','now') AS INTEGER))",
        params![SCHEMA_VERSION],
    )
    .map_err(map_sql_error)?;
    Ok(())
}

/// `CREATE TABLE` for a child range table. Identifiers must already be
/// validated.
fn date_range_table_ddl(options: &DateRangesOptions) -> String {
    let fk = options.foreign_key_column();
    let type_column = options.type_column();
    let type_def =
        type_column.as_ref().map(|c| format!("\n    {c} TEXT NOT NULL,")).unwrap_or_default();
    let index_columns = match &type_column {
        Some(c) => format!("{fk}, {c}"),
        None => fk.clone(),
    };

    format!(
        "CREATE TABLE IF NOT EXISTS {table} (
    {key} INTEGER PRIMARY KEY AUTOINCREMENT,
    {fk} TEXT NOT NULL,{type_def}
    {start} INTEGER,
    {end} INTEGER
);
CREATE INDEX IF NOT EXISTS idx_{table}_{fk} ON {table}({index_columns});",
        table = options.table,
        key = options.key_field,
        start = options.range.start_field,
        end = options.range.end_field,
    )
}

pub(crate) fn map_sql_error(err: rusqlite::Error) -> DateRangeError {
    DateRangeError::from(InfraError::from(err))
}

fn map_pool_error(err: r2d2::Error) -> DateRangeError {
    DateRangeError::from(InfraError::from(err))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn migrations_create_schema_version() {
        let temp_dir = TempDir::new().expect("temp dir created");
        let db_path = temp_dir.path().join("test.db");

        let manager = DbManager::new(&db_path, 4).expect("manager created");
        manager.run_migrations().expect("migrations run");
        manager.run_migrations().expect("migrations are idempotent");

        let conn = manager.get_connection().expect("connection acquired");
        let version: i32 =
            conn.query_row("SELECT version FROM schema_version", [], |row| row.get(0)).unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn health_check_succeeds_for_valid_database() {
        let manager = DbManager::new(IN_MEMORY_PATH, 8).expect("manager created");
        manager.health_check().expect("health check passed");
    }

    #[test]
    fn child_table_follows_layout() {
        let manager = DbManager::new(IN_MEMORY_PATH, 1).expect("manager created");
        let options = DateRangesOptions::default().table("validity").foreign_key_name("owner");
        manager.ensure_date_range_table(&options).expect("table created");

        let conn = manager.get_connection().unwrap();
        let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('validity')").unwrap();
        let columns: Vec<String> =
            stmt.query_map([], |row| row.get(0)).unwrap().collect::<rusqlite::Result<_>>().unwrap();
        assert_eq!(columns, vec!["id", "owner_id", "owner_type", "start_at", "end_at"]);
    }

    fn table_exists(manager: &DbManager, table: &str) -> bool {
        let conn = manager.get_connection().unwrap();
        conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
            [table],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn migrate_creates_child_table_only_for_multiple_dates() {
        let mut config = DateRangeConfig { table_name: "validity".into(), ..Default::default() };

        let manager = DbManager::new(IN_MEMORY_PATH, 1).expect("manager created");
        manager.migrate(&config).expect("migrations run");
        assert!(table_exists(&manager, "schema_version"));
        assert_eq!(table_exists(&manager, "validity"), config.multiple_dates);

        config.multiple_dates = !config.multiple_dates;
        let manager = DbManager::new(IN_MEMORY_PATH, 1).expect("manager created");
        manager.migrate(&config).expect("migrations run");
        assert_eq!(table_exists(&manager, "validity"), config.multiple_dates);
    }

    #[test]
    fn unsafe_layout_is_rejected() {
        let manager = DbManager::new(IN_MEMORY_PATH, 1).expect("manager created");
        let options = DateRangesOptions::default().table("ranges; DROP TABLE x");

        let err = manager.ensure_date_range_table(&options).unwrap_err();
        assert!(matches!(err, DateRangeError::Configuration(_)));
    }
}
