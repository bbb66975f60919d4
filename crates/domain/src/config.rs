//! Configuration structures
//!
//! Values are loaded once (see the infra config loader) and resolved into
//! [`DateRangeOptions`] / [`DateRangesOptions`] descriptors. Evaluation code
//! never reads configuration directly.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DATABASE_PATH, DEFAULT_END_COLUMN, DEFAULT_FOREIGN_KEY_NAME, DEFAULT_KEY_COLUMN,
    DEFAULT_LOG_LEVEL, DEFAULT_MULTIPLE_DATES, DEFAULT_POLYMORPHIC, DEFAULT_POOL_SIZE,
    DEFAULT_START_COLUMN, DEFAULT_START_OPTIONAL, DEFAULT_TABLE_NAME,
};
use crate::types::{DateRangeOptions, DateRangesOptions};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage settings.
    pub database: DatabaseConfig,
    /// Child table layout and start policy.
    pub date_range: DateRangeConfig,
    /// Log output settings.
    pub logging: LoggingConfig,
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file path (`:memory:` for an in-memory database).
    pub path: String,
    /// Maximum pooled connections.
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: DEFAULT_DATABASE_PATH.to_string(), pool_size: DEFAULT_POOL_SIZE }
    }
}

/// Date-range layout configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateRangeConfig {
    /// Child table name.
    pub table_name: String,
    /// Child primary key column.
    pub key_column: String,
    /// Start column name.
    pub start_column: String,
    /// End column name.
    pub end_column: String,
    /// Base name of the parent link columns.
    pub foreign_key_name: String,
    /// Parent link carries a type column.
    pub polymorphic: bool,
    /// Missing start means "always started".
    pub start_optional: bool,
    /// Create the child table when migrating. Disable for deployments that
    /// only use inline (single-range) dates.
    pub multiple_dates: bool,
}

impl Default for DateRangeConfig {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            key_column: DEFAULT_KEY_COLUMN.to_string(),
            start_column: DEFAULT_START_COLUMN.to_string(),
            end_column: DEFAULT_END_COLUMN.to_string(),
            foreign_key_name: DEFAULT_FOREIGN_KEY_NAME.to_string(),
            polymorphic: DEFAULT_POLYMORPHIC,
            start_optional: DEFAULT_START_OPTIONAL,
            multiple_dates: DEFAULT_MULTIPLE_DATES,
        }
    }
}

impl DateRangeConfig {
    /// Start/end descriptor for entities using these columns.
    #[must_use]
    pub fn range_options(&self) -> DateRangeOptions {
        DateRangeOptions::default()
            .start_at_field(&self.start_column)
            .end_at_field(&self.end_column)
            .start_optional(self.start_optional)
    }

    /// Child collection descriptor for a parent of the given type.
    #[must_use]
    pub fn ranges_options(&self, parent_type: Option<&str>) -> DateRangesOptions {
        let mut options = DateRangesOptions::default()
            .table(&self.table_name)
            .foreign_key_name(&self.foreign_key_name)
            .polymorphic(self.polymorphic)
            .range(self.range_options());
        options.key_field.clone_from(&self.key_column);
        options.parent_type = parent_type.map(str::to_string);
        options
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: DEFAULT_LOG_LEVEL.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: Config = toml::from_str(
            r#"
[date_range]
start_optional = true
end_column = "valid_until"
"#,
        )
        .unwrap();

        assert!(config.date_range.start_optional);
        assert_eq!(config.date_range.end_column, "valid_until");
        assert_eq!(config.date_range.start_column, "start_at");
        assert_eq!(config.database.pool_size, 4);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn resolves_descriptors() {
        let config = DateRangeConfig { polymorphic: false, ..DateRangeConfig::default() };
        let options = config.ranges_options(None);

        assert_eq!(options.table, "date_ranges");
        assert_eq!(options.foreign_key_column(), "model_id");
        assert!(options.type_column().is_none());
        assert!(options.validate().is_ok());
    }
}
