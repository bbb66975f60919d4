//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `DATERANGE_DB_PATH` is unset, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `DATERANGE_DB_PATH`: Database file path (required)
//! - `DATERANGE_DB_POOL_SIZE`: Connection pool size
//! - `DATERANGE_TABLE`: Child date-range table
//! - `DATERANGE_KEY_COLUMN`: Child primary key column
//! - `DATERANGE_START_COLUMN` / `DATERANGE_END_COLUMN`: Date columns
//! - `DATERANGE_FOREIGN_KEY`: Base name of the parent link columns
//! - `DATERANGE_POLYMORPHIC`: Parent link carries a type column
//! - `DATERANGE_START_OPTIONAL`: Missing start means "always started"
//! - `DATERANGE_MULTIPLE_DATES`: Create the child table on migration
//! - `DATERANGE_LOG_LEVEL`: Default log filter
//!
//! Optional variables fall back to the defaults in
//! `daterange_domain::constants`.
//!
//! ## File Locations
//! The loader probes `config/daterange.{toml,json}` and
//! `daterange.{toml,json}` in the working directory, its parent, and next to
//! the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use daterange_domain::{Config, DateRangeError, Result};

const CONFIG_NAMES: [&str; 4] =
    ["config/daterange.toml", "config/daterange.json", "daterange.toml", "daterange.json"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `DateRangeError::Configuration` if configuration cannot be loaded
/// from either source.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `DateRangeError::Configuration` if `DATERANGE_DB_PATH` is missing
/// or a value does not parse.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();

    config.database.path = env_var("DATERANGE_DB_PATH")?;
    if let Some(pool_size) = env_parse::<u32>("DATERANGE_DB_POOL_SIZE")? {
        config.database.pool_size = pool_size;
    }

    let ranges = &mut config.date_range;
    env_string("DATERANGE_TABLE", &mut ranges.table_name);
    env_string("DATERANGE_KEY_COLUMN", &mut ranges.key_column);
    env_string("DATERANGE_START_COLUMN", &mut ranges.start_column);
    env_string("DATERANGE_END_COLUMN", &mut ranges.end_column);
    env_string("DATERANGE_FOREIGN_KEY", &mut ranges.foreign_key_name);
    ranges.polymorphic = env_bool("DATERANGE_POLYMORPHIC", ranges.polymorphic);
    ranges.start_optional = env_bool("DATERANGE_START_OPTIONAL", ranges.start_optional);
    ranges.multiple_dates = env_bool("DATERANGE_MULTIPLE_DATES", ranges.multiple_dates);

    env_string("DATERANGE_LOG_LEVEL", &mut config.logging.level);

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Format is detected
/// by file extension.
///
/// # Errors
/// Returns `DateRangeError::Configuration` if the file is missing or
/// malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(DateRangeError::Configuration(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            DateRangeError::Configuration(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path).map_err(|e| {
        DateRangeError::Configuration(format!("Failed to read config file: {e}"))
    })?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| DateRangeError::Configuration(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| DateRangeError::Configuration(format!("Invalid JSON format: {e}"))),
        _ => Err(DateRangeError::Configuration(format!(
            "Unsupported config format: {extension}"
        ))),
    }
}

/// Probe the standard locations for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd.join(".."));
        roots.insert(0, cwd);
    }
    if let Some(exe_dir) =
        std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf))
    {
        roots.push(exe_dir);
    }

    candidate_paths(&roots).into_iter().find(|path| path.exists())
}

fn candidate_paths(roots: &[PathBuf]) -> Vec<PathBuf> {
    roots.iter().flat_map(|root| CONFIG_NAMES.iter().map(move |name| root.join(name))).collect()
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        DateRangeError::Configuration(format!("Missing required environment variable: {key}"))
    })
}

fn env_string(key: &str, target: &mut String) {
    if let Ok(value) = std::env::var(key) {
        *target = value;
    }
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(key)
        .ok()
        .map(|raw| {
            raw.parse::<T>().map_err(|e| {
                DateRangeError::Configuration(format!("Invalid value for {key}: {e}"))
            })
        })
        .transpose()
}

/// Accepts `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off`
/// (case-insensitive); anything else counts as `false`.
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: [&str; 11] = [
        "DATERANGE_DB_PATH",
        "DATERANGE_DB_POOL_SIZE",
        "DATERANGE_TABLE",
        "DATERANGE_KEY_COLUMN",
        "DATERANGE_START_COLUMN",
        "DATERANGE_END_COLUMN",
        "DATERANGE_FOREIGN_KEY",
        "DATERANGE_POLYMORPHIC",
        "DATERANGE_START_OPTIONAL",
        "DATERANGE_MULTIPLE_DATES",
        "DATERANGE_LOG_LEVEL",
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    fn write_temp(contents: &str, extension: &str) -> PathBuf {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        let path = temp_file.path().with_extension(extension);
        std::fs::copy(temp_file.path(), &path).unwrap();
        path
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        std::env::set_var("TEST_DATERANGE_BOOL_YES", "YES");
        std::env::set_var("TEST_DATERANGE_BOOL_OFF", "off");
        std::env::remove_var("TEST_DATERANGE_BOOL_MISSING");

        assert!(env_bool("TEST_DATERANGE_BOOL_YES", false));
        assert!(!env_bool("TEST_DATERANGE_BOOL_OFF", true));
        assert!(env_bool("TEST_DATERANGE_BOOL_MISSING", true));

        std::env::remove_var("TEST_DATERANGE_BOOL_YES");
        std::env::remove_var("TEST_DATERANGE_BOOL_OFF");
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("DATERANGE_DB_PATH", "/tmp/test.db");
        std::env::set_var("DATERANGE_DB_POOL_SIZE", "2");
        std::env::set_var("DATERANGE_TABLE", "validity");
        std::env::set_var("DATERANGE_START_COLUMN", "valid_from");
        std::env::set_var("DATERANGE_END_COLUMN", "valid_until");
        std::env::set_var("DATERANGE_FOREIGN_KEY", "owner");
        std::env::set_var("DATERANGE_POLYMORPHIC", "false");
        std::env::set_var("DATERANGE_START_OPTIONAL", "true");
        std::env::set_var("DATERANGE_LOG_LEVEL", "debug");

        let result = load_from_env();
        clear_env();
        let config = result.expect("config loads from env");

        assert_eq!(config.database.path, "/tmp/test.db");
        assert_eq!(config.database.pool_size, 2);
        assert_eq!(config.date_range.table_name, "validity");
        assert_eq!(config.date_range.key_column, "id");
        assert_eq!(config.date_range.start_column, "valid_from");
        assert_eq!(config.date_range.end_column, "valid_until");
        assert_eq!(config.date_range.foreign_key_name, "owner");
        assert!(!config.date_range.polymorphic);
        assert!(config.date_range.start_optional);
        assert!(config.date_range.multiple_dates);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_from_env_missing_path() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, DateRangeError::Configuration(_)));
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("DATERANGE_DB_PATH", "/tmp/test.db");
        std::env::set_var("DATERANGE_DB_POOL_SIZE", "not-a-number");

        let result = load_from_env();
        clear_env();
        let err = result.unwrap_err();
        assert!(err.to_string().contains("DATERANGE_DB_POOL_SIZE"));
    }

    #[test]
    fn test_load_from_file_toml() {
        let path = write_temp(
            r#"
[database]
path = "ranges.db"

[date_range]
table_name = "validity"
polymorphic = false
"#,
            "toml",
        );

        let config = load_from_file(Some(path.clone())).expect("config loads from TOML");
        assert_eq!(config.database.path, "ranges.db");
        assert_eq!(config.database.pool_size, 4);
        assert_eq!(config.date_range.table_name, "validity");
        assert!(!config.date_range.polymorphic);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_json() {
        let path = write_temp(
            r#"{ "date_range": { "start_optional": true }, "logging": { "level": "warn" } }"#,
            "json",
        );

        let config = load_from_file(Some(path.clone())).expect("config loads from JSON");
        assert!(config.date_range.start_optional);
        assert_eq!(config.logging.level, "warn");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_file_not_found() {
        let err = load_from_file(Some(PathBuf::from("/nonexistent/daterange.toml"))).unwrap_err();
        assert!(matches!(err, DateRangeError::Configuration(_)));
    }

    #[test]
    fn test_parse_config_rejects_bad_input() {
        assert!(parse_config(r#"{ "database": "#, Path::new("bad.json")).is_err());
        assert!(parse_config("date_range = 3", Path::new("bad.toml")).is_err());
        assert!(parse_config("key: value", Path::new("config.yaml")).is_err());
    }

    #[test]
    fn test_candidate_paths_prefer_config_dir() {
        let paths = candidate_paths(&[PathBuf::from("/srv/app")]);
        assert_eq!(paths[0], PathBuf::from("/srv/app/config/daterange.toml"));
        assert_eq!(paths.len(), CONFIG_NAMES.len());
    }
}
