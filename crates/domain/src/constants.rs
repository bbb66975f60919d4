//! Domain constants
//!
//! Defaults applied when no configuration overrides them.

// Child date-range table
pub const DEFAULT_TABLE_NAME: &str = "date_ranges";
pub const DEFAULT_KEY_COLUMN: &str = "id";
pub const DEFAULT_START_COLUMN: &str = "start_at";
pub const DEFAULT_END_COLUMN: &str = "end_at";

// Parent link: `{name}_id`, plus `{name}_type` when polymorphic
pub const DEFAULT_FOREIGN_KEY_NAME: &str = "model";
pub const FOREIGN_KEY_ID_SUFFIX: &str = "_id";
pub const FOREIGN_KEY_TYPE_SUFFIX: &str = "_type";

pub const DEFAULT_START_OPTIONAL: bool = false;
pub const DEFAULT_POLYMORPHIC: bool = true;
pub const DEFAULT_MULTIPLE_DATES: bool = true;

// Storage and logging
pub const DEFAULT_DATABASE_PATH: &str = "daterange.db";
pub const DEFAULT_POOL_SIZE: u32 = 4;
pub const DEFAULT_LOG_LEVEL: &str = "info";
