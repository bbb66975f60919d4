//! Field descriptors resolved once at construction.
//!
//! These replace name-based attribute lookup: a controller or storage
//! adapter is handed a descriptor and never consults global configuration
//! afterwards.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_END_COLUMN, DEFAULT_FOREIGN_KEY_NAME, DEFAULT_KEY_COLUMN, DEFAULT_POLYMORPHIC,
    DEFAULT_START_COLUMN, DEFAULT_START_OPTIONAL, DEFAULT_TABLE_NAME, FOREIGN_KEY_ID_SUFFIX,
    FOREIGN_KEY_TYPE_SUFFIX,
};
use crate::errors::{DateRangeError, Result};

/// Where an entity keeps its start/end dates and how a missing start reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRangeOptions {
    /// Column / field holding the start instant.
    pub start_field: String,
    /// Column / field holding the end instant.
    pub end_field: String,
    /// Missing start means "always started".
    pub start_optional: bool,
}

impl Default for DateRangeOptions {
    fn default() -> Self {
        Self {
            start_field: DEFAULT_START_COLUMN.to_string(),
            end_field: DEFAULT_END_COLUMN.to_string(),
            start_optional: DEFAULT_START_OPTIONAL,
        }
    }
}

impl DateRangeOptions {
    /// Rename the start field.
    #[must_use]
    pub fn start_at_field(mut self, field: impl Into<String>) -> Self {
        self.start_field = field.into();
        self
    }

    /// Rename the end field.
    #[must_use]
    pub fn end_at_field(mut self, field: impl Into<String>) -> Self {
        self.end_field = field.into();
        self
    }

    /// Set the start-optional policy.
    #[must_use]
    pub const fn start_optional(mut self, optional: bool) -> Self {
        self.start_optional = optional;
        self
    }

    /// Shorthand for `start_optional(false)`.
    #[must_use]
    pub const fn start_required(self) -> Self {
        self.start_optional(false)
    }

    /// Check that both field names are usable identifiers and distinct.
    ///
    /// # Errors
    /// [`DateRangeError::Configuration`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        check_identifier("start field", &self.start_field)?;
        check_identifier("end field", &self.end_field)?;
        if self.start_field == self.end_field {
            return Err(DateRangeError::Configuration(format!(
                "start and end fields must differ (both '{}')",
                self.start_field
            )));
        }
        Ok(())
    }
}

/// Descriptor of the child date-range collection owned by a parent entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRangesOptions {
    /// Table / collection holding the child ranges.
    pub table: String,
    /// Child primary key; also the "first child" ordering key.
    pub key_field: String,
    /// Base name of the parent link (`{name}_id`, `{name}_type`).
    pub foreign_key_name: String,
    /// Parent link carries a type discriminator column.
    pub polymorphic: bool,
    /// Type discriminator written for this parent kind when polymorphic.
    pub parent_type: Option<String>,
    /// Start/end fields of each child.
    pub range: DateRangeOptions,
}

impl Default for DateRangesOptions {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE_NAME.to_string(),
            key_field: DEFAULT_KEY_COLUMN.to_string(),
            foreign_key_name: DEFAULT_FOREIGN_KEY_NAME.to_string(),
            polymorphic: DEFAULT_POLYMORPHIC,
            parent_type: None,
            range: DateRangeOptions::default(),
        }
    }
}

impl DateRangesOptions {
    /// Use a different child table.
    #[must_use]
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Use a different parent link base name.
    #[must_use]
    pub fn foreign_key_name(mut self, name: impl Into<String>) -> Self {
        self.foreign_key_name = name.into();
        self
    }

    /// Toggle the type discriminator column.
    #[must_use]
    pub const fn polymorphic(mut self, polymorphic: bool) -> Self {
        self.polymorphic = polymorphic;
        self
    }

    /// Type discriminator for this parent kind.
    #[must_use]
    pub fn parent_type(mut self, parent_type: impl Into<String>) -> Self {
        self.parent_type = Some(parent_type.into());
        self
    }

    /// Child start/end descriptor.
    #[must_use]
    pub fn range(mut self, range: DateRangeOptions) -> Self {
        self.range = range;
        self
    }

    /// Column holding the parent identifier.
    #[must_use]
    pub fn foreign_key_column(&self) -> String {
        format!("{}{FOREIGN_KEY_ID_SUFFIX}", self.foreign_key_name)
    }

    /// Column holding the parent type, when polymorphic.
    #[must_use]
    pub fn type_column(&self) -> Option<String> {
        self.polymorphic.then(|| format!("{}{FOREIGN_KEY_TYPE_SUFFIX}", self.foreign_key_name))
    }

    /// Check the table layout only: table, key, link and child fields.
    ///
    /// Enough for creating the child table, which does not depend on a
    /// parent type.
    ///
    /// # Errors
    /// [`DateRangeError::Configuration`] naming the offending part.
    pub fn validate_layout(&self) -> Result<()> {
        check_identifier("child table", &self.table)?;
        check_identifier("child key field", &self.key_field)?;
        check_identifier("relationship foreign key name", &self.foreign_key_name)?;
        self.range.validate()
    }

    /// Check table, key, link and child fields.
    ///
    /// # Errors
    /// [`DateRangeError::Configuration`] when any descriptor part is missing
    /// or not a plain identifier, or when a polymorphic link has no parent
    /// type.
    pub fn validate(&self) -> Result<()> {
        self.validate_layout()?;

        if self.polymorphic && self.parent_type.as_deref().map_or(true, str::is_empty) {
            return Err(DateRangeError::Configuration(
                "polymorphic relationship requires a parent type".to_string(),
            ));
        }
        Ok(())
    }
}

/// Check a table or column name. Identifiers end up interpolated into
/// storage queries, so only `[A-Za-z_][A-Za-z0-9_]*` is accepted.
///
/// # Errors
/// [`DateRangeError::Configuration`] mentioning `what`.
pub fn check_identifier(what: &str, value: &str) -> Result<()> {
    let mut chars = value.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else if value.is_empty() {
        Err(DateRangeError::Configuration(format!("{what} is not configured")))
    } else {
        Err(DateRangeError::Configuration(format!("{what} '{value}' is not a valid identifier")))
    }
}
