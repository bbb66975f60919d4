//! Child date-range rows and the parent reference that owns them.

use serde::{Deserialize, Serialize};

use super::interval::Interval;

/// Identity of the entity owning a set of child date ranges.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParentRef {
    /// Parent primary key.
    pub id: String,
    /// Type discriminator for polymorphic links.
    pub morph_type: Option<String>,
}

impl ParentRef {
    /// Parent linked through a plain foreign key.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), morph_type: None }
    }

    /// Parent linked through a polymorphic (`id` + `type`) key.
    pub fn polymorphic(id: impl Into<String>, morph_type: impl Into<String>) -> Self {
        Self { id: id.into(), morph_type: Some(morph_type.into()) }
    }
}

/// One stored child range.
///
/// The identifier is assigned by storage and increases with insertion
/// order; "first child" ordering relies on that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRangeRecord {
    /// Storage-assigned identifier.
    pub id: i64,
    /// Owning parent.
    pub parent: ParentRef,
    /// The range itself.
    pub interval: Interval,
}
