//! Compile core predicates and orderings into SQLite fragments.
//!
//! Instants are stored as `INTEGER` microseconds since the Unix epoch.
//! Writes truncate to that precision, and comparison bounds are rounded so
//! a leaf selects exactly the stored values it holds for in memory.
//! Every comparison leaf is guarded with `IS NOT NULL`, so a leaf over a
//! missing date is false rather than unknown and `NOT` keeps two-valued
//! semantics identical to in-memory evaluation.

use chrono::{DateTime, SubsecRound, Utc};
use daterange_core::{
    Comparison, DateField, DateRangeOrder, ParentOrder, ParentPredicate, Predicate,
};
use daterange_domain::{
    check_identifier, DateRangeError, DateRangeOptions, DateRangesOptions, FieldUpdate,
    IntervalPatch, Result,
};

/// Positional SQL parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    /// Integer value (instants, ids).
    Int(i64),
    /// Text value (parent keys, type discriminators).
    Text(String),
    /// SQL `NULL`.
    Null,
}

impl From<Option<DateTime<Utc>>> for SqlParam {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        value.map_or(Self::Null, |instant| Self::Int(to_micros(instant)))
    }
}

impl rusqlite::ToSql for SqlParam {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        match self {
            Self::Int(value) => value.to_sql(),
            Self::Text(value) => value.to_sql(),
            Self::Null => Ok(rusqlite::types::ToSqlOutput::Owned(rusqlite::types::Value::Null)),
        }
    }
}

/// SQL fragment with its positional parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    /// SQL text using `?` placeholders.
    pub sql: String,
    /// Parameters in placeholder order.
    pub params: Vec<SqlParam>,
}

/// Microseconds since the epoch.
#[must_use]
pub fn to_micros(instant: DateTime<Utc>) -> i64 {
    instant.timestamp_micros()
}

/// Smallest stored value not below `instant`.
fn ceil_micros(instant: DateTime<Utc>) -> i64 {
    let floor = to_micros(instant);
    if instant.timestamp_subsec_nanos() % 1_000 == 0 {
        floor
    } else {
        floor + 1
    }
}

/// `instant` at storage precision.
#[must_use]
pub fn stored_instant(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.trunc_subsecs(6)
}

/// `patch` with every written instant at storage precision.
#[must_use]
pub fn stored_patch(patch: &IntervalPatch) -> IntervalPatch {
    let truncate = |update: FieldUpdate| match update {
        FieldUpdate::Set(instant) => FieldUpdate::Set(stored_instant(instant)),
        other => other,
    };
    IntervalPatch { start: truncate(patch.start), end: truncate(patch.end) }
}

/// Instant from stored microseconds.
///
/// # Errors
/// [`DateRangeError::Persistence`] for values outside chrono's range.
pub fn from_micros(micros: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| DateRangeError::persistence(format!("timestamp {micros} out of range")))
}

/// Column names for the two date fields, optionally qualified by a table
/// alias.
#[derive(Debug, Clone)]
pub struct DateColumns {
    start: String,
    end: String,
}

impl DateColumns {
    /// Columns of an entity's inline dates.
    #[must_use]
    pub fn new(options: &DateRangeOptions, alias: Option<&str>) -> Self {
        let qualify = |column: &str| match alias {
            Some(alias) => format!("{alias}.{column}"),
            None => column.to_string(),
        };
        Self { start: qualify(&options.start_field), end: qualify(&options.end_field) }
    }

    fn column(&self, field: DateField) -> &str {
        match field {
            DateField::Start => &self.start,
            DateField::End => &self.end,
        }
    }
}

/// `WHERE` body for a predicate.
#[must_use]
pub fn compile_predicate(predicate: &Predicate, columns: &DateColumns) -> Fragment {
    let mut params = Vec::new();
    let sql = write_predicate(predicate, columns, &mut params);
    Fragment { sql, params }
}

fn write_predicate(
    predicate: &Predicate,
    columns: &DateColumns,
    params: &mut Vec<SqlParam>,
) -> String {
    match predicate {
        Predicate::IsNull { field } => format!("{} IS NULL", columns.column(*field)),
        Predicate::IsNotNull { field } => format!("{} IS NOT NULL", columns.column(*field)),
        Predicate::Compare { field, op, value } => {
            let column = columns.column(*field);
            let bound = match op {
                Comparison::Ge | Comparison::Lt => ceil_micros(*value),
                Comparison::Gt | Comparison::Le => to_micros(*value),
            };
            params.push(SqlParam::Int(bound));
            format!("({column} IS NOT NULL AND {column} {} ?)", op.as_sql())
        }
        Predicate::Between { field, from, to } => {
            let column = columns.column(*field);
            params.push(SqlParam::Int(ceil_micros(*from)));
            params.push(SqlParam::Int(to_micros(*to)));
            format!("({column} IS NOT NULL AND {column} BETWEEN ? AND ?)")
        }
        Predicate::And { all } => join(all, " AND ", "1", columns, params),
        Predicate::Or { any } => join(any, " OR ", "0", columns, params),
        Predicate::Not { inner } => format!("NOT ({})", write_predicate(inner, columns, params)),
    }
}

fn join(
    parts: &[Predicate],
    separator: &str,
    empty: &str,
    columns: &DateColumns,
    params: &mut Vec<SqlParam>,
) -> String {
    if parts.is_empty() {
        return empty.to_string();
    }
    let compiled: Vec<String> = parts.iter().map(|p| write_predicate(p, columns, params)).collect();
    format!("({})", compiled.join(separator))
}

/// `SET` body for the changed fields of a patch, or `None` when nothing
/// changes.
#[must_use]
pub fn compile_patch(patch: &IntervalPatch, columns: &DateColumns) -> Option<Fragment> {
    let mut assignments = Vec::new();
    let mut params = Vec::new();
    for (field, update) in [(DateField::Start, patch.start), (DateField::End, patch.end)] {
        let column = columns.column(field);
        match update {
            FieldUpdate::Unchanged => {}
            FieldUpdate::Set(value) => {
                assignments.push(format!("{column} = ?"));
                params.push(SqlParam::Int(to_micros(stored_instant(value))));
            }
            FieldUpdate::Clear => assignments.push(format!("{column} = NULL")),
        }
    }
    if assignments.is_empty() {
        None
    } else {
        Some(Fragment { sql: assignments.join(", "), params })
    }
}

/// `ORDER BY` body for a single-range ordering.
#[must_use]
pub fn compile_order(order: &DateRangeOrder, columns: &DateColumns) -> String {
    order
        .terms()
        .iter()
        .map(|term| format!("{} {}", columns.column(term.field), term.direction.as_sql()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parent table joined against a child range table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentTable {
    /// Parent table name.
    pub table: String,
    /// Parent key column, compared as text against the child foreign key.
    pub key_column: String,
}

impl ParentTable {
    /// Describe a parent table.
    pub fn new(table: impl Into<String>, key_column: impl Into<String>) -> Self {
        Self { table: table.into(), key_column: key_column.into() }
    }

    /// Reject names that are not plain identifiers.
    ///
    /// # Errors
    /// [`DateRangeError::Configuration`].
    pub fn validate(&self) -> Result<()> {
        check_identifier("parent table", &self.table)?;
        check_identifier("parent key column", &self.key_column)
    }
}

/// Alias of the parent table in parent filters and orderings.
pub const PARENT_ALIAS: &str = "p";
const CHILD_ALIAS: &str = "c";

/// Correlation between a child row `c` and the parent row `p`, including the
/// type discriminator for polymorphic links.
fn child_of_parent(options: &DateRangesOptions, parent: &ParentTable) -> Fragment {
    let mut sql = format!(
        "{CHILD_ALIAS}.{fk} = CAST({PARENT_ALIAS}.{key} AS TEXT)",
        fk = options.foreign_key_column(),
        key = parent.key_column,
    );
    let mut params = Vec::new();
    if let (Some(type_column), Some(morph_type)) = (options.type_column(), &options.parent_type) {
        sql.push_str(&format!(" AND {CHILD_ALIAS}.{type_column} = ?"));
        params.push(SqlParam::Text(morph_type.clone()));
    }
    Fragment { sql, params }
}

/// `[NOT] EXISTS (...)` filter over parents aliased `p`.
#[must_use]
pub fn compile_parent_predicate(
    predicate: &ParentPredicate,
    options: &DateRangesOptions,
    parent: &ParentTable,
) -> Fragment {
    let link = child_of_parent(options, parent);
    let child = compile_predicate(
        predicate.child(),
        &DateColumns::new(&options.range, Some(CHILD_ALIAS)),
    );
    let keyword = match predicate {
        ParentPredicate::WhereHas(_) => "EXISTS",
        ParentPredicate::WhereDoesntHave(_) => "NOT EXISTS",
    };

    let mut params = link.params;
    params.extend(child.params);
    Fragment {
        sql: format!(
            "{keyword} (SELECT 1 FROM {table} {CHILD_ALIAS} WHERE {link} AND {child})",
            table = options.table,
            link = link.sql,
            child = child.sql,
        ),
        params,
    }
}

/// `ORDER BY` body sorting parents aliased `p` by their first child.
///
/// Each key is a correlated sub-select taking one child by identifier in
/// the order's direction.
#[must_use]
pub fn compile_parent_order(
    order: &ParentOrder,
    options: &DateRangesOptions,
    parent: &ParentTable,
) -> Fragment {
    let columns = DateColumns::new(&options.range, Some(CHILD_ALIAS));
    let direction = order.direction().as_sql();
    let mut params = Vec::new();
    let mut keys = Vec::new();

    for term in order.child_order().terms() {
        let link = child_of_parent(options, parent);
        params.extend(link.params);
        let first_child = format!(
            "SELECT {column} FROM {table} {CHILD_ALIAS} WHERE {link} \
             ORDER BY {CHILD_ALIAS}.{key} {direction} LIMIT 1",
            column = columns.column(term.field),
            table = options.table,
            link = link.sql,
            key = options.key_field,
        );
        keys.push(format!("({first_child}) {}", term.direction.as_sql()));
    }

    Fragment { sql: keys.join(", "), params }
}
