//! Conversions from external infrastructure errors into domain errors.

use daterange_domain::DateRangeError;
use rusqlite::Error as SqlError;
use tokio::task::JoinError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub DateRangeError);

impl From<InfraError> for DateRangeError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<DateRangeError> for InfraError {
    fn from(value: DateRangeError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoDateRangeError {
    fn into_date_range(self) -> DateRangeError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → DateRangeError */
/* -------------------------------------------------------------------------- */

impl IntoDateRangeError for SqlError {
    fn into_date_range(self) -> DateRangeError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => DateRangeError::transient("database is busy"),
                    (ErrorCode::DatabaseLocked, _) => {
                        DateRangeError::transient("database is locked")
                    }
                    (ErrorCode::ConstraintViolation, 1299) => {
                        DateRangeError::InvalidInput(format!("not null constraint: {message}"))
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        DateRangeError::persistence("foreign key constraint violation")
                    }
                    _ => DateRangeError::persistence(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => DateRangeError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                DateRangeError::persistence(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, name, ty) => {
                DateRangeError::persistence(format!("invalid column type for '{name}': {ty}"))
            }
            RE::InvalidPath(path) => DateRangeError::Configuration(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            RE::InvalidQuery => DateRangeError::Internal("invalid SQL query".into()),
            other => DateRangeError::persistence(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_date_range())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → DateRangeError */
/* -------------------------------------------------------------------------- */

impl IntoDateRangeError for r2d2::Error {
    fn into_date_range(self) -> DateRangeError {
        // Pool checkout only fails on timeout, which a retry may resolve.
        DateRangeError::transient(format!("connection pool: {self}"))
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(value.into_date_range())
    }
}

/* -------------------------------------------------------------------------- */
/* tokio::task::JoinError → DateRangeError */
/* -------------------------------------------------------------------------- */

impl IntoDateRangeError for JoinError {
    fn into_date_range(self) -> DateRangeError {
        DateRangeError::Internal(format!("Task join error: {self}"))
    }
}

impl From<JoinError> for InfraError {
    fn from(value: JoinError) -> Self {
        InfraError(value.into_date_range())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use rusqlite::ffi::{Error as FfiError, ErrorCode};

    use super::*;

    #[test]
    fn sqlite_busy_maps_to_retryable_persistence_error() {
        let err = SqlError::SqliteFailure(
            FfiError { code: ErrorCode::DatabaseBusy, extended_code: 5 },
            Some("database is locked".into()),
        );

        let mapped: DateRangeError = InfraError::from(err).into();
        assert!(mapped.is_retryable());
        match mapped {
            DateRangeError::Persistence { message, .. } => assert!(message.contains("busy")),
            other => panic!("expected persistence error, got {other:?}"),
        }
    }

    #[test]
    fn other_sqlite_failures_are_not_retryable() {
        let err = SqlError::SqliteFailure(
            FfiError { code: ErrorCode::ReadOnly, extended_code: 8 },
            Some("attempt to write a readonly database".into()),
        );

        let mapped: DateRangeError = InfraError::from(err).into();
        assert!(!mapped.is_retryable());
        assert!(mapped.to_string().contains("readonly"));
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        let mapped: DateRangeError = InfraError::from(SqlError::QueryReturnedNoRows).into();
        assert!(matches!(mapped, DateRangeError::NotFound(_)));
    }
}
