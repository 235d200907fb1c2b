//! Conversions from external infrastructure errors into domain errors.

use bookline_domain::BooklineError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can
/// be converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub BooklineError);

impl From<InfraError> for BooklineError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<BooklineError> for InfraError {
    fn from(value: BooklineError) -> Self {
        InfraError(value)
    }
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → BooklineError                                            */
/* -------------------------------------------------------------------------- */

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        let mapped = match value {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        BooklineError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        BooklineError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067) => {
                        BooklineError::Database("unique constraint violation".into())
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        BooklineError::Database("foreign key constraint violation".into())
                    }
                    _ => BooklineError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => {
                BooklineError::NotFound("no rows returned by query".into())
            }
            RE::FromSqlConversionFailure(_, _, cause) => {
                BooklineError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                BooklineError::Database(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => {
                BooklineError::Database("invalid UTF-8 returned from sqlite".into())
            }
            RE::InvalidQuery => BooklineError::Database("invalid SQL query".into()),
            other => BooklineError::Database(other.to_string()),
        };
        InfraError(mapped)
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → BooklineError                                                */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(BooklineError::Database(format!("connection pool error: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → BooklineError                                             */
/* -------------------------------------------------------------------------- */

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        // Budget expiry is a first-class outcome for callers, distinct from
        // other transport failures.
        let mapped = if value.is_timeout() {
            BooklineError::Timeout(value.to_string())
        } else if value.is_connect() {
            BooklineError::Network(format!("connection failed: {value}"))
        } else if value.is_decode() {
            BooklineError::Network(format!("response decode failed: {value}"))
        } else {
            BooklineError::Network(value.to_string())
        };
        InfraError(mapped)
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → BooklineError                                          */
/* -------------------------------------------------------------------------- */

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(BooklineError::Internal(format!("json serialization failed: {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_rows_maps_to_not_found() {
        let err: BooklineError = InfraError::from(SqlError::QueryReturnedNoRows).into();
        assert!(matches!(err, BooklineError::NotFound(_)));
    }

    #[test]
    fn unique_violation_is_reported_as_such() {
        let sqlite_err = rusqlite::ffi::Error {
            code: rusqlite::ffi::ErrorCode::ConstraintViolation,
            extended_code: 2067,
        };
        let err: BooklineError =
            InfraError::from(SqlError::SqliteFailure(sqlite_err, None)).into();
        match err {
            BooklineError::Database(msg) => assert!(msg.contains("unique constraint")),
            other => panic!("unexpected mapping: {other:?}"),
        }
    }
}
