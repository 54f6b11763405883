//! Conversions from external infrastructure errors into domain errors.

use kintai_domain::KintaiError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub KintaiError);

impl From<InfraError> for KintaiError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<KintaiError> for InfraError {
    fn from(value: KintaiError) -> Self {
        InfraError(value)
    }
}

/// Whether a sqlite error is a unique-constraint violation.
///
/// Duplicate activity inserts are an expected outcome of repeated syncs, so
/// the ledger needs to tell this case apart from real failures.
pub fn is_unique_violation(err: &SqlError) -> bool {
    matches!(
        err,
        SqlError::SqliteFailure(inner, _)
            if inner.code == rusqlite::ffi::ErrorCode::ConstraintViolation
                && (inner.extended_code == 2067 || inner.extended_code == 1555)
    )
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → KintaiError */
/* -------------------------------------------------------------------------- */

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        let domain = match value {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match err.code {
                    ErrorCode::DatabaseBusy => KintaiError::Database("database is busy".into()),
                    ErrorCode::DatabaseLocked => {
                        KintaiError::Database("database is locked".into())
                    }
                    ErrorCode::ConstraintViolation if err.extended_code == 2067 => {
                        KintaiError::Database("unique constraint violation".into())
                    }
                    ErrorCode::ConstraintViolation if err.extended_code == 787 => {
                        KintaiError::Database("foreign key constraint violation".into())
                    }
                    _ => KintaiError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => KintaiError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                KintaiError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                KintaiError::Database(format!("invalid column type: {ty}"))
            }
            RE::InvalidParameterName(parameter_name) => {
                KintaiError::Database(format!("invalid parameter name: {parameter_name}"))
            }
            RE::InvalidQuery => KintaiError::Database("invalid SQL query".into()),
            other => KintaiError::Database(other.to_string()),
        };
        InfraError(domain)
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → KintaiError */
/* -------------------------------------------------------------------------- */

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        let domain = if value.is_timeout() {
            KintaiError::Network(format!("http request timed out: {value}"))
        } else if value.is_connect() {
            KintaiError::Network(format!("http connection failed: {value}"))
        } else if value.is_status() {
            let status = value.status().map_or(0, |s| s.as_u16());
            KintaiError::Network(format!("http status {status}: {value}"))
        } else if value.is_decode() {
            KintaiError::Internal(format!("failed to decode http response: {value}"))
        } else {
            KintaiError::Network(format!("http error: {value}"))
        };
        InfraError(domain)
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → KintaiError */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(KintaiError::Database(format!("connection pool error: {value}")))
    }
}

/// Map a blocking-task join failure into the domain error.
pub fn map_join_error(err: tokio::task::JoinError) -> KintaiError {
    if err.is_cancelled() {
        KintaiError::Internal("blocking task cancelled".into())
    } else {
        KintaiError::Internal(format!("blocking task failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_rows_maps_to_not_found() {
        let err: KintaiError = InfraError::from(SqlError::QueryReturnedNoRows).into();
        assert!(matches!(err, KintaiError::NotFound(_)));
    }

    #[test]
    fn unique_violation_is_detected() {
        let err = SqlError::SqliteFailure(
            rusqlite::ffi::Error {
                code: rusqlite::ffi::ErrorCode::ConstraintViolation,
                extended_code: 2067,
            },
            Some("UNIQUE constraint failed: activities".into()),
        );
        assert!(is_unique_violation(&err));
        assert!(!is_unique_violation(&SqlError::QueryReturnedNoRows));
    }
}
