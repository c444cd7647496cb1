//! Conversions from external infrastructure errors into domain errors.

use quotesync_domain::QuoteSyncError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub QuoteSyncError);

impl From<InfraError> for QuoteSyncError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<QuoteSyncError> for InfraError {
    fn from(value: QuoteSyncError) -> Self {
        InfraError(value)
    }
}

trait IntoQuoteSyncError {
    fn into_quotesync(self) -> QuoteSyncError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → QuoteSyncError */
/* -------------------------------------------------------------------------- */

impl IntoQuoteSyncError for SqlError {
    fn into_quotesync(self) -> QuoteSyncError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        QuoteSyncError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        QuoteSyncError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067) => {
                        QuoteSyncError::Database(format!("unique constraint violation: {message}"))
                    }
                    (ErrorCode::ConstraintViolation, 275) => {
                        QuoteSyncError::Database(format!("check constraint violation: {message}"))
                    }
                    _ => QuoteSyncError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => QuoteSyncError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                QuoteSyncError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, name, ty) => {
                QuoteSyncError::Database(format!("invalid column type for {name}: {ty}"))
            }
            RE::InvalidPath(path) => QuoteSyncError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => QuoteSyncError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_quotesync())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → QuoteSyncError */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(QuoteSyncError::Database(format!("connection pool: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → QuoteSyncError */
/* -------------------------------------------------------------------------- */

impl IntoQuoteSyncError for HttpError {
    fn into_quotesync(self) -> QuoteSyncError {
        if self.is_timeout() {
            return QuoteSyncError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return QuoteSyncError::Network("HTTP connection failure".into());
        }

        if self.is_decode() {
            return QuoteSyncError::Network(format!("invalid response body: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => QuoteSyncError::Auth(message),
                404 => QuoteSyncError::NotFound(message),
                400..=499 => QuoteSyncError::InvalidInput(message),
                _ => QuoteSyncError::Network(message),
            };
        }

        QuoteSyncError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_quotesync())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
