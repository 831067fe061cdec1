//! Shared Diesel error mapping and column casts for the loyalty repositories.

use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub(crate) fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    connection(error.message().to_owned())
}

/// Map common Diesel error variants into query/connection constructors.
///
/// Closed connections and serialisation failures are reported as connection
/// errors so callers surface them as temporarily unavailable; everything else
/// is a query error.
pub(crate) fn map_basic_diesel_error<E, Q, C>(
    error: diesel::result::Error,
    query: Q,
    connection: C,
) -> E
where
    Q: FnOnce(&'static str) -> E,
    C: FnOnce(&'static str) -> E,
{
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
            connection("database serialisation failure")
        }
        DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, _) => {
            query("database constraint violated")
        }
        _ => query("database error"),
    }
}

/// Convert a domain counter (u32) to an `INTEGER` column value.
///
/// Values above `i32::MAX` do not fit the column and become query errors.
pub(crate) fn counter_to_db<E, Q>(value: u32, query: Q) -> Result<i32, E>
where
    Q: FnOnce(&'static str) -> E,
{
    i32::try_from(value).map_err(|_| {
        debug!(value, "counter exceeds INTEGER column range");
        query("counter exceeds column range")
    })
}

/// Cast an `INTEGER` column value back to a domain counter.
///
/// Negative values are rejected by table constraints, so they clamp to zero.
#[expect(
    clippy::cast_sign_loss,
    reason = "negative values are clamped before the cast"
)]
pub(crate) fn counter_from_db(value: i32) -> u32 {
    value.max(0) as u32
}
