//! Shared Diesel/pool error mapping for the persistence adapters.
//!
//! Each repository port defines its own error enum; the helpers here fold
//! Diesel and pool failures into the `connection`/`query` constructors those
//! enums share, keeping raw driver text out of the variants clients see.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map a pool failure through the port's `connection` constructor.
pub(super) fn map_pool_error<E>(error: PoolError, connection: impl Fn(String) -> E) -> E {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => connection(message),
    }
}

/// Whether the error is a unique-constraint violation.
pub(super) fn is_unique_violation(error: &DieselError) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}

/// Map a Diesel failure through the port's constructors.
pub(super) fn map_diesel_error<E>(
    error: DieselError,
    connection: impl Fn(String) -> E,
    query: impl Fn(String) -> E,
) -> E {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error".to_owned())
        }
        DieselError::NotFound => query("record not found".to_owned()),
        _ => query("database error".to_owned()),
    }
}
