//! Shared helpers for Diesel repository implementations.

use tracing::debug;

use super::pool::PoolError;

/// Default number of rows bound into one array statement.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Extract a readable message from a pool error.
pub fn map_pool_error_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Extract a readable message from a Diesel error and emit debug context.
pub fn map_diesel_error_message(error: diesel::result::Error, operation: &str) -> String {
    use diesel::result::Error as DieselError;

    if let DieselError::DatabaseError(kind, info) = &error {
        debug!(
            ?kind,
            constraint = info.constraint_name(),
            table = info.table_name(),
            %operation,
            "diesel operation failed"
        );
    } else {
        debug!(error_message = %error, %operation, "diesel operation failed");
    }
    error.to_string()
}

/// Whether a Diesel error means the connection itself is gone.
pub fn is_connection_error(error: &diesel::result::Error) -> bool {
    matches!(
        error,
        diesel::result::Error::DatabaseError(diesel::result::DatabaseErrorKind::ClosedConnection, _)
            | diesel::result::Error::BrokenTransactionManager
    )
}

/// Convert a database row count into the port's counter type.
pub fn affected_rows(count: usize) -> u64 {
    u64::try_from(count).unwrap_or(u64::MAX)
}
