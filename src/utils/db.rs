use anyhow::anyhow;
use edudesk_core::AppError;

/// Maps a failed write to a client error when a constraint rejected it.
///
/// Unique violations become `400` with `unique_message`; dangling foreign
/// keys and check violations become `400` with a generic message.
pub fn map_write_error(e: sqlx::Error, unique_message: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::bad_request(anyhow!("{}", unique_message));
        }
        if db_err.is_foreign_key_violation() {
            return AppError::bad_request(anyhow!("Referenced record does not exist"));
        }
        if db_err.is_check_violation() {
            return AppError::bad_request(anyhow!("Value violates a data constraint"));
        }
    }
    AppError::database(e)
}

/// [`map_write_error`] for tables without a unique key of their own.
pub fn map_db_error(e: sqlx::Error) -> AppError {
    map_write_error(e, "Record already exists")
}
