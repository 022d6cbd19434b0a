//! Database connection management.
//!
//! Builds the `SQLx` connection pool used by the rest of the crate.

use crate::error::{DatabaseError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;

/// Open a `SQLite` connection pool, creating the database file if missing.
///
/// # Arguments
/// * `path` - Path to the database file (or `:memory:` for in-memory)
///
/// # Errors
/// Returns `DatabaseError::Open` if the path is invalid or the pool cannot
/// be initialized.
pub async fn open_pool(path: impl AsRef<Path>) -> Result<Pool<Sqlite>> {
    let path_str = path
        .as_ref()
        .to_str()
        .ok_or_else(|| DatabaseError::Open("invalid database path: not valid UTF-8".to_string()))?;

    let connect_options = SqliteConnectOptions::from_str(path_str)
        .map_err(|e| DatabaseError::Open(format!("invalid connection string: {e}")))?
        .create_if_missing(true);

    // An in-memory database exists per connection; a pool wider than one
    // would hand out empty databases.
    let max_connections = if path_str == ":memory:" { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(connect_options)
        .await
        .map_err(|e| DatabaseError::Open(format!("failed to initialize pool: {e}")))?;

    tracing::info!("Database pool created at {}", path_str);

    Ok(pool)
}
