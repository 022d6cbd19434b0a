//! Magpie Database Layer
//!
//! Provides `SQLite` storage for scraped job listings and details, using
//! `SQLx` with embedded, versioned migrations.
//!
//! # Architecture
//!
//! - **Migrations**: SQL migrations are embedded and applied on startup
//! - **Upserts**: all writes overwrite by `job_id`, so repeated scrape runs
//!   converge instead of duplicating rows
//! - **Contract**: the [`JobRepository`] trait is what the orchestrator
//!   consumes; [`Database`] is its `SQLite` implementation
//!
//! # Example
//!
//! ```ignore
//! use magpie_db::Database;
//!
//! let db = Database::new("magpie.db").await?;
//! db.run_migrations().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod connection;
pub mod details;
pub mod error;
pub mod listings;
pub mod migrations;
pub mod repository;

// Re-export commonly used types
pub use error::{DatabaseError, Result};
pub use repository::JobRepository;

use sqlx::{Pool, Sqlite};
use std::path::Path;

/// High-level database handle.
///
/// Wraps the connection pool and exposes migration management plus the
/// [`JobRepository`] contract implementation.
#[derive(Debug)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Open the database at the given path, creating the file if missing.
    ///
    /// # Arguments
    /// * `path` - Path to the database file (or `:memory:` for in-memory)
    ///
    /// # Errors
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        let pool = connection::open_pool(path).await?;
        Ok(Self { pool })
    }

    /// Run all pending database migrations.
    ///
    /// This should be called after creating a new database instance to
    /// ensure the schema is up to date.
    ///
    /// # Errors
    /// Returns `DatabaseError::Migration` if any migration fails.
    pub async fn run_migrations(&self) -> Result<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Get the current schema version.
    ///
    /// Returns the highest applied migration version.
    ///
    /// # Errors
    /// Returns `DatabaseError` if the version cannot be queried.
    pub async fn get_schema_version(&self) -> Result<i64> {
        migrations::get_schema_version(&self.pool).await
    }

    /// Get a reference to the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Close the connection pool gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_database_creation() {
        let db = Database::new(":memory:").await.expect("create database");

        sqlx::query("SELECT 1")
            .execute(db.pool())
            .await
            .expect("execute probe query");
    }

    #[tokio::test]
    async fn test_database_schema() {
        let db = Database::new(":memory:").await.expect("create database");
        db.run_migrations().await.expect("run migrations");

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '_sqlx_migrations' ORDER BY name"
        )
        .fetch_all(db.pool())
        .await
        .expect("query tables");

        assert_eq!(tables, vec!["job_details", "job_listings"]);

        let listing_columns: Vec<String> =
            sqlx::query_scalar("SELECT name FROM pragma_table_info('job_listings') ORDER BY cid")
                .fetch_all(db.pool())
                .await
                .expect("query columns");

        assert_eq!(
            listing_columns,
            vec![
                "job_id",
                "title",
                "detail_url",
                "summary",
                "company",
                "location",
                "country_code",
                "listed_at",
                "salary",
                "work_type",
                "classification",
                "sub_classification",
                "work_arrangements",
                "updated_at"
            ]
        );
    }

    #[tokio::test]
    async fn test_database_close() {
        let db = Database::new(":memory:").await.expect("create database");
        db.close().await; // Should not panic
    }
}
