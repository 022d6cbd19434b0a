//! Detail row operations for the `job_details` table.

use crate::error::Result;
use crate::listings::parse_timestamp;
use chrono::Utc;
use magpie_core::{JobDetail, JobId};
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Pool, Row, Sqlite};

/// Insert or overwrite a job detail keyed by `job_id`.
///
/// # Errors
/// Returns `DatabaseError` if the statement fails.
pub async fn upsert<'e, E>(executor: E, detail: &JobDetail) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO job_details (
            job_id, status, is_expired, content, is_verified, expires_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(job_id) DO UPDATE SET
            status = excluded.status,
            is_expired = excluded.is_expired,
            content = excluded.content,
            is_verified = excluded.is_verified,
            expires_at = excluded.expires_at,
            updated_at = excluded.updated_at",
    )
    .bind(detail.job_id.as_str())
    .bind(&detail.status)
    .bind(detail.is_expired)
    .bind(&detail.content)
    .bind(detail.is_verified)
    .bind(detail.expires_at.map(|dt| dt.to_rfc3339()))
    .bind(Utc::now().to_rfc3339())
    .execute(executor)
    .await?;

    Ok(())
}

/// Get a detail row by id.
///
/// # Errors
/// Returns `DatabaseError` if the query fails or the row cannot be decoded.
pub async fn get(pool: &Pool<Sqlite>, job_id: &JobId) -> Result<Option<JobDetail>> {
    let row = sqlx::query(
        "SELECT job_id, status, is_expired, content, is_verified, expires_at
         FROM job_details WHERE job_id = ?",
    )
    .bind(job_id.as_str())
    .fetch_optional(pool)
    .await?;

    row.map(|r| from_row(&r)).transpose()
}

/// Count stored detail rows.
///
/// # Errors
/// Returns `DatabaseError` if the query fails.
pub async fn count(pool: &Pool<Sqlite>) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM job_details")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

fn from_row(row: &SqliteRow) -> Result<JobDetail> {
    let job_id: String = row.try_get("job_id")?;
    let expires_at: Option<String> = row.try_get("expires_at")?;

    Ok(JobDetail {
        job_id: JobId::new(job_id)
            .map_err(|e| crate::error::DatabaseError::Decode(e.to_string()))?,
        status: row.try_get("status")?,
        is_expired: row.try_get("is_expired")?,
        content: row.try_get("content")?,
        is_verified: row.try_get("is_verified")?,
        expires_at: expires_at.as_deref().map(parse_timestamp).transpose()?,
    })
}
