//! Listing row operations for the `job_listings` table.
//!
//! Upserts overwrite by `job_id`, so re-scraping a posting refreshes the
//! stored row instead of duplicating it.

use crate::error::{DatabaseError, Result};
use chrono::{DateTime, Utc};
use magpie_core::{JobId, JobListing};
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Pool, Row, Sqlite};

/// Insert or overwrite a job listing keyed by `job_id`.
///
/// # Errors
/// Returns `DatabaseError` if the statement fails.
pub async fn upsert<'e, E>(executor: E, listing: &JobListing) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO job_listings (
            job_id, title, detail_url, summary, company, location, country_code,
            listed_at, salary, work_type, classification, sub_classification,
            work_arrangements, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(job_id) DO UPDATE SET
            title = excluded.title,
            detail_url = excluded.detail_url,
            summary = excluded.summary,
            company = excluded.company,
            location = excluded.location,
            country_code = excluded.country_code,
            listed_at = excluded.listed_at,
            salary = excluded.salary,
            work_type = excluded.work_type,
            classification = excluded.classification,
            sub_classification = excluded.sub_classification,
            work_arrangements = excluded.work_arrangements,
            updated_at = excluded.updated_at",
    )
    .bind(listing.job_id.as_str())
    .bind(&listing.title)
    .bind(&listing.detail_url)
    .bind(&listing.summary)
    .bind(&listing.company)
    .bind(&listing.location)
    .bind(&listing.country_code)
    .bind(listing.listed_at.to_rfc3339())
    .bind(&listing.salary)
    .bind(&listing.work_type)
    .bind(&listing.classification)
    .bind(&listing.sub_classification)
    .bind(&listing.work_arrangements)
    .bind(Utc::now().to_rfc3339())
    .execute(executor)
    .await?;

    Ok(())
}

/// Get a listing by id.
///
/// # Errors
/// Returns `DatabaseError` if the query fails or a row cannot be decoded.
pub async fn get(pool: &Pool<Sqlite>, job_id: &JobId) -> Result<Option<JobListing>> {
    let row = sqlx::query(
        "SELECT job_id, title, detail_url, summary, company, location, country_code,
                listed_at, salary, work_type, classification, sub_classification,
                work_arrangements
         FROM job_listings WHERE job_id = ?",
    )
    .bind(job_id.as_str())
    .fetch_optional(pool)
    .await?;

    row.map(|r| from_row(&r)).transpose()
}

/// Get every listing whose id has no corresponding detail row.
///
/// This is the work queue for the enrichment phase; order is unspecified.
///
/// # Errors
/// Returns `DatabaseError` if the query fails or a row cannot be decoded.
pub async fn missing_detail(pool: &Pool<Sqlite>) -> Result<Vec<JobListing>> {
    let rows = sqlx::query(
        "SELECT l.job_id, l.title, l.detail_url, l.summary, l.company, l.location,
                l.country_code, l.listed_at, l.salary, l.work_type, l.classification,
                l.sub_classification, l.work_arrangements
         FROM job_listings l
         LEFT JOIN job_details d ON d.job_id = l.job_id
         WHERE d.job_id IS NULL",
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(from_row).collect()
}

/// Count stored listings.
///
/// # Errors
/// Returns `DatabaseError` if the query fails.
pub async fn count(pool: &Pool<Sqlite>) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM job_listings")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

fn from_row(row: &SqliteRow) -> Result<JobListing> {
    let job_id: String = row.try_get("job_id")?;
    let listed_at: String = row.try_get("listed_at")?;

    Ok(JobListing {
        job_id: JobId::new(job_id).map_err(|e| DatabaseError::Decode(e.to_string()))?,
        title: row.try_get("title")?,
        detail_url: row.try_get("detail_url")?,
        summary: row.try_get("summary")?,
        company: row.try_get("company")?,
        location: row.try_get("location")?,
        country_code: row.try_get("country_code")?,
        listed_at: parse_timestamp(&listed_at)?,
        salary: row.try_get("salary")?,
        work_type: row.try_get("work_type")?,
        classification: row.try_get("classification")?,
        sub_classification: row.try_get("sub_classification")?,
        work_arrangements: row.try_get("work_arrangements")?,
    })
}

/// Parse an RFC3339 timestamp column.
pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::Decode(format!("invalid timestamp '{value}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{connection, migrations};
    use chrono::TimeZone;

    async fn setup_pool() -> Pool<Sqlite> {
        let pool = connection::open_pool(":memory:").await.expect("open pool");
        migrations::run_migrations(&pool)
            .await
            .expect("run migrations");
        pool
    }

    fn sample_listing(job_id: &str, title: &str) -> JobListing {
        JobListing {
            job_id: JobId::new(job_id).expect("valid job id"),
            title: title.to_string(),
            detail_url: format!("https://www.seek.co.nz/job/{job_id}"),
            summary: "A role".to_string(),
            company: "Acme".to_string(),
            location: "Wellington".to_string(),
            country_code: "NZ".to_string(),
            listed_at: Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap(),
            salary: Some("$100k".to_string()),
            work_type: Some("Full time".to_string()),
            classification: None,
            sub_classification: None,
            work_arrangements: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_and_get() {
        let pool = setup_pool().await;
        let listing = sample_listing("100", "Engineer");

        upsert(&pool, &listing).await.expect("upsert listing");

        let stored = get(&pool, &listing.job_id)
            .await
            .expect("get listing")
            .expect("listing exists");
        assert_eq!(stored, listing);
    }

    #[tokio::test]
    async fn test_upsert_overwrites_in_place() {
        let pool = setup_pool().await;

        upsert(&pool, &sample_listing("100", "Engineer"))
            .await
            .expect("first upsert");
        upsert(&pool, &sample_listing("100", "Senior Engineer"))
            .await
            .expect("second upsert");

        assert_eq!(count(&pool).await.expect("count"), 1);

        let stored = get(&pool, &JobId::new("100").expect("valid job id"))
            .await
            .expect("get listing")
            .expect("listing exists");
        assert_eq!(stored.title, "Senior Engineer");
    }

    #[tokio::test]
    async fn test_missing_detail_lists_unenriched() {
        let pool = setup_pool().await;

        upsert(&pool, &sample_listing("100", "Engineer"))
            .await
            .expect("upsert 100");
        upsert(&pool, &sample_listing("200", "Analyst"))
            .await
            .expect("upsert 200");

        let pending = missing_detail(&pool).await.expect("missing detail");
        assert_eq!(pending.len(), 2);

        // Enrich one of them directly
        sqlx::query(
            "INSERT INTO job_details (job_id, status, is_expired, content, updated_at)
             VALUES ('100', 'Active', 0, 'body', '2025-06-01T00:00:00Z')",
        )
        .execute(&pool)
        .await
        .expect("insert detail row");

        let pending = missing_detail(&pool).await.expect("missing detail");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].job_id.as_str(), "200");
    }
}
