//! The repository contract consumed by the scrape orchestrator.
//!
//! The trait is the seam that lets the orchestrator run against an
//! in-memory double in tests; [`Database`](crate::Database) is the concrete
//! `SQLite` implementation.

use crate::error::Result;
use crate::{details, listings, Database};
use async_trait::async_trait;
use magpie_core::{JobDetail, JobListing};

/// Idempotent upsert storage for scraped job records.
///
/// All upserts overwrite by `job_id`; `listings_missing_detail` derives the
/// enrichment work queue and returns listings in unspecified order.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Insert or overwrite a listing.
    async fn upsert_listing(&self, listing: &JobListing) -> Result<()>;

    /// Insert or overwrite a listing together with its detail, atomically.
    async fn upsert_listing_with_detail(
        &self,
        listing: &JobListing,
        detail: &JobDetail,
    ) -> Result<()>;

    /// Every listing whose id has no corresponding detail row.
    async fn listings_missing_detail(&self) -> Result<Vec<JobListing>>;

    /// Release the underlying storage resources.
    async fn close(&self);
}

#[async_trait]
impl JobRepository for Database {
    async fn upsert_listing(&self, listing: &JobListing) -> Result<()> {
        listings::upsert(self.pool(), listing).await
    }

    async fn upsert_listing_with_detail(
        &self,
        listing: &JobListing,
        detail: &JobDetail,
    ) -> Result<()> {
        let mut tx = self.pool().begin().await?;
        listings::upsert(&mut *tx, listing).await?;
        details::upsert(&mut *tx, detail).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn listings_missing_detail(&self) -> Result<Vec<JobListing>> {
        listings::missing_detail(self.pool()).await
    }

    async fn close(&self) {
        Database::close(self).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use magpie_core::JobId;

    async fn setup_db() -> Database {
        let db = Database::new(":memory:").await.expect("create database");
        db.run_migrations().await.expect("run migrations");
        db
    }

    fn listing(job_id: &str) -> JobListing {
        JobListing {
            job_id: JobId::new(job_id).expect("valid job id"),
            title: "Engineer".to_string(),
            detail_url: format!("https://www.seek.co.nz/job/{job_id}"),
            summary: "A role".to_string(),
            company: "Acme".to_string(),
            location: "Auckland".to_string(),
            country_code: "NZ".to_string(),
            listed_at: Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap(),
            salary: None,
            work_type: None,
            classification: None,
            sub_classification: None,
            work_arrangements: None,
        }
    }

    fn detail(job_id: &str) -> JobDetail {
        JobDetail {
            job_id: JobId::new(job_id).expect("valid job id"),
            status: "Active".to_string(),
            is_expired: false,
            content: "body".to_string(),
            is_verified: None,
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn test_combined_upsert_is_atomic_pair() {
        let db = setup_db().await;

        db.upsert_listing_with_detail(&listing("100"), &detail("100"))
            .await
            .expect("combined upsert");

        assert_eq!(listings::count(db.pool()).await.expect("count"), 1);
        assert_eq!(details::count(db.pool()).await.expect("count"), 1);
    }

    #[tokio::test]
    async fn test_missing_detail_converges_to_empty() {
        let db = setup_db().await;

        for id in ["1", "2", "3"] {
            db.upsert_listing(&listing(id)).await.expect("upsert");
        }
        assert_eq!(
            db.listings_missing_detail().await.expect("pending").len(),
            3
        );

        for pending in db.listings_missing_detail().await.expect("pending") {
            let d = detail(pending.job_id.as_str());
            db.upsert_listing_with_detail(&pending, &d)
                .await
                .expect("enrich");
        }

        assert!(db
            .listings_missing_detail()
            .await
            .expect("pending")
            .is_empty());
    }
}
