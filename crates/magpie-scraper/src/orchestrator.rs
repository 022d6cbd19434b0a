//! Two-phase scrape orchestration.
//!
//! Phase one walks the listing pages and persists every discovered record
//! as it is extracted. Phase two queries storage for listings that still
//! lack detail and enriches each one. The phases are strictly ordered so
//! the enrichment queue reflects the complete listing set, and re-running
//! converges: upserts overwrite by id and already-enriched listings drop
//! out of the queue.

use crate::error::{Result, ScrapeError};
use crate::limiter::RateLimiter;
use crate::pagination::PageCursor;
use crate::retry::RetryPolicy;
use crate::site::SiteAdapter;
use magpie_browser::{NavigablePage, PageSource};
use magpie_core::{JobDetail, JobListing, TraversalMode};
use magpie_db::JobRepository;

/// Counters from one scrape run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeReport {
    /// Listings discovered and persisted in phase one
    pub listings: u64,
    /// Listings successfully enriched in phase two
    pub details_fetched: u64,
    /// Listings whose enrichment failed and was skipped
    pub details_failed: u64,
}

/// Drives the two scrape phases against one site.
///
/// Generic over the page source, the repository, and the site adapter so
/// tests can substitute doubles for all three.
pub struct Scraper<'a, B, R, S> {
    browser: &'a B,
    repository: &'a R,
    site: S,
    limiter: RateLimiter,
    retry: RetryPolicy,
}

impl<'a, B, R, S> Scraper<'a, B, R, S>
where
    B: PageSource,
    R: JobRepository,
    S: SiteAdapter,
{
    /// Create a scraper over a browser, a repository, and a site adapter.
    pub fn new(browser: &'a B, repository: &'a R, site: S, limiter: RateLimiter) -> Self {
        Self {
            browser,
            repository,
            site,
            limiter,
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The rate limiter shared by both phases.
    ///
    /// Run-time overrides must be applied here before the first fetch.
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Run both phases: drain all listing pages, then enrich everything
    /// still missing detail.
    pub async fn scrape(&self, mode: TraversalMode) -> Result<ScrapeReport> {
        let listings = self.scrape_listings(mode).await?;
        let (details_fetched, details_failed) = self.scrape_details().await?;
        Ok(ScrapeReport {
            listings,
            details_fetched,
            details_failed,
        })
    }

    /// Phase one: walk listing pages, persisting each record as it is
    /// extracted. Returns the number of listings processed.
    ///
    /// A page fetch that exhausts its retries aborts the phase; listings
    /// persisted from earlier pages are kept.
    pub async fn scrape_listings(&self, mode: TraversalMode) -> Result<u64> {
        let page = self.browser.new_page().await?;
        let result = self.drain_listing_pages(&page, mode).await;
        if let Err(e) = page.close().await {
            tracing::debug!(error = %e, "Error closing listing page");
        }

        let count = result?;
        tracing::info!(mode = %mode, listings = count, "Listing scrape finished");
        Ok(count)
    }

    /// Phase two: enrich every stored listing that has no detail row yet.
    ///
    /// A failure on one listing is logged and skipped; the batch carries on.
    /// Repository errors are never absorbed. Returns (enriched, failed).
    pub async fn scrape_details(&self) -> Result<(u64, u64)> {
        let pending = self.repository.listings_missing_detail().await?;
        tracing::info!(pending = pending.len(), "Found listings missing details");

        let page = self.browser.new_page().await?;
        let result = self.enrich_listings(&page, pending).await;
        if let Err(e) = page.close().await {
            tracing::debug!(error = %e, "Error closing detail page");
        }
        let (fetched, failed) = result?;

        let stats = self.limiter.stats();
        tracing::info!(
            requests = stats.request_count,
            total_wait_secs = stats.total_wait.as_secs_f64(),
            avg_wait_secs = stats.avg_wait.as_secs_f64(),
            "Rate limiter statistics"
        );

        Ok((fetched, failed))
    }

    async fn drain_listing_pages(&self, page: &B::Page, mode: TraversalMode) -> Result<u64> {
        let mut cursor = PageCursor::new(self.site.full_page_size());
        let mut count = 0u64;

        while let Some(page_number) = cursor.next_page() {
            let records = self.fetch_listing_page(page, mode, page_number).await?;
            cursor.observe(records.len());
            for listing in records {
                self.repository.upsert_listing(&listing).await?;
                count += 1;
            }
        }

        Ok(count)
    }

    async fn fetch_listing_page(
        &self,
        page: &B::Page,
        mode: TraversalMode,
        page_number: u32,
    ) -> Result<Vec<JobListing>> {
        let url = self.site.listing_url(mode, page_number);
        let operation = format!("listing page {page_number}");
        tracing::info!(site = self.site.id(), page = page_number, "Scraping listing page");

        let url = url.as_str();
        let site = &self.site;
        let limiter = &self.limiter;
        self.retry
            .run(&operation, move || async move {
                let _permit = limiter.acquire().await;
                let html = page.fetch(url).await.map_err(|source| ScrapeError::Fetch {
                    url: url.to_string(),
                    source,
                })?;
                Ok(site.extract_listings(&html))
            })
            .await
    }

    async fn enrich_listings(
        &self,
        page: &B::Page,
        pending: Vec<JobListing>,
    ) -> Result<(u64, u64)> {
        let mut fetched = 0u64;
        let mut failed = 0u64;

        for listing in pending {
            match self.fetch_detail(page, &listing).await {
                Ok(detail) => {
                    self.repository
                        .upsert_listing_with_detail(&listing, &detail)
                        .await?;
                    fetched += 1;
                }
                Err(e) => {
                    tracing::error!(
                        job_id = %listing.job_id,
                        error = %e,
                        "Failed to enrich listing, continuing"
                    );
                    failed += 1;
                }
            }
        }

        Ok((fetched, failed))
    }

    async fn fetch_detail(&self, page: &B::Page, listing: &JobListing) -> Result<JobDetail> {
        let operation = format!("detail for job {}", listing.job_id);

        let url = listing.detail_url.as_str();
        let site = &self.site;
        let limiter = &self.limiter;
        self.retry
            .run(&operation, move || async move {
                let _permit = limiter.acquire().await;
                let html = page.fetch(url).await.map_err(|source| ScrapeError::Fetch {
                    url: url.to_string(),
                    source,
                })?;
                site.extract_detail(&html).map_err(|e| ScrapeError::Extract {
                    url: url.to_string(),
                    reason: e.to_string(),
                })
            })
            .await
    }
}
