//! The capability seam for swappable job sites.

use magpie_core::{JobDetail, JobListing, TraversalMode};
use thiserror::Error;

/// A site's pure extraction data couldn't be located or decoded.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ExtractError(pub String);

/// Everything the orchestrator needs to know about one job site.
///
/// URL building and extraction are pure; all fetching stays in the
/// orchestrator so rate limiting and retries apply uniformly across sites.
pub trait SiteAdapter: Send + Sync {
    /// Short site name used in logs and the CLI.
    fn id(&self) -> &str;

    /// Records on a full listing page; a shorter page is the last one.
    fn full_page_size(&self) -> usize;

    /// Build the listing-page URL for a traversal mode and 1-based page.
    fn listing_url(&self, mode: TraversalMode, page: u32) -> String;

    /// Extract every listing from a rendered listing page.
    ///
    /// Total: a page without recognizable listings yields an empty vec.
    fn extract_listings(&self, html: &str) -> Vec<JobListing>;

    /// Extract the detail record from a rendered detail page.
    ///
    /// # Errors
    /// Returns `ExtractError` when the embedded data block is absent or
    /// malformed.
    fn extract_detail(&self, html: &str) -> Result<JobDetail, ExtractError>;
}
