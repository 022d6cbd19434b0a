//! Shared record types for the magpie job scraper.
//!
//! This module defines the identifier newtype and the two record snapshots
//! that flow between extraction, orchestration, and storage.

use crate::error::MagpieError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Newtype for job identifiers with validation.
///
/// Job ids come from the remote source and are the stable key for both the
/// listing row and its detail row; re-scraping the same posting must produce
/// the same id. The only local constraint is that an id is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Create a new `JobId` from a string.
    ///
    /// # Errors
    /// Returns error if the id is empty or whitespace-only.
    pub fn new(id: impl Into<String>) -> Result<Self, MagpieError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(MagpieError::Validation(
                "job id must be a non-empty string".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How listing pages are addressed on the remote source.
///
/// The pagination engine passes this through untouched; only the site
/// adapter's URL building interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalMode {
    /// Walk the site's category landing pages.
    Category,
    /// Walk a saved search-filter path.
    Filter,
}

impl fmt::Display for TraversalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Category => write!(f, "category"),
            Self::Filter => write!(f, "filter"),
        }
    }
}

/// A job listing discovered during phase one.
///
/// Immutable snapshot of one search result. The repository overwrites by
/// `job_id` on re-scrape, so a listing never duplicates across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobListing {
    /// Stable identifier assigned by the remote source
    pub job_id: JobId,
    /// Posting title
    pub title: String,
    /// URL of the posting's detail page
    pub detail_url: String,
    /// Teaser text shown in search results
    pub summary: String,
    /// Advertising company
    pub company: String,
    /// Human-readable location label(s)
    pub location: String,
    /// ISO country code of the first location
    pub country_code: String,
    /// When the posting was listed
    pub listed_at: DateTime<Utc>,
    /// Advertised salary label, if shown
    pub salary: Option<String>,
    /// Work type(s), e.g. full time
    pub work_type: Option<String>,
    /// Job classification description(s)
    pub classification: Option<String>,
    /// Job sub-classification description(s)
    pub sub_classification: Option<String>,
    /// Remote/hybrid/on-site arrangement text
    pub work_arrangements: Option<String>,
}

/// Detail fetched for a listing during phase two.
///
/// Keyed by the same `job_id` as its listing; only ever created for an id
/// previously observed as a `JobListing`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDetail {
    /// Identifier of the listing this detail belongs to
    pub job_id: JobId,
    /// Posting status as reported by the source
    pub status: String,
    /// Whether the posting has expired
    pub is_expired: bool,
    /// Full posting body as readable text
    pub content: String,
    /// Whether the advertiser is verified, when reported
    pub is_verified: Option<bool>,
    /// When the posting expires, when reported
    pub expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_id_valid() {
        let id = JobId::new("82140266").expect("valid job id");
        assert_eq!(id.as_str(), "82140266");
        assert_eq!(id.to_string(), "82140266");
    }

    #[test]
    fn test_job_id_rejects_empty() {
        assert!(JobId::new("").is_err());
        assert!(JobId::new("   ").is_err());
    }

    #[test]
    fn test_job_id_serde_transparent() {
        let id = JobId::new("123").expect("valid job id");
        let json = serde_json::to_string(&id).expect("serialize job id");
        assert_eq!(json, "\"123\"");

        let parsed: JobId = serde_json::from_str("\"456\"").expect("parse job id");
        assert_eq!(parsed.as_str(), "456");
    }

    #[test]
    fn test_traversal_mode_display() {
        assert_eq!(TraversalMode::Category.to_string(), "category");
        assert_eq!(TraversalMode::Filter.to_string(), "filter");
    }
}
