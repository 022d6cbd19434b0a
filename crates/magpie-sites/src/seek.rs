//! Seek job board adapter.
//!
//! Seek renders its search results and job pages from a JSON state object
//! embedded in a script tag (`window.SEEK_REDUX_DATA = {...};`). Extraction
//! locates that assignment, decodes it, and maps the relevant slices into
//! the shared record types. Listing pages are addressed by a category or
//! filter path plus a location segment, with a `?page=N` query from the
//! second page on.

use chrono::{DateTime, Utc};
use magpie_core::{JobDetail, JobId, JobListing, SiteConfig, TraversalMode};
use magpie_scraper::{ExtractError, SiteAdapter};
use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;
use std::sync::OnceLock;
use url::Url;

/// Elements that should force a line break in flattened posting bodies.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "table",
];

/// The Seek site adapter.
pub struct SeekSite {
    config: SiteConfig,
}

impl SeekSite {
    /// Create an adapter from the site's configuration entry.
    #[must_use]
    pub fn new(config: SiteConfig) -> Self {
        Self { config }
    }

    /// The configuration this adapter was built from.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    fn listing_from(&self, job: RawJob) -> Option<JobListing> {
        let id = job.id.into_string();
        let Ok(job_id) = JobId::new(id.clone()) else {
            tracing::warn!(title = %job.title, "Skipping listing without a job id");
            return None;
        };

        let country_code = job
            .locations
            .first()
            .map(|location| location.country_code.clone())
            .unwrap_or_default();
        let location = join_nonempty(job.locations.iter().map(|l| l.label.as_str())).unwrap_or_default();
        let classification = join_nonempty(
            job.classifications
                .iter()
                .map(|c| c.classification.description.as_str()),
        );
        let sub_classification = join_nonempty(
            job.classifications
                .iter()
                .map(|c| c.subclassification.description.as_str()),
        );
        let work_type = join_nonempty(job.work_types.iter().map(String::as_str));
        let work_arrangements = job
            .work_arrangements
            .map(|w| w.display_text)
            .filter(|text| !text.is_empty());

        Some(JobListing {
            detail_url: join_url(&self.config.base_url, &format!("job/{id}")),
            job_id,
            title: job.title,
            summary: job.teaser,
            company: job.company_name,
            location,
            country_code,
            listed_at: parse_datetime(&job.listing_date),
            salary: job.salary_label.filter(|label| !label.is_empty()),
            work_type,
            classification,
            sub_classification,
            work_arrangements,
        })
    }
}

impl SiteAdapter for SeekSite {
    fn id(&self) -> &str {
        "seek"
    }

    fn full_page_size(&self) -> usize {
        self.config.page_size
    }

    fn listing_url(&self, mode: TraversalMode, page: u32) -> String {
        let path = match mode {
            TraversalMode::Category => format!("{}/{}", self.config.category, self.config.location),
            TraversalMode::Filter => format!("{}/{}", self.config.filter, self.config.location),
        };

        let mut url = join_url(&self.config.base_url, &path);
        if page > 1 {
            url.push_str(&format!("?page={page}"));
        }
        url
    }

    fn extract_listings(&self, html: &str) -> Vec<JobListing> {
        let Some(data) = redux_data(html) else {
            tracing::debug!("No SEEK_REDUX_DATA block in listing page");
            return Vec::new();
        };

        data.results
            .results
            .jobs
            .into_iter()
            .filter_map(|job| self.listing_from(job))
            .collect()
    }

    fn extract_detail(&self, html: &str) -> Result<JobDetail, ExtractError> {
        let data = redux_data(html)
            .ok_or_else(|| ExtractError("SEEK_REDUX_DATA block not found".to_string()))?;
        let job = data
            .jobdetails
            .result
            .job
            .ok_or_else(|| ExtractError("job detail payload missing".to_string()))?;

        let id = job.id.into_string();
        let job_id = JobId::new(id)
            .map_err(|_| ExtractError("job detail payload has no id".to_string()))?;

        Ok(JobDetail {
            job_id,
            status: job.status,
            is_expired: job.is_expired,
            content: html_to_text(&job.content),
            is_verified: job.is_verified,
            expires_at: job
                .expires_at
                .map(|e| e.date_time_utc)
                .filter(|raw| !raw.is_empty())
                .map(|raw| parse_datetime(&raw)),
        })
    }
}

/// Locate and decode the embedded redux state from a rendered page.
fn redux_data(html: &str) -> Option<ReduxData> {
    static REDUX_RE: OnceLock<Regex> = OnceLock::new();
    let re = REDUX_RE.get_or_init(|| {
        Regex::new(r"(?s)window\.SEEK_REDUX_DATA\s*=\s*(\{.*?\});").expect("valid regex")
    });

    let document = Html::parse_document(html);
    let selector = Selector::parse("script").expect("valid selector");

    for script in document.select(&selector) {
        let text: String = script.text().collect();
        if let Some(captures) = re.captures(&text) {
            match serde_json::from_str(&captures[1]) {
                Ok(data) => return Some(data),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to decode SEEK_REDUX_DATA JSON");
                    return None;
                }
            }
        }
    }

    None
}

/// Parse an ISO timestamp, falling back to now on malformed input.
fn parse_datetime(raw: &str) -> DateTime<Utc> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(e) => {
            tracing::warn!(raw, error = %e, "Invalid date format, using current time");
            Utc::now()
        }
    }
}

/// Join a base URL and a relative path, tolerating missing slashes.
fn join_url(base: &str, path: &str) -> String {
    match Url::parse(base).and_then(|b| b.join(path)) {
        Ok(url) => url.to_string(),
        Err(_) => format!("{}/{}", base.trim_end_matches('/'), path),
    }
}

/// Comma-join the non-empty items, `None` when nothing remains.
fn join_nonempty<'a>(items: impl Iterator<Item = &'a str>) -> Option<String> {
    let joined = items
        .filter(|item| !item.is_empty())
        .collect::<Vec<_>>()
        .join(",");
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

/// Flatten a posting body to readable text: entities decoded by the HTML
/// parser, block-level elements becoming line breaks.
fn html_to_text(content: &str) -> String {
    let fragment = Html::parse_fragment(content);
    let mut out = String::new();

    for node in fragment.root_element().descendants() {
        if let Some(text) = node.value().as_text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push(' ');
                }
                out.push_str(trimmed);
            }
        } else if let Some(element) = node.value().as_element() {
            if BLOCK_TAGS.contains(&element.name()) && !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
        }
    }

    out
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReduxData {
    results: ResultsWrapper,
    jobdetails: DetailsWrapper,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResultsWrapper {
    results: ResultsInner,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResultsInner {
    jobs: Vec<RawJob>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawJob {
    id: RawId,
    title: String,
    teaser: String,
    company_name: String,
    locations: Vec<RawLocation>,
    listing_date: String,
    salary_label: Option<String>,
    work_types: Vec<String>,
    classifications: Vec<RawClassification>,
    work_arrangements: Option<RawWorkArrangements>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawLocation {
    label: String,
    country_code: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawClassification {
    classification: RawDescription,
    subclassification: RawDescription,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDescription {
    description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawWorkArrangements {
    display_text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DetailsWrapper {
    result: DetailResult,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DetailResult {
    job: Option<RawDetailJob>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawDetailJob {
    id: RawId,
    status: String,
    is_expired: bool,
    content: String,
    is_verified: Option<bool>,
    expires_at: Option<RawExpiresAt>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawExpiresAt {
    date_time_utc: String,
}

/// Seek serves job ids as numbers on some pages and strings on others.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl Default for RawId {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            Self::Text(id) => id,
            Self::Number(id) => id.to_string(),
        }
    }
}
