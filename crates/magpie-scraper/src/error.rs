use magpie_browser::BrowserError;
use magpie_db::DatabaseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("fetch failed for {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: BrowserError,
    },

    #[error("extraction failed for {url}: {reason}")]
    Extract { url: String, reason: String },

    #[error("{operation} failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        operation: String,
        attempts: u32,
        #[source]
        source: Box<ScrapeError>,
    },

    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("browser error: {0}")]
    Browser(#[from] BrowserError),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
