//! Concrete site adapters for the magpie scrape engine.
//!
//! Each adapter implements [`magpie_scraper::SiteAdapter`]: pure URL
//! building and extraction for one job board. Seek is the only adapter so
//! far; the trait is the seam for adding more.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod seek;

pub use seek::SeekSite;

/// Site names selectable from the CLI.
#[must_use]
pub fn available_sites() -> &'static [&'static str] {
    &["seek"]
}
