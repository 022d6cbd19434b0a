//! Browser fetch layer for JavaScript-heavy job boards.
//!
//! Provides headless browser control with randomized fingerprinting and a
//! navigable-page abstraction: load a URL, wait for the page to quiesce,
//! return rendered content.

pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod page;

pub use engine::BrowserEngine;
pub use error::{BrowserError, Result};
pub use fingerprint::FingerprintConfig;
pub use page::{HeadlessPage, NavigablePage, PageSource};
