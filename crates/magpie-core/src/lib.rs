//! Magpie Core - Foundation crate for the magpie job scraper.
//!
//! This crate provides the shared record types, error handling, and
//! configuration management that all other magpie crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared record types (`JobId`, `JobListing`, `JobDetail`, `TraversalMode`)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, BrowserConfig, SiteConfig, StorageConfig};
pub use error::{ConfigError, ConfigResult, MagpieError, Result};
pub use types::{JobDetail, JobId, JobListing, TraversalMode};
