//! Image-Audit: a sitemap-driven product card inspector
//!
//! This crate resolves XML sitemaps into page URLs, renders each page,
//! finds product cards whose image is missing and writes a CSV report.

pub mod config;
pub mod crawler;
pub mod output;
pub mod sitemap;
pub mod state;

use thiserror::Error;

/// Main error type for Image-Audit operations
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Sitemap error: {0}")]
    Sitemap(#[from] SitemapError),

    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Report error: {0}")]
    Report(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid CSS selector in config: {0}")]
    InvalidSelector(String),
}

/// Errors raised while fetching or parsing a sitemap
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("Invalid sitemap URL {url}: {source}")]
    InvalidUrl {
        url: String,
        source: ::url::ParseError,
    },

    #[error("Failed to fetch sitemap {url}: {source}")]
    Fetch { url: String, source: reqwest::Error },

    #[error("Sitemap {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to parse sitemap {url}: {message}")]
    Parse { url: String, message: String },
}

/// Errors raised while rendering a single page
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("Navigation to {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },

    #[error("Navigation to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("Page {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to open rendering context: {0}")]
    Context(String),
}

/// Result type alias for Image-Audit operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for sitemap operations
pub type SitemapResult<T> = std::result::Result<T, SitemapError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlOrchestrator, PageInspector};
pub use output::{format_report, ProductRecord};
pub use sitemap::SitemapResolver;
pub use state::{CancellationToken, CrawlContext, ProgressBroadcaster, ProgressEvent};
