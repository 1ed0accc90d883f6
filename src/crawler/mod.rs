//! Crawler module for page inspection and crawl orchestration
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and client construction
//! - Product card extraction from HTML
//! - Pluggable rendering contexts
//! - Per-page inspection with contained failures
//! - The sequential, cancellable crawl loop

mod coordinator;
mod fetcher;
mod inspector;
mod parser;
mod render;

pub use coordinator::CrawlOrchestrator;
pub use fetcher::{build_http_client, fetch_page, FetchedPage};
pub use inspector::PageInspector;
pub use parser::{extract_cards, CardMatch, CardSelectors};
pub use render::{HttpRenderer, RenderContext, Renderer};

use crate::config::Config;
use crate::state::CrawlContext;
use crate::AuditError;

/// Runs a complete crawl over the given leaf sitemaps
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP clients and page renderer
/// 2. Resolve the sitemaps into page URLs
/// 3. Inspect every page in order, publishing progress on `ctx`
/// 4. Format the CSV report
///
/// # Returns
///
/// * `Ok(Some(csv))` - Crawl completed
/// * `Ok(None)` - Crawl was cancelled through `ctx`
/// * `Err(AuditError)` - Setup or report formatting failed
pub async fn run_scraper(
    config: &Config,
    sitemap_urls: &[String],
    ctx: &CrawlContext,
) -> Result<Option<String>, AuditError> {
    CrawlOrchestrator::from_config(config)?
        .run_scraper(sitemap_urls, ctx)
        .await
}
