//! Crawl orchestration
//!
//! This module contains the main crawl loop, which:
//! - Resets cancellation and resolves the selected sitemaps
//! - Walks the page URLs strictly one at a time
//! - Publishes progress before each page
//! - Isolates each inspection so a failing page never ends the run
//! - Aggregates records and formats the report

use crate::config::Config;
use crate::crawler::fetcher::build_http_client;
use crate::crawler::inspector::PageInspector;
use crate::crawler::render::{HttpRenderer, Renderer};
use crate::output::{format_report, ProductRecord};
use crate::sitemap::SitemapResolver;
use crate::state::{CrawlContext, CrawlRun};
use crate::AuditError;
use std::sync::Arc;
use std::time::Duration;

/// Main crawl orchestrator
pub struct CrawlOrchestrator {
    resolver: SitemapResolver,
    inspector: Arc<PageInspector>,
}

impl CrawlOrchestrator {
    /// Creates an orchestrator from its collaborators
    pub fn new(resolver: SitemapResolver, inspector: PageInspector) -> Self {
        Self {
            resolver,
            inspector: Arc::new(inspector),
        }
    }

    /// Creates an orchestrator that renders pages over plain HTTP
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOrchestrator)` - Ready to crawl
    /// * `Err(AuditError)` - An HTTP client could not be built or a selector is invalid
    pub fn from_config(config: &Config) -> Result<Self, AuditError> {
        let page_client = build_http_client(
            &config.http,
            Duration::from_secs(config.inspector.navigation_timeout_secs),
        )?;
        Self::with_renderer(config, Arc::new(HttpRenderer::new(page_client)))
    }

    /// Creates an orchestrator using the given rendering backend
    pub fn with_renderer(config: &Config, renderer: Arc<dyn Renderer>) -> Result<Self, AuditError> {
        let sitemap_client = build_http_client(
            &config.http,
            Duration::from_secs(config.http.request_timeout_secs),
        )?;
        let resolver = SitemapResolver::new(sitemap_client, config.sitemap.allow_list.clone());
        let inspector = PageInspector::from_config(renderer, &config.inspector)?;
        Ok(Self::new(resolver, inspector))
    }

    /// Returns the sitemap resolver
    pub fn resolver(&self) -> &SitemapResolver {
        &self.resolver
    }

    /// Runs a crawl and returns its bookkeeping
    ///
    /// Cancellation is polled once before each page; a page already being
    /// inspected is never interrupted. A cancelled run comes back with
    /// `cancelled` set and the records gathered so far. The progress stream
    /// is closed after its final event.
    ///
    /// # Arguments
    ///
    /// * `sitemap_urls` - Leaf sitemaps, resolved in order
    /// * `ctx` - Cancellation flag and progress channel for this run
    pub async fn crawl(&self, sitemap_urls: &[String], ctx: &CrawlContext) -> CrawlRun {
        ctx.cancel.reset();
        tracing::info!("Starting scraper for {} sitemaps", sitemap_urls.len());
        ctx.progress.publish(0, "Starting scraping...");

        let urls = self.resolver.resolve_all(sitemap_urls).await;
        let mut run = CrawlRun::new(urls.len());
        let start_time = std::time::Instant::now();

        for (index, url) in urls.iter().enumerate() {
            run.current_index = index;

            if ctx.cancel.is_cancelled() {
                tracing::info!(
                    "Scraping was canceled. Stopping after {}/{} pages",
                    index,
                    run.total_pages
                );
                run.cancelled = true;
                ctx.progress
                    .finish(ctx.progress.last_percent(), "Scraping canceled.")
                    .await;
                return run;
            }

            let percent = CrawlRun::percent_complete(index + 1, run.total_pages);
            ctx.progress.publish(
                percent,
                format!(
                    "Scraping {}/{} pages... ({}%)",
                    index + 1,
                    run.total_pages,
                    percent
                ),
            );
            tracing::info!("Scraping page {}/{}: {}", index + 1, run.total_pages, url);

            match self.inspect_isolated(url).await {
                Some(records) => run.push_records(records),
                None => run.failed_pages += 1,
            }
        }

        tracing::info!(
            "Scraping complete: {} records from {} pages in {:?}",
            run.results.len(),
            run.total_pages,
            start_time.elapsed()
        );
        ctx.progress.finish(100, "Scraping complete.").await;
        run
    }

    /// Runs a crawl and formats the report
    ///
    /// # Returns
    ///
    /// * `Ok(Some(csv))` - The crawl completed; zero matches still yield a
    ///   report with the placeholder row
    /// * `Ok(None)` - The crawl was cancelled; no report is produced
    /// * `Err(AuditError)` - The report could not be formatted
    pub async fn run_scraper(
        &self,
        sitemap_urls: &[String],
        ctx: &CrawlContext,
    ) -> Result<Option<String>, AuditError> {
        let run = self.crawl(sitemap_urls, ctx).await;
        if run.cancelled {
            return Ok(None);
        }
        format_report(&run.results).map(Some)
    }

    /// Inspects one page in its own task
    ///
    /// Returns `None` when the page could not be inspected, including when
    /// the inspection panicked. The task is awaited before returning, so
    /// only one page is ever in flight.
    async fn inspect_isolated(&self, url: &str) -> Option<Vec<ProductRecord>> {
        let inspector = Arc::clone(&self.inspector);
        let page_url = url.to_string();
        let task = tokio::spawn(async move { inspector.try_inspect(&page_url).await });

        match task.await {
            Ok(Ok(records)) => {
                tracing::debug!("Page {} yielded {} records", url, records.len());
                Some(records)
            }
            Ok(Err(e)) => {
                tracing::warn!("Skipping page: {}", e);
                None
            }
            Err(e) => {
                tracing::error!("Inspection of {} aborted: {}", url, e);
                None
            }
        }
    }
}
