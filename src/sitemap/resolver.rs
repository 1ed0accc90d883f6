//! Sitemap resolver
//!
//! Fetches sitemap documents over HTTP and turns them into URL lists.

use crate::sitemap::parser::{filter_entries, parse_sitemap, SitemapDocument};
use crate::{SitemapError, SitemapResult};
use reqwest::Client;
use url::Url;

/// Fetches and resolves XML sitemaps
#[derive(Debug, Clone)]
pub struct SitemapResolver {
    client: Client,
    allow_list: Vec<String>,
}

impl SitemapResolver {
    /// Creates a resolver
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client used for every sitemap request
    /// * `allow_list` - Substrings kept when a sitemap index is filtered
    pub fn new(client: Client, allow_list: Vec<String>) -> Self {
        Self { client, allow_list }
    }

    /// Returns the configured allow-list
    pub fn allow_list(&self) -> &[String] {
        &self.allow_list
    }

    /// Fetches one sitemap and parses it
    ///
    /// # Returns
    ///
    /// * `Ok(SitemapDocument)` - The parsed index or urlset
    /// * `Err(SitemapError::InvalidUrl | Fetch | Status)` - The document could not be retrieved
    /// * `Err(SitemapError::Parse)` - The body is not a sitemap
    pub async fn fetch_document(&self, url: &str) -> SitemapResult<SitemapDocument> {
        let parsed = Url::parse(url).map_err(|source| SitemapError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        tracing::debug!("Fetching sitemap: {}", url);

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|source| SitemapError::Fetch {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SitemapError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| SitemapError::Fetch {
            url: url.to_string(),
            source,
        })?;

        parse_sitemap(&body).map_err(|message| SitemapError::Parse {
            url: url.to_string(),
            message,
        })
    }

    /// Resolves a sitemap URL into the locations it lists
    ///
    /// A `<sitemapindex>` yields its sub-sitemap locations, filtered by the
    /// allow-list when `filter` is set. A `<urlset>` yields its page URLs
    /// unchanged.
    pub async fn resolve_sitemap_index(&self, url: &str, filter: bool) -> SitemapResult<Vec<String>> {
        match self.fetch_document(url).await? {
            SitemapDocument::Index(locs) if filter => {
                let total = locs.len();
                let kept = filter_entries(locs, &self.allow_list);
                tracing::info!(
                    "Sitemap index {}: kept {} of {} sub-sitemaps",
                    url,
                    kept.len(),
                    total
                );
                Ok(kept)
            }
            doc => {
                let locs = doc.into_locations();
                tracing::info!("Sitemap {}: found {} entries", url, locs.len());
                Ok(locs)
            }
        }
    }

    /// Resolves a leaf sitemap into page URLs
    ///
    /// A `<sitemapindex>` is rejected with a parse error since its entries
    /// are sitemaps, not pages.
    pub async fn resolve_urlset(&self, url: &str) -> SitemapResult<Vec<String>> {
        match self.fetch_document(url).await? {
            SitemapDocument::UrlSet(locs) => Ok(locs),
            SitemapDocument::Index(_) => Err(SitemapError::Parse {
                url: url.to_string(),
                message: "expected <urlset>, found <sitemapindex>".to_string(),
            }),
        }
    }

    /// Resolves every leaf sitemap in order and concatenates their page URLs
    ///
    /// A sitemap that fails to fetch or parse is logged and skipped; the
    /// remaining sitemaps are still resolved. Duplicates are kept.
    pub async fn resolve_all(&self, sitemap_urls: &[String]) -> Vec<String> {
        let mut pages = Vec::new();

        for sitemap_url in sitemap_urls {
            match self.resolve_urlset(sitemap_url).await {
                Ok(urls) => {
                    tracing::debug!("Sitemap {} listed {} pages", sitemap_url, urls.len());
                    pages.extend(urls);
                }
                Err(e) => {
                    tracing::error!("Skipping sitemap: {}", e);
                }
            }
        }

        tracing::info!("Total product pages found: {}", pages.len());
        pages
    }
}
