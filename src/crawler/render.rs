//! Rendering backends
//!
//! A [`Renderer`] opens isolated [`RenderContext`]s; each context loads one
//! page and answers product card queries against its DOM. The bundled
//! [`HttpRenderer`] fetches the page over HTTP and queries the parsed HTML.
//! A headless-browser backend can be plugged in by implementing the traits.

use crate::crawler::fetcher::fetch_page;
use crate::crawler::parser::{extract_cards, CardMatch, CardSelectors};
use crate::NavigationError;
use async_trait::async_trait;
use reqwest::Client;

/// Factory for isolated rendering contexts
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Opens a fresh context that shares no DOM state with any other
    async fn open(&self) -> Result<Box<dyn RenderContext>, NavigationError>;
}

/// One rendering session
#[async_trait]
pub trait RenderContext: Send {
    /// Navigates to `url` and waits until the DOM is parsed
    async fn goto(&mut self, url: &str) -> Result<(), NavigationError>;

    /// URL of the loaded document after redirects
    fn current_url(&self) -> Option<String>;

    /// Returns every product card in the loaded document
    fn select_cards(&self, selectors: &CardSelectors) -> Vec<CardMatch>;

    /// Releases the context
    async fn close(&mut self);
}

/// Renderer backed by plain HTTP fetches and static HTML parsing
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    /// Creates a renderer; the client's timeout bounds each navigation
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn open(&self) -> Result<Box<dyn RenderContext>, NavigationError> {
        Ok(Box::new(HttpRenderContext {
            client: self.client.clone(),
            current_url: None,
            html: None,
        }))
    }
}

struct HttpRenderContext {
    client: Client,
    current_url: Option<String>,
    html: Option<String>,
}

#[async_trait]
impl RenderContext for HttpRenderContext {
    async fn goto(&mut self, url: &str) -> Result<(), NavigationError> {
        let page = fetch_page(&self.client, url).await?;
        tracing::debug!(
            "Loaded {} (HTTP {}, {}, {} bytes)",
            page.final_url,
            page.status_code,
            page.content_type,
            page.body.len()
        );

        self.current_url = Some(page.final_url);
        self.html = Some(page.body);
        Ok(())
    }

    fn current_url(&self) -> Option<String> {
        self.current_url.clone()
    }

    fn select_cards(&self, selectors: &CardSelectors) -> Vec<CardMatch> {
        self.html
            .as_deref()
            .map(|html| extract_cards(html, selectors))
            .unwrap_or_default()
    }

    async fn close(&mut self) {
        self.html = None;
        self.current_url = None;
    }
}
