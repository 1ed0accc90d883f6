//! Page inspector
//!
//! Drives one rendering context per page and turns matched product cards
//! into [`ProductRecord`]s.

use crate::config::InspectorConfig;
use crate::crawler::parser::CardSelectors;
use crate::crawler::render::{RenderContext, Renderer};
use crate::output::ProductRecord;
use crate::{ConfigError, NavigationError};
use futures::FutureExt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

/// Extracts product records from single pages
pub struct PageInspector {
    renderer: Arc<dyn Renderer>,
    selectors: CardSelectors,
    navigation_timeout: Duration,
}

impl PageInspector {
    /// Creates an inspector
    ///
    /// # Arguments
    ///
    /// * `renderer` - Backend that opens a rendering context per page
    /// * `selectors` - Product card selectors
    /// * `navigation_timeout` - Upper bound on loading one page
    pub fn new(
        renderer: Arc<dyn Renderer>,
        selectors: CardSelectors,
        navigation_timeout: Duration,
    ) -> Self {
        Self {
            renderer,
            selectors,
            navigation_timeout,
        }
    }

    /// Creates an inspector from the inspector configuration
    pub fn from_config(
        renderer: Arc<dyn Renderer>,
        config: &InspectorConfig,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(
            renderer,
            CardSelectors::from_config(config)?,
            Duration::from_secs(config.navigation_timeout_secs),
        ))
    }

    /// Inspects a page, returning no records if it cannot be loaded
    ///
    /// Never fails: navigation errors and timeouts are logged and yield an
    /// empty list. This is the convenience entry point for callers that do
    /// not track failed pages; the crawl loop uses [`Self::try_inspect`] so
    /// it can count them.
    pub async fn inspect(&self, page_url: &str) -> Vec<ProductRecord> {
        match self.try_inspect(page_url).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Skipping page: {}", e);
                Vec::new()
            }
        }
    }

    /// Inspects a page, reporting navigation failures
    ///
    /// The rendering context is closed on every path once it was opened,
    /// including when the backend panics. The panic is resumed after the
    /// context is released.
    pub async fn try_inspect(&self, page_url: &str) -> Result<Vec<ProductRecord>, NavigationError> {
        let mut context = self.renderer.open().await?;

        let outcome = AssertUnwindSafe(self.load_and_extract(context.as_mut(), page_url))
            .catch_unwind()
            .await;

        context.close().await;

        match outcome {
            Ok(outcome) => outcome,
            Err(payload) => {
                tracing::error!("Rendering backend panicked on {}", page_url);
                panic::resume_unwind(payload)
            }
        }
    }

    /// Navigates an open context and collects its product cards
    async fn load_and_extract(
        &self,
        context: &mut dyn RenderContext,
        page_url: &str,
    ) -> Result<Vec<ProductRecord>, NavigationError> {
        match tokio::time::timeout(self.navigation_timeout, context.goto(page_url)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                return Err(NavigationError::Timeout {
                    url: page_url.to_string(),
                    seconds: self.navigation_timeout.as_secs(),
                })
            }
        }

        let final_url = context
            .current_url()
            .unwrap_or_else(|| page_url.to_string());

        let records: Vec<ProductRecord> = context
            .select_cards(&self.selectors)
            .into_iter()
            .map(|card| {
                ProductRecord::from_card(&final_url, card.name.as_deref(), card.image_src.as_deref())
            })
            .collect();

        tracing::debug!(
            "Found {} product cards on {} ({} missing images)",
            records.len(),
            final_url,
            records.iter().filter(|r| r.is_missing).count()
        );
        Ok(records)
    }
}
