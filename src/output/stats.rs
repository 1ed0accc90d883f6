//! Statistics summarizing a finished crawl

use crate::state::CrawlRun;
use std::collections::HashSet;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Pages resolved from the sitemaps
    pub total_pages: usize,

    /// Pages whose inspection failed outright
    pub failed_pages: usize,

    /// Distinct pages with at least one product card
    pub pages_with_cards: usize,

    /// Product cards found across all pages
    pub cards_found: usize,

    /// Product cards whose image is missing
    pub cards_missing_image: usize,
}

impl CrawlStatistics {
    /// Computes statistics from a completed run
    pub fn from_run(run: &CrawlRun) -> Self {
        let pages_with_cards = run
            .results
            .iter()
            .map(|r| r.page_url.as_str())
            .collect::<HashSet<_>>()
            .len();

        Self {
            total_pages: run.total_pages,
            failed_pages: run.failed_pages,
            pages_with_cards,
            cards_found: run.results.len(),
            cards_missing_image: run.results.iter().filter(|r| r.is_missing).count(),
        }
    }

    /// Share of cards with a missing image, as a percentage
    pub fn missing_rate(&self) -> f64 {
        if self.cards_found == 0 {
            return 0.0;
        }
        (self.cards_missing_image as f64 / self.cards_found as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Image Audit Statistics ===\n");

    println!("Overview:");
    println!("  Pages inspected: {}", stats.total_pages);
    println!("  Pages with product cards: {}", stats.pages_with_cards);
    println!("  Pages failed: {}", stats.failed_pages);
    println!("  Product cards found: {}", stats.cards_found);
    println!();

    println!(
        "Missing Images: {} ({:.1}% of cards)",
        stats.cards_missing_image,
        stats.missing_rate()
    );
}
