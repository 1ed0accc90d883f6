//! Per-run crawl state
//!
//! `CrawlContext` carries the signals shared with the outside world
//! (cancellation in, progress out). `CrawlRun` is the transient
//! bookkeeping of one orchestration call.

use crate::output::ProductRecord;
use crate::state::{CancellationToken, ProgressBroadcaster};

/// Signals shared between a crawl and its caller
#[derive(Debug, Default)]
pub struct CrawlContext {
    /// Cancellation flag polled once per page
    pub cancel: CancellationToken,

    /// Progress channel fed by the crawl loop
    pub progress: ProgressBroadcaster,
}

impl CrawlContext {
    /// Creates a context whose progress subscriber buffers `progress_capacity` events
    pub fn new(progress_capacity: usize) -> Self {
        Self {
            cancel: CancellationToken::new(),
            progress: ProgressBroadcaster::new(progress_capacity),
        }
    }

    /// Returns a handle that can cancel this context from another task
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

/// Bookkeeping for one crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlRun {
    /// Number of pages resolved from the sitemaps
    pub total_pages: usize,

    /// Index of the page currently being inspected
    pub current_index: usize,

    /// Whether the run stopped on a cancellation request
    pub cancelled: bool,

    /// Pages whose inspection failed outright
    pub failed_pages: usize,

    /// Records in page order
    pub results: Vec<ProductRecord>,
}

impl CrawlRun {
    /// Starts a run over `total_pages` pages
    pub fn new(total_pages: usize) -> Self {
        Self {
            total_pages,
            ..Self::default()
        }
    }

    /// Completion percentage once `completed` of `total_pages` pages are done
    ///
    /// Rounds half up. Zero pages counts as complete.
    pub fn percent_complete(completed: usize, total_pages: usize) -> u8 {
        if total_pages == 0 {
            return 100;
        }
        let completed = completed.min(total_pages);
        ((completed * 200 + total_pages) / (total_pages * 2)) as u8
    }

    /// Appends the records of one page
    pub fn push_records(&mut self, records: Vec<ProductRecord>) {
        self.results.extend(records);
    }
}
