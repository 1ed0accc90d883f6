use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag for a crawl
///
/// Clones share the same flag, so one handle can be given to a signal
/// handler while the crawl loop polls another. The flag is only checked
/// between pages; a page already being inspected runs to completion.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token in the not-cancelled state
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of whichever run is using this token
    pub fn request_cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
        tracing::info!("Scraping has been manually canceled");
    }

    /// Clears any pending cancellation request
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested and not reset since
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
