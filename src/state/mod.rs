//! Run state management
//!
//! Cancellation, progress reporting and per-run bookkeeping for a crawl.

mod cancel;
mod progress;
mod run;

pub use cancel::CancellationToken;
pub use progress::{ProgressBroadcaster, ProgressEvent};
pub use run::{CrawlContext, CrawlRun};
