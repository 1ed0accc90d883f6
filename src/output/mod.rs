//! Output module for audit reports
//!
//! This module handles:
//! - The product record written per matched card
//! - Formatting records as CSV and persisting report files
//! - Summary statistics for a finished crawl

mod csv_report;
mod record;
pub mod stats;

pub use csv_report::{format_report, latest_report, save_report, REPORT_PREFIX};
pub use record::{ProductRecord, NO_IMAGE, NO_PRODUCT_FOUND, UNKNOWN_PRODUCT};
pub use stats::{print_statistics, CrawlStatistics};
