//! Sitemap module
//!
//! Resolves sitemap indexes and leaf urlsets into the page URLs to inspect.

mod parser;
mod resolver;

pub use parser::{filter_entries, parse_sitemap, SitemapDocument};
pub use resolver::SitemapResolver;
