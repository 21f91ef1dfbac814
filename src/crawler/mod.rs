//! Crawler module for fetching and storing bier-index.de pages
//!
//! This module contains the scrape pipeline around the pure extractors:
//! - Sitemap discovery of brewery and beer pages
//! - Concurrent HTTP fetching
//! - Author reconciliation against stored users
//! - Phase orchestration and transaction handling

mod coordinator;
mod fetcher;
mod reconciler;
mod sitemap;

pub use coordinator::{run_scrape, Coordinator, ItemOutcome, PhaseReport, ScrapeReport};
pub use fetcher::{build_http_client, fetch_all, fetch_page, FetchedPage};
pub use reconciler::{
    resolve_author, EDITORIAL_ID, EDITORIAL_NAME, UNKNOWN_AUTHOR_ID, UNKNOWN_AUTHOR_NAME,
};
pub use sitemap::{extract_sitemap_locations, fetch_sitemap, SitemapUrls};
