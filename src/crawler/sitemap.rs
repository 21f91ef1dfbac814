//! Sitemap discovery
//!
//! The sitemap is the only source of brewery and beer URLs. Its `<loc>`
//! entries are pulled out with a pattern match over the raw text and sorted
//! into sections by URL path, preserving document order.

use crate::crawler::fetcher::fetch_page;
use crate::extract::PageKind;
use crate::ScrapeError;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use url::Url;

static LOC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<loc>\s*(?P<url>[^<\s]+?)\s*</loc>").unwrap());

/// Entity page URLs listed in the sitemap
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitemapUrls {
    /// `/brauereien/<slug>.html` pages, in document order
    pub breweries: Vec<String>,
    /// `/biere/<slug>.html` pages, in document order
    pub beers: Vec<String>,
}

impl SitemapUrls {
    /// Sorts sitemap locations into brewery and beer pages
    ///
    /// Locations that are not absolute URLs or belong to another section
    /// are dropped. Duplicates are kept.
    pub fn from_locations<I>(locations: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut urls = Self::default();
        for location in locations {
            let kind = match Url::parse(&location) {
                Ok(parsed) => PageKind::classify(&parsed),
                Err(_) => None,
            };
            match kind {
                Some(PageKind::Brewery) => urls.breweries.push(location),
                Some(PageKind::Beer) => urls.beers.push(location),
                _ => {}
            }
        }
        urls
    }
}

/// Extracts every `<loc>` value from a sitemap document, in order
pub fn extract_sitemap_locations(document: &str) -> Vec<String> {
    LOC_RE
        .captures_iter(document)
        .map(|caps| caps["url"].replace("&amp;", "&"))
        .collect()
}

/// Fetches the sitemap and returns the brewery and beer URLs it lists
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `sitemap_url` - Absolute URL of the sitemap document
///
/// # Returns
///
/// * `Ok(SitemapUrls)` - The classified page URLs
/// * `Err(ScrapeError)` - The sitemap could not be fetched
pub async fn fetch_sitemap(client: &Client, sitemap_url: &str) -> Result<SitemapUrls, ScrapeError> {
    let sitemap = fetch_page(client, sitemap_url).await?;
    let locations = extract_sitemap_locations(&sitemap.body);
    tracing::debug!("Sitemap lists {} locations", locations.len());
    Ok(SitemapUrls::from_locations(locations))
}
