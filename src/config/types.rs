use crate::extract::PageKind;
use serde::Deserialize;
use url::Url;

/// Main configuration structure for the scraper
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Scraping behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Site root every page URL is built from
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the sitemap document relative to the base URL
    #[serde(rename = "sitemap-path")]
    pub sitemap_path: String,

    /// Maximum number of concurrent page fetches
    pub concurrency: usize,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.bier-index.de".to_string(),
            sitemap_path: "/sitemap.xml".to_string(),
            concurrency: 16,
            request_timeout: 30,
            user_agent: concat!("bier-index-scraper/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ScraperConfig {
    /// Parses the configured base URL
    pub fn base(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.base_url)
    }

    /// Absolute URL of the sitemap document
    pub fn sitemap_url(&self) -> Result<Url, url::ParseError> {
        self.base()?.join(&self.sitemap_path)
    }

    /// Absolute URL of the page for `slug` in the section of `kind`
    pub fn page_url(&self, kind: PageKind, slug: &str) -> Result<Url, url::ParseError> {
        self.base()?
            .join(&format!("{}{}{}", kind.path_prefix(), slug, PageKind::SUFFIX))
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "bier-index.db".to_string(),
        }
    }
}
