//! Scrape coordinator - main orchestration logic
//!
//! This module drives the three scrape phases in order:
//! 1. Breweries listed in the sitemap
//! 2. Beers listed in the sitemap, with their embedded reviews and authors
//! 3. Descriptions of every member created during phase 2
//!
//! Pages are fetched concurrently; extraction and all storage access happen
//! on the task consuming the fetch stream. Each page (and each review) has
//! its own failure boundary: errors are logged and the item is skipped.
//! Each phase runs in one transaction that is committed when the phase ends.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_all, FetchedPage};
use crate::crawler::reconciler::resolve_author;
use crate::crawler::sitemap::fetch_sitemap;
use crate::extract::{
    parse_beer_page, parse_brewery_page, parse_user_page, ExtractError, ParsedReview, PageKind,
    ReviewSection,
};
use crate::storage::{BeerRecord, BreweryRecord, ReviewRecord, SqliteStorage, Storage};
use crate::ScrapeError;
use futures::StreamExt;
use reqwest::Client;
use std::path::Path;

/// Number of pages between progress log lines
const PROGRESS_INTERVAL: usize = 50;

/// What happened to a single page or review
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// The record was written
    Stored,
    /// A record with the same id already exists; nothing was written
    AlreadyPresent,
}

/// Tally of one phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseReport {
    /// Items attempted (URLs for page phases, sections for reviews)
    pub total: usize,
    pub stored: usize,
    pub skipped: usize,
    /// Items lost to fetch, extraction or storage errors
    pub failed: usize,
}

impl PhaseReport {
    fn record(&mut self, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Stored => self.stored += 1,
            ItemOutcome::AlreadyPresent => self.skipped += 1,
        }
    }
}

/// Tally of a complete run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeReport {
    pub breweries: PhaseReport,
    pub beers: PhaseReport,
    pub reviews: PhaseReport,
    pub users: PhaseReport,
}

/// Main scrape coordinator structure
pub struct Coordinator<S: Storage = SqliteStorage> {
    config: Config,
    storage: S,
    client: Client,
}

impl Coordinator<SqliteStorage> {
    /// Creates a coordinator writing to the configured database file
    ///
    /// # Arguments
    ///
    /// * `config` - The scraper configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(ScrapeError)` - Failed to open the database or build the client
    pub fn new(config: Config) -> Result<Self, ScrapeError> {
        let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
        Self::with_storage(config, storage)
    }
}

impl<S: Storage> Coordinator<S> {
    /// Creates a coordinator writing to the given storage backend
    pub fn with_storage(config: Config, storage: S) -> Result<Self, ScrapeError> {
        let client = build_http_client(&config.scraper)?;
        Ok(Self {
            config,
            storage,
            client,
        })
    }

    /// Read access to the storage backend
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Consumes the coordinator, returning its storage backend
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Runs all three phases
    ///
    /// # Returns
    ///
    /// * `Ok(ScrapeReport)` - Every phase ran to completion; individual items
    ///   may still have failed and are counted in the report
    /// * `Err(ScrapeError)` - The sitemap could not be fetched or a phase
    ///   could not be committed
    pub async fn run(&mut self) -> Result<ScrapeReport, ScrapeError> {
        let sitemap_url = self.config.scraper.sitemap_url()?;
        tracing::info!("Fetching sitemap {}", sitemap_url);
        let sitemap = fetch_sitemap(&self.client, sitemap_url.as_str()).await?;
        tracing::info!(
            "Sitemap lists {} breweries and {} beers",
            sitemap.breweries.len(),
            sitemap.beers.len()
        );

        let breweries = self
            .run_phase("breweries", sitemap.breweries, |this, page| {
                this.process_brewery(page)
            })
            .await?;

        let mut reviews = PhaseReport::default();
        let beers = self
            .run_phase("beers", sitemap.beers, |this, page| {
                this.process_beer(page, &mut reviews)
            })
            .await?;
        tracing::info!(
            "Reviews: {} stored, {} already present, {} failed",
            reviews.stored,
            reviews.skipped,
            reviews.failed
        );

        let users = self.scrape_users().await?;

        Ok(ScrapeReport {
            breweries,
            beers,
            reviews,
            users,
        })
    }

    /// Backfills the description of every member account
    async fn scrape_users(&mut self) -> Result<PhaseReport, ScrapeError> {
        let members = self.storage.list_members()?;
        let mut urls = Vec::with_capacity(members.len());
        for slug in members.iter().filter_map(|user| user.slug.as_deref()) {
            urls.push(self.config.scraper.page_url(PageKind::User, slug)?.to_string());
        }

        self.run_phase("users", urls, |this, page| this.process_user(page))
            .await
    }

    /// Fetches `urls` and feeds every page to `process` inside one transaction
    async fn run_phase<F>(
        &mut self,
        name: &'static str,
        urls: Vec<String>,
        mut process: F,
    ) -> Result<PhaseReport, ScrapeError>
    where
        F: FnMut(&mut Self, &FetchedPage) -> Result<ItemOutcome, ScrapeError>,
    {
        let mut report = PhaseReport {
            total: urls.len(),
            ..PhaseReport::default()
        };
        tracing::info!("Scraping {} {}", report.total, name);

        let client = self.client.clone();
        let start_time = std::time::Instant::now();
        let mut pages = fetch_all(&client, urls, self.config.scraper.concurrency);
        let mut processed = 0;

        self.storage.begin()?;

        while let Some((url, result)) = pages.next().await {
            match result {
                Ok(page) => match process(&mut *self, &page) {
                    Ok(outcome) => {
                        if outcome == ItemOutcome::AlreadyPresent {
                            tracing::debug!("Skipping {}: already stored", page.final_url);
                        }
                        report.record(outcome);
                    }
                    Err(e) => {
                        report.failed += 1;
                        tracing::error!("Error while parsing {} page {}: {}", name, page.final_url, e);
                    }
                },
                Err(e) => {
                    report.failed += 1;
                    tracing::error!("Failed to fetch {}: {}", url, e);
                }
            }

            processed += 1;
            if processed % PROGRESS_INTERVAL == 0 {
                tracing::info!(
                    "Progress: {}/{} {} processed, {:.2} pages/sec",
                    processed,
                    report.total,
                    name,
                    processed as f64 / start_time.elapsed().as_secs_f64()
                );
            }
        }

        self.storage.commit()?;

        tracing::info!(
            "Finished {} in {:?}: {} stored, {} already present, {} failed",
            name,
            start_time.elapsed(),
            report.stored,
            report.skipped,
            report.failed
        );

        Ok(report)
    }

    /// Stores the brewery on a fetched brewery page unless its id is known
    pub fn process_brewery(&mut self, page: &FetchedPage) -> Result<ItemOutcome, ScrapeError> {
        let brewery = parse_brewery_page(&page.body, &page.final_url)
            .map_err(|source| extract_error(page, source))?;

        if self.storage.brewery_exists(brewery.id)? {
            return Ok(ItemOutcome::AlreadyPresent);
        }

        self.storage.insert_brewery(&BreweryRecord {
            id: brewery.id,
            name: brewery.name,
            slug: brewery.slug,
        })?;

        Ok(ItemOutcome::Stored)
    }

    /// Stores the beer on a fetched beer page, then each of its reviews
    ///
    /// A beer whose id is already known is skipped together with its
    /// reviews. Review failures are logged and tallied in `reviews`; they
    /// never undo the beer.
    pub fn process_beer(
        &mut self,
        page: &FetchedPage,
        reviews: &mut PhaseReport,
    ) -> Result<ItemOutcome, ScrapeError> {
        let beer = parse_beer_page(&page.body, &page.final_url)
            .map_err(|source| extract_error(page, source))?;

        if self.storage.beer_exists(beer.id)? {
            return Ok(ItemOutcome::AlreadyPresent);
        }

        let brewery_id = match beer.brewery_slug.as_deref() {
            Some(slug) => self.storage.find_brewery_id(slug)?,
            None => None,
        };
        if brewery_id.is_none() {
            tracing::debug!("Beer {} has no known brewery", beer.slug);
        }

        self.storage.insert_beer(&BeerRecord {
            id: beer.id,
            name: beer.name,
            slug: beer.slug,
            alc_percentage: beer.alc_percentage,
            brewery_id,
        })?;

        for ReviewSection { markup, review } in beer.reviews {
            reviews.total += 1;
            let outcome = review
                .map_err(|source| extract_error(page, source))
                .and_then(|review| self.store_review(review, beer.id));

            match outcome {
                Ok(outcome) => reviews.record(outcome),
                Err(e) => {
                    reviews.failed += 1;
                    tracing::error!("Error while parsing review: {}\n{}", e, markup);
                }
            }
        }

        Ok(ItemOutcome::Stored)
    }

    /// Stores one review of `beer_id`, resolving its author first
    fn store_review(&mut self, review: ParsedReview, beer_id: i64) -> Result<ItemOutcome, ScrapeError> {
        if self.storage.review_exists(review.id)? {
            return Ok(ItemOutcome::AlreadyPresent);
        }

        let user_id = resolve_author(&mut self.storage, &review.author)?;

        self.storage.insert_review(&ReviewRecord {
            id: review.id,
            percentage: review.rating,
            comment: review.comment,
            date: review.published_at,
            beer_id,
            user_id,
        })?;

        Ok(ItemOutcome::Stored)
    }

    /// Updates the description of the member whose profile page was fetched
    pub fn process_user(&mut self, page: &FetchedPage) -> Result<ItemOutcome, ScrapeError> {
        let user = parse_user_page(&page.body, &page.final_url)
            .map_err(|source| extract_error(page, source))?;

        self.storage
            .update_user_description(&user.slug, &user.description)?;

        Ok(ItemOutcome::Stored)
    }
}

fn extract_error(page: &FetchedPage, source: ExtractError) -> ScrapeError {
    ScrapeError::Extract {
        url: page.final_url.clone(),
        source,
    }
}

/// Runs a complete scrape against the configured database
///
/// # Example
///
/// ```no_run
/// use bier_index_scraper::config::Config;
/// use bier_index_scraper::crawler::run_scrape;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_scrape(Config::default()).await?;
/// println!("{} beers stored", report.beers.stored);
/// # Ok(())
/// # }
/// ```
pub async fn run_scrape(config: Config) -> Result<ScrapeReport, ScrapeError> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
