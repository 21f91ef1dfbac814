//! Storage module for persisting scraped records
//!
//! This module handles all database operations for the scraper, including:
//! - SQLite database initialization and schema management
//! - Existence checks backing the skip-if-present policy
//! - Slug lookups used to resolve foreign keys
//! - Row counts for statistics

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::ScrapeError;
use chrono::NaiveDateTime;
use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(ScrapeError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> Result<SqliteStorage, ScrapeError> {
    SqliteStorage::new(path)
}

/// Represents a brewery in the database
#[derive(Debug, Clone, PartialEq)]
pub struct BreweryRecord {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// Represents a beer in the database
#[derive(Debug, Clone, PartialEq)]
pub struct BeerRecord {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub alc_percentage: Option<f64>,
    pub brewery_id: Option<i64>,
}

/// Represents a user in the database
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
}

/// A user about to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    /// Fixed id for sentinel accounts; `None` lets the store assign one
    pub id: Option<i64>,
    pub name: String,
    pub slug: Option<String>,
}

/// Represents a review in the database
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRecord {
    pub id: i64,
    pub percentage: Option<f64>,
    pub comment: String,
    pub date: NaiveDateTime,
    pub beer_id: i64,
    pub user_id: i64,
}
