//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::storage::{BeerRecord, BreweryRecord, NewUser, ReviewRecord, UserRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Malformed stored value: {0}")]
    Serialization(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// The scraper reads and writes through this trait from a single task, so
/// implementations need no internal locking. Every `insert_*` expects the
/// caller to have checked existence first; inserting a duplicate id or slug
/// is a constraint violation.
pub trait Storage {
    // ===== Transactions =====

    /// Opens a transaction spanning all following writes
    fn begin(&mut self) -> StorageResult<()>;

    /// Commits the open transaction
    fn commit(&mut self) -> StorageResult<()>;

    // ===== Breweries =====

    fn brewery_exists(&self, id: i64) -> StorageResult<bool>;

    fn insert_brewery(&mut self, brewery: &BreweryRecord) -> StorageResult<()>;

    /// Looks up a brewery id by its slug
    fn find_brewery_id(&self, slug: &str) -> StorageResult<Option<i64>>;

    // ===== Beers =====

    fn beer_exists(&self, id: i64) -> StorageResult<bool>;

    fn insert_beer(&mut self, beer: &BeerRecord) -> StorageResult<()>;

    fn get_beer(&self, id: i64) -> StorageResult<Option<BeerRecord>>;

    // ===== Users =====

    fn user_exists(&self, id: i64) -> StorageResult<bool>;

    /// Inserts a user and returns its id
    ///
    /// When `user.id` is `None` the store assigns the id.
    fn insert_user(&mut self, user: &NewUser) -> StorageResult<i64>;

    /// Looks up a user id by its slug
    fn find_user_id(&self, slug: &str) -> StorageResult<Option<i64>>;

    fn get_user(&self, id: i64) -> StorageResult<Option<UserRecord>>;

    /// Gets all registered members, i.e. users with a non-negative id
    fn list_members(&self) -> StorageResult<Vec<UserRecord>>;

    /// Replaces the description of the user with the given slug
    fn update_user_description(&mut self, slug: &str, description: &str) -> StorageResult<()>;

    // ===== Reviews =====

    fn review_exists(&self, id: i64) -> StorageResult<bool>;

    fn insert_review(&mut self, review: &ReviewRecord) -> StorageResult<()>;

    fn get_review(&self, id: i64) -> StorageResult<Option<ReviewRecord>>;

    // ===== Statistics =====

    fn count_breweries(&self) -> StorageResult<u64>;

    fn count_beers(&self) -> StorageResult<u64>;

    /// Counts beers whose brewery could not be resolved
    fn count_beers_without_brewery(&self) -> StorageResult<u64>;

    fn count_users(&self) -> StorageResult<u64>;

    /// Counts users with a non-negative id
    fn count_members(&self) -> StorageResult<u64>;

    fn count_reviews(&self) -> StorageResult<u64>;

    /// Counts reviews stored without a rating
    fn count_unrated_reviews(&self) -> StorageResult<u64>;
}
