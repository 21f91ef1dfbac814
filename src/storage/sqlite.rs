//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{BeerRecord, BreweryRecord, NewUser, ReviewRecord, UserRecord};
use crate::ScrapeError;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Text format of review dates in the `reviews.date` column
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// The file is created if absent and the schema is applied.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(ScrapeError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, ScrapeError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, ScrapeError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn exists(&self, sql: &str, id: i64) -> StorageResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(sql, params![id], |row| row.get(0))
            .optional()?;
        Ok(found.is_some())
    }

    fn count(&self, sql: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl Storage for SqliteStorage {
    // ===== Transactions =====

    fn begin(&mut self) -> StorageResult<()> {
        self.conn.execute_batch("BEGIN")?;
        Ok(())
    }

    fn commit(&mut self) -> StorageResult<()> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    // ===== Breweries =====

    fn brewery_exists(&self, id: i64) -> StorageResult<bool> {
        self.exists("SELECT id FROM breweries WHERE id = ?1", id)
    }

    fn insert_brewery(&mut self, brewery: &BreweryRecord) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO breweries (id, name, slug) VALUES (?1, ?2, ?3)",
            params![brewery.id, brewery.name, brewery.slug],
        )?;
        Ok(())
    }

    fn find_brewery_id(&self, slug: &str) -> StorageResult<Option<i64>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM breweries WHERE slug = ?1",
                params![slug],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    // ===== Beers =====

    fn beer_exists(&self, id: i64) -> StorageResult<bool> {
        self.exists("SELECT id FROM beers WHERE id = ?1", id)
    }

    fn insert_beer(&mut self, beer: &BeerRecord) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO beers (id, name, slug, alc_percentage, brewery_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                beer.id,
                beer.name,
                beer.slug,
                beer.alc_percentage,
                beer.brewery_id
            ],
        )?;
        Ok(())
    }

    fn get_beer(&self, id: i64) -> StorageResult<Option<BeerRecord>> {
        let beer = self
            .conn
            .query_row(
                "SELECT id, name, slug, alc_percentage, brewery_id FROM beers WHERE id = ?1",
                params![id],
                |row| {
                    Ok(BeerRecord {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        slug: row.get(2)?,
                        alc_percentage: row.get(3)?,
                        brewery_id: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(beer)
    }

    // ===== Users =====

    fn user_exists(&self, id: i64) -> StorageResult<bool> {
        self.exists("SELECT id FROM users WHERE id = ?1", id)
    }

    fn insert_user(&mut self, user: &NewUser) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO users (id, name, slug) VALUES (?1, ?2, ?3)",
            params![user.id, user.name, user.slug],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn find_user_id(&self, slug: &str) -> StorageResult<Option<i64>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM users WHERE slug = ?1",
                params![slug],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn get_user(&self, id: i64) -> StorageResult<Option<UserRecord>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, name, slug, description FROM users WHERE id = ?1",
                params![id],
                |row| {
                    Ok(UserRecord {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        slug: row.get(2)?,
                        description: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    fn list_members(&self) -> StorageResult<Vec<UserRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, slug, description FROM users
             WHERE id >= 0 AND slug IS NOT NULL ORDER BY id",
        )?;

        let users = stmt
            .query_map([], |row| {
                Ok(UserRecord {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    slug: row.get(2)?,
                    description: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }

    fn update_user_description(&mut self, slug: &str, description: &str) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE users SET description = ?1 WHERE slug = ?2",
            params![description, slug],
        )?;

        if updated == 0 {
            return Err(StorageError::UserNotFound(slug.to_string()));
        }
        Ok(())
    }

    // ===== Reviews =====

    fn review_exists(&self, id: i64) -> StorageResult<bool> {
        self.exists("SELECT id FROM reviews WHERE id = ?1", id)
    }

    fn insert_review(&mut self, review: &ReviewRecord) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO reviews (id, percentage, comment, date, beer_id, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                review.id,
                review.percentage,
                review.comment,
                review.date.format(DATE_FORMAT).to_string(),
                review.beer_id,
                review.user_id
            ],
        )?;
        Ok(())
    }

    fn get_review(&self, id: i64) -> StorageResult<Option<ReviewRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, percentage, comment, date, beer_id, user_id FROM reviews WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, Option<f64>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, i64>(4)?,
                        row.get::<_, i64>(5)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, percentage, comment, date, beer_id, user_id)) = row else {
            return Ok(None);
        };

        let date = NaiveDateTime::parse_from_str(&date, DATE_FORMAT)
            .map_err(|e| StorageError::Serialization(format!("review {} date {:?}: {}", id, date, e)))?;

        Ok(Some(ReviewRecord {
            id,
            percentage,
            comment: comment.unwrap_or_default(),
            date,
            beer_id,
            user_id,
        }))
    }

    // ===== Statistics =====

    fn count_breweries(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM breweries")
    }

    fn count_beers(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM beers")
    }

    fn count_beers_without_brewery(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM beers WHERE brewery_id IS NULL")
    }

    fn count_users(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM users")
    }

    fn count_members(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM users WHERE id >= 0")
    }

    fn count_reviews(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM reviews")
    }

    fn count_unrated_reviews(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM reviews WHERE percentage IS NULL")
    }
}
