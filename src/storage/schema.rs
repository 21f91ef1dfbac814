//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the scraper database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Breweries, keyed by the id shown on the brewery page
CREATE TABLE IF NOT EXISTS breweries (
    id INTEGER PRIMARY KEY,
    name TEXT,
    slug TEXT UNIQUE
);

-- Beers, keyed by the id shown on the beer page
CREATE TABLE IF NOT EXISTS beers (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    slug TEXT NOT NULL UNIQUE,
    alc_percentage REAL,
    brewery_id INTEGER REFERENCES breweries(id)
);

CREATE INDEX IF NOT EXISTS idx_beers_brewery ON beers(brewery_id);

-- Review authors; sentinel accounts use negative ids and have no slug
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    slug TEXT UNIQUE,
    description TEXT
);

-- Reviews, keyed by the data-reviewid attribute
CREATE TABLE IF NOT EXISTS reviews (
    id INTEGER PRIMARY KEY,
    percentage REAL,
    comment TEXT,
    date TEXT,
    beer_id INTEGER REFERENCES beers(id),
    user_id INTEGER REFERENCES users(id)
);

CREATE INDEX IF NOT EXISTS idx_reviews_beer ON reviews(beer_id);
CREATE INDEX IF NOT EXISTS idx_reviews_user ON reviews(user_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
