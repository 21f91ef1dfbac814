//! Statistics generation from the scrape database
//!
//! This module provides functionality for extracting and displaying
//! row counts from the storage layer.

use crate::storage::Storage;
use crate::ScrapeError;

/// Scrape database statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeStatistics {
    pub breweries: u64,
    pub beers: u64,
    /// Beers whose brewery was not known when they were stored
    pub beers_without_brewery: u64,
    /// All users, sentinel accounts included
    pub users: u64,
    /// Users with a profile on the site
    pub members: u64,
    pub reviews: u64,
    /// Reviews shown without a rating
    pub unrated_reviews: u64,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(ScrapeStatistics)` - Successfully loaded statistics
/// * `Err(ScrapeError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> Result<ScrapeStatistics, ScrapeError> {
    Ok(ScrapeStatistics {
        breweries: storage.count_breweries()?,
        beers: storage.count_beers()?,
        beers_without_brewery: storage.count_beers_without_brewery()?,
        users: storage.count_users()?,
        members: storage.count_members()?,
        reviews: storage.count_reviews()?,
        unrated_reviews: storage.count_unrated_reviews()?,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &ScrapeStatistics) {
    println!("=== Scrape Statistics ===\n");

    println!("Breweries: {}", stats.breweries);
    println!(
        "Beers: {} ({} without brewery)",
        stats.beers, stats.beers_without_brewery
    );
    println!(
        "Users: {} ({} members, {} sentinel accounts)",
        stats.users,
        stats.members,
        stats.users.saturating_sub(stats.members)
    );
    println!(
        "Reviews: {} ({} without rating)",
        stats.reviews, stats.unrated_reviews
    );

    let rated = stats.reviews.saturating_sub(stats.unrated_reviews);
    let rated_share = if stats.reviews > 0 {
        (rated as f64 / stats.reviews as f64) * 100.0
    } else {
        0.0
    };
    println!("\nRated reviews: {:.1}%", rated_share);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{BeerRecord, BreweryRecord, SqliteStorage};

    #[test]
    fn test_empty_database() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        let stats = load_statistics(&storage).unwrap();
        assert_eq!(stats, ScrapeStatistics::default());
    }

    #[test]
    fn test_counts() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage
            .insert_brewery(&BreweryRecord {
                id: 1,
                name: "Schlenkerla".to_string(),
                slug: "schlenkerla".to_string(),
            })
            .unwrap();
        for (id, brewery_id) in [(10, Some(1)), (11, None)] {
            storage
                .insert_beer(&BeerRecord {
                    id,
                    name: format!("Bier {}", id),
                    slug: format!("bier-{}", id),
                    alc_percentage: None,
                    brewery_id,
                })
                .unwrap();
        }

        let stats = load_statistics(&storage).unwrap();
        assert_eq!(stats.breweries, 1);
        assert_eq!(stats.beers, 2);
        assert_eq!(stats.beers_without_brewery, 1);
        assert_eq!(stats.reviews, 0);
    }
}
