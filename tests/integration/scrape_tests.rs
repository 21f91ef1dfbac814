//! Integration tests for the scraper
//!
//! These tests use wiremock to serve a miniature copy of the site and run
//! complete scrapes against a database file on disk.

use bier_index_scraper::config::{Config, OutputConfig, ScraperConfig};
use bier_index_scraper::crawler::{Coordinator, EDITORIAL_ID, UNKNOWN_AUTHOR_ID};
use bier_index_scraper::output::load_statistics;
use bier_index_scraper::storage::{SqliteStorage, Storage};
use bier_index_scraper::ScrapeError;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, db_path: &str) -> Config {
    Config {
        scraper: ScraperConfig {
            base_url: base_url.to_string(),
            concurrency: 4,
            request_timeout: 5,
            ..ScraperConfig::default()
        },
        output: OutputConfig {
            database_path: db_path.to_string(),
        },
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<!DOCTYPE html><html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(html(body))
        .mount(server)
        .await;
}

async fn mount_sitemap(server: &MockServer, paths: &[&str]) {
    let locations: String = paths
        .iter()
        .map(|p| format!("<url><loc>{}{}</loc></url>\n", server.uri(), p))
        .collect();
    let sitemap = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
<url><loc>{}/</loc></url>
{}</urlset>"#,
        server.uri(),
        locations
    );

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(sitemap)
                .insert_header("content-type", "application/xml"),
        )
        .mount(server)
        .await;
}

fn review(id: i64, rating: &str, author: &str, comment: &str) -> String {
    format!(
        r#"<section itemprop="review" data-reviewid="{}">
            {}
            <span itemprop="author">{}</span>
            <span itemprop="datePublished" content="2020-11-24">24.11.2020</span>
            <p itemprop="reviewBody">{}</p>
        </section>"#,
        id, rating, author, comment
    )
}

fn beer(id: i64, name: &str, alcohol: &str, brewery: Option<&str>, reviews: &[String]) -> String {
    let brand = brewery
        .map(|slug| {
            format!(
                r#"<p itemprop="brand">von <a class="gray" href="/brauereien/{}.html">Brauerei</a></p>"#,
                slug
            )
        })
        .unwrap_or_default();
    format!(
        r#"<h1><span itemprop="name">{}</span></h1>
        <em class="id info">#{}</em>
        <div><strong class="bier_alkohol">Alkohol:</strong>{}</div>
        {}
        {}"#,
        name,
        id,
        alcohol,
        brand,
        reviews.join("\n")
    )
}

const RATED: &str = r#"<var itemprop="ratingValue">85%</var>"#;
const UNRATED: &str = r#"<var itemprop="ratingValue" class="index_none">-</var>"#;
const MEMBER: &str = r#"<a href="/benutzer/hopfenkopf/">Hopfenkopf</a>"#;
const EDITORIAL: &str = r#"<a href="/die-redaktion/">Die Redaktion</a>"#;

/// Serves two breweries, three beers with reviews and one member profile
async fn mount_site(server: &MockServer) {
    mount_sitemap(
        server,
        &[
            "/brauereien/schlenkerla.html",
            "/brauereien/mahrs.html",
            "/biere/aecht-schlenkerla-rauchbier.html",
            "/biere/mahrs-ungespundet.html",
            "/biere/hausbraeu.html",
        ],
    )
    .await;

    mount_page(
        server,
        "/brauereien/schlenkerla.html",
        r#"<h2>Brauerei Heller-Trum</h2><em class="id info">#11</em>"#,
    )
    .await;
    mount_page(
        server,
        "/brauereien/mahrs.html",
        r#"<h2>Mahrs Bräu</h2><em class="id info">#12</em>"#,
    )
    .await;

    mount_page(
        server,
        "/biere/aecht-schlenkerla-rauchbier.html",
        &beer(
            101,
            "Aecht Schlenkerla Rauchbier Märzen",
            "5,1% vol.",
            Some("schlenkerla"),
            &[
                review(1001, RATED, MEMBER, "Wie Schinken.<br>Großartig."),
                review(1002, UNRATED, "Ein Gast", "Zu rauchig"),
                review(1003, RATED, EDITORIAL, "Ein Klassiker"),
            ],
        ),
    )
    .await;
    mount_page(
        server,
        "/biere/mahrs-ungespundet.html",
        &beer(
            102,
            "Mahrs Ungespundet",
            r#"<form action="/alkohol/">Wert eintragen</form>"#,
            Some("mahrs"),
            &[review(1004, RATED, MEMBER, "Süffig")],
        ),
    )
    .await;
    mount_page(
        server,
        "/biere/hausbraeu.html",
        &beer(103, "Hausbräu", "4,9% vol.", None, &[]),
    )
    .await;

    mount_page(
        server,
        "/benutzer/hopfenkopf.html",
        r#"<p id="user-desc">Franke.<br>Trinkt am liebsten Rauchbier.</p>"#,
    )
    .await;
}

#[tokio::test]
async fn test_full_scrape() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("bier-index.db");
    let config = create_test_config(&server.uri(), db_path.to_str().unwrap());

    let mut coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.breweries.stored, 2);
    assert_eq!(report.beers.stored, 3);
    assert_eq!(report.reviews.stored, 4);
    assert_eq!(report.users.stored, 1);
    assert_eq!(report.beers.failed + report.reviews.failed, 0);

    let storage = coordinator.storage();

    let rauchbier = storage.get_beer(101).unwrap().unwrap();
    assert_eq!(rauchbier.name, "Aecht Schlenkerla Rauchbier Märzen");
    assert_eq!(rauchbier.slug, "aecht-schlenkerla-rauchbier");
    assert_eq!(rauchbier.brewery_id, Some(11));
    assert!((rauchbier.alc_percentage.unwrap() - 0.051).abs() < 1e-9);

    let ungespundet = storage.get_beer(102).unwrap().unwrap();
    assert_eq!(ungespundet.brewery_id, Some(12));
    assert_eq!(ungespundet.alc_percentage, None);

    assert_eq!(storage.get_beer(103).unwrap().unwrap().brewery_id, None);

    let member_id = storage.find_user_id("hopfenkopf").unwrap().unwrap();
    assert!(member_id >= 0);
    let member = storage.get_user(member_id).unwrap().unwrap();
    assert_eq!(member.name, "Hopfenkopf");
    assert_eq!(
        member.description.as_deref(),
        Some("Franke.\nTrinkt am liebsten Rauchbier.")
    );

    let first = storage.get_review(1001).unwrap().unwrap();
    assert_eq!(first.user_id, member_id);
    assert_eq!(first.beer_id, 101);
    assert_eq!(first.percentage, Some(0.85));
    assert_eq!(first.comment, "Wie Schinken.\nGroßartig.");
    assert_eq!(
        first.date.format("%Y-%m-%d %H:%M:%S").to_string(),
        "2020-11-24 00:00:00"
    );

    let anonymous = storage.get_review(1002).unwrap().unwrap();
    assert_eq!(anonymous.user_id, UNKNOWN_AUTHOR_ID);
    assert_eq!(anonymous.percentage, None);

    assert_eq!(storage.get_review(1003).unwrap().unwrap().user_id, EDITORIAL_ID);
    assert_eq!(storage.get_review(1004).unwrap().unwrap().user_id, member_id);

    // two sentinels plus one member
    assert_eq!(storage.count_users().unwrap(), 3);
    assert_eq!(storage.count_members().unwrap(), 1);
}

#[tokio::test]
async fn test_second_run_adds_nothing() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("bier-index.db");
    let config = create_test_config(&server.uri(), db_path.to_str().unwrap());

    let first_stats = {
        let mut coordinator = Coordinator::new(config.clone()).unwrap();
        coordinator.run().await.unwrap();
        load_statistics(coordinator.storage()).unwrap()
    };

    let mut coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.breweries.stored, 0);
    assert_eq!(report.breweries.skipped, 2);
    assert_eq!(report.beers.stored, 0);
    assert_eq!(report.beers.skipped, 3);
    assert_eq!(report.reviews.total, 0);

    let second_stats = load_statistics(coordinator.storage()).unwrap();
    assert_eq!(first_stats, second_stats);
    assert_eq!(second_stats.users, 3);
}

#[tokio::test]
async fn test_missing_page_is_skipped() {
    let server = MockServer::start().await;
    mount_sitemap(
        &server,
        &["/brauereien/weg.html", "/brauereien/da.html"],
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/brauereien/weg.html"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_page(&server, "/brauereien/da.html", r#"<h2>Da</h2><em class="id info">#7</em>"#).await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("bier-index.db");
    let config = create_test_config(&server.uri(), db_path.to_str().unwrap());

    let mut coordinator = Coordinator::new(config).unwrap();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.breweries.total, 2);
    assert_eq!(report.breweries.stored, 1);
    assert_eq!(report.breweries.failed, 1);
    assert!(coordinator.storage().brewery_exists(7).unwrap());
}

#[tokio::test]
async fn test_unreachable_sitemap_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("bier-index.db");
    let config = create_test_config(&server.uri(), db_path.to_str().unwrap());

    let mut coordinator = Coordinator::new(config).unwrap();
    let result = coordinator.run().await;
    assert!(matches!(result, Err(ScrapeError::Http { .. })));

    let storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(storage.count_breweries().unwrap(), 0);
}
