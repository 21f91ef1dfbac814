//! Beer page extraction
//!
//! A beer page carries the beer itself, an optional link to its brewery and
//! any number of embedded reviews. Reviews are extracted independently so a
//! malformed review never hides the beer or its sibling reviews.

use crate::extract::review::{parse_review, ParsedReview, REVIEW_SECTION};
use crate::extract::{
    leading_text, page_slug, parse_id_marker, require_first, select_first, selector, ExtractError,
    ExtractResult, PageKind,
};
use scraper::{ElementRef, Html};
use url::Url;

/// Suffix of the plain-text alcohol value
const ALCOHOL_SUFFIX: &str = "% vol.";

/// Fields extracted from a beer page
#[derive(Debug)]
pub struct BeerPage {
    pub id: i64,
    pub name: String,
    pub slug: String,
    /// Alcohol by volume as a fraction; `None` when the page shows no plain value
    pub alc_percentage: Option<f64>,
    /// Slug of the linked brewery, if the brand block links one
    pub brewery_slug: Option<String>,
    pub reviews: Vec<ReviewSection>,
}

/// One embedded review section and the outcome of extracting it
#[derive(Debug)]
pub struct ReviewSection {
    /// Outer markup of the section, kept for error reporting
    pub markup: String,
    pub review: ExtractResult<ParsedReview>,
}

/// Extracts a beer and its embedded reviews from its page
///
/// # Arguments
///
/// * `html` - The page body
/// * `url` - The URL the page was finally served from (after redirects)
///
/// # Returns
///
/// * `Ok(BeerPage)` - The beer fields were extracted; each review carries
///   its own result
/// * `Err(ExtractError)` - A required beer field is missing or malformed
pub fn parse_beer_page(html: &str, url: &str) -> ExtractResult<BeerPage> {
    let slug = page_slug(url, PageKind::Beer)?;
    let document = Html::parse_document(html);
    let root = document.root_element();

    let name = leading_text(
        require_first(root, "span[itemprop=name]")?,
        "span[itemprop=name]",
    )?;

    let id_marker = require_first(root, "em.id.info")?;
    let id = parse_id_marker(&leading_text(id_marker, "em.id.info")?)?;

    let alc_percentage = parse_alcohol(require_first(root, "strong.bier_alkohol")?)?;
    let brewery_slug = brewery_slug(root)?;

    let section_selector = selector(REVIEW_SECTION)?;
    let reviews = root
        .select(&section_selector)
        .map(|section| ReviewSection {
            markup: section.html(),
            review: parse_review(section),
        })
        .collect();

    Ok(BeerPage {
        id,
        name,
        slug,
        alc_percentage,
        brewery_slug,
        reviews,
    })
}

/// Reads the alcohol value that follows the alcohol label
///
/// The value is either plain text such as `5,2% vol.` or, for beers without
/// a known value, a form inviting visitors to submit one. Whitespace between
/// the label and the value is ignored. A form closes an enclosing `<p>`, so
/// the label may have no value sibling at all; that reads as no value too.
fn parse_alcohol(label: ElementRef<'_>) -> ExtractResult<Option<f64>> {
    let value = label.next_siblings().find(|node| {
        node.value()
            .as_text()
            .map_or(true, |text| !text.trim().is_empty())
    });

    let text = match value.and_then(|node| node.value().as_text()) {
        Some(text) => text.trim(),
        None => return Ok(None),
    };

    text.strip_suffix(ALCOHOL_SUFFIX)
        .map(|number| number.trim().replace(',', "."))
        .and_then(|number| number.parse::<f64>().ok())
        .map(|percent| Some(percent / 100.0))
        .ok_or_else(|| ExtractError::InvalidNumber {
            field: "alcohol percentage",
            value: text.to_string(),
        })
}

/// Slug of the brewery linked from the brand block, if any
fn brewery_slug(root: ElementRef<'_>) -> ExtractResult<Option<String>> {
    let href = match select_first(root, "p[itemprop=brand] a.gray")?
        .and_then(|anchor| anchor.value().attr("href"))
    {
        Some(href) => href,
        None => return Ok(None),
    };

    let path = Url::parse(href)
        .map(|absolute| absolute.path().to_string())
        .unwrap_or_else(|_| href.to_string());

    Ok(PageKind::Brewery.slug_from_path(&path).map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::review::AuthorCredit;

    const URL: &str = "https://www.bier-index.de/biere/edelstoff.html";

    fn beer_html(alcohol: &str, brand: &str, reviews: &str) -> String {
        format!(
            r#"<html><body>
            <h1><span itemprop="name">Edelstoff</span> <em class="id info">#1201</em></h1>
            <div><strong class="bier_alkohol">Alkohol:</strong>{alcohol}</div>
            {brand}
            {reviews}
            </body></html>"#
        )
    }

    const BRAND: &str = r#"<p itemprop="brand">von <a class="gray" href="/brauereien/augustiner-brau.html">Augustiner</a></p>"#;

    const REVIEWS: &str = r#"
        <section itemprop="review" data-reviewid="1">
            <var itemprop="ratingValue">90%</var>
            <span itemprop="author">Gast</span>
            <span itemprop="datePublished" content="2020-01-02"></span>
            <p itemprop="reviewBody">Top</p>
        </section>
        <section itemprop="review" data-reviewid="2">
            <var itemprop="ratingValue">kaputt</var>
            <span itemprop="author">Gast</span>
            <span itemprop="datePublished" content="2020-01-03"></span>
            <p itemprop="reviewBody">Flop</p>
        </section>"#;

    #[test]
    fn test_parse_beer_page() {
        let html = beer_html("5,6% vol.", BRAND, REVIEWS);
        let beer = parse_beer_page(&html, URL).unwrap();

        assert_eq!(beer.id, 1201);
        assert_eq!(beer.name, "Edelstoff");
        assert_eq!(beer.slug, "edelstoff");
        assert_eq!(beer.alc_percentage, Some(5.6 / 100.0));
        assert_eq!(beer.brewery_slug.as_deref(), Some("augustiner-brau"));
        assert_eq!(beer.reviews.len(), 2);

        let first = beer.reviews[0].review.as_ref().unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(first.author, AuthorCredit::Anonymous);
        assert!(beer.reviews[1].review.is_err());
        assert!(beer.reviews[1].markup.contains("data-reviewid=\"2\""));
    }

    #[test]
    fn test_alcohol_fraction() {
        for percent in ["5", "4.9", "12.5"] {
            let html = beer_html(&format!("{}% vol.", percent), BRAND, "");
            let beer = parse_beer_page(&html, URL).unwrap();
            let expected: f64 = percent.parse().unwrap();
            assert_eq!(beer.alc_percentage, Some(expected / 100.0));
        }
    }

    #[test]
    fn test_alcohol_form_is_absent() {
        let html = beer_html(
            r#"<form action="/alkohol-melden/"><input name="alc"></form>"#,
            BRAND,
            "",
        );
        let beer = parse_beer_page(&html, URL).unwrap();
        assert_eq!(beer.alc_percentage, None);
    }

    fn page_with_alcohol_block(block: &str) -> String {
        format!(
            r#"<html><body>
            <h1><span itemprop="name">Edelstoff</span> <em class="id info">#1201</em></h1>
            {block}
            </body></html>"#
        )
    }

    #[test]
    fn test_alcohol_form_layouts_are_absent() {
        let form = r#"<form action="/alkohol-melden/"><input name="alc"></form>"#;
        let blocks = [
            format!(r#"<p><strong class="bier_alkohol">Alkohol:</strong>{form}</p>"#),
            format!("<p><strong class=\"bier_alkohol\">Alkohol:</strong>\n{form}</p>"),
            format!("<div><strong class=\"bier_alkohol\">Alkohol:</strong>\n    {form}\n</div>"),
            r#"<p><strong class="bier_alkohol">Alkohol:</strong></p>"#.to_string(),
        ];

        for block in &blocks {
            let beer = parse_beer_page(&page_with_alcohol_block(block), URL).unwrap();
            assert_eq!(beer.alc_percentage, None, "{}", block);
        }
    }

    #[test]
    fn test_alcohol_text_after_whitespace() {
        let block = "<p><strong class=\"bier_alkohol\">Alkohol:</strong>\n 5,2% vol.\n</p>";
        let beer = parse_beer_page(&page_with_alcohol_block(block), URL).unwrap();
        assert_eq!(beer.alc_percentage, Some(5.2 / 100.0));
    }

    #[test]
    fn test_alcohol_garbage_is_error() {
        let html = beer_html("unbekannt", BRAND, "");
        let result = parse_beer_page(&html, URL);
        assert!(matches!(
            result,
            Err(ExtractError::InvalidNumber {
                field: "alcohol percentage",
                ..
            })
        ));
    }

    #[test]
    fn test_missing_brand_block() {
        let html = beer_html("5% vol.", "", "");
        let beer = parse_beer_page(&html, URL).unwrap();
        assert_eq!(beer.brewery_slug, None);
    }

    #[test]
    fn test_brand_block_without_brewery_link() {
        let html = beer_html(
            "5% vol.",
            r#"<p itemprop="brand">Hausmarke <a href="/marken/x.html">X</a></p>"#,
            "",
        );
        let beer = parse_beer_page(&html, URL).unwrap();
        assert_eq!(beer.brewery_slug, None);
    }

    #[test]
    fn test_missing_name_fails_page() {
        let html = beer_html("5% vol.", BRAND, "").replace("itemprop=\"name\"", "class=\"name\"");
        let result = parse_beer_page(&html, URL);
        assert!(matches!(
            result,
            Err(ExtractError::MissingElement("span[itemprop=name]"))
        ));
    }
}
