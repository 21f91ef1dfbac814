//! Review section and author credit extraction
//!
//! Reviews are embedded in beer pages as `<section itemprop="review">`
//! blocks. The author credit is returned as an [`AuthorCredit`]; mapping it
//! to a stored user is the job of the crawler's reconciler.

use crate::extract::{
    leading_text, multiline_text, require_first, select_first, ExtractError, ExtractResult,
};
use chrono::{NaiveDate, NaiveDateTime};
use scraper::{ElementRef, Html};

/// Selector of a review section inside a beer page
pub const REVIEW_SECTION: &str = "section[itemprop=review]";

/// Link target used for reviews written by the site's editors
pub const EDITORIAL_PATH: &str = "/die-redaktion/";

/// Path prefix of member profile links in author credits
const MEMBER_PATH_PREFIX: &str = "/benutzer/";

/// Class marking a review that carries no rating
const NO_RATING_CLASS: &str = "index_none";

/// Who a review is credited to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorCredit {
    /// No profile link; the review is shown without a known author
    Anonymous,
    /// Written by the site's editorial team
    Editorial,
    /// A registered member linked as `/benutzer/<slug>/`
    Member { slug: String, name: String },
}

/// Fields extracted from a review section
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReview {
    pub id: i64,
    /// Rating as a fraction, `None` when the review carries no rating
    pub rating: Option<f64>,
    pub author: AuthorCredit,
    pub published_at: NaiveDateTime,
    pub comment: String,
}

/// Extracts a review from its section element
pub fn parse_review(section: ElementRef<'_>) -> ExtractResult<ParsedReview> {
    let raw_id = section
        .value()
        .attr("data-reviewid")
        .ok_or(ExtractError::MissingAttribute {
            selector: REVIEW_SECTION,
            attribute: "data-reviewid",
        })?;
    let id = raw_id
        .trim()
        .parse::<i64>()
        .map_err(|_| ExtractError::InvalidNumber {
            field: "review id",
            value: raw_id.to_string(),
        })?;

    let rating = parse_rating(require_first(section, "var[itemprop=ratingValue]")?)?;
    let author = parse_author_credit(require_first(section, "span[itemprop=author]")?)?;

    let date_element = require_first(section, "span[itemprop=datePublished]")?;
    let raw_date = date_element
        .value()
        .attr("content")
        .ok_or(ExtractError::MissingAttribute {
            selector: "span[itemprop=datePublished]",
            attribute: "content",
        })?;
    let published_at = parse_publication_date(raw_date)?;

    let comment = multiline_text(require_first(section, "p[itemprop=reviewBody]")?);

    Ok(ParsedReview {
        id,
        rating,
        author,
        published_at,
        comment,
    })
}

/// Extracts a review from a standalone markup fragment containing its section
pub fn parse_review_fragment(html: &str) -> ExtractResult<ParsedReview> {
    let fragment = Html::parse_fragment(html);
    parse_review(require_first(fragment.root_element(), REVIEW_SECTION)?)
}

/// Maps an author credit element to the kind of author it names
///
/// # Credit shapes
///
/// | Markup | Result |
/// |--------|--------|
/// | no `<a>` inside | `Anonymous` |
/// | `<a href="/die-redaktion/">` | `Editorial` |
/// | `<a href="/benutzer/<slug>/">Name</a>` | `Member { slug, name }` |
/// | anything else | `ExtractError::UnrecognizedAuthor` |
pub fn parse_author_credit(credit: ElementRef<'_>) -> ExtractResult<AuthorCredit> {
    let link = match select_first(credit, "a")? {
        Some(link) => link,
        None => return Ok(AuthorCredit::Anonymous),
    };

    let href = link.value().attr("href");
    if href == Some(EDITORIAL_PATH) {
        return Ok(AuthorCredit::Editorial);
    }

    let slug = href
        .and_then(|href| href.strip_prefix(MEMBER_PATH_PREFIX))
        .and_then(|rest| rest.strip_suffix('/'))
        .filter(|slug| !slug.is_empty() && !slug.contains('/'));

    match slug {
        Some(slug) => Ok(AuthorCredit::Member {
            slug: slug.to_string(),
            name: leading_text(link, "span[itemprop=author] a")?,
        }),
        None => Err(ExtractError::UnrecognizedAuthor(credit.html())),
    }
}

/// Reads the rating fraction from the rating value element
fn parse_rating(element: ElementRef<'_>) -> ExtractResult<Option<f64>> {
    if element.value().classes().any(|class| class == NO_RATING_CLASS) {
        return Ok(None);
    }

    let text = element.text().collect::<String>();
    let digits: String = text
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    digits
        .parse::<u32>()
        .map(|percent| Some(f64::from(percent) / 100.0))
        .map_err(|_| ExtractError::InvalidNumber {
            field: "rating",
            value: text,
        })
}

/// Parses a `YYYY-MM-DD` publication date to midnight of that day
fn parse_publication_date(raw: &str) -> ExtractResult<NaiveDateTime> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| ExtractError::InvalidDate(raw.to_string()))
}
