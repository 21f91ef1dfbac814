//! Field extraction from bier-index.de pages
//!
//! Every function in this module is pure: it takes page markup (and the URL
//! the page was served from) and returns typed values. Nothing here touches
//! the network or the database, so each extractor can be tested against
//! saved page fragments.
//!
//! - [`brewery`] - brewery pages (`/brauereien/<slug>.html`)
//! - [`beer`] - beer pages (`/biere/<slug>.html`) including embedded reviews
//! - [`review`] - a single review section and its author credit
//! - [`user`] - user profile pages (`/benutzer/<slug>.html`)

pub mod beer;
pub mod brewery;
pub mod review;
pub mod user;

pub use beer::{parse_beer_page, BeerPage, ReviewSection};
pub use brewery::{parse_brewery_page, BreweryPage};
pub use review::{parse_author_credit, parse_review, parse_review_fragment, AuthorCredit, ParsedReview};
pub use user::{parse_user_page, UserPage};

use scraper::{ElementRef, Selector};
use thiserror::Error;
use url::Url;

/// Errors raised while extracting fields from markup
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Missing element: {0}")]
    MissingElement(&'static str),

    #[error("Missing attribute '{attribute}' on {selector}")]
    MissingAttribute {
        selector: &'static str,
        attribute: &'static str,
    },

    #[error("Element {0} has no leading text")]
    MissingText(&'static str),

    #[error("Malformed id marker: {0:?}")]
    InvalidId(String),

    #[error("Malformed {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Malformed publication date: {0:?}")]
    InvalidDate(String),

    #[error("Unrecognized author credit: {0}")]
    UnrecognizedAuthor(String),

    #[error("URL does not match the expected page shape: {0}")]
    UnexpectedUrl(String),

    #[error("Invalid selector: {0}")]
    Selector(String),
}

/// Result type for extraction operations
pub type ExtractResult<T> = Result<T, ExtractError>;

/// The three page sections of the site the scraper knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    Brewery,
    Beer,
    User,
}

impl PageKind {
    /// Suffix shared by every entity page
    pub const SUFFIX: &'static str = ".html";

    /// Path prefix of pages in this section
    pub fn path_prefix(&self) -> &'static str {
        match self {
            Self::Brewery => "/brauereien/",
            Self::Beer => "/biere/",
            Self::User => "/benutzer/",
        }
    }

    /// Returns the slug if `path` has the shape `<prefix><slug>.html`
    pub fn slug_from_path<'a>(&self, path: &'a str) -> Option<&'a str> {
        path.strip_prefix(self.path_prefix())
            .and_then(|rest| rest.strip_suffix(Self::SUFFIX))
            .filter(|slug| !slug.is_empty() && !slug.contains('/'))
    }

    /// Determines which section a URL belongs to, if any
    pub fn classify(url: &Url) -> Option<Self> {
        [Self::Brewery, Self::Beer, Self::User]
            .into_iter()
            .find(|kind| kind.slug_from_path(url.path()).is_some())
    }
}

/// Extracts the slug of a page of `kind` from the URL it was served from
pub fn page_slug(url: &str, kind: PageKind) -> ExtractResult<String> {
    let parsed = Url::parse(url).map_err(|_| ExtractError::UnexpectedUrl(url.to_string()))?;
    kind.slug_from_path(parsed.path())
        .map(str::to_string)
        .ok_or_else(|| ExtractError::UnexpectedUrl(url.to_string()))
}

/// Parses the `#<digits>` id marker shown on brewery and beer pages
pub fn parse_id_marker(text: &str) -> ExtractResult<i64> {
    text.trim()
        .strip_prefix('#')
        .and_then(|digits| digits.parse::<i64>().ok())
        .ok_or_else(|| ExtractError::InvalidId(text.to_string()))
}

/// Compiles a CSS selector
pub(crate) fn selector(css: &'static str) -> ExtractResult<Selector> {
    Selector::parse(css).map_err(|e| ExtractError::Selector(format!("{}: {:?}", css, e)))
}

/// Returns the first descendant of `scope` matching `css`, if any
pub(crate) fn select_first<'a>(
    scope: ElementRef<'a>,
    css: &'static str,
) -> ExtractResult<Option<ElementRef<'a>>> {
    let selector = selector(css)?;
    Ok(scope.select(&selector).next())
}

/// Returns the first descendant of `scope` matching `css`, or an error
pub(crate) fn require_first<'a>(
    scope: ElementRef<'a>,
    css: &'static str,
) -> ExtractResult<ElementRef<'a>> {
    select_first(scope, css)?.ok_or(ExtractError::MissingElement(css))
}

/// Text of the element's first child node, which must be a text node
pub(crate) fn leading_text(element: ElementRef<'_>, css: &'static str) -> ExtractResult<String> {
    element
        .children()
        .next()
        .and_then(|node| node.value().as_text().map(|text| text.trim().to_string()))
        .filter(|text| !text.is_empty())
        .ok_or(ExtractError::MissingText(css))
}

/// All text inside the element, one line per text node
///
/// `<br>` separated content becomes newline separated lines.
pub(crate) fn multiline_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
