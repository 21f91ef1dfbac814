//! Brewery page extraction

use crate::extract::{leading_text, page_slug, parse_id_marker, require_first, ExtractResult, PageKind};
use scraper::Html;

/// Fields extracted from a brewery page
#[derive(Debug, Clone, PartialEq)]
pub struct BreweryPage {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// Extracts a brewery from its page
///
/// # Arguments
///
/// * `html` - The page body
/// * `url` - The URL the page was finally served from (after redirects)
pub fn parse_brewery_page(html: &str, url: &str) -> ExtractResult<BreweryPage> {
    let slug = page_slug(url, PageKind::Brewery)?;
    let document = Html::parse_document(html);
    let root = document.root_element();

    let name = leading_text(require_first(root, "h2")?, "h2")?;

    let id_marker = require_first(root, "em.id.info")?;
    let id = parse_id_marker(&leading_text(id_marker, "em.id.info")?)?;

    Ok(BreweryPage { id, name, slug })
}
