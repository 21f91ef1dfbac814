//! User profile page extraction

use crate::extract::{multiline_text, page_slug, require_first, ExtractResult, PageKind};
use scraper::Html;

/// Fields extracted from a user profile page
#[derive(Debug, Clone, PartialEq)]
pub struct UserPage {
    pub slug: String,
    pub description: String,
}

/// Extracts the profile description from a user page
pub fn parse_user_page(html: &str, url: &str) -> ExtractResult<UserPage> {
    let slug = page_slug(url, PageKind::User)?;
    let document = Html::parse_document(html);
    let description = multiline_text(require_first(document.root_element(), "p#user-desc")?);

    Ok(UserPage { slug, description })
}
