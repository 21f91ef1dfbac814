//! Author reconciliation
//!
//! Maps the author credit of a review to the id of a stored user, creating
//! the user the first time it is seen. Every creation is preceded by an
//! existence check against the same storage handle, so calling this any
//! number of times never produces duplicate rows. This relies on the crawler
//! funnelling all storage access through one task.

use crate::extract::AuthorCredit;
use crate::storage::{NewUser, Storage, StorageResult};

/// Id of the account credited for reviews without an author link
pub const UNKNOWN_AUTHOR_ID: i64 = -2;

/// Display name of the unknown-author account
pub const UNKNOWN_AUTHOR_NAME: &str = "Der Bierkeller";

/// Id of the account credited for reviews written by the editors
pub const EDITORIAL_ID: i64 = -1;

/// Display name of the editorial account
pub const EDITORIAL_NAME: &str = "Die Redaktion";

/// Resolves an author credit to a user id
///
/// # Resolution
///
/// 1. `Anonymous` - the "Der Bierkeller" sentinel, created on first use
/// 2. `Editorial` - the "Die Redaktion" sentinel, created on first use
/// 3. `Member` - the user with that slug, created with the credited name
///    and a store-assigned id if no such user exists yet
///
/// # Returns
///
/// * `Ok(i64)` - Id of the existing or newly created user
/// * `Err(StorageError)` - A lookup or insert failed
pub fn resolve_author<S: Storage + ?Sized>(
    storage: &mut S,
    credit: &AuthorCredit,
) -> StorageResult<i64> {
    match credit {
        AuthorCredit::Anonymous => ensure_sentinel(storage, UNKNOWN_AUTHOR_ID, UNKNOWN_AUTHOR_NAME),
        AuthorCredit::Editorial => ensure_sentinel(storage, EDITORIAL_ID, EDITORIAL_NAME),
        AuthorCredit::Member { slug, name } => {
            if let Some(id) = storage.find_user_id(slug)? {
                return Ok(id);
            }

            let id = storage.insert_user(&NewUser {
                id: None,
                name: name.clone(),
                slug: Some(slug.clone()),
            })?;
            tracing::debug!("Created user {} ({}) with id {}", name, slug, id);
            Ok(id)
        }
    }
}

/// Creates a sentinel account unless it already exists
fn ensure_sentinel<S: Storage + ?Sized>(storage: &mut S, id: i64, name: &str) -> StorageResult<i64> {
    if !storage.user_exists(id)? {
        storage.insert_user(&NewUser {
            id: Some(id),
            name: name.to_string(),
            slug: None,
        })?;
        tracing::debug!("Created sentinel user {} ({})", name, id);
    }
    Ok(id)
}
