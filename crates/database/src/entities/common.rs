//! Shared value-structs composed into the concrete entities.

use serde::{Deserialize, Serialize};

/// Name plus URL-safe slug, shared by categories and genres.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameSlugPair {
    pub name: String,
    pub slug: String,
}

/// Authored text with a publication timestamp, shared by reviews and
/// comments. `pub_date` is set at creation and never updated. `author`
/// carries the username, resolved by a join on read; ownership checks use
/// the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthoredText {
    pub text: String,
    #[serde(skip_serializing)]
    pub author_id: i64,
    pub author: String,
    pub pub_date: String,
}
