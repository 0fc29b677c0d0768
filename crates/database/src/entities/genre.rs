//! Genre entity. A title may carry any number of genres through the
//! `genre_titles` join table.

use serde::{Deserialize, Serialize};

use super::common::NameSlugPair;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    #[serde(flatten)]
    pub ident: NameSlugPair,
}
