//! Category entity: the kind of work a title is (film, book, music).

use serde::{Deserialize, Serialize};

use super::common::NameSlugPair;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    #[serde(flatten)]
    pub ident: NameSlugPair,
}
