//! Review entity: one scored write-up per (title, author).

use serde::{Deserialize, Serialize};

use super::common::AuthoredText;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub title_id: i64,
    pub score: i32,
    #[serde(flatten)]
    pub body: AuthoredText,
}
