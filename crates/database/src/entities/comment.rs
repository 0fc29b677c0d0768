//! Comment entity: a reply attached to a review.

use serde::{Deserialize, Serialize};

use super::common::AuthoredText;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub review_id: i64,
    #[serde(flatten)]
    pub body: AuthoredText,
}
