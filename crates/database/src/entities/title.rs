//! Title entity: a reviewable work.

use serde::{Deserialize, Serialize};

use super::{category::Category, genre::Genre};

/// Raw title row as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub id: i64,
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category_id: Option<i64>,
}

/// Title read model: nested category/genres plus the rating computed from
/// review scores at query time. Never persisted, so it cannot drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleDetail {
    pub id: i64,
    pub name: String,
    pub year: i32,
    pub rating: Option<f64>,
    pub description: Option<String>,
    pub genre: Vec<Genre>,
    pub category: Option<Category>,
}

/// Request for creating a title; category/genres arrive already resolved
/// from slugs to row ids.
#[derive(Debug, Clone)]
pub struct CreateTitleRequest {
    pub name: String,
    pub year: i32,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub genre_ids: Vec<i64>,
}

/// Partial title update. `None` leaves a field untouched; genre/category
/// replacement is wholesale when present.
#[derive(Debug, Clone, Default)]
pub struct UpdateTitleRequest {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub category_id: Option<Option<i64>>,
    pub genre_ids: Option<Vec<i64>>,
}

/// Conjunctive list filters; string matches are case-insensitive substrings.
#[derive(Debug, Clone, Default)]
pub struct TitleFilter {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub genre_slug: Option<String>,
    pub category_slug: Option<String>,
}
