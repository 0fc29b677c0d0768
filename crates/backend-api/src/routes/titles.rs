//! Title catalog: filtered listing with computed rating, admin-only writes.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;

use reviewdeck_database::{
    CatalogError, CreateTitleRequest, TitleDetail, TitleFilter, UpdateTitleRequest,
};
use reviewdeck_users::utils::validation::validate_year;
use reviewdeck_users::ValidationErrors;

use crate::pagination::{PageQuery, Paginated};
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct TitleListQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub name: Option<String>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTitleBody {
    pub name: String,
    pub year: i32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub genre: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTitleBody {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub genre: Option<Vec<String>>,
}

pub async fn list_titles(
    State(state): State<AppState>,
    Query(query): Query<TitleListQuery>,
) -> Result<Json<Paginated<TitleDetail>>, ApiError> {
    let page = PageQuery {
        page: query.page,
        page_size: query.page_size,
    }
    .resolve(state.default_page_size())?;
    let filter = TitleFilter {
        name: query.name,
        year: query.year,
        genre_slug: query.genre,
        category_slug: query.category,
    };

    let count = state.titles().count(&filter).await?;
    let results = state.titles().list(&filter, page.limit, page.offset).await?;

    Ok(Json(Paginated { count, results }))
}

pub async fn create_title(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateTitleBody>,
) -> Result<(StatusCode, Json<TitleDetail>), ApiError> {
    state.actor(&headers).await?.require_admin()?;

    validate_year(payload.year)?;
    let category_id = resolve_category(&state, payload.category.as_deref()).await?;
    let genre_ids = resolve_genres(&state, &payload.genre).await?;

    let title = state
        .titles()
        .create(&CreateTitleRequest {
            name: payload.name,
            year: payload.year,
            description: payload.description,
            category_id,
            genre_ids,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(title)))
}

pub async fn get_title(
    State(state): State<AppState>,
    Path(title_id): Path<i64>,
) -> Result<Json<TitleDetail>, ApiError> {
    let title = state
        .titles()
        .find_detail(title_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Title not found"))?;

    Ok(Json(title))
}

pub async fn update_title(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(title_id): Path<i64>,
    Json(payload): Json<UpdateTitleBody>,
) -> Result<Json<TitleDetail>, ApiError> {
    state.actor(&headers).await?.require_admin()?;

    if let Some(year) = payload.year {
        validate_year(year)?;
    }
    let category_id = match payload.category.as_deref() {
        None => None,
        some_slug => Some(resolve_category(&state, some_slug).await?),
    };
    let genre_ids = match &payload.genre {
        None => None,
        Some(slugs) => Some(resolve_genres(&state, slugs).await?),
    };

    let title = state
        .titles()
        .update(
            title_id,
            &UpdateTitleRequest {
                name: payload.name,
                year: payload.year,
                description: payload.description,
                category_id,
                genre_ids,
            },
        )
        .await?;

    Ok(Json(title))
}

pub async fn delete_title(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(title_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.actor(&headers).await?.require_admin()?;

    state.titles().delete(title_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// A write naming an unknown slug is a bad payload, not a missing route.
async fn resolve_category(
    state: &AppState,
    slug: Option<&str>,
) -> Result<Option<i64>, ApiError> {
    let Some(slug) = slug else {
        return Ok(None);
    };

    match state.categories().find_by_slug(slug).await? {
        Some(category) => Ok(Some(category.id)),
        None => {
            let mut errors = ValidationErrors::new();
            errors.push("category", format!("unknown category slug '{slug}'"));
            Err(ApiError::validation(errors))
        }
    }
}

async fn resolve_genres(state: &AppState, slugs: &[String]) -> Result<Vec<i64>, ApiError> {
    match state.genres().resolve_slugs(slugs).await {
        Ok(ids) => Ok(ids),
        Err(CatalogError::GenreNotFound) => {
            let mut errors = ValidationErrors::new();
            errors.push("genre", "unknown genre slug");
            Err(ApiError::validation(errors))
        }
        Err(other) => Err(other.into()),
    }
}
