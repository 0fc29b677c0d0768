//! Category catalog: list is public, writes are admin-only.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;

use reviewdeck_database::{Category, NameSlugPair};
use reviewdeck_users::utils::validation::validate_name_slug;

use crate::pagination::{PageQuery, Paginated};
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct CategoryListQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub name: Option<String>,
}

pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<CategoryListQuery>,
) -> Result<Json<Paginated<Category>>, ApiError> {
    let page = PageQuery {
        page: query.page,
        page_size: query.page_size,
    }
    .resolve(state.default_page_size())?;
    let name = query.name.as_deref();

    let count = state.categories().count(name).await?;
    let results = state
        .categories()
        .list(name, page.limit, page.offset)
        .await?;

    Ok(Json(Paginated { count, results }))
}

pub async fn create_category(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<NameSlugPair>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    state.actor(&headers).await?.require_admin()?;

    validate_name_slug(&payload.name, &payload.slug)?;
    let category = state.categories().create(&payload).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn delete_category(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(slug): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.actor(&headers).await?.require_admin()?;

    state.categories().delete_by_slug(&slug).await?;
    Ok(StatusCode::NO_CONTENT)
}
