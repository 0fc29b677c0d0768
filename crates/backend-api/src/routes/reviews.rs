//! Reviews nested under a title. One review per author per title; edits
//! and removals are for the author, moderators, and admins.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};

use reviewdeck_database::Review;
use reviewdeck_users::utils::validation::validate_score;

use crate::pagination::{PageQuery, Paginated};
use crate::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub id: i64,
    pub text: String,
    pub author: String,
    pub score: i32,
    pub pub_date: String,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            text: review.body.text,
            author: review.body.author,
            score: review.score,
            pub_date: review.body.pub_date,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateReviewBody {
    pub text: String,
    pub score: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateReviewBody {
    pub text: Option<String>,
    pub score: Option<i32>,
}

async fn ensure_title(state: &AppState, title_id: i64) -> Result<(), ApiError> {
    if state.titles().exists(title_id).await? {
        Ok(())
    } else {
        Err(ApiError::not_found("Title not found"))
    }
}

pub async fn list_reviews(
    State(state): State<AppState>,
    Path(title_id): Path<i64>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Paginated<ReviewResponse>>, ApiError> {
    ensure_title(&state, title_id).await?;

    let page = page.resolve(state.default_page_size())?;
    let count = state.reviews().count_for_title(title_id).await?;
    let reviews = state
        .reviews()
        .list_for_title(title_id, page.limit, page.offset)
        .await?;

    Ok(Json(Paginated {
        count,
        results: reviews.into_iter().map(ReviewResponse::from).collect(),
    }))
}

pub async fn create_review(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(title_id): Path<i64>,
    Json(payload): Json<CreateReviewBody>,
) -> Result<(StatusCode, Json<ReviewResponse>), ApiError> {
    let actor = state.actor(&headers).await?;
    let user = actor.require_user()?;

    ensure_title(&state, title_id).await?;
    validate_score(payload.score)?;

    let review = state
        .reviews()
        .create(title_id, user.id, &payload.text, payload.score)
        .await?;

    Ok((StatusCode::CREATED, Json(review.into())))
}

pub async fn get_review(
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(i64, i64)>,
) -> Result<Json<ReviewResponse>, ApiError> {
    ensure_title(&state, title_id).await?;

    let review = state
        .reviews()
        .find_scoped(title_id, review_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Review not found"))?;

    Ok(Json(review.into()))
}

pub async fn update_review(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((title_id, review_id)): Path<(i64, i64)>,
    Json(payload): Json<UpdateReviewBody>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let actor = state.actor(&headers).await?;

    ensure_title(&state, title_id).await?;
    let review = state
        .reviews()
        .find_scoped(title_id, review_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Review not found"))?;

    actor.require_author_or_moderator(review.body.author_id)?;
    if let Some(score) = payload.score {
        validate_score(score)?;
    }

    let updated = state
        .reviews()
        .update(
            title_id,
            review_id,
            payload.text.as_deref(),
            payload.score,
        )
        .await?;

    Ok(Json(updated.into()))
}

pub async fn delete_review(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((title_id, review_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    let actor = state.actor(&headers).await?;

    ensure_title(&state, title_id).await?;
    let review = state
        .reviews()
        .find_scoped(title_id, review_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Review not found"))?;

    actor.require_author_or_moderator(review.body.author_id)?;
    state.reviews().delete(title_id, review_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
