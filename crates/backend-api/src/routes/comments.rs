//! Comments nested under a review. Same ownership rules as reviews.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};

use reviewdeck_database::{Comment, Review};

use crate::pagination::{PageQuery, Paginated};
use crate::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: i64,
    pub text: String,
    pub author: String,
    pub pub_date: String,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            text: comment.body.text,
            author: comment.body.author,
            pub_date: comment.body.pub_date,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CommentBody {
    pub text: String,
}

/// Comments hang off a review which in turn must hang off the title in the
/// path; a mismatch anywhere along the chain is a 404.
async fn ensure_review(
    state: &AppState,
    title_id: i64,
    review_id: i64,
) -> Result<Review, ApiError> {
    if !state.titles().exists(title_id).await? {
        return Err(ApiError::not_found("Title not found"));
    }
    state
        .reviews()
        .find_scoped(title_id, review_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Review not found"))
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(i64, i64)>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Paginated<CommentResponse>>, ApiError> {
    ensure_review(&state, title_id, review_id).await?;

    let page = page.resolve(state.default_page_size())?;
    let count = state.comments().count_for_review(review_id).await?;
    let comments = state
        .comments()
        .list_for_review(review_id, page.limit, page.offset)
        .await?;

    Ok(Json(Paginated {
        count,
        results: comments.into_iter().map(CommentResponse::from).collect(),
    }))
}

pub async fn create_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((title_id, review_id)): Path<(i64, i64)>,
    Json(payload): Json<CommentBody>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    let actor = state.actor(&headers).await?;
    let user = actor.require_user()?;

    ensure_review(&state, title_id, review_id).await?;

    let comment = state
        .comments()
        .create(review_id, user.id, &payload.text)
        .await?;

    Ok((StatusCode::CREATED, Json(comment.into())))
}

pub async fn get_comment(
    State(state): State<AppState>,
    Path((title_id, review_id, comment_id)): Path<(i64, i64, i64)>,
) -> Result<Json<CommentResponse>, ApiError> {
    ensure_review(&state, title_id, review_id).await?;

    let comment = state
        .comments()
        .find_scoped(review_id, comment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;

    Ok(Json(comment.into()))
}

pub async fn update_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((title_id, review_id, comment_id)): Path<(i64, i64, i64)>,
    Json(payload): Json<CommentBody>,
) -> Result<Json<CommentResponse>, ApiError> {
    let actor = state.actor(&headers).await?;

    ensure_review(&state, title_id, review_id).await?;
    let comment = state
        .comments()
        .find_scoped(review_id, comment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;

    actor.require_author_or_moderator(comment.body.author_id)?;

    let updated = state
        .comments()
        .update(review_id, comment_id, &payload.text)
        .await?;

    Ok(Json(updated.into()))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((title_id, review_id, comment_id)): Path<(i64, i64, i64)>,
) -> Result<StatusCode, ApiError> {
    let actor = state.actor(&headers).await?;

    ensure_review(&state, title_id, review_id).await?;
    let comment = state
        .comments()
        .find_scoped(review_id, comment_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;

    actor.require_author_or_moderator(comment.body.author_id)?;
    state.comments().delete(review_id, comment_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
