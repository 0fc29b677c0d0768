//! User administration plus the self-service `/users/me` pair.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};

use reviewdeck_database::{CreateUserRequest, UpdateUserRequest, User, UserRole};
use reviewdeck_users::utils::validation;
use reviewdeck_users::ValidationErrors;

use crate::pagination::{PageQuery, Paginated};
use crate::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: Option<String>,
    pub role: UserRole,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            bio: user.bio,
            role: user.role,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserBody {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserBody {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<UserRole>,
}

impl UpdateUserBody {
    fn validate(&self, state: &AppState) -> Result<(), ApiError> {
        let mut errors = ValidationErrors::new();
        if let Some(ref username) = self.username {
            validation::validate_username(username, state.limits(), &mut errors);
        }
        if let Some(ref email) = self.email {
            validation::validate_email(email, state.limits(), &mut errors);
        }
        errors.into_result()?;
        Ok(())
    }

    fn into_request(self, allow_role: bool) -> UpdateUserRequest {
        UpdateUserRequest {
            username: self.username,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            bio: self.bio,
            role: if allow_role { self.role } else { None },
        }
    }
}

pub async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(page): Query<PageQuery>,
) -> Result<Json<Paginated<UserResponse>>, ApiError> {
    state.actor(&headers).await?.require_admin()?;

    let page = page.resolve(state.default_page_size())?;
    let count = state.users().count().await?;
    let users = state.users().list(page.limit, page.offset).await?;

    Ok(Json(Paginated {
        count,
        results: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// Admin-created accounts may carry any role from the start.
pub async fn create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateUserBody>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    state.actor(&headers).await?.require_admin()?;

    validation::validate_signup(&payload.username, &payload.email, state.limits())?;

    let user = state
        .users()
        .create(&CreateUserRequest {
            username: payload.username,
            email: payload.email,
            first_name: payload.first_name,
            last_name: payload.last_name,
            bio: payload.bio,
            role: payload.role,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn get_me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, ApiError> {
    let actor = state.actor(&headers).await?;
    let user = actor.require_user()?;
    Ok(Json(user.clone().into()))
}

/// Self-service profile update. The role field is ignored here: only the
/// admin endpoints may change roles.
pub async fn update_me(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<UpdateUserBody>,
) -> Result<Json<UserResponse>, ApiError> {
    let actor = state.actor(&headers).await?;
    let user = actor.require_user()?;

    payload.validate(&state)?;
    let updated = state
        .users()
        .update(&user.username, &payload.into_request(false))
        .await?;

    Ok(Json(updated.into()))
}

pub async fn get_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    state.actor(&headers).await?.require_admin()?;

    let user = state
        .users()
        .find_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(user.into()))
}

pub async fn update_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(username): Path<String>,
    Json(payload): Json<UpdateUserBody>,
) -> Result<Json<UserResponse>, ApiError> {
    state.actor(&headers).await?.require_admin()?;

    payload.validate(&state)?;
    let updated = state
        .users()
        .update(&username, &payload.into_request(true))
        .await?;

    Ok(Json(updated.into()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(username): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.actor(&headers).await?.require_admin()?;

    state.users().delete_by_username(&username).await?;
    Ok(StatusCode::NO_CONTENT)
}
