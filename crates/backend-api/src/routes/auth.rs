//! Passwordless signup and token issuance.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub confirmation_code: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access: String,
}

/// Register or re-recognize a user and email them a confirmation code.
/// Responds with the echoed identity; the code never appears here.
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<SignupResponse>, ApiError> {
    let receipt = state
        .authenticator()
        .signup(&payload.username, &payload.email)
        .await?;

    Ok(Json(SignupResponse {
        username: receipt.username,
        email: receipt.email,
    }))
}

/// Exchange a confirmation code for an access token. Unknown usernames are
/// a 404; a wrong or spent code for a known user is a 400.
pub async fn token(
    State(state): State<AppState>,
    Json(payload): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let access = state
        .authenticator()
        .redeem(&payload.username, &payload.confirmation_code)
        .await?;

    Ok(Json(TokenResponse { access }))
}
