use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::ApiError;

/// Extract the bearer token if an Authorization header is present.
///
/// A missing header is fine (anonymous caller); a header with the wrong
/// scheme or an empty token is rejected.
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let Some(value) = headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
    else {
        return Ok(None);
    };

    let mut parts = value.split_whitespace();
    let scheme = parts.next().unwrap_or("");
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(ApiError::unauthorized("invalid authorization scheme"));
    }

    let token = parts.next().unwrap_or("");
    if token.is_empty() {
        return Err(ApiError::unauthorized("missing bearer token"));
    }

    Ok(Some(token.to_string()))
}
