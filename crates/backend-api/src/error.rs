use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use reviewdeck_database::{CatalogError, ReviewError, UserError};
use reviewdeck_users::{AccessError, AuthError, ValidationErrors};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub fields: Option<BTreeMap<String, Vec<String>>>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            fields: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// A 400 carrying the per-field breakdown of what was rejected.
    pub fn validation(errors: ValidationErrors) -> Self {
        let mut fields: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for field in errors.fields {
            fields.entry(field.field).or_default().push(field.message);
        }
        Self {
            status: StatusCode::BAD_REQUEST,
            message: "validation failed".to_string(),
            fields: Some(fields),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
            fields: self.fields,
        });
        (self.status, body).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        error!(error = ?error, "internal error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::validation(errors)
    }
}

impl From<AccessError> for ApiError {
    fn from(error: AccessError) -> Self {
        let status = match error {
            AccessError::Unauthorized => StatusCode::UNAUTHORIZED,
            AccessError::Forbidden => StatusCode::FORBIDDEN,
        };
        Self::new(status, error.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::Validation(errors) => Self::validation(errors),
            AuthError::UsernameTaken | AuthError::EmailTaken | AuthError::InvalidCode => {
                Self::new(StatusCode::BAD_REQUEST, error.to_string())
            }
            AuthError::UserNotFound => Self::new(StatusCode::NOT_FOUND, error.to_string()),
            AuthError::InvalidToken(_) => Self::new(StatusCode::UNAUTHORIZED, error.to_string()),
            AuthError::DeliveryFailed(_) => {
                error!(error = %error, "delivery error");
                Self::new(StatusCode::BAD_GATEWAY, error.to_string())
            }
            AuthError::TokenCreationFailed(_) | AuthError::Database(_) => {
                error!(error = %error, "auth error");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
            }
        }
    }
}

impl From<UserError> for ApiError {
    fn from(error: UserError) -> Self {
        match error {
            UserError::NotFound => Self::new(StatusCode::NOT_FOUND, error.to_string()),
            UserError::UsernameTaken | UserError::EmailTaken => {
                Self::new(StatusCode::BAD_REQUEST, error.to_string())
            }
            UserError::Database(_) => {
                error!(error = %error, "user store error");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
            }
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::CategoryNotFound
            | CatalogError::GenreNotFound
            | CatalogError::TitleNotFound => Self::new(StatusCode::NOT_FOUND, error.to_string()),
            CatalogError::SlugTaken => Self::new(StatusCode::BAD_REQUEST, error.to_string()),
            CatalogError::Database(_) => {
                error!(error = %error, "catalog store error");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
            }
        }
    }
}

impl From<ReviewError> for ApiError {
    fn from(error: ReviewError) -> Self {
        match error {
            ReviewError::ReviewNotFound | ReviewError::CommentNotFound => {
                Self::new(StatusCode::NOT_FOUND, error.to_string())
            }
            ReviewError::AlreadyReviewed => Self::new(StatusCode::BAD_REQUEST, error.to_string()),
            ReviewError::Database(_) => {
                error!(error = %error, "review store error");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
            }
        }
    }
}
