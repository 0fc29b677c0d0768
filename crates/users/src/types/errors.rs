//! Error types for the identity system.

use thiserror::Error;

use reviewdeck_database::UserError;

/// A single rejected field with its reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Collected per-field validation failures. All fields are checked before
/// reporting so the client sees every problem at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("validation failed")]
pub struct ValidationErrors {
    pub fields: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// Authentication and signup errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed")]
    Validation(#[from] ValidationErrors),

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Email already exists")]
    EmailTaken,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid or expired confirmation code")]
    InvalidCode,

    #[error("Token creation failed: {0}")]
    TokenCreationFailed(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Notification delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<UserError> for AuthError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound => AuthError::UserNotFound,
            UserError::UsernameTaken => AuthError::UsernameTaken,
            UserError::EmailTaken => AuthError::EmailTaken,
            UserError::Database(message) => AuthError::Database(message),
        }
    }
}

/// Result type for identity operations
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_all_fields_before_failing() {
        let mut errors = ValidationErrors::new();
        assert!(errors.clone().into_result().is_ok());

        errors.push("username", "too long");
        errors.push("email", "not an email address");

        let err = errors.into_result().unwrap_err();
        assert_eq!(err.fields.len(), 2);
        assert_eq!(err.fields[0].field, "username");
    }
}
