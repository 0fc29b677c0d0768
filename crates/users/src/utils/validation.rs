//! Input validation utilities.
//!
//! Checks are accumulated per field so a bad request reports everything
//! wrong with it in one response.

use chrono::{Datelike, Utc};
use regex::Regex;
use reviewdeck_config::LimitsConfig;

use crate::types::ValidationErrors;

/// The reserved self-reference username; `/users/me/` routes on it.
pub const RESERVED_USERNAME: &str = "me";

const USERNAME_ALLOWED: &str = r"^[\w.@+-]+$";
const USERNAME_FORBIDDEN: &str = r"[^\w.@+-]";
const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

/// Validate a username against length, the allowed alphabet, and the
/// reserved name. Offending characters are enumerated so the caller can see
/// exactly which ones were rejected.
pub fn validate_username(username: &str, limits: &LimitsConfig, errors: &mut ValidationErrors) {
    if username.is_empty() {
        errors.push("username", "username must not be empty");
        return;
    }

    if username.chars().count() > limits.username_max_length {
        errors.push(
            "username",
            format!(
                "username must be at most {} characters",
                limits.username_max_length
            ),
        );
    }

    if username == RESERVED_USERNAME {
        errors.push("username", "username 'me' is reserved");
    }

    let allowed = Regex::new(USERNAME_ALLOWED).expect("static pattern");
    if !allowed.is_match(username) {
        let forbidden = Regex::new(USERNAME_FORBIDDEN).expect("static pattern");
        let mut offending: Vec<String> = forbidden
            .find_iter(username)
            .map(|m| m.as_str().to_string())
            .collect();
        offending.sort();
        offending.dedup();
        errors.push(
            "username",
            format!(
                "username contains forbidden characters: {}",
                offending.join(" ")
            ),
        );
    }
}

pub fn validate_email(email: &str, limits: &LimitsConfig, errors: &mut ValidationErrors) {
    if email.len() > limits.email_max_length {
        errors.push(
            "email",
            format!(
                "email must be at most {} characters",
                limits.email_max_length
            ),
        );
    }

    let pattern = Regex::new(EMAIL_PATTERN).expect("static pattern");
    if !pattern.is_match(email) {
        errors.push("email", "invalid email format");
    }
}

pub fn validate_signup(
    username: &str,
    email: &str,
    limits: &LimitsConfig,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    validate_username(username, limits, &mut errors);
    validate_email(email, limits, &mut errors);
    errors.into_result()
}

const SLUG_PATTERN: &str = r"^[-a-zA-Z0-9_]+$";
const SLUG_MAX_LENGTH: usize = 50;
const NAME_MAX_LENGTH: usize = 256;

/// Catalog entries pair a display name with a short URL-safe slug.
pub fn validate_name_slug(name: &str, slug: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if name.chars().count() > NAME_MAX_LENGTH {
        errors.push(
            "name",
            format!("name must be at most {NAME_MAX_LENGTH} characters"),
        );
    }

    if slug.len() > SLUG_MAX_LENGTH {
        errors.push(
            "slug",
            format!("slug must be at most {SLUG_MAX_LENGTH} characters"),
        );
    }
    let pattern = Regex::new(SLUG_PATTERN).expect("static pattern");
    if !pattern.is_match(slug) {
        errors.push(
            "slug",
            "slug may contain only letters, digits, hyphens and underscores",
        );
    }

    errors.into_result()
}

/// A title's year must not lie in the future.
pub fn validate_year(year: i32) -> Result<(), ValidationErrors> {
    let current = Utc::now().year();
    if year > current {
        let mut errors = ValidationErrors::new();
        errors.push("year", format!("year must not be later than {current}"));
        return Err(errors);
    }
    Ok(())
}

pub fn validate_score(score: i32) -> Result<(), ValidationErrors> {
    if !(1..=10).contains(&score) {
        let mut errors = ValidationErrors::new();
        errors.push("score", "score must be between 1 and 10");
        return Err(errors);
    }
    Ok(())
}
