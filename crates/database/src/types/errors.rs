//! Error types for the database layer

use thiserror::Error;

/// General database error
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    #[error("Database migration error: {0}")]
    MigrationError(String),
}

/// User-specific database errors
#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Email already exists")]
    EmailTaken,

    #[error("Database error: {0}")]
    Database(String),
}

/// Catalog-specific database errors (categories, genres, titles)
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Category not found")]
    CategoryNotFound,

    #[error("Genre not found")]
    GenreNotFound,

    #[error("Title not found")]
    TitleNotFound,

    #[error("Slug already exists")]
    SlugTaken,

    #[error("Database error: {0}")]
    Database(String),
}

/// Review/comment-specific database errors
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Review not found")]
    ReviewNotFound,

    #[error("Comment not found")]
    CommentNotFound,

    #[error("Author has already reviewed this title")]
    AlreadyReviewed,

    #[error("Database error: {0}")]
    Database(String),
}

/// Map a sqlx error to a domain error through a UNIQUE-violation translator.
///
/// SQLite reports constraint violations as generic database errors; the
/// repositories sniff the message so races lost at the store surface as the
/// same domain error as the pre-check. `on_unique` receives the message so
/// callers with more than one UNIQUE column can tell them apart.
pub(crate) fn map_unique<E>(
    error: sqlx::Error,
    on_unique: impl FnOnce(&str) -> E,
    fallback: impl FnOnce(String) -> E,
) -> E {
    let message = error.to_string();
    if message.contains("UNIQUE constraint failed") {
        on_unique(&message)
    } else {
        fallback(message)
    }
}
