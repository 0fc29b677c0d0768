//! ReviewDeck Database Crate
//!
//! This crate provides database functionality for the ReviewDeck application,
//! including connection management, migrations, and repository implementations.

use sqlx::SqlitePool;

use reviewdeck_config::DatabaseConfig;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::prepare_database;
pub use migrations::{run_migrations, MIGRATOR};

// Re-export repositories
pub use repos::{
    CategoryRepository, CommentRepository, GenreRepository, ReviewRepository, TitleRepository,
    UserRepository,
};

// Re-export entities
pub use entities::{
    AuthoredText, Category, Comment, CreateTitleRequest, CreateUserRequest, Genre, NameSlugPair,
    Review, Title, TitleDetail, TitleFilter, UpdateTitleRequest, UpdateUserRequest, User, UserRole,
};

// Re-export types
pub use types::{
    errors::{CatalogError, DatabaseError, ReviewError, UserError},
    CatalogResult, DatabaseResult, ReviewResult, UserResult,
};

/// Re-export commonly used types for convenience
pub use sqlx::Pool;

/// Initialize the database with migrations
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(e.to_string()))?;

    Ok(pool)
}

#[cfg(test)]
pub(crate) mod test_support {
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    /// Fresh in-memory database with the schema applied. A single connection
    /// keeps the :memory: database alive for the whole test.
    pub async fn memory_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await
            .unwrap();

        crate::migrations::MIGRATOR.run(&pool).await.unwrap();
        pool
    }
}
