//! Review repository for database operations.
//!
//! One review per (title, author), enforced by the schema's UNIQUE pair.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::entities::{AuthoredText, Review};
use crate::types::{errors::map_unique, ReviewError, ReviewResult};

const REVIEW_QUERY: &str = "\
    SELECT r.id, r.title_id, r.score, r.text, r.author_id, r.pub_date, \
           u.username AS author \
    FROM reviews r \
    JOIN users u ON u.id = r.author_id";

#[derive(Clone)]
pub struct ReviewRepository {
    pool: SqlitePool,
}

impl ReviewRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a review. The UNIQUE (title_id, author_id) violation maps to
    /// AlreadyReviewed so a second review from the same author is rejected.
    pub async fn create(
        &self,
        title_id: i64,
        author_id: i64,
        text: &str,
        score: i32,
    ) -> ReviewResult<Review> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO reviews (title_id, author_id, text, score, pub_date) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(title_id)
        .bind(author_id)
        .bind(text)
        .bind(score)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique(e, |_| ReviewError::AlreadyReviewed, ReviewError::Database))?;

        self.find_scoped(title_id, result.last_insert_rowid())
            .await?
            .ok_or_else(|| ReviewError::Database("failed to retrieve created review".to_string()))
    }

    /// Fetch a review only if it belongs to the given title, so nested
    /// routes never leak a review through the wrong parent.
    pub async fn find_scoped(&self, title_id: i64, review_id: i64) -> ReviewResult<Option<Review>> {
        let row = sqlx::query(&format!(
            "{REVIEW_QUERY} WHERE r.id = ? AND r.title_id = ?"
        ))
        .bind(review_id)
        .bind(title_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ReviewError::Database(e.to_string()))?;

        Ok(row.map(row_to_review))
    }

    /// Newest first; ties broken by id so the order is stable.
    pub async fn list_for_title(
        &self,
        title_id: i64,
        limit: i64,
        offset: i64,
    ) -> ReviewResult<Vec<Review>> {
        let rows = sqlx::query(&format!(
            "{REVIEW_QUERY} WHERE r.title_id = ? \
             ORDER BY r.pub_date DESC, r.id DESC LIMIT ? OFFSET ?"
        ))
        .bind(title_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ReviewError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(row_to_review).collect())
    }

    pub async fn count_for_title(&self, title_id: i64) -> ReviewResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE title_id = ?")
            .bind(title_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ReviewError::Database(e.to_string()))
    }

    /// Update text and/or score; pub_date stays at creation time.
    pub async fn update(
        &self,
        title_id: i64,
        review_id: i64,
        text: Option<&str>,
        score: Option<i32>,
    ) -> ReviewResult<Review> {
        let mut query_parts = Vec::new();
        if text.is_some() {
            query_parts.push("text = ?");
        }
        if score.is_some() {
            query_parts.push("score = ?");
        }

        if !query_parts.is_empty() {
            let query_str = format!(
                "UPDATE reviews SET {} WHERE id = ? AND title_id = ?",
                query_parts.join(", ")
            );

            let mut query = sqlx::query(&query_str);
            if let Some(text) = text {
                query = query.bind(text);
            }
            if let Some(score) = score {
                query = query.bind(score);
            }
            let result = query
                .bind(review_id)
                .bind(title_id)
                .execute(&self.pool)
                .await
                .map_err(|e| ReviewError::Database(e.to_string()))?;

            if result.rows_affected() == 0 {
                return Err(ReviewError::ReviewNotFound);
            }
        }

        self.find_scoped(title_id, review_id)
            .await?
            .ok_or(ReviewError::ReviewNotFound)
    }

    /// Delete a review; its comments cascade.
    pub async fn delete(&self, title_id: i64, review_id: i64) -> ReviewResult<()> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = ? AND title_id = ?")
            .bind(review_id)
            .bind(title_id)
            .execute(&self.pool)
            .await
            .map_err(|e| ReviewError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(ReviewError::ReviewNotFound);
        }

        Ok(())
    }
}

fn row_to_review(row: sqlx::sqlite::SqliteRow) -> Review {
    Review {
        id: row.get("id"),
        title_id: row.get("title_id"),
        score: row.get("score"),
        body: AuthoredText {
            text: row.get("text"),
            author_id: row.get("author_id"),
            author: row.get("author"),
            pub_date: row.get("pub_date"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{CreateTitleRequest, CreateUserRequest};
    use crate::repos::{TitleRepository, UserRepository};
    use crate::test_support::memory_pool;

    async fn seed(pool: &SqlitePool) -> (i64, i64) {
        let users = UserRepository::new(pool.clone());
        let titles = TitleRepository::new(pool.clone());

        let user = users
            .create(&CreateUserRequest {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                first_name: String::new(),
                last_name: String::new(),
                bio: None,
                role: None,
            })
            .await
            .unwrap();
        let title = titles
            .create(&CreateTitleRequest {
                name: "The Matrix".to_string(),
                year: 1999,
                description: None,
                category_id: None,
                genre_ids: vec![],
            })
            .await
            .unwrap();
        (title.id, user.id)
    }

    #[tokio::test]
    async fn create_resolves_author_username() {
        let pool = memory_pool().await;
        let (title_id, author_id) = seed(&pool).await;
        let repo = ReviewRepository::new(pool);

        let review = repo.create(title_id, author_id, "Great.", 9).await.unwrap();
        assert_eq!(review.score, 9);
        assert_eq!(review.body.author, "alice");
    }

    #[tokio::test]
    async fn second_review_from_same_author_is_rejected() {
        let pool = memory_pool().await;
        let (title_id, author_id) = seed(&pool).await;
        let repo = ReviewRepository::new(pool);

        repo.create(title_id, author_id, "Great.", 9).await.unwrap();
        let err = repo
            .create(title_id, author_id, "Changed my mind.", 3)
            .await
            .unwrap_err();
        assert!(matches!(err, ReviewError::AlreadyReviewed));
    }

    #[tokio::test]
    async fn scoped_lookup_rejects_wrong_title() {
        let pool = memory_pool().await;
        let (title_id, author_id) = seed(&pool).await;
        let repo = ReviewRepository::new(pool);

        let review = repo.create(title_id, author_id, "Great.", 9).await.unwrap();
        assert!(repo
            .find_scoped(title_id + 1, review.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn update_keeps_pub_date() {
        let pool = memory_pool().await;
        let (title_id, author_id) = seed(&pool).await;
        let repo = ReviewRepository::new(pool);

        let review = repo.create(title_id, author_id, "Great.", 9).await.unwrap();
        let updated = repo
            .update(title_id, review.id, Some("Still great."), None)
            .await
            .unwrap();

        assert_eq!(updated.body.text, "Still great.");
        assert_eq!(updated.score, 9);
        assert_eq!(updated.body.pub_date, review.body.pub_date);
    }

    #[tokio::test]
    async fn delete_missing_review_is_not_found() {
        let pool = memory_pool().await;
        let (title_id, _) = seed(&pool).await;
        let repo = ReviewRepository::new(pool);

        let err = repo.delete(title_id, 42).await.unwrap_err();
        assert!(matches!(err, ReviewError::ReviewNotFound));
    }
}
