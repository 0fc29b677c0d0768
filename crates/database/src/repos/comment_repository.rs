//! Comment repository for database operations.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::entities::{AuthoredText, Comment};
use crate::types::{ReviewError, ReviewResult};

const COMMENT_QUERY: &str = "\
    SELECT c.id, c.review_id, c.text, c.author_id, c.pub_date, \
           u.username AS author \
    FROM comments c \
    JOIN users u ON u.id = c.author_id";

#[derive(Clone)]
pub struct CommentRepository {
    pool: SqlitePool,
}

impl CommentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, review_id: i64, author_id: i64, text: &str) -> ReviewResult<Comment> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO comments (review_id, author_id, text, pub_date) VALUES (?, ?, ?, ?)",
        )
        .bind(review_id)
        .bind(author_id)
        .bind(text)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| ReviewError::Database(e.to_string()))?;

        self.find_scoped(review_id, result.last_insert_rowid())
            .await?
            .ok_or_else(|| ReviewError::Database("failed to retrieve created comment".to_string()))
    }

    /// Fetch a comment only if it belongs to the given review.
    pub async fn find_scoped(
        &self,
        review_id: i64,
        comment_id: i64,
    ) -> ReviewResult<Option<Comment>> {
        let row = sqlx::query(&format!(
            "{COMMENT_QUERY} WHERE c.id = ? AND c.review_id = ?"
        ))
        .bind(comment_id)
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ReviewError::Database(e.to_string()))?;

        Ok(row.map(row_to_comment))
    }

    pub async fn list_for_review(
        &self,
        review_id: i64,
        limit: i64,
        offset: i64,
    ) -> ReviewResult<Vec<Comment>> {
        let rows = sqlx::query(&format!(
            "{COMMENT_QUERY} WHERE c.review_id = ? \
             ORDER BY c.pub_date DESC, c.id DESC LIMIT ? OFFSET ?"
        ))
        .bind(review_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ReviewError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(row_to_comment).collect())
    }

    pub async fn count_for_review(&self, review_id: i64) -> ReviewResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE review_id = ?")
            .bind(review_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ReviewError::Database(e.to_string()))
    }

    pub async fn update(
        &self,
        review_id: i64,
        comment_id: i64,
        text: &str,
    ) -> ReviewResult<Comment> {
        let result = sqlx::query("UPDATE comments SET text = ? WHERE id = ? AND review_id = ?")
            .bind(text)
            .bind(comment_id)
            .bind(review_id)
            .execute(&self.pool)
            .await
            .map_err(|e| ReviewError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(ReviewError::CommentNotFound);
        }

        self.find_scoped(review_id, comment_id)
            .await?
            .ok_or(ReviewError::CommentNotFound)
    }

    pub async fn delete(&self, review_id: i64, comment_id: i64) -> ReviewResult<()> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ? AND review_id = ?")
            .bind(comment_id)
            .bind(review_id)
            .execute(&self.pool)
            .await
            .map_err(|e| ReviewError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(ReviewError::CommentNotFound);
        }

        Ok(())
    }
}

fn row_to_comment(row: sqlx::sqlite::SqliteRow) -> Comment {
    Comment {
        id: row.get("id"),
        review_id: row.get("review_id"),
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
    use crate::repos::{ReviewRepository, TitleRepository, UserRepository};
    use crate::test_support::memory_pool;

    async fn seed(pool: &SqlitePool) -> (i64, i64) {
        let users = UserRepository::new(pool.clone());
        let titles = TitleRepository::new(pool.clone());
        let reviews = ReviewRepository::new(pool.clone());

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
        let review = reviews
            .create(title.id, user.id, "Great.", 9)
            .await
            .unwrap();
        (review.id, user.id)
    }

    #[tokio::test]
    async fn create_and_list_newest_first() {
        let pool = memory_pool().await;
        let (review_id, author_id) = seed(&pool).await;
        let repo = CommentRepository::new(pool);

        let first = repo.create(review_id, author_id, "First.").await.unwrap();
        let second = repo.create(review_id, author_id, "Second.").await.unwrap();
        assert_eq!(first.body.author, "alice");

        let comments = repo.list_for_review(review_id, 10, 0).await.unwrap();
        let ids: Vec<_> = comments.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert_eq!(repo.count_for_review(review_id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn scoped_lookup_rejects_wrong_review() {
        let pool = memory_pool().await;
        let (review_id, author_id) = seed(&pool).await;
        let repo = CommentRepository::new(pool);

        let comment = repo.create(review_id, author_id, "First.").await.unwrap();
        assert!(repo
            .find_scoped(review_id + 1, comment.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn comments_cascade_with_review() {
        let pool = memory_pool().await;
        let (review_id, author_id) = seed(&pool).await;
        let reviews = ReviewRepository::new(pool.clone());
        let repo = CommentRepository::new(pool);

        repo.create(review_id, author_id, "First.").await.unwrap();

        let title_id: i64 = 1;
        reviews.delete(title_id, review_id).await.unwrap();
        assert_eq!(repo.count_for_review(review_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn update_missing_comment_is_not_found() {
        let pool = memory_pool().await;
        let (review_id, _) = seed(&pool).await;
        let repo = CommentRepository::new(pool);

        let err = repo.update(review_id, 42, "hello").await.unwrap_err();
        assert!(matches!(err, ReviewError::CommentNotFound));
    }
}
