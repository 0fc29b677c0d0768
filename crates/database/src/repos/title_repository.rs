//! Title repository for database operations.
//!
//! Reads compute the rating inline as the average review score, so it can
//! never disagree with the review table.

use sqlx::{Row, SqlitePool};

use crate::entities::{
    Category, CreateTitleRequest, Genre, NameSlugPair, Title, TitleDetail, TitleFilter,
    UpdateTitleRequest,
};
use crate::types::{CatalogError, CatalogResult};

const DETAIL_QUERY: &str = "\
    SELECT t.id, t.name, t.year, t.description, \
           c.id AS category_id, c.name AS category_name, c.slug AS category_slug, \
           AVG(r.score) AS rating \
    FROM titles t \
    LEFT JOIN categories c ON c.id = t.category_id \
    LEFT JOIN reviews r ON r.title_id = t.id \
    WHERE (?1 IS NULL OR LOWER(t.name) LIKE '%' || LOWER(?1) || '%') \
      AND (?2 IS NULL OR t.year = ?2) \
      AND (?3 IS NULL OR EXISTS (\
            SELECT 1 FROM genre_titles gt \
            JOIN genres g ON g.id = gt.genre_id \
            WHERE gt.title_id = t.id \
              AND LOWER(g.slug) LIKE '%' || LOWER(?3) || '%')) \
      AND (?4 IS NULL OR LOWER(c.slug) LIKE '%' || LOWER(?4) || '%') \
      AND (?5 IS NULL OR t.id = ?5) \
    GROUP BY t.id \
    ORDER BY t.name \
    LIMIT ?6 OFFSET ?7";

#[derive(Clone)]
pub struct TitleRepository {
    pool: SqlitePool,
}

impl TitleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: &CreateTitleRequest) -> CatalogResult<TitleDetail> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let result = sqlx::query(
            "INSERT INTO titles (name, year, description, category_id) VALUES (?, ?, ?, ?)",
        )
        .bind(&request.name)
        .bind(request.year)
        .bind(&request.description)
        .bind(request.category_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| CatalogError::Database(e.to_string()))?;

        let title_id = result.last_insert_rowid();

        for genre_id in &request.genre_ids {
            sqlx::query("INSERT OR IGNORE INTO genre_titles (genre_id, title_id) VALUES (?, ?)")
                .bind(genre_id)
                .bind(title_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| CatalogError::Database(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        self.find_detail(title_id)
            .await?
            .ok_or_else(|| CatalogError::Database("failed to retrieve created title".to_string()))
    }

    /// Merge a partial update over the stored row; genre replacement is
    /// wholesale when a list is present.
    pub async fn update(&self, id: i64, request: &UpdateTitleRequest) -> CatalogResult<TitleDetail> {
        let current = self.find_row(id).await?.ok_or(CatalogError::TitleNotFound)?;

        let name = request.name.clone().unwrap_or(current.name);
        let year = request.year.unwrap_or(current.year);
        let description = request.description.clone().or(current.description);
        let category_id = match request.category_id {
            Some(value) => value,
            None => current.category_id,
        };

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        sqlx::query("UPDATE titles SET name = ?, year = ?, description = ?, category_id = ? WHERE id = ?")
            .bind(&name)
            .bind(year)
            .bind(&description)
            .bind(category_id)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        if let Some(genre_ids) = &request.genre_ids {
            sqlx::query("DELETE FROM genre_titles WHERE title_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| CatalogError::Database(e.to_string()))?;

            for genre_id in genre_ids {
                sqlx::query(
                    "INSERT OR IGNORE INTO genre_titles (genre_id, title_id) VALUES (?, ?)",
                )
                .bind(genre_id)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| CatalogError::Database(e.to_string()))?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        self.find_detail(id)
            .await?
            .ok_or(CatalogError::TitleNotFound)
    }

    /// Delete a title. Join rows and reviews cascade; comments cascade with
    /// their reviews.
    pub async fn delete(&self, id: i64) -> CatalogResult<()> {
        let result = sqlx::query("DELETE FROM titles WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::TitleNotFound);
        }

        Ok(())
    }

    pub async fn exists(&self, id: i64) -> CatalogResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM titles WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| CatalogError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    pub async fn find_detail(&self, id: i64) -> CatalogResult<Option<TitleDetail>> {
        let mut details = self
            .query_details(&TitleFilter::default(), Some(id), 1, 0)
            .await?;
        Ok(details.pop())
    }

    pub async fn list(
        &self,
        filter: &TitleFilter,
        limit: i64,
        offset: i64,
    ) -> CatalogResult<Vec<TitleDetail>> {
        self.query_details(filter, None, limit, offset).await
    }

    pub async fn count(&self, filter: &TitleFilter) -> CatalogResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM titles t \
             LEFT JOIN categories c ON c.id = t.category_id \
             WHERE (?1 IS NULL OR LOWER(t.name) LIKE '%' || LOWER(?1) || '%') \
               AND (?2 IS NULL OR t.year = ?2) \
               AND (?3 IS NULL OR EXISTS (\
                     SELECT 1 FROM genre_titles gt \
                     JOIN genres g ON g.id = gt.genre_id \
                     WHERE gt.title_id = t.id \
                       AND LOWER(g.slug) LIKE '%' || LOWER(?3) || '%')) \
               AND (?4 IS NULL OR LOWER(c.slug) LIKE '%' || LOWER(?4) || '%')",
        )
        .bind(&filter.name)
        .bind(filter.year)
        .bind(&filter.genre_slug)
        .bind(&filter.category_slug)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| CatalogError::Database(e.to_string()))
    }

    async fn query_details(
        &self,
        filter: &TitleFilter,
        id: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> CatalogResult<Vec<TitleDetail>> {
        let rows = sqlx::query(DETAIL_QUERY)
            .bind(&filter.name)
            .bind(filter.year)
            .bind(&filter.genre_slug)
            .bind(&filter.category_slug)
            .bind(id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let mut details = Vec::with_capacity(rows.len());
        for row in rows {
            let title_id: i64 = row.get("id");
            let category = row
                .get::<Option<i64>, _>("category_id")
                .map(|category_id| Category {
                    id: category_id,
                    ident: NameSlugPair {
                        name: row.get("category_name"),
                        slug: row.get("category_slug"),
                    },
                });

            details.push(TitleDetail {
                id: title_id,
                name: row.get("name"),
                year: row.get("year"),
                rating: row.get::<Option<f64>, _>("rating"),
                description: row.get("description"),
                genre: self.genres_for(title_id).await?,
                category,
            });
        }

        Ok(details)
    }

    async fn genres_for(&self, title_id: i64) -> CatalogResult<Vec<Genre>> {
        let rows = sqlx::query(
            "SELECT g.id, g.name, g.slug FROM genres g \
             JOIN genre_titles gt ON gt.genre_id = g.id \
             WHERE gt.title_id = ? ORDER BY g.name",
        )
        .bind(title_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CatalogError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| Genre {
                id: row.get("id"),
                ident: NameSlugPair {
                    name: row.get("name"),
                    slug: row.get("slug"),
                },
            })
            .collect())
    }

    async fn find_row(&self, id: i64) -> CatalogResult<Option<Title>> {
        let row = sqlx::query(
            "SELECT id, name, year, description, category_id FROM titles WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| CatalogError::Database(e.to_string()))?;

        Ok(row.map(|row| Title {
            id: row.get("id"),
            name: row.get("name"),
            year: row.get("year"),
            description: row.get("description"),
            category_id: row.get("category_id"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::{CategoryRepository, GenreRepository};
    use crate::test_support::memory_pool;

    async fn seed(pool: &SqlitePool) -> (i64, i64) {
        let categories = CategoryRepository::new(pool.clone());
        let genres = GenreRepository::new(pool.clone());

        let category = categories
            .create(&NameSlugPair {
                name: "Classic Films".to_string(),
                slug: "classic-films".to_string(),
            })
            .await
            .unwrap();
        let genre = genres
            .create(&NameSlugPair {
                name: "Drama".to_string(),
                slug: "drama".to_string(),
            })
            .await
            .unwrap();
        (category.id, genre.id)
    }

    fn new_title(name: &str, year: i32, category_id: Option<i64>, genre_ids: Vec<i64>) -> CreateTitleRequest {
        CreateTitleRequest {
            name: name.to_string(),
            year,
            description: None,
            category_id,
            genre_ids,
        }
    }

    #[tokio::test]
    async fn create_nests_category_and_genres() {
        let pool = memory_pool().await;
        let (category_id, genre_id) = seed(&pool).await;
        let repo = TitleRepository::new(pool);

        let detail = repo
            .create(&new_title("The Matrix", 1999, Some(category_id), vec![genre_id]))
            .await
            .unwrap();

        assert_eq!(detail.name, "The Matrix");
        assert_eq!(detail.rating, None);
        assert_eq!(detail.category.as_ref().unwrap().ident.slug, "classic-films");
        assert_eq!(detail.genre.len(), 1);
        assert_eq!(detail.genre[0].ident.slug, "drama");
    }

    #[tokio::test]
    async fn filters_are_conjunctive_and_name_ordered() {
        let pool = memory_pool().await;
        let (category_id, genre_id) = seed(&pool).await;
        let repo = TitleRepository::new(pool);

        repo.create(&new_title("Zulu", 1964, Some(category_id), vec![]))
            .await
            .unwrap();
        repo.create(&new_title("American Beauty", 1999, None, vec![genre_id]))
            .await
            .unwrap();
        repo.create(&new_title("The Matrix", 1999, Some(category_id), vec![genre_id]))
            .await
            .unwrap();

        let filter = TitleFilter {
            year: Some(1999),
            category_slug: Some("classic-films".to_string()),
            ..Default::default()
        };
        let hits = repo.list(&filter, 10, 0).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "The Matrix");
        assert_eq!(repo.count(&filter).await.unwrap(), 1);

        let all = repo.list(&TitleFilter::default(), 10, 0).await.unwrap();
        let names: Vec<_> = all.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["American Beauty", "The Matrix", "Zulu"]);
    }

    #[tokio::test]
    async fn category_delete_nulls_reference_but_keeps_title() {
        let pool = memory_pool().await;
        let (category_id, _) = seed(&pool).await;
        let categories = CategoryRepository::new(pool.clone());
        let repo = TitleRepository::new(pool);

        let created = repo
            .create(&new_title("Casablanca", 1942, Some(category_id), vec![]))
            .await
            .unwrap();

        categories.delete_by_slug("classic-films").await.unwrap();

        let detail = repo.find_detail(created.id).await.unwrap().unwrap();
        assert!(detail.category.is_none());
    }

    #[tokio::test]
    async fn update_replaces_genres_wholesale() {
        let pool = memory_pool().await;
        let (_, genre_id) = seed(&pool).await;
        let genres = GenreRepository::new(pool.clone());
        let noir = genres
            .create(&NameSlugPair {
                name: "Noir".to_string(),
                slug: "noir".to_string(),
            })
            .await
            .unwrap();
        let repo = TitleRepository::new(pool);

        let created = repo
            .create(&new_title("Chinatown", 1974, None, vec![genre_id]))
            .await
            .unwrap();

        let updated = repo
            .update(
                created.id,
                &UpdateTitleRequest {
                    genre_ids: Some(vec![noir.id]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.genre.len(), 1);
        assert_eq!(updated.genre[0].ident.slug, "noir");
        // Untouched fields survive the merge.
        assert_eq!(updated.name, "Chinatown");
        assert_eq!(updated.year, 1974);
    }

    #[tokio::test]
    async fn delete_missing_title_is_not_found() {
        let pool = memory_pool().await;
        let repo = TitleRepository::new(pool);
        assert!(matches!(
            repo.delete(42).await.unwrap_err(),
            CatalogError::TitleNotFound
        ));
    }
}
