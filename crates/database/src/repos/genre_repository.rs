//! Genre repository for database operations.

use sqlx::{Row, SqlitePool};

use crate::entities::{Genre, NameSlugPair};
use crate::types::{errors::map_unique, CatalogError, CatalogResult};

#[derive(Clone)]
pub struct GenreRepository {
    pool: SqlitePool,
}

impl GenreRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, ident: &NameSlugPair) -> CatalogResult<Genre> {
        let result = sqlx::query("INSERT INTO genres (name, slug) VALUES (?, ?)")
            .bind(&ident.name)
            .bind(&ident.slug)
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique(e, |_| CatalogError::SlugTaken, CatalogError::Database))?;

        Ok(Genre {
            id: result.last_insert_rowid(),
            ident: ident.clone(),
        })
    }

    pub async fn find_by_slug(&self, slug: &str) -> CatalogResult<Option<Genre>> {
        let row = sqlx::query("SELECT id, name, slug FROM genres WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        Ok(row.map(row_to_genre))
    }

    /// Resolve a set of slugs to genre ids, in input order. Any unknown slug
    /// fails the whole resolution; callers report it as a validation error.
    pub async fn resolve_slugs(&self, slugs: &[String]) -> CatalogResult<Vec<i64>> {
        let mut ids = Vec::with_capacity(slugs.len());
        for slug in slugs {
            let genre = self
                .find_by_slug(slug)
                .await?
                .ok_or(CatalogError::GenreNotFound)?;
            ids.push(genre.id);
        }
        Ok(ids)
    }

    pub async fn list(
        &self,
        name_filter: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> CatalogResult<Vec<Genre>> {
        let rows = sqlx::query(
            "SELECT id, name, slug FROM genres \
             WHERE (?1 IS NULL OR LOWER(name) LIKE '%' || LOWER(?1) || '%') \
             ORDER BY name LIMIT ?2 OFFSET ?3",
        )
        .bind(name_filter)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CatalogError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(row_to_genre).collect())
    }

    pub async fn count(&self, name_filter: Option<&str>) -> CatalogResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM genres \
             WHERE (?1 IS NULL OR LOWER(name) LIKE '%' || LOWER(?1) || '%')",
        )
        .bind(name_filter)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| CatalogError::Database(e.to_string()))
    }

    /// Delete by slug; join rows cascade, titles themselves are untouched.
    pub async fn delete_by_slug(&self, slug: &str) -> CatalogResult<()> {
        let result = sqlx::query("DELETE FROM genres WHERE slug = ?")
            .bind(slug)
            .execute(&self.pool)
            .await
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::GenreNotFound);
        }

        Ok(())
    }
}

fn row_to_genre(row: sqlx::sqlite::SqliteRow) -> Genre {
    Genre {
        id: row.get("id"),
        ident: NameSlugPair {
            name: row.get("name"),
            slug: row.get("slug"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::memory_pool;

    fn pair(name: &str, slug: &str) -> NameSlugPair {
        NameSlugPair {
            name: name.to_string(),
            slug: slug.to_string(),
        }
    }

    #[tokio::test]
    async fn resolve_slugs_preserves_order_and_rejects_unknown() {
        let pool = memory_pool().await;
        let repo = GenreRepository::new(pool);

        let drama = repo.create(&pair("Drama", "drama")).await.unwrap();
        let noir = repo.create(&pair("Noir", "noir")).await.unwrap();

        let ids = repo
            .resolve_slugs(&["noir".to_string(), "drama".to_string()])
            .await
            .unwrap();
        assert_eq!(ids, vec![noir.id, drama.id]);

        let err = repo
            .resolve_slugs(&["drama".to_string(), "western".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::GenreNotFound));
    }

    #[tokio::test]
    async fn list_is_name_ordered() {
        let pool = memory_pool().await;
        let repo = GenreRepository::new(pool);

        repo.create(&pair("Western", "western")).await.unwrap();
        repo.create(&pair("Drama", "drama")).await.unwrap();

        let all = repo.list(None, 10, 0).await.unwrap();
        let slugs: Vec<_> = all.iter().map(|g| g.ident.slug.as_str()).collect();
        assert_eq!(slugs, vec!["drama", "western"]);
    }
}
