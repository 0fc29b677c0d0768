//! Category repository for database operations.

use sqlx::{Row, SqlitePool};

use crate::entities::{Category, NameSlugPair};
use crate::types::{errors::map_unique, CatalogError, CatalogResult};

#[derive(Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, ident: &NameSlugPair) -> CatalogResult<Category> {
        let result = sqlx::query("INSERT INTO categories (name, slug) VALUES (?, ?)")
            .bind(&ident.name)
            .bind(&ident.slug)
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique(e, |_| CatalogError::SlugTaken, CatalogError::Database))?;

        Ok(Category {
            id: result.last_insert_rowid(),
            ident: ident.clone(),
        })
    }

    pub async fn find_by_slug(&self, slug: &str) -> CatalogResult<Option<Category>> {
        let row = sqlx::query("SELECT id, name, slug FROM categories WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        Ok(row.map(row_to_category))
    }

    /// List ordered by name, optionally narrowed by a case-insensitive
    /// substring match on the name.
    pub async fn list(
        &self,
        name_filter: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> CatalogResult<Vec<Category>> {
        let rows = sqlx::query(
            "SELECT id, name, slug FROM categories \
             WHERE (?1 IS NULL OR LOWER(name) LIKE '%' || LOWER(?1) || '%') \
             ORDER BY name LIMIT ?2 OFFSET ?3",
        )
        .bind(name_filter)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CatalogError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(row_to_category).collect())
    }

    pub async fn count(&self, name_filter: Option<&str>) -> CatalogResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM categories \
             WHERE (?1 IS NULL OR LOWER(name) LIKE '%' || LOWER(?1) || '%')",
        )
        .bind(name_filter)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| CatalogError::Database(e.to_string()))
    }

    /// Delete by slug. Titles referencing the category survive with their
    /// reference nulled by the schema's ON DELETE SET NULL.
    pub async fn delete_by_slug(&self, slug: &str) -> CatalogResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE slug = ?")
            .bind(slug)
            .execute(&self.pool)
            .await
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::CategoryNotFound);
        }

        Ok(())
    }
}

fn row_to_category(row: sqlx::sqlite::SqliteRow) -> Category {
    Category {
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
    async fn create_list_delete() {
        let pool = memory_pool().await;
        let repo = CategoryRepository::new(pool);

        repo.create(&pair("Films", "films")).await.unwrap();
        repo.create(&pair("Books", "books")).await.unwrap();

        let all = repo.list(None, 10, 0).await.unwrap();
        let names: Vec<_> = all.iter().map(|c| c.ident.name.as_str()).collect();
        assert_eq!(names, vec!["Books", "Films"]);

        repo.delete_by_slug("books").await.unwrap();
        assert_eq!(repo.count(None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicate_slug_is_rejected() {
        let pool = memory_pool().await;
        let repo = CategoryRepository::new(pool);

        repo.create(&pair("Films", "films")).await.unwrap();
        let err = repo.create(&pair("Movies", "films")).await.unwrap_err();
        assert!(matches!(err, CatalogError::SlugTaken));
    }

    #[tokio::test]
    async fn name_filter_is_case_insensitive_substring() {
        let pool = memory_pool().await;
        let repo = CategoryRepository::new(pool);

        repo.create(&pair("Classic Films", "classic-films")).await.unwrap();
        repo.create(&pair("Books", "books")).await.unwrap();

        let hits = repo.list(Some("FILM"), 10, 0).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].ident.slug, "classic-films");
        assert_eq!(repo.count(Some("FILM")).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_missing_slug_is_not_found() {
        let pool = memory_pool().await;
        let repo = CategoryRepository::new(pool);

        let err = repo.delete_by_slug("nope").await.unwrap_err();
        assert!(matches!(err, CatalogError::CategoryNotFound));
    }
}
