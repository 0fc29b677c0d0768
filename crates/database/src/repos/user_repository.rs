//! User repository for database operations.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::Utc;
use rand::RngCore;
use sqlx::{Row, SqlitePool};

use crate::entities::{user::UserRole, CreateUserRequest, UpdateUserRequest, User};
use crate::types::{errors::map_unique, UserError, UserResult};

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, bio, role, is_staff, \
     confirmation_seed, created_at, updated_at";

/// Repository for user database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> UserResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| UserError::Database(e.to_string()))?;

        Ok(row.map(row_to_user))
    }

    pub async fn find_by_username(&self, username: &str) -> UserResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::Database(e.to_string()))?;

        Ok(row.map(row_to_user))
    }

    /// Find the user matching this exact (username, email) pair. Signup
    /// treats a hit as "already registered, re-issue a code".
    pub async fn find_by_pair(&self, username: &str, email: &str) -> UserResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ? AND email = ?"
        ))
        .bind(username)
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::Database(e.to_string()))?;

        Ok(row.map(row_to_user))
    }

    /// Create a new user. A UNIQUE violation is translated to the taken
    /// username/email error so concurrent signups surface as Conflict.
    pub async fn create(&self, request: &CreateUserRequest) -> UserResult<User> {
        let now = Utc::now().to_rfc3339();
        let role = request.role.unwrap_or(UserRole::User);
        let seed = new_confirmation_seed();

        let result = sqlx::query(
            "INSERT INTO users (username, email, first_name, last_name, bio, role, is_staff, \
             confirmation_seed, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, false, ?, ?, ?)",
        )
        .bind(&request.username)
        .bind(&request.email)
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(&request.bio)
        .bind(role.as_str())
        .bind(&seed)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique(e, taken_column, UserError::Database))?;

        let user_id = result.last_insert_rowid();
        self.find_by_id(user_id)
            .await?
            .ok_or_else(|| UserError::Database("failed to retrieve created user".to_string()))
    }

    /// Apply a partial update, touching `updated_at`. Role is included only
    /// when the caller (admin path) sets it; the self-service path pins it
    /// before calling in.
    pub async fn update(&self, username: &str, request: &UpdateUserRequest) -> UserResult<User> {
        let mut query_parts = Vec::new();
        let mut values = Vec::new();

        if let Some(ref new_username) = request.username {
            query_parts.push("username = ?");
            values.push(new_username.clone());
        }
        if let Some(ref email) = request.email {
            query_parts.push("email = ?");
            values.push(email.clone());
        }
        if let Some(ref first_name) = request.first_name {
            query_parts.push("first_name = ?");
            values.push(first_name.clone());
        }
        if let Some(ref last_name) = request.last_name {
            query_parts.push("last_name = ?");
            values.push(last_name.clone());
        }
        if let Some(ref bio) = request.bio {
            query_parts.push("bio = ?");
            values.push(bio.clone());
        }
        if let Some(role) = request.role {
            query_parts.push("role = ?");
            values.push(role.as_str().to_string());
        }

        if query_parts.is_empty() {
            return self
                .find_by_username(username)
                .await?
                .ok_or(UserError::NotFound);
        }

        query_parts.push("updated_at = ?");
        values.push(Utc::now().to_rfc3339());

        let query_str = format!(
            "UPDATE users SET {} WHERE username = ?",
            query_parts.join(", ")
        );

        let mut query = sqlx::query(&query_str);
        for value in values {
            query = query.bind(value);
        }
        query = query.bind(username);

        let result = query
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique(e, taken_column, UserError::Database))?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound);
        }

        self.find_by_username(request.username.as_deref().unwrap_or(username))
            .await?
            .ok_or(UserError::NotFound)
    }

    pub async fn delete_by_username(&self, username: &str) -> UserResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE username = ?")
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(|e| UserError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound);
        }

        Ok(())
    }

    pub async fn list(&self, limit: i64, offset: i64) -> UserResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY username LIMIT ? OFFSET ?"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| UserError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(row_to_user).collect())
    }

    pub async fn count(&self) -> UserResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| UserError::Database(e.to_string()))
    }

    /// Compare-and-swap the confirmation seed. Returns false when the stored
    /// seed no longer matches, i.e. the code was already redeemed or the
    /// user state moved underneath us.
    pub async fn rotate_confirmation_seed(
        &self,
        user_id: i64,
        expected_seed: &str,
    ) -> UserResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET confirmation_seed = ?, updated_at = ? \
             WHERE id = ? AND confirmation_seed = ?",
        )
        .bind(new_confirmation_seed())
        .bind(Utc::now().to_rfc3339())
        .bind(user_id)
        .bind(expected_seed)
        .execute(&self.pool)
        .await
        .map_err(|e| UserError::Database(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }
}

fn row_to_user(row: sqlx::sqlite::SqliteRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        bio: row.get("bio"),
        role: UserRole::from(row.get::<String, _>("role").as_str()),
        is_staff: row.get("is_staff"),
        confirmation_seed: row.get("confirmation_seed"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn taken_column(message: &str) -> UserError {
    if message.contains("users.email") {
        UserError::EmailTaken
    } else {
        UserError::UsernameTaken
    }
}

fn new_confirmation_seed() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
