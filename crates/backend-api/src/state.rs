use std::sync::Arc;

use axum::http::HeaderMap;
use sqlx::SqlitePool;

use reviewdeck_config::{AppConfig, LimitsConfig};
use reviewdeck_database::{
    CategoryRepository, CommentRepository, GenreRepository, ReviewRepository, TitleRepository,
    UserRepository,
};
use reviewdeck_users::{Actor, Authenticator, Notifier};

use crate::util::bearer_token;
use crate::ApiError;

#[derive(Clone)]
pub struct AppState {
    authenticator: Arc<Authenticator>,
    users: UserRepository,
    categories: CategoryRepository,
    genres: GenreRepository,
    titles: TitleRepository,
    reviews: ReviewRepository,
    comments: CommentRepository,
    limits: LimitsConfig,
    page_size: i64,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &AppConfig, notifier: Arc<dyn Notifier>) -> Self {
        let authenticator = Arc::new(Authenticator::new(
            pool.clone(),
            &config.auth,
            &config.limits,
            notifier,
        ));

        Self {
            authenticator,
            users: UserRepository::new(pool.clone()),
            categories: CategoryRepository::new(pool.clone()),
            genres: GenreRepository::new(pool.clone()),
            titles: TitleRepository::new(pool.clone()),
            reviews: ReviewRepository::new(pool.clone()),
            comments: CommentRepository::new(pool),
            limits: config.limits.clone(),
            page_size: i64::from(config.api.page_size),
        }
    }

    pub fn limits(&self) -> &LimitsConfig {
        &self.limits
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn users(&self) -> &UserRepository {
        &self.users
    }

    pub fn categories(&self) -> &CategoryRepository {
        &self.categories
    }

    pub fn genres(&self) -> &GenreRepository {
        &self.genres
    }

    pub fn titles(&self) -> &TitleRepository {
        &self.titles
    }

    pub fn reviews(&self) -> &ReviewRepository {
        &self.reviews
    }

    pub fn comments(&self) -> &CommentRepository {
        &self.comments
    }

    pub fn default_page_size(&self) -> i64 {
        self.page_size
    }

    /// Resolve the caller. No Authorization header means anonymous; a
    /// present but unusable credential is a 401 even on public routes.
    pub async fn actor(&self, headers: &HeaderMap) -> Result<Actor, ApiError> {
        match bearer_token(headers)? {
            None => Ok(Actor::anonymous()),
            Some(token) => {
                let user = self.authenticator.authenticate(&token).await?;
                Ok(Actor::authenticated(user))
            }
        }
    }
}
