mod error;
mod pagination;
mod state;
mod util;

pub mod routes;

pub use error::{ApiError, ErrorResponse};
pub use pagination::{Page, PageQuery, Paginated};
pub use state::AppState;

use axum::{
    http::header::{AUTHORIZATION, CONTENT_TYPE},
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        // Auth routes
        .route("/api/v1/auth/signup", post(routes::auth::signup))
        .route("/api/v1/auth/token", post(routes::auth::token))
        // User routes; the static `me` segment wins over `:username`
        .route("/api/v1/users", get(routes::users::list_users))
        .route("/api/v1/users", post(routes::users::create_user))
        .route("/api/v1/users/me", get(routes::users::get_me))
        .route("/api/v1/users/me", patch(routes::users::update_me))
        .route("/api/v1/users/:username", get(routes::users::get_user))
        .route("/api/v1/users/:username", patch(routes::users::update_user))
        .route(
            "/api/v1/users/:username",
            delete(routes::users::delete_user),
        )
        // Category routes
        .route(
            "/api/v1/categories",
            get(routes::categories::list_categories),
        )
        .route(
            "/api/v1/categories",
            post(routes::categories::create_category),
        )
        .route(
            "/api/v1/categories/:slug",
            delete(routes::categories::delete_category),
        )
        // Genre routes
        .route("/api/v1/genres", get(routes::genres::list_genres))
        .route("/api/v1/genres", post(routes::genres::create_genre))
        .route(
            "/api/v1/genres/:slug",
            delete(routes::genres::delete_genre),
        )
        // Title routes
        .route("/api/v1/titles", get(routes::titles::list_titles))
        .route("/api/v1/titles", post(routes::titles::create_title))
        .route("/api/v1/titles/:title_id", get(routes::titles::get_title))
        .route(
            "/api/v1/titles/:title_id",
            patch(routes::titles::update_title),
        )
        .route(
            "/api/v1/titles/:title_id",
            delete(routes::titles::delete_title),
        )
        // Review routes
        .route(
            "/api/v1/titles/:title_id/reviews",
            get(routes::reviews::list_reviews),
        )
        .route(
            "/api/v1/titles/:title_id/reviews",
            post(routes::reviews::create_review),
        )
        .route(
            "/api/v1/titles/:title_id/reviews/:review_id",
            get(routes::reviews::get_review),
        )
        .route(
            "/api/v1/titles/:title_id/reviews/:review_id",
            patch(routes::reviews::update_review),
        )
        .route(
            "/api/v1/titles/:title_id/reviews/:review_id",
            delete(routes::reviews::delete_review),
        )
        // Comment routes
        .route(
            "/api/v1/titles/:title_id/reviews/:review_id/comments",
            get(routes::comments::list_comments),
        )
        .route(
            "/api/v1/titles/:title_id/reviews/:review_id/comments",
            post(routes::comments::create_comment),
        )
        .route(
            "/api/v1/titles/:title_id/reviews/:review_id/comments/:comment_id",
            get(routes::comments::get_comment),
        )
        .route(
            "/api/v1/titles/:title_id/reviews/:review_id/comments/:comment_id",
            patch(routes::comments::update_comment),
        )
        .route(
            "/api/v1/titles/:title_id/reviews/:review_id/comments/:comment_id",
            delete(routes::comments::delete_comment),
        )
        .with_state(state)
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::PATCH,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}
