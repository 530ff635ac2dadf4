use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a session: health, registration and read-only
/// access to posts and comments.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /register
        // Sign-up through the identity provider; always creates a USER account.
        .route("/register", post(handlers::register_user))
        // GET /posts?search=&tags=a,b&isFeatured=&status=&authorId=&page=&limit=&sortBy=&sortOrder=
        .route("/posts", get(handlers::get_posts))
        // GET /posts/{id}
        // Detail view with visible comments; increments the view counter.
        .route("/posts/{id}", get(handlers::get_post))
        .route("/comments/{id}", get(handlers::get_comment))
        .route(
            "/comments/author/{author_id}",
            get(handlers::get_comments_by_author),
        )
}
