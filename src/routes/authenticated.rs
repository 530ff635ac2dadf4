use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch, post},
};

/// Authenticated Router Module
///
/// Routes for any signed-in, active user. The router is wrapped in the
/// authentication layer by `create_router`; ownership checks happen in the
/// services.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET/PATCH /me
        .route("/me", get(handlers::get_me).patch(handlers::update_me))
        // POST /posts
        // The author is the caller, whatever the body says.
        .route("/posts", post(handlers::create_post))
        // GET /posts/my-posts
        // Static segment; takes precedence over /posts/{id}.
        .route("/posts/my-posts", get(handlers::get_my_posts))
        // PATCH/DELETE /posts/{id}
        // Owner or admin.
        .route(
            "/posts/{id}",
            patch(handlers::update_post).delete(handlers::delete_post),
        )
        // POST /comments
        .route("/comments", post(handlers::create_comment))
        // PATCH/DELETE /comments/{id}
        // Owner or admin.
        .route(
            "/comments/{id}",
            patch(handlers::update_comment).delete(handlers::delete_comment),
        )
}
