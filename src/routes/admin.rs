use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch},
};

/// Admin Router Module
///
/// Routes restricted to the ADMIN role. `create_router` wraps them in the
/// authentication and admin layers; the services re-check the role as well.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /posts/stats
        // Post, comment and user counters for the dashboard.
        .route("/posts/stats", get(handlers::get_stats))
        // PATCH /comments/{id}/moderate
        // Hides a comment. There is no way back to VISIBLE.
        .route(
            "/comments/{id}/moderate",
            patch(handlers::moderate_comment),
        )
        // GET /admin/users
        .route("/admin/users", get(handlers::get_users))
        // PATCH /admin/users/{id}
        // Role and status changes.
        .route("/admin/users/{id}", patch(handlers::update_user))
}
