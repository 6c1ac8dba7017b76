use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};

/// Admin Router Module
///
/// Moderation and management endpoints, nested under `/api/admin`. Every
/// handler requires the administrator role via the `AdminUser` extractor;
/// authentication failures answer 401 and role mismatches 403 before any
/// handler body runs.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // --- Moderation queue ---
        // GET /api/admin/posts
        // Every post regardless of status.
        .route("/posts", get(handlers::admin_get_posts))
        // GET /api/admin/posts/pending
        // The review queue.
        .route("/posts/pending", get(handlers::admin_get_pending_posts))
        // POST /api/admin/posts/{id}/approve
        // pending -> approved, with owner notification.
        .route("/posts/{id}/approve", post(handlers::approve_post))
        // POST /api/admin/posts/{id}/deny
        // pending -> denied, optional {feedback} forwarded to the owner.
        .route("/posts/{id}/deny", post(handlers::deny_post))
        // PUT/DELETE /api/admin/posts/{id}
        // Partial edit (status untouched) and force delete.
        .route(
            "/posts/{id}",
            put(handlers::admin_update_post).delete(handlers::admin_delete_post),
        )
        // --- Users ---
        .route("/users", get(handlers::admin_get_users))
        .route("/users/{id}", patch(handlers::admin_update_user_role))
        // --- Tags ---
        .route("/tags", post(handlers::create_tag))
        .route(
            "/tags/{id}",
            put(handlers::update_tag).delete(handlers::delete_tag),
        )
        // --- Announcements ---
        .route("/announcements", post(handlers::create_announcement))
        .route(
            "/announcements/{id}",
            put(handlers::update_announcement).delete(handlers::delete_announcement),
        )
}
