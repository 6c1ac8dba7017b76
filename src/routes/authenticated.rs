use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, post},
};

/// Authenticated Router Module
///
/// Routes for any signed-in user. Every handler here receives a validated
/// `AuthUser`; the router is additionally wrapped in the authentication
/// middleware layer when assembled.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /api/auth/user
        // The session profile for the presented credential.
        .route("/api/auth/user", get(handlers::get_auth_user))
        // POST /api/posts
        // Multipart submission: title, content, tag, up to 5 media_N files
        // with optional media_N_caption fields. Lands in pending.
        .route("/api/posts", post(handlers::create_post))
        // GET /api/user/posts
        // The caller's own posts, any status.
        .route("/api/user/posts", get(handlers::get_my_posts))
        // DELETE /api/user/posts/{id}
        // Owner deletion with media cascade.
        .route("/api/user/posts/{id}", delete(handlers::delete_my_post))
}
