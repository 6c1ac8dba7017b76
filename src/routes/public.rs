use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a credential. Post retrieval here only ever
/// serves approved content; the pending queue and denied posts are not
/// observable through these routes.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Monitoring and load-balancer probe.
        .route("/health", get(|| async { "ok" }))
        // --- Login flow ---
        // GET /api/auth/login?returnTo=...
        // Redirects the browser to the identity provider.
        .route("/api/auth/login", get(handlers::login))
        // GET /api/auth/login/callback?code=...&state=...
        // Provider redirect target; issues the bearer token.
        .route("/api/auth/login/callback", get(handlers::login_callback))
        // POST /api/auth/logout
        // Stateless acknowledgment; invalidation is client-side.
        .route("/api/auth/logout", post(handlers::logout))
        // --- Content ---
        // GET /api/posts
        // Approved posts, newest first.
        .route("/api/posts", get(handlers::get_posts))
        // GET /api/posts/{id}
        // A single approved post.
        .route("/api/posts/{id}", get(handlers::get_post_details))
        // GET /api/tags
        .route("/api/tags", get(handlers::get_tags))
        // GET /api/announcements
        // Active announcements within their display window.
        .route("/api/announcements", get(handlers::get_announcements))
        // POST /api/contact
        // Contact-form relay to the organization inbox.
        .route("/api/contact", post(handlers::submit_contact_form))
}
