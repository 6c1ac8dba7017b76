use axum::{
    Router,
    extract::{FromRef, Request},
    http::{HeaderName, HeaderValue},
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod directory;
pub mod error;
pub mod handlers;
pub mod models;
pub mod notifier;
pub mod oauth;
pub mod repository;
pub mod storage;

// Module for routing segregation (Public, Authenticated, Admin).
pub mod routes;
use auth::AuthUser;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

// Core state types for the application entry point and tests.
pub use config::AppConfig;
pub use directory::{AdminAllowlist, UserDirectory};
pub use notifier::{MockNotifier, NotifierState, SmtpNotifier};
pub use oauth::GoogleOAuthClient;
pub use repository::{PgRepository, RepositoryState};
pub use storage::{MockStorageService, S3StorageClient, StorageState};

/// ApiDoc
///
/// Aggregates every documented path and schema; the resulting JSON is served
/// at `/api-docs/openapi.json` with the Swagger UI at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login, handlers::login_callback, handlers::logout, handlers::get_auth_user,
        handlers::get_posts, handlers::get_post_details, handlers::create_post,
        handlers::get_my_posts, handlers::delete_my_post,
        handlers::admin_get_posts, handlers::admin_get_pending_posts,
        handlers::approve_post, handlers::deny_post,
        handlers::admin_update_post, handlers::admin_delete_post,
        handlers::admin_get_users, handlers::admin_update_user_role,
        handlers::get_tags, handlers::create_tag, handlers::update_tag, handlers::delete_tag,
        handlers::get_announcements, handlers::create_announcement,
        handlers::update_announcement, handlers::delete_announcement,
        handlers::submit_contact_form
    ),
    components(
        schemas(
            models::User, models::Post, models::Media, models::Tag, models::Announcement,
            models::PostResponse, models::UserProfile, models::Role, models::PostStatus,
            models::MediaKind, models::DecisionRequest, models::DecisionResponse,
            models::UpdatePostRequest, models::CreateTagRequest, models::UpdateTagRequest,
            models::CreateAnnouncementRequest, models::UpdateAnnouncementRequest,
            models::ContactRequest, models::UpdateUserRoleRequest,
        )
    ),
    tags(
        (name = "story-archive", description = "Community story submission and moderation API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe container holding all application services and
/// configuration, shared across every request.
#[derive(Clone)]
pub struct AppState {
    /// Persistence layer behind the Repository trait.
    pub repo: RepositoryState,
    /// Object storage for post attachments.
    pub storage: StorageState,
    /// Outbound email (decisions, contact form).
    pub notifier: NotifierState,
    /// Identity-provider client for the login flow.
    pub oauth: GoogleOAuthClient,
    /// Subject-to-user resolution with allowlist-derived roles.
    pub directory: UserDirectory,
    /// Loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// Let extractors pull individual components out of the shared AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for NotifierState {
    fn from_ref(app_state: &AppState) -> NotifierState {
        app_state.notifier.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Enforces authentication for the authenticated router. Extraction of
/// `AuthUser` rejects the request with the appropriate 401 variant before
/// the handler runs; on success the request proceeds unchanged.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routing structure, applies the CORS allowlist and the
/// observability layers, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // CORS: explicit origin allowlist from configuration. Preflight OPTIONS
    // requests are answered here and never reach authentication.
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring unparsable CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        // Documentation: auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public routes: no middleware.
        .merge(public::public_routes())
        // Authenticated routes: protected by the auth middleware layer; the
        // handlers additionally resolve AuthUser themselves.
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        // Admin routes: nested under /api/admin. The role check lives in the
        // AdminUser extractor each handler requires.
        .nest("/api/admin", admin::admin_routes())
        .with_state(state);

    // Observability and correlation layers, outermost.
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span factory for `TraceLayer`: includes the generated request id so every
/// log line of a request is correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
