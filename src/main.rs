use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use story_archive::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    directory::{AdminAllowlist, UserDirectory},
    notifier::{NotifierState, SmtpNotifier},
    oauth::GoogleOAuthClient,
    repository::{self, PgRepository, RepositoryState},
    storage::{S3StorageClient, StorageState},
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Asynchronous entry point: configuration, logging, database, storage,
/// notifier, HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing production secrets).
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging filter: RUST_LOG wins, sensible defaults otherwise.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "story_archive=debug,tower_http=info,axum=trace".into());

    // 3. Log format by environment: pretty locally, JSON in production for
    // log aggregation.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Database pool and schema.
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    repository::init_schema(&pool)
        .await
        .expect("FATAL: Failed to initialize database schema.");

    let repo = Arc::new(PgRepository::new(pool)) as RepositoryState;

    // 5. Object storage for attachments.
    let s3_client = S3StorageClient::new(
        &config.s3_endpoint,
        &config.s3_region,
        &config.s3_key,
        &config.s3_secret,
        &config.s3_bucket,
    )
    .await;

    // LOCAL-ONLY: provision the MinIO bucket for the Dockerized setup.
    if config.env == Env::Local {
        use story_archive::storage::StorageService;
        s3_client.ensure_bucket_exists().await;
    }

    let storage = Arc::new(s3_client) as StorageState;

    // 6. Outbound email and identity provider client.
    let notifier = Arc::new(SmtpNotifier::new(&config)) as NotifierState;
    let oauth = GoogleOAuthClient::from_config(&config);
    let directory = UserDirectory::new(repo.clone(), AdminAllowlist::from_config(&config));

    // 7. Unified state and server startup.
    let app_state = AppState {
        repo,
        storage,
        notifier,
        oauth,
        directory,
        config,
    };

    let app = create_router(app_state);

    let listener = TcpListener::bind("0.0.0.0:8000").await.unwrap();

    tracing::info!("HTTP server bound successfully.");
    tracing::info!("Listening on 0.0.0.0:8000");
    tracing::info!("API Documentation (Swagger UI) available at: http://localhost:8000/swagger-ui");

    axum::serve(listener, app).await.unwrap();
}
