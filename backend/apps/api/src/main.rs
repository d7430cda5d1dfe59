//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use account::{AccountConfig, FsPhotoStore, PgAccountRepository, account_router};
use anyhow::Context;
use axum::{
    Router, http,
    http::{Method, header},
};
use base64::Engine;
use base64::engine::general_purpose;
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,account=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url =
        env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let account_config = load_account_config()?;

    let account_repo =
        PgAccountRepository::new(pool.clone()).verifying_email(account_config.must_verify_email);

    // Startup cleanup: remove expired sessions
    // Errors here should not prevent server startup
    if let Err(e) = account_repo.cleanup_expired().await {
        tracing::warn!(error = %e, "Auth session cleanup failed, continuing anyway");
    }

    let photo_store = FsPhotoStore::new(account_config.photo_dir.clone());

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([header::CONTENT_TYPE, header::ACCEPT]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest(
            "/api",
            account_router(account_repo, photo_store, account_config),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = env::var("LISTEN_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:31113".to_string())
        .parse()
        .context("LISTEN_ADDR must be a socket address")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Account settings from the environment
///
/// Debug builds fall back to a random secret and insecure cookies.
fn load_account_config() -> anyhow::Result<AccountConfig> {
    let mut config = if cfg!(debug_assertions) {
        match env::var("SESSION_SECRET") {
            Ok(secret_b64) => AccountConfig {
                session_secret: decode_secret(&secret_b64)?,
                cookie_secure: false,
                ..AccountConfig::default()
            },
            Err(_) => AccountConfig::development(),
        }
    } else {
        let secret_b64 =
            env::var("SESSION_SECRET").context("SESSION_SECRET must be set in production")?;
        AccountConfig {
            session_secret: decode_secret(&secret_b64)?,
            ..AccountConfig::default()
        }
    };

    if let Ok(app_url) = env::var("APP_URL") {
        config.app_url = app_url;
    }
    if let Ok(dir) = env::var("PROFILE_PHOTO_DIR") {
        config.photo_dir = PathBuf::from(dir);
    }
    if let Ok(flag) = env::var("MUST_VERIFY_EMAIL") {
        config.must_verify_email = matches!(flag.trim(), "1" | "true" | "yes");
    }

    Ok(config)
}

fn decode_secret(secret_b64: &str) -> anyhow::Result<[u8; 32]> {
    let secret_bytes = Engine::decode(&general_purpose::STANDARD, secret_b64.trim())?;
    secret_bytes.try_into().map_err(|bytes: Vec<u8>| {
        anyhow::anyhow!("SESSION_SECRET must decode to 32 bytes, got {}", bytes.len())
    })
}
