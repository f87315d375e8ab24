mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use chroma_api::{AppState, AppStateInner};
use chroma_core::normalize::TimeFormat;
use chroma_core::session::{AdminCredentials, SessionStore};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "chroma_server=debug,chroma_api=debug,chroma_core=debug,chroma_db=debug,tower_http=debug".into()
            }),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("FATAL: {:#}", e);
            eprintln!("       Set it in your .env file and restart.");
            std::process::exit(1);
        }
    };

    // Init database
    let db = Arc::new(chroma_db::Database::open(&config.db_path)?);

    // Shared state
    let credentials = AdminCredentials::from_password(&config.admin_email, &config.admin_password)?;
    let ttl = chrono::Duration::try_hours(config.session_ttl_hours)
        .context("CHROMA_SESSION_TTL_HOURS is out of range")?;
    let sessions = SessionStore::new(credentials, ttl);
    let app_state: AppState = Arc::new(AppStateInner::new(
        db,
        sessions,
        TimeFormat::new(config.display_offset),
        config.activity_limit,
        config.history_page_size,
    ));

    let app = chroma_api::router(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Chroma server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
