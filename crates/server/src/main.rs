//! healthsync-server: HealthSync API binary entrypoint.

use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use healthsync_server::config::Config;
use healthsync_server::state::AppState;

#[tokio::main]
async fn main() {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = Config::from_env();

    // One pool for the whole process, closed after shutdown
    let pool = healthsync_server::db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    if let Err(e) = healthsync_server::db::ensure_schema(&pool).await {
        tracing::warn!(error = %e, "Could not prepare patients table; continuing");
    }

    if config.uses_default_secret() {
        tracing::warn!("JWT_SECRET not set, using the development default");
    }
    if config.groq_api_key.is_some() {
        tracing::info!(model = %config.groq_model, "Groq API key configured, AI features enabled");
    } else {
        tracing::warn!("GROQ_API_KEY not set, AI features disabled");
    }
    if config.serpapi_key.is_none() {
        tracing::warn!("SERPAPI_KEY not set, literature search disabled");
    }
    tracing::info!(
        rps = config.rate_limit_rps,
        ai_timeout_secs = config.ai_timeout.as_secs(),
        "Request limits"
    );

    let state = AppState::from_config(pool.clone(), &config).expect("Failed to build HTTP clients");
    let app = healthsync_server::build_app(state, &config);

    let addr: SocketAddr = config.bind_address.parse().expect("Invalid bind address");
    tracing::info!("Starting HealthSync server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    pool.close();
    tracing::info!("Server shutdown complete");
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
