//! Subraya Server
//!
//! A self-hosted storage server for a PDF annotation app: persists PDF
//! payloads and page-region highlights in SQLite and serves them over a
//! small JSON API.

use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use subraya_server::config::{Config, StorageBackend};
use subraya_server::db::{Store, StoreOptions};
use subraya_server::routes;
use subraya_server::state::AppState;
use subraya_server::storage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "subraya_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing::info!("Starting Subraya Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Storage backend: {:?}", config.backend);

    let backend = storage::from_config(&config)?;

    // Open the store once at boot so a broken database file or a failed
    // migration surfaces here instead of on the first request.
    if config.backend == StorageBackend::Sqlite {
        let store = Store::open(StoreOptions::new(config.database.url.clone())).await?;
        store.ready().await?;
        store.close().await;
        tracing::info!("Database initialized at {}", config.database.url);
    }

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = routes::api_router(AppState::new(config.clone(), backend))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server with graceful shutdown
    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Subraya Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
