//! RIMPE Invoice - Backend Server

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rimpe_invoice_backend::config::{Config, StoreBackend};
use rimpe_invoice_backend::store::{DocumentStore, MemoryStore, PgDocumentStore};
use rimpe_invoice_backend::{create_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "rimpe_server=debug,rimpe_invoice_backend=debug,tower_http=debug,sqlx=warn".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load().context("failed to load configuration")?;

    tracing::info!("Starting RIMPE Invoice Server");
    tracing::info!("Environment: {}", config.environment);

    let store: Arc<dyn DocumentStore> = match config.store.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory document store");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Postgres => {
            tracing::info!("Connecting to database...");
            let store = PgDocumentStore::connect(&config.store).await?;
            tracing::info!("Database connection established");

            // Run migrations in development
            if config.environment == "development" {
                tracing::info!("Running database migrations...");
                store.migrate().await?;
                tracing::info!("Migrations completed");
            }
            Arc::new(store)
        }
    };

    let host: std::net::IpAddr = config
        .server
        .host
        .parse()
        .with_context(|| format!("invalid server.host {:?}", config.server.host))?;
    let addr = SocketAddr::new(host, config.server.port);

    let state = AppState::new(store, config);

    // Close sessions whose tokens were abandoned
    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            sessions.prune_idle().await;
        }
    });

    let app = create_app(state);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
