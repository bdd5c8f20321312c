//! RIMPE Invoice - Backend
//!
//! Invoicing, inventory and payables for small Ecuadorian businesses
//! under the RIMPE tax regime. Each signed-in user gets a session kept
//! in sync with their document collections.

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod session;
pub mod store;

pub use config::Config;

use session::{Session, SessionRegistry};
use store::DocumentStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub sessions: SessionRegistry,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>, config: Config) -> Self {
        Self {
            store,
            sessions: SessionRegistry::new(Duration::from_secs(config.auth.session_idle_timeout)),
            config: Arc::new(config),
        }
    }

    /// The user's live session, opened on first use
    pub async fn session(&self, user_id: uuid::Uuid) -> Arc<Session> {
        self.sessions
            .get_or_open(self.store.clone(), user_id, self.config.store.seed_fixtures)
            .await
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "RIMPE Invoice API v1"
}
