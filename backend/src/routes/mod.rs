//! Route definitions for the RIMPE Invoice API

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Anonymous sign-in (public)
        .route("/auth/anonymous", post(handlers::sign_in_anonymous))
        // Everything else requires a bearer token
        .merge(protected_routes(state))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/session", delete(handlers::sign_out))
        .route("/views/:view", get(handlers::render_view))
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/notifications", get(handlers::drain_notifications))
        .nest("/clients", client_routes())
        .nest("/products", product_routes())
        .nest("/invoicing", invoicing_routes())
        .route("/invoices", get(handlers::list_invoices))
        .nest("/receivables", receivable_routes())
        .nest("/payables", payable_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Client registry routes
fn client_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_clients).post(handlers::create_client))
        .route(
            "/:client_id",
            put(handlers::update_client).delete(handlers::delete_client),
        )
}

/// Inventory routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route("/low-stock", get(handlers::list_low_stock))
        .route("/:product_id", delete(handlers::delete_product))
        .route("/:product_id/stock", put(handlers::set_stock))
}

/// Invoicing screen routes
fn invoicing_routes() -> Router<AppState> {
    Router::new()
        .route("/draft", get(handlers::get_draft))
        .route("/draft/items", post(handlers::add_item))
        .route("/draft/items/:product_id", delete(handlers::remove_item))
        .route("/draft/client", put(handlers::resolve_client))
        .route(
            "/draft/client/suggestions",
            get(handlers::client_suggestions),
        )
        .route("/draft/client/new", post(handlers::register_client))
        .route("/generate", post(handlers::generate_invoice))
}

/// Accounts receivable routes
fn receivable_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_pending))
        .route("/:invoice_id", delete(handlers::delete_invoice))
        .route("/:invoice_id/paid", post(handlers::mark_invoice_paid))
}

/// Accounts payable routes
fn payable_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_payables).post(handlers::create_payable))
        .route("/:payable_id", delete(handlers::delete_payable))
        .route("/:payable_id/paid", post(handlers::mark_payable_paid))
}
