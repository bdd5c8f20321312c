//! HTTP API tests
//!
//! Drives the full router with `tower::ServiceExt::oneshot` against the
//! in-memory store.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use rimpe_invoice_backend::store::MemoryStore;
use rimpe_invoice_backend::{create_app, AppState, Config};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::util::ServiceExt;

fn app_with(config: Config) -> Router {
    create_app(AppState::new(Arc::new(MemoryStore::new()), config))
}

fn app() -> Router {
    app_with(Config::for_tests())
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header("Authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => request
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn sign_in(app: &Router) -> String {
    let (status, body) = send(app, "POST", "/api/v1/auth/anonymous", None, None).await;
    assert_eq!(status, StatusCode::CREATED);
    body["access_token"].as_str().unwrap().to_string()
}

fn dec(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().unwrap()).unwrap()
}

// ============================================================================
// Public endpoints and auth
// ============================================================================

#[tokio::test]
async fn test_health_is_public() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["store"], "connected");
    assert_eq!(body["store_backend"], "memory");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/v1/clients", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let (status, body) = send(&app, "GET", "/api/v1/clients", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_users_are_isolated() {
    let app = app();
    let alice = sign_in(&app).await;
    let bob = sign_in(&app).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/clients",
        Some(&alice),
        Some(json!({"name": "Acme", "taxId": "1790012345001", "address": "Quito"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, mine) = send(&app, "GET", "/api/v1/clients", Some(&alice), None).await;
    let (_, theirs) = send(&app, "GET", "/api/v1/clients", Some(&bob), None).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
    assert!(theirs.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_seeded_session_shows_fixtures() {
    let mut config = Config::for_tests();
    config.store.seed_fixtures = true;
    let app = app_with(config);
    let token = sign_in(&app).await;

    let (status, body) = send(&app, "GET", "/api/v1/dashboard", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pendingInvoices"], 2);
    assert_eq!(body["lowStockProducts"], 2);
    assert_eq!(body["registeredClients"], 3);
}

// ============================================================================
// End-to-end invoicing flow
// ============================================================================

#[tokio::test]
async fn test_invoicing_flow() {
    let app = app();
    let token = sign_in(&app).await;
    let token = Some(token.as_str());

    // Catalogue
    let (status, product) = send(
        &app,
        "POST",
        "/api/v1/products",
        token,
        Some(json!({"name": "Pintura blanca", "unitPrice": "10.00", "stockQuantity": 8})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let product_id = product["id"].as_str().unwrap().to_string();

    // Lines merge; over-stock is a warning
    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/invoicing/draft/items",
        token,
        Some(json!({"productId": product_id, "quantity": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, draft) = send(
        &app,
        "POST",
        "/api/v1/invoicing/draft/items",
        token,
        Some(json!({"productId": product_id, "quantity": 2})),
    )
    .await;
    assert_eq!(draft["items"][0]["quantity"], 5);
    assert_eq!(dec(&draft["totals"]["total"]), Decimal::from_str("56.00").unwrap());

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/invoicing/draft/items",
        token,
        Some(json!({"productId": product_id, "quantity": 10})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "INSUFFICIENT_STOCK");
    assert_eq!(body["error"]["severity"], "warning");

    // No client yet
    let (status, body) = send(&app, "POST", "/api/v1/invoicing/generate", token, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "client");

    // Unknown client -> registration pre-filled, then selected on save
    let (_, selection) = send(
        &app,
        "PUT",
        "/api/v1/invoicing/draft/client",
        token,
        Some(json!({"input": "Acme"})),
    )
    .await;
    assert_eq!(selection["resolution"]["kind"], "registerNew");
    assert_eq!(selection["resolution"]["form"]["name"], "Acme");

    let (_, options) = send(
        &app,
        "GET",
        "/api/v1/invoicing/draft/client/suggestions?q=Acme",
        token,
        None,
    )
    .await;
    assert_eq!(options.as_array().unwrap().len(), 1);
    assert_eq!(options[0]["kind"], "registerNew");

    let (status, selection) = send(
        &app,
        "POST",
        "/api/v1/invoicing/draft/client/new",
        token,
        Some(json!({"name": "Acme", "taxId": "1790012345001", "address": "Quito"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(selection["draft"]["client"]["name"], "Acme");

    // Generate
    let (status, invoice) = send(&app, "POST", "/api/v1/invoicing/generate", token, None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(invoice["status"], "pending");
    assert_eq!(invoice["customerName"], "Acme");
    assert!(invoice["invoiceNumber"].as_str().unwrap().starts_with("INV-"));
    let invoice_id = invoice["id"].as_str().unwrap().to_string();

    let (_, products) = send(&app, "GET", "/api/v1/products", token, None).await;
    assert_eq!(products[0]["stockQuantity"], 3);
    let (_, low) = send(&app, "GET", "/api/v1/products/low-stock", token, None).await;
    assert_eq!(low.as_array().unwrap().len(), 1);

    let (_, draft) = send(&app, "GET", "/api/v1/invoicing/draft", token, None).await;
    assert!(draft["items"].as_array().unwrap().is_empty());
    assert!(draft["client"].is_null());

    // Receivables
    let (_, pending) = send(&app, "GET", "/api/v1/receivables", token, None).await;
    assert_eq!(pending.as_array().unwrap().len(), 1);

    let paid_uri = format!("/api/v1/receivables/{}/paid", invoice_id);
    let (status, update) = send(&app, "POST", &paid_uri, token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(update["change"], "marked");
    let (_, update) = send(&app, "POST", &paid_uri, token, None).await;
    assert_eq!(update["change"], "already_paid");

    let (_, pending) = send(&app, "GET", "/api/v1/receivables", token, None).await;
    assert!(pending.as_array().unwrap().is_empty());
    let (_, invoices) = send(&app, "GET", "/api/v1/invoices", token, None).await;
    assert_eq!(invoices.as_array().unwrap().len(), 1);

    // Sign out
    let (status, _) = send(&app, "DELETE", "/api/v1/auth/session", token, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

// ============================================================================
// Registry endpoints
// ============================================================================

#[tokio::test]
async fn test_client_validation_and_updates() {
    let app = app();
    let token = sign_in(&app).await;
    let token = Some(token.as_str());

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/clients",
        token,
        Some(json!({"name": "Acme", "taxId": "", "address": "Quito"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "taxId");

    let (_, client) = send(
        &app,
        "POST",
        "/api/v1/clients",
        token,
        Some(json!({"name": "Acme", "ruc": "1790012345001", "address": "Quito"})),
    )
    .await;
    let uri = format!("/api/v1/clients/{}", client["id"].as_str().unwrap());

    let (status, updated) = send(
        &app,
        "PUT",
        &uri,
        token,
        Some(json!({"name": "Acme S.A.", "taxId": "1790012345001", "address": "Guayaquil"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["address"], "Guayaquil");
    assert_eq!(updated["createdAt"], client["createdAt"]);

    let (status, _) = send(&app, "DELETE", &uri, token, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = send(&app, "DELETE", &uri, token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_oversized_amounts_and_bad_tax_ids_are_rejected() {
    let app = app();
    let token = sign_in(&app).await;
    let token = Some(token.as_str());

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/products",
        token,
        Some(json!({
            "name": "Oro",
            "unitPrice": "40000000000000000000000000000",
            "stockQuantity": 5
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "unitPrice");

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/clients",
        token,
        Some(json!({"name": "Acme", "taxId": "12345", "address": "Quito"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "taxId");

    let (status, draft) = send(&app, "GET", "/api/v1/invoicing/draft", token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(draft["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_payables_endpoints() {
    let app = app();
    let token = sign_in(&app).await;
    let token = Some(token.as_str());

    let (status, entry) = send(
        &app,
        "POST",
        "/api/v1/payables",
        token,
        Some(json!({
            "supplier": "Holcim",
            "description": "Cemento x 50",
            "amount": "275.00",
            "dueDate": "2024-06-30"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["status"], "pending");

    let uri = format!("/api/v1/payables/{}/paid", entry["id"].as_str().unwrap());
    let (_, update) = send(&app, "POST", &uri, token, None).await;
    assert_eq!(update["record"]["status"], "paid");

    let (_, dashboard) = send(&app, "GET", "/api/v1/dashboard", token, None).await;
    assert_eq!(dec(&dashboard["totalPayables"]), Decimal::from_str("275.00").unwrap());
}

#[tokio::test]
async fn test_view_router() {
    let app = app();
    let token = sign_in(&app).await;
    let token = Some(token.as_str());

    let (status, rendered) = send(&app, "GET", "/api/v1/views/inventory", token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rendered["view"], "inventory");
    assert_eq!(rendered["label"], "Inventario");
    assert_eq!(rendered["screen"]["screen"], "inventory");

    let (_, rendered) = send(&app, "GET", "/api/v1/views/reports", token, None).await;
    assert_eq!(rendered["view"], "dashboard");
    assert_eq!(rendered["screen"]["screen"], "dashboard");
}

#[tokio::test]
async fn test_notifications_start_empty() {
    let app = app();
    let token = sign_in(&app).await;
    let (status, notices) = send(&app, "GET", "/api/v1/notifications", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(notices.as_array().unwrap().is_empty());
}
