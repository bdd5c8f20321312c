//! Invoicing tests
//!
//! Tests for drafting and generating invoices against a live session:
//! - Line items merge and are checked against stock
//! - Generation decrements stock and adds exactly one pending invoice
//! - Failed generation leaves state and draft untouched
//! - Client resolution and immediate selection of new clients
//! - Pending -> paid transitions

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use rimpe_invoice_backend::error::AppError;
use rimpe_invoice_backend::services::inventory::SetStockInput;
use rimpe_invoice_backend::services::invoicing::AddItemInput;
use rimpe_invoice_backend::services::{
    ClientService, InventoryService, InvoicingService, PayablesService, ReceivablesService,
};
use rimpe_invoice_backend::session::Session;
use rimpe_invoice_backend::store::{CollectionPath, DocumentStore, MemoryStore};
use rust_decimal::Decimal;
use serde_json::json;
use shared::{
    ClientInput, ClientResolution, Collection, DataStatus, DraftError, PayableInput,
    PaymentStatus, Product, ProductInput, StatusChange, VAT_RATE,
};
use uuid::Uuid;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

struct Fixture {
    memory: Arc<MemoryStore>,
    store: Arc<dyn DocumentStore>,
    session: Arc<Session>,
}

impl Fixture {
    async fn new() -> Self {
        let memory = Arc::new(MemoryStore::new());
        let store: Arc<dyn DocumentStore> = memory.clone();
        let session = Session::open(store.clone(), Uuid::new_v4(), false).await;
        Self {
            memory,
            store,
            session,
        }
    }

    fn inventory(&self) -> InventoryService {
        InventoryService::new(self.store.clone(), self.session.clone())
    }

    fn invoicing(&self) -> InvoicingService {
        InvoicingService::new(self.store.clone(), self.session.clone())
    }

    fn receivables(&self) -> ReceivablesService {
        ReceivablesService::new(self.store.clone(), self.session.clone())
    }

    async fn product(&self, name: &str, price: &str, stock: i32) -> Product {
        self.inventory()
            .create(ProductInput {
                name: name.to_string(),
                unit_price: dec(price),
                stock_quantity: stock,
            })
            .await
            .unwrap()
    }

    async fn client(&self, name: &str) {
        ClientService::new(self.store.clone(), self.session.clone())
            .create(ClientInput {
                name: name.to_string(),
                tax_id: "1790012345001".to_string(),
                address: "Av. Amazonas, Quito".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    async fn add(&self, product: &Product, quantity: i32) -> Result<(), AppError> {
        self.invoicing()
            .add_item(AddItemInput {
                product_id: Some(product.id),
                quantity,
            })
            .await
            .map(|_| ())
    }

    fn stock_of(&self, id: Uuid) -> Option<i32> {
        self.session.read().product(id).map(|p| p.stock_quantity)
    }
}

// ============================================================================
// Line items
// ============================================================================

#[tokio::test]
async fn test_session_opens_ready() {
    let fixture = Fixture::new().await;
    assert_eq!(fixture.session.status(), DataStatus::Ready);
    assert!(fixture.session.read().is_empty());
}

#[tokio::test]
async fn test_line_items_merge_until_stock_runs_out() {
    let fixture = Fixture::new().await;
    let p1 = fixture.product("Pintura blanca", "10.00", 8).await;

    fixture.add(&p1, 3).await.unwrap();
    fixture.add(&p1, 2).await.unwrap();
    let rejected = fixture.add(&p1, 10).await;

    assert!(matches!(
        rejected,
        Err(AppError::Draft(DraftError::InsufficientStock { available: 8, .. }))
    ));
    let draft = fixture.invoicing().draft().await;
    assert_eq!(draft.items.len(), 1);
    assert_eq!(draft.items[0].quantity, 5);
    assert_eq!(draft.totals.total, dec("56.00"));
}

#[tokio::test]
async fn test_add_without_product_is_rejected() {
    let fixture = Fixture::new().await;
    let result = fixture
        .invoicing()
        .add_item(AddItemInput {
            product_id: None,
            quantity: 1,
        })
        .await;
    assert!(matches!(
        result,
        Err(AppError::Draft(DraftError::NoProductSelected))
    ));

    // An id that is not in the catalogue counts as no selection
    let unknown = fixture
        .invoicing()
        .add_item(AddItemInput {
            product_id: Some(Uuid::new_v4()),
            quantity: 1,
        })
        .await;
    assert!(matches!(
        unknown,
        Err(AppError::Draft(DraftError::NoProductSelected))
    ));
}

#[tokio::test]
async fn test_remove_item() {
    let fixture = Fixture::new().await;
    let p1 = fixture.product("Clavos", "0.10", 100).await;
    fixture.add(&p1, 10).await.unwrap();

    let draft = fixture.invoicing().remove_item(p1.id).await;
    assert!(draft.items.is_empty());
    assert_eq!(draft.totals.total, Decimal::ZERO);
}

// ============================================================================
// Generation
// ============================================================================

#[tokio::test]
async fn test_generation_decrements_stock_and_adds_one_pending_invoice() {
    let fixture = Fixture::new().await;
    let cement = fixture.product("Cemento 50kg", "8.50", 40).await;
    let paint = fixture.product("Pintura", "22.00", 6).await;
    fixture.client("Ferretería El Tornillo").await;

    fixture.add(&cement, 4).await.unwrap();
    fixture.add(&paint, 1).await.unwrap();
    fixture
        .invoicing()
        .resolve_client("ferretería el tornillo")
        .await;

    let invoice = fixture.invoicing().generate().await.unwrap();

    assert_eq!(invoice.status, PaymentStatus::Pending);
    assert!(invoice.invoice_number.starts_with("INV-"));
    assert_eq!(invoice.invoice_number.len(), 10);
    assert_eq!(invoice.customer_name, "Ferretería El Tornillo");
    assert_eq!(invoice.subtotal, dec("56.00"));
    assert_eq!(invoice.total, dec("56.00") * (Decimal::ONE + VAT_RATE));
    assert_ne!(invoice.id, Uuid::nil());

    assert_eq!(fixture.stock_of(cement.id), Some(36));
    assert_eq!(fixture.stock_of(paint.id), Some(5));

    let data = fixture.session.read().clone();
    assert_eq!(data.invoices.len(), 1);
    assert_eq!(data.pending_invoices().len(), 1);

    // Draft is cleared
    let draft = fixture.invoicing().draft().await;
    assert!(draft.items.is_empty());
    assert!(draft.client.is_none());

    // And the store agrees
    let stored = fixture
        .store
        .list(&CollectionPath::new(fixture.session.user_id(), Collection::Invoices))
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, invoice.id);
}

#[tokio::test]
async fn test_generation_requires_items_and_client() {
    let fixture = Fixture::new().await;
    let p1 = fixture.product("Harina", "1.20", 8).await;
    fixture.client("Panadería La Espiga").await;

    fixture.invoicing().resolve_client("Panadería La Espiga").await;
    let empty = fixture.invoicing().generate().await;
    assert!(matches!(empty, Err(AppError::Draft(DraftError::EmptyInvoice))));

    fixture.invoicing().resolve_client("").await;
    fixture.add(&p1, 2).await.unwrap();
    let no_client = fixture.invoicing().generate().await;
    assert!(matches!(
        no_client,
        Err(AppError::Draft(DraftError::NoClientSelected))
    ));

    assert!(fixture.session.read().invoices.is_empty());
    assert_eq!(fixture.stock_of(p1.id), Some(8));
    assert_eq!(fixture.invoicing().draft().await.items.len(), 1);
}

#[tokio::test]
async fn test_generation_rechecks_stock() {
    let fixture = Fixture::new().await;
    let p1 = fixture.product("Harina", "1.20", 8).await;
    fixture.client("Panadería La Espiga").await;
    fixture.add(&p1, 5).await.unwrap();
    fixture.invoicing().resolve_client("Panadería La Espiga").await;

    fixture
        .inventory()
        .set_stock(p1.id, SetStockInput { stock_quantity: 3 })
        .await
        .unwrap();

    let result = fixture.invoicing().generate().await;
    assert!(matches!(
        result,
        Err(AppError::Draft(DraftError::InsufficientStock { available: 3, .. }))
    ));
    assert!(fixture.session.read().invoices.is_empty());
    assert_eq!(fixture.stock_of(p1.id), Some(3));
    assert_eq!(fixture.invoicing().draft().await.items[0].quantity, 5);
}

#[tokio::test]
async fn test_store_failure_keeps_draft_and_state() {
    let fixture = Fixture::new().await;
    let p1 = fixture.product("Cemento", "8.50", 10).await;
    fixture.client("Acme").await;
    fixture.add(&p1, 2).await.unwrap();
    fixture.invoicing().resolve_client("Acme").await;

    fixture.memory.set_offline(true);
    let result = fixture.invoicing().generate().await;
    fixture.memory.set_offline(false);

    assert!(matches!(result, Err(AppError::Store(_))));
    assert!(fixture.session.read().invoices.is_empty());
    assert_eq!(fixture.stock_of(p1.id), Some(10));
    let draft = fixture.invoicing().draft().await;
    assert_eq!(draft.items.len(), 1);
    assert!(draft.client.is_some());

    // Retrying once the store is back succeeds
    assert!(fixture.invoicing().generate().await.is_ok());
    assert_eq!(fixture.stock_of(p1.id), Some(8));
}

#[tokio::test]
async fn test_deleted_product_is_invoiced_without_decrement() {
    let fixture = Fixture::new().await;
    let kept = fixture.product("Cemento", "8.50", 10).await;
    let gone = fixture.product("Descontinuado", "3.00", 5).await;
    fixture.client("Acme").await;
    fixture.add(&kept, 1).await.unwrap();
    fixture.add(&gone, 2).await.unwrap();
    fixture.invoicing().resolve_client("Acme").await;

    fixture.inventory().delete(gone.id).await.unwrap();
    let invoice = fixture.invoicing().generate().await.unwrap();

    assert_eq!(invoice.items.len(), 2);
    assert_eq!(invoice.subtotal, dec("14.50"));
    assert_eq!(fixture.stock_of(kept.id), Some(9));
    assert_eq!(fixture.stock_of(gone.id), None);
}

#[tokio::test]
async fn test_invoice_numbers_are_unique() {
    let fixture = Fixture::new().await;
    let p1 = fixture.product("Clavos", "0.10", 1000).await;
    fixture.client("Acme").await;

    let mut numbers = Vec::new();
    for _ in 0..5 {
        fixture.add(&p1, 1).await.unwrap();
        fixture.invoicing().resolve_client("Acme").await;
        numbers.push(fixture.invoicing().generate().await.unwrap().invoice_number);
    }
    numbers.sort();
    numbers.dedup();
    assert_eq!(numbers.len(), 5);
}

// ============================================================================
// Client resolution
// ============================================================================

#[tokio::test]
async fn test_unknown_client_offers_prefilled_registration() {
    let fixture = Fixture::new().await;
    fixture.client("Panadería La Espiga").await;

    let selection = fixture.invoicing().resolve_client("Acme").await;
    match selection.resolution {
        ClientResolution::RegisterNew { form } => assert_eq!(form.name, "Acme"),
        other => panic!("unexpected resolution: {:?}", other),
    }
    assert!(selection.draft.client.is_none());
}

#[tokio::test]
async fn test_registered_client_is_selected_immediately() {
    let fixture = Fixture::new().await;
    let selection = fixture
        .invoicing()
        .register_client(ClientInput {
            name: "Acme".to_string(),
            tax_id: "1790012345001".to_string(),
            address: "Quito".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    let client = selection.draft.client.expect("client selected");
    assert_eq!(client.name, "Acme");
    assert!(fixture.session.read().client(client.id).is_some());
}

#[tokio::test]
async fn test_invalid_registration_changes_nothing() {
    let fixture = Fixture::new().await;
    let result = fixture
        .invoicing()
        .register_client(ClientInput::prefilled("Acme"))
        .await;

    assert!(matches!(result, Err(AppError::Validation { .. })));
    assert!(fixture.session.read().clients.is_empty());
    assert!(fixture.invoicing().draft().await.client.is_none());
}

// ============================================================================
// Status transitions
// ============================================================================

#[tokio::test]
async fn test_mark_invoice_paid_is_idempotent() {
    let fixture = Fixture::new().await;
    let p1 = fixture.product("Clavos", "0.10", 100).await;
    fixture.client("Acme").await;
    fixture.add(&p1, 10).await.unwrap();
    fixture.invoicing().resolve_client("Acme").await;
    let invoice = fixture.invoicing().generate().await.unwrap();

    let first = fixture.receivables().mark_paid(invoice.id).await.unwrap();
    assert_eq!(first.change, StatusChange::Marked);
    assert_eq!(first.record.status, PaymentStatus::Paid);

    let second = fixture.receivables().mark_paid(invoice.id).await.unwrap();
    assert_eq!(second.change, StatusChange::AlreadyPaid);
    assert!(fixture.receivables().pending().is_empty());
    assert_eq!(fixture.receivables().invoices().len(), 1);
}

#[tokio::test]
async fn test_mark_unknown_invoice_is_not_found() {
    let fixture = Fixture::new().await;
    let result = fixture.receivables().mark_paid(Uuid::new_v4()).await;
    assert!(matches!(result, Err(AppError::NotFound { .. })));
}

#[tokio::test]
async fn test_payable_lifecycle() {
    let fixture = Fixture::new().await;
    let payables = PayablesService::new(fixture.store.clone(), fixture.session.clone());

    let entry = payables
        .create(PayableInput {
            supplier: "Holcim".to_string(),
            description: "Cemento x 50".to_string(),
            amount: dec("275.00"),
            due_date: chrono::NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        })
        .await
        .unwrap();
    assert_eq!(entry.status, PaymentStatus::Pending);

    assert_eq!(payables.mark_paid(entry.id).await.unwrap().change, StatusChange::Marked);
    assert_eq!(
        payables.mark_paid(entry.id).await.unwrap().change,
        StatusChange::AlreadyPaid
    );

    payables.delete(entry.id).await.unwrap();
    assert!(payables.list().is_empty());
}

#[tokio::test]
async fn test_non_positive_payable_is_rejected() {
    let fixture = Fixture::new().await;
    let payables = PayablesService::new(fixture.store.clone(), fixture.session.clone());
    let result = payables
        .create(PayableInput {
            supplier: "Holcim".to_string(),
            description: "Cemento".to_string(),
            amount: Decimal::ZERO,
            due_date: chrono::NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        })
        .await;
    match result {
        Err(AppError::Validation { field, .. }) => assert_eq!(field, "amount"),
        other => panic!("unexpected result: {:?}", other.map(|e| e.id)),
    }
}

// ============================================================================
// Snapshots
// ============================================================================

#[tokio::test]
async fn test_remote_write_reaches_session() {
    let fixture = Fixture::new().await;
    let p1 = fixture.product("Clavos", "0.10", 100).await;

    // Another device writes straight to the store
    fixture
        .store
        .update(
            &fixture.session.path(Collection::Products),
            p1.id,
            json!({ "stockQuantity": 7 }),
        )
        .await
        .unwrap();

    let mut seen = None;
    for _ in 0..50 {
        seen = fixture.stock_of(p1.id);
        if seen == Some(7) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(seen, Some(7));
}

/// Poll until the session satisfies `check` or a second passes
async fn eventually(session: &Session, check: impl Fn(&shared::AppData) -> bool) -> bool {
    for _ in 0..100 {
        if check(&session.read()) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

#[tokio::test]
async fn test_documents_with_earlier_key_names_survive_updates() {
    let fixture = Fixture::new().await;
    let products = fixture.session.path(Collection::Products);
    let clients = fixture.session.path(Collection::Clients);

    let product = fixture
        .store
        .add(
            &products,
            json!({
                "name": "Arroz 1kg",
                "price": "1.25",
                "stock": 30,
                "createdAt": "2024-03-01T12:00:00Z"
            }),
        )
        .await
        .unwrap();
    let client = fixture
        .store
        .add(
            &clients,
            json!({
                "name": "Ferretería Andina",
                "ruc": "1791234567001",
                "address": "Cuenca",
                "createdAt": "2024-03-01T12:00:00Z"
            }),
        )
        .await
        .unwrap();
    assert!(eventually(&fixture.session, |d| d.product(product.id).is_some() && d.client(client.id).is_some()).await);

    fixture
        .inventory()
        .set_stock(product.id, SetStockInput { stock_quantity: 12 })
        .await
        .unwrap();
    ClientService::new(fixture.store.clone(), fixture.session.clone())
        .update(
            client.id,
            ClientInput {
                name: "Ferretería Andina".to_string(),
                tax_id: "0190012345001".to_string(),
                address: "Cuenca".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // Generation decrements stock through the same merge
    let invoicing = fixture.invoicing();
    invoicing
        .add_item(AddItemInput {
            product_id: Some(product.id),
            quantity: 2,
        })
        .await
        .unwrap();
    invoicing.resolve_client("ferretería andina").await;
    invoicing.generate().await.unwrap();

    let stored = fixture.store.list(&products).await.unwrap();
    let data = &stored[0].data;
    assert_eq!(data["stockQuantity"], 10);
    assert!(data.get("stock").is_none());
    let stored_client = fixture.store.list(&clients).await.unwrap();
    assert!(stored_client[0].data.get("ruc").is_none());

    // The next snapshots still decode both records
    assert!(eventually(&fixture.session, |d| {
        d.product(product.id).map(|p| p.stock_quantity) == Some(10)
            && d.client(client.id).map(|c| c.tax_id.as_str()) == Some("0190012345001")
    })
    .await);
    assert!(fixture.session.drain_notices().is_empty());
}

#[tokio::test]
async fn test_manual_stock_is_clamped() {
    let fixture = Fixture::new().await;
    let p1 = fixture.product("Clavos", "0.10", 100).await;
    let updated = fixture
        .inventory()
        .set_stock(p1.id, SetStockInput { stock_quantity: -4 })
        .await
        .unwrap();
    assert_eq!(updated.stock_quantity, 0);
    assert_eq!(fixture.stock_of(p1.id), Some(0));
}

#[tokio::test]
async fn test_closed_session_is_not_connected() {
    let fixture = Fixture::new().await;
    fixture.session.close();
    assert_eq!(fixture.session.status(), DataStatus::NotConnected);
}

#[tokio::test]
async fn test_fixture_seeding() {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let session = Session::open(store.clone(), Uuid::new_v4(), true).await;
    assert_eq!(session.read().products.len(), 4);

    let stored = store
        .list(&session.path(Collection::Clients))
        .await
        .unwrap();
    assert_eq!(stored.len(), 3);

    // A second session on the same data is not seeded again
    let again = Session::open(store.clone(), session.user_id(), true).await;
    assert_eq!(again.read().clients.len(), 3);
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Generation drops each product's stock by exactly the invoiced quantity
    #[test]
    fn prop_generation_decrements_exactly(
        lines in prop::collection::vec((1i32..50, 0i32..20), 1..5)
    ) {
        tokio_test::block_on(async {
            let fixture = Fixture::new().await;
            fixture.client("Acme").await;

            let mut expected = Vec::new();
            for (i, (quantity, spare)) in lines.iter().enumerate() {
                let product = fixture
                    .product(&format!("Producto {}", i), "1.50", quantity + spare)
                    .await;
                fixture.add(&product, *quantity).await.unwrap();
                expected.push((product.id, *spare));
            }
            fixture.invoicing().resolve_client("Acme").await;
            fixture.invoicing().generate().await.unwrap();

            for (id, spare) in expected {
                assert_eq!(fixture.stock_of(id), Some(spare));
            }
            assert_eq!(fixture.session.read().pending_invoices().len(), 1);
        });
    }
}
