//! Seed data for the offline variant and for demos

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::billing::InvoiceTotals;
use crate::models::{AccountsPayableEntry, Client, Invoice, InvoiceLineItem, Product};
use crate::state::AppData;
use crate::types::PaymentStatus;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    date(y, m, d).and_hms_opt(9, 0, 0).unwrap_or_default().and_utc()
}

fn fixture_id(n: u128) -> Uuid {
    Uuid::from_u128(0x5249_4d50_4500_0000_0000_0000_0000_0000 | n)
}

pub fn sample_clients() -> Vec<Client> {
    vec![
        Client {
            id: fixture_id(0x101),
            name: "Ferretería El Tornillo".to_string(),
            tax_id: "1791234567001".to_string(),
            address: "Av. 10 de Agosto N24-15, Quito".to_string(),
            phone: "022345678".to_string(),
            email: "compras@eltornillo.ec".to_string(),
            created_at: at(2024, 4, 2),
        },
        Client {
            id: fixture_id(0x102),
            name: "Panadería La Espiga".to_string(),
            tax_id: "0991234567001".to_string(),
            address: "Calle Boyacá 812, Guayaquil".to_string(),
            phone: "042567890".to_string(),
            email: String::new(),
            created_at: at(2024, 4, 9),
        },
        Client {
            id: fixture_id(0x103),
            name: "María Fernanda Ortiz".to_string(),
            tax_id: "0102345678".to_string(),
            address: "Gran Colombia 3-40, Cuenca".to_string(),
            phone: String::new(),
            email: "mf.ortiz@correo.ec".to_string(),
            created_at: at(2024, 4, 20),
        },
    ]
}

pub fn sample_products() -> Vec<Product> {
    vec![
        Product {
            id: fixture_id(0x201),
            name: "Cemento 50kg".to_string(),
            unit_price: Decimal::new(850, 2),
            stock_quantity: 40,
            created_at: at(2024, 4, 1),
        },
        Product {
            id: fixture_id(0x202),
            name: "Pintura blanca (galón)".to_string(),
            unit_price: Decimal::new(2200, 2),
            stock_quantity: 6,
            created_at: at(2024, 4, 1),
        },
        Product {
            id: fixture_id(0x203),
            name: "Clavos 2\" (caja)".to_string(),
            unit_price: Decimal::new(325, 2),
            stock_quantity: 120,
            created_at: at(2024, 4, 3),
        },
        Product {
            id: fixture_id(0x204),
            name: "Harina 50kg".to_string(),
            unit_price: Decimal::new(3800, 2),
            stock_quantity: 8,
            created_at: at(2024, 4, 5),
        },
    ]
}

fn sample_invoice(
    id: Uuid,
    number: &str,
    client: &Client,
    items: Vec<InvoiceLineItem>,
    issued: NaiveDate,
    status: PaymentStatus,
) -> Invoice {
    let totals = InvoiceTotals::compute(&items).unwrap_or_default();
    Invoice {
        id,
        invoice_number: number.to_string(),
        customer_id: client.id,
        customer_name: client.name.clone(),
        customer_tax_id: client.tax_id.clone(),
        customer_address: client.address.clone(),
        items,
        subtotal: totals.subtotal,
        tax: totals.tax,
        total: totals.total,
        issue_date: issued,
        status,
        created_at: issued.and_hms_opt(15, 30, 0).unwrap_or_default().and_utc(),
    }
}

pub fn sample_invoices(clients: &[Client], products: &[Product]) -> Vec<Invoice> {
    let line = |product: &Product, quantity: i32| InvoiceLineItem {
        product_id: product.id,
        name: product.name.clone(),
        unit_price: product.unit_price,
        quantity,
    };

    match (clients, products) {
        ([tornillo, espiga, ..], [cemento, pintura, clavos, harina, ..]) => vec![
            sample_invoice(
                fixture_id(0x301),
                "INV-482913",
                tornillo,
                vec![line(cemento, 10), line(clavos, 4)],
                date(2024, 5, 6),
                PaymentStatus::Pending,
            ),
            sample_invoice(
                fixture_id(0x302),
                "INV-519027",
                espiga,
                vec![line(harina, 2)],
                date(2024, 5, 8),
                PaymentStatus::Paid,
            ),
            sample_invoice(
                fixture_id(0x303),
                "INV-533480",
                tornillo,
                vec![line(pintura, 3)],
                date(2024, 5, 10),
                PaymentStatus::Pending,
            ),
        ],
        _ => Vec::new(),
    }
}

pub fn sample_payables() -> Vec<AccountsPayableEntry> {
    vec![
        AccountsPayableEntry {
            id: fixture_id(0x401),
            supplier: "Holcim Ecuador".to_string(),
            description: "Reposición de cemento".to_string(),
            amount: Decimal::new(27500, 2),
            due_date: date(2024, 5, 31),
            status: PaymentStatus::Pending,
            created_at: at(2024, 5, 1),
        },
        AccountsPayableEntry {
            id: fixture_id(0x402),
            supplier: "Empresa Eléctrica Quito".to_string(),
            description: "Planilla de luz abril".to_string(),
            amount: Decimal::new(4890, 2),
            due_date: date(2024, 5, 15),
            status: PaymentStatus::Paid,
            created_at: at(2024, 5, 2),
        },
    ]
}

/// A complete, internally consistent data set
pub fn sample_data() -> AppData {
    let clients = sample_clients();
    let products = sample_products();
    let invoices = sample_invoices(&clients, &products);
    AppData {
        clients,
        products,
        invoices,
        accounts_payable: sample_payables(),
    }
}
