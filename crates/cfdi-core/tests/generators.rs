#![allow(dead_code)]

use cfdi_core::catalog::{CatalogEntry, Dimension};
use cfdi_core::invoice::{DATE_LAYOUT, Invoice, Party};
use cfdi_core::selection::Selection;
use chrono::{Duration, NaiveDateTime};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

fn base_date() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2020-01-01T00:00:00", DATE_LAYOUT).expect("base date")
}

/// Plain MXN income invoice dated 2024-01-15.
pub fn invoice(uuid: &str, total: &str) -> Invoice {
    let amount = Decimal::from_str(total).expect("test amount");
    let date = NaiveDateTime::parse_from_str("2024-01-15T10:00:00", DATE_LAYOUT).expect("date");
    Invoice {
        uuid: uuid.to_string(),
        folio: String::new(),
        series: String::new(),
        issuer: Party::default(),
        recipient: Party::default(),
        usage: "G03".to_string(),
        payment_method: "PUE".to_string(),
        payment_form: "01".to_string(),
        document_type: "I".to_string(),
        subtotal: amount,
        discount: Decimal::ZERO,
        total: amount,
        currency: "MXN".to_string(),
        exchange_rate: String::new(),
        issued_at: date,
        stamped_at: date,
    }
}

pub fn with_form(uuid: &str, form: &str, total: &str) -> Invoice {
    let mut inv = invoice(uuid, total);
    inv.payment_form = form.to_string();
    inv
}

/// Catalog codes of `dimension` plus values no filter ever lists.
fn arb_code(dimension: Dimension) -> impl Strategy<Value = String> {
    let mut codes: Vec<String> = dimension
        .entries()
        .iter()
        .map(|entry| entry.id.to_string())
        .collect();
    codes.push(String::new());
    codes.push("ZZ".to_string());
    prop::sample::select(codes)
}

fn arb_amount() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_rate() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["", "1", "2", "17.0123", "0.5"]).prop_map(str::to_string)
}

pub fn arb_invoice() -> impl Strategy<Value = Invoice> {
    (
        "[A-F0-9]{8}",
        arb_code(Dimension::PaymentMethod),
        arb_code(Dimension::PaymentForm),
        arb_code(Dimension::Usage),
        arb_code(Dimension::DocumentType),
        (arb_amount(), arb_amount(), arb_amount()),
        arb_rate(),
        0i64..3650,
    )
        .prop_map(
            |(uuid, method, form, usage, kind, (subtotal, discount, total), rate, days)| {
                let issued_at = base_date() + Duration::days(days);
                Invoice {
                    uuid,
                    folio: String::new(),
                    series: String::new(),
                    issuer: Party::default(),
                    recipient: Party::default(),
                    usage,
                    payment_method: method,
                    payment_form: form,
                    document_type: kind,
                    subtotal,
                    discount,
                    total,
                    currency: "MXN".to_string(),
                    exchange_rate: rate,
                    issued_at,
                    stamped_at: issued_at,
                }
            },
        )
}

pub fn arb_invoices() -> impl Strategy<Value = Vec<Invoice>> {
    prop::collection::vec(arb_invoice(), 0..40)
}

/// Any entry of any dimension; never the reserved ignore entry.
pub fn arb_entry() -> impl Strategy<Value = &'static CatalogEntry> {
    let all: Vec<&'static CatalogEntry> = Dimension::ALL
        .iter()
        .flat_map(|dimension| dimension.entries())
        .collect();
    prop::sample::select(all)
}

pub fn arb_selection() -> impl Strategy<Value = Selection> {
    prop::collection::vec(arb_entry(), 0..6).prop_map(|entries| entries.into_iter().collect())
}
