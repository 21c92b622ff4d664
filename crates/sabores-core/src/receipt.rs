//! # Receipt Assembler
//!
//! Turns a confirmed [`Order`] into the flat document used by the on-screen
//! preview and by the print sink.
//!
//! ## Pipeline
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────────┐    ┌────────┐
//! │ server JSON  │───►│   gateway    │───►│ assemble_receipt │───►│ print  │
//! │ (any shape)  │    │   adapter    │    │   (pure, here)   │    │  sink  │
//! └──────────────┘    └──────────────┘    └──────────────────┘    └────────┘
//!                      fallbacks live       server totals are
//!                      here, once           ground truth
//! ```
//!
//! Server totals are printed as-is. If the line rows add up to something else
//! (stale prices on the client), [`ReceiptDocument::has_discrepancy`] reports
//! it for logging; it is never an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Order, OrderStatus, PaymentMethod, StoreInfo};

/// Document title printed under the store header.
pub const RECEIPT_TITLE: &str = "BOLETA ELECTRÓNICA";

/// Seller label used when the order names nobody.
pub const DEFAULT_SELLER_LABEL: &str = "Vendedor";

// =============================================================================
// Document
// =============================================================================

/// One printed line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceiptRow {
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub subtotal: Money,
}

/// Present only on cash receipts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CashDetails {
    pub tendered: Money,
    pub change: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceiptDelivery {
    pub label: String,
    pub address: Option<String>,
}

/// The assembled receipt (boleta).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReceiptDocument {
    pub store: StoreInfo,
    pub title: String,
    pub document_number: String,
    #[ts(as = "String")]
    pub issued_at: DateTime<Utc>,
    pub seller_name: String,
    pub buyer_name: String,
    pub buyer_rut: Option<String>,
    pub buyer_email: Option<String>,
    pub rows: Vec<ReceiptRow>,
    pub net: Money,
    pub tax: Money,
    pub shipping: Money,
    pub total: Money,
    pub payment_label: String,
    pub cash: Option<CashDetails>,
    pub delivery: Option<ReceiptDelivery>,
    pub notes: Option<String>,
    pub status: OrderStatus,
    /// Electronic stamp (timbre) text.
    pub stamp: String,
}

impl ReceiptDocument {
    /// Sum of the printed row subtotals.
    pub fn line_sum(&self) -> Money {
        self.rows.iter().map(|r| r.subtotal).sum()
    }

    /// True when the rows do not add up to the merchandise total.
    pub fn has_discrepancy(&self) -> bool {
        !self.rows.is_empty() && self.line_sum() != self.net + self.tax
    }

    /// Stable JSON export of the document.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// =============================================================================
// Assembly
// =============================================================================

/// Builds the receipt for `order`.
///
/// Pure: the same order and store always yield the same document.
pub fn assemble_receipt(order: &Order, store: &StoreInfo) -> ReceiptDocument {
    let seller_name = order
        .seller
        .as_ref()
        .map(|s| s.name.trim())
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_SELLER_LABEL)
        .to_string();

    let rows = order
        .lines
        .iter()
        .map(|line| ReceiptRow {
            name: line.name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            subtotal: line.subtotal,
        })
        .collect();

    let cash = match order.payment_method {
        PaymentMethod::Cash => {
            // Nothing recorded anywhere: print zero rather than invent a figure
            let tendered = order.tendered.unwrap_or_else(Money::zero);
            let change = order
                .change
                .unwrap_or_else(|| tendered.saturating_diff(order.total));
            Some(CashDetails { tendered, change })
        }
        PaymentMethod::Debit | PaymentMethod::Credit => None,
    };

    let delivery = order.delivery.as_ref().map(|d| ReceiptDelivery {
        label: d.kind.label().to_string(),
        address: d.address.clone(),
    });

    ReceiptDocument {
        store: store.clone(),
        title: RECEIPT_TITLE.to_string(),
        document_number: document_number(order),
        issued_at: order.issued_at,
        seller_name,
        buyer_name: order.buyer.display_name().to_string(),
        buyer_rut: order.buyer.rut().map(str::to_string),
        buyer_email: order.buyer.email().map(str::to_string),
        rows,
        net: order.net,
        tax: order.tax,
        shipping: order.shipping,
        total: order.total,
        payment_label: order.payment_method.label().to_string(),
        cash,
        delivery,
        notes: order.notes.clone(),
        status: order.status,
        stamp: electronic_stamp(order),
    }
}

/// Server folio, or `F-000123` built from the order id.
pub fn document_number(order: &Order) -> String {
    match order.folio.as_deref().map(str::trim) {
        Some(folio) if !folio.is_empty() => folio.to_string(),
        _ => format!("F-{:06}", order.id),
    }
}

/// `TED-<id>-<issue millis in base 36>`.
pub fn electronic_stamp(order: &Order) -> String {
    format!(
        "TED-{}-{}",
        order.id,
        to_base36(order.issued_at.timestamp_millis().unsigned_abs())
    )
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Buyer, Delivery, DeliveryType, OrderLine, Seller};
    use chrono::TimeZone;

    fn pesos(n: i64) -> Money {
        Money::from_pesos(n)
    }

    fn sample_order() -> Order {
        Order {
            id: 123,
            folio: Some("20251130-01-0007".to_string()),
            issued_at: Utc.with_ymd_and_hms(2025, 11, 30, 14, 30, 0).unwrap(),
            seller: Some(Seller {
                id: Some(2),
                name: "Carla Soto".to_string(),
                rut: None,
            }),
            buyer: Buyer::guest(),
            lines: vec![
                OrderLine {
                    product_id: Some(1),
                    name: "Torta Chocolate".to_string(),
                    quantity: 2,
                    unit_price: pesos(1200),
                    subtotal: pesos(2400),
                },
                OrderLine {
                    product_id: Some(2),
                    name: "Kuchen Nuez".to_string(),
                    quantity: 1,
                    unit_price: pesos(800),
                    subtotal: pesos(800),
                },
            ],
            payment_method: PaymentMethod::Cash,
            net: pesos(2689),
            tax: pesos(511),
            shipping: Money::zero(),
            total: pesos(3200),
            tendered: Some(pesos(5000)),
            change: Some(pesos(1800)),
            delivery: None,
            notes: None,
            status: OrderStatus::Confirmed,
        }
    }

    #[test]
    fn test_cash_receipt() {
        let doc = assemble_receipt(&sample_order(), &StoreInfo::default());

        assert_eq!(doc.document_number, "20251130-01-0007");
        assert_eq!(doc.title, RECEIPT_TITLE);
        assert_eq!(doc.seller_name, "Carla Soto");
        assert_eq!(doc.buyer_name, "Cliente");
        assert_eq!(doc.rows.len(), 2);
        assert_eq!(doc.net + doc.tax, doc.total);
        assert_eq!(doc.line_sum(), doc.total);
        assert!(!doc.has_discrepancy());
        assert_eq!(doc.payment_label, "EFECTIVO");
        assert_eq!(
            doc.cash,
            Some(CashDetails {
                tendered: pesos(5000),
                change: pesos(1800)
            })
        );
    }

    #[test]
    fn test_card_receipt_has_no_cash_details() {
        let mut order = sample_order();
        order.payment_method = PaymentMethod::Debit;

        let doc = assemble_receipt(&order, &StoreInfo::default());
        assert_eq!(doc.payment_label, "DEBITO");
        assert!(doc.cash.is_none());
    }

    #[test]
    fn test_fallback_document_number_and_seller() {
        let mut order = sample_order();
        order.folio = Some("  ".to_string());
        order.seller = None;

        let doc = assemble_receipt(&order, &StoreInfo::default());
        assert_eq!(doc.document_number, "F-000123");
        assert_eq!(doc.seller_name, DEFAULT_SELLER_LABEL);
    }

    #[test]
    fn test_cash_without_tendered_defaults_to_zero() {
        let mut order = sample_order();
        order.tendered = None;
        order.change = None;

        let doc = assemble_receipt(&order, &StoreInfo::default());
        assert_eq!(
            doc.cash,
            Some(CashDetails {
                tendered: Money::zero(),
                change: Money::zero()
            })
        );
    }

    #[test]
    fn test_server_total_wins_over_line_sum() {
        let mut order = sample_order();
        order.lines[0].subtotal = pesos(2000);

        let doc = assemble_receipt(&order, &StoreInfo::default());
        assert_eq!(doc.total, pesos(3200));
        assert!(doc.has_discrepancy());
    }

    #[test]
    fn test_registered_buyer_and_delivery() {
        let mut order = sample_order();
        order.buyer = Buyer::Registered {
            name: "Ana Pérez".to_string(),
            email: Some("ana@mail.cl".to_string()),
            rut: Some("12.345.678-5".to_string()),
        };
        order.delivery = Some(Delivery {
            kind: DeliveryType::Ship,
            address: Some("Los Aromos 123".to_string()),
        });
        order.shipping = pesos(3000);
        order.total = pesos(6200);
        order.notes = Some("Sin nueces".to_string());

        let doc = assemble_receipt(&order, &StoreInfo::default());
        assert_eq!(doc.buyer_name, "Ana Pérez");
        assert_eq!(doc.buyer_rut.as_deref(), Some("12.345.678-5"));
        assert_eq!(doc.delivery.as_ref().map(|d| d.label.as_str()), Some("Envío a Domicilio"));
        assert_eq!(doc.shipping, pesos(3000));
        assert_eq!(doc.notes.as_deref(), Some("Sin nueces"));
        // Shipping is outside the merchandise split
        assert!(!doc.has_discrepancy());
    }

    #[test]
    fn test_assembly_is_idempotent() {
        let order = sample_order();
        let store = StoreInfo::default();

        let first = assemble_receipt(&order, &store);
        let second = assemble_receipt(&order, &store);
        assert_eq!(first, second);
        assert_eq!(first.to_json_pretty().unwrap(), second.to_json_pretty().unwrap());
    }

    #[test]
    fn test_stamp() {
        let order = sample_order();
        let millis = order.issued_at.timestamp_millis() as u64;
        let stamp = electronic_stamp(&order);
        assert!(stamp.starts_with("TED-123-"));
        assert_eq!(u64::from_str_radix(&stamp["TED-123-".len()..], 36).unwrap(), millis);
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "Z");
        assert_eq!(to_base36(36), "10");
    }
}
