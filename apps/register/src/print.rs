//! # Receipt Printer
//!
//! Renders an assembled [`ReceiptDocument`] as fixed-width text for a
//! thermal printer, or any other `io::Write` sink.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │         Pastelería 1000 Sabores          │
//! │            RUT 76.000.000-0              │
//! │ ======================================== │
//! │            BOLETA ELECTRÓNICA            │
//! │           N° 20251130-01-0001            │
//! │ ---------------------------------------- │
//! │ Kuchen de Nuez                           │
//! │   2 x $1.200                      $2.400 │
//! │ ---------------------------------------- │
//! │ Neto                              $2.689 │
//! │ IVA (19%)                           $511 │
//! │ TOTAL                             $3.200 │
//! └──────────────────────────────────────────┘
//! ```
//!
//! Widths are counted in characters, so accented names line up.

use std::io::{self, Write};

use chrono::{DateTime, Local, Utc};

use sabores_core::{ReceiptDocument, TaxRate};

use crate::commands::catalog::CatalogResponse;
use crate::commands::closing::ClosingReport;
use crate::state::{RegisterConfig, MIN_PAPER_WIDTH};

const THANKS: &str = "¡Gracias por su compra!";

/// Fixed-width text renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReceiptPrinter {
    width: usize,
}

impl ReceiptPrinter {
    /// Widths below the supported minimum are raised to it.
    pub fn new(width: usize) -> Self {
        ReceiptPrinter {
            width: width.max(MIN_PAPER_WIDTH),
        }
    }

    pub fn from_config(config: &RegisterConfig) -> Self {
        Self::new(config.paper_width)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Writes the receipt to `out`.
    pub fn print<W: Write>(&self, receipt: &ReceiptDocument, out: &mut W) -> io::Result<()> {
        out.write_all(self.render(receipt).as_bytes())?;
        out.flush()
    }

    /// Renders the receipt, one `\n`-terminated line per row.
    pub fn render(&self, receipt: &ReceiptDocument) -> String {
        let mut lines = Vec::new();
        let store = &receipt.store;

        lines.push(self.center(&store.name));
        lines.push(self.center(&format!("RUT {}", store.rut)));
        lines.push(self.center(&store.address));
        if let Some(phone) = &store.phone {
            lines.push(self.center(&format!("Tel: {}", phone)));
        }
        if let Some(website) = &store.website {
            lines.push(self.center(website));
        }

        lines.push(self.rule('='));
        lines.push(self.center(&receipt.title));
        lines.push(self.center(&format!("N° {}", receipt.document_number)));
        lines.push(self.rule('-'));

        lines.push(self.labelled("Fecha", &local_time(&receipt.issued_at)));
        lines.push(self.labelled("Vendedor", &receipt.seller_name));
        lines.push(self.labelled("Cliente", &receipt.buyer_name));
        if let Some(rut) = &receipt.buyer_rut {
            lines.push(self.labelled("RUT", rut));
        }
        if let Some(email) = &receipt.buyer_email {
            lines.push(self.labelled("Email", email));
        }
        lines.push(self.rule('-'));

        for row in &receipt.rows {
            lines.push(self.truncate(&row.name, self.width));
            lines.push(self.columns(
                &format!("  {} x {}", row.quantity, row.unit_price),
                &row.subtotal.to_string(),
            ));
        }
        lines.push(self.rule('-'));

        lines.push(self.columns("Neto", &receipt.net.to_string()));
        lines.push(self.columns(
            &format!("IVA ({}%)", TaxRate::IVA.percentage()),
            &receipt.tax.to_string(),
        ));
        if !receipt.shipping.is_zero() {
            lines.push(self.columns("Envío", &receipt.shipping.to_string()));
        }
        lines.push(self.rule('='));
        lines.push(self.columns("TOTAL", &receipt.total.to_string()));
        lines.push(self.rule('='));

        lines.push(self.columns("Medio de pago", &receipt.payment_label));
        if let Some(cash) = receipt.cash {
            lines.push(self.columns("Efectivo", &cash.tendered.to_string()));
            lines.push(self.columns("Vuelto", &cash.change.to_string()));
        }
        if let Some(delivery) = &receipt.delivery {
            lines.push(self.labelled("Entrega", &delivery.label));
            if let Some(address) = &delivery.address {
                lines.push(self.labelled("Dirección", address));
            }
        }
        if let Some(notes) = &receipt.notes {
            lines.push(self.labelled("Notas", notes));
        }
        lines.push(self.labelled("Estado", receipt.status.label()));

        lines.push(self.rule('-'));
        lines.push(self.center(&receipt.stamp));
        lines.push(self.center(THANKS));

        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    /// Renders a closing report in the same layout.
    pub fn render_closing(&self, report: &ClosingReport) -> String {
        let summary = &report.summary;
        let mut lines = vec![
            self.center(&format!("CIERRE DE CAJA {}", summary.day.format("%d/%m/%Y"))),
            self.rule('='),
        ];

        for (label, tally) in [
            ("EFECTIVO", summary.cash),
            ("DEBITO", summary.debit),
            ("CREDITO", summary.credit),
        ] {
            lines.push(self.columns(
                &format!("{} ({})", label, tally.count),
                &tally.total.to_string(),
            ));
        }
        lines.push(self.rule('-'));
        lines.push(self.columns(
            &format!("TOTAL ({})", summary.overall.count),
            &summary.overall.total.to_string(),
        ));

        if !report.sellers.is_empty() {
            lines.push(self.rule('='));
            for seller in &report.sellers {
                lines.push(self.columns(
                    &format!("{} ({})", seller.seller_name, seller.tally.count),
                    &seller.tally.total.to_string(),
                ));
            }
        }

        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    /// Renders the catalog grouped by category. Products with no known
    /// category are listed last under "Otros".
    pub fn render_price_list(&self, catalog: &CatalogResponse) -> String {
        let mut lines = vec![self.center("LISTA DE PRECIOS"), self.rule('=')];

        let known = |id: Option<i64>| catalog.categories.iter().any(|c| Some(c.id) == id);
        let groups = catalog
            .categories
            .iter()
            .map(|c| (c.name.as_str(), Some(c.id)))
            .chain(std::iter::once(("Otros", None)));

        for (title, category_id) in groups {
            let products: Vec<_> = catalog
                .products
                .iter()
                .filter(|p| match category_id {
                    Some(_) => p.category_id == category_id,
                    None => !known(p.category_id),
                })
                .collect();
            if products.is_empty() {
                continue;
            }

            lines.push(self.truncate(&title.to_uppercase(), self.width));
            for product in products {
                let name = if product.is_in_stock() {
                    product.name.clone()
                } else {
                    format!("{} (agotado)", product.name)
                };
                lines.push(self.columns(&format!("  {}", name), &product.price.to_string()));
            }
            lines.push(self.rule('-'));
        }

        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    // =========================================================================
    // Layout helpers
    // =========================================================================

    fn rule(&self, ch: char) -> String {
        std::iter::repeat(ch).take(self.width).collect()
    }

    fn center(&self, text: &str) -> String {
        let text = self.truncate(text, self.width);
        let pad = (self.width - text.chars().count()) / 2;
        format!("{}{}", " ".repeat(pad), text)
    }

    fn labelled(&self, label: &str, value: &str) -> String {
        self.truncate(&format!("{}: {}", label, value), self.width)
    }

    /// `left` and `right` on one line, `right` flush with the margin.
    fn columns(&self, left: &str, right: &str) -> String {
        let right = self.truncate(right, self.width);
        let right_len = right.chars().count();
        let room = self.width.saturating_sub(right_len + 1);
        let left = self.truncate(left, room);
        let gap = self.width - left.chars().count() - right_len;
        format!("{}{}{}", left, " ".repeat(gap), right)
    }

    fn truncate(&self, text: &str, max: usize) -> String {
        text.chars().take(max).collect()
    }
}

fn local_time(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%d/%m/%Y %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sabores_core::receipt::{CashDetails, ReceiptDelivery, ReceiptRow};
    use sabores_core::{Category, Money, OrderStatus, Product, StoreInfo};

    fn pesos(n: i64) -> Money {
        Money::from_pesos(n)
    }

    fn receipt() -> ReceiptDocument {
        ReceiptDocument {
            store: StoreInfo::default(),
            title: "BOLETA ELECTRÓNICA".to_string(),
            document_number: "20251130-01-0001".to_string(),
            issued_at: Utc.with_ymd_and_hms(2025, 11, 30, 14, 30, 0).unwrap(),
            seller_name: "Carla Soto".to_string(),
            buyer_name: "Cliente".to_string(),
            buyer_rut: None,
            buyer_email: None,
            rows: vec![
                ReceiptRow {
                    name: "Torta Chocolate (porción)".to_string(),
                    quantity: 2,
                    unit_price: pesos(1200),
                    subtotal: pesos(2400),
                },
                ReceiptRow {
                    name: "Kuchen de Nuez".to_string(),
                    quantity: 1,
                    unit_price: pesos(800),
                    subtotal: pesos(800),
                },
            ],
            net: pesos(2689),
            tax: pesos(511),
            shipping: Money::zero(),
            total: pesos(3200),
            payment_label: "EFECTIVO".to_string(),
            cash: Some(CashDetails {
                tendered: pesos(5000),
                change: pesos(1800),
            }),
            delivery: Some(ReceiptDelivery {
                label: "Retiro en Tienda".to_string(),
                address: None,
            }),
            notes: None,
            status: OrderStatus::Pending,
            stamp: "TED-1-mil0abcd".to_string(),
        }
    }

    #[test]
    fn test_every_line_fits_the_paper() {
        for width in [32, 42, 48] {
            let printer = ReceiptPrinter::new(width);
            for line in printer.render(&receipt()).lines() {
                assert!(line.chars().count() <= width, "{:?} wider than {}", line, width);
            }
        }
    }

    #[test]
    fn test_totals_are_right_aligned() {
        let printer = ReceiptPrinter::new(42);
        let text = printer.render(&receipt());

        let total = text.lines().find(|l| l.starts_with("TOTAL")).unwrap();
        assert!(total.ends_with("$3.200"));
        assert_eq!(total.chars().count(), 42);

        assert!(text.contains("IVA (19%)"));
        assert!(text.lines().any(|l| l.starts_with("Vuelto") && l.ends_with("$1.800")));
        assert!(text.contains("N° 20251130-01-0001"));
        assert!(!text.contains("Envío"));
    }

    #[test]
    fn test_shipping_line_only_when_charged() {
        let mut doc = receipt();
        doc.shipping = pesos(3000);
        doc.total = pesos(6200);
        doc.cash = None;

        let text = ReceiptPrinter::new(42).render(&doc);
        assert!(text.lines().any(|l| l.starts_with("Envío") && l.ends_with("$3.000")));
        assert!(!text.contains("Vuelto"));
    }

    #[test]
    fn test_price_list_groups_by_category() {
        let product = |id, name: &str, category_id, stock| Product {
            id,
            name: name.to_string(),
            description: None,
            price: pesos(1200),
            stock,
            category_id,
            image_url: None,
        };
        let catalog = CatalogResponse {
            categories: vec![Category {
                id: 2,
                name: "Kuchen".to_string(),
                description: None,
            }],
            products: vec![
                product(7, "Kuchen de Nuez", Some(2), 30),
                product(9, "Kuchen de Manzana", Some(2), 0),
                product(11, "Pan de Pascua", Some(99), 4),
            ],
        };

        let text = ReceiptPrinter::new(42).render_price_list(&catalog);
        let lines: Vec<&str> = text.lines().collect();
        let kuchen = lines.iter().position(|l| *l == "KUCHEN").unwrap();
        let otros = lines.iter().position(|l| *l == "OTROS").unwrap();
        assert!(kuchen < otros);
        assert!(lines[kuchen + 1].starts_with("  Kuchen de Nuez") && lines[kuchen + 1].ends_with("$1.200"));
        assert!(lines[kuchen + 2].contains("(agotado)"));
        assert!(lines[otros + 1].contains("Pan de Pascua"));
        assert!(lines.iter().all(|l| l.chars().count() <= 42));
    }

    #[test]
    fn test_narrow_width_is_raised() {
        assert_eq!(ReceiptPrinter::new(10).width(), MIN_PAPER_WIDTH);
    }

    #[test]
    fn test_print_writes_rendered_text() {
        let printer = ReceiptPrinter::new(32);
        let mut sink = Vec::new();
        printer.print(&receipt(), &mut sink).unwrap();
        assert_eq!(String::from_utf8(sink).unwrap(), printer.render(&receipt()));
    }
}
