//! # Cash-Register Closing (cierre de caja)
//!
//! End-of-day totals for one register, grouped by payment method and by
//! seller.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  CIERRE 2025-11-30                           │
//! │  ─────────────────────────────────────────   │
//! │  EFECTIVO    4 ventas         $18.400        │
//! │  DEBITO      2 ventas          $7.200        │
//! │  CREDITO     1 venta           $3.200        │
//! │  ─────────────────────────────────────────   │
//! │  TOTAL       7 ventas         $28.800        │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Cancelled orders are left out of every total.

use chrono::{NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::dates::local_day;
use crate::money::Money;
use crate::receipt::DEFAULT_SELLER_LABEL;
use crate::types::{Order, OrderStatus, PaymentMethod};

/// Count and amount for one group of sales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Tally {
    pub count: usize,
    pub total: Money,
}

impl Tally {
    fn record(&mut self, amount: Money) {
        self.count += 1;
        self.total += amount;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClosingSummary {
    #[ts(as = "String")]
    pub day: NaiveDate,
    pub overall: Tally,
    pub cash: Tally,
    pub debit: Tally,
    pub credit: Tally,
}

impl ClosingSummary {
    pub fn for_method(&self, method: PaymentMethod) -> Tally {
        match method {
            PaymentMethod::Cash => self.cash,
            PaymentMethod::Debit => self.debit,
            PaymentMethod::Credit => self.credit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SellerTally {
    pub seller_name: String,
    pub tally: Tally,
}

fn counts_on<Tz: TimeZone>(order: &Order, day: NaiveDate, tz: &Tz) -> bool {
    order.status != OrderStatus::Cancelled && local_day(&order.issued_at, tz) == day
}

/// Totals of the orders issued on `day` in `tz`.
pub fn summarize<Tz: TimeZone>(orders: &[Order], day: NaiveDate, tz: &Tz) -> ClosingSummary {
    let mut summary = ClosingSummary {
        day,
        overall: Tally::default(),
        cash: Tally::default(),
        debit: Tally::default(),
        credit: Tally::default(),
    };

    for order in orders.iter().filter(|o| counts_on(o, day, tz)) {
        summary.overall.record(order.total);
        match order.payment_method {
            PaymentMethod::Cash => summary.cash.record(order.total),
            PaymentMethod::Debit => summary.debit.record(order.total),
            PaymentMethod::Credit => summary.credit.record(order.total),
        }
    }

    summary
}

/// Per-seller totals for `day`, highest total first.
pub fn by_seller<Tz: TimeZone>(orders: &[Order], day: NaiveDate, tz: &Tz) -> Vec<SellerTally> {
    let mut tallies: Vec<SellerTally> = Vec::new();

    for order in orders.iter().filter(|o| counts_on(o, day, tz)) {
        let name = order
            .seller
            .as_ref()
            .map(|s| s.name.trim())
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_SELLER_LABEL);

        match tallies.iter_mut().find(|t| t.seller_name == name) {
            Some(existing) => existing.tally.record(order.total),
            None => {
                let mut tally = Tally::default();
                tally.record(order.total);
                tallies.push(SellerTally {
                    seller_name: name.to_string(),
                    tally,
                });
            }
        }
    }

    tallies.sort_by(|a, b| {
        b.tally
            .total
            .cmp(&a.tally.total)
            .then_with(|| a.seller_name.cmp(&b.seller_name))
    });
    tallies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Buyer, Seller};
    use chrono::{FixedOffset, Utc};

    fn order(id: i64, at: &str, method: PaymentMethod, total: i64, seller: &str) -> Order {
        Order {
            id,
            folio: None,
            issued_at: crate::dates::parse_timestamp(at).unwrap(),
            seller: Some(Seller {
                id: None,
                name: seller.to_string(),
                rut: None,
            }),
            buyer: Buyer::guest(),
            lines: Vec::new(),
            payment_method: method,
            net: Money::zero(),
            tax: Money::zero(),
            shipping: Money::zero(),
            total: Money::from_pesos(total),
            tendered: None,
            change: None,
            delivery: None,
            notes: None,
            status: OrderStatus::Confirmed,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, d).unwrap()
    }

    fn sample() -> Vec<Order> {
        let mut cancelled = order(6, "2025-11-30T12:00:00Z", PaymentMethod::Cash, 9000, "Ana");
        cancelled.status = OrderStatus::Cancelled;
        vec![
            order(1, "2025-11-30T10:00:00Z", PaymentMethod::Cash, 3200, "Ana"),
            order(2, "2025-11-30 11:15:00", PaymentMethod::Cash, 1800, "Luis"),
            order(3, "2025-11-30T12:30:00Z", PaymentMethod::Debit, 5000, "Ana"),
            order(4, "2025-11-30T13:00:00Z", PaymentMethod::Credit, 2400, ""),
            order(5, "2025-11-29T23:59:00Z", PaymentMethod::Cash, 7000, "Luis"),
            cancelled,
        ]
    }

    #[test]
    fn test_summarize_by_method() {
        let summary = summarize(&sample(), day(30), &Utc);

        assert_eq!(summary.overall.count, 4);
        assert_eq!(summary.overall.total.pesos(), 12_400);
        assert_eq!(summary.cash, Tally { count: 2, total: Money::from_pesos(5000) });
        assert_eq!(summary.for_method(PaymentMethod::Debit).total.pesos(), 5000);
        assert_eq!(summary.credit.count, 1);
    }

    #[test]
    fn test_summarize_respects_timezone() {
        // 23:59 UTC on the 29th is 20:59 in Santiago (UTC-3), still the 29th;
        // 10:00 UTC on the 30th is 07:00 local, the 30th.
        let santiago = FixedOffset::west_opt(3 * 3600).unwrap();
        let summary = summarize(&sample(), day(29), &santiago);
        assert_eq!(summary.overall.count, 1);
        assert_eq!(summary.overall.total.pesos(), 7000);
    }

    #[test]
    fn test_empty_day() {
        let summary = summarize(&sample(), day(1), &Utc);
        assert_eq!(summary.overall, Tally::default());
    }

    #[test]
    fn test_by_seller() {
        let sellers = by_seller(&sample(), day(30), &Utc);

        assert_eq!(sellers.len(), 3);
        assert_eq!(sellers[0].seller_name, "Ana");
        assert_eq!(sellers[0].tally, Tally { count: 2, total: Money::from_pesos(8200) });
        assert_eq!(sellers[1].seller_name, DEFAULT_SELLER_LABEL);
        assert_eq!(sellers[2].seller_name, "Luis");
        assert_eq!(sellers[2].tally.total.pesos(), 1800);
    }
}
