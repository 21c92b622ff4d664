//! # Closing Commands
//!
//! End-of-day cash-register closing (cierre de caja).

use chrono::{NaiveDate, TimeZone};
use serde::Serialize;
use tracing::{debug, info};

use sabores_core::closing::{by_seller, summarize, ClosingSummary, SellerTally};

use crate::error::ApiError;
use crate::state::SessionState;

/// Day totals by payment method and by seller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosingReport {
    pub summary: ClosingSummary,
    pub sellers: Vec<SellerTally>,
}

/// Closes `day` as seen in `tz`.
///
/// Admins close over every sale; other sellers only over their own.
pub async fn close_register<Tz: TimeZone>(
    session: &SessionState,
    day: NaiveDate,
    tz: &Tz,
) -> Result<ClosingReport, ApiError> {
    debug!(%day, "close_register command");

    let orders = session.gateway().list_orders().await?;
    let summary = summarize(&orders, day, tz);
    let sellers = by_seller(&orders, day, tz);

    info!(
        %day,
        sales = summary.overall.count,
        total = %summary.overall.total,
        cash = %summary.cash.total,
        debit = %summary.debit.total,
        credit = %summary.credit.total,
        "Register closed"
    );

    Ok(ClosingReport { summary, sellers })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::Utc;
    use sabores_core::{Cart, CheckoutFlow, Money, PaymentInput, PaymentMethod, SessionUser, UserRole};
    use sabores_gateway::{submit_checkout, InMemoryBackend, OrderGateway, RestGateway};

    #[tokio::test]
    async fn test_close_register_totals_today() {
        let backend = InMemoryBackend::with_demo_catalog();
        let session = backend
            .issue_session(SessionUser {
                id: 1,
                rut: "76.000.000-0".to_string(),
                name: "Admin".to_string(),
                email: None,
                phone: None,
                role: UserRole::Admin,
            })
            .await;
        let gateway = RestGateway::new(backend.clone(), session.clone());
        let catalog = gateway.fetch_catalog().await.unwrap();

        for payment in [
            PaymentInput::cash(Money::from_pesos(1200)),
            PaymentInput::card(PaymentMethod::Credit),
        ] {
            let mut cart = Cart::new();
            cart.add_item(&catalog[6]);
            let mut flow = CheckoutFlow::for_register(&session);
            flow.set_payment(payment);
            submit_checkout(&mut flow, &mut cart, &gateway, Utc::now())
                .await
                .unwrap();
        }

        let state = SessionState::new(session, Arc::new(gateway));
        let report = close_register(&state, Utc::now().date_naive(), &Utc)
            .await
            .unwrap();

        assert_eq!(report.summary.overall.count, 2);
        assert_eq!(report.summary.overall.total, Money::from_pesos(2400));
        assert_eq!(report.summary.cash.count, 1);
        assert_eq!(report.summary.credit.count, 1);
        assert_eq!(report.sellers.len(), 1);
        assert_eq!(report.sellers[0].seller_name, "Admin");
    }
}
