//! # Checkout Commands
//!
//! Payment panel, sale submission, reprints and payment corrections.
//!
//! ## Sale Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  open_payment ──► choose_payment (repeat) ──► submit_sale              │
//! │       │                  │                        │                     │
//! │  new CheckoutFlow   quote, change,           SUBMITTING (stored)        │
//! │  at CHOOSING_       can_submit               gateway call, no lock held │
//! │  PAYMENT                                     ├─ Ok  → receipt, cart     │
//! │                                              │        emptied           │
//! │                                              └─ Err → banner, cart kept │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The stored flow is SUBMITTING for the whole gateway call, so the panel
//! shows the trigger disabled and a second `submit_sale` is refused.

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use sabores_core::checkout::change_due;
use sabores_core::{
    assemble_receipt, Cart, CheckoutQuote, CheckoutStep, CoreError, Money, Order, PaymentInput,
    PaymentMethod, ReceiptDocument,
};
use sabores_gateway::settle_submission;

use crate::error::ApiError;
use crate::state::{CartState, CheckoutState, RegisterConfig, SessionState};

/// What the payment panel shows after every change.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPreview {
    pub step: CheckoutStep,
    pub quote: CheckoutQuote,
    pub payment: PaymentInput,
    pub change: Money,
    pub can_submit: bool,
    pub error: Option<String>,
}

/// A confirmed sale and its receipt.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleResponse {
    pub order: Order,
    pub receipt: ReceiptDocument,
}

fn preview(cart: &CartState, checkout: &CheckoutState) -> PaymentPreview {
    let snapshot = cart.snapshot();
    checkout.with_flow(|flow| {
        let quote = flow.quote(&snapshot);
        let payment = *flow.payment();
        PaymentPreview {
            step: flow.step(),
            quote,
            payment,
            change: change_due(payment.method, payment.tendered, quote.grand_total),
            can_submit: flow.can_submit(&snapshot),
            error: flow.error().map(str::to_string),
        }
    })
}

/// Opens the payment panel with a fresh flow.
pub fn open_payment(
    session: &SessionState,
    cart: &CartState,
    checkout: &CheckoutState,
) -> Result<PaymentPreview, ApiError> {
    debug!("open_payment command");

    if cart.with_cart(|c| c.is_empty()) {
        return Err(CoreError::EmptyCart.into());
    }

    checkout.restart(session.session())?;
    Ok(preview(cart, checkout))
}

/// Selects the payment method and, for cash, the amount handed over.
pub fn choose_payment(
    cart: &CartState,
    checkout: &CheckoutState,
    method: PaymentMethod,
    tendered: Option<i64>,
) -> PaymentPreview {
    debug!(%method, ?tendered, "choose_payment command");

    let payment = match (method, tendered) {
        (PaymentMethod::Cash, Some(amount)) => PaymentInput::cash(Money::from_pesos(amount)),
        (PaymentMethod::Cash, None) => PaymentInput {
            method,
            tendered: None,
        },
        (card, _) => PaymentInput::card(card),
    };

    checkout.with_flow_mut(|flow| flow.set_payment(payment));
    preview(cart, checkout)
}

/// Attaches buyer notes to the sale.
pub fn set_sale_notes(checkout: &CheckoutState, notes: Option<String>) {
    debug!("set_sale_notes command");
    checkout.with_flow_mut(|flow| flow.set_notes(notes));
}

/// Submits the sale and assembles its receipt.
///
/// On success the flow is CONFIRMED and the cart emptied. On failure the
/// flow is back at CHOOSING_PAYMENT with an error banner and the cart is
/// left exactly as it is now, including edits made while the request was
/// in flight.
pub async fn submit_sale(
    session: &SessionState,
    cart: &CartState,
    checkout: &CheckoutState,
    config: &RegisterConfig,
) -> Result<SaleResponse, ApiError> {
    debug!("submit_sale command");

    let submission = checkout
        .with_flow_mut(|flow| cart.with_cart(|c| flow.begin_submit(c, Utc::now())))?;

    let outcome = session.gateway().submit_order(&submission).await;

    let order = checkout.with_flow_mut(|flow| settle_submission(flow, outcome))?;
    cart.with_cart_mut(Cart::clear);

    let receipt = receipt_for(&order, config);
    info!(order_id = order.id, document = %receipt.document_number, total = %order.total, "Sale confirmed");

    Ok(SaleResponse { order, receipt })
}

/// Changes the payment method of a past sale and returns the corrected
/// receipt.
pub async fn correct_payment_method(
    session: &SessionState,
    config: &RegisterConfig,
    order_id: i64,
    method: PaymentMethod,
) -> Result<ReceiptDocument, ApiError> {
    debug!(order_id, %method, "correct_payment_method command");

    let order = session
        .gateway()
        .update_payment_method(order_id, method)
        .await?;
    info!(order_id, %method, "Payment method corrected");
    Ok(receipt_for(&order, config))
}

/// Rebuilds the receipt of a past sale from the sales listing.
pub async fn reprint_sale(
    session: &SessionState,
    config: &RegisterConfig,
    order_id: i64,
) -> Result<ReceiptDocument, ApiError> {
    debug!(order_id, "reprint_sale command");

    let orders = session.gateway().list_orders().await?;
    let order = orders
        .iter()
        .find(|o| o.id == order_id)
        .ok_or_else(|| ApiError::not_found("Venta", order_id))?;
    Ok(receipt_for(order, config))
}

fn receipt_for(order: &Order, config: &RegisterConfig) -> ReceiptDocument {
    let receipt = assemble_receipt(order, &config.store_info());
    if receipt.has_discrepancy() {
        debug!(
            order_id = order.id,
            total = %receipt.total,
            line_sum = %receipt.line_sum(),
            shipping = %receipt.shipping,
            "Receipt total differs from its lines"
        );
    }
    receipt
}
