//! # Checkout Service
//!
//! Runs one submission attempt through the checkout state machine.
//!
//! ```text
//!   CHOOSING_PAYMENT
//!         │ begin_submit (validation)
//!         │    └─ blocked ──► Err(Blocked), nothing sent, state unchanged
//!         ▼
//!    SUBMITTING ── gateway.submit_order ──┐
//!                                         │
//!          ┌─────────── Ok(order) ────────┴──── Err(e) ──────────┐
//!          ▼                                                     ▼
//!      CONFIRMED                                         CHOOSING_PAYMENT
//!      cart cleared                                      error banner set
//!                                                        cart kept
//! ```
//!
//! Gateway failures never escape as panics or unhandled errors; they end up
//! on the flow and in the returned [`CheckoutError::Failed`].

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use sabores_core::{Cart, CheckoutFlow, CoreError, Order};

use crate::client::OrderGateway;
use crate::error::{GatewayError, GatewayResult};

/// Why a checkout attempt did not confirm.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Local validation stopped the submission; nothing was sent.
    #[error(transparent)]
    Blocked(#[from] CoreError),

    /// The gateway call failed; the flow is back at payment with a message.
    #[error(transparent)]
    Failed(#[from] GatewayError),
}

/// Validates, submits and settles one checkout attempt.
///
/// On success the flow is CONFIRMED, the cart is empty and the confirmed
/// order is returned. Holds both borrows across the gateway call; callers
/// that share the flow between tasks run [`CheckoutFlow::begin_submit`] and
/// [`settle_submission`] under their own locks instead.
pub async fn submit_checkout(
    flow: &mut CheckoutFlow,
    cart: &mut Cart,
    gateway: &dyn OrderGateway,
    now: DateTime<Utc>,
) -> Result<Order, CheckoutError> {
    let submission = flow.begin_submit(cart, now)?;
    let outcome = gateway.submit_order(&submission).await;

    let order = settle_submission(flow, outcome)?;
    cart.clear();
    info!(order_id = order.id, "Cart cleared");
    Ok(order)
}

/// Records the gateway's answer on a SUBMITTING flow.
///
/// `Ok` moves it to CONFIRMED; `Err` puts it back at CHOOSING_PAYMENT with
/// the banner message. The cart is left to the caller.
pub fn settle_submission(
    flow: &mut CheckoutFlow,
    outcome: GatewayResult<Order>,
) -> Result<Order, CheckoutError> {
    match outcome {
        Ok(order) => {
            let order = flow.complete(order)?.clone();
            info!(order_id = order.id, "Checkout confirmed");
            Ok(order)
        }
        Err(err) => {
            warn!(error = %err, "Checkout submission failed");
            flow.fail(err.user_message())?;
            Err(CheckoutError::Failed(err))
        }
    }
}
