//! # Checkout State
//!
//! The register's current checkout flow. A new flow starts at
//! CHOOSING_PAYMENT every time the cashier opens the payment panel.
//!
//! While a sale is in flight the stored flow sits at SUBMITTING, so every
//! other command sees it and a second submission is refused.

use std::sync::{Mutex, PoisonError};

use sabores_core::{CheckoutFlow, CoreError, CoreResult, Session};

#[derive(Debug)]
pub struct CheckoutState {
    flow: Mutex<CheckoutFlow>,
}

impl CheckoutState {
    pub fn new(session: &Session) -> Self {
        CheckoutState {
            flow: Mutex::new(CheckoutFlow::for_register(session)),
        }
    }

    /// Discards the current flow and starts a fresh one.
    ///
    /// Refused while a submission is in flight; its answer still has to
    /// land on the current flow.
    pub fn restart(&self, session: &Session) -> CoreResult<()> {
        self.with_flow_mut(|flow| {
            if flow.is_submitting() {
                return Err(CoreError::InvalidTransition {
                    from: flow.step(),
                    action: "restart",
                });
            }
            *flow = CheckoutFlow::for_register(session);
            Ok(())
        })
    }

    pub fn with_flow<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&CheckoutFlow) -> R,
    {
        let flow = self.flow.lock().unwrap_or_else(PoisonError::into_inner);
        f(&flow)
    }

    pub fn with_flow_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut CheckoutFlow) -> R,
    {
        let mut flow = self.flow.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut flow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sabores_core::{Cart, CheckoutStep, Money, PaymentInput, PaymentMethod, Product};

    #[test]
    fn test_restart_refused_while_submitting() {
        let session = Session::anonymous();
        let state = CheckoutState::new(&session);

        let mut cart = Cart::new();
        cart.add_item(&Product {
            id: 8,
            name: "Alfajor".to_string(),
            description: None,
            price: Money::from_pesos(800),
            stock: 10,
            category_id: None,
            image_url: None,
        });
        state.with_flow_mut(|flow| {
            flow.set_payment(PaymentInput::card(PaymentMethod::Debit));
            flow.begin_submit(&cart, Utc::now())
        })
        .unwrap();

        assert!(state.restart(&session).is_err());
        assert_eq!(state.with_flow(|f| f.step()), CheckoutStep::Submitting);
    }
}
