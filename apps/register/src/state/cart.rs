//! # Cart State
//!
//! Holds the terminal's in-progress cart.
//!
//! ## Thread Safety
//! The cart is wrapped in a `Mutex` so that only one command touches it at a
//! time. The lock is never held across an `.await`: checkout reads the cart
//! while freezing the submission and clears it once the sale is confirmed.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  Cashier Action          Command                 Cart Change            │
//! │  ──────────────          ───────                 ───────────            │
//! │                                                                         │
//! │  Tap Product ───────────► add_to_cart() ───────► add_item (+1)          │
//! │                                                                         │
//! │  Change Quantity ───────► update_cart_item() ──► set_quantity (n ≥ 1)   │
//! │                                                                         │
//! │  Tap Remove ────────────► remove_from_cart() ──► remove_item            │
//! │                                                                         │
//! │  Cancel Sale ───────────► clear_cart() ────────► clear                  │
//! │                                                                         │
//! │  Sale Confirmed ────────► submit_sale() ───────► clear                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Mutex, PoisonError};

use sabores_core::Cart;

/// Thread-safe wrapper around the terminal's cart.
#[derive(Debug, Default)]
pub struct CartState {
    cart: Mutex<Cart>,
}

impl CartState {
    /// Creates a new empty cart state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Executes a function with read access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let total = cart_state.with_cart(|cart| cart.subtotal());
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        // Cart mutators never leave it half-updated
        let cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// cart_state.with_cart_mut(|cart| cart.add_item(&product));
    /// ```
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut cart)
    }

    /// Copy of the current cart.
    pub fn snapshot(&self) -> Cart {
        self.with_cart(Cart::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sabores_core::{Money, Product};

    fn kuchen() -> Product {
        Product {
            id: 7,
            name: "Kuchen de Nuez".to_string(),
            description: None,
            price: Money::from_pesos(1200),
            stock: 30,
            category_id: Some(2),
            image_url: None,
        }
    }

    #[test]
    fn test_with_cart_mut_persists() {
        let state = CartState::new();
        state.with_cart_mut(|c| c.add_item(&kuchen()));
        state.with_cart_mut(|c| c.add_item(&kuchen()));

        assert_eq!(state.with_cart(|c| c.total_quantity()), 2);
        assert_eq!(state.with_cart(|c| c.subtotal()), Money::from_pesos(2400));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let state = CartState::new();
        state.with_cart_mut(|c| c.add_item(&kuchen()));

        let mut copy = state.snapshot();
        copy.clear();

        assert!(copy.is_empty());
        assert!(!state.with_cart(Cart::is_empty));
    }
}
