//! # Cart Commands
//!
//! Commands for cart manipulation.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Payment  │────►│ Confirmed│       │
//! │  │  Cart    │     │          │     │  Panel   │     │   Sale   │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                 │               │              │
//! │                   add_to_cart       submit_sale          │              │
//! │                   update_item       (checkout.rs)        │              │
//! │                   remove_item                            │              │
//! │                        │                                 ▼              │
//! │                   clear_cart ──────────────────────► (back to empty)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::debug;

use sabores_core::cart::check_stock;
use sabores_core::{Cart, CartLine, CartTotals};

use crate::error::ApiError;
use crate::state::{CartState, CatalogState};

/// Cart response including lines and totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub lines: Vec<CartLine>,
    pub totals: CartTotals,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        CartResponse {
            lines: cart.lines().to_vec(),
            totals: CartTotals::from(cart),
        }
    }
}

/// Gets the current cart contents.
///
/// ```text
/// ┌────────────────────────────────────────────────────────────────┐
/// │  CARRITO                                          2 productos  │
/// ├────────────────────────────────────────────────────────────────┤
/// │  Torta Chocolate (porción)   x2                       $2.400   │
/// │  Kuchen de Nuez              x1                         $800   │
/// ├────────────────────────────────────────────────────────────────┤
/// │  Neto                                                 $2.689   │
/// │  IVA (19%)                                              $511   │
/// │  TOTAL                                                $3.200   │
/// └────────────────────────────────────────────────────────────────┘
/// ```
pub fn get_cart(cart: &CartState) -> CartResponse {
    debug!("get_cart command");
    cart.with_cart(|c| CartResponse::from(c))
}

/// Adds `quantity` units (default 1) of a catalog product.
///
/// The stock check here uses the cached catalog and only saves the
/// cashier a round trip; the backend re-checks on submission.
pub fn add_to_cart(
    catalog: &CatalogState,
    cart: &CartState,
    product_id: i64,
    quantity: Option<i64>,
) -> Result<CartResponse, ApiError> {
    let quantity = quantity.unwrap_or(1);
    debug!(product_id, quantity, "add_to_cart command");

    if quantity < 1 {
        return Err(ApiError::cart("La cantidad debe ser al menos 1"));
    }

    let product = catalog
        .product(product_id)
        .ok_or_else(|| ApiError::not_found("Producto", product_id))?;

    cart.with_cart_mut(|c| -> Result<CartResponse, ApiError> {
        check_stock(&product, c.quantity_of(product.id) + quantity)?;
        for _ in 0..quantity {
            c.add_item(&product);
        }
        Ok(CartResponse::from(&*c))
    })
}

/// Sets a line's quantity.
///
/// Quantities below 1 are ignored, matching the cart's own rule; use
/// [`remove_from_cart`] to drop a line.
pub fn update_cart_item(
    catalog: &CatalogState,
    cart: &CartState,
    product_id: i64,
    quantity: i64,
) -> Result<CartResponse, ApiError> {
    debug!(product_id, quantity, "update_cart_item command");

    if let Some(product) = catalog.product(product_id) {
        check_stock(&product, quantity)?;
    }

    Ok(cart.with_cart_mut(|c| {
        c.set_quantity(product_id, quantity);
        CartResponse::from(&*c)
    }))
}

/// Removes a line from the cart.
pub fn remove_from_cart(cart: &CartState, product_id: i64) -> CartResponse {
    debug!(product_id, "remove_from_cart command");

    cart.with_cart_mut(|c| {
        c.remove_item(product_id);
        CartResponse::from(&*c)
    })
}

/// Clears all lines from the cart.
///
/// ## When Used
/// - Cashier cancels the sale
pub fn clear_cart(cart: &CartState) -> CartResponse {
    debug!("clear_cart command");

    cart.with_cart_mut(|c| {
        c.clear();
        CartResponse::from(&*c)
    })
}
