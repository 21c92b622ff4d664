//! # Cart
//!
//! The working set of line items for one in-progress transaction.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  UI Action                Operation               Effect                │
//! │  ─────────                ─────────               ──────                │
//! │                                                                         │
//! │  Tap product ───────────► add_item() ───────────► qty += 1 / push line │
//! │                                                                         │
//! │  Edit quantity ─────────► set_quantity() ───────► qty = n  (n >= 1)    │
//! │                                                   no-op when n < 1     │
//! │                                                                         │
//! │  Click remove ──────────► remove_item() ────────► retain != id         │
//! │                                                                         │
//! │  Order confirmed ───────► clear() ──────────────► lines.clear()        │
//! │                                                                         │
//! │  Render totals ─────────► subtotal/net/tax ─────► recomputed per read  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - At most one line per product id
//! - Every line has 1 <= quantity <= [`MAX_LINE_QUANTITY`]
//! - `net() + tax() == subtotal()`
//!
//! None of the mutations fail. Stock limits are checked by the caller with
//! [`Cart::available_to_add`] / [`check_stock`] before mutating.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::{IvaBreakdown, Money};
use crate::types::Product;

/// Most units of one product a single sale may carry.
pub const MAX_LINE_QUANTITY: i64 = 999;

// =============================================================================
// Cart Line
// =============================================================================

/// A product and how many units of it are in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    /// Product as read from the catalog when it was added.
    pub product: Product,
    /// Always >= 1.
    pub quantity: i64,
}

impl CartLine {
    /// Unit price × quantity, IVA included.
    pub fn line_total(&self) -> Money {
        self.product.price.multiply_quantity(self.quantity)
    }
}

/// Product id + quantity, the only line data sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineRequest {
    pub product_id: i64,
    pub quantity: i64,
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds one unit of `product`.
    ///
    /// ## Behavior
    /// - Product already in cart: quantity += 1, up to [`MAX_LINE_QUANTITY`]
    /// - Otherwise: appends a line with quantity 1
    pub fn add_item(&mut self, product: &Product) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product.id) {
            line.quantity = (line.quantity + 1).min(MAX_LINE_QUANTITY);
            return;
        }

        self.lines.push(CartLine {
            product: product.clone(),
            quantity: 1,
        });
    }

    /// Removes the line for `product_id`. No-op when absent.
    pub fn remove_item(&mut self, product_id: i64) {
        self.lines.retain(|l| l.product.id != product_id);
    }

    /// Replaces the quantity of an existing line.
    ///
    /// No-op when `quantity < 1` or the product is not in the cart; removing
    /// goes through [`Cart::remove_item`]. Larger quantities are clamped to
    /// [`MAX_LINE_QUANTITY`].
    pub fn set_quantity(&mut self, product_id: i64, quantity: i64) {
        if quantity < 1 {
            return;
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product_id) {
            line.quantity = quantity.min(MAX_LINE_QUANTITY);
        }
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    // -------------------------------------------------------------------------
    // Derived getters
    // -------------------------------------------------------------------------

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Quantity of `product_id` currently in the cart (0 when absent).
    pub fn quantity_of(&self, product_id: i64) -> i64 {
        self.lines
            .iter()
            .find(|l| l.product.id == product_id)
            .map(|l| l.quantity)
            .unwrap_or(0)
    }

    /// Number of distinct products.
    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Σ(price × quantity). Tax-inclusive.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Net/tax split of the subtotal.
    pub fn breakdown(&self) -> IvaBreakdown {
        IvaBreakdown::from_gross(self.subtotal())
    }

    /// `round(subtotal / 1.19)`.
    pub fn net(&self) -> Money {
        self.breakdown().net
    }

    /// `subtotal - net`.
    pub fn tax(&self) -> Money {
        self.breakdown().tax
    }

    /// The line data submitted to the backend.
    pub fn line_requests(&self) -> Vec<LineRequest> {
        self.lines
            .iter()
            .map(|l| LineRequest {
                product_id: l.product.id,
                quantity: l.quantity,
            })
            .collect()
    }

    // -------------------------------------------------------------------------
    // Stock hints
    // -------------------------------------------------------------------------

    /// How many more units of `product` the cached stock allows.
    ///
    /// Never negative. Based on the catalog copy, which may be stale.
    pub fn available_to_add(&self, product: &Product) -> i64 {
        (product.stock - self.quantity_of(product.id)).max(0)
    }
}

/// Checks whether `requested` total units of `product` fit the cached stock.
///
/// UI hint only; the backend decides at submission time.
pub fn check_stock(product: &Product, requested: i64) -> CoreResult<()> {
    if requested > MAX_LINE_QUANTITY {
        return Err(CoreError::QuantityTooLarge {
            requested,
            max: MAX_LINE_QUANTITY,
        });
    }

    if !product.can_sell(requested) {
        return Err(CoreError::InsufficientStock {
            product: product.name.clone(),
            available: product.stock.max(0),
            requested,
        });
    }
    Ok(())
}

/// Cart totals summary for UI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal: Money,
    pub net: Money,
    pub tax: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        let split = cart.breakdown();
        CartTotals {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            subtotal: split.gross,
            net: split.net,
            tax: split.tax,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
