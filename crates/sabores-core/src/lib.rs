//! # sabores-core: Pure Business Logic for 1000 Sabores
//!
//! Cart math, IVA split, payment rules, the checkout state machine and the
//! receipt assembler. No I/O of any kind lives here.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      1000 Sabores Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │           Front ends (register terminal, storefront)            │   │
//! │  │    Catalog ──► Cart ──► Checkout steps ──► Receipt preview      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ sabores-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌─────────┐ ┌─────────┐ │   │
//! │  │   │  money  │ │  cart   │ │ checkout │ │ receipt │ │ closing │ │   │
//! │  │   │  IVA    │ │  lines  │ │  flow    │ │ boleta  │ │ cierre  │ │   │
//! │  │   └─────────┘ └─────────┘ └──────────┘ └─────────┘ └─────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO CLOCK • PURE FUNCTIONS               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              sabores-gateway (Remote Order Gateway)             │   │
//! │  │        wire DTOs, response adapter, OrderGateway trait          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer pesos and the single IVA split
//! - [`types`] - Domain types (Product, Order, Buyer, Session, ...)
//! - [`cart`] - The in-progress cart
//! - [`checkout`] - Payment calculator and checkout state machine
//! - [`receipt`] - Receipt (boleta) assembler
//! - [`closing`] - End-of-day register totals
//! - [`dates`] - Timestamp parsing for backend formats
//! - [`validation`] - Field validators
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use sabores_core::{Cart, Money, Product};
//!
//! let torta = Product {
//!     id: 1,
//!     name: "Torta Chocolate".to_string(),
//!     description: None,
//!     price: Money::from_pesos(1200),
//!     stock: 5,
//!     category_id: None,
//!     image_url: None,
//! };
//!
//! let mut cart = Cart::new();
//! cart.add_item(&torta);
//! cart.add_item(&torta);
//!
//! assert_eq!(cart.subtotal().pesos(), 2400);
//! assert_eq!(cart.net() + cart.tax(), cart.subtotal());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod closing;
pub mod dates;
pub mod error;
pub mod money;
pub mod receipt;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, CartTotals, LineRequest, MAX_LINE_QUANTITY};
pub use checkout::{
    CheckoutFlow, CheckoutQuote, CheckoutStep, OrderSubmission, PaymentInput, SaleOrigin,
    SubmissionContext,
};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{IvaBreakdown, Money};
pub use receipt::{assemble_receipt, ReceiptDocument};
pub use types::*;
