//! # Commands Module
//!
//! Every operation the register front end can invoke.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── catalog.rs   ◄─── Catalog refresh, category browsing
//! ├── cart.rs      ◄─── Cart manipulation
//! ├── checkout.rs  ◄─── Payment panel, submission, reprint, correction
//! ├── closing.rs   ◄─── Cierre de caja
//! └── config.rs    ◄─── Configuration retrieval
//! ```
//!
//! ## State Injection
//! Each command declares only the state it needs:
//! ```rust,ignore
//! // Only needs the cart
//! fn get_cart(cart: &CartState)
//!
//! // Needs catalog and cart
//! fn add_to_cart(catalog: &CatalogState, cart: &CartState, ...)
//!
//! // Talks to the backend
//! async fn submit_sale(session: &SessionState, cart: &CartState, ...)
//! ```
//!
//! Every fallible command returns `Result<T, ApiError>`; both sides
//! serialise to JSON for the front end.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod closing;
pub mod config;
