//! # State Module
//!
//! Register state, one type per concern. Each command takes only the state
//! it needs.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐ ┌──────────────┐ ┌──────────────┐ ┌───────────────┐  │
//! │  │ SessionState │ │ CatalogState │ │  CartState   │ │ CheckoutState │  │
//! │  │              │ │              │ │              │ │               │  │
//! │  │  Session     │ │  products    │ │  Mutex<Cart> │ │ Mutex<        │  │
//! │  │  gateway     │ │  categories  │ │              │ │  CheckoutFlow>│  │
//! │  └──────────────┘ └──────────────┘ └──────────────┘ └───────────────┘  │
//! │                                                                         │
//! │  ┌──────────────────┐                                                   │
//! │  │  RegisterConfig  │  read-only after startup                          │
//! │  └──────────────────┘                                                   │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • SessionState: immutable; the gateway is Send + Sync                 │
//! │  • Catalog/Cart/Checkout: Mutex, never held across an await            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod catalog;
mod checkout;
mod config;
mod session;

pub use cart::CartState;
pub use catalog::CatalogState;
pub use checkout::CheckoutState;
pub use config::{ConfigError, RegisterConfig, CONFIG_FILE_NAME, MIN_PAPER_WIDTH};
pub use session::SessionState;
