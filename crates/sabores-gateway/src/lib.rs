//! # sabores-gateway: Remote Order Gateway for 1000 Sabores
//!
//! Everything the register and the storefront need from the REST backend:
//! submitting orders, reading the catalog, correcting a payment method and
//! listing past sales.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      1000 Sabores Data Flow                             │
//! │                                                                         │
//! │  CheckoutFlow::begin_submit (sabores-core)                             │
//! │       │  OrderSubmission                                                │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 sabores-gateway (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────┐   ┌──────────────┐   ┌──────────────────┐   │   │
//! │  │   │   service    │──►│    client    │──►│     backend      │   │   │
//! │  │   │ submit_      │   │ OrderGateway │   │ Backend trait    │   │   │
//! │  │   │ checkout     │   │ RestGateway  │   │ HttpBackend      │   │   │
//! │  │   │              │   │              │   │ InMemoryBackend  │   │   │
//! │  │   └──────────────┘   └──────┬───────┘   └──────────────────┘   │   │
//! │  │                             │ raw JSON                          │   │
//! │  │                      ┌──────▼───────┐   ┌──────────────────┐   │   │
//! │  │                      │   adapter    │◄──│      wire        │   │   │
//! │  │                      │ → Order      │   │ Raw* DTOs        │   │   │
//! │  │                      └──────────────┘   └──────────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │  Order (canonical)                                              │
//! │       ▼                                                                 │
//! │  assemble_receipt (sabores-core) ──► print sink (app)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`client`] - `OrderGateway` trait and the REST implementation
//! - [`backend`] - Transport seam (`Backend` trait)
//! - [`http`] - REST backend over HTTP
//! - [`memory`] - In-memory reference backend
//! - [`wire`] - Backend JSON shapes
//! - [`adapter`] - Response normalisation with fallback precedence
//! - [`service`] - Checkout submission against the state machine
//! - [`seed`] - Demo bakery catalog
//! - [`error`] - Gateway error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sabores_gateway::{HttpBackend, RestGateway, submit_checkout};
//!
//! let backend = HttpBackend::new("http://localhost:8080/api")?;
//! let gateway = RestGateway::new(backend, Session::from_token(token));
//!
//! let order = submit_checkout(&mut flow, &mut cart, &gateway, Utc::now()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod adapter;
pub mod backend;
pub mod client;
pub mod error;
pub mod http;
pub mod memory;
pub mod seed;
pub mod service;
pub mod wire;

// =============================================================================
// Re-exports
// =============================================================================

pub use adapter::normalize_order;
pub use backend::{Backend, BackendRequest, Method};
pub use client::{OrderGateway, RestGateway};
pub use error::{GatewayError, GatewayResult};
pub use http::HttpBackend;
pub use memory::{InMemoryBackend, ResponseShape};
pub use service::{settle_submission, submit_checkout, CheckoutError};
