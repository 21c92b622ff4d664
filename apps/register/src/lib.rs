//! # 1000 Sabores Register Library
//!
//! Cashier terminal for the bakery: configuration, state, commands and the
//! receipt print sink. All business rules live in `sabores-core`; all
//! backend traffic goes through `sabores-gateway`.
//!
//! ## Module Organization
//! ```text
//! sabores_register/
//! ├── lib.rs          ◄─── You are here (startup, live and demo sessions)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── config.rs   ◄─── RegisterConfig (env → register.toml → defaults)
//! │   ├── session.rs  ◄─── Session + gateway
//! │   ├── catalog.rs  ◄─── Cached products and categories
//! │   ├── cart.rs     ◄─── Cart state management
//! │   └── checkout.rs ◄─── Current checkout flow
//! ├── commands/
//! │   ├── catalog.rs  ◄─── Catalog refresh
//! │   ├── cart.rs     ◄─── Cart manipulation
//! │   ├── checkout.rs ◄─── Payment, submission, reprint, correction
//! │   ├── closing.rs  ◄─── Cierre de caja
//! │   └── config.rs   ◄─── Configuration retrieval
//! ├── print.rs        ◄─── Fixed-width receipt renderer
//! └── error.rs        ◄─── API error type for commands
//! ```

pub mod commands;
pub mod error;
pub mod print;
pub mod state;

use std::io::{self, Write};
use std::sync::Arc;

use chrono::Local;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sabores_core::{PaymentMethod, Session, SessionUser, UserRole};
use sabores_gateway::{HttpBackend, InMemoryBackend, RestGateway};

use crate::commands::{cart, catalog, checkout, closing};
use crate::error::ApiError;
use crate::print::ReceiptPrinter;
use crate::state::{CartState, CatalogState, CheckoutState, RegisterConfig, SessionState};

/// Runs the register.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Load configuration ─── env SABORES_* → register.toml → defaults    │
/// │                                                                         │
/// │  2. Pick the backend ───── access token set?                           │
/// │                            ├─ yes: HttpBackend at backend_url (live)    │
/// │                            └─ no:  seeded InMemoryBackend (demo)        │
/// │                                                                         │
/// │  3. Initialize state ───── Session, Catalog, Cart, Checkout            │
/// │                                                                         │
/// │  4. Live: print the price list and today's closing                     │
/// │     Demo: ring up two sales, print receipts, close the register        │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> Result<(), ApiError> {
    info!("Starting 1000 Sabores register");

    let config = RegisterConfig::load()?;
    match config.access_token.clone() {
        Some(token) => run_live(&config, token).await,
        None => run_demo(&config).await,
    }
}

/// Read-only session against the REST backend: nothing is sold.
async fn run_live(config: &RegisterConfig, token: String) -> Result<(), ApiError> {
    let backend = HttpBackend::new(&config.backend_url)?;
    info!(backend = %backend.base_url(), "Using REST backend");

    let session = Session::from_token(token);
    let gateway = RestGateway::new(backend, session.clone());
    let session_state = SessionState::new(session, Arc::new(gateway));
    let catalog_state = CatalogState::new();

    catalog::refresh_catalog(&session_state, &catalog_state).await?;

    let printer = ReceiptPrinter::from_config(config);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let listing = catalog::get_catalog(&catalog_state);
    out.write_all(printer.render_price_list(&listing).as_bytes())
        .map_err(print_error)?;

    let report = closing::close_register(&session_state, Local::now().date_naive(), &Local).await?;
    writeln!(out).map_err(print_error)?;
    out.write_all(printer.render_closing(&report).as_bytes())
        .map_err(print_error)?;

    Ok(())
}

/// Demo session against the seeded in-memory backend.
async fn run_demo(config: &RegisterConfig) -> Result<(), ApiError> {
    info!("No access token configured, running the demo");

    let backend = InMemoryBackend::with_demo_catalog();
    backend.set_terminal_code(&config.terminal_name).await;
    backend.set_shipping_fee(config.shipping_fee()).await;

    let session = backend
        .issue_session(SessionUser {
            id: 2,
            rut: "11.111.111-1".to_string(),
            name: "Cajero Demo".to_string(),
            email: None,
            phone: None,
            role: UserRole::Admin,
        })
        .await;
    info!(terminal_id = %session.terminal_id, "Cashier logged in");

    let gateway = RestGateway::new(backend, session.clone());
    let checkout_state = CheckoutState::new(&session);
    let session_state = SessionState::new(session, Arc::new(gateway));
    let catalog_state = CatalogState::new();
    let cart_state = CartState::new();

    catalog::refresh_catalog(&session_state, &catalog_state).await?;

    let printer = ReceiptPrinter::from_config(config);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    // Two kuchen and an alfajor, paid in cash
    cart::add_to_cart(&catalog_state, &cart_state, 7, Some(2))?;
    cart::add_to_cart(&catalog_state, &cart_state, 8, None)?;
    checkout::open_payment(&session_state, &cart_state, &checkout_state)?;
    checkout::choose_payment(&cart_state, &checkout_state, PaymentMethod::Cash, Some(5000));
    let sale = checkout::submit_sale(&session_state, &cart_state, &checkout_state, config).await?;
    printer.print(&sale.receipt, &mut out).map_err(print_error)?;
    catalog::refresh_catalog(&session_state, &catalog_state).await?;

    // A mousse on debit
    cart::add_to_cart(&catalog_state, &cart_state, 5, None)?;
    checkout::open_payment(&session_state, &cart_state, &checkout_state)?;
    checkout::choose_payment(&cart_state, &checkout_state, PaymentMethod::Debit, None);
    let sale = checkout::submit_sale(&session_state, &cart_state, &checkout_state, config).await?;
    writeln!(out).map_err(print_error)?;
    printer.print(&sale.receipt, &mut out).map_err(print_error)?;

    let report = closing::close_register(&session_state, Local::now().date_naive(), &Local).await?;
    writeln!(out).map_err(print_error)?;
    out.write_all(printer.render_closing(&report).as_bytes())
        .map_err(print_error)?;

    Ok(())
}

fn print_error(err: io::Error) -> ApiError {
    ApiError::internal(format!("Printer error: {}", err))
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=sabores_gateway=trace` - Trace the gateway only
/// - Default: INFO, DEBUG for the sabores crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,sabores_core=debug,sabores_gateway=debug,sabores_register=debug")
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
