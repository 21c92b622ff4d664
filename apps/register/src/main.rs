//! # 1000 Sabores Register Entry Point
//!
//! Sets up logging and runs a register session. Receipts go to stdout,
//! logs to stderr.
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Load configuration
//! 3. Open the order gateway and log in
//! 4. Create state objects
//! 5. Ring up sales and print receipts
//! 6. Close the register

#[tokio::main]
async fn main() {
    sabores_register::init_tracing();

    // The actual setup is in lib.rs for better testability
    if let Err(err) = sabores_register::run().await {
        tracing::error!(code = ?err.code, "{}", err.message);
        std::process::exit(1);
    }
}
