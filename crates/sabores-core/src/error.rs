//! # Error Types
//!
//! Domain-specific error types for sabores-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  sabores-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule failures                         │
//! │  └── ValidationError  - Field-level input failures                     │
//! │                                                                         │
//! │  sabores-gateway errors (separate crate)                               │
//! │  └── GatewayError     - Backend rejected / unreachable                 │
//! │                                                                         │
//! │  Register API errors (in app)                                          │
//! │  └── ApiError         - What the UI sees (serialized)                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → UI                     │
//! │        GatewayError ──────────────→ CheckoutFlow error banner          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart mutations never fail; invalid input is absorbed as a no-op. Errors
//! here come from validation, stock hints and the checkout state machine.

use thiserror::Error;

use crate::checkout::CheckoutStep;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Not enough cached stock for the requested quantity.
    ///
    /// ## When This Occurs
    /// - UI pre-check before `add_item` / `set_quantity`
    ///
    /// Advisory only. The server re-checks at submission time.
    ///
    /// ## User Workflow
    /// ```text
    /// Tap "Torta Tres Leches" (stock: 2, in cart: 2)
    ///      │
    ///      ▼
    /// check_stock → available 0, requested 3
    ///      │
    ///      ▼
    /// UI shows: "Stock insuficiente"
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// Item quantity exceeds the per-line maximum.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Checkout attempted with no lines in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// The checkout state machine refused a transition.
    ///
    /// ## When This Occurs
    /// - `back()` from SUBMITTING or CONFIRMED
    /// - `begin_submit()` outside CHOOSING_PAYMENT
    /// - `complete()` / `fail()` without a submission in flight
    #[error("Cannot {action} while checkout is {from:?}")]
    InvalidTransition { from: CheckoutStep, action: &'static str },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Every variant names the form field it belongs to so the UI can show the
/// message next to it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (email, RUT, date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// An amount falls short of what is required (cash tendered < total).
    #[error("{field} must be at least {required}, got {provided}")]
    Insufficient {
        field: String,
        required: i64,
        provided: i64,
    },
}

impl ValidationError {
    /// The form field this error belongs to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. }
            | ValidationError::Insufficient { field, .. } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
