//! # API Error Type
//!
//! Unified error type for register commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Register                           │
//! │                                                                         │
//! │  Command Function  →  Result<T, ApiError>                               │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Field invalid?     ─── ValidationError::Insufficient ──┐               │
//! │         │                                               │               │
//! │         ▼                                               ▼               │
//! │  Rule broken?       ─── CoreError::EmptyCart ─────── ApiError ────►    │
//! │         │                                               ▲               │
//! │         ▼                                               │               │
//! │  Backend failed?    ─── GatewayError::Rejected ─────────┘               │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Success ──────────────────────────────────────────────────────────►   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Errors serialise as `{ "code": "PAYMENT_ERROR", "message": "..." }` so a
//! front end can branch on the code and show the message as-is.

use serde::Serialize;

use sabores_core::{CoreError, ValidationError};
use sabores_gateway::{CheckoutError, GatewayError};

use crate::state::ConfigError;

/// API error returned from register commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Form field the message belongs to, for validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Business rule violated (422)
    BusinessLogic,

    /// Cart operation failed
    CartError,

    /// Insufficient stock
    InsufficientStock,

    /// Payment does not cover the amount due
    PaymentError,

    /// Session missing or expired (401)
    Unauthorized,

    /// Backend rejected or could not be reached
    BackendError,

    /// Configuration could not be loaded
    ConfigError,

    /// Internal error (500)
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            field: None,
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id.to_string()),
        )
    }

    /// Creates a cart error.
    pub fn cart(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::CartError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    fn with_field(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }
}

/// Converts field validation errors to API errors.
impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        let code = match err {
            ValidationError::Insufficient { .. } => ErrorCode::PaymentError,
            _ => ErrorCode::ValidationError,
        };
        let field = err.field().to_string();
        ApiError::new(code, err.to_string()).with_field(&field)
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            CoreError::QuantityTooLarge { .. } | CoreError::EmptyCart => {
                ApiError::cart(err.to_string())
            }
            CoreError::InvalidTransition { .. } => {
                ApiError::new(ErrorCode::BusinessLogic, err.to_string())
            }
            CoreError::Validation(e) => ApiError::from(e),
        }
    }
}

/// Converts gateway errors to API errors.
///
/// The message is the one the checkout banner shows, never the raw
/// transport detail.
impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match &err {
            GatewayError::NotFound { entity, id } => ApiError::not_found(entity, id),
            GatewayError::Unauthorized => ApiError::new(ErrorCode::Unauthorized, err.user_message()),
            GatewayError::MalformedResponse(detail) => {
                tracing::error!(%detail, "Backend returned an unreadable response");
                ApiError::new(ErrorCode::BackendError, err.user_message())
            }
            GatewayError::Rejected { .. } | GatewayError::Unreachable(_) => {
                ApiError::new(ErrorCode::BackendError, err.user_message())
            }
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Blocked(e) => ApiError::from(e),
            CheckoutError::Failed(e) => ApiError::from(e),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
