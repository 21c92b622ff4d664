//! # Gateway Error Types
//!
//! Error types for calls to the remote backend.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  Backend status / network failure / bad JSON                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  GatewayError (this module) ← Categorised                              │
//! │       │                                                                 │
//! │       ├──► service::submit_checkout → CheckoutFlow::fail(user_message) │
//! │       │                                                                 │
//! │       └──► ApiError (register app) ← Serialized for the UI             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant is recoverable: the cart is kept and the user may retry.

use thiserror::Error;

/// Generic text shown when the backend gave no usable message.
pub const GENERIC_FAILURE_MESSAGE: &str = "Error al procesar el pedido";

/// Remote backend errors.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The backend answered with a non-success status.
    ///
    /// ## When This Occurs
    /// - Stock no longer sufficient at submission time
    /// - Server-side validation of the order failed
    #[error("Backend rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Missing or expired access token.
    #[error("Not authenticated")]
    Unauthorized,

    /// The backend could not be reached.
    ///
    /// ## When This Occurs
    /// - Network down, DNS failure, server not running
    /// - Reference backend switched offline
    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    /// The response body did not match any accepted shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Requested entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },
}

impl GatewayError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        GatewayError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Rejected error.
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        GatewayError::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Message for the checkout error banner.
    ///
    /// Server rejections are shown verbatim; everything else gets a generic
    /// text.
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Rejected { message, .. } if !message.trim().is_empty() => {
                message.clone()
            }
            GatewayError::Unauthorized => {
                "Tu sesión expiró. Inicia sesión nuevamente.".to_string()
            }
            GatewayError::Unreachable(_) => {
                "No se pudo conectar con el servidor. Intenta nuevamente.".to_string()
            }
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Convert serde_json errors to GatewayError.
impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::MalformedResponse(err.to_string())
    }
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
