//! Transport seam between the gateway client and the REST backend.
//!
//! A [`Backend`] takes one JSON request and answers with one JSON body or a
//! [`GatewayError`]. The client never sees status codes or sockets.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::GatewayResult;

/// HTTP verbs the client uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
}

/// One call to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendRequest {
    pub method: Method,
    /// Path relative to the API root, e.g. `/ventas`.
    pub path: String,
    /// Bearer token from the session, when logged in.
    pub token: Option<String>,
    pub body: Option<Value>,
}

impl BackendRequest {
    pub fn get(path: impl Into<String>) -> Self {
        BackendRequest {
            method: Method::Get,
            path: path.into(),
            token: None,
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        BackendRequest {
            method: Method::Post,
            path: path.into(),
            token: None,
            body: Some(body),
        }
    }

    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        BackendRequest {
            method: Method::Patch,
            path: path.into(),
            token: None,
            body: Some(body),
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }
}

/// Something that can answer backend requests.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn call(&self, request: BackendRequest) -> GatewayResult<Value>;
}
