//! # HTTP Backend
//!
//! [`Backend`] over the real REST API with `reqwest`.
//!
//! ## Status Mapping
//! ```text
//! ┌──────────────────────────┬──────────────────────────────────────────────┐
//! │ Response                 │ Result                                       │
//! ├──────────────────────────┼──────────────────────────────────────────────┤
//! │ 2xx                      │ Ok(JSON body), empty body → null             │
//! │ 401 / 403                │ GatewayError::Unauthorized                   │
//! │ 404                      │ GatewayError::NotFound                       │
//! │ anything else            │ GatewayError::Rejected { status, message }   │
//! │ connect / timeout / read │ GatewayError::Unreachable                    │
//! └──────────────────────────┴──────────────────────────────────────────────┘
//! ```
//!
//! The server's `message` (or `error`) field becomes the rejection text, so
//! "Stock insuficiente ..." reaches the checkout banner verbatim.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::backend::{Backend, BackendRequest, Method};
use crate::error::{GatewayError, GatewayResult};

/// Per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// The REST backend reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: Url,
    client: Client,
}

impl HttpBackend {
    /// Creates a backend rooted at `base_url`, e.g. `http://localhost:8080/api`.
    pub fn new(base_url: &str) -> GatewayResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            GatewayError::Unreachable(format!("invalid backend url {}: {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::Unreachable(format!(
                "invalid backend url {}",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Unreachable(format!("http client: {}", e)))?;

        Ok(HttpBackend { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `base_url` + `path`, keeping the base's own path segments.
    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn auth_headers(token: Option<&str>) -> GatewayResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| GatewayError::Unauthorized)?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    #[instrument(name = "http_backend_call", skip(self, request), fields(method = ?request.method, path = %request.path))]
    async fn call(&self, request: BackendRequest) -> GatewayResult<Value> {
        let url = self.url(&request.path);
        let builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Patch => self.client.patch(&url),
        };
        let mut builder = builder.headers(Self::auth_headers(request.token.as_deref())?);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, "Backend request failed");
            GatewayError::Unreachable(e.to_string())
        })?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| GatewayError::Unreachable(format!("reading response: {}", e)))?;

        debug!(status = status.as_u16(), bytes = body.len(), "Backend responded");
        interpret_response(status, &body, &request.path)
    }
}

/// Maps a status and raw body to the gateway's result.
fn interpret_response(status: StatusCode, body: &[u8], path: &str) -> GatewayResult<Value> {
    if status.is_success() {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        return Ok(serde_json::from_slice(body)?);
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(GatewayError::Unauthorized),
        StatusCode::NOT_FOUND => Err(GatewayError::not_found("Recurso", path)),
        _ => Err(GatewayError::rejected(status.as_u16(), error_message(body))),
    }
}

/// The server's explanation, from `message`/`error` or the raw text.
fn error_message(body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        for key in ["message", "error"] {
            if let Some(text) = value.get(key).and_then(Value::as_str) {
                return text.to_string();
            }
        }
    }
    String::from_utf8_lossy(body).trim().to_string()
}
