//! # Order Gateway Client
//!
//! The `OrderGateway` trait and its REST implementation.
//!
//! ## Endpoints
//! ```text
//! ┌──────────────────────────────┬──────────────────────────────────────────┐
//! │ Operation                    │ Backend call                             │
//! ├──────────────────────────────┼──────────────────────────────────────────┤
//! │ submit_order                 │ POST  /ventas                            │
//! │ fetch_catalog                │ GET   /productos                         │
//! │ fetch_categories             │ GET   /categorias                        │
//! │ update_payment_method        │ PATCH /ventas/{id}                       │
//! │ list_orders (seller)         │ GET   /ventas/mis-ventas                 │
//! │ list_orders (admin)          │ GET   /ventas                            │
//! └──────────────────────────────┴──────────────────────────────────────────┘
//! ```
//!
//! The session is handed over at construction; there is no shared client or
//! global auth header.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use sabores_core::{
    Category, Order, OrderSubmission, PaymentMethod, Product, Session, UserRole,
};

use crate::adapter::{normalize_order, normalize_orders};
use crate::backend::{Backend, BackendRequest};
use crate::error::{GatewayError, GatewayResult};
use crate::wire::{OrderRequest, PaymentMethodUpdate, RawCategory, RawOrderResponse, RawProduct};

/// Remote Order Gateway.
///
/// Every order returned has already been normalised by the adapter.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Submits a validated checkout. One attempt, no retry.
    async fn submit_order(&self, submission: &OrderSubmission) -> GatewayResult<Order>;

    /// Reads the product catalog.
    async fn fetch_catalog(&self) -> GatewayResult<Vec<Product>>;

    /// Reads the product categories.
    async fn fetch_categories(&self) -> GatewayResult<Vec<Category>>;

    /// Corrects the payment method of a stored order.
    async fn update_payment_method(
        &self,
        order_id: i64,
        method: PaymentMethod,
    ) -> GatewayResult<Order>;

    /// Orders visible to the session: own sales, or all for admins.
    async fn list_orders(&self) -> GatewayResult<Vec<Order>>;
}

/// [`OrderGateway`] speaking the backend's REST/JSON dialect over a
/// [`Backend`].
#[derive(Debug, Clone)]
pub struct RestGateway<B> {
    backend: B,
    session: Session,
}

impl<B: Backend> RestGateway<B> {
    pub fn new(backend: B, session: Session) -> Self {
        RestGateway { backend, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    async fn call(&self, request: BackendRequest) -> GatewayResult<Value> {
        let request = request.with_token(self.session.access_token.clone());
        debug!(method = ?request.method, path = %request.path, "Calling backend");
        self.backend.call(request).await
    }
}

fn as_array(value: Value, what: &str) -> GatewayResult<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(GatewayError::MalformedResponse(format!(
            "expected a list of {}, got {}",
            what, other
        ))),
    }
}

#[async_trait]
impl<B: Backend> OrderGateway for RestGateway<B> {
    async fn submit_order(&self, submission: &OrderSubmission) -> GatewayResult<Order> {
        let body = serde_json::to_value(OrderRequest::from_submission(submission))?;
        info!(
            terminal = %self.session.terminal_id,
            lines = submission.lines.len(),
            method = %submission.context.payment.method,
            "Submitting order"
        );

        let response = self.call(BackendRequest::post("/ventas", body)).await?;
        let raw = RawOrderResponse::from_json(response)?;
        let order = normalize_order(&raw, Some(&submission.context))?;

        info!(order_id = order.id, total = %order.total, "Order confirmed");
        Ok(order)
    }

    async fn fetch_catalog(&self) -> GatewayResult<Vec<Product>> {
        let response = self.call(BackendRequest::get("/productos")).await?;
        let products = as_array(response, "products")?
            .into_iter()
            .map(|item| serde_json::from_value::<RawProduct>(item).map(Product::from))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = products.len(), "Catalog loaded");
        Ok(products)
    }

    async fn fetch_categories(&self) -> GatewayResult<Vec<Category>> {
        let response = self.call(BackendRequest::get("/categorias")).await?;
        let categories = as_array(response, "categories")?
            .into_iter()
            .map(|item| serde_json::from_value::<RawCategory>(item).map(Category::from))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(categories)
    }

    async fn update_payment_method(
        &self,
        order_id: i64,
        method: PaymentMethod,
    ) -> GatewayResult<Order> {
        let body = serde_json::to_value(PaymentMethodUpdate { medio_pago: method })?;
        info!(order_id, method = %method, "Correcting payment method");

        let response = self
            .call(BackendRequest::patch(format!("/ventas/{}", order_id), body))
            .await?;
        normalize_order(&RawOrderResponse::from_json(response)?, None)
    }

    async fn list_orders(&self) -> GatewayResult<Vec<Order>> {
        let is_admin = self
            .session
            .user
            .as_ref()
            .map(|u| u.role == UserRole::Admin)
            .unwrap_or(false);
        let path = if is_admin { "/ventas" } else { "/ventas/mis-ventas" };

        let response = self.call(BackendRequest::get(path)).await?;
        let raw = as_array(response, "orders")?
            .into_iter()
            .map(RawOrderResponse::from_json)
            .collect::<Result<Vec<_>, _>>()?;
        normalize_orders(&raw)
    }
}
