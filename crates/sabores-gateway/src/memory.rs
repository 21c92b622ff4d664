//! # In-Memory Backend
//!
//! A stand-in for the REST backend that answers the same routes with the
//! same JSON shapes. Used by the demo binary and by the scenario tests.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     POST /ventas                                        │
//! │                                                                         │
//! │  1. AUTH      token must belong to a registered user  → 401            │
//! │  2. VALIDATE  every product exists, qty >= 1           → 404 / 400      │
//! │               stock covers qty                         → 400            │
//! │               cash covers total                        → 400            │
//! │  3. PRICE     server prices, shared IVA split                           │
//! │  4. COMMIT    decrement stock, next id, daily folio                     │
//! │  5. RESPOND   nested `resumen` or flat legacy shape                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Folios look like `YYYYMMDD-TT-NNNN`: issue date, terminal code and a
//! per-day sequence.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use sabores_core::{
    Category, DeliveryType, IvaBreakdown, Money, OrderStatus, PaymentMethod, Product, Session,
    SessionUser, UserRole,
};

use crate::backend::{Backend, BackendRequest, Method};
use crate::error::{GatewayError, GatewayResult};
use crate::seed::{demo_categories, demo_products};
use crate::wire::{OrderRequest, PaymentMethodUpdate};

/// Which order JSON layout the backend answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseShape {
    /// Totals inside a nested `resumen` object.
    #[default]
    Nested,
    /// Older flat layout: `montoTotal`, `metodoPago`, `detalles`, no net/IVA.
    Flat,
}

#[derive(Debug, Clone)]
struct StoredLine {
    product_id: i64,
    name: String,
    quantity: i64,
    unit_price: Money,
}

impl StoredLine {
    fn subtotal(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

#[derive(Debug, Clone)]
struct StoredOrder {
    id: i64,
    folio: String,
    issued_at: DateTime<Utc>,
    seller: SessionUser,
    buyer: Option<Value>,
    lines: Vec<StoredLine>,
    method: PaymentMethod,
    tendered: Option<Money>,
    shipping: Money,
    delivery: DeliveryType,
    address: Option<String>,
    notes: Option<String>,
    status: OrderStatus,
}

impl StoredOrder {
    fn subtotal(&self) -> Money {
        self.lines.iter().map(StoredLine::subtotal).sum()
    }

    fn total(&self) -> Money {
        self.subtotal() + self.shipping
    }

    fn change(&self) -> Option<Money> {
        self.tendered.map(|t| t.saturating_diff(self.total()))
    }

    fn seller_json(&self) -> Value {
        json!({
            "id": self.seller.id,
            "nombre": self.seller.name,
            "rut": self.seller.rut,
            "rol": match self.seller.role {
                UserRole::Admin => "admin",
                UserRole::Customer => "cliente",
            },
        })
    }

    fn to_json(&self, shape: ResponseShape) -> Value {
        let split = IvaBreakdown::from_gross(self.subtotal());
        let total = self.total();

        match shape {
            ResponseShape::Nested => json!({
                "id": self.id,
                "folio": self.folio,
                "fecha": self.issued_at.to_rfc3339(),
                "vendedor": self.seller_json(),
                "cliente": self.buyer,
                "items": self.lines.iter().map(|l| json!({
                    "productoId": l.product_id,
                    "producto": l.name,
                    "cantidad": l.quantity,
                    "precioUnitario": l.unit_price.pesos(),
                    "subtotal": l.subtotal().pesos(),
                })).collect::<Vec<_>>(),
                "resumen": {
                    "subtotal": split.gross.pesos(),
                    "neto": split.net.pesos(),
                    "iva": split.tax.pesos(),
                    "costoEnvio": self.shipping.pesos(),
                    "total": total.pesos(),
                    "medioPago": self.method.label(),
                    "montoEntregado": self.tendered.map(|m| m.pesos()),
                    "vuelto": self.change().map(|m| m.pesos()),
                },
                "tipoEntrega": self.delivery.wire_name(),
                "direccionEntrega": self.address,
                "notas": self.notes,
                "estadoPedido": self.status,
            }),
            ResponseShape::Flat => json!({
                "id": self.id,
                "boleta": self.folio,
                "fecha": self.issued_at.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
                "vendedor": self.seller_json(),
                "cliente": self.buyer,
                "detalles": self.lines.iter().map(|l| json!({
                    "productoId": l.product_id,
                    "producto": {"id": l.product_id, "nombre": l.name, "precio": l.unit_price.pesos()},
                    "cantidad": l.quantity,
                    "precioUnitario": l.unit_price.pesos(),
                    "subtotal": l.subtotal().pesos(),
                })).collect::<Vec<_>>(),
                "subtotal": split.gross.pesos(),
                "costoEnvio": self.shipping.pesos(),
                "montoTotal": total.pesos(),
                "metodoPago": self.method.label(),
                "montoEntregado": self.tendered.map(|m| m.pesos()),
                "vuelto": self.change().map(|m| m.pesos()),
                "tipoEntrega": self.delivery.wire_name(),
                "direccionEntrega": self.address,
                "notas": self.notes,
                "estadoPedido": self.status,
            }),
        }
    }
}

#[derive(Debug)]
struct State {
    products: Vec<Product>,
    categories: Vec<Category>,
    orders: Vec<StoredOrder>,
    tokens: HashMap<String, SessionUser>,
    daily_sequence: HashMap<NaiveDate, u32>,
    next_order_id: i64,
    terminal_code: String,
    shipping_fee: Money,
    shape: ResponseShape,
    offline: bool,
}

/// Reference backend holding catalog, users and orders in memory.
///
/// Cloning shares the same state.
#[derive(Debug, Clone)]
pub struct InMemoryBackend {
    state: Arc<Mutex<State>>,
}

impl InMemoryBackend {
    /// An empty backend.
    pub fn new(products: Vec<Product>, categories: Vec<Category>) -> Self {
        InMemoryBackend {
            state: Arc::new(Mutex::new(State {
                products,
                categories,
                orders: Vec::new(),
                tokens: HashMap::new(),
                daily_sequence: HashMap::new(),
                next_order_id: 1,
                terminal_code: "01".to_string(),
                shipping_fee: sabores_core::checkout::DEFAULT_SHIPPING_FEE,
                shape: ResponseShape::Nested,
                offline: false,
            })),
        }
    }

    /// A backend seeded with the bakery demo catalog.
    pub fn with_demo_catalog() -> Self {
        Self::new(demo_products(), demo_categories())
    }

    /// Registers `user` and returns a session carrying a fresh token.
    pub async fn issue_session(&self, user: SessionUser) -> Session {
        let token = Uuid::new_v4().simple().to_string();
        self.state.lock().await.tokens.insert(token.clone(), user.clone());
        Session::authenticated(token, user)
    }

    /// Sets the two-character terminal code used in folios.
    pub async fn set_terminal_code(&self, code: &str) {
        let code: String = code.chars().rev().take(2).collect::<Vec<_>>().into_iter().rev().collect();
        self.state.lock().await.terminal_code = format!("{:0>2}", code);
    }

    pub async fn set_shipping_fee(&self, fee: Money) {
        self.state.lock().await.shipping_fee = fee;
    }

    pub async fn set_response_shape(&self, shape: ResponseShape) {
        self.state.lock().await.shape = shape;
    }

    /// Simulates a network outage.
    pub async fn set_offline(&self, offline: bool) {
        self.state.lock().await.offline = offline;
    }

    /// Current cached stock of a product, for assertions and demos.
    pub async fn stock_of(&self, product_id: i64) -> Option<i64> {
        let state = self.state.lock().await;
        state.products.iter().find(|p| p.id == product_id).map(|p| p.stock)
    }

    /// Changes a product's stock (another terminal sold it, restock, ...).
    pub async fn set_stock(&self, product_id: i64, stock: i64) {
        let mut state = self.state.lock().await;
        if let Some(product) = state.products.iter_mut().find(|p| p.id == product_id) {
            product.stock = stock;
        }
    }

    pub async fn order_count(&self) -> usize {
        self.state.lock().await.orders.len()
    }
}

// =============================================================================
// Routing
// =============================================================================

#[async_trait]
impl Backend for InMemoryBackend {
    async fn call(&self, request: BackendRequest) -> GatewayResult<Value> {
        let mut state = self.state.lock().await;

        if state.offline {
            warn!(path = %request.path, "Backend offline");
            return Err(GatewayError::Unreachable("connection refused".to_string()));
        }

        let segments: Vec<&str> = request.path.trim_matches('/').split('/').collect();
        match (request.method, segments.as_slice()) {
            (Method::Get, ["productos"]) => Ok(json!(state
                .products
                .iter()
                .map(product_json)
                .collect::<Vec<_>>())),
            (Method::Get, ["categorias"]) => Ok(json!(state
                .categories
                .iter()
                .map(|c| json!({"id": c.id, "nombre": c.name, "descripcion": c.description}))
                .collect::<Vec<_>>())),
            (Method::Post, ["ventas"]) => {
                let user = state.authenticate(&request)?;
                let body: OrderRequest = parse_body(&request)?;
                state.create_order(user, body, Utc::now())
            }
            (Method::Patch, ["ventas", id]) => {
                state.authenticate(&request)?;
                let id: i64 = id
                    .parse()
                    .map_err(|_| GatewayError::rejected(400, "Id de venta inválido"))?;
                let body: PaymentMethodUpdate = parse_body(&request)?;
                state.update_payment_method(id, body.medio_pago)
            }
            (Method::Get, ["ventas", "mis-ventas"]) => {
                let user = state.authenticate(&request)?;
                let shape = state.shape;
                Ok(json!(state
                    .orders
                    .iter()
                    .filter(|o| o.seller.id == user.id)
                    .map(|o| o.to_json(shape))
                    .collect::<Vec<_>>()))
            }
            (Method::Get, ["ventas"]) => {
                let user = state.authenticate(&request)?;
                if user.role != UserRole::Admin {
                    return Err(GatewayError::rejected(403, "Acceso denegado"));
                }
                let shape = state.shape;
                Ok(json!(state.orders.iter().map(|o| o.to_json(shape)).collect::<Vec<_>>()))
            }
            _ => Err(GatewayError::not_found("Route", &request.path)),
        }
    }
}

fn parse_body<T: serde::de::DeserializeOwned>(request: &BackendRequest) -> GatewayResult<T> {
    let body = request
        .body
        .clone()
        .ok_or_else(|| GatewayError::rejected(400, "Cuerpo de la solicitud vacío"))?;
    serde_json::from_value(body).map_err(|e| GatewayError::rejected(400, e.to_string()))
}

fn product_json(p: &Product) -> Value {
    json!({
        "id": p.id,
        "nombre": p.name,
        "descripcion": p.description,
        "precio": p.price.pesos(),
        "stock": p.stock,
        "imagen": p.image_url,
        "categoriaId": p.category_id,
    })
}

impl State {
    fn authenticate(&self, request: &BackendRequest) -> GatewayResult<SessionUser> {
        request
            .token
            .as_ref()
            .and_then(|t| self.tokens.get(t))
            .cloned()
            .ok_or(GatewayError::Unauthorized)
    }

    fn next_folio(&mut self, at: DateTime<Utc>) -> String {
        let day = at.date_naive();
        let seq = self.daily_sequence.entry(day).or_insert(0);
        *seq += 1;
        format!("{}-{}-{:04}", day.format("%Y%m%d"), self.terminal_code, seq)
    }

    fn create_order(
        &mut self,
        seller: SessionUser,
        body: OrderRequest,
        now: DateTime<Utc>,
    ) -> GatewayResult<Value> {
        if body.items.is_empty() {
            return Err(GatewayError::rejected(400, "La venta no tiene productos"));
        }

        // Validate everything before touching stock
        let mut lines = Vec::with_capacity(body.items.len());
        for item in &body.items {
            if item.cantidad < 1 {
                return Err(GatewayError::rejected(400, "Cantidad inválida"));
            }
            let product = self
                .products
                .iter()
                .find(|p| p.id == item.producto_id)
                .ok_or_else(|| GatewayError::not_found("Producto", item.producto_id))?;
            if product.stock < item.cantidad {
                return Err(GatewayError::rejected(
                    400,
                    format!(
                        "Stock insuficiente para {} (disponible: {})",
                        product.name, product.stock
                    ),
                ));
            }
            lines.push(StoredLine {
                product_id: product.id,
                name: product.name.clone(),
                quantity: item.cantidad,
                unit_price: product.price,
            });
        }

        let shipping = match body.tipo_entrega {
            DeliveryType::Ship => self.shipping_fee,
            DeliveryType::Pickup => Money::zero(),
        };
        if body.tipo_entrega == DeliveryType::Ship
            && body.direccion_despacho.as_deref().map(str::trim).unwrap_or("").is_empty()
        {
            return Err(GatewayError::rejected(400, "Dirección de despacho requerida"));
        }

        let total = lines.iter().map(StoredLine::subtotal).sum::<Money>() + shipping;
        let tendered = match body.medio_pago {
            PaymentMethod::Cash => {
                let tendered = Money::from_pesos(body.monto_entregado.unwrap_or(total.pesos()));
                if tendered < total {
                    return Err(GatewayError::rejected(400, "El monto entregado es menor al total"));
                }
                Some(tendered)
            }
            PaymentMethod::Debit | PaymentMethod::Credit => None,
        };

        // Commit
        for line in &lines {
            if let Some(product) = self.products.iter_mut().find(|p| p.id == line.product_id) {
                product.stock -= line.quantity;
            }
        }

        let buyer = body.cliente_nombre.as_ref().map(|name| {
            json!({
                "nombre": name,
                "email": body.cliente_email,
                "rut": body.cliente_rut,
                "telefono": body.cliente_telefono,
            })
        });

        let id = self.next_order_id;
        self.next_order_id += 1;
        let folio = self.next_folio(now);

        let order = StoredOrder {
            id,
            folio,
            issued_at: now,
            seller,
            buyer,
            lines,
            method: body.medio_pago,
            tendered,
            shipping,
            delivery: body.tipo_entrega,
            address: body.direccion_despacho,
            notes: body.notas_cliente,
            status: OrderStatus::Pending,
        };

        info!(order_id = id, folio = %order.folio, total = %order.total(), "Order stored");
        let response = order.to_json(self.shape);
        self.orders.push(order);
        Ok(response)
    }

    fn update_payment_method(&mut self, id: i64, method: PaymentMethod) -> GatewayResult<Value> {
        let shape = self.shape;
        let order = self
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| GatewayError::not_found("Venta", id))?;

        debug!(order_id = id, from = %order.method, to = %method, "Updating payment method");
        order.method = method;
        order.tendered = match method {
            PaymentMethod::Cash => Some(order.tendered.unwrap_or_else(|| order.total())),
            PaymentMethod::Debit | PaymentMethod::Credit => None,
        };
        Ok(order.to_json(shape))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
