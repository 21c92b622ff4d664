//! # Wire Format
//!
//! JSON shapes exchanged with the backend. Field names are the backend's
//! (Spanish, camelCase).
//!
//! Responses are read leniently: every field is optional and several fields
//! come in more than one shape. Turning a `Raw*` value into a domain type is
//! the adapter's job, not this module's.
//!
//! ## Order Response Shapes
//! ```text
//! nested (current)                      flat (legacy)
//! ─────────────────                     ─────────────
//! {                                     {
//!   "id": 42,                             "id": 42,
//!   "folio": "20251130-01-0042",          "boleta": "B-0042",
//!   "resumen": {                          "montoTotal": 3200,
//!     "neto": 2689, "iva": 511,           "metodoPago": "DEBITO",
//!     "total": 3200,                      "detalles": [{
//!     "medioPago": "EFECTIVO",              "producto": {"nombre": ..},
//!     "montoEntregado": 5000,               "cantidad": 2, ...
//!     "vuelto": 1800                      }]
//!   },                                  }
//!   "items": [{"producto": "Torta",..}]
//! }
//! ```

use serde::{Deserialize, Serialize};

use sabores_core::{
    Category, DeliveryType, LineRequest, Money, OrderSubmission, PaymentMethod, Product,
    SaleOrigin,
};

// =============================================================================
// Lenient Scalars
// =============================================================================

/// A number that may arrive as an integer, a float or a numeric string
/// (`"3200.00"` from DECIMAL columns).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WireNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

impl WireNumber {
    /// Whole pesos, rounding any fraction half away from zero.
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            WireNumber::Int(n) => Some(*n),
            WireNumber::Float(f) if f.is_finite() => Some(f.round() as i64),
            WireNumber::Float(_) => None,
            WireNumber::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.round() as i64))
            }
        }
    }

    pub fn to_money(&self) -> Option<Money> {
        self.to_i64().map(Money::from_pesos)
    }
}

/// Reads an optional lenient amount as money.
pub fn money(value: &Option<WireNumber>) -> Option<Money> {
    value.as_ref().and_then(WireNumber::to_money)
}

// =============================================================================
// Requests
// =============================================================================

/// One `items[]` entry of `POST /ventas`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireLineRequest {
    pub producto_id: i64,
    pub cantidad: i64,
}

impl From<LineRequest> for WireLineRequest {
    fn from(line: LineRequest) -> Self {
        WireLineRequest {
            producto_id: line.product_id,
            cantidad: line.quantity,
        }
    }
}

/// Body of `POST /ventas`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub items: Vec<WireLineRequest>,
    pub medio_pago: PaymentMethod,
    pub tipo_entrega: DeliveryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direccion_despacho: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monto_entregado: Option<i64>,
    #[serde(default)]
    pub costo_envio: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notas_cliente: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cliente_nombre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cliente_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cliente_telefono: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cliente_rut: Option<String>,
}

impl OrderRequest {
    /// Builds the request body for a validated submission.
    ///
    /// `montoEntregado` carries the tendered cash; register sales paid by
    /// card report the grand total instead.
    pub fn from_submission(submission: &OrderSubmission) -> Self {
        let ctx = &submission.context;
        let monto_entregado = match (ctx.payment.method, ctx.origin) {
            (PaymentMethod::Cash, _) => ctx.payment.tendered,
            (_, SaleOrigin::Register) => Some(ctx.quote.grand_total),
            (_, SaleOrigin::Storefront) => None,
        };
        let contact = submission.contact.as_ref();

        OrderRequest {
            items: submission.lines.iter().copied().map(Into::into).collect(),
            medio_pago: ctx.payment.method,
            tipo_entrega: ctx.delivery.kind,
            direccion_despacho: ctx.delivery.address.clone(),
            monto_entregado: monto_entregado.map(|m| m.pesos()),
            costo_envio: ctx.quote.shipping.pesos(),
            notas_cliente: ctx.notes.clone(),
            cliente_nombre: contact.map(|c| c.name.clone()),
            cliente_email: contact.map(|c| c.email.clone()),
            cliente_telefono: contact.and_then(|c| c.phone.clone()),
            cliente_rut: contact.and_then(|c| c.rut.clone()),
        }
    }
}

/// Body of `PATCH /ventas/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodUpdate {
    pub medio_pago: PaymentMethod,
}

// =============================================================================
// Order Response
// =============================================================================

/// A person object (`vendedor`, `cliente`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPerson {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub nombre: Option<String>,
    pub email: Option<String>,
    pub rut: Option<String>,
    pub rol: Option<String>,
}

impl RawPerson {
    /// `name`, then `nombre`, ignoring blanks.
    pub fn display_name(&self) -> Option<&str> {
        [self.name.as_deref(), self.nombre.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|n| !n.is_empty())
    }
}

/// `cliente` is either a bare label or a user object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawBuyer {
    Label(String),
    Person(RawPerson),
}

/// `producto` on a line is either the product name or a product object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawLineProduct {
    Name(String),
    Product {
        #[serde(default)]
        id: Option<i64>,
        #[serde(default)]
        nombre: Option<String>,
        #[serde(default)]
        precio: Option<WireNumber>,
    },
}

/// One `items[]` / `detalles[]` entry of an order response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLine {
    pub producto_id: Option<i64>,
    pub producto: Option<RawLineProduct>,
    pub nombre: Option<String>,
    pub cantidad: Option<WireNumber>,
    pub precio_unitario: Option<WireNumber>,
    pub subtotal: Option<WireNumber>,
}

/// The nested `resumen` object.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSummary {
    pub subtotal: Option<WireNumber>,
    pub neto: Option<WireNumber>,
    pub iva: Option<WireNumber>,
    pub total: Option<WireNumber>,
    pub costo_envio: Option<WireNumber>,
    pub medio_pago: Option<String>,
    pub monto_entregado: Option<WireNumber>,
    pub vuelto: Option<WireNumber>,
}

/// Any accepted order response shape.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOrderResponse {
    pub id: Option<i64>,

    pub folio: Option<String>,
    pub boleta: Option<String>,
    pub numero_boleta: Option<String>,

    pub fecha: Option<String>,
    pub created_at: Option<String>,

    pub vendedor: Option<RawPerson>,
    pub cliente: Option<RawBuyer>,

    pub items: Option<Vec<RawLine>>,
    pub detalles: Option<Vec<RawLine>>,

    pub resumen: Option<RawSummary>,

    pub subtotal: Option<WireNumber>,
    pub neto: Option<WireNumber>,
    pub iva: Option<WireNumber>,
    pub total: Option<WireNumber>,
    pub monto_total: Option<WireNumber>,
    pub costo_envio: Option<WireNumber>,

    pub medio_pago: Option<String>,
    pub metodo_pago: Option<String>,
    pub monto_entregado: Option<WireNumber>,
    pub vuelto: Option<WireNumber>,

    pub tipo_entrega: Option<String>,
    pub direccion_entrega: Option<String>,
    pub direccion_despacho: Option<String>,

    pub notas: Option<String>,
    pub notas_cliente: Option<String>,

    pub estado_pedido: Option<String>,
}

impl RawOrderResponse {
    pub fn from_json(value: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    /// `items`, or `detalles` when `items` is absent.
    pub fn lines(&self) -> &[RawLine] {
        self.items
            .as_deref()
            .or(self.detalles.as_deref())
            .unwrap_or(&[])
    }
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCategory {
    pub id: i64,
    #[serde(default)]
    pub nombre: String,
    pub descripcion: Option<String>,
}

impl From<RawCategory> for Category {
    fn from(raw: RawCategory) -> Self {
        Category {
            id: raw.id,
            name: raw.nombre,
            description: raw.descripcion,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProduct {
    pub id: i64,
    #[serde(default)]
    pub nombre: String,
    pub descripcion: Option<String>,
    pub precio: Option<WireNumber>,
    pub stock: Option<WireNumber>,
    pub imagen: Option<String>,
    pub foto_url: Option<String>,
    pub categoria: Option<RawCategory>,
    pub categoria_id: Option<i64>,
}

impl From<RawProduct> for Product {
    fn from(raw: RawProduct) -> Self {
        Product {
            id: raw.id,
            name: raw.nombre,
            description: raw.descripcion,
            price: money(&raw.precio).unwrap_or_default(),
            stock: raw.stock.as_ref().and_then(WireNumber::to_i64).unwrap_or(0).max(0),
            category_id: raw.categoria_id.or(raw.categoria.map(|c| c.id)),
            image_url: raw.imagen.or(raw.foto_url),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sabores_core::{Cart, CheckoutFlow, PaymentInput, Session};
    use serde_json::json;

    #[test]
    fn test_wire_number_shapes() {
        let parsed: Vec<WireNumber> = serde_json::from_value(json!([3200, 3200.4, "3200.00", "x"])).unwrap();
        assert_eq!(parsed[0].to_i64(), Some(3200));
        assert_eq!(parsed[1].to_i64(), Some(3200));
        assert_eq!(parsed[2].to_i64(), Some(3200));
        assert_eq!(parsed[3].to_i64(), None);
    }

    #[test]
    fn test_cliente_string_or_object() {
        let as_label: RawOrderResponse = RawOrderResponse::from_json(json!({"id": 1, "cliente": "Mostrador"})).unwrap();
        assert_eq!(as_label.cliente, Some(RawBuyer::Label("Mostrador".to_string())));

        let as_person = RawOrderResponse::from_json(json!({
            "id": 1,
            "cliente": {"nombre": "Ana", "email": "ana@mail.cl", "rut": "12.345.678-5"}
        }))
        .unwrap();
        match as_person.cliente {
            Some(RawBuyer::Person(p)) => assert_eq!(p.display_name(), Some("Ana")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_lines_prefer_items_over_detalles() {
        let raw = RawOrderResponse::from_json(json!({
            "id": 1,
            "detalles": [{"producto": {"nombre": "Kuchen"}, "cantidad": 1}]
        }))
        .unwrap();
        assert_eq!(raw.lines().len(), 1);
        assert!(matches!(raw.lines()[0].producto, Some(RawLineProduct::Product { .. })));

        let raw = RawOrderResponse::from_json(json!({
            "id": 1,
            "items": [{"producto": "Torta", "cantidad": 2}],
            "detalles": []
        }))
        .unwrap();
        assert_eq!(raw.lines()[0].producto, Some(RawLineProduct::Name("Torta".to_string())));
    }

    #[test]
    fn test_product_from_wire() {
        let raw: RawProduct = serde_json::from_value(json!({
            "id": 5,
            "nombre": "Pie de Limón",
            "precio": "4500.00",
            "stock": 8,
            "fotoUrl": "/img/pie.jpg",
            "categoria": {"id": 2, "nombre": "Tartas"}
        }))
        .unwrap();
        let product = Product::from(raw);
        assert_eq!(product.price.pesos(), 4500);
        assert_eq!(product.category_id, Some(2));
        assert_eq!(product.image_url.as_deref(), Some("/img/pie.jpg"));
    }

    fn cart() -> Cart {
        let mut cart = Cart::new();
        cart.add_item(&Product {
            id: 1,
            name: "Torta".to_string(),
            description: None,
            price: Money::from_pesos(1200),
            stock: 5,
            category_id: None,
            image_url: None,
        });
        cart
    }

    #[test]
    fn test_register_card_sale_reports_total_as_tendered() {
        let mut flow = CheckoutFlow::for_register(&Session::anonymous());
        flow.set_payment(PaymentInput::card(PaymentMethod::Debit));
        let submission = flow.begin_submit(&cart(), Utc::now()).unwrap();

        let body = serde_json::to_value(OrderRequest::from_submission(&submission)).unwrap();
        assert_eq!(body["items"], json!([{"productoId": 1, "cantidad": 1}]));
        assert_eq!(body["medioPago"], "DEBITO");
        assert_eq!(body["tipoEntrega"], "RETIRO");
        assert_eq!(body["montoEntregado"], 1200);
        assert_eq!(body["costoEnvio"], 0);
        assert!(body.get("clienteNombre").is_none());
    }

    #[test]
    fn test_register_cash_sale_reports_tendered() {
        let mut flow = CheckoutFlow::for_register(&Session::anonymous());
        flow.set_payment(PaymentInput::cash(Money::from_pesos(2000)));
        let submission = flow.begin_submit(&cart(), Utc::now()).unwrap();

        let request = OrderRequest::from_submission(&submission);
        assert_eq!(request.medio_pago, PaymentMethod::Cash);
        assert_eq!(request.monto_entregado, Some(2000));
    }
}
