//! # Response Adapter
//!
//! The single place where backend order responses become a canonical
//! [`Order`].
//!
//! ## Fallback Precedence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  For each field, the first value present wins:                         │
//! │                                                                         │
//! │   1. server nested summary     resumen.total, resumen.medioPago, ...    │
//! │   2. server flat legacy field  total / montoTotal, metodoPago, ...      │
//! │   3. client pre-submission     SubmissionContext (quote, payment, ...)  │
//! │   4. default                   0, EFECTIVO, guest buyer                 │
//! │                                                                         │
//! │  Without a context (reprint of a stored order) net/tax missing from    │
//! │  the response are derived from the total with the shared IVA split.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use sabores_core::dates::parse_timestamp;
use sabores_core::{
    Buyer, Delivery, DeliveryType, IvaBreakdown, Order, OrderLine, OrderStatus, PaymentMethod,
    SaleOrigin, Seller, SubmissionContext,
};

use crate::error::{GatewayError, GatewayResult};
use crate::wire::{money, RawBuyer, RawLine, RawLineProduct, RawOrderResponse, RawPerson};

/// First present value in precedence order.
fn first<T>(candidates: impl IntoIterator<Item = Option<T>>) -> Option<T> {
    candidates.into_iter().flatten().next()
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Normalises any accepted order response shape.
///
/// `context` is what the client knew when it submitted the order; pass `None`
/// when re-reading stored orders.
pub fn normalize_order(
    raw: &RawOrderResponse,
    context: Option<&SubmissionContext>,
) -> GatewayResult<Order> {
    let id = raw
        .id
        .ok_or_else(|| GatewayError::MalformedResponse("order response without id".to_string()))?;
    let summary = raw.resumen.clone().unwrap_or_default();

    // --- Totals ------------------------------------------------------------
    let shipping = first([
        money(&summary.costo_envio),
        money(&raw.costo_envio),
        context.map(|c| c.quote.shipping),
    ])
    .unwrap_or_default();

    let total = first([
        money(&summary.total),
        money(&raw.total),
        money(&raw.monto_total),
        context.map(|c| c.quote.grand_total),
    ])
    .unwrap_or_default();

    let derived = IvaBreakdown::from_gross(total - shipping);

    let net = first([
        money(&summary.neto),
        money(&raw.neto),
        context.map(|c| c.quote.merchandise.net),
    ])
    .unwrap_or_else(|| {
        debug!(order_id = id, "Net missing from response, deriving from total");
        derived.net
    });

    let tax = first([
        money(&summary.iva),
        money(&raw.iva),
        context.map(|c| c.quote.merchandise.tax),
    ])
    .unwrap_or(total - shipping - net);

    // --- Payment -----------------------------------------------------------
    let payment_method = first([
        parse_method(summary.medio_pago.as_deref()),
        parse_method(raw.medio_pago.as_deref()),
        parse_method(raw.metodo_pago.as_deref()),
        context.map(|c| c.payment.method),
    ])
    .unwrap_or_default();

    let (tendered, change) = if payment_method.is_cash() {
        let tendered = first([
            money(&summary.monto_entregado),
            money(&raw.monto_entregado),
            context.and_then(|c| c.payment.tendered),
        ]);
        let change = first([
            money(&summary.vuelto),
            money(&raw.vuelto),
            context
                .filter(|c| c.payment.method.is_cash())
                .map(|c| c.change),
            tendered.map(|t| t.saturating_diff(total)),
        ]);
        (tendered, change)
    } else {
        (None, None)
    };

    // --- Identity ----------------------------------------------------------
    let folio = first([
        non_blank(&raw.folio),
        non_blank(&raw.boleta),
        non_blank(&raw.numero_boleta),
    ]);

    let issued_at = issued_at(raw, context, id);

    let seller = first([
        raw.vendedor.as_ref().map(seller_from),
        context.and_then(|c| c.seller.clone()),
    ]);

    let buyer = first([
        raw.cliente.as_ref().map(buyer_from),
        context.map(|c| c.buyer.clone()),
    ])
    .unwrap_or_else(Buyer::guest);

    // --- Lines, delivery, notes --------------------------------------------
    let lines = raw.lines().iter().map(line_from).collect();

    let delivery = match raw.tipo_entrega.as_deref().map(str::trim) {
        Some(kind) if !kind.is_empty() => Some(Delivery {
            kind: if kind.eq_ignore_ascii_case("ENVIO") {
                DeliveryType::Ship
            } else {
                DeliveryType::Pickup
            },
            address: first([
                non_blank(&raw.direccion_entrega),
                non_blank(&raw.direccion_despacho),
                context.and_then(|c| c.delivery.address.clone()),
            ]),
        }),
        _ => context
            .filter(|c| c.origin == SaleOrigin::Storefront)
            .map(|c| c.delivery.clone()),
    };

    let notes = first([
        non_blank(&raw.notas),
        non_blank(&raw.notas_cliente),
        context.and_then(|c| c.notes.clone()),
    ]);

    let status = raw
        .estado_pedido
        .as_deref()
        .and_then(|s| s.parse::<OrderStatus>().ok())
        .unwrap_or_default();

    Ok(Order {
        id,
        folio,
        issued_at,
        seller,
        buyer,
        lines,
        payment_method,
        net,
        tax,
        shipping,
        total,
        tendered,
        change,
        delivery,
        notes,
        status,
    })
}

fn parse_method(raw: Option<&str>) -> Option<PaymentMethod> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(method) => Some(method),
        Err(_) => {
            warn!(value = raw, "Unknown payment method in response");
            None
        }
    }
}

fn issued_at(raw: &RawOrderResponse, context: Option<&SubmissionContext>, id: i64) -> DateTime<Utc> {
    let parsed = [raw.fecha.as_deref(), raw.created_at.as_deref()]
        .into_iter()
        .flatten()
        .find_map(parse_timestamp);

    match (parsed, context) {
        (Some(at), _) => at,
        (None, Some(ctx)) => ctx.prepared_at,
        (None, None) => {
            warn!(order_id = id, "Order response without a readable date");
            DateTime::<Utc>::default()
        }
    }
}

fn seller_from(person: &RawPerson) -> Seller {
    let name = match person.display_name() {
        Some(name) => name.to_string(),
        None if person.rol.as_deref() == Some("admin") => "Administrador".to_string(),
        None => "Vendedor".to_string(),
    };
    Seller {
        id: person.id,
        name,
        rut: non_blank(&person.rut),
    }
}

fn buyer_from(raw: &RawBuyer) -> Buyer {
    match raw {
        RawBuyer::Label(label) if !label.trim().is_empty() => Buyer::Guest {
            label: label.trim().to_string(),
        },
        RawBuyer::Label(_) => Buyer::guest(),
        RawBuyer::Person(person) => match person.display_name() {
            Some(name) => Buyer::Registered {
                name: name.to_string(),
                email: non_blank(&person.email),
                rut: non_blank(&person.rut),
            },
            None => Buyer::guest(),
        },
    }
}

fn line_from(raw: &RawLine) -> OrderLine {
    let (product_id, product_name, product_price) = match &raw.producto {
        Some(RawLineProduct::Name(name)) => (None, Some(name.clone()), None),
        Some(RawLineProduct::Product { id, nombre, precio }) => {
            (*id, nombre.clone(), money(precio))
        }
        None => (None, None, None),
    };

    let product_id = raw.producto_id.or(product_id);
    let quantity = raw
        .cantidad
        .as_ref()
        .and_then(|c| c.to_i64())
        .unwrap_or(1);
    let unit_price = first([money(&raw.precio_unitario), product_price]).unwrap_or_default();
    let subtotal = money(&raw.subtotal).unwrap_or_else(|| unit_price.multiply_quantity(quantity));

    let name = first([non_blank(&product_name), non_blank(&raw.nombre)]).unwrap_or_else(|| {
        match product_id {
            Some(id) => format!("Producto #{}", id),
            None => "Producto".to_string(),
        }
    });

    OrderLine {
        product_id,
        name,
        quantity,
        unit_price,
        subtotal,
    }
}

/// Convenience for lists of stored orders (no submission context).
pub fn normalize_orders(raw: &[RawOrderResponse]) -> GatewayResult<Vec<Order>> {
    raw.iter().map(|r| normalize_order(r, None)).collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
