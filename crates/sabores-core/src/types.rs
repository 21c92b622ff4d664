//! # Domain Types
//!
//! Core domain types shared by the register, the storefront and the
//! gateway boundary.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Order       │   │   OrderLine     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id / folio     │   │  name snapshot  │       │
//! │  │  name           │   │  seller, buyer  │   │  quantity       │       │
//! │  │  price (gross)  │   │  net/tax/total  │   │  unit price     │       │
//! │  │  stock (cache)  │   │  payment        │   │  subtotal       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ PaymentMethod   │   │  DeliveryType   │   │     Buyer       │       │
//! │  │  Cash           │   │  Pickup         │   │  Guest(label)   │       │
//! │  │  Debit          │   │  Ship           │   │  Registered{..} │       │
//! │  │  Credit         │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Enum wire names follow the backend (`EFECTIVO`, `RETIRO`, `PENDIENTE`, ...).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1900 bps = 19% (Chilean IVA).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Chilean value-added tax, 19%, always included in shelf prices.
    pub const IVA: TaxRate = TaxRate(1900);

    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::IVA
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// A product category (cakes, pastries, breads, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// A product as last read from the catalog.
///
/// The cart treats it as immutable. `stock` is a cached copy of the server's
/// figure and may be stale by the time the order is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Server-assigned identifier.
    pub id: i64,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    pub description: Option<String>,

    /// Unit price in pesos, IVA included.
    pub price: Money,

    /// Units available when the catalog was read.
    pub stock: i64,

    pub category_id: Option<i64>,

    pub image_url: Option<String>,
}

impl Product {
    /// Checks if the cached stock covers `quantity` units.
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }

    /// Whether the product shows as orderable at all.
    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the buyer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum PaymentMethod {
    /// Physical cash. The only method with a tendered amount and change.
    #[default]
    #[serde(rename = "EFECTIVO")]
    Cash,
    /// Debit card on an external terminal.
    #[serde(rename = "DEBITO")]
    Debit,
    /// Credit card on an external terminal.
    #[serde(rename = "CREDITO")]
    Credit,
}

impl PaymentMethod {
    /// All methods, in the order the register lists them.
    pub const ALL: [PaymentMethod; 3] = [PaymentMethod::Cash, PaymentMethod::Debit, PaymentMethod::Credit];

    /// The backend / receipt label.
    pub const fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "EFECTIVO",
            PaymentMethod::Debit => "DEBITO",
            PaymentMethod::Credit => "CREDITO",
        }
    }

    #[inline]
    pub const fn is_cash(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "EFECTIVO" | "CASH" => Ok(PaymentMethod::Cash),
            "DEBITO" | "DÉBITO" | "DEBIT" => Ok(PaymentMethod::Debit),
            "CREDITO" | "CRÉDITO" | "CREDIT" => Ok(PaymentMethod::Credit),
            _ => Err(ValidationError::NotAllowed {
                field: "payment_method".to_string(),
                allowed: PaymentMethod::ALL.iter().map(|m| m.label().to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Delivery
// =============================================================================

/// Storefront delivery choice. Cashier sales are always `Pickup`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum DeliveryType {
    /// In-store pickup.
    #[default]
    #[serde(rename = "RETIRO")]
    Pickup,
    /// Home delivery, adds the flat shipping fee.
    #[serde(rename = "ENVIO")]
    Ship,
}

impl DeliveryType {
    pub const fn wire_name(&self) -> &'static str {
        match self {
            DeliveryType::Pickup => "RETIRO",
            DeliveryType::Ship => "ENVIO",
        }
    }

    /// Human label printed on the receipt.
    pub const fn label(&self) -> &'static str {
        match self {
            DeliveryType::Pickup => "Retiro en Tienda",
            DeliveryType::Ship => "Envío a Domicilio",
        }
    }
}

/// Delivery details carried on a storefront order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Delivery {
    pub kind: DeliveryType,
    pub address: Option<String>,
}

// =============================================================================
// Order Status
// =============================================================================

/// Server-side fulfilment status. The client only displays it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum OrderStatus {
    #[default]
    #[serde(rename = "PENDIENTE")]
    Pending,
    #[serde(rename = "CONFIRMADO")]
    Confirmed,
    #[serde(rename = "EN_PREPARACION")]
    InPreparation,
    #[serde(rename = "ENTREGADO")]
    Delivered,
    #[serde(rename = "CANCELADO")]
    Cancelled,
}

impl OrderStatus {
    /// Human-readable status for receipts and listings.
    pub const fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pendiente",
            OrderStatus::Confirmed => "Confirmado",
            OrderStatus::InPreparation => "En preparación",
            OrderStatus::Delivered => "Entregado",
            OrderStatus::Cancelled => "Cancelado",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PENDIENTE" => Ok(OrderStatus::Pending),
            "CONFIRMADO" => Ok(OrderStatus::Confirmed),
            "EN_PREPARACION" => Ok(OrderStatus::InPreparation),
            "ENTREGADO" => Ok(OrderStatus::Delivered),
            "CANCELADO" => Ok(OrderStatus::Cancelled),
            other => Err(ValidationError::InvalidFormat {
                field: "status".to_string(),
                reason: format!("unknown order status '{}'", other),
            }),
        }
    }
}

// =============================================================================
// Parties
// =============================================================================

/// The person who rang up the sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Seller {
    pub id: Option<i64>,
    pub name: String,
    pub rut: Option<String>,
}

/// Label printed when a sale has no identified buyer.
pub const GUEST_BUYER_LABEL: &str = "Cliente";

/// Who bought. Resolved once at the gateway boundary; the backend sends
/// either a bare string or a user object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Buyer {
    /// Walk-in customer, identified only by a display label.
    Guest { label: String },
    /// Known customer with contact details.
    Registered {
        name: String,
        email: Option<String>,
        rut: Option<String>,
    },
}

impl Buyer {
    /// The anonymous buyer used by cashier sales.
    pub fn guest() -> Self {
        Buyer::Guest {
            label: GUEST_BUYER_LABEL.to_string(),
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Buyer::Guest { label } => label,
            Buyer::Registered { name, .. } => name,
        }
    }

    pub fn rut(&self) -> Option<&str> {
        match self {
            Buyer::Guest { .. } => None,
            Buyer::Registered { rut, .. } => rut.as_deref(),
        }
    }

    pub fn email(&self) -> Option<&str> {
        match self {
            Buyer::Guest { .. } => None,
            Buyer::Registered { email, .. } => email.as_deref(),
        }
    }
}

impl Default for Buyer {
    fn default() -> Self {
        Buyer::guest()
    }
}

/// Contact fields collected in the storefront's first checkout step.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BuyerContact {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub rut: Option<String>,
}

impl BuyerContact {
    /// Converts the form into a registered buyer.
    pub fn to_buyer(&self) -> Buyer {
        Buyer::Registered {
            name: self.name.trim().to_string(),
            email: Some(self.email.trim().to_string()),
            rut: self.rut.clone().filter(|r| !r.trim().is_empty()),
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// Role of the logged-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[serde(rename = "cliente")]
    Customer,
}

/// The authenticated user of a terminal or storefront session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionUser {
    pub id: i64,
    pub rut: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: UserRole,
}

/// Explicit session context handed to the checkout flow and the gateway
/// client at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Identifies this register / browser session.
    pub terminal_id: Uuid,
    /// Bearer token for the backend, if logged in.
    pub access_token: Option<String>,
    pub user: Option<SessionUser>,
}

impl Session {
    /// An anonymous session with a fresh terminal id.
    pub fn anonymous() -> Self {
        Session {
            terminal_id: Uuid::new_v4(),
            access_token: None,
            user: None,
        }
    }

    /// A logged-in session.
    pub fn authenticated(token: impl Into<String>, user: SessionUser) -> Self {
        Session {
            terminal_id: Uuid::new_v4(),
            access_token: Some(token.into()),
            user: Some(user),
        }
    }

    /// A session holding only a bearer token; the backend knows the user.
    pub fn from_token(token: impl Into<String>) -> Self {
        Session {
            terminal_id: Uuid::new_v4(),
            access_token: Some(token.into()),
            user: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// The seller identity printed on cashier receipts.
    ///
    /// Falls back to a role label when the user has no name.
    pub fn seller(&self) -> Option<Seller> {
        self.user.as_ref().map(|user| {
            let name = if user.name.trim().is_empty() {
                match user.role {
                    UserRole::Admin => "Administrador".to_string(),
                    UserRole::Customer => "Vendedor".to_string(),
                }
            } else {
                user.name.clone()
            };
            Seller {
                id: Some(user.id),
                name,
                rut: Some(user.rut.clone()),
            }
        })
    }

    /// Contact details prefilled from a logged-in customer.
    pub fn prefilled_contact(&self) -> BuyerContact {
        match &self.user {
            Some(user) => BuyerContact {
                name: user.name.clone(),
                email: user.email.clone().unwrap_or_default(),
                phone: user.phone.clone(),
                rut: Some(user.rut.clone()).filter(|r| !r.is_empty()),
            },
            None => BuyerContact::default(),
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// One line of a confirmed order. Name and prices are snapshots taken by the
/// server at sale time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLine {
    pub product_id: Option<i64>,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub subtotal: Money,
}

/// Canonical, immutable record of a completed sale.
///
/// Produced only by the gateway adapter; totals come from the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: i64,
    /// Server folio / boleta number, when the backend sent one.
    pub folio: Option<String>,
    #[ts(as = "String")]
    pub issued_at: DateTime<Utc>,
    pub seller: Option<Seller>,
    pub buyer: Buyer,
    pub lines: Vec<OrderLine>,
    pub payment_method: PaymentMethod,
    /// Merchandise net (IVA excluded).
    pub net: Money,
    /// Merchandise IVA.
    pub tax: Money,
    /// Shipping fee, outside the net/tax split.
    pub shipping: Money,
    /// Grand total: net + tax + shipping.
    pub total: Money,
    /// Cash handed over (cash sales only).
    pub tendered: Option<Money>,
    /// Change returned (cash sales only).
    pub change: Option<Money>,
    pub delivery: Option<Delivery>,
    pub notes: Option<String>,
    pub status: OrderStatus,
}

impl Order {
    /// Merchandise amount, IVA included.
    pub fn merchandise_total(&self) -> Money {
        self.net + self.tax
    }

    /// Sum of the line subtotals as sent by the server.
    pub fn line_sum(&self) -> Money {
        self.lines.iter().map(|l| l.subtotal).sum()
    }
}

// =============================================================================
// Store
// =============================================================================

/// Header printed at the top of every receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StoreInfo {
    pub name: String,
    pub rut: String,
    pub address: String,
    pub phone: Option<String>,
    pub website: Option<String>,
}

impl Default for StoreInfo {
    fn default() -> Self {
        StoreInfo {
            name: "Pastelería 1000 Sabores".to_string(),
            rut: "76.000.000-0".to_string(),
            address: "Av. Principal #123, Santiago, Chile".to_string(),
            phone: None,
            website: Some("www.1000sabores.cl".to_string()),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
