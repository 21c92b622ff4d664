//! # Checkout
//!
//! Payment rules, delivery surcharge and the checkout state machine.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Checkout Flow                                     │
//! │                                                                         │
//! │   storefront                                                            │
//! │   ┌────────────────┐ advance ┌───────────────────┐ advance              │
//! │   │ COLLECTING_INFO│────────►│ CHOOSING_DELIVERY │─────────┐            │
//! │   └────────────────┘◄────────└───────────────────┘◄──┐     │            │
//! │          ▲ (skipped when the         back             │back │            │
//! │          │  session has name+email)                   │     ▼            │
//! │   register flow starts here ─────────────────► ┌──────────────────┐     │
//! │                                                │ CHOOSING_PAYMENT │◄─┐  │
//! │                                                └────────┬─────────┘  │  │
//! │                                   begin_submit          │            │  │
//! │                                   (guarded: can_submit) ▼       fail │  │
//! │                                                ┌──────────────────┐  │  │
//! │                                                │    SUBMITTING    │──┘  │
//! │                                                └────────┬─────────┘     │
//! │                                        complete         │               │
//! │                                                         ▼               │
//! │                                                ┌──────────────────┐     │
//! │                                                │    CONFIRMED     │     │
//! │                                                │    (terminal)    │     │
//! │                                                └──────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The flow never touches the cart. Clearing it after a confirmed order is the
//! caller's job, so a failed submission leaves it intact for a retry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{Cart, LineRequest};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::{IvaBreakdown, Money};
use crate::types::{
    Buyer, BuyerContact, Delivery, DeliveryType, Order, PaymentMethod, Seller, Session,
};
use crate::validation::{
    self, validate_address, validate_email, validate_name, validate_notes, validate_phone,
    ValidationResult,
};

/// Flat home-delivery fee in pesos.
pub const DEFAULT_SHIPPING_FEE: Money = Money::from_pesos(3000);

// =============================================================================
// Payment Calculator
// =============================================================================

/// Whether a payment may be submitted for `amount_due`.
///
/// Cards always pass. Cash passes only with a non-negative tendered amount
/// covering the amount due.
pub fn can_submit(method: PaymentMethod, tendered: Option<Money>, amount_due: Money) -> bool {
    match method {
        PaymentMethod::Debit | PaymentMethod::Credit => true,
        PaymentMethod::Cash => {
            matches!(tendered, Some(t) if !t.is_negative() && t >= amount_due)
        }
    }
}

/// Change to hand back. `max(0, tendered - amount_due)` for cash, else 0.
pub fn change_due(method: PaymentMethod, tendered: Option<Money>, amount_due: Money) -> Money {
    match (method, tendered) {
        (PaymentMethod::Cash, Some(t)) => t.saturating_diff(amount_due),
        _ => Money::zero(),
    }
}

/// Delivery surcharge: `flat_fee` for home delivery, 0 for pickup.
pub fn delivery_fee(kind: DeliveryType, flat_fee: Money) -> Money {
    match kind {
        DeliveryType::Ship => flat_fee,
        DeliveryType::Pickup => Money::zero(),
    }
}

/// Payment method and, for cash, the amount handed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentInput {
    pub method: PaymentMethod,
    pub tendered: Option<Money>,
}

impl PaymentInput {
    pub fn cash(tendered: Money) -> Self {
        PaymentInput {
            method: PaymentMethod::Cash,
            tendered: Some(tendered),
        }
    }

    pub fn card(method: PaymentMethod) -> Self {
        PaymentInput {
            method,
            tendered: None,
        }
    }
}

/// Field-level check behind [`can_submit`].
pub fn validate_payment(input: &PaymentInput, amount_due: Money) -> ValidationResult<()> {
    if !input.method.is_cash() {
        return Ok(());
    }

    let tendered = validation::validate_tendered(input.tendered.map(|t| t.pesos()))?;
    if tendered < amount_due.pesos() {
        return Err(ValidationError::Insufficient {
            field: "tendered".to_string(),
            required: amount_due.pesos(),
            provided: tendered,
        });
    }

    Ok(())
}

/// Home delivery needs an address; pickup ignores it.
pub fn validate_delivery(delivery: &Delivery) -> ValidationResult<Delivery> {
    match delivery.kind {
        DeliveryType::Pickup => Ok(Delivery {
            kind: DeliveryType::Pickup,
            address: None,
        }),
        DeliveryType::Ship => {
            let address = validate_address(delivery.address.as_deref())?;
            Ok(Delivery {
                kind: DeliveryType::Ship,
                address: Some(address),
            })
        }
    }
}

/// Name and email required; phone and RUT checked when present.
pub fn validate_contact(contact: &BuyerContact) -> ValidationResult<BuyerContact> {
    let rut = match contact.rut.as_deref().map(str::trim) {
        Some(rut) if !rut.is_empty() => Some(validation::validate_rut(rut)?),
        _ => None,
    };

    Ok(BuyerContact {
        name: validate_name(&contact.name)?,
        email: validate_email(&contact.email)?,
        phone: validate_phone(contact.phone.as_deref())?,
        rut,
    })
}

// =============================================================================
// Quote
// =============================================================================

/// What the payment step shows.
///
/// Net and tax come from the merchandise only; shipping sits outside the
/// IVA split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutQuote {
    pub merchandise: IvaBreakdown,
    pub shipping: Money,
    pub grand_total: Money,
}

impl CheckoutQuote {
    pub fn new(subtotal: Money, delivery: DeliveryType, flat_fee: Money) -> Self {
        let shipping = delivery_fee(delivery, flat_fee);
        CheckoutQuote {
            merchandise: IvaBreakdown::from_gross(subtotal),
            shipping,
            grand_total: subtotal + shipping,
        }
    }

    pub fn for_cart(cart: &Cart, delivery: DeliveryType, flat_fee: Money) -> Self {
        Self::new(cart.subtotal(), delivery, flat_fee)
    }
}

// =============================================================================
// Submission
// =============================================================================

/// Which front end originated the sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleOrigin {
    /// Cashier terminal, authenticated seller, guest buyer.
    Register,
    /// Customer storefront.
    Storefront,
}

/// What the client knew right before submitting.
///
/// The gateway adapter falls back to these values when the server response
/// leaves a field out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionContext {
    pub origin: SaleOrigin,
    pub prepared_at: DateTime<Utc>,
    pub quote: CheckoutQuote,
    pub payment: PaymentInput,
    pub change: Money,
    pub buyer: Buyer,
    pub seller: Option<Seller>,
    pub delivery: Delivery,
    pub notes: Option<String>,
}

/// A validated order ready for the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSubmission {
    pub lines: Vec<LineRequest>,
    pub contact: Option<BuyerContact>,
    pub context: SubmissionContext,
}

// =============================================================================
// Checkout Flow
// =============================================================================

/// Steps of the checkout state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutStep {
    CollectingInfo,
    ChoosingDelivery,
    ChoosingPayment,
    Submitting,
    Confirmed,
}

/// Drives one checkout from the first form step to a confirmed order.
#[derive(Debug, Clone)]
pub struct CheckoutFlow {
    origin: SaleOrigin,
    step: CheckoutStep,
    contact: BuyerContact,
    delivery: Delivery,
    payment: PaymentInput,
    notes: Option<String>,
    seller: Option<Seller>,
    shipping_fee: Money,
    error: Option<String>,
    confirmed: Option<Order>,
}

impl CheckoutFlow {
    /// Customer checkout. Starts at CHOOSING_DELIVERY when the session
    /// already carries the buyer's name and email.
    pub fn for_storefront(session: &Session, shipping_fee: Money) -> Self {
        let contact = session.prefilled_contact();
        let step = if validate_name(&contact.name).is_ok() && validate_email(&contact.email).is_ok()
        {
            CheckoutStep::ChoosingDelivery
        } else {
            CheckoutStep::CollectingInfo
        };

        CheckoutFlow {
            origin: SaleOrigin::Storefront,
            step,
            contact,
            delivery: Delivery::default(),
            payment: PaymentInput::default(),
            notes: None,
            seller: None,
            shipping_fee,
            error: None,
            confirmed: None,
        }
    }

    /// Cashier checkout: pickup, guest buyer, straight to payment.
    pub fn for_register(session: &Session) -> Self {
        CheckoutFlow {
            origin: SaleOrigin::Register,
            step: CheckoutStep::ChoosingPayment,
            contact: BuyerContact::default(),
            delivery: Delivery::default(),
            payment: PaymentInput::default(),
            notes: None,
            seller: session.seller(),
            shipping_fee: Money::zero(),
            error: None,
            confirmed: None,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    pub fn origin(&self) -> SaleOrigin {
        self.origin
    }

    /// Message from the last failed submission, cleared on the next attempt.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn confirmed_order(&self) -> Option<&Order> {
        self.confirmed.as_ref()
    }

    pub fn contact(&self) -> &BuyerContact {
        &self.contact
    }

    pub fn delivery(&self) -> &Delivery {
        &self.delivery
    }

    pub fn payment(&self) -> &PaymentInput {
        &self.payment
    }

    pub fn is_submitting(&self) -> bool {
        self.step == CheckoutStep::Submitting
    }

    // -------------------------------------------------------------------------
    // Form input
    // -------------------------------------------------------------------------

    pub fn set_contact(&mut self, contact: BuyerContact) {
        self.contact = contact;
    }

    /// Ignored by the register flow, which always sells for pickup.
    pub fn set_delivery(&mut self, delivery: Delivery) {
        if self.origin == SaleOrigin::Storefront {
            self.delivery = delivery;
        }
    }

    pub fn set_payment(&mut self, payment: PaymentInput) {
        self.payment = payment;
    }

    pub fn set_notes(&mut self, notes: Option<String>) {
        self.notes = notes;
    }

    /// Totals for the current delivery choice.
    pub fn quote(&self, cart: &Cart) -> CheckoutQuote {
        CheckoutQuote::for_cart(cart, self.delivery.kind, self.shipping_fee)
    }

    /// Whether the payment step may submit right now.
    pub fn can_submit(&self, cart: &Cart) -> bool {
        self.step == CheckoutStep::ChoosingPayment
            && !cart.is_empty()
            && can_submit(
                self.payment.method,
                self.payment.tendered,
                self.quote(cart).grand_total,
            )
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Validates the current form step and moves to the next one.
    pub fn advance(&mut self) -> CoreResult<CheckoutStep> {
        match self.step {
            CheckoutStep::CollectingInfo => {
                self.contact = validate_contact(&self.contact)?;
                self.step = CheckoutStep::ChoosingDelivery;
            }
            CheckoutStep::ChoosingDelivery => {
                self.delivery = validate_delivery(&self.delivery)?;
                self.step = CheckoutStep::ChoosingPayment;
            }
            from => {
                return Err(CoreError::InvalidTransition {
                    from,
                    action: "advance",
                })
            }
        }
        Ok(self.step)
    }

    /// Returns to the previous form step.
    pub fn back(&mut self) -> CoreResult<CheckoutStep> {
        self.step = match (self.origin, self.step) {
            (SaleOrigin::Storefront, CheckoutStep::ChoosingDelivery) => CheckoutStep::CollectingInfo,
            (SaleOrigin::Storefront, CheckoutStep::ChoosingPayment) => CheckoutStep::ChoosingDelivery,
            (_, from) => {
                return Err(CoreError::InvalidTransition {
                    from,
                    action: "go back",
                })
            }
        };
        Ok(self.step)
    }

    /// CHOOSING_PAYMENT → SUBMITTING.
    ///
    /// Validates delivery, payment and notes against the cart, then freezes
    /// everything the gateway needs. On error the flow stays where it was.
    pub fn begin_submit(&mut self, cart: &Cart, now: DateTime<Utc>) -> CoreResult<OrderSubmission> {
        if self.step != CheckoutStep::ChoosingPayment {
            return Err(CoreError::InvalidTransition {
                from: self.step,
                action: "submit",
            });
        }

        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let delivery = validate_delivery(&self.delivery)?;
        let notes = validate_notes(self.notes.as_deref())?;
        let quote = CheckoutQuote::for_cart(cart, delivery.kind, self.shipping_fee);
        validate_payment(&self.payment, quote.grand_total)?;

        let (contact, buyer) = match self.origin {
            SaleOrigin::Register => (None, Buyer::guest()),
            SaleOrigin::Storefront => {
                let contact = validate_contact(&self.contact)?;
                let buyer = contact.to_buyer();
                (Some(contact), buyer)
            }
        };

        let payment = PaymentInput {
            method: self.payment.method,
            tendered: self.payment.tendered.filter(|_| self.payment.method.is_cash()),
        };

        let submission = OrderSubmission {
            lines: cart.line_requests(),
            contact,
            context: SubmissionContext {
                origin: self.origin,
                prepared_at: now,
                quote,
                payment,
                change: change_due(payment.method, payment.tendered, quote.grand_total),
                buyer,
                seller: self.seller.clone(),
                delivery,
                notes,
            },
        };

        self.error = None;
        self.step = CheckoutStep::Submitting;
        Ok(submission)
    }

    /// SUBMITTING → CONFIRMED with the server's order.
    pub fn complete(&mut self, order: Order) -> CoreResult<&Order> {
        if self.step != CheckoutStep::Submitting {
            return Err(CoreError::InvalidTransition {
                from: self.step,
                action: "confirm",
            });
        }

        self.step = CheckoutStep::Confirmed;
        Ok(&*self.confirmed.insert(order))
    }

    /// SUBMITTING → CHOOSING_PAYMENT with an error banner. Resubmission is
    /// allowed.
    pub fn fail(&mut self, message: impl Into<String>) -> CoreResult<()> {
        if self.step != CheckoutStep::Submitting {
            return Err(CoreError::InvalidTransition {
                from: self.step,
                action: "record a failure",
            });
        }

        self.error = Some(message.into());
        self.step = CheckoutStep::ChoosingPayment;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderStatus, Product, SessionUser, UserRole};

    fn pesos(n: i64) -> Money {
        Money::from_pesos(n)
    }

    fn reference_cart() -> Cart {
        let torta = Product {
            id: 1,
            name: "Torta Chocolate".to_string(),
            description: None,
            price: pesos(1200),
            stock: 10,
            category_id: None,
            image_url: None,
        };
        let kuchen = Product {
            id: 2,
            name: "Kuchen Nuez".to_string(),
            description: None,
            price: pesos(800),
            stock: 10,
            category_id: None,
            image_url: None,
        };
        let mut cart = Cart::new();
        cart.add_item(&torta);
        cart.add_item(&torta);
        cart.add_item(&kuchen);
        cart
    }

    fn customer_session() -> Session {
        Session::authenticated(
            "token",
            SessionUser {
                id: 3,
                rut: "12.345.678-5".to_string(),
                name: "Ana Pérez".to_string(),
                email: Some("ana@mail.cl".to_string()),
                phone: None,
                role: UserRole::Customer,
            },
        )
    }

    fn order_stub(id: i64) -> Order {
        Order {
            id,
            folio: None,
            issued_at: DateTime::<Utc>::default(),
            seller: None,
            buyer: Buyer::guest(),
            lines: Vec::new(),
            payment_method: PaymentMethod::Cash,
            net: pesos(2689),
            tax: pesos(511),
            shipping: Money::zero(),
            total: pesos(3200),
            tendered: None,
            change: None,
            delivery: None,
            notes: None,
            status: OrderStatus::Pending,
        }
    }

    #[test]
    fn test_can_submit_cash_boundary() {
        let due = pesos(3200);
        for tendered in [0, 1, 3000, 3199] {
            assert!(!can_submit(PaymentMethod::Cash, Some(pesos(tendered)), due));
        }
        for tendered in [3200, 3201, 5000, 20_000] {
            assert!(can_submit(PaymentMethod::Cash, Some(pesos(tendered)), due));
            assert_eq!(
                change_due(PaymentMethod::Cash, Some(pesos(tendered)), due),
                pesos(tendered - 3200)
            );
        }
        assert!(!can_submit(PaymentMethod::Cash, None, due));
        assert!(!can_submit(PaymentMethod::Cash, Some(pesos(-1)), Money::zero()));
    }

    #[test]
    fn test_cash_5000_gives_1800_change() {
        assert!(can_submit(PaymentMethod::Cash, Some(pesos(5000)), pesos(3200)));
        assert_eq!(change_due(PaymentMethod::Cash, Some(pesos(5000)), pesos(3200)), pesos(1800));
    }

    #[test]
    fn test_cards_always_submit_without_change() {
        for method in [PaymentMethod::Debit, PaymentMethod::Credit] {
            assert!(can_submit(method, None, pesos(3200)));
            assert_eq!(change_due(method, None, pesos(3200)), Money::zero());
            assert_eq!(change_due(method, Some(pesos(9000)), pesos(3200)), Money::zero());
        }
    }

    #[test]
    fn test_shipping_outside_iva_split() {
        let quote = CheckoutQuote::new(pesos(3200), DeliveryType::Ship, DEFAULT_SHIPPING_FEE);
        assert_eq!(quote.grand_total, pesos(6200));
        assert_eq!(quote.merchandise.net, pesos(2689));
        assert_eq!(quote.merchandise.tax, pesos(511));
        assert_eq!(quote.shipping, pesos(3000));

        let pickup = CheckoutQuote::new(pesos(3200), DeliveryType::Pickup, DEFAULT_SHIPPING_FEE);
        assert_eq!(pickup.grand_total, pesos(3200));
        assert!(pickup.shipping.is_zero());
    }

    #[test]
    fn test_validate_payment_field_errors() {
        let err = validate_payment(&PaymentInput::cash(pesos(3000)), pesos(3200)).unwrap_err();
        assert_eq!(err.field(), "tendered");
        assert!(matches!(err, ValidationError::Insufficient { required: 3200, provided: 3000, .. }));

        let missing = PaymentInput {
            method: PaymentMethod::Cash,
            tendered: None,
        };
        assert!(matches!(
            validate_payment(&missing, pesos(3200)),
            Err(ValidationError::Required { .. })
        ));
        assert!(validate_payment(&PaymentInput::card(PaymentMethod::Debit), pesos(3200)).is_ok());
    }

    #[test]
    fn test_validate_delivery() {
        let ship = Delivery {
            kind: DeliveryType::Ship,
            address: None,
        };
        assert_eq!(validate_delivery(&ship).unwrap_err().field(), "address");

        let pickup = Delivery {
            kind: DeliveryType::Pickup,
            address: Some("ignored".to_string()),
        };
        assert_eq!(validate_delivery(&pickup).unwrap().address, None);
    }

    #[test]
    fn test_storefront_skips_info_for_known_customer() {
        let flow = CheckoutFlow::for_storefront(&customer_session(), DEFAULT_SHIPPING_FEE);
        assert_eq!(flow.step(), CheckoutStep::ChoosingDelivery);

        let anonymous = CheckoutFlow::for_storefront(&Session::anonymous(), DEFAULT_SHIPPING_FEE);
        assert_eq!(anonymous.step(), CheckoutStep::CollectingInfo);
    }

    #[test]
    fn test_storefront_walkthrough() {
        let cart = reference_cart();
        let mut flow = CheckoutFlow::for_storefront(&Session::anonymous(), DEFAULT_SHIPPING_FEE);

        // Info step blocks without email
        flow.set_contact(BuyerContact {
            name: "Ana".to_string(),
            ..Default::default()
        });
        let err = flow.advance().unwrap_err();
        assert!(matches!(err, CoreError::Validation(ref v) if v.field() == "email"));
        assert_eq!(flow.step(), CheckoutStep::CollectingInfo);

        flow.set_contact(BuyerContact {
            name: "Ana".to_string(),
            email: "ana@mail.cl".to_string(),
            ..Default::default()
        });
        assert_eq!(flow.advance().unwrap(), CheckoutStep::ChoosingDelivery);

        // Ship needs an address
        flow.set_delivery(Delivery {
            kind: DeliveryType::Ship,
            address: None,
        });
        assert!(flow.advance().is_err());
        flow.set_delivery(Delivery {
            kind: DeliveryType::Ship,
            address: Some("Los Aromos 123".to_string()),
        });
        assert_eq!(flow.advance().unwrap(), CheckoutStep::ChoosingPayment);
        assert_eq!(flow.quote(&cart).grand_total, pesos(6200));

        flow.set_payment(PaymentInput::card(PaymentMethod::Credit));
        let submission = flow.begin_submit(&cart, Utc::now()).unwrap();
        assert_eq!(flow.step(), CheckoutStep::Submitting);
        assert_eq!(submission.lines.len(), 2);
        assert_eq!(submission.context.quote.shipping, pesos(3000));
        assert_eq!(submission.context.buyer.display_name(), "Ana");
        assert!(submission.context.change.is_zero());
    }

    #[test]
    fn test_register_flow_blocks_short_cash() {
        let cart = reference_cart();
        let mut flow = CheckoutFlow::for_register(&Session::anonymous());
        assert_eq!(flow.step(), CheckoutStep::ChoosingPayment);

        flow.set_payment(PaymentInput::cash(pesos(3000)));
        assert!(!flow.can_submit(&cart));
        assert!(flow.begin_submit(&cart, Utc::now()).is_err());
        assert_eq!(flow.step(), CheckoutStep::ChoosingPayment);

        flow.set_payment(PaymentInput::cash(pesos(5000)));
        assert!(flow.can_submit(&cart));
        let submission = flow.begin_submit(&cart, Utc::now()).unwrap();
        assert_eq!(submission.context.change, pesos(1800));
        assert_eq!(submission.context.delivery.kind, DeliveryType::Pickup);
        assert!(submission.contact.is_none());
    }

    #[test]
    fn test_register_ignores_delivery_choice() {
        let cart = reference_cart();
        let mut flow = CheckoutFlow::for_register(&Session::anonymous());
        flow.set_delivery(Delivery {
            kind: DeliveryType::Ship,
            address: None,
        });
        assert_eq!(flow.quote(&cart).grand_total, pesos(3200));
    }

    #[test]
    fn test_empty_cart_cannot_submit() {
        let mut flow = CheckoutFlow::for_register(&Session::anonymous());
        flow.set_payment(PaymentInput::card(PaymentMethod::Debit));
        assert!(matches!(flow.begin_submit(&Cart::new(), Utc::now()), Err(CoreError::EmptyCart)));
    }

    #[test]
    fn test_failure_returns_to_payment_and_allows_retry() {
        let cart = reference_cart();
        let mut flow = CheckoutFlow::for_register(&Session::anonymous());
        flow.set_payment(PaymentInput::card(PaymentMethod::Debit));

        flow.begin_submit(&cart, Utc::now()).unwrap();
        flow.fail("Stock insuficiente").unwrap();
        assert_eq!(flow.step(), CheckoutStep::ChoosingPayment);
        assert_eq!(flow.error(), Some("Stock insuficiente"));

        flow.begin_submit(&cart, Utc::now()).unwrap();
        assert!(flow.error().is_none());
        let order = flow.complete(order_stub(10)).unwrap();
        assert_eq!(order.id, 10);
        assert_eq!(flow.step(), CheckoutStep::Confirmed);
    }

    #[test]
    fn test_confirmed_is_terminal() {
        let cart = reference_cart();
        let mut flow = CheckoutFlow::for_storefront(&customer_session(), DEFAULT_SHIPPING_FEE);
        flow.advance().unwrap();
        flow.set_payment(PaymentInput::card(PaymentMethod::Debit));
        flow.begin_submit(&cart, Utc::now()).unwrap();

        assert!(flow.back().is_err());
        flow.complete(order_stub(1)).unwrap();

        assert!(flow.back().is_err());
        assert!(flow.fail("late").is_err());
        assert!(flow.begin_submit(&cart, Utc::now()).is_err());
        assert!(flow.complete(order_stub(2)).is_err());
        assert_eq!(flow.confirmed_order().map(|o| o.id), Some(1));
    }

    #[test]
    fn test_back_navigation() {
        let mut flow = CheckoutFlow::for_storefront(&customer_session(), DEFAULT_SHIPPING_FEE);
        flow.advance().unwrap();
        assert_eq!(flow.back().unwrap(), CheckoutStep::ChoosingDelivery);
        assert_eq!(flow.back().unwrap(), CheckoutStep::CollectingInfo);
        assert!(flow.back().is_err());

        let mut register = CheckoutFlow::for_register(&Session::anonymous());
        assert!(register.back().is_err());
    }

    #[test]
    fn test_complete_requires_submission() {
        let mut flow = CheckoutFlow::for_register(&Session::anonymous());
        assert!(flow.complete(order_stub(1)).is_err());
        assert!(flow.fail("nope").is_err());
    }
}
