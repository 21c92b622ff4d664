//! End-to-end checkout scenarios against the in-memory backend.

use chrono::Utc;

use sabores_core::checkout::{can_submit, change_due, DEFAULT_SHIPPING_FEE};
use sabores_core::closing;
use sabores_core::{
    assemble_receipt, BuyerContact, Cart, CheckoutFlow, CheckoutStep, Delivery, DeliveryType,
    Money, PaymentInput, PaymentMethod, Product, Session, SessionUser, StoreInfo, UserRole,
};
use sabores_gateway::{
    submit_checkout, CheckoutError, GatewayError, InMemoryBackend, OrderGateway, ResponseShape,
    RestGateway,
};

fn pesos(n: i64) -> Money {
    Money::from_pesos(n)
}

fn product(id: i64, name: &str, price: i64, stock: i64) -> Product {
    Product {
        id,
        name: name.to_string(),
        description: None,
        price: pesos(price),
        stock,
        category_id: Some(1),
        image_url: None,
    }
}

/// Torta 1200 × 2 + Kuchen 800 × 1 = 3200.
fn scenario_catalog() -> Vec<Product> {
    vec![
        product(1, "Torta Chocolate (porción)", 1200, 10),
        product(2, "Kuchen de Nuez", 800, 10),
    ]
}

fn scenario_cart(catalog: &[Product]) -> Cart {
    let mut cart = Cart::new();
    cart.add_item(&catalog[0]);
    cart.add_item(&catalog[0]);
    cart.add_item(&catalog[1]);
    cart
}

fn cashier() -> SessionUser {
    SessionUser {
        id: 2,
        rut: "11.111.111-1".to_string(),
        name: "Carla Soto".to_string(),
        email: None,
        phone: None,
        role: UserRole::Customer,
    }
}

fn admin() -> SessionUser {
    SessionUser {
        id: 1,
        rut: "76.000.000-0".to_string(),
        name: String::new(),
        email: None,
        phone: None,
        role: UserRole::Admin,
    }
}

async fn register_setup() -> (InMemoryBackend, Session, RestGateway<InMemoryBackend>) {
    let backend = InMemoryBackend::new(scenario_catalog(), Vec::new());
    let session = backend.issue_session(cashier()).await;
    let gateway = RestGateway::new(backend.clone(), session.clone());
    (backend, session, gateway)
}

// =============================================================================
// Section scenarios
// =============================================================================

#[test]
fn scenario_cart_totals_split_exactly() {
    let cart = scenario_cart(&scenario_catalog());
    assert_eq!(cart.subtotal(), pesos(3200));
    assert_eq!(cart.net(), pesos(2689));
    assert_eq!(cart.tax(), pesos(511));
    assert_eq!(cart.net() + cart.tax(), pesos(3200));
}

#[tokio::test]
async fn scenario_cash_5000_confirms_with_1800_change() {
    let (backend, session, gateway) = register_setup().await;
    let mut cart = scenario_cart(&scenario_catalog());
    let mut flow = CheckoutFlow::for_register(&session);
    flow.set_payment(PaymentInput::cash(pesos(5000)));

    assert!(can_submit(PaymentMethod::Cash, Some(pesos(5000)), pesos(3200)));
    let order = submit_checkout(&mut flow, &mut cart, &gateway, Utc::now())
        .await
        .unwrap();

    assert_eq!(flow.step(), CheckoutStep::Confirmed);
    assert!(cart.is_empty());
    assert_eq!(order.total, pesos(3200));
    assert_eq!(order.net, pesos(2689));
    assert_eq!(order.tax, pesos(511));
    assert_eq!(order.tendered, Some(pesos(5000)));
    assert_eq!(order.change, Some(pesos(1800)));
    assert_eq!(order.seller.as_ref().map(|s| s.name.as_str()), Some("Carla Soto"));
    assert_eq!(backend.stock_of(1).await, Some(8));

    let receipt = assemble_receipt(&order, &StoreInfo::default());
    assert_eq!(receipt.cash.map(|c| c.change), Some(pesos(1800)));
    assert_eq!(receipt.line_sum(), receipt.total);
}

#[tokio::test]
async fn scenario_cash_3000_is_blocked_before_the_gateway() {
    let (backend, session, gateway) = register_setup().await;
    let mut cart = scenario_cart(&scenario_catalog());
    let mut flow = CheckoutFlow::for_register(&session);
    flow.set_payment(PaymentInput::cash(pesos(3000)));

    assert!(!can_submit(PaymentMethod::Cash, Some(pesos(3000)), pesos(3200)));
    let err = submit_checkout(&mut flow, &mut cart, &gateway, Utc::now())
        .await
        .unwrap_err();

    match err {
        CheckoutError::Blocked(sabores_core::CoreError::Validation(v)) => {
            assert_eq!(v.field(), "tendered")
        }
        other => panic!("expected a validation block, got {:?}", other),
    }
    assert_eq!(flow.step(), CheckoutStep::ChoosingPayment);
    assert_eq!(backend.order_count().await, 0);
    assert_eq!(cart.subtotal(), pesos(3200));
}

#[tokio::test]
async fn scenario_debit_without_tendered() {
    let (_backend, session, gateway) = register_setup().await;
    let mut cart = scenario_cart(&scenario_catalog());
    let mut flow = CheckoutFlow::for_register(&session);
    flow.set_payment(PaymentInput::card(PaymentMethod::Debit));

    assert!(can_submit(PaymentMethod::Debit, None, pesos(3200)));
    assert_eq!(change_due(PaymentMethod::Debit, None, pesos(3200)), Money::zero());

    let order = submit_checkout(&mut flow, &mut cart, &gateway, Utc::now())
        .await
        .unwrap();
    assert_eq!(order.payment_method, PaymentMethod::Debit);
    assert!(order.tendered.is_none());
    assert!(order.change.is_none());

    let receipt = assemble_receipt(&order, &StoreInfo::default());
    assert!(receipt.cash.is_none());
    assert_eq!(receipt.payment_label, "DEBITO");
}

#[tokio::test]
async fn scenario_storefront_shipping_is_outside_the_split() {
    let backend = InMemoryBackend::new(scenario_catalog(), Vec::new());
    let session = backend
        .issue_session(SessionUser {
            id: 9,
            rut: "12.345.678-5".to_string(),
            name: "Ana Pérez".to_string(),
            email: Some("ana@mail.cl".to_string()),
            phone: None,
            role: UserRole::Customer,
        })
        .await;
    let gateway = RestGateway::new(backend.clone(), session.clone());

    let mut cart = scenario_cart(&scenario_catalog());
    let mut flow = CheckoutFlow::for_storefront(&session, DEFAULT_SHIPPING_FEE);
    assert_eq!(flow.step(), CheckoutStep::ChoosingDelivery);

    flow.set_delivery(Delivery {
        kind: DeliveryType::Ship,
        address: Some("Los Aromos 123, Ñuñoa".to_string()),
    });
    flow.advance().unwrap();

    let quote = flow.quote(&cart);
    assert_eq!(quote.grand_total, pesos(6200));
    assert_eq!(quote.merchandise.net, pesos(2689));
    assert_eq!(quote.merchandise.tax, pesos(511));

    flow.set_payment(PaymentInput::card(PaymentMethod::Credit));
    flow.set_notes(Some("Tocar el timbre dos veces".to_string()));
    let order = submit_checkout(&mut flow, &mut cart, &gateway, Utc::now())
        .await
        .unwrap();

    assert_eq!(order.total, pesos(6200));
    assert_eq!(order.shipping, pesos(3000));
    assert_eq!(order.net, pesos(2689));
    assert_eq!(order.tax, pesos(511));
    assert_eq!(order.buyer.display_name(), "Ana Pérez");

    let receipt = assemble_receipt(&order, &StoreInfo::default());
    assert_eq!(receipt.delivery.as_ref().map(|d| d.label.as_str()), Some("Envío a Domicilio"));
    assert_eq!(receipt.notes.as_deref(), Some("Tocar el timbre dos veces"));
    assert!(!receipt.has_discrepancy());
}

#[tokio::test]
async fn scenario_receipt_assembly_is_idempotent() {
    let (_backend, session, gateway) = register_setup().await;
    let mut cart = scenario_cart(&scenario_catalog());
    let mut flow = CheckoutFlow::for_register(&session);
    flow.set_payment(PaymentInput::cash(pesos(5000)));
    let order = submit_checkout(&mut flow, &mut cart, &gateway, Utc::now())
        .await
        .unwrap();

    let store = StoreInfo::default();
    let first = assemble_receipt(&order, &store).to_json_pretty().unwrap();
    let second = assemble_receipt(&order, &store).to_json_pretty().unwrap();
    assert_eq!(first, second);
}

// =============================================================================
// Failure paths
// =============================================================================

#[tokio::test]
async fn stale_stock_is_rejected_by_the_server_and_cart_survives() {
    let (backend, session, gateway) = register_setup().await;
    let mut cart = scenario_cart(&scenario_catalog());

    // Another terminal sold the last tortas
    backend.set_stock(1, 1).await;

    let mut flow = CheckoutFlow::for_register(&session);
    flow.set_payment(PaymentInput::card(PaymentMethod::Credit));
    let err = submit_checkout(&mut flow, &mut cart, &gateway, Utc::now())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CheckoutError::Failed(GatewayError::Rejected { status: 400, .. })
    ));
    assert_eq!(flow.step(), CheckoutStep::ChoosingPayment);
    assert!(flow.error().unwrap_or_default().contains("Stock insuficiente"));
    assert_eq!(cart.total_quantity(), 3);

    // Cashier fixes the cart and resubmits
    cart.set_quantity(1, 1);
    let order = submit_checkout(&mut flow, &mut cart, &gateway, Utc::now())
        .await
        .unwrap();
    assert_eq!(order.total, pesos(2000));
}

#[tokio::test]
async fn expired_session_is_a_recoverable_failure() {
    let backend = InMemoryBackend::new(scenario_catalog(), Vec::new());
    let session = Session::anonymous();
    let gateway = RestGateway::new(backend, session.clone());

    let mut cart = scenario_cart(&scenario_catalog());
    let mut flow = CheckoutFlow::for_register(&session);
    flow.set_payment(PaymentInput::card(PaymentMethod::Debit));

    let err = submit_checkout(&mut flow, &mut cart, &gateway, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::Failed(GatewayError::Unauthorized)));
    assert!(flow.error().is_some());
    assert!(!cart.is_empty());
}

// =============================================================================
// Back office
// =============================================================================

#[tokio::test]
async fn legacy_shape_reprint_and_payment_correction() {
    let (backend, session, gateway) = register_setup().await;
    backend.set_response_shape(ResponseShape::Flat).await;

    let mut cart = scenario_cart(&scenario_catalog());
    let mut flow = CheckoutFlow::for_register(&session);
    flow.set_payment(PaymentInput::cash(pesos(3200)));
    let order = submit_checkout(&mut flow, &mut cart, &gateway, Utc::now())
        .await
        .unwrap();
    assert!(order.folio.is_some());

    // Reprint from the listing: no client context, net/tax derived
    let listed = gateway.list_orders().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].net, pesos(2689));
    assert_eq!(listed[0].tax, pesos(511));
    assert_eq!(listed[0].folio, order.folio);

    let corrected = gateway
        .update_payment_method(order.id, PaymentMethod::Credit)
        .await
        .unwrap();
    assert_eq!(corrected.payment_method, PaymentMethod::Credit);
    assert!(corrected.tendered.is_none());
    assert_eq!(corrected.total, pesos(3200));

    let missing = gateway.update_payment_method(999, PaymentMethod::Debit).await;
    assert!(matches!(missing, Err(GatewayError::NotFound { .. })));
}

#[tokio::test]
async fn cash_register_closing_from_listed_orders() {
    let backend = InMemoryBackend::new(
        vec![
            product(1, "Torta Chocolate (porción)", 1200, 100),
            product(2, "Kuchen de Nuez", 800, 100),
        ],
        Vec::new(),
    );
    let cashier_session = backend.issue_session(cashier()).await;
    let admin_session = backend.issue_session(admin()).await;

    let sales = [
        (&cashier_session, PaymentInput::cash(pesos(5000))),
        (&cashier_session, PaymentInput::card(PaymentMethod::Debit)),
        (&admin_session, PaymentInput::card(PaymentMethod::Credit)),
    ];

    for (session, payment) in sales {
        let gateway = RestGateway::new(backend.clone(), session.clone());
        let mut cart = scenario_cart(&scenario_catalog());
        let mut flow = CheckoutFlow::for_register(session);
        flow.set_payment(payment);
        submit_checkout(&mut flow, &mut cart, &gateway, Utc::now())
            .await
            .unwrap();
    }

    let admin_gateway = RestGateway::new(backend.clone(), admin_session.clone());
    let orders = admin_gateway.list_orders().await.unwrap();
    assert_eq!(orders.len(), 3);

    let today = Utc::now().date_naive();
    let summary = closing::summarize(&orders, today, &Utc);
    assert_eq!(summary.overall.count, 3);
    assert_eq!(summary.overall.total, pesos(9600));
    assert_eq!(summary.cash.total, pesos(3200));
    assert_eq!(summary.debit.count, 1);
    assert_eq!(summary.credit.count, 1);

    let sellers = closing::by_seller(&orders, today, &Utc);
    assert_eq!(sellers[0].seller_name, "Carla Soto");
    assert_eq!(sellers[0].tally.count, 2);
    assert_eq!(sellers[1].seller_name, "Administrador");

    // The cashier only sees their own sales
    let own = RestGateway::new(backend.clone(), cashier_session.clone())
        .list_orders()
        .await
        .unwrap();
    assert_eq!(own.len(), 2);
}

#[tokio::test]
async fn storefront_guest_goes_through_every_step() {
    let backend = InMemoryBackend::new(scenario_catalog(), Vec::new());
    // Storefront guests check out through a service account
    let service_session = backend.issue_session(cashier()).await;
    let gateway = RestGateway::new(backend, service_session);

    let mut cart = scenario_cart(&scenario_catalog());
    let mut flow = CheckoutFlow::for_storefront(&Session::anonymous(), DEFAULT_SHIPPING_FEE);
    assert_eq!(flow.step(), CheckoutStep::CollectingInfo);

    flow.set_contact(BuyerContact {
        name: "Pedro Soto".to_string(),
        email: "pedro@mail.cl".to_string(),
        phone: Some("+56 9 8765 4321".to_string()),
        rut: Some("12345678-5".to_string()),
    });
    flow.advance().unwrap();
    flow.advance().unwrap();
    assert_eq!(flow.step(), CheckoutStep::ChoosingPayment);

    flow.set_payment(PaymentInput::card(PaymentMethod::Debit));
    let order = submit_checkout(&mut flow, &mut cart, &gateway, Utc::now())
        .await
        .unwrap();

    assert_eq!(order.total, pesos(3200));
    assert_eq!(order.buyer.display_name(), "Pedro Soto");
    assert_eq!(order.buyer.rut(), Some("12.345.678-5"));
    assert_eq!(
        order.delivery.map(|d| d.kind),
        Some(DeliveryType::Pickup)
    );
}
