mod common;

use assert_matches::assert_matches;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use common::{item, payment, TestApp};
use counterbook::{
    entities::{
        money_transaction::{Direction, TransactionType},
        order::OrderPaymentStatus,
        order_payment::PaymentState,
    },
    errors::ServiceError,
    services::{
        money_transactions::TransactionSource,
        order_items::NewOrderItem,
        order_payments::NewOrderPayment,
        orders::{CreateOrderRequest, EditOrderRequest},
        RemovalPolicy,
    },
};

fn create_request(
    warehouse_id: Uuid,
    items: Vec<NewOrderItem>,
    payments: Vec<NewOrderPayment>,
    created_by: Uuid,
) -> CreateOrderRequest {
    CreateOrderRequest {
        warehouse_id,
        delivery_service_id: None,
        order_source_id: None,
        order_status_id: None,
        client_id: None,
        comment: None,
        items,
        payments,
        created_by,
        confirmed_by: None,
    }
}

fn edit_request(
    items: Vec<NewOrderItem>,
    payments: Vec<NewOrderPayment>,
    edited_by: Uuid,
) -> EditOrderRequest {
    EditOrderRequest {
        warehouse_id: None,
        delivery_service_id: None,
        order_source_id: None,
        order_status_id: None,
        client_id: None,
        comment: None,
        items,
        payments,
        edited_by,
    }
}

#[tokio::test]
async fn create_order_computes_profit_stock_and_payment_status() {
    let app = TestApp::new().await;
    let usd = app.seed_currency("USD").await;
    let warehouse = app.seed_warehouse("Main").await;
    let (register, account) = app.seed_cashregister(usd.id).await;
    let product = app.seed_product("Desk lamp", dec!(60), usd.id).await;

    // Two units at 100 with a 10% discount net to 180, matched by the payment.
    let mut line = item(product.id, usd.id, 2, dec!(100));
    line.discount_percent = Some(dec!(10));

    let order = app
        .services
        .orders
        .create_order(create_request(
            warehouse.id,
            vec![line],
            vec![payment(register.id, account.id, dec!(180), usd.id)],
            app.user_id,
        ))
        .await
        .expect("create order");

    assert_eq!(order.payment_status, OrderPaymentStatus::Paid);
    assert!(!order.removed);

    let items = app
        .services
        .order_items
        .items_for_order(order.id, RemovalPolicy::ActiveOnly)
        .await
        .expect("load items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].purchase_price, dec!(60));
    assert_eq!(items[0].purchase_currency_id, usd.id);
    assert_eq!(items[0].exchange_rate, Decimal::ONE);
    assert_eq!(items[0].profit, dec!(60));

    let payments = app
        .services
        .order_payments
        .payments_for_order(order.id, RemovalPolicy::ActiveOnly)
        .await
        .expect("load payments");
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].state, PaymentState::Paid);
    assert!(payments[0].transaction_id.is_some());
    assert_eq!(order.payment_id_list(), vec![payments[0].id]);

    assert_eq!(app.stock_level(product.id, warehouse.id).await, -2);

    let ledger = app
        .services
        .money_transactions
        .transactions_for_source(TransactionSource::Order(order.id))
        .await
        .expect("load ledger");
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].transaction_type, TransactionType::Income);
    assert_eq!(ledger[0].direction, Direction::In);
    assert_eq!(ledger[0].amount, dec!(180));
    assert!(ledger[0].confirmed);
    assert_eq!(ledger[0].id, payments[0].transaction_id.unwrap());
}

#[tokio::test]
async fn create_order_converts_purchase_price_for_profit() {
    let app = TestApp::new().await;
    let usd = app.seed_currency("USD").await;
    let eur = app.seed_currency("EUR").await;
    app.seed_exchange_rate(eur.id, usd.id, dec!(2)).await;
    let warehouse = app.seed_warehouse("Main").await;
    let product = app.seed_product("Imported chair", dec!(50), eur.id).await;

    let order = app
        .services
        .orders
        .create_order(create_request(
            warehouse.id,
            vec![item(product.id, usd.id, 1, dec!(120))],
            Vec::new(),
            app.user_id,
        ))
        .await
        .expect("create order");

    // 50 EUR at rate 2 costs 100 USD, leaving 20 profit on a 120 sale.
    let items = app
        .services
        .order_items
        .items_for_order(order.id, RemovalPolicy::ActiveOnly)
        .await
        .expect("load items");
    assert_eq!(items[0].exchange_rate, dec!(2));
    assert_eq!(items[0].profit, dec!(20));

    assert_eq!(order.payment_status, OrderPaymentStatus::Unpaid);
}

#[tokio::test]
async fn create_order_with_unknown_product_aborts() {
    let app = TestApp::new().await;
    let usd = app.seed_currency("USD").await;
    let warehouse = app.seed_warehouse("Main").await;

    let missing = Uuid::new_v4();
    let err = app
        .services
        .orders
        .create_order(create_request(
            warehouse.id,
            vec![item(missing, usd.id, 1, dec!(10))],
            Vec::new(),
            app.user_id,
        ))
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::ProductNotFound(id) if id == missing);
}

#[tokio::test]
async fn edit_order_replaces_sets_and_reverts_stock() {
    let app = TestApp::new().await;
    let usd = app.seed_currency("USD").await;
    let warehouse = app.seed_warehouse("Main").await;
    let (register, account) = app.seed_cashregister(usd.id).await;
    let product = app.seed_product("Desk lamp", dec!(60), usd.id).await;

    let order = app
        .services
        .orders
        .create_order(create_request(
            warehouse.id,
            vec![item(product.id, usd.id, 2, dec!(100))],
            vec![payment(register.id, account.id, dec!(200), usd.id)],
            app.user_id,
        ))
        .await
        .expect("create order");
    assert_eq!(order.payment_status, OrderPaymentStatus::Paid);
    assert_eq!(app.stock_level(product.id, warehouse.id).await, -2);

    let edited = app
        .services
        .orders
        .edit_order(
            order.id,
            edit_request(
                vec![item(product.id, usd.id, 3, dec!(100))],
                vec![payment(register.id, account.id, dec!(100), usd.id)],
                app.user_id,
            ),
        )
        .await
        .expect("edit order");

    // 100 paid against a 300 total.
    assert_eq!(edited.payment_status, OrderPaymentStatus::PartiallyPaid);

    // The old pair of units went back before the new three went out.
    assert_eq!(app.stock_level(product.id, warehouse.id).await, -3);

    let live_items = app
        .services
        .order_items
        .items_for_order(order.id, RemovalPolicy::ActiveOnly)
        .await
        .expect("load items");
    assert_eq!(live_items.len(), 1);
    assert_eq!(live_items[0].quantity, 3);

    let all_items = app
        .services
        .order_items
        .items_for_order(order.id, RemovalPolicy::IncludeRemoved)
        .await
        .expect("load items");
    assert_eq!(all_items.len(), 2);

    let live_payments = app
        .services
        .order_payments
        .payments_for_order(order.id, RemovalPolicy::ActiveOnly)
        .await
        .expect("load payments");
    assert_eq!(live_payments.len(), 1);
    assert_eq!(live_payments[0].amount, dec!(100));
    assert_eq!(edited.payment_id_list(), vec![live_payments[0].id]);

    let all_payments = app
        .services
        .order_payments
        .payments_for_order(order.id, RemovalPolicy::IncludeRemoved)
        .await
        .expect("load payments");
    assert_eq!(all_payments.len(), 2);
    let cancelled: Vec<_> = all_payments.iter().filter(|p| p.removed).collect();
    assert_eq!(cancelled.len(), 1);
    assert_eq!(cancelled[0].state, PaymentState::Cancelled);
    assert_eq!(cancelled[0].removed_by, Some(app.user_id));

    // Ledger: the original income, its reversal, and the new income.
    let ledger = app
        .services
        .money_transactions
        .transactions_for_source(TransactionSource::Order(order.id))
        .await
        .expect("load ledger");
    assert_eq!(ledger.len(), 3);

    let reversals: Vec<_> = ledger
        .iter()
        .filter(|row| row.direction == Direction::Out)
        .collect();
    assert_eq!(reversals.len(), 1);
    assert_eq!(reversals[0].transaction_type, TransactionType::Income);
    assert_eq!(reversals[0].amount, dec!(200));
    assert!(reversals[0]
        .description
        .as_deref()
        .unwrap_or_default()
        .starts_with("Reversal of payment"));

    let incoming: Decimal = ledger
        .iter()
        .filter(|row| row.direction == Direction::In)
        .map(|row| row.amount)
        .sum();
    assert_eq!(incoming, dec!(300));
}

#[tokio::test]
async fn edit_order_moves_stock_between_warehouses() {
    let app = TestApp::new().await;
    let usd = app.seed_currency("USD").await;
    let old_warehouse = app.seed_warehouse("Old").await;
    let new_warehouse = app.seed_warehouse("New").await;
    let product = app.seed_product("Desk lamp", dec!(60), usd.id).await;

    let order = app
        .services
        .orders
        .create_order(create_request(
            old_warehouse.id,
            vec![item(product.id, usd.id, 1, dec!(100))],
            Vec::new(),
            app.user_id,
        ))
        .await
        .expect("create order");
    assert_eq!(app.stock_level(product.id, old_warehouse.id).await, -1);

    let mut request = edit_request(
        vec![item(product.id, usd.id, 1, dec!(100))],
        Vec::new(),
        app.user_id,
    );
    request.warehouse_id = Some(new_warehouse.id);

    let edited = app
        .services
        .orders
        .edit_order(order.id, request)
        .await
        .expect("edit order");

    // The old line goes back into the warehouse the order had before the
    // edit; the new line comes out of the new one.
    assert_eq!(edited.warehouse_id, new_warehouse.id);
    assert_eq!(app.stock_level(product.id, old_warehouse.id).await, 0);
    assert_eq!(app.stock_level(product.id, new_warehouse.id).await, -1);
}

#[tokio::test]
async fn edit_with_the_same_items_nets_zero_stock_change() {
    let app = TestApp::new().await;
    let usd = app.seed_currency("USD").await;
    let warehouse = app.seed_warehouse("Main").await;
    let product = app.seed_product("Desk lamp", dec!(60), usd.id).await;

    let order = app
        .services
        .orders
        .create_order(create_request(
            warehouse.id,
            vec![item(product.id, usd.id, 2, dec!(100))],
            Vec::new(),
            app.user_id,
        ))
        .await
        .expect("create order");
    assert_eq!(app.stock_level(product.id, warehouse.id).await, -2);

    // Resubmitting the identical line reverts the old one and books the
    // new one; the stored count ends where it started.
    app.services
        .orders
        .edit_order(
            order.id,
            edit_request(
                vec![item(product.id, usd.id, 2, dec!(100))],
                Vec::new(),
                app.user_id,
            ),
        )
        .await
        .expect("edit order");

    assert_eq!(app.stock_level(product.id, warehouse.id).await, -2);

    let all_items = app
        .services
        .order_items
        .items_for_order(order.id, RemovalPolicy::IncludeRemoved)
        .await
        .expect("load items");
    assert_eq!(all_items.len(), 2);
    assert_eq!(all_items.iter().filter(|i| !i.removed).count(), 1);
}

#[tokio::test]
async fn edit_missing_order_is_reported_as_not_found() {
    let app = TestApp::new().await;

    let missing = Uuid::new_v4();
    let err = app
        .services
        .orders
        .edit_order(missing, edit_request(Vec::new(), Vec::new(), app.user_id))
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::OrderNotFound(id) if id == missing);
}

#[tokio::test]
async fn remove_orders_soft_marks_and_leaves_children_alone() {
    let app = TestApp::new().await;
    let usd = app.seed_currency("USD").await;
    let warehouse = app.seed_warehouse("Main").await;
    let (register, account) = app.seed_cashregister(usd.id).await;
    let product = app.seed_product("Desk lamp", dec!(60), usd.id).await;

    let order = app
        .services
        .orders
        .create_order(create_request(
            warehouse.id,
            vec![item(product.id, usd.id, 1, dec!(100))],
            vec![payment(register.id, account.id, dec!(100), usd.id)],
            app.user_id,
        ))
        .await
        .expect("create order");

    let removed = app
        .services
        .orders
        .remove_orders(&[order.id], app.user_id)
        .await
        .expect("remove order");
    assert_eq!(removed, 1);

    let err = app
        .services
        .orders
        .get_order(order.id, RemovalPolicy::ActiveOnly)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::OrderNotFound(_));

    let stored = app
        .services
        .orders
        .get_order(order.id, RemovalPolicy::IncludeRemoved)
        .await
        .expect("load removed order");
    assert!(stored.removed);
    assert_eq!(stored.removed_by, Some(app.user_id));

    // Removal does not cancel payments, revert stock, or touch the ledger.
    let live_items = app
        .services
        .order_items
        .items_for_order(order.id, RemovalPolicy::ActiveOnly)
        .await
        .expect("load items");
    assert_eq!(live_items.len(), 1);

    let live_payments = app
        .services
        .order_payments
        .payments_for_order(order.id, RemovalPolicy::ActiveOnly)
        .await
        .expect("load payments");
    assert_eq!(live_payments.len(), 1);
    assert_eq!(live_payments[0].state, PaymentState::Paid);

    assert_eq!(app.stock_level(product.id, warehouse.id).await, -1);

    let ledger = app
        .services
        .money_transactions
        .transactions_for_source(TransactionSource::Order(order.id))
        .await
        .expect("load ledger");
    assert_eq!(ledger.len(), 1);
}

#[tokio::test]
async fn removing_unknown_orders_reports_nothing_removed() {
    let app = TestApp::new().await;

    let err = app
        .services
        .orders
        .remove_orders(&[Uuid::new_v4()], app.user_id)
        .await
        .unwrap_err();

    assert_matches!(err, ServiceError::NotRemoved);
}
