mod common;

use futures::future::join_all;
use uuid::Uuid;

use common::TestApp;
use counterbook::services::quantities::QuantityAdjustment;

#[tokio::test]
async fn increments_accumulate_and_set_overwrites() {
    let app = TestApp::new().await;
    let product_id = Uuid::new_v4();
    let warehouse_id = Uuid::new_v4();

    let count = app
        .services
        .quantities
        .adjust(product_id, warehouse_id, 5, QuantityAdjustment::Increment)
        .await
        .expect("first increment");
    assert_eq!(count, 5);

    let count = app
        .services
        .quantities
        .adjust(product_id, warehouse_id, 3, QuantityAdjustment::Increment)
        .await
        .expect("second increment");
    assert_eq!(count, 8);

    let count = app
        .services
        .quantities
        .adjust(product_id, warehouse_id, 2, QuantityAdjustment::Set)
        .await
        .expect("overwrite");
    assert_eq!(count, 2);

    let stored = app
        .services
        .quantities
        .count_for(product_id, warehouse_id)
        .await
        .expect("read count");
    assert_eq!(stored, 2);
}

#[tokio::test]
async fn first_touch_creates_the_row_and_allows_negative_counts() {
    let app = TestApp::new().await;
    let product_id = Uuid::new_v4();
    let warehouse_id = Uuid::new_v4();

    let before = app
        .services
        .quantities
        .count_for(product_id, warehouse_id)
        .await
        .expect("read count");
    assert_eq!(before, 0);

    // Selling from an untracked warehouse drives the count below zero.
    let count = app
        .services
        .quantities
        .adjust(product_id, warehouse_id, -4, QuantityAdjustment::Increment)
        .await
        .expect("negative increment");
    assert_eq!(count, -4);

    assert_eq!(app.stock_level(product_id, warehouse_id).await, -4);
}

#[tokio::test]
async fn pairs_are_tracked_independently() {
    let app = TestApp::new().await;
    let product_id = Uuid::new_v4();
    let other_product_id = Uuid::new_v4();
    let first_warehouse = Uuid::new_v4();
    let second_warehouse = Uuid::new_v4();

    app.services
        .quantities
        .adjust(product_id, first_warehouse, 5, QuantityAdjustment::Increment)
        .await
        .expect("adjust first warehouse");
    app.services
        .quantities
        .adjust(product_id, second_warehouse, 7, QuantityAdjustment::Increment)
        .await
        .expect("adjust second warehouse");

    assert_eq!(app.stock_level(product_id, first_warehouse).await, 5);
    assert_eq!(app.stock_level(product_id, second_warehouse).await, 7);
    assert_eq!(app.stock_level(other_product_id, first_warehouse).await, 0);
}

#[tokio::test]
async fn concurrent_increments_do_not_lose_updates() {
    let app = TestApp::new().await;
    let product_id = Uuid::new_v4();
    let warehouse_id = Uuid::new_v4();

    // Touch the pair once so every concurrent call below takes the
    // in-place update path instead of racing to create the row.
    app.services
        .quantities
        .adjust(product_id, warehouse_id, 0, QuantityAdjustment::Increment)
        .await
        .expect("create tracking row");

    let results = join_all((0..8).map(|_| {
        app.services
            .quantities
            .adjust(product_id, warehouse_id, 1, QuantityAdjustment::Increment)
    }))
    .await;

    for result in results {
        result.expect("concurrent increment");
    }

    assert_eq!(app.stock_level(product_id, warehouse_id).await, 8);
}
