mod common;

use assert_matches::assert_matches;
use chrono::{NaiveDate, TimeZone, Utc};
use common::TestApp;
use labstock_api::{
    errors::ServiceError,
    services::transactions::{CreateTransactionRequest, SaleLineRequest},
};
use rust_decimal_macros::dec;

async fn seed_stock(app: &TestApp) -> (i32, String) {
    let brand = app.create_brand("Biorex").await;
    let loc = app.create_location("Main").await;
    app.services
        .inventory
        .create_inventory(
            TestApp::inventory_request("Bx0000", brand.brand_id, vec![(loc.location_id, 1000)]),
            &app.actor,
        )
        .await
        .expect("seed failed");
    (loc.location_id, "Bx0000".to_string())
}

async fn record_sale(
    app: &TestApp,
    invoice: &str,
    date: NaiveDate,
    location_id: i32,
    item_code: &str,
    quantity: i32,
) {
    let transaction_date = Utc.from_utc_datetime(&date.and_hms_opt(12, 0, 0).unwrap());
    app.services
        .transactions
        .create_transaction(
            CreateTransactionRequest {
                invoice_reference: invoice.to_string(),
                transaction_date: Some(transaction_date),
                customer_id: None,
                customer_name: Some("Mercury Diagnostics".to_string()),
                items: vec![SaleLineRequest {
                    item_code: item_code.to_string(),
                    location_id,
                    quantity,
                    unit_retail_price: dec!(10.00),
                    lot_number: None,
                    brand_name: None,
                    item_description: None,
                }],
            },
            &app.actor,
        )
        .await
        .expect("sale failed");
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn monthly_stats_include_both_boundary_days() {
    let app = TestApp::new().await;
    let (loc, code) = seed_stock(&app).await;

    // On the boundaries, inside, and one day outside each end
    record_sale(&app, "INV-A", day(2026, 2, 28), loc, &code, 1).await;
    record_sale(&app, "INV-B", day(2026, 3, 1), loc, &code, 2).await;
    record_sale(&app, "INV-C", day(2026, 3, 15), loc, &code, 3).await;
    record_sale(&app, "INV-D", day(2026, 3, 31), loc, &code, 4).await;
    record_sale(&app, "INV-E", day(2026, 4, 1), loc, &code, 5).await;

    let stats = app
        .services
        .dashboard
        .dashboard_stats("monthly", Some("2026-03"))
        .await
        .unwrap();

    assert_eq!(stats.total_transactions, 3);
    assert_eq!(stats.total_quantity_transacted, 2 + 3 + 4);
    assert_eq!(stats.total_order_value, dec!(90.00));
    assert_eq!(stats.period, "monthly");
    assert_eq!(stats.date_range, "2026-03");
}

#[tokio::test]
async fn daily_stats_cover_exactly_one_day() {
    let app = TestApp::new().await;
    let (loc, code) = seed_stock(&app).await;

    record_sale(&app, "INV-A", day(2026, 3, 14), loc, &code, 1).await;
    record_sale(&app, "INV-B", day(2026, 3, 15), loc, &code, 2).await;
    record_sale(&app, "INV-C", day(2026, 3, 16), loc, &code, 3).await;

    let stats = app
        .services
        .dashboard
        .dashboard_stats("daily", Some("2026-03-15"))
        .await
        .unwrap();

    assert_eq!(stats.total_transactions, 1);
    assert_eq!(stats.total_quantity_transacted, 2);
    assert_eq!(stats.date_range, "2026-03-15");
}

#[tokio::test]
async fn yearly_stats_span_january_through_december() {
    let app = TestApp::new().await;
    let (loc, code) = seed_stock(&app).await;

    record_sale(&app, "INV-A", day(2025, 12, 31), loc, &code, 1).await;
    record_sale(&app, "INV-B", day(2026, 1, 1), loc, &code, 2).await;
    record_sale(&app, "INV-C", day(2026, 12, 31), loc, &code, 3).await;
    record_sale(&app, "INV-D", day(2027, 1, 1), loc, &code, 4).await;

    let stats = app
        .services
        .dashboard
        .dashboard_stats("yearly", Some("2026"))
        .await
        .unwrap();

    assert_eq!(stats.total_transactions, 2);
    assert_eq!(stats.total_quantity_transacted, 5);
    assert_eq!(stats.date_range, "2026");
}

#[tokio::test]
async fn stats_over_empty_window_are_zero() {
    let app = TestApp::new().await;

    let stats = app
        .services
        .dashboard
        .dashboard_stats("monthly", Some("2026-03"))
        .await
        .unwrap();

    assert_eq!(stats.total_transactions, 0);
    assert_eq!(stats.total_quantity_transacted, 0);
    assert_eq!(stats.total_order_value, dec!(0));
}

#[tokio::test]
async fn unknown_period_is_invalid_input() {
    let app = TestApp::new().await;

    let err = app
        .services
        .dashboard
        .dashboard_stats("weekly", None)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidInput(_));
}

#[tokio::test]
async fn malformed_anchor_date_is_invalid_input() {
    let app = TestApp::new().await;

    let err = app
        .services
        .dashboard
        .dashboard_stats("monthly", Some("March 2026"))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidInput(_));
}

#[tokio::test]
async fn period_is_parsed_case_insensitively() {
    let app = TestApp::new().await;

    let stats = app
        .services
        .dashboard
        .dashboard_stats("MONTHLY", Some("2026-03"))
        .await
        .unwrap();
    assert_eq!(stats.period, "monthly");
}
