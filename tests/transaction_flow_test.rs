mod common;

use assert_matches::assert_matches;
use common::TestApp;
use labstock_api::{
    entities::item_location::Entity as ItemLocationEntity,
    errors::ServiceError,
    services::transactions::{CreateTransactionRequest, SaleLineRequest},
};
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;

fn sale_line(item_code: &str, location_id: i32, quantity: i32) -> SaleLineRequest {
    SaleLineRequest {
        item_code: item_code.to_string(),
        location_id,
        quantity,
        unit_retail_price: dec!(12.50),
        lot_number: Some("LOT-0042".to_string()),
        brand_name: Some("Biorex".to_string()),
        item_description: Some("Assay reagent kit".to_string()),
    }
}

fn sale(invoice: &str, items: Vec<SaleLineRequest>) -> CreateTransactionRequest {
    CreateTransactionRequest {
        invoice_reference: invoice.to_string(),
        transaction_date: None,
        customer_id: Some("CUST-7".to_string()),
        customer_name: Some("Mercury Diagnostics".to_string()),
        items,
    }
}

#[tokio::test]
async fn sale_deducts_ledger_cell_and_aggregate_by_same_amount() {
    let app = TestApp::new().await;
    let brand = app.create_brand("Biorex").await;
    let loc1 = app.create_location("Main").await;
    let loc2 = app.create_location("Annex").await;

    app.services
        .inventory
        .create_inventory(
            TestApp::inventory_request(
                "Bx0000",
                brand.brand_id,
                vec![(loc1.location_id, 60), (loc2.location_id, 40)],
            ),
            &app.actor,
        )
        .await
        .expect("create failed");

    let response = app
        .services
        .transactions
        .create_transaction(
            sale("INV-001", vec![sale_line("Bx0000", loc1.location_id, 15)]),
            &app.actor,
        )
        .await
        .expect("sale failed");

    assert_eq!(response.items.len(), 1);
    assert_eq!(response.transaction.total_retail_price, dec!(187.50));

    // Conservation: aggregate dropped by exactly the sold quantity,
    // and only the sold cell moved.
    let payload = app.services.inventory.get_inventory("Bx0000").await.unwrap();
    assert_eq!(payload.inventory.quantity, 85);

    let cell1 = ItemLocationEntity::find_by_id(("Bx0000".to_string(), loc1.location_id))
        .one(&*app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cell1.quantity, 45);

    let cell2 = ItemLocationEntity::find_by_id(("Bx0000".to_string(), loc2.location_id))
        .one(&*app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cell2.quantity, 40);

    let ledger_sum: i32 = payload.locations.iter().map(|l| l.quantity).sum();
    assert_eq!(ledger_sum, payload.inventory.quantity);
}

#[tokio::test]
async fn deduction_beyond_available_is_rejected_and_cell_unchanged() {
    let app = TestApp::new().await;
    let brand = app.create_brand("Biorex").await;
    let loc = app.create_location("Main").await;

    app.services
        .inventory
        .create_inventory(
            TestApp::inventory_request("Bx0000", brand.brand_id, vec![(loc.location_id, 10)]),
            &app.actor,
        )
        .await
        .expect("create failed");

    let err = app
        .services
        .transactions
        .create_transaction(
            sale("INV-001", vec![sale_line("Bx0000", loc.location_id, 15)]),
            &app.actor,
        )
        .await
        .unwrap_err();

    // The error names both sides of the shortfall
    match &err {
        ServiceError::InsufficientStock(msg) => {
            assert!(msg.contains("available 10"), "message was: {}", msg);
            assert!(msg.contains("requested 15"), "message was: {}", msg);
        }
        other => panic!("expected InsufficientStock, got {:?}", other),
    }

    // Cell and aggregate untouched, no transaction recorded
    let payload = app.services.inventory.get_inventory("Bx0000").await.unwrap();
    assert_eq!(payload.inventory.quantity, 10);
    assert_eq!(payload.locations[0].quantity, 10);
    assert!(app
        .services
        .transactions
        .list_transactions()
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn failing_line_rolls_back_earlier_lines() {
    let app = TestApp::new().await;
    let brand = app.create_brand("Biorex").await;
    let loc = app.create_location("Main").await;

    for code in ["Bx0000", "Bx0001", "Bx0002"] {
        app.services
            .inventory
            .create_inventory(
                TestApp::inventory_request(code, brand.brand_id, vec![(loc.location_id, 20)]),
                &app.actor,
            )
            .await
            .expect("create failed");
    }

    // Third line exceeds stock; the first two must be undone with it
    let err = app
        .services
        .transactions
        .create_transaction(
            sale(
                "INV-001",
                vec![
                    sale_line("Bx0000", loc.location_id, 5),
                    sale_line("Bx0001", loc.location_id, 5),
                    sale_line("Bx0002", loc.location_id, 100),
                ],
            ),
            &app.actor,
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InsufficientStock(_));

    for code in ["Bx0000", "Bx0001", "Bx0002"] {
        let payload = app.services.inventory.get_inventory(code).await.unwrap();
        assert_eq!(payload.inventory.quantity, 20, "{} was not rolled back", code);
    }
    assert!(app
        .services
        .transactions
        .list_transactions()
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn duplicate_invoice_reference_is_a_conflict() {
    let app = TestApp::new().await;
    let brand = app.create_brand("Biorex").await;
    let loc = app.create_location("Main").await;

    app.services
        .inventory
        .create_inventory(
            TestApp::inventory_request("Bx0000", brand.brand_id, vec![(loc.location_id, 50)]),
            &app.actor,
        )
        .await
        .expect("create failed");

    app.services
        .transactions
        .create_transaction(
            sale("INV-001", vec![sale_line("Bx0000", loc.location_id, 5)]),
            &app.actor,
        )
        .await
        .expect("first sale failed");

    let err = app
        .services
        .transactions
        .create_transaction(
            sale("INV-001", vec![sale_line("Bx0000", loc.location_id, 5)]),
            &app.actor,
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));

    // The duplicate attempt deducted nothing
    let payload = app.services.inventory.get_inventory("Bx0000").await.unwrap();
    assert_eq!(payload.inventory.quantity, 45);
}

#[tokio::test]
async fn sale_against_missing_stock_record_is_not_found() {
    let app = TestApp::new().await;
    let brand = app.create_brand("Biorex").await;
    let loc1 = app.create_location("Main").await;
    let loc2 = app.create_location("Annex").await;

    // Stock exists only at loc1
    app.services
        .inventory
        .create_inventory(
            TestApp::inventory_request("Bx0000", brand.brand_id, vec![(loc1.location_id, 50)]),
            &app.actor,
        )
        .await
        .expect("create failed");

    let err = app
        .services
        .transactions
        .create_transaction(
            sale("INV-001", vec![sale_line("Bx0000", loc2.location_id, 5)]),
            &app.actor,
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn deleting_a_transaction_restores_stock() {
    let app = TestApp::new().await;
    let brand = app.create_brand("Biorex").await;
    let loc = app.create_location("Main").await;

    app.services
        .inventory
        .create_inventory(
            TestApp::inventory_request("Bx0000", brand.brand_id, vec![(loc.location_id, 50)]),
            &app.actor,
        )
        .await
        .expect("create failed");

    let response = app
        .services
        .transactions
        .create_transaction(
            sale("INV-001", vec![sale_line("Bx0000", loc.location_id, 12)]),
            &app.actor,
        )
        .await
        .expect("sale failed");

    let before = app.services.inventory.get_inventory("Bx0000").await.unwrap();
    assert_eq!(before.inventory.quantity, 38);

    app.services
        .transactions
        .delete_transaction(response.transaction.transaction_id)
        .await
        .expect("delete failed");

    let after = app.services.inventory.get_inventory("Bx0000").await.unwrap();
    assert_eq!(after.inventory.quantity, 50);
    assert_eq!(after.locations[0].quantity, 50);

    let err = app
        .services
        .transactions
        .get_transaction(response.transaction.transaction_id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn empty_line_items_are_rejected() {
    let app = TestApp::new().await;

    let err = app
        .services
        .transactions
        .create_transaction(sale("INV-001", vec![]), &app.actor)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}
