mod common;

use assert_matches::assert_matches;
use common::TestApp;
use labstock_api::{
    entities::{
        brand::Entity as BrandEntity, item_location::Entity as ItemLocationEntity,
    },
    errors::ServiceError,
    services::brands::{BrandService, CreateBrandRequest},
    services::inventory::LocationQuantity,
    services::purchase_orders::CreatePurchaseOrderRequest,
};
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;
use std::sync::Arc;

fn po_request(brand_id: i32, locations: Vec<(i32, i32)>) -> CreatePurchaseOrderRequest {
    CreatePurchaseOrderRequest {
        brand_id,
        product_description: "Assay reagent kit".to_string(),
        lot_number: Some("LOT-0042".to_string()),
        expiry: None,
        pack_size: Some(50),
        unit_cost: 4.25,
        cost_of_sale: None,
        po_reference: Some("PO-2026-001".to_string()),
        invoice_number: None,
        note: None,
        locations: locations
            .into_iter()
            .map(|(location_id, quantity)| LocationQuantity {
                location_id,
                quantity,
            })
            .collect(),
    }
}

#[tokio::test]
async fn first_minted_code_uses_sequence_zero() {
    let app = TestApp::new().await;
    let brand = app.create_brand("Biorex").await;
    assert_eq!(brand.abbreviation, "Bx");
    assert_eq!(brand.latest_sequence, 0);
    let loc = app.create_location("Main").await;

    let receipt = app
        .services
        .purchase_orders
        .create_purchase_order(po_request(brand.brand_id, vec![(loc.location_id, 30)]), &app.actor)
        .await
        .expect("create failed");

    assert_eq!(receipt.purchase_order.item_code, "Bx0000");

    let receipt2 = app
        .services
        .purchase_orders
        .create_purchase_order(po_request(brand.brand_id, vec![(loc.location_id, 10)]), &app.actor)
        .await
        .expect("second create failed");
    assert_eq!(receipt2.purchase_order.item_code, "Bx0001");

    let brand = BrandEntity::find_by_id(brand.brand_id)
        .one(&*app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(brand.latest_sequence, 2);
}

#[tokio::test]
async fn intake_creates_counterpart_inventory_and_ledger_rows() {
    let app = TestApp::new().await;
    let brand = app.create_brand("Biorex").await;
    let loc1 = app.create_location("Main").await;
    let loc2 = app.create_location("Annex").await;

    let receipt = app
        .services
        .purchase_orders
        .create_purchase_order(
            po_request(brand.brand_id, vec![(loc1.location_id, 30), (loc2.location_id, 20)]),
            &app.actor,
        )
        .await
        .expect("create failed");

    assert_eq!(receipt.purchase_order.quantity, 50);
    assert_eq!(receipt.purchase_order.unit_cost, dec!(4.25));
    assert_eq!(receipt.purchase_order.total_cost, dec!(212.50));

    // The counterpart inventory is immediately readable under the minted code
    let payload = app
        .services
        .inventory
        .get_inventory(&receipt.purchase_order.item_code)
        .await
        .expect("counterpart inventory missing");
    assert_eq!(payload.inventory.quantity, 50);
    assert_eq!(payload.locations.len(), 2);
    assert_eq!(payload.inventory.added_by, "Test User");
}

#[tokio::test]
async fn intake_against_unknown_brand_is_not_found() {
    let app = TestApp::new().await;
    let loc = app.create_location("Main").await;

    let err = app
        .services
        .purchase_orders
        .create_purchase_order(po_request(999, vec![(loc.location_id, 10)]), &app.actor)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn deleting_a_purchase_order_removes_counterparts() {
    let app = TestApp::new().await;
    let brand = app.create_brand("Biorex").await;
    let loc = app.create_location("Main").await;

    let receipt = app
        .services
        .purchase_orders
        .create_purchase_order(po_request(brand.brand_id, vec![(loc.location_id, 30)]), &app.actor)
        .await
        .expect("create failed");
    let code = receipt.purchase_order.item_code.clone();

    app.services
        .purchase_orders
        .delete_purchase_order(&code)
        .await
        .expect("delete failed");

    assert!(app
        .services
        .purchase_orders
        .get_purchase_order(&code)
        .await
        .unwrap()
        .is_none());

    let err = app.services.inventory.get_inventory(&code).await.unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    let cell = ItemLocationEntity::find_by_id((code, loc.location_id))
        .one(&*app.db)
        .await
        .unwrap();
    assert!(cell.is_none());
}

#[tokio::test]
async fn brand_names_conflict_case_insensitively() {
    let app = TestApp::new().await;
    app.create_brand("Acme").await;

    let err = app
        .services
        .brands
        .create_brand(CreateBrandRequest {
            brand_name: "acme".to_string(),
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));
}

#[tokio::test]
async fn concurrent_mints_produce_distinct_gapless_codes() {
    let app = TestApp::new().await;
    let brand = app.create_brand("Biorex").await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let db = Arc::clone(&app.db);
        let brand_id = brand.brand_id;
        handles.push(tokio::spawn(async move {
            BrandService::generate_item_code(&*db, brand_id).await
        }));
    }

    let mut codes = Vec::new();
    for handle in handles {
        codes.push(handle.await.unwrap().expect("mint failed"));
    }

    let mut sorted = codes.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), codes.len(), "duplicate codes minted: {:?}", codes);

    // Gapless: exactly the codes Bx0000..Bx0007 in some order
    let expected: Vec<String> = (0..8).map(|n| format!("Bx{:04}", n)).collect();
    assert_eq!(sorted, expected);

    let brand = BrandEntity::find_by_id(brand.brand_id)
        .one(&*app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(brand.latest_sequence, 8);
}
