mod common;

use assert_matches::assert_matches;
use common::TestApp;
use labstock_api::{
    entities::item_location::{self, Entity as ItemLocationEntity},
    errors::ServiceError,
    services::inventory::{LocationQuantity, UpdateInventoryRequest},
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

#[tokio::test]
async fn create_then_fetch_returns_locations_and_derived_total() {
    let app = TestApp::new().await;
    let brand = app.create_brand("Biorex").await;
    let loc1 = app.create_location("Main cold storage").await;
    let loc2 = app.create_location("Annex shelf 3").await;

    let created = app
        .services
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

    // The aggregate is derived from the submitted locations
    assert_eq!(created.inventory.quantity, 100);
    assert_eq!(created.inventory.added_by, "Test User");

    let fetched = app
        .services
        .inventory
        .get_inventory("Bx0000")
        .await
        .expect("fetch failed");

    assert_eq!(fetched.inventory.item_code, "Bx0000");
    assert_eq!(fetched.inventory.quantity, 100);
    assert_eq!(fetched.locations.len(), 2);

    let mut quantities: Vec<(i32, i32)> = fetched
        .locations
        .iter()
        .map(|l| (l.location_id, l.quantity))
        .collect();
    quantities.sort();
    assert_eq!(
        quantities,
        vec![(loc1.location_id, 60), (loc2.location_id, 40)]
    );
}

#[tokio::test]
async fn duplicate_item_code_is_a_conflict() {
    let app = TestApp::new().await;
    let brand = app.create_brand("Biorex").await;
    let loc = app.create_location("Main").await;

    app.services
        .inventory
        .create_inventory(
            TestApp::inventory_request("Bx0000", brand.brand_id, vec![(loc.location_id, 5)]),
            &app.actor,
        )
        .await
        .expect("first create failed");

    let err = app
        .services
        .inventory
        .create_inventory(
            TestApp::inventory_request("Bx0000", brand.brand_id, vec![(loc.location_id, 5)]),
            &app.actor,
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));
}

#[tokio::test]
async fn unknown_location_fails_and_leaves_nothing_behind() {
    let app = TestApp::new().await;
    let brand = app.create_brand("Biorex").await;

    let err = app
        .services
        .inventory
        .create_inventory(
            TestApp::inventory_request("Bx0000", brand.brand_id, vec![(999, 5)]),
            &app.actor,
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    // Nothing committed: the whole create rolled back
    let err = app.services.inventory.get_inventory("Bx0000").await.unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn update_replaces_location_set_and_rederives_total() {
    let app = TestApp::new().await;
    let brand = app.create_brand("Biorex").await;
    let loc1 = app.create_location("Main").await;
    let loc2 = app.create_location("Annex").await;
    let loc3 = app.create_location("Satellite lab").await;

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

    let updated = app
        .services
        .inventory
        .update_inventory(
            "Bx0000",
            UpdateInventoryRequest {
                brand_id: brand.brand_id,
                item_description: "Assay reagent kit, v2".to_string(),
                lot_number: Some("LOT-0043".to_string()),
                expiry: None,
                pack_size: Some(50),
                cost_of_sale: None,
                note: Some("relabelled".to_string()),
                po_reference: None,
                invoice_number: None,
                locations: vec![
                    LocationQuantity {
                        location_id: loc2.location_id,
                        quantity: 10,
                    },
                    LocationQuantity {
                        location_id: loc3.location_id,
                        quantity: 25,
                    },
                ],
            },
            &app.actor,
        )
        .await
        .expect("update failed");

    // Total re-derived from the replacement rows, not carried over
    assert_eq!(updated.inventory.quantity, 35);
    assert_eq!(updated.inventory.item_description, "Assay reagent kit, v2");

    let rows = ItemLocationEntity::find()
        .filter(item_location::Column::ItemCode.eq("Bx0000"))
        .all(&*app.db)
        .await
        .unwrap();
    let mut pairs: Vec<(i32, i32)> = rows.iter().map(|r| (r.location_id, r.quantity)).collect();
    pairs.sort();
    // The old loc1 row is gone entirely
    assert_eq!(
        pairs,
        vec![(loc2.location_id, 10), (loc3.location_id, 25)]
    );
}

#[tokio::test]
async fn update_of_missing_item_is_not_found() {
    let app = TestApp::new().await;
    let brand = app.create_brand("Biorex").await;

    let err = app
        .services
        .inventory
        .update_inventory(
            "NOPE01",
            UpdateInventoryRequest {
                brand_id: brand.brand_id,
                item_description: "x".to_string(),
                lot_number: None,
                expiry: None,
                pack_size: None,
                cost_of_sale: None,
                note: None,
                po_reference: None,
                invoice_number: None,
                locations: vec![],
            },
            &app.actor,
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn delete_cascades_to_ledger_rows() {
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

    app.services
        .inventory
        .delete_inventory("Bx0000")
        .await
        .expect("delete failed");

    let err = app.services.inventory.get_inventory("Bx0000").await.unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    let remaining = ItemLocationEntity::find()
        .filter(item_location::Column::ItemCode.eq("Bx0000"))
        .all(&*app.db)
        .await
        .unwrap();
    assert!(remaining.is_empty());
}

#[tokio::test]
async fn stock_alerts_report_items_at_or_below_threshold() {
    let app = TestApp::new().await;
    let brand = app.create_brand("Biorex").await;
    let loc = app.create_location("Main").await;

    for (code, qty) in [("Bx0000", 3), ("Bx0001", 10), ("Bx0002", 11)] {
        app.services
            .inventory
            .create_inventory(
                TestApp::inventory_request(code, brand.brand_id, vec![(loc.location_id, qty)]),
                &app.actor,
            )
            .await
            .expect("create failed");
    }

    let alerts = app.services.inventory.stock_alerts(10).await.unwrap();
    let codes: Vec<&str> = alerts
        .iter()
        .map(|p| p.inventory.item_code.as_str())
        .collect();

    // at-or-below: 10 is included, 11 is not
    assert_eq!(codes, vec!["Bx0000", "Bx0001"]);
    assert_eq!(alerts[0].locations.len(), 1);
}

#[tokio::test]
async fn highest_and_lowest_stock_sort_by_quantity() {
    let app = TestApp::new().await;
    let brand = app.create_brand("Biorex").await;
    let loc = app.create_location("Main").await;

    for (code, qty) in [("Bx0000", 50), ("Bx0001", 100), ("Bx0002", 25)] {
        app.services
            .inventory
            .create_inventory(
                TestApp::inventory_request(code, brand.brand_id, vec![(loc.location_id, qty)]),
                &app.actor,
            )
            .await
            .expect("create failed");
    }

    let highest = app.services.inventory.highest_stock().await.unwrap();
    let quantities: Vec<i32> = highest.iter().map(|i| i.quantity).collect();
    assert_eq!(quantities, vec![100, 50, 25]);

    let lowest = app.services.inventory.lowest_stock().await.unwrap();
    let quantities: Vec<i32> = lowest.iter().map(|i| i.quantity).collect();
    assert_eq!(quantities, vec![25, 50, 100]);
}

#[tokio::test]
async fn duplicate_location_in_payload_is_rejected() {
    let app = TestApp::new().await;
    let brand = app.create_brand("Biorex").await;
    let loc = app.create_location("Main").await;

    let err = app
        .services
        .inventory
        .create_inventory(
            TestApp::inventory_request(
                "Bx0000",
                brand.brand_id,
                vec![(loc.location_id, 10), (loc.location_id, 20)],
            ),
            &app.actor,
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidInput(_));
}
