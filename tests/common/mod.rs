use std::sync::Arc;

use labstock_api::{
    auth::AuthUser,
    db::{self, DbConfig, DbPool},
    entities::{brand, location},
    events::{self, EventSender},
    handlers::AppServices,
    services::inventory::{CreateInventoryRequest, LocationQuantity},
};

/// Test harness backed by a private in-memory SQLite database.
///
/// The pool is pinned to a single connection so the in-memory database
/// survives for the lifetime of the harness and concurrent tasks serialize
/// on it the same way independent requests serialize on row locks.
pub struct TestApp {
    pub db: Arc<DbPool>,
    pub services: AppServices,
    pub actor: AuthUser,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        let cfg = DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        };

        let pool = db::establish_connection_with_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db = Arc::new(pool);
        let (event_sender, event_rx) = EventSender::channel(256);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let services = AppServices::new(db.clone(), event_sender);

        let actor = AuthUser {
            user_id: "1".to_string(),
            name: Some("Test User".to_string()),
            token_id: "test-token".to_string(),
        };

        Self {
            db,
            services,
            actor,
            _event_task: event_task,
        }
    }

    pub async fn create_brand(&self, name: &str) -> brand::Model {
        self.services
            .brands
            .create_brand(labstock_api::services::brands::CreateBrandRequest {
                brand_name: name.to_string(),
            })
            .await
            .expect("failed to create brand")
    }

    pub async fn create_location(&self, name: &str) -> location::Model {
        self.services
            .locations
            .create_location(labstock_api::services::locations::LocationRequest {
                location_name: name.to_string(),
            })
            .await
            .expect("failed to create location")
    }

    /// Bare inventory request with sensible defaults for tests.
    pub fn inventory_request(
        item_code: &str,
        brand_id: i32,
        locations: Vec<(i32, i32)>,
    ) -> CreateInventoryRequest {
        CreateInventoryRequest {
            item_code: item_code.to_string(),
            brand_id,
            item_description: "Assay reagent kit".to_string(),
            lot_number: Some("LOT-0042".to_string()),
            expiry: None,
            pack_size: Some(50),
            cost_of_sale: None,
            note: None,
            po_reference: Some("PO-2026-001".to_string()),
            invoice_number: None,
            locations: locations
                .into_iter()
                .map(|(location_id, quantity)| LocationQuantity {
                    location_id,
                    quantity,
                })
                .collect(),
        }
    }
}
