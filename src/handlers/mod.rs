pub mod brands;
pub mod common;
pub mod inventory;
pub mod locations;
pub mod purchase_orders;
pub mod reports;
pub mod transactions;

use crate::db::DbPool;
use crate::events::EventSender;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub brands: Arc<crate::services::brands::BrandService>,
    pub locations: Arc<crate::services::locations::LocationService>,
    pub inventory: Arc<crate::services::inventory::InventoryService>,
    pub purchase_orders: Arc<crate::services::purchase_orders::PurchaseOrderService>,
    pub transactions: Arc<crate::services::transactions::TransactionService>,
    pub dashboard: Arc<crate::services::reports::DashboardService>,
}

impl AppServices {
    /// Builds the service container over a shared pool and event channel.
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        let brands = Arc::new(crate::services::brands::BrandService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let locations = Arc::new(crate::services::locations::LocationService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let inventory = Arc::new(crate::services::inventory::InventoryService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let purchase_orders = Arc::new(
            crate::services::purchase_orders::PurchaseOrderService::new(
                db_pool.clone(),
                event_sender.clone(),
            ),
        );
        let transactions = Arc::new(crate::services::transactions::TransactionService::new(
            db_pool.clone(),
            event_sender,
        ));
        let dashboard = Arc::new(crate::services::reports::DashboardService::new(db_pool));

        Self {
            brands,
            locations,
            inventory,
            purchase_orders,
            transactions,
            dashboard,
        }
    }
}
