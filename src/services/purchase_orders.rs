use crate::{
    auth::AuthenticatedUser,
    db::DbPool,
    entities::{
        inventory,
        item_location::{self, Entity as ItemLocationEntity},
        purchase_order::{self, Entity as PurchaseOrderEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::brands::BrandService,
    services::inventory::{
        ensure_brand_exists, ensure_locations_exist, insert_ledger_rows,
        reject_duplicate_locations, total_quantity, unwrap_transaction_error, InventoryPayload,
        LocationQuantity,
    },
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePurchaseOrderRequest {
    pub brand_id: i32,
    #[validate(length(min = 1, message = "Product description is required"))]
    pub product_description: String,
    pub lot_number: Option<String>,
    pub expiry: Option<NaiveDate>,
    pub pack_size: Option<i32>,
    #[validate(range(min = 0.0))]
    pub unit_cost: f64,
    pub cost_of_sale: Option<Decimal>,
    pub po_reference: Option<String>,
    pub invoice_number: Option<String>,
    pub note: Option<String>,
    #[validate]
    pub locations: Vec<LocationQuantity>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdatePurchaseOrderRequest {
    pub product_description: Option<String>,
    pub unit_cost: Option<f64>,
    pub po_reference: Option<String>,
}

/// A created purchase order together with the counterpart inventory state it
/// produced.
#[derive(Debug, Serialize, Deserialize)]
pub struct PurchaseOrderReceipt {
    pub purchase_order: purchase_order::Model,
    pub inventory: InventoryPayload,
}

/// Records incoming stock. Creation is the canonical intake path: it mints
/// the item code from the brand sequence and produces the counterpart
/// inventory and ledger rows in the same transaction.
#[derive(Clone)]
pub struct PurchaseOrderService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl PurchaseOrderService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request, actor), fields(brand_id = request.brand_id))]
    pub async fn create_purchase_order(
        &self,
        request: CreatePurchaseOrderRequest,
        actor: &AuthenticatedUser,
    ) -> Result<PurchaseOrderReceipt, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        if request.locations.is_empty() {
            return Err(ServiceError::ValidationError(
                "At least one receiving location is required".to_string(),
            ));
        }
        reject_duplicate_locations(&request.locations)?;

        let unit_cost = Decimal::try_from(request.unit_cost)
            .map_err(|_| ServiceError::InvalidInput("Invalid unit cost".to_string()))?;

        let db = &*self.db_pool;
        let added_by = actor.display_name();

        let receipt = db
            .transaction::<_, PurchaseOrderReceipt, ServiceError>(move |txn| {
                Box::pin(async move {
                    ensure_brand_exists(txn, request.brand_id).await?;
                    ensure_locations_exist(txn, &request.locations).await?;

                    let item_code =
                        BrandService::generate_item_code(txn, request.brand_id).await?;
                    let quantity = total_quantity(&request.locations)?;
                    let total_cost = unit_cost * Decimal::from(quantity);
                    let now = Utc::now();

                    let order = purchase_order::ActiveModel {
                        item_code: Set(item_code.clone()),
                        brand_id: Set(request.brand_id),
                        product_description: Set(request.product_description.clone()),
                        pack_size: Set(request.pack_size),
                        quantity: Set(quantity),
                        unit_cost: Set(unit_cost),
                        total_cost: Set(total_cost),
                        po_reference: Set(request.po_reference.clone()),
                        added_by: Set(added_by.clone()),
                        date_time_added: Set(now),
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?;

                    // Counterpart inventory row, keyed by the shared item code.
                    let created = inventory::ActiveModel {
                        item_code: Set(item_code.clone()),
                        brand_id: Set(request.brand_id),
                        item_description: Set(request.product_description.clone()),
                        lot_number: Set(request.lot_number.clone()),
                        expiry: Set(request.expiry),
                        pack_size: Set(request.pack_size),
                        quantity: Set(quantity),
                        cost_of_sale: Set(request.cost_of_sale),
                        note: Set(request.note.clone()),
                        po_reference: Set(request.po_reference.clone()),
                        invoice_number: Set(request.invoice_number.clone()),
                        added_by: Set(added_by),
                        date_time_added: Set(now),
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?;

                    let rows = insert_ledger_rows(txn, &item_code, &request.locations).await?;

                    Ok(PurchaseOrderReceipt {
                        purchase_order: order,
                        inventory: InventoryPayload {
                            inventory: created,
                            locations: rows,
                        },
                    })
                })
            })
            .await
            .map_err(unwrap_transaction_error)?;

        info!(
            item_code = %receipt.purchase_order.item_code,
            quantity = receipt.purchase_order.quantity,
            "Purchase order created"
        );
        self.event_sender
            .send_or_log(Event::PurchaseOrderCreated {
                item_code: receipt.purchase_order.item_code.clone(),
            })
            .await;

        Ok(receipt)
    }

    #[instrument(skip(self))]
    pub async fn get_purchase_order(
        &self,
        item_code: &str,
    ) -> Result<Option<purchase_order::Model>, ServiceError> {
        let db = &*self.db_pool;
        PurchaseOrderEntity::find_by_id(item_code.to_string())
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self))]
    pub async fn list_purchase_orders(
        &self,
    ) -> Result<Vec<purchase_order::Model>, ServiceError> {
        let db = &*self.db_pool;
        PurchaseOrderEntity::find()
            .order_by_desc(purchase_order::Column::DateTimeAdded)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Updates descriptive fields only; received quantities are corrected
    /// through the inventory update path, not here.
    #[instrument(skip(self, request, actor), fields(item_code = %item_code))]
    pub async fn update_purchase_order(
        &self,
        item_code: &str,
        request: UpdatePurchaseOrderRequest,
        actor: &AuthenticatedUser,
    ) -> Result<purchase_order::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let order = PurchaseOrderEntity::find_by_id(item_code.to_string())
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Purchase order {} not found", item_code))
            })?;

        let quantity = order.quantity;
        let mut active: purchase_order::ActiveModel = order.into();
        if let Some(description) = request.product_description {
            active.product_description = Set(description);
        }
        if let Some(unit_cost) = request.unit_cost {
            let unit_cost = Decimal::try_from(unit_cost)
                .map_err(|_| ServiceError::InvalidInput("Invalid unit cost".to_string()))?;
            active.unit_cost = Set(unit_cost);
            active.total_cost = Set(unit_cost * Decimal::from(quantity));
        }
        if let Some(reference) = request.po_reference {
            active.po_reference = Set(Some(reference));
        }
        active.added_by = Set(actor.display_name());
        active.date_time_added = Set(Utc::now());

        active.update(db).await.map_err(ServiceError::DatabaseError)
    }

    /// Fully reconciled delete: the counterpart ledger rows and inventory row
    /// keyed by the shared item code go with the order, atomically.
    #[instrument(skip(self))]
    pub async fn delete_purchase_order(&self, item_code: &str) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let code = item_code.to_string();

        db.transaction::<_, (), ServiceError>(move |txn| {
            Box::pin(async move {
                let result = PurchaseOrderEntity::delete_by_id(code.clone())
                    .exec(txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?;
                if result.rows_affected == 0 {
                    return Err(ServiceError::NotFound(format!(
                        "Purchase order {} not found",
                        code
                    )));
                }

                ItemLocationEntity::delete_many()
                    .filter(item_location::Column::ItemCode.eq(code.clone()))
                    .exec(txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?;

                inventory::Entity::delete_by_id(code.clone())
                    .exec(txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?;

                info!(item_code = %code, "Purchase order and counterpart inventory deleted");
                Ok(())
            })
        })
        .await
        .map_err(unwrap_transaction_error)?;

        self.event_sender
            .send_or_log(Event::PurchaseOrderDeleted {
                item_code: item_code.to_string(),
            })
            .await;
        Ok(())
    }
}
