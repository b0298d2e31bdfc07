use crate::{
    db::DbPool,
    entities::{
        brand::Entity as BrandEntity,
        inventory::{self, Entity as InventoryEntity},
        item_location::{self, Entity as ItemLocationEntity},
        location::Entity as LocationEntity,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionError, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::AuthenticatedUser;

/// Per-location quantity as submitted by intake/update payloads.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LocationQuantity {
    pub location_id: i32,
    #[validate(range(min = 0, message = "Location quantity cannot be negative"))]
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateInventoryRequest {
    #[validate(length(min = 1, message = "Item code is required"))]
    pub item_code: String,
    pub brand_id: i32,
    #[validate(length(min = 1, message = "Item description is required"))]
    pub item_description: String,
    pub lot_number: Option<String>,
    pub expiry: Option<NaiveDate>,
    pub pack_size: Option<i32>,
    pub cost_of_sale: Option<Decimal>,
    pub note: Option<String>,
    pub po_reference: Option<String>,
    pub invoice_number: Option<String>,
    #[validate]
    pub locations: Vec<LocationQuantity>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateInventoryRequest {
    pub brand_id: i32,
    #[validate(length(min = 1, message = "Item description is required"))]
    pub item_description: String,
    pub lot_number: Option<String>,
    pub expiry: Option<NaiveDate>,
    pub pack_size: Option<i32>,
    pub cost_of_sale: Option<Decimal>,
    pub note: Option<String>,
    pub po_reference: Option<String>,
    pub invoice_number: Option<String>,
    #[validate]
    pub locations: Vec<LocationQuantity>,
}

/// Inventory row plus its per-location breakdown, the shape the REST layer
/// accepts and returns.
#[derive(Debug, Serialize, Deserialize)]
pub struct InventoryPayload {
    pub inventory: inventory::Model,
    pub locations: Vec<item_location::Model>,
}

/// Service owning the inventory aggregate and the stock ledger, and the
/// reconciliation between them. Every mutation here is one database
/// transaction: inventory totals and ledger rows move together or not at all.
#[derive(Clone)]
pub struct InventoryService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl InventoryService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates an inventory item together with its ledger rows. The aggregate
    /// quantity is derived from the submitted location quantities, never taken
    /// from the caller.
    #[instrument(skip(self, request, actor), fields(item_code = %request.item_code))]
    pub async fn create_inventory(
        &self,
        request: CreateInventoryRequest,
        actor: &AuthenticatedUser,
    ) -> Result<InventoryPayload, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        reject_duplicate_locations(&request.locations)?;

        let db = &*self.db_pool;
        let added_by = actor.display_name();

        let payload = db
            .transaction::<_, InventoryPayload, ServiceError>(move |txn| {
                Box::pin(async move {
                    let existing = InventoryEntity::find_by_id(request.item_code.clone())
                        .one(txn)
                        .await
                        .map_err(ServiceError::DatabaseError)?;
                    if existing.is_some() {
                        return Err(ServiceError::Conflict(format!(
                            "Inventory item already exists: {}",
                            request.item_code
                        )));
                    }

                    ensure_brand_exists(txn, request.brand_id).await?;
                    ensure_locations_exist(txn, &request.locations).await?;

                    let total = total_quantity(&request.locations)?;
                    let now = Utc::now();

                    let created = inventory::ActiveModel {
                        item_code: Set(request.item_code.clone()),
                        brand_id: Set(request.brand_id),
                        item_description: Set(request.item_description.clone()),
                        lot_number: Set(request.lot_number.clone()),
                        expiry: Set(request.expiry),
                        pack_size: Set(request.pack_size),
                        quantity: Set(total),
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

                    let rows =
                        insert_ledger_rows(txn, &request.item_code, &request.locations).await?;

                    Ok(InventoryPayload {
                        inventory: created,
                        locations: rows,
                    })
                })
            })
            .await
            .map_err(unwrap_transaction_error)?;

        info!(
            item_code = %payload.inventory.item_code,
            quantity = payload.inventory.quantity,
            "Inventory created"
        );
        self.event_sender
            .send_or_log(Event::InventoryCreated {
                item_code: payload.inventory.item_code.clone(),
                quantity: payload.inventory.quantity,
            })
            .await;

        Ok(payload)
    }

    /// Updates descriptive fields and replaces the full ledger row set for an
    /// item (delete-all then re-insert). The aggregate quantity is re-derived
    /// from the replacement rows, which keeps the total honest even if the
    /// previous rows had drifted.
    #[instrument(skip(self, request, actor), fields(item_code = %item_code))]
    pub async fn update_inventory(
        &self,
        item_code: &str,
        request: UpdateInventoryRequest,
        actor: &AuthenticatedUser,
    ) -> Result<InventoryPayload, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        reject_duplicate_locations(&request.locations)?;

        let db = &*self.db_pool;
        let added_by = actor.display_name();
        let code = item_code.to_string();

        let payload = db
            .transaction::<_, InventoryPayload, ServiceError>(move |txn| {
                Box::pin(async move {
                    let existing = InventoryEntity::find_by_id(code.clone())
                        .one(txn)
                        .await
                        .map_err(ServiceError::DatabaseError)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "Inventory item {} not found",
                                code
                            ))
                        })?;

                    ensure_brand_exists(txn, request.brand_id).await?;
                    ensure_locations_exist(txn, &request.locations).await?;

                    ItemLocationEntity::delete_many()
                        .filter(item_location::Column::ItemCode.eq(code.clone()))
                        .exec(txn)
                        .await
                        .map_err(ServiceError::DatabaseError)?;

                    let rows = insert_ledger_rows(txn, &code, &request.locations).await?;
                    let total = total_quantity(&request.locations)?;

                    let mut active: inventory::ActiveModel = existing.into();
                    active.brand_id = Set(request.brand_id);
                    active.item_description = Set(request.item_description.clone());
                    active.lot_number = Set(request.lot_number.clone());
                    active.expiry = Set(request.expiry);
                    active.pack_size = Set(request.pack_size);
                    active.quantity = Set(total);
                    active.cost_of_sale = Set(request.cost_of_sale);
                    active.note = Set(request.note.clone());
                    active.po_reference = Set(request.po_reference.clone());
                    active.invoice_number = Set(request.invoice_number.clone());
                    active.added_by = Set(added_by);
                    active.date_time_added = Set(Utc::now());

                    let updated = active
                        .update(txn)
                        .await
                        .map_err(ServiceError::DatabaseError)?;

                    Ok(InventoryPayload {
                        inventory: updated,
                        locations: rows,
                    })
                })
            })
            .await
            .map_err(unwrap_transaction_error)?;

        info!(
            item_code = %payload.inventory.item_code,
            quantity = payload.inventory.quantity,
            "Inventory updated"
        );
        self.event_sender
            .send_or_log(Event::InventoryUpdated {
                item_code: payload.inventory.item_code.clone(),
                quantity: payload.inventory.quantity,
            })
            .await;

        Ok(payload)
    }

    /// Deletes an inventory item and its ledger rows in one transaction.
    #[instrument(skip(self))]
    pub async fn delete_inventory(&self, item_code: &str) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let code = item_code.to_string();

        db.transaction::<_, (), ServiceError>(move |txn| {
            Box::pin(async move {
                let ledger = ItemLocationEntity::delete_many()
                    .filter(item_location::Column::ItemCode.eq(code.clone()))
                    .exec(txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?;

                let result = InventoryEntity::delete_by_id(code.clone())
                    .exec(txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?;
                if result.rows_affected == 0 {
                    return Err(ServiceError::NotFound(format!(
                        "Inventory item {} not found",
                        code
                    )));
                }

                info!(
                    item_code = %code,
                    ledger_rows_removed = ledger.rows_affected,
                    "Inventory deleted"
                );
                Ok(())
            })
        })
        .await
        .map_err(unwrap_transaction_error)?;

        self.event_sender
            .send_or_log(Event::InventoryDeleted {
                item_code: item_code.to_string(),
            })
            .await;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_inventory(&self, item_code: &str) -> Result<InventoryPayload, ServiceError> {
        let db = &*self.db_pool;

        let inventory = InventoryEntity::find_by_id(item_code.to_string())
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Inventory item {} not found", item_code))
            })?;

        let locations = ItemLocationEntity::find()
            .filter(item_location::Column::ItemCode.eq(item_code.to_string()))
            .order_by_asc(item_location::Column::LocationId)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(InventoryPayload {
            inventory,
            locations,
        })
    }

    /// All inventory items with their location breakdowns.
    #[instrument(skip(self))]
    pub async fn list_inventories(&self) -> Result<Vec<InventoryPayload>, ServiceError> {
        let db = &*self.db_pool;
        let inventories = InventoryEntity::find()
            .order_by_asc(inventory::Column::ItemCode)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        self.with_location_breakdown(inventories).await
    }

    /// Items whose aggregate quantity is at-or-below the threshold.
    #[instrument(skip(self))]
    pub async fn stock_alerts(
        &self,
        threshold: i32,
    ) -> Result<Vec<InventoryPayload>, ServiceError> {
        let db = &*self.db_pool;
        let inventories = InventoryEntity::find()
            .filter(inventory::Column::Quantity.lte(threshold))
            .order_by_asc(inventory::Column::Quantity)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        self.with_location_breakdown(inventories).await
    }

    /// All items sorted by aggregate quantity, highest first.
    #[instrument(skip(self))]
    pub async fn highest_stock(&self) -> Result<Vec<inventory::Model>, ServiceError> {
        let db = &*self.db_pool;
        InventoryEntity::find()
            .order_by_desc(inventory::Column::Quantity)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// All items sorted by aggregate quantity, lowest first.
    #[instrument(skip(self))]
    pub async fn lowest_stock(&self) -> Result<Vec<inventory::Model>, ServiceError> {
        let db = &*self.db_pool;
        InventoryEntity::find()
            .order_by_asc(inventory::Column::Quantity)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    async fn with_location_breakdown(
        &self,
        inventories: Vec<inventory::Model>,
    ) -> Result<Vec<InventoryPayload>, ServiceError> {
        let db = &*self.db_pool;
        let codes: Vec<String> = inventories.iter().map(|i| i.item_code.clone()).collect();
        if codes.is_empty() {
            return Ok(Vec::new());
        }

        let rows = ItemLocationEntity::find()
            .filter(item_location::Column::ItemCode.is_in(codes))
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let mut by_code: HashMap<String, Vec<item_location::Model>> = HashMap::new();
        for row in rows {
            by_code.entry(row.item_code.clone()).or_default().push(row);
        }

        Ok(inventories
            .into_iter()
            .map(|inv| {
                let mut locations = by_code.remove(&inv.item_code).unwrap_or_default();
                locations.sort_by_key(|l| l.location_id);
                InventoryPayload {
                    inventory: inv,
                    locations,
                }
            })
            .collect())
    }
}

/// Deducts `quantity` from the (item, location) ledger cell and from the
/// inventory aggregate, inside the caller's transaction.
///
/// The check and the write are a single conditional UPDATE guarded by
/// `quantity >= requested`, so two concurrent deductions cannot both pass a
/// stale check and drive the cell negative. Zero rows affected means either
/// the row does not exist (NotFound) or it holds too little stock
/// (InsufficientStock, reported with available vs requested).
pub(crate) async fn deduct_stock<C: ConnectionTrait>(
    conn: &C,
    item_code: &str,
    location_id: i32,
    quantity: i32,
) -> Result<(), ServiceError> {
    if quantity <= 0 {
        return Err(ServiceError::InvalidInput(format!(
            "Deduction quantity must be positive, got {}",
            quantity
        )));
    }

    let result = ItemLocationEntity::update_many()
        .col_expr(
            item_location::Column::Quantity,
            Expr::col(item_location::Column::Quantity).sub(quantity),
        )
        .filter(item_location::Column::ItemCode.eq(item_code))
        .filter(item_location::Column::LocationId.eq(location_id))
        .filter(item_location::Column::Quantity.gte(quantity))
        .exec(conn)
        .await
        .map_err(ServiceError::DatabaseError)?;

    if result.rows_affected == 0 {
        let cell = ItemLocationEntity::find_by_id((item_code.to_string(), location_id))
            .one(conn)
            .await
            .map_err(ServiceError::DatabaseError)?;
        return Err(match cell {
            None => ServiceError::NotFound(format!(
                "Item {} has no stock record at location {}",
                item_code, location_id
            )),
            Some(row) => ServiceError::InsufficientStock(format!(
                "Item {} at location {}: available {}, requested {}",
                item_code, location_id, row.quantity, quantity
            )),
        });
    }

    // Conservation: the aggregate moves by exactly the same amount, under the
    // same non-negative guard.
    let aggregate = InventoryEntity::update_many()
        .col_expr(
            inventory::Column::Quantity,
            Expr::col(inventory::Column::Quantity).sub(quantity),
        )
        .filter(inventory::Column::ItemCode.eq(item_code))
        .filter(inventory::Column::Quantity.gte(quantity))
        .exec(conn)
        .await
        .map_err(ServiceError::DatabaseError)?;

    if aggregate.rows_affected == 0 {
        let inv = InventoryEntity::find_by_id(item_code.to_string())
            .one(conn)
            .await
            .map_err(ServiceError::DatabaseError)?;
        return Err(match inv {
            None => {
                ServiceError::NotFound(format!("Inventory item {} not found", item_code))
            }
            Some(row) => {
                // Ledger held enough but the aggregate does not: the two have
                // diverged, which reconciliation is supposed to prevent.
                error!(
                    item_code = %item_code,
                    aggregate = row.quantity,
                    requested = quantity,
                    "Inventory aggregate diverged from ledger"
                );
                ServiceError::InsufficientStock(format!(
                    "Item {}: available {}, requested {}",
                    item_code, row.quantity, quantity
                ))
            }
        });
    }

    Ok(())
}

/// Reverses a deduction: adds `quantity` back to the ledger cell and the
/// aggregate. If the inventory item has been deleted since the sale, there is
/// nothing to restore into and the line is skipped with a warning; reversal
/// must not resurrect dead items.
pub(crate) async fn restore_stock<C: ConnectionTrait>(
    conn: &C,
    item_code: &str,
    location_id: i32,
    quantity: i32,
) -> Result<(), ServiceError> {
    let inventory = InventoryEntity::find_by_id(item_code.to_string())
        .one(conn)
        .await
        .map_err(ServiceError::DatabaseError)?;
    let Some(inventory) = inventory else {
        warn!(
            item_code = %item_code,
            location_id = location_id,
            quantity = quantity,
            "Skipping stock restore for deleted inventory item"
        );
        return Ok(());
    };

    let cell = ItemLocationEntity::find_by_id((item_code.to_string(), location_id))
        .one(conn)
        .await
        .map_err(ServiceError::DatabaseError)?;

    match cell {
        Some(row) => {
            let restored = row.quantity + quantity;
            let mut active: item_location::ActiveModel = row.into();
            active.quantity = Set(restored);
            active
                .update(conn)
                .await
                .map_err(ServiceError::DatabaseError)?;
        }
        None => {
            item_location::ActiveModel {
                item_code: Set(item_code.to_string()),
                location_id: Set(location_id),
                quantity: Set(quantity),
            }
            .insert(conn)
            .await
            .map_err(ServiceError::DatabaseError)?;
        }
    }

    let mut active: inventory::ActiveModel = inventory.clone().into();
    active.quantity = Set(inventory.quantity + quantity);
    active
        .update(conn)
        .await
        .map_err(ServiceError::DatabaseError)?;

    Ok(())
}

/// Inserts one ledger row per submitted location.
pub(crate) async fn insert_ledger_rows<C: ConnectionTrait>(
    conn: &C,
    item_code: &str,
    locations: &[LocationQuantity],
) -> Result<Vec<item_location::Model>, ServiceError> {
    let mut rows = Vec::with_capacity(locations.len());
    for loc in locations {
        let row = item_location::ActiveModel {
            item_code: Set(item_code.to_string()),
            location_id: Set(loc.location_id),
            quantity: Set(loc.quantity),
        }
        .insert(conn)
        .await
        .map_err(ServiceError::DatabaseError)?;
        rows.push(row);
    }
    Ok(rows)
}

pub(crate) async fn ensure_brand_exists<C: ConnectionTrait>(
    conn: &C,
    brand_id: i32,
) -> Result<(), ServiceError> {
    BrandEntity::find_by_id(brand_id)
        .one(conn)
        .await
        .map_err(ServiceError::DatabaseError)?
        .map(|_| ())
        .ok_or_else(|| ServiceError::NotFound(format!("Brand {} not found", brand_id)))
}

pub(crate) async fn ensure_locations_exist<C: ConnectionTrait>(
    conn: &C,
    locations: &[LocationQuantity],
) -> Result<(), ServiceError> {
    for loc in locations {
        let found = LocationEntity::find_by_id(loc.location_id)
            .one(conn)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if found.is_none() {
            return Err(ServiceError::NotFound(format!(
                "Location {} not found",
                loc.location_id
            )));
        }
    }
    Ok(())
}

pub(crate) fn reject_duplicate_locations(
    locations: &[LocationQuantity],
) -> Result<(), ServiceError> {
    let mut seen = HashSet::new();
    for loc in locations {
        if !seen.insert(loc.location_id) {
            return Err(ServiceError::InvalidInput(format!(
                "Location {} listed more than once",
                loc.location_id
            )));
        }
    }
    Ok(())
}

/// Sum of the submitted per-location quantities; this is the only source of
/// the aggregate total.
pub(crate) fn total_quantity(locations: &[LocationQuantity]) -> Result<i32, ServiceError> {
    locations
        .iter()
        .try_fold(0i32, |acc, loc| acc.checked_add(loc.quantity))
        .ok_or_else(|| {
            ServiceError::InvalidInput("Total quantity exceeds representable range".to_string())
        })
}

pub(crate) fn unwrap_transaction_error(err: TransactionError<ServiceError>) -> ServiceError {
    match err {
        TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
        TransactionError::Transaction(service_err) => service_err,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(location_id: i32, quantity: i32) -> LocationQuantity {
        LocationQuantity {
            location_id,
            quantity,
        }
    }

    #[test]
    fn total_quantity_sums_locations() {
        assert_eq!(total_quantity(&[loc(1, 60), loc(2, 40)]).unwrap(), 100);
        assert_eq!(total_quantity(&[]).unwrap(), 0);
    }

    #[test]
    fn total_quantity_rejects_overflow() {
        assert!(total_quantity(&[loc(1, i32::MAX), loc(2, 1)]).is_err());
    }

    #[test]
    fn duplicate_location_ids_are_rejected() {
        assert!(reject_duplicate_locations(&[loc(1, 10), loc(1, 20)]).is_err());
        assert!(reject_duplicate_locations(&[loc(1, 10), loc(2, 20)]).is_ok());
    }
}
