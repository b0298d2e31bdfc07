use crate::{
    auth::AuthenticatedUser,
    db::DbPool,
    entities::{
        customer_transaction::{self, Entity as CustomerTransactionEntity},
        sold_item::{self, Entity as SoldItemEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::inventory::{deduct_stock, restore_stock, unwrap_transaction_error},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SaleLineRequest {
    #[validate(length(min = 1, message = "Item code is required"))]
    pub item_code: String,
    pub location_id: i32,
    #[validate(range(min = 1, message = "Sale quantity must be positive"))]
    pub quantity: i32,
    pub unit_retail_price: Decimal,
    pub lot_number: Option<String>,
    pub brand_name: Option<String>,
    pub item_description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTransactionRequest {
    #[validate(length(min = 1, message = "Invoice reference is required"))]
    pub invoice_reference: String,
    pub transaction_date: Option<DateTime<Utc>>,
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    #[validate]
    pub items: Vec<SaleLineRequest>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub transaction: customer_transaction::Model,
    pub items: Vec<sold_item::Model>,
}

/// Records outgoing stock as multi-line customer transactions. Every line
/// deducts from the stock ledger and the inventory aggregate; the header and
/// all line deductions commit or roll back together.
#[derive(Clone)]
pub struct TransactionService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl TransactionService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request, actor), fields(invoice_reference = %request.invoice_reference, actor = %actor.display_name()))]
    pub async fn create_transaction(
        &self,
        request: CreateTransactionRequest,
        actor: &AuthenticatedUser,
    ) -> Result<TransactionResponse, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        if request.items.is_empty() {
            return Err(ServiceError::ValidationError(
                "A transaction requires at least one line item".to_string(),
            ));
        }

        let db = &*self.db_pool;

        let response = db
            .transaction::<_, TransactionResponse, ServiceError>(move |txn| {
                Box::pin(async move {
                    let duplicate = CustomerTransactionEntity::find()
                        .filter(
                            customer_transaction::Column::InvoiceReference
                                .eq(request.invoice_reference.clone()),
                        )
                        .one(txn)
                        .await
                        .map_err(ServiceError::DatabaseError)?;
                    if duplicate.is_some() {
                        return Err(ServiceError::Conflict(format!(
                            "Invoice reference already exists: {}",
                            request.invoice_reference
                        )));
                    }

                    let total_retail_price: Decimal = request
                        .items
                        .iter()
                        .map(|line| line.unit_retail_price * Decimal::from(line.quantity))
                        .sum();

                    let header = customer_transaction::ActiveModel {
                        invoice_reference: Set(request.invoice_reference.clone()),
                        transaction_date: Set(request.transaction_date.unwrap_or_else(Utc::now)),
                        customer_id: Set(request.customer_id.clone()),
                        customer_name: Set(request.customer_name.clone()),
                        total_retail_price: Set(total_retail_price),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?;

                    // Any failing line aborts the whole transaction, undoing
                    // the deductions already applied for earlier lines.
                    let mut items = Vec::with_capacity(request.items.len());
                    for line in &request.items {
                        deduct_stock(txn, &line.item_code, line.location_id, line.quantity)
                            .await?;

                        let sold = sold_item::ActiveModel {
                            transaction_id: Set(header.transaction_id),
                            item_code: Set(line.item_code.clone()),
                            lot_number: Set(line.lot_number.clone()),
                            quantity: Set(line.quantity),
                            unit_retail_price: Set(line.unit_retail_price),
                            brand_name: Set(line.brand_name.clone()),
                            item_description: Set(line.item_description.clone()),
                            location_id: Set(line.location_id),
                            ..Default::default()
                        }
                        .insert(txn)
                        .await
                        .map_err(ServiceError::DatabaseError)?;
                        items.push(sold);
                    }

                    Ok(TransactionResponse {
                        transaction: header,
                        items,
                    })
                })
            })
            .await
            .map_err(unwrap_transaction_error)?;

        info!(
            transaction_id = response.transaction.transaction_id,
            invoice_reference = %response.transaction.invoice_reference,
            line_count = response.items.len(),
            "Transaction recorded"
        );
        self.event_sender
            .send_or_log(Event::TransactionCreated {
                transaction_id: response.transaction.transaction_id,
                invoice_reference: response.transaction.invoice_reference.clone(),
            })
            .await;
        for item in &response.items {
            self.event_sender
                .send_or_log(Event::StockDeducted {
                    item_code: item.item_code.clone(),
                    location_id: item.location_id,
                    quantity: item.quantity,
                })
                .await;
        }

        Ok(response)
    }

    #[instrument(skip(self))]
    pub async fn get_transaction(
        &self,
        transaction_id: i64,
    ) -> Result<TransactionResponse, ServiceError> {
        let db = &*self.db_pool;

        let transaction = CustomerTransactionEntity::find_by_id(transaction_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Transaction {} not found", transaction_id))
            })?;

        let items = SoldItemEntity::find()
            .filter(sold_item::Column::TransactionId.eq(transaction_id))
            .order_by_asc(sold_item::Column::Id)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(TransactionResponse { transaction, items })
    }

    #[instrument(skip(self))]
    pub async fn list_transactions(&self) -> Result<Vec<TransactionResponse>, ServiceError> {
        let db = &*self.db_pool;

        let transactions = CustomerTransactionEntity::find()
            .order_by_desc(customer_transaction::Column::TransactionDate)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let ids: Vec<i64> = transactions.iter().map(|t| t.transaction_id).collect();
        let mut by_transaction: HashMap<i64, Vec<sold_item::Model>> = HashMap::new();
        if !ids.is_empty() {
            let items = SoldItemEntity::find()
                .filter(sold_item::Column::TransactionId.is_in(ids))
                .all(db)
                .await
                .map_err(ServiceError::DatabaseError)?;
            for item in items {
                by_transaction
                    .entry(item.transaction_id)
                    .or_default()
                    .push(item);
            }
        }

        Ok(transactions
            .into_iter()
            .map(|transaction| {
                let mut items = by_transaction
                    .remove(&transaction.transaction_id)
                    .unwrap_or_default();
                items.sort_by_key(|i| i.id);
                TransactionResponse { transaction, items }
            })
            .collect())
    }

    /// Deletes a transaction, reversing every line's ledger effect: the sold
    /// quantities are returned to their (item, location) cells and to the
    /// inventory aggregates, then the lines and header are removed. One
    /// transaction, all or nothing.
    #[instrument(skip(self))]
    pub async fn delete_transaction(&self, transaction_id: i64) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        db.transaction::<_, (), ServiceError>(move |txn| {
            Box::pin(async move {
                let transaction = CustomerTransactionEntity::find_by_id(transaction_id)
                    .one(txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!(
                            "Transaction {} not found",
                            transaction_id
                        ))
                    })?;

                let items = SoldItemEntity::find()
                    .filter(sold_item::Column::TransactionId.eq(transaction_id))
                    .all(txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?;

                for item in &items {
                    restore_stock(txn, &item.item_code, item.location_id, item.quantity)
                        .await?;
                }

                SoldItemEntity::delete_many()
                    .filter(sold_item::Column::TransactionId.eq(transaction_id))
                    .exec(txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?;

                let header: customer_transaction::ActiveModel = transaction.into();
                header
                    .delete(txn)
                    .await
                    .map_err(ServiceError::DatabaseError)?;

                info!(
                    transaction_id = transaction_id,
                    reversed_lines = items.len(),
                    "Transaction deleted and stock restored"
                );
                Ok(())
            })
        })
        .await
        .map_err(unwrap_transaction_error)?;

        self.event_sender
            .send_or_log(Event::TransactionDeleted { transaction_id })
            .await;
        Ok(())
    }
}
