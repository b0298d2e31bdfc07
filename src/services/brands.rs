use crate::{
    db::DbPool,
    entities::brand::{self, Entity as BrandEntity},
    errors::ServiceError,
    events::{Event, EventSender},
};
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ConnectionTrait, DbBackend, EntityTrait, QueryFilter, Set, Statement,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateBrandRequest {
    #[validate(length(min = 1, message = "Brand name is required"))]
    pub brand_name: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateBrandRequest {
    #[validate(length(min = 1, message = "Brand name is required"))]
    pub brand_name: String,
}

/// Derives the fixed brand abbreviation: first + last character of the
/// trimmed name, case preserved. Two brands sharing first/last characters
/// collide on abbreviation; that is an accepted limitation and only the
/// brand *name* is unique.
fn derive_abbreviation(name: &str) -> String {
    let trimmed = name.trim();
    let mut chars = trimmed.chars();
    let first = chars.next();
    let last = trimmed.chars().last();
    match (first, last) {
        (Some(f), Some(l)) => format!("{}{}", f, l),
        _ => String::new(),
    }
}

/// Service for managing brands and minting item codes.
#[derive(Clone)]
pub struct BrandService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl BrandService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a brand, deriving its abbreviation and seeding the item-code
    /// sequence at zero. Brand names are unique case-insensitively.
    #[instrument(skip(self, request), fields(brand_name = %request.brand_name))]
    pub async fn create_brand(
        &self,
        request: CreateBrandRequest,
    ) -> Result<brand::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let name = request.brand_name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "Brand name is required".to_string(),
            ));
        }

        if self.find_by_name_ci(&name).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Brand name already exists: {}",
                name
            )));
        }

        let abbreviation = derive_abbreviation(&name);
        let model = brand::ActiveModel {
            brand_name: Set(name.clone()),
            abbreviation: Set(abbreviation),
            latest_sequence: Set(0),
            ..Default::default()
        };

        let created = model.insert(db).await.map_err(ServiceError::DatabaseError)?;

        info!(brand_id = created.brand_id, "Brand created");
        self.event_sender
            .send_or_log(Event::BrandCreated {
                brand_id: created.brand_id,
                name: created.brand_name.clone(),
            })
            .await;

        Ok(created)
    }

    /// Mints the next item code for a brand: `<abbreviation><4-digit seq>`.
    ///
    /// The sequence advance is a single conditional UPDATE…RETURNING so two
    /// concurrent callers can never observe the same counter value. Runs on
    /// any connection so intake services can call it inside their own
    /// transaction.
    pub async fn generate_item_code<C: ConnectionTrait>(
        conn: &C,
        brand_id: i32,
    ) -> Result<String, ServiceError> {
        let backend = conn.get_database_backend();
        let sql = match backend {
            DbBackend::Postgres => {
                "UPDATE brands SET latest_sequence = latest_sequence + 1 \
                 WHERE brand_id = $1 RETURNING latest_sequence, abbreviation"
            }
            _ => {
                "UPDATE brands SET latest_sequence = latest_sequence + 1 \
                 WHERE brand_id = ? RETURNING latest_sequence, abbreviation"
            }
        };

        let row = conn
            .query_one(Statement::from_sql_and_values(
                backend,
                sql,
                [brand_id.into()],
            ))
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Brand {} not found", brand_id)))?;

        let new_sequence: i32 = row
            .try_get("", "latest_sequence")
            .map_err(ServiceError::DatabaseError)?;
        let abbreviation: String = row
            .try_get("", "abbreviation")
            .map_err(ServiceError::DatabaseError)?;

        // The counter now holds the number of codes minted; the code itself
        // carries the pre-increment value, so a fresh brand starts at 0000.
        Ok(format_item_code(&abbreviation, new_sequence - 1))
    }

    #[instrument(skip(self))]
    pub async fn get_brand(&self, brand_id: i32) -> Result<Option<brand::Model>, ServiceError> {
        let db = &*self.db_pool;
        BrandEntity::find_by_id(brand_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self))]
    pub async fn list_brands(&self) -> Result<Vec<brand::Model>, ServiceError> {
        let db = &*self.db_pool;
        BrandEntity::find()
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Renames a brand. The abbreviation is fixed at creation and is not
    /// recomputed here, so already-minted item codes stay meaningful.
    #[instrument(skip(self, request), fields(brand_id = brand_id))]
    pub async fn update_brand(
        &self,
        brand_id: i32,
        request: UpdateBrandRequest,
    ) -> Result<brand::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let name = request.brand_name.trim().to_string();

        if let Some(existing) = self.find_by_name_ci(&name).await? {
            if existing.brand_id != brand_id {
                return Err(ServiceError::Conflict(format!(
                    "Brand name already exists: {}",
                    name
                )));
            }
        }

        let brand = BrandEntity::find_by_id(brand_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Brand {} not found", brand_id)))?;

        let mut active: brand::ActiveModel = brand.into();
        active.brand_name = Set(name);
        active.update(db).await.map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self))]
    pub async fn delete_brand(&self, brand_id: i32) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let result = BrandEntity::delete_by_id(brand_id)
            .exec(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        if result.rows_affected == 0 {
            warn!(brand_id = brand_id, "Brand not found for deletion");
            return Err(ServiceError::NotFound(format!(
                "Brand {} not found",
                brand_id
            )));
        }

        self.event_sender
            .send_or_log(Event::BrandDeleted { brand_id })
            .await;
        Ok(())
    }

    /// Case-insensitive lookup by name.
    async fn find_by_name_ci(&self, name: &str) -> Result<Option<brand::Model>, ServiceError> {
        let db = &*self.db_pool;
        BrandEntity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(brand::Column::BrandName)))
                    .eq(name.trim().to_lowercase()),
            )
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }
}

fn format_item_code(abbreviation: &str, sequence: i32) -> String {
    format!("{}{:04}", abbreviation, sequence)
}
