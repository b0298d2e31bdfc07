use crate::{
    db::DbPool,
    entities::{
        item_location::{self, Entity as ItemLocationEntity},
        location::{self, Entity as LocationEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LocationRequest {
    #[validate(length(min = 1, message = "Location name is required"))]
    pub location_name: String,
}

/// Registry of physical storage locations referenced by the stock ledger.
#[derive(Clone)]
pub struct LocationService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl LocationService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(location_name = %request.location_name))]
    pub async fn create_location(
        &self,
        request: LocationRequest,
    ) -> Result<location::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let name = request.location_name.trim().to_string();

        let existing = LocationEntity::find()
            .filter(location::Column::LocationName.eq(name.clone()))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Location name already exists: {}",
                name
            )));
        }

        let created = location::ActiveModel {
            location_name: Set(name),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::DatabaseError)?;

        info!(location_id = created.location_id, "Location created");
        self.event_sender
            .send_or_log(Event::LocationCreated {
                location_id: created.location_id,
                name: created.location_name.clone(),
            })
            .await;

        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn get_location(
        &self,
        location_id: i32,
    ) -> Result<Option<location::Model>, ServiceError> {
        let db = &*self.db_pool;
        LocationEntity::find_by_id(location_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self))]
    pub async fn list_locations(&self) -> Result<Vec<location::Model>, ServiceError> {
        let db = &*self.db_pool;
        LocationEntity::find()
            .order_by_asc(location::Column::LocationId)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self, request), fields(location_id = location_id))]
    pub async fn update_location(
        &self,
        location_id: i32,
        request: LocationRequest,
    ) -> Result<location::Model, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let db = &*self.db_pool;
        let name = request.location_name.trim().to_string();

        let taken = LocationEntity::find()
            .filter(location::Column::LocationName.eq(name.clone()))
            .filter(location::Column::LocationId.ne(location_id))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if taken.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Location name already exists: {}",
                name
            )));
        }

        let existing = LocationEntity::find_by_id(location_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Location {} not found", location_id))
            })?;

        let mut active: location::ActiveModel = existing.into();
        active.location_name = Set(name);
        active.update(db).await.map_err(ServiceError::DatabaseError)
    }

    /// Deletes a location. Refused while ledger rows still reference it:
    /// typed location references must stay valid.
    #[instrument(skip(self))]
    pub async fn delete_location(&self, location_id: i32) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let referencing = ItemLocationEntity::find()
            .filter(item_location::Column::LocationId.eq(location_id))
            .count(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if referencing > 0 {
            return Err(ServiceError::Conflict(format!(
                "Location {} still holds stock for {} item(s)",
                location_id, referencing
            )));
        }

        let result = LocationEntity::delete_by_id(location_id)
            .exec(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Location {} not found",
                location_id
            )));
        }

        self.event_sender
            .send_or_log(Event::LocationDeleted { location_id })
            .await;
        Ok(())
    }
}
