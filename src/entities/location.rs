use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Physical or cold-storage location. Flat reference data; ledger rows point
/// at it by id.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "locations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub location_id: i32,
    #[sea_orm(unique)]
    pub location_name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::item_location::Entity")]
    ItemLocation,
}

impl Related<super::item_location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemLocation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
