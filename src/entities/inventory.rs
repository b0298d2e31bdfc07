use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Inventory aggregate: one row per item code. `quantity` is derived from the
/// item's ledger rows (sum of `item_locations.quantity`) and is re-computed on
/// every mutation; it is never taken from a caller.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub item_code: String,
    pub brand_id: i32,
    pub item_description: String,
    pub lot_number: Option<String>,
    pub expiry: Option<Date>,
    pub pack_size: Option<i32>,
    pub quantity: i32,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub cost_of_sale: Option<Decimal>,
    pub note: Option<String>,
    pub po_reference: Option<String>,
    pub invoice_number: Option<String>,
    pub added_by: String,
    pub date_time_added: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::brand::Entity",
        from = "Column::BrandId",
        to = "super::brand::Column::BrandId"
    )]
    Brand,
    #[sea_orm(has_many = "super::item_location::Entity")]
    ItemLocation,
}

impl Related<super::brand::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Brand.def()
    }
}

impl Related<super::item_location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemLocation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
