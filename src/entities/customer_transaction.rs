use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Sale header. One transaction fans out to many `sold_items` line items,
/// each of which deducts from the stock ledger.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customer_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub transaction_id: i64,
    #[sea_orm(unique)]
    pub invoice_reference: String,
    pub transaction_date: DateTimeUtc,
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub total_retail_price: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::sold_item::Entity")]
    SoldItem,
}

impl Related<super::sold_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SoldItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
