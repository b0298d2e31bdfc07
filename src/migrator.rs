use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_brands_table::Migration),
            Box::new(m20240101_000002_create_locations_table::Migration),
            Box::new(m20240101_000003_create_inventory_table::Migration),
            Box::new(m20240101_000004_create_item_locations_table::Migration),
            Box::new(m20240101_000005_create_purchase_orders_table::Migration),
            Box::new(m20240101_000006_create_transaction_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_brands_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_brands_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Brands::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Brands::BrandId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Brands::BrandName)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Brands::Abbreviation).string().not_null())
                        .col(
                            ColumnDef::new(Brands::LatestSequence)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Brands::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Brands {
        Table,
        BrandId,
        BrandName,
        Abbreviation,
        LatestSequence,
    }
}

mod m20240101_000002_create_locations_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_locations_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Locations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Locations::LocationId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Locations::LocationName)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Locations::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Locations {
        Table,
        LocationId,
        LocationName,
    }
}

mod m20240101_000003_create_inventory_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_inventory_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Inventory::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Inventory::ItemCode)
                                .string()
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Inventory::BrandId).integer().not_null())
                        .col(
                            ColumnDef::new(Inventory::ItemDescription)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Inventory::LotNumber).string().null())
                        .col(ColumnDef::new(Inventory::Expiry).date().null())
                        .col(ColumnDef::new(Inventory::PackSize).integer().null())
                        .col(
                            ColumnDef::new(Inventory::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Inventory::CostOfSale)
                                .decimal_len(19, 4)
                                .null(),
                        )
                        .col(ColumnDef::new(Inventory::Note).string().null())
                        .col(ColumnDef::new(Inventory::PoReference).string().null())
                        .col(ColumnDef::new(Inventory::InvoiceNumber).string().null())
                        .col(ColumnDef::new(Inventory::AddedBy).string().not_null())
                        .col(
                            ColumnDef::new(Inventory::DateTimeAdded)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_brand_id")
                        .table(Inventory::Table)
                        .col(Inventory::BrandId)
                        .to_owned(),
                )
                .await?;

            // Sorting/alert reads go by quantity
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_quantity")
                        .table(Inventory::Table)
                        .col(Inventory::Quantity)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Inventory::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Inventory {
        Table,
        ItemCode,
        BrandId,
        ItemDescription,
        LotNumber,
        Expiry,
        PackSize,
        Quantity,
        CostOfSale,
        Note,
        PoReference,
        InvoiceNumber,
        AddedBy,
        DateTimeAdded,
    }
}

mod m20240101_000004_create_item_locations_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_item_locations_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ItemLocations::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(ItemLocations::ItemCode).string().not_null())
                        .col(
                            ColumnDef::new(ItemLocations::LocationId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ItemLocations::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .primary_key(
                            Index::create()
                                .col(ItemLocations::ItemCode)
                                .col(ItemLocations::LocationId),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_item_locations_location_id")
                        .table(ItemLocations::Table)
                        .col(ItemLocations::LocationId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ItemLocations::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum ItemLocations {
        Table,
        ItemCode,
        LocationId,
        Quantity,
    }
}

mod m20240101_000005_create_purchase_orders_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_purchase_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrders::ItemCode)
                                .string()
                                .not_null()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::BrandId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::ProductDescription)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::PackSize).integer().null())
                        .col(
                            ColumnDef::new(PurchaseOrders::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::UnitCost)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::TotalCost)
                                .decimal_len(19, 4)
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::PoReference).string().null())
                        .col(
                            ColumnDef::new(PurchaseOrders::AddedBy)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::DateTimeAdded)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_orders_brand_id")
                        .table(PurchaseOrders::Table)
                        .col(PurchaseOrders::BrandId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PurchaseOrders::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum PurchaseOrders {
        Table,
        ItemCode,
        BrandId,
        ProductDescription,
        PackSize,
        Quantity,
        UnitCost,
        TotalCost,
        PoReference,
        AddedBy,
        DateTimeAdded,
    }
}

mod m20240101_000006_create_transaction_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_transaction_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(CustomerTransactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CustomerTransactions::TransactionId)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(CustomerTransactions::InvoiceReference)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(CustomerTransactions::TransactionDate)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CustomerTransactions::CustomerId)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(CustomerTransactions::CustomerName)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(CustomerTransactions::TotalRetailPrice)
                                .decimal_len(19, 4)
                                .not_null()
                                .default(0),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_customer_transactions_date")
                        .table(CustomerTransactions::Table)
                        .col(CustomerTransactions::TransactionDate)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SoldItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SoldItems::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(SoldItems::TransactionId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SoldItems::ItemCode).string().not_null())
                        .col(ColumnDef::new(SoldItems::LotNumber).string().null())
                        .col(
                            ColumnDef::new(SoldItems::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(SoldItems::UnitRetailPrice)
                                .decimal_len(19, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(SoldItems::BrandName).string().null())
                        .col(ColumnDef::new(SoldItems::ItemDescription).string().null())
                        .col(ColumnDef::new(SoldItems::LocationId).integer().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_sold_items_transaction_id")
                        .table(SoldItems::Table)
                        .col(SoldItems::TransactionId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SoldItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(CustomerTransactions::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum CustomerTransactions {
        Table,
        TransactionId,
        InvoiceReference,
        TransactionDate,
        CustomerId,
        CustomerName,
        TotalRetailPrice,
    }

    #[derive(Iden)]
    enum SoldItems {
        Table,
        Id,
        TransactionId,
        ItemCode,
        LotNumber,
        Quantity,
        UnitRetailPrice,
        BrandName,
        ItemDescription,
        LocationId,
    }
}
