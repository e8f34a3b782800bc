use anyhow::Result;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::prelude::*;
use std::time::Duration;
use tracing::{error, info};

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_orders_table::Migration),
            Box::new(m20240101_000002_create_order_items_table::Migration),
            Box::new(m20240101_000003_create_order_payments_table::Migration),
            Box::new(m20240101_000004_create_money_transactions_table::Migration),
            Box::new(m20240101_000005_create_quantities_table::Migration),
            Box::new(m20240101_000006_create_automations_table::Migration),
            Box::new(m20240101_000007_create_products_table::Migration),
            Box::new(m20240101_000008_create_currency_tables::Migration),
            Box::new(m20240101_000009_create_cashregister_tables::Migration),
            Box::new(m20240101_000010_create_dictionary_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_orders_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create orders table aligned with entities::order Model
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Orders::WarehouseId).uuid().not_null())
                        .col(ColumnDef::new(Orders::DeliveryServiceId).uuid().null())
                        .col(ColumnDef::new(Orders::OrderSourceId).uuid().null())
                        .col(ColumnDef::new(Orders::OrderStatusId).uuid().null())
                        .col(ColumnDef::new(Orders::ClientId).uuid().null())
                        .col(ColumnDef::new(Orders::Comment).string().null())
                        .col(ColumnDef::new(Orders::PaymentIds).json().not_null())
                        .col(ColumnDef::new(Orders::PaymentStatus).string().not_null())
                        .col(
                            ColumnDef::new(Orders::Removed)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Orders::CreatedBy).uuid().not_null())
                        .col(ColumnDef::new(Orders::ConfirmedBy).uuid().null())
                        .col(ColumnDef::new(Orders::RemovedBy).uuid().null())
                        .col(ColumnDef::new(Orders::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Orders::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            // Useful indexes
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_warehouse_id")
                        .table(Orders::Table)
                        .col(Orders::WarehouseId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_removed")
                        .table(Orders::Table)
                        .col(Orders::Removed)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_created_at")
                        .table(Orders::Table)
                        .col(Orders::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Orders {
        Table,
        Id,
        WarehouseId,
        DeliveryServiceId,
        OrderSourceId,
        OrderStatusId,
        ClientId,
        Comment,
        PaymentIds,
        PaymentStatus,
        Removed,
        CreatedBy,
        ConfirmedBy,
        RemovedBy,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_order_items_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_order_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Create order_items table aligned with entities::order_item Model
            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderItems::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::ProductId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::Quantity).integer().not_null())
                        .col(ColumnDef::new(OrderItems::Price).decimal().not_null())
                        .col(ColumnDef::new(OrderItems::CurrencyId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::DiscountAmount).decimal().null())
                        .col(
                            ColumnDef::new(OrderItems::DiscountPercent)
                                .decimal()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(OrderItems::PurchasePrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(OrderItems::PurchaseCurrencyId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderItems::Profit)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(OrderItems::ExchangeRate)
                                .decimal()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(OrderItems::Removed)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(OrderItems::CreatedBy).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::RemovedBy).uuid().null())
                        .col(
                            ColumnDef::new(OrderItems::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderItems::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_items_order_id")
                        .table(OrderItems::Table)
                        .col(OrderItems::OrderId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_items_product_id")
                        .table(OrderItems::Table)
                        .col(OrderItems::ProductId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum OrderItems {
        Table,
        Id,
        OrderId,
        ProductId,
        Quantity,
        Price,
        CurrencyId,
        DiscountAmount,
        DiscountPercent,
        PurchasePrice,
        PurchaseCurrencyId,
        Profit,
        ExchangeRate,
        Removed,
        CreatedBy,
        RemovedBy,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_order_payments_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_order_payments_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OrderPayments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderPayments::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderPayments::OrderId).uuid().not_null())
                        .col(
                            ColumnDef::new(OrderPayments::CashregisterId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderPayments::CashregisterAccountId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderPayments::Amount).decimal().not_null())
                        .col(ColumnDef::new(OrderPayments::CurrencyId).uuid().not_null())
                        .col(ColumnDef::new(OrderPayments::State).string().not_null())
                        .col(
                            ColumnDef::new(OrderPayments::PaymentDate)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderPayments::TransactionId).uuid().null())
                        .col(
                            ColumnDef::new(OrderPayments::Removed)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(OrderPayments::CreatedBy).uuid().not_null())
                        .col(ColumnDef::new(OrderPayments::RemovedBy).uuid().null())
                        .col(
                            ColumnDef::new(OrderPayments::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderPayments::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_payments_order_id")
                        .table(OrderPayments::Table)
                        .col(OrderPayments::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderPayments::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum OrderPayments {
        Table,
        Id,
        OrderId,
        CashregisterId,
        CashregisterAccountId,
        Amount,
        CurrencyId,
        State,
        PaymentDate,
        TransactionId,
        Removed,
        CreatedBy,
        RemovedBy,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_money_transactions_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_money_transactions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Append-only ledger: no removed column on purpose
            manager
                .create_table(
                    Table::create()
                        .table(MoneyTransactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MoneyTransactions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MoneyTransactions::TransactionType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MoneyTransactions::Direction)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MoneyTransactions::CashregisterId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MoneyTransactions::AccountId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MoneyTransactions::SourceModel)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(MoneyTransactions::SourceId).uuid().null())
                        .col(
                            ColumnDef::new(MoneyTransactions::CurrencyId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MoneyTransactions::Amount)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(MoneyTransactions::Role).string().null())
                        .col(ColumnDef::new(MoneyTransactions::TransferId).uuid().null())
                        .col(
                            ColumnDef::new(MoneyTransactions::Description)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(MoneyTransactions::Confirmed)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(MoneyTransactions::CreatedBy)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MoneyTransactions::CreatedAt)
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
                        .name("idx_money_transactions_cashregister_id")
                        .table(MoneyTransactions::Table)
                        .col(MoneyTransactions::CashregisterId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_money_transactions_transfer_id")
                        .table(MoneyTransactions::Table)
                        .col(MoneyTransactions::TransferId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_money_transactions_created_at")
                        .table(MoneyTransactions::Table)
                        .col(MoneyTransactions::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MoneyTransactions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum MoneyTransactions {
        Table,
        Id,
        TransactionType,
        Direction,
        CashregisterId,
        AccountId,
        SourceModel,
        SourceId,
        CurrencyId,
        Amount,
        Role,
        TransferId,
        Description,
        Confirmed,
        CreatedBy,
        CreatedAt,
    }
}

mod m20240101_000005_create_quantities_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_quantities_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Quantities::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Quantities::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Quantities::ProductId).uuid().not_null())
                        .col(ColumnDef::new(Quantities::WarehouseId).uuid().not_null())
                        .col(
                            ColumnDef::new(Quantities::Count)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Quantities::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Quantities::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            // One row per product/warehouse pair
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_quantities_product_warehouse")
                        .table(Quantities::Table)
                        .col(Quantities::ProductId)
                        .col(Quantities::WarehouseId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Quantities::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Quantities {
        Table,
        Id,
        ProductId,
        WarehouseId,
        Count,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000006_create_automations_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_automations_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Automations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Automations::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Automations::Name).string().not_null())
                        .col(
                            ColumnDef::new(Automations::TriggerType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Automations::TriggerParams)
                                .json()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Automations::Conditions).json().not_null())
                        .col(ColumnDef::new(Automations::Actions).json().not_null())
                        .col(
                            ColumnDef::new(Automations::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Automations::Removed)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Automations::CreatedBy).uuid().not_null())
                        .col(
                            ColumnDef::new(Automations::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Automations::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_automations_trigger_type")
                        .table(Automations::Table)
                        .col(Automations::TriggerType)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Automations::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Automations {
        Table,
        Id,
        Name,
        TriggerType,
        TriggerParams,
        Conditions,
        Actions,
        Active,
        Removed,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000007_create_products_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(ColumnDef::new(Products::Sku).string().null())
                        .col(
                            ColumnDef::new(Products::PurchasePrice)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::PurchaseCurrencyId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Products::Removed)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Products::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Products::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_sku")
                        .table(Products::Table)
                        .col(Products::Sku)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Products {
        Table,
        Id,
        Name,
        Sku,
        PurchasePrice,
        PurchaseCurrencyId,
        Removed,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000008_create_currency_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000008_create_currency_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Currencies::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Currencies::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Currencies::Code).string().not_null())
                        .col(ColumnDef::new(Currencies::Name).string().not_null())
                        .col(
                            ColumnDef::new(Currencies::Removed)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Currencies::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ExchangeRates::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ExchangeRates::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ExchangeRates::FromCurrencyId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ExchangeRates::ToCurrencyId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ExchangeRates::Rate).decimal().not_null())
                        .col(
                            ColumnDef::new(ExchangeRates::UpdatedAt)
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
                        .name("idx_exchange_rates_pair")
                        .table(ExchangeRates::Table)
                        .col(ExchangeRates::FromCurrencyId)
                        .col(ExchangeRates::ToCurrencyId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ExchangeRates::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Currencies::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Currencies {
        Table,
        Id,
        Code,
        Name,
        Removed,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum ExchangeRates {
        Table,
        Id,
        FromCurrencyId,
        ToCurrencyId,
        Rate,
        UpdatedAt,
    }
}

mod m20240101_000009_create_cashregister_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000009_create_cashregister_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Cashregisters::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Cashregisters::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Cashregisters::Name).string().not_null())
                        .col(
                            ColumnDef::new(Cashregisters::Removed)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Cashregisters::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(CashregisterAccounts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CashregisterAccounts::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CashregisterAccounts::CashregisterId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CashregisterAccounts::CurrencyId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CashregisterAccounts::Name)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CashregisterAccounts::Removed)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(CashregisterAccounts::CreatedAt)
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
                        .name("idx_cashregister_accounts_cashregister_id")
                        .table(CashregisterAccounts::Table)
                        .col(CashregisterAccounts::CashregisterId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CashregisterAccounts::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Cashregisters::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Cashregisters {
        Table,
        Id,
        Name,
        Removed,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum CashregisterAccounts {
        Table,
        Id,
        CashregisterId,
        CurrencyId,
        Name,
        Removed,
        CreatedAt,
    }
}

mod m20240101_000010_create_dictionary_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000010_create_dictionary_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Warehouses::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Warehouses::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Warehouses::Name).string().not_null())
                        .col(
                            ColumnDef::new(Warehouses::Removed)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Warehouses::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderStatuses::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderStatuses::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderStatuses::Name).string().not_null())
                        .col(
                            ColumnDef::new(OrderStatuses::Removed)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(OrderStatuses::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderStatuses::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Warehouses::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Warehouses {
        Table,
        Id,
        Name,
        Removed,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum OrderStatuses {
        Table,
        Id,
        Name,
        Removed,
        CreatedAt,
    }
}

// Database migration CLI runner
pub async fn run_migration(db_url: &str) -> Result<()> {
    info!("Setting up database connection for migrations");

    let mut opt = ConnectOptions::new(db_url);
    opt.max_connections(10)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true);

    let db = Database::connect(opt).await?;

    info!("Running database migrations");

    let result = Migrator::up(&db, None).await;

    match result {
        Ok(_) => {
            info!("Migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Migration failed: {}", e);
            Err(e.into())
        }
    }
}
