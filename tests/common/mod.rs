#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectOptions, Database, EntityTrait, QueryFilter, Set};
use tokio::sync::mpsc;
use uuid::Uuid;

use counterbook::{
    db::{run_migrations, DbPool},
    entities::{
        automation::{self, TriggerType},
        cashregister, cashregister_account, currency, exchange_rate, order_status, product,
        quantity::{self, Entity as Quantity},
        warehouse,
    },
    events::{self, EventSender},
    services::{
        factory::{ServiceContainer, ServiceFactory},
        order_items::NewOrderItem,
        order_payments::NewOrderPayment,
    },
};

/// Helper harness wiring the full service stack to a fresh in-memory
/// SQLite database.
pub struct TestApp {
    pub db: Arc<DbPool>,
    pub services: ServiceContainer,
    pub user_id: Uuid,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        // A single long-lived connection keeps the in-memory database
        // alive for the whole test.
        let mut opt = ConnectOptions::new("sqlite::memory:".to_string());
        opt.max_connections(1)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(5))
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let pool = Database::connect(opt)
            .await
            .expect("failed to create test database");

        run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let factory = ServiceFactory::new(db.clone(), event_sender);
        let services = ServiceContainer::new(&factory);

        Self {
            db,
            services,
            user_id: Uuid::new_v4(),
            _event_task: event_task,
        }
    }

    pub async fn seed_currency(&self, code: &str) -> currency::Model {
        currency::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(code.to_string()),
            name: Set(format!("{} test currency", code)),
            removed: Set(false),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await
        .expect("seed currency")
    }

    pub async fn seed_exchange_rate(
        &self,
        from_currency_id: Uuid,
        to_currency_id: Uuid,
        rate: Decimal,
    ) -> exchange_rate::Model {
        exchange_rate::ActiveModel {
            id: Set(Uuid::new_v4()),
            from_currency_id: Set(from_currency_id),
            to_currency_id: Set(to_currency_id),
            rate: Set(rate),
            updated_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await
        .expect("seed exchange rate")
    }

    pub async fn seed_warehouse(&self, name: &str) -> warehouse::Model {
        warehouse::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            removed: Set(false),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await
        .expect("seed warehouse")
    }

    pub async fn seed_order_status(&self, name: &str) -> order_status::Model {
        order_status::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            removed: Set(false),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await
        .expect("seed order status")
    }

    /// A cash register with one account holding the given currency.
    pub async fn seed_cashregister(
        &self,
        currency_id: Uuid,
    ) -> (cashregister::Model, cashregister_account::Model) {
        let register = cashregister::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set("Front desk".to_string()),
            removed: Set(false),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await
        .expect("seed cashregister");

        let account = cashregister_account::ActiveModel {
            id: Set(Uuid::new_v4()),
            cashregister_id: Set(register.id),
            currency_id: Set(currency_id),
            name: Set("Main account".to_string()),
            removed: Set(false),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await
        .expect("seed cashregister account");

        (register, account)
    }

    /// An extra account inside an already seeded register.
    pub async fn seed_account(
        &self,
        cashregister_id: Uuid,
        currency_id: Uuid,
        name: &str,
    ) -> cashregister_account::Model {
        cashregister_account::ActiveModel {
            id: Set(Uuid::new_v4()),
            cashregister_id: Set(cashregister_id),
            currency_id: Set(currency_id),
            name: Set(name.to_string()),
            removed: Set(false),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await
        .expect("seed cashregister account")
    }

    pub async fn seed_product(
        &self,
        name: &str,
        purchase_price: Decimal,
        purchase_currency_id: Uuid,
    ) -> product::Model {
        product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            sku: Set(None),
            purchase_price: Set(purchase_price),
            purchase_currency_id: Set(purchase_currency_id),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .expect("seed product")
    }

    pub async fn seed_automation(
        &self,
        name: &str,
        trigger_type: TriggerType,
        conditions: serde_json::Value,
        actions: serde_json::Value,
    ) -> automation::Model {
        automation::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            trigger_type: Set(trigger_type),
            trigger_params: Set(serde_json::json!({})),
            conditions: Set(conditions),
            actions: Set(actions),
            active: Set(true),
            removed: Set(false),
            created_by: Set(self.user_id),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .expect("seed automation")
    }

    /// Stored stock count for the pair, zero when no row exists yet.
    pub async fn stock_level(&self, product_id: Uuid, warehouse_id: Uuid) -> i64 {
        Quantity::find()
            .filter(quantity::Column::ProductId.eq(product_id))
            .filter(quantity::Column::WarehouseId.eq(warehouse_id))
            .one(&*self.db)
            .await
            .expect("query stock level")
            .map(|record| record.count)
            .unwrap_or(0)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

pub fn item(product_id: Uuid, currency_id: Uuid, quantity: i32, price: Decimal) -> NewOrderItem {
    NewOrderItem {
        product_id,
        quantity,
        price,
        currency_id,
        discount_amount: None,
        discount_percent: None,
    }
}

pub fn payment(
    cashregister_id: Uuid,
    cashregister_account_id: Uuid,
    amount: Decimal,
    currency_id: Uuid,
) -> NewOrderPayment {
    NewOrderPayment {
        cashregister_id,
        cashregister_account_id,
        amount,
        currency_id,
        state: None,
        payment_date: None,
    }
}
