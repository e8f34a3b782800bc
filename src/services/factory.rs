use rust_decimal::Decimal;
use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::DbPool,
    events::EventSender,
    services::{
        automations::AutomationEngine, currency::CurrencyConversionService,
        money_transactions::MoneyTransactionService, order_items::OrderItemService,
        order_payments::OrderPaymentService, orders::OrderService, quantities::QuantityService,
    },
};

/// Factory for creating service instances with shared dependencies
pub struct ServiceFactory {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
    payment_match_epsilon: Decimal,
}

impl ServiceFactory {
    /// Creates a new service factory with the given dependencies
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
            payment_match_epsilon: Decimal::ZERO,
        }
    }

    /// Creates a factory carrying tunables from the application config
    pub fn from_config(
        db_pool: Arc<DbPool>,
        event_sender: EventSender,
        config: &AppConfig,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            payment_match_epsilon: config.payment_match_epsilon,
        }
    }

    /// Creates a quantity ledger service instance
    pub fn quantity_service(&self) -> QuantityService {
        QuantityService::new(self.db_pool.clone(), Some(self.event_sender.clone()))
    }

    /// Creates a currency conversion service instance
    pub fn currency_service(&self) -> CurrencyConversionService {
        CurrencyConversionService::new(self.db_pool.clone())
    }

    /// Creates an automation engine instance
    pub fn automation_engine(&self) -> AutomationEngine {
        AutomationEngine::new(self.db_pool.clone(), Some(self.event_sender.clone()))
    }

    /// Creates a money transaction service instance
    pub fn money_transaction_service(&self) -> MoneyTransactionService {
        MoneyTransactionService::new(
            self.db_pool.clone(),
            Some(self.event_sender.clone()),
            Arc::new(self.automation_engine()),
        )
    }

    /// Creates an order item service instance
    pub fn order_item_service(&self) -> OrderItemService {
        OrderItemService::new(
            self.db_pool.clone(),
            self.quantity_service(),
            self.currency_service(),
        )
    }

    /// Creates an order payment service instance
    pub fn order_payment_service(&self) -> OrderPaymentService {
        OrderPaymentService::new(
            self.db_pool.clone(),
            Some(self.event_sender.clone()),
            self.money_transaction_service(),
        )
    }

    /// Creates an order service instance
    pub fn order_service(&self) -> OrderService {
        OrderService::new(
            self.db_pool.clone(),
            Some(self.event_sender.clone()),
            self.order_item_service(),
            self.order_payment_service(),
            Arc::new(self.automation_engine()),
        )
        .with_payment_match_epsilon(self.payment_match_epsilon)
    }

    /// Gets a reference to the database pool
    pub fn db_pool(&self) -> &Arc<DbPool> {
        &self.db_pool
    }

    /// Gets a reference to the event sender
    pub fn event_sender(&self) -> &EventSender {
        &self.event_sender
    }
}

/// Service container holding all service instances
#[derive(Clone)]
pub struct ServiceContainer {
    pub quantities: Arc<QuantityService>,
    pub currency: Arc<CurrencyConversionService>,
    pub money_transactions: Arc<MoneyTransactionService>,
    pub automations: Arc<AutomationEngine>,
    pub orders: Arc<OrderService>,
    pub order_items: Arc<OrderItemService>,
    pub order_payments: Arc<OrderPaymentService>,
}

impl ServiceContainer {
    /// Creates a new service container with all services initialized
    pub fn new(factory: &ServiceFactory) -> Self {
        Self {
            quantities: Arc::new(factory.quantity_service()),
            currency: Arc::new(factory.currency_service()),
            money_transactions: Arc::new(factory.money_transaction_service()),
            automations: Arc::new(factory.automation_engine()),
            orders: Arc::new(factory.order_service()),
            order_items: Arc::new(factory.order_item_service()),
            order_payments: Arc::new(factory.order_payment_service()),
        }
    }
}
