use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{
        automation::TriggerType,
        order::{self, Entity as Order},
        order_payment,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        automations::AutomationEngine,
        order_items::{NewOrderItem, OrderItemService},
        order_payments::{NewOrderPayment, OrderPaymentService},
        payment_status::{compute_payment_status, totals_from_items, totals_from_payments},
        RemovalPolicy,
    },
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub warehouse_id: Uuid,
    pub delivery_service_id: Option<Uuid>,
    pub order_source_id: Option<Uuid>,
    pub order_status_id: Option<Uuid>,
    pub client_id: Option<Uuid>,

    #[validate(length(max = 1000, message = "Comment must not exceed 1000 characters"))]
    pub comment: Option<String>,

    #[validate]
    pub items: Vec<NewOrderItem>,
    #[validate]
    pub payments: Vec<NewOrderPayment>,

    pub created_by: Uuid,
    pub confirmed_by: Option<Uuid>,
}

/// Patch plus full replacement sets for items and payments. A `None`
/// header field keeps the stored value; there is no way to clear one
/// back to null through an edit.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EditOrderRequest {
    pub warehouse_id: Option<Uuid>,
    pub delivery_service_id: Option<Uuid>,
    pub order_source_id: Option<Uuid>,
    pub order_status_id: Option<Uuid>,
    pub client_id: Option<Uuid>,

    #[validate(length(max = 1000, message = "Comment must not exceed 1000 characters"))]
    pub comment: Option<String>,

    #[validate]
    pub items: Vec<NewOrderItem>,
    #[validate]
    pub payments: Vec<NewOrderPayment>,

    pub edited_by: Uuid,
}

/// Drives the order lifecycle: payments, items, stock, the money
/// ledger, the derived payment status, and automation triggers, in a
/// fixed sequence.
///
/// None of the sequences run inside a database transaction. A failure
/// partway leaves the earlier steps in place (for example an order item
/// without its stock decrement); callers retry or repair explicitly.
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
    event_sender: Option<EventSender>,
    item_service: OrderItemService,
    payment_service: OrderPaymentService,
    automation_engine: Arc<AutomationEngine>,
    payment_match_epsilon: Decimal,
}

impl OrderService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Option<EventSender>,
        item_service: OrderItemService,
        payment_service: OrderPaymentService,
        automation_engine: Arc<AutomationEngine>,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            item_service,
            payment_service,
            automation_engine,
            payment_match_epsilon: Decimal::ZERO,
        }
    }

    /// Tolerance used when comparing per-currency price and payment
    /// totals. Zero means exact matching.
    pub fn with_payment_match_epsilon(mut self, epsilon: Decimal) -> Self {
        self.payment_match_epsilon = epsilon;
        self
    }

    /// Creates an order together with its payments and items.
    ///
    /// Payments are recorded first (each booking an incoming ledger
    /// entry), then items (each snapshotting the product purchase price
    /// and decrementing stock), then the order row itself with its
    /// payment-id list and the payment status derived from both sets.
    /// The returned model is the order as written; automations that
    /// fire on creation may have changed it since.
    #[instrument(skip(self, request), fields(warehouse_id = %request.warehouse_id))]
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<order::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let order_id = Uuid::new_v4();

        let payments = self
            .payment_service
            .create_for_order(order_id, &request.payments, request.created_by)
            .await?;

        let items = self
            .item_service
            .create_for_order(order_id, request.warehouse_id, &request.items, request.created_by)
            .await?;

        let prices = totals_from_items(&items);
        let paid = totals_from_payments(&payments);
        let status = compute_payment_status(&prices, &paid, self.payment_match_epsilon);

        let order = order::ActiveModel {
            id: Set(order_id),
            warehouse_id: Set(request.warehouse_id),
            delivery_service_id: Set(request.delivery_service_id),
            order_source_id: Set(request.order_source_id),
            order_status_id: Set(request.order_status_id),
            client_id: Set(request.client_id),
            comment: Set(request.comment),
            payment_ids: Set(payment_ids_json(&payments)),
            payment_status: Set(status),
            removed: Set(false),
            created_by: Set(request.created_by),
            confirmed_by: Set(request.confirmed_by),
            removed_by: Set(None),
            ..Default::default()
        };

        let order = order.insert(db).await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to create order");
            ServiceError::DatabaseError(e.into())
        })?;

        info!(
            order_id = %order.id,
            payment_status = %order.payment_status,
            items = items.len(),
            payments = payments.len(),
            "Created order"
        );

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::OrderCreated(order.id)).await {
                warn!(error = %e, order_id = %order.id, "Failed to send order created event");
            }
        }

        self.automation_engine
            .run(TriggerType::OrderCreated, order.id)
            .await?;

        Ok(order)
    }

    /// Replaces an order's payments and items and patches its header
    /// fields.
    ///
    /// Existing payments are soft-cancelled with a reversing ledger
    /// entry each, existing items are soft-removed with their stock
    /// put back into the warehouse the order had before the edit, and
    /// the new sets are created exactly as on create. The payment
    /// status is recomputed from the new sets only.
    #[instrument(skip(self, request), fields(order_id = %order_id))]
    pub async fn edit_order(
        &self,
        order_id: Uuid,
        request: EditOrderRequest,
    ) -> Result<order::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;

        let existing = Order::find_by_id(order_id)
            .filter(order::Column::Removed.eq(false))
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = %order_id, "Failed to load order");
                ServiceError::DatabaseError(e.into())
            })?
            .ok_or_else(|| {
                warn!(order_id = %order_id, "Order not found for edit");
                ServiceError::OrderNotFound(order_id)
            })?;

        let previous_warehouse = existing.warehouse_id;
        let warehouse_id = request.warehouse_id.unwrap_or(previous_warehouse);

        self.payment_service
            .cancel_for_order(order_id, request.edited_by)
            .await?;
        let payments = self
            .payment_service
            .create_for_order(order_id, &request.payments, request.edited_by)
            .await?;

        self.item_service
            .remove_for_order(order_id, previous_warehouse, request.edited_by)
            .await?;
        let items = self
            .item_service
            .create_for_order(order_id, warehouse_id, &request.items, request.edited_by)
            .await?;

        let prices = totals_from_items(&items);
        let paid = totals_from_payments(&payments);
        let status = compute_payment_status(&prices, &paid, self.payment_match_epsilon);

        let mut active: order::ActiveModel = existing.into();
        if let Some(warehouse_id) = request.warehouse_id {
            active.warehouse_id = Set(warehouse_id);
        }
        if let Some(delivery_service_id) = request.delivery_service_id {
            active.delivery_service_id = Set(Some(delivery_service_id));
        }
        if let Some(order_source_id) = request.order_source_id {
            active.order_source_id = Set(Some(order_source_id));
        }
        if let Some(order_status_id) = request.order_status_id {
            active.order_status_id = Set(Some(order_status_id));
        }
        if let Some(client_id) = request.client_id {
            active.client_id = Set(Some(client_id));
        }
        if let Some(comment) = request.comment {
            active.comment = Set(Some(comment));
        }
        active.payment_ids = Set(payment_ids_json(&payments));
        active.payment_status = Set(status);

        let order = active.update(db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => {
                warn!(order_id = %order_id, "Order edit touched no row");
                ServiceError::NotEdited
            }
            e => {
                error!(error = %e, order_id = %order_id, "Failed to update order");
                ServiceError::DatabaseError(e.into())
            }
        })?;

        info!(
            order_id = %order.id,
            payment_status = %order.payment_status,
            "Edited order"
        );

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::OrderUpdated(order.id)).await {
                warn!(error = %e, order_id = %order.id, "Failed to send order updated event");
            }
        }

        self.automation_engine
            .run(TriggerType::OrderUpdated, order.id)
            .await?;

        Ok(order)
    }

    /// Soft-removes the given orders in one statement and fires the
    /// removal trigger per id. Items and payments are left as they are;
    /// stock and ledger entries are not reverted here.
    #[instrument(skip(self), fields(count = order_ids.len()))]
    pub async fn remove_orders(
        &self,
        order_ids: &[Uuid],
        removed_by: Uuid,
    ) -> Result<u64, ServiceError> {
        if order_ids.is_empty() {
            return Err(ServiceError::InvalidInput("No order ids given".to_string()));
        }

        let db = &*self.db_pool;

        let result = Order::update_many()
            .col_expr(order::Column::Removed, Expr::value(true))
            .col_expr(order::Column::RemovedBy, Expr::value(Some(removed_by)))
            .col_expr(
                order::Column::UpdatedAt,
                Expr::value(Some(chrono::Utc::now())),
            )
            .filter(order::Column::Id.is_in(order_ids.iter().copied()))
            .exec(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to remove orders");
                ServiceError::DatabaseError(e.into())
            })?;

        if result.rows_affected == 0 {
            warn!("Order removal touched no rows");
            return Err(ServiceError::NotRemoved);
        }

        info!(removed = result.rows_affected, "Removed orders");

        for &order_id in order_ids {
            if let Some(event_sender) = &self.event_sender {
                if let Err(e) = event_sender.send(Event::OrderRemoved(order_id)).await {
                    warn!(error = %e, order_id = %order_id, "Failed to send order removed event");
                }
            }

            self.automation_engine
                .run(TriggerType::OrderRemoved, order_id)
                .await?;
        }

        Ok(result.rows_affected)
    }

    pub async fn get_order(
        &self,
        order_id: Uuid,
        policy: RemovalPolicy,
    ) -> Result<order::Model, ServiceError> {
        let db = &*self.db_pool;

        let mut query = Order::find_by_id(order_id);
        if !policy.includes_removed() {
            query = query.filter(order::Column::Removed.eq(false));
        }

        query
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = %order_id, "Failed to load order");
                ServiceError::DatabaseError(e.into())
            })?
            .ok_or_else(|| {
                warn!(order_id = %order_id, "Order not found");
                ServiceError::OrderNotFound(order_id)
            })
    }
}

fn payment_ids_json(payments: &[order_payment::Model]) -> serde_json::Value {
    let ids: Vec<Uuid> = payments.iter().map(|p| p.id).collect();
    serde_json::json!(ids)
}
