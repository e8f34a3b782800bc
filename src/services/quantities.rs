use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set,
};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::quantity::{self, Entity as Quantity},
    errors::ServiceError,
    events::{Event, EventSender},
};

/// How an adjustment is applied to the stored count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityAdjustment {
    /// Relative change, executed as one `count = count + ?` update so
    /// concurrent increments of the same pair never lose each other.
    Increment,
    /// Absolute overwrite. Not safe under concurrent writers; callers must
    /// serialize access themselves.
    Set,
}

/// Per (product, warehouse) stock counter.
#[derive(Clone)]
pub struct QuantityService {
    db_pool: Arc<DbPool>,
    event_sender: Option<EventSender>,
}

impl QuantityService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Applies one adjustment, creating the tracking row on first touch.
    /// There is no negative-stock guard; counts may go below zero and it is
    /// up to callers to decide whether that is acceptable.
    #[instrument(skip(self), fields(product_id = %product_id, warehouse_id = %warehouse_id, amount))]
    pub async fn adjust(
        &self,
        product_id: Uuid,
        warehouse_id: Uuid,
        amount: i64,
        mode: QuantityAdjustment,
    ) -> Result<i64, ServiceError> {
        let db = &*self.db_pool;

        let count_expr = match mode {
            QuantityAdjustment::Increment => Expr::col(quantity::Column::Count).add(amount),
            QuantityAdjustment::Set => Expr::value(amount),
        };

        let result = Quantity::update_many()
            .col_expr(quantity::Column::Count, count_expr)
            .col_expr(quantity::Column::UpdatedAt, Expr::value(Some(Utc::now())))
            .filter(quantity::Column::ProductId.eq(product_id))
            .filter(quantity::Column::WarehouseId.eq(warehouse_id))
            .exec(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to adjust stock count");
                ServiceError::DatabaseError(e.into())
            })?;

        if result.rows_affected == 0 {
            // First touch of this pair. The row starts at zero, so both
            // modes end up storing the amount itself. A concurrent first
            // touch surfaces as a unique-index violation; not retried.
            let record = quantity::ActiveModel {
                id: Set(Uuid::new_v4()),
                product_id: Set(product_id),
                warehouse_id: Set(warehouse_id),
                count: Set(amount),
                ..Default::default()
            };

            record.insert(db).await.map_err(|e| {
                error!(error = %e, "Failed to create stock record");
                ServiceError::DatabaseError(e.into())
            })?;
        }

        let count = self.count_for(product_id, warehouse_id).await?;

        info!(count, "Stock adjusted");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::StockAdjusted {
                    product_id,
                    warehouse_id,
                    new_count: count,
                })
                .await
            {
                warn!(error = %e, "Failed to send stock adjusted event");
            }
        }

        Ok(count)
    }

    /// Current count for the pair; zero when it has never been touched.
    pub async fn count_for(
        &self,
        product_id: Uuid,
        warehouse_id: Uuid,
    ) -> Result<i64, ServiceError> {
        let db = &*self.db_pool;

        let record = Quantity::find()
            .filter(quantity::Column::ProductId.eq(product_id))
            .filter(quantity::Column::WarehouseId.eq(warehouse_id))
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to load stock record");
                ServiceError::DatabaseError(e.into())
            })?;

        Ok(record.map(|r| r.count).unwrap_or(0))
    }
}
