use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, instrument, warn};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    db::DbPool,
    entities::{
        order_item::{self, net_unit_price, Entity as OrderItem},
        product::{self, Entity as Product},
    },
    errors::ServiceError,
    services::{
        currency::CurrencyConversionService,
        quantities::{QuantityAdjustment, QuantityService},
        RemovalPolicy,
    },
};

/// One submitted order line.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewOrderItem {
    pub product_id: Uuid,

    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,

    /// Unit sell price before any discount.
    #[validate(custom = "validate_non_negative")]
    pub price: Decimal,
    pub currency_id: Uuid,

    /// Flat discount per unit. Ignored when a positive percent is set.
    #[validate(custom = "validate_non_negative")]
    pub discount_amount: Option<Decimal>,
    #[validate(custom = "validate_percent")]
    pub discount_percent: Option<Decimal>,
}

fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(ValidationError::new("negative_value"));
    }
    Ok(())
}

fn validate_percent(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO || *value > Decimal::ONE_HUNDRED {
        return Err(ValidationError::new("percent_out_of_range"));
    }
    Ok(())
}

struct LinePricing {
    profit: Decimal,
    exchange_rate: Decimal,
}

/// Order line handling: creation with profit calculation and stock
/// decrement, and soft-removal with the matching stock revert.
#[derive(Clone)]
pub struct OrderItemService {
    db_pool: Arc<DbPool>,
    quantity_service: QuantityService,
    currency_service: CurrencyConversionService,
}

impl OrderItemService {
    pub fn new(
        db_pool: Arc<DbPool>,
        quantity_service: QuantityService,
        currency_service: CurrencyConversionService,
    ) -> Self {
        Self {
            db_pool,
            quantity_service,
            currency_service,
        }
    }

    /// Creates the item rows for an order and takes their stock from the
    /// given warehouse. Each line snapshots the product's purchase price
    /// and currency and fixes the exchange rate behind its profit figure,
    /// so later product or rate edits never rewrite recorded orders.
    #[instrument(skip(self, items), fields(order_id = %order_id, count = items.len()))]
    pub async fn create_for_order(
        &self,
        order_id: Uuid,
        warehouse_id: Uuid,
        items: &[NewOrderItem],
        created_by: Uuid,
    ) -> Result<Vec<order_item::Model>, ServiceError> {
        let db = &*self.db_pool;
        let mut created = Vec::with_capacity(items.len());

        for item in items {
            item.validate()?;

            let product = Product::find_by_id(item.product_id)
                .filter(product::Column::Removed.eq(false))
                .one(db)
                .await
                .map_err(|e| {
                    error!(error = %e, product_id = %item.product_id, "Failed to load product");
                    ServiceError::DatabaseError(e.into())
                })?
                .ok_or_else(|| {
                    warn!(product_id = %item.product_id, "Product not found for order item");
                    ServiceError::ProductNotFound(item.product_id)
                })?;

            let pricing = self.line_pricing(item, &product).await?;

            let row = order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: Set(item.product_id),
                quantity: Set(item.quantity),
                price: Set(item.price),
                currency_id: Set(item.currency_id),
                discount_amount: Set(item.discount_amount),
                discount_percent: Set(item.discount_percent),
                purchase_price: Set(product.purchase_price),
                purchase_currency_id: Set(product.purchase_currency_id),
                profit: Set(pricing.profit),
                exchange_rate: Set(pricing.exchange_rate),
                removed: Set(false),
                created_by: Set(created_by),
                removed_by: Set(None),
                ..Default::default()
            };

            let row = row.insert(db).await.map_err(|e| {
                error!(error = %e, order_id = %order_id, "Failed to create order item");
                ServiceError::DatabaseError(e.into())
            })?;

            self.quantity_service
                .adjust(
                    item.product_id,
                    warehouse_id,
                    -i64::from(item.quantity),
                    QuantityAdjustment::Increment,
                )
                .await?;

            created.push(row);
        }

        Ok(created)
    }

    /// Soft-removes every live item on the order and hands its stock back
    /// to the given warehouse.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn remove_for_order(
        &self,
        order_id: Uuid,
        warehouse_id: Uuid,
        removed_by: Uuid,
    ) -> Result<Vec<order_item::Model>, ServiceError> {
        let db = &*self.db_pool;

        let items = self
            .items_for_order(order_id, RemovalPolicy::ActiveOnly)
            .await?;

        let mut removed = Vec::with_capacity(items.len());
        for item in items {
            let product_id = item.product_id;
            let quantity = item.quantity;

            let mut active: order_item::ActiveModel = item.into();
            active.removed = Set(true);
            active.removed_by = Set(Some(removed_by));

            let row = active.update(db).await.map_err(|e| {
                error!(error = %e, order_id = %order_id, "Failed to remove order item");
                ServiceError::DatabaseError(e.into())
            })?;

            self.quantity_service
                .adjust(
                    product_id,
                    warehouse_id,
                    i64::from(quantity),
                    QuantityAdjustment::Increment,
                )
                .await?;

            removed.push(row);
        }

        Ok(removed)
    }

    /// Items belonging to the order under the given removal policy, oldest
    /// first.
    pub async fn items_for_order(
        &self,
        order_id: Uuid,
        policy: RemovalPolicy,
    ) -> Result<Vec<order_item::Model>, ServiceError> {
        let db = &*self.db_pool;

        let mut query = OrderItem::find().filter(order_item::Column::OrderId.eq(order_id));
        if !policy.includes_removed() {
            query = query.filter(order_item::Column::Removed.eq(false));
        }

        query
            .order_by_asc(order_item::Column::CreatedAt)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = %order_id, "Failed to load order items");
                ServiceError::DatabaseError(e.into())
            })
    }

    /// Profit and exchange rate for one line. The purchase price converts
    /// into the selling currency first; the discounted unit price minus
    /// that converted cost, times the quantity, is the line profit.
    async fn line_pricing(
        &self,
        item: &NewOrderItem,
        product: &product::Model,
    ) -> Result<LinePricing, ServiceError> {
        let conversion = self
            .currency_service
            .convert(
                product.purchase_price,
                product.purchase_currency_id,
                item.currency_id,
            )
            .await?;

        let unit_price = net_unit_price(item.price, item.discount_amount, item.discount_percent);
        let profit =
            (unit_price - conversion.converted_amount) * Decimal::from(item.quantity);

        Ok(LinePricing {
            profit,
            exchange_rate: conversion.rate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn percent_discount_wins_over_flat_amount() {
        let net = net_unit_price(dec!(200), Some(dec!(15)), Some(dec!(10)));
        assert_eq!(net, dec!(180));
    }

    #[test]
    fn zero_percent_falls_back_to_flat_amount() {
        let net = net_unit_price(dec!(200), Some(dec!(15)), Some(dec!(0)));
        assert_eq!(net, dec!(185));
    }

    #[test]
    fn no_discount_keeps_the_price() {
        let net = net_unit_price(dec!(200), None, None);
        assert_eq!(net, dec!(200));
    }

    #[test]
    fn item_validation_rejects_zero_quantity() {
        let item = NewOrderItem {
            product_id: Uuid::new_v4(),
            quantity: 0,
            price: dec!(10),
            currency_id: Uuid::new_v4(),
            discount_amount: None,
            discount_percent: None,
        };
        assert!(item.validate().is_err());
    }

    #[test]
    fn item_validation_rejects_negative_price() {
        let item = NewOrderItem {
            product_id: Uuid::new_v4(),
            quantity: 1,
            price: dec!(-1),
            currency_id: Uuid::new_v4(),
            discount_amount: None,
            discount_percent: None,
        };
        assert!(item.validate().is_err());
    }

    #[test]
    fn item_validation_rejects_percent_above_hundred() {
        let item = NewOrderItem {
            product_id: Uuid::new_v4(),
            quantity: 1,
            price: dec!(10),
            currency_id: Uuid::new_v4(),
            discount_amount: None,
            discount_percent: Some(dec!(101)),
        };
        assert!(item.validate().is_err());
    }
}
