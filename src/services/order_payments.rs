use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, instrument, warn};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    db::DbPool,
    entities::order_payment::{self, Entity as OrderPayment, PaymentState},
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        money_transactions::{
            AppendTransactionRequest, MoneyTransactionService, TransactionSource, KIND_INCOME,
        },
        RemovalPolicy,
    },
};

/// One submitted payment for an order.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewOrderPayment {
    pub cashregister_id: Uuid,
    pub cashregister_account_id: Uuid,

    #[validate(custom = "validate_positive_amount")]
    pub amount: Decimal,
    pub currency_id: Uuid,

    /// Defaults to paid when not given.
    pub state: Option<PaymentState>,
    /// Defaults to the time of recording.
    pub payment_date: Option<DateTime<Utc>>,
}

fn validate_positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount <= Decimal::ZERO {
        return Err(ValidationError::new("amount_not_positive"));
    }
    Ok(())
}

/// Payment rows attached to orders, each backed by a ledger entry.
#[derive(Clone)]
pub struct OrderPaymentService {
    db_pool: Arc<DbPool>,
    event_sender: Option<EventSender>,
    money_service: MoneyTransactionService,
}

impl OrderPaymentService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Option<EventSender>,
        money_service: MoneyTransactionService,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            money_service,
        }
    }

    /// Records the submitted payments for an order. Each payment books its
    /// incoming ledger entry first, then stores the payment row pointing
    /// at it, so a stored payment always references an existing ledger
    /// row. The reverse is not guaranteed when a write fails in between.
    #[instrument(skip(self, payments), fields(order_id = %order_id, count = payments.len()))]
    pub async fn create_for_order(
        &self,
        order_id: Uuid,
        payments: &[NewOrderPayment],
        created_by: Uuid,
    ) -> Result<Vec<order_payment::Model>, ServiceError> {
        let db = &*self.db_pool;
        let mut created = Vec::with_capacity(payments.len());

        for payment in payments {
            payment.validate()?;

            let outcome = self
                .money_service
                .append(AppendTransactionRequest {
                    kind: KIND_INCOME.to_string(),
                    cashregister_id: payment.cashregister_id,
                    account_id: payment.cashregister_account_id,
                    account_to_id: None,
                    cashregister_to_id: None,
                    amount: payment.amount,
                    currency_id: payment.currency_id,
                    source: TransactionSource::Order(order_id),
                    description: Some(format!("Payment for order {}", order_id)),
                    confirmed: true,
                    created_by,
                })
                .await?;

            let transaction_id = outcome.rows().first().map(|row| row.id);

            let row = order_payment::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                cashregister_id: Set(payment.cashregister_id),
                cashregister_account_id: Set(payment.cashregister_account_id),
                amount: Set(payment.amount),
                currency_id: Set(payment.currency_id),
                state: Set(payment.state.clone().unwrap_or(PaymentState::Paid)),
                payment_date: Set(payment.payment_date.unwrap_or_else(Utc::now)),
                transaction_id: Set(transaction_id),
                removed: Set(false),
                created_by: Set(created_by),
                removed_by: Set(None),
                ..Default::default()
            };

            let row = row.insert(db).await.map_err(|e| {
                error!(error = %e, order_id = %order_id, "Failed to create order payment");
                ServiceError::DatabaseError(e.into())
            })?;

            if let Some(event_sender) = &self.event_sender {
                if let Err(e) = event_sender
                    .send(Event::PaymentRecorded {
                        order_id,
                        payment_id: row.id,
                    })
                    .await
                {
                    warn!(error = %e, payment_id = %row.id, "Failed to send payment recorded event");
                }
            }

            created.push(row);
        }

        Ok(created)
    }

    /// Soft-cancels every live payment on the order and books a
    /// compensating ledger entry per payment. The original ledger rows
    /// stay; only the payment rows change state.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn cancel_for_order(
        &self,
        order_id: Uuid,
        removed_by: Uuid,
    ) -> Result<Vec<order_payment::Model>, ServiceError> {
        let db = &*self.db_pool;

        let payments = self
            .payments_for_order(order_id, RemovalPolicy::ActiveOnly)
            .await?;

        let mut cancelled = Vec::with_capacity(payments.len());
        for payment in payments {
            let mut active: order_payment::ActiveModel = payment.clone().into();
            active.removed = Set(true);
            active.removed_by = Set(Some(removed_by));
            active.state = Set(PaymentState::Cancelled);

            let row = active.update(db).await.map_err(|e| {
                error!(error = %e, payment_id = %payment.id, "Failed to cancel order payment");
                ServiceError::DatabaseError(e.into())
            })?;

            self.money_service
                .append_reversal(
                    TransactionSource::Order(order_id),
                    payment.cashregister_id,
                    payment.cashregister_account_id,
                    payment.amount,
                    payment.currency_id,
                    Some(format!("Reversal of payment {}", payment.id)),
                    removed_by,
                )
                .await?;

            if let Some(event_sender) = &self.event_sender {
                if let Err(e) = event_sender
                    .send(Event::PaymentCancelled {
                        order_id,
                        payment_id: row.id,
                    })
                    .await
                {
                    warn!(error = %e, payment_id = %row.id, "Failed to send payment cancelled event");
                }
            }

            cancelled.push(row);
        }

        Ok(cancelled)
    }

    /// Payments belonging to the order under the given removal policy,
    /// oldest first.
    pub async fn payments_for_order(
        &self,
        order_id: Uuid,
        policy: RemovalPolicy,
    ) -> Result<Vec<order_payment::Model>, ServiceError> {
        let db = &*self.db_pool;

        let mut query = OrderPayment::find().filter(order_payment::Column::OrderId.eq(order_id));
        if !policy.includes_removed() {
            query = query.filter(order_payment::Column::Removed.eq(false));
        }

        query
            .order_by_asc(order_payment::Column::CreatedAt)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, order_id = %order_id, "Failed to load order payments");
                ServiceError::DatabaseError(e.into())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn payment_validation_rejects_non_positive_amounts() {
        let payment = NewOrderPayment {
            cashregister_id: Uuid::new_v4(),
            cashregister_account_id: Uuid::new_v4(),
            amount: dec!(0),
            currency_id: Uuid::new_v4(),
            state: None,
            payment_date: None,
        };
        assert!(payment.validate().is_err());

        let payment = NewOrderPayment {
            amount: dec!(0.01),
            ..payment
        };
        assert!(payment.validate().is_ok());
    }
}
