use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    db::DbPool,
    entities::{
        automation::TriggerType,
        money_transaction::{
            self, Direction, Entity as MoneyTransaction, SourceModel, TransactionType,
            TransferRole,
        },
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::automations::AutomationEngine,
};

pub const KIND_INCOME: &str = "income";
pub const KIND_EXPENSE: &str = "expense";
pub const KIND_TRANSFER_ACCOUNT: &str = "transfer-account";
pub const KIND_TRANSFER_CASHREGISTER: &str = "transfer-cashregister";

/// What a ledger row was recorded for. The pairing of kind and id is fixed
/// here so call sites cannot produce a mismatched reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionSource {
    Order(Uuid),
    Cashregister(Uuid),
    Manual,
}

impl TransactionSource {
    pub fn model(&self) -> SourceModel {
        match self {
            TransactionSource::Order(_) => SourceModel::Order,
            TransactionSource::Cashregister(_) => SourceModel::Cashregister,
            TransactionSource::Manual => SourceModel::Manual,
        }
    }

    pub fn id(&self) -> Option<Uuid> {
        match self {
            TransactionSource::Order(id) | TransactionSource::Cashregister(id) => Some(*id),
            TransactionSource::Manual => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AppendTransactionRequest {
    /// One of "income", "expense", "transfer-account",
    /// "transfer-cashregister". Anything else is rejected before a write.
    #[validate(length(min = 1, message = "Transaction kind is required"))]
    pub kind: String,

    pub cashregister_id: Uuid,
    pub account_id: Uuid,

    /// Receiving account, required for both transfer kinds.
    pub account_to_id: Option<Uuid>,
    /// Receiving register, required for cashregister transfers.
    pub cashregister_to_id: Option<Uuid>,

    #[validate(custom = "validate_positive_amount")]
    pub amount: Decimal,
    pub currency_id: Uuid,

    pub source: TransactionSource,

    pub description: Option<String>,
    pub confirmed: bool,
    pub created_by: Uuid,
}

fn validate_positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount <= Decimal::ZERO {
        return Err(ValidationError::new("amount_not_positive"));
    }
    Ok(())
}

/// Rows created by one append call.
#[derive(Debug, Clone)]
pub enum AppendOutcome {
    Single(money_transaction::Model),
    Transfer {
        from_leg: money_transaction::Model,
        to_leg: money_transaction::Model,
    },
}

impl AppendOutcome {
    /// All created rows in creation order.
    pub fn rows(&self) -> Vec<&money_transaction::Model> {
        match self {
            AppendOutcome::Single(row) => vec![row],
            AppendOutcome::Transfer { from_leg, to_leg } => vec![from_leg, to_leg],
        }
    }
}

/// Everything one ledger row needs besides its generated id and timestamp.
struct LedgerRow {
    transaction_type: TransactionType,
    direction: Direction,
    cashregister_id: Uuid,
    account_id: Uuid,
    source: TransactionSource,
    currency_id: Uuid,
    amount: Decimal,
    role: Option<TransferRole>,
    transfer_id: Option<Uuid>,
    description: Option<String>,
    confirmed: bool,
    created_by: Uuid,
}

impl LedgerRow {
    fn from_request(
        request: &AppendTransactionRequest,
        transaction_type: TransactionType,
        direction: Direction,
    ) -> Self {
        Self {
            transaction_type,
            direction,
            cashregister_id: request.cashregister_id,
            account_id: request.account_id,
            source: request.source,
            currency_id: request.currency_id,
            amount: request.amount,
            role: None,
            transfer_id: None,
            description: request.description.clone(),
            confirmed: request.confirmed,
            created_by: request.created_by,
        }
    }
}

/// Append-only ledger of monetary movements. Nothing here ever updates or
/// deletes a row; corrections are compensating entries.
#[derive(Clone)]
pub struct MoneyTransactionService {
    db_pool: Arc<DbPool>,
    event_sender: Option<EventSender>,
    automation_engine: Arc<AutomationEngine>,
}

impl MoneyTransactionService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Option<EventSender>,
        automation_engine: Arc<AutomationEngine>,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            automation_engine,
        }
    }

    /// Records a ledger entry. Transfers expand into two rows written one
    /// after the other; a failure between the writes leaves the first leg
    /// in place, to be reconciled over its transfer_id rather than rolled
    /// back. An unsupported kind fails before anything is written.
    #[instrument(skip(self, request), fields(kind = %request.kind, amount = %request.amount))]
    pub async fn append(
        &self,
        request: AppendTransactionRequest,
    ) -> Result<AppendOutcome, ServiceError> {
        request.validate()?;

        match request.kind.as_str() {
            KIND_INCOME => {
                let row = self
                    .persist_row(LedgerRow::from_request(
                        &request,
                        TransactionType::Income,
                        Direction::In,
                    ))
                    .await?;
                Ok(AppendOutcome::Single(row))
            }
            KIND_EXPENSE => {
                let row = self
                    .persist_row(LedgerRow::from_request(
                        &request,
                        TransactionType::Expense,
                        Direction::Out,
                    ))
                    .await?;
                Ok(AppendOutcome::Single(row))
            }
            KIND_TRANSFER_ACCOUNT | KIND_TRANSFER_CASHREGISTER => {
                self.append_transfer(&request).await
            }
            other => {
                warn!(kind = %other, "Rejected unsupported transaction kind");
                Err(ServiceError::UnsupportedTransactionKind(other.to_string()))
            }
        }
    }

    /// Records the compensating entry for an earlier incoming payment. The
    /// original row stays untouched; the ledger only ever grows.
    #[instrument(skip(self, description), fields(amount = %amount))]
    pub async fn append_reversal(
        &self,
        source: TransactionSource,
        cashregister_id: Uuid,
        account_id: Uuid,
        amount: Decimal,
        currency_id: Uuid,
        description: Option<String>,
        created_by: Uuid,
    ) -> Result<money_transaction::Model, ServiceError> {
        if amount <= Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "Reversal amount must be positive".to_string(),
            ));
        }

        self.persist_row(LedgerRow {
            transaction_type: TransactionType::Income,
            direction: Direction::Out,
            cashregister_id,
            account_id,
            source,
            currency_id,
            amount,
            role: None,
            transfer_id: None,
            description,
            confirmed: true,
            created_by,
        })
        .await
    }

    /// Both legs of a transfer, in creation order.
    pub async fn legs_for_transfer(
        &self,
        transfer_id: Uuid,
    ) -> Result<Vec<money_transaction::Model>, ServiceError> {
        let db = &*self.db_pool;

        MoneyTransaction::find()
            .filter(money_transaction::Column::TransferId.eq(transfer_id))
            .order_by_asc(money_transaction::Column::CreatedAt)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, transfer_id = %transfer_id, "Failed to load transfer legs");
                ServiceError::DatabaseError(e.into())
            })
    }

    /// Every row recorded for one source entity, oldest first.
    pub async fn transactions_for_source(
        &self,
        source: TransactionSource,
    ) -> Result<Vec<money_transaction::Model>, ServiceError> {
        let db = &*self.db_pool;

        let mut query = MoneyTransaction::find()
            .filter(money_transaction::Column::SourceModel.eq(source.model()));
        query = match source.id() {
            Some(id) => query.filter(money_transaction::Column::SourceId.eq(id)),
            None => query.filter(money_transaction::Column::SourceId.is_null()),
        };

        query
            .order_by_asc(money_transaction::Column::CreatedAt)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to load transactions for source");
                ServiceError::DatabaseError(e.into())
            })
    }

    async fn append_transfer(
        &self,
        request: &AppendTransactionRequest,
    ) -> Result<AppendOutcome, ServiceError> {
        let account_to_id = request.account_to_id.ok_or_else(|| {
            ServiceError::InvalidInput("Transfer requires a receiving account".to_string())
        })?;

        let to_cashregister_id = match request.kind.as_str() {
            KIND_TRANSFER_CASHREGISTER => request.cashregister_to_id.ok_or_else(|| {
                ServiceError::InvalidInput(
                    "Cashregister transfer requires a receiving cashregister".to_string(),
                )
            })?,
            _ => request.cashregister_id,
        };

        let transfer_id = Uuid::new_v4();

        // Two sequential writes. If the second fails the first leg stays;
        // the dangling leg is visible under its transfer_id.
        let mut from_leg =
            LedgerRow::from_request(request, TransactionType::Transfer, Direction::Out);
        from_leg.role = Some(TransferRole::From);
        from_leg.transfer_id = Some(transfer_id);
        let from_leg = self.persist_row(from_leg).await?;

        let mut to_leg =
            LedgerRow::from_request(request, TransactionType::Transfer, Direction::In);
        to_leg.cashregister_id = to_cashregister_id;
        to_leg.account_id = account_to_id;
        to_leg.role = Some(TransferRole::To);
        to_leg.transfer_id = Some(transfer_id);
        let to_leg = self.persist_row(to_leg).await?;

        info!(
            transfer_id = %transfer_id,
            from_leg_id = %from_leg.id,
            to_leg_id = %to_leg.id,
            "Transfer recorded"
        );

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::TransferRecorded {
                    transfer_id,
                    from_leg_id: from_leg.id,
                    to_leg_id: to_leg.id,
                })
                .await
            {
                warn!(error = %e, transfer_id = %transfer_id, "Failed to send transfer recorded event");
            }
        }

        Ok(AppendOutcome::Transfer { from_leg, to_leg })
    }

    async fn persist_row(
        &self,
        row: LedgerRow,
    ) -> Result<money_transaction::Model, ServiceError> {
        let db = &*self.db_pool;

        let record = money_transaction::ActiveModel {
            id: Set(Uuid::new_v4()),
            transaction_type: Set(row.transaction_type),
            direction: Set(row.direction),
            cashregister_id: Set(row.cashregister_id),
            account_id: Set(row.account_id),
            source_model: Set(row.source.model()),
            source_id: Set(row.source.id()),
            currency_id: Set(row.currency_id),
            amount: Set(row.amount),
            role: Set(row.role),
            transfer_id: Set(row.transfer_id),
            description: Set(row.description),
            confirmed: Set(row.confirmed),
            created_by: Set(row.created_by),
            created_at: Set(Utc::now()),
        };

        let record = record.insert(db).await.map_err(|e| {
            error!(error = %e, "Failed to append money transaction");
            ServiceError::DatabaseError(e.into())
        })?;

        info!(transaction_id = %record.id, amount = %record.amount, "Money transaction appended");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::TransactionRecorded(record.id))
                .await
            {
                warn!(error = %e, transaction_id = %record.id, "Failed to send transaction recorded event");
            }
        }

        self.automation_engine
            .run(TriggerType::MoneyTransactionCreated, record.id)
            .await?;

        Ok(record)
    }
}
