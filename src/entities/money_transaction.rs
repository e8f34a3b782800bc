use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Transaction kind as stored on the row. Transfers are persisted as two
/// rows of this type sharing a transfer_id, one leg per side.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum TransactionType {
    #[sea_orm(string_value = "income")]
    Income,
    #[sea_orm(string_value = "expense")]
    Expense,
    #[sea_orm(string_value = "transfer")]
    Transfer,
}

/// Flow direction relative to the cash register. Stored independently of
/// the type: a reversal of an order payment is income with direction out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
pub enum Direction {
    #[sea_orm(string_value = "in")]
    In,
    #[sea_orm(string_value = "out")]
    Out,
}

/// Which side of a transfer a leg sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
pub enum TransferRole {
    #[sea_orm(string_value = "from")]
    From,
    #[sea_orm(string_value = "to")]
    To,
}

/// Kind of record a transaction originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum SourceModel {
    #[sea_orm(string_value = "order")]
    Order,
    #[sea_orm(string_value = "cashregister")]
    Cashregister,
    #[sea_orm(string_value = "manual")]
    Manual,
}

/// Append-only money ledger row. There is no removed flag and no update
/// path; corrections are new rows with the opposite direction.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "money_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub transaction_type: TransactionType,
    pub direction: Direction,

    pub cashregister_id: Uuid,
    /// Account within the cash register the amount moved through.
    pub account_id: Uuid,

    /// What the transaction was recorded for.
    pub source_model: SourceModel,
    pub source_id: Option<Uuid>,

    pub currency_id: Uuid,
    /// Always positive; direction carries the sign.
    pub amount: Decimal,

    /// Set on transfer legs only.
    pub role: Option<TransferRole>,
    /// Shared by the two legs of one transfer.
    pub transfer_id: Option<Uuid>,

    pub description: Option<String>,
    pub confirmed: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Signed amount from the register's point of view.
    pub fn signed_amount(&self) -> Decimal {
        match self.direction {
            Direction::In => self.amount,
            Direction::Out => -self.amount,
        }
    }

    pub fn is_transfer_leg(&self) -> bool {
        self.transaction_type == TransactionType::Transfer && self.transfer_id.is_some()
    }
}
