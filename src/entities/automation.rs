use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Domain moments an automation can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(64))")]
pub enum TriggerType {
    #[sea_orm(string_value = "order-created")]
    OrderCreated,
    #[sea_orm(string_value = "order-updated")]
    OrderUpdated,
    #[sea_orm(string_value = "order-removed")]
    OrderRemoved,
    #[sea_orm(string_value = "money-transaction-created")]
    MoneyTransactionCreated,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "automations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub trigger_type: TriggerType,

    /// Extra trigger configuration, kept opaque at the storage level.
    pub trigger_params: Json,

    /// JSON array of `{field, operator, params}` objects, ANDed together.
    /// Operators and fields are matched by name at evaluation time so rows
    /// written by newer versions still load; an operator this version does
    /// not know simply never matches.
    pub conditions: Json,

    /// JSON array of `{field, params}` objects applied in order. Unknown
    /// action fields are skipped.
    pub actions: Json,

    pub active: bool,
    pub removed: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;

        let now = Utc::now();

        if insert {
            active_model.created_at = Set(now);
        } else if let ActiveValue::NotSet = active_model.updated_at {
            active_model.updated_at = Set(Some(now));
        }

        Ok(active_model)
    }
}
