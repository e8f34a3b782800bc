use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One currency-denominated account inside a cash register. Money
/// transactions reference the account that the amount moved through.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cashregister_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub cashregister_id: Uuid,
    pub currency_id: Uuid,
    pub name: String,
    pub removed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cashregister::Entity",
        from = "Column::CashregisterId",
        to = "super::cashregister::Column::Id"
    )]
    Cashregister,
}

impl Related<super::cashregister::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cashregister.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
