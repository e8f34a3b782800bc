use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::*;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,

    /// Unit sell price before any discount.
    pub price: Decimal,
    pub currency_id: Uuid,
    pub discount_amount: Option<Decimal>,
    pub discount_percent: Option<Decimal>,

    /// Purchase cost snapshot taken from the product at order time.
    pub purchase_price: Decimal,
    pub purchase_currency_id: Uuid,

    /// Line profit in the selling currency. Zero when no exchange rate
    /// conversion applied and purchase currency equals the sell currency.
    pub profit: Decimal,
    /// Purchase-to-sell conversion rate used for the profit figure.
    pub exchange_rate: Decimal,

    pub removed: bool,
    pub created_by: Uuid,
    pub removed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

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

/// Unit price after a line discount. A positive percent discount wins over
/// a flat amount; the flat amount is per unit.
pub fn net_unit_price(
    price: Decimal,
    discount_amount: Option<Decimal>,
    discount_percent: Option<Decimal>,
) -> Decimal {
    match discount_percent {
        Some(percent) if percent > Decimal::ZERO => price - price * percent / Decimal::ONE_HUNDRED,
        _ => price - discount_amount.unwrap_or(Decimal::ZERO),
    }
}

impl Model {
    pub fn net_unit_price(&self) -> Decimal {
        net_unit_price(self.price, self.discount_amount, self.discount_percent)
    }

    /// Line total after discount.
    pub fn net_total(&self) -> Decimal {
        self.net_unit_price() * Decimal::from(self.quantity)
    }
}
