use rust_decimal::Decimal;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{
        automation::{self, Entity as Automation, TriggerType},
        money_transaction::{self, Entity as MoneyTransaction},
        order::{self, Entity as Order},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};

pub const OP_CONTAINS: &str = "contains";
pub const OP_NOT_CONTAINS: &str = "not-contains";
pub const OP_EQUALS: &str = "equals";
pub const OP_NOT_EQUAL: &str = "not-equal";
pub const OP_IN: &str = "in";

pub const ACTION_ORDER_STATUS_UPDATE: &str = "order-status-update";

/// One predicate from an automation's condition list. All conditions of a
/// rule must pass for its actions to apply.
#[derive(Debug, Clone, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: String,
    #[serde(default)]
    pub params: Vec<Value>,
}

/// One entry from an automation's action list, applied in order.
#[derive(Debug, Clone, Deserialize)]
pub struct Action {
    pub field: String,
    #[serde(default)]
    pub params: Vec<Value>,
}

/// The entity a run is evaluating, held in memory while rules apply to it.
/// Field access goes through a fixed name table per variant, so rules
/// address fields by string without the engine losing track of types.
enum EntitySnapshot {
    Order { model: order::Model, dirty: bool },
    MoneyTransaction(money_transaction::Model),
}

impl EntitySnapshot {
    async fn load(
        db: &DbPool,
        trigger_type: TriggerType,
        entity_id: Uuid,
    ) -> Result<Self, ServiceError> {
        match trigger_type {
            TriggerType::OrderCreated | TriggerType::OrderUpdated | TriggerType::OrderRemoved => {
                let model = Order::find_by_id(entity_id)
                    .one(db)
                    .await
                    .map_err(|e| {
                        error!(error = %e, entity_id = %entity_id, "Failed to load order for automation run");
                        ServiceError::DatabaseError(e.into())
                    })?
                    .ok_or_else(|| {
                        warn!(entity_id = %entity_id, "Automation target order not found");
                        ServiceError::EntityNotFound {
                            kind: "Order".to_string(),
                            id: entity_id,
                        }
                    })?;

                Ok(EntitySnapshot::Order {
                    model,
                    dirty: false,
                })
            }
            TriggerType::MoneyTransactionCreated => {
                let model = MoneyTransaction::find_by_id(entity_id)
                    .one(db)
                    .await
                    .map_err(|e| {
                        error!(error = %e, entity_id = %entity_id, "Failed to load transaction for automation run");
                        ServiceError::DatabaseError(e.into())
                    })?
                    .ok_or_else(|| {
                        warn!(entity_id = %entity_id, "Automation target transaction not found");
                        ServiceError::EntityNotFound {
                            kind: "MoneyTransaction".to_string(),
                            id: entity_id,
                        }
                    })?;

                Ok(EntitySnapshot::MoneyTransaction(model))
            }
        }
    }

    fn field(&self, name: &str) -> Option<Value> {
        match self {
            EntitySnapshot::Order { model, .. } => order_field(model, name),
            EntitySnapshot::MoneyTransaction(model) => transaction_field(model, name),
        }
    }

    fn apply_action(&mut self, action: &Action) {
        match self {
            EntitySnapshot::Order { model, dirty } => match action.field.as_str() {
                ACTION_ORDER_STATUS_UPDATE => {
                    let new_status = action
                        .params
                        .first()
                        .and_then(Value::as_str)
                        .and_then(|s| Uuid::parse_str(s).ok());

                    match new_status {
                        Some(status_id) => {
                            model.order_status_id = Some(status_id);
                            *dirty = true;
                        }
                        None => {
                            warn!("Ignoring status update action with a malformed parameter");
                        }
                    }
                }
                other => {
                    debug!(field = %other, "Skipping unknown automation action");
                }
            },
            EntitySnapshot::MoneyTransaction(_) => {
                debug!(field = %action.field, "Ledger rows take no automation actions");
            }
        }
    }

    /// Writes accumulated changes back. Ledger rows are append-only and
    /// never saved from here, whatever the actions tried.
    async fn persist(self, db: &DbPool) -> Result<(), ServiceError> {
        match self {
            EntitySnapshot::Order { model, dirty } => {
                if !dirty {
                    return Ok(());
                }

                let order_id = model.id;
                let order_status_id = model.order_status_id;

                let mut active: order::ActiveModel = model.into();
                active.order_status_id = Set(order_status_id);

                active.update(db).await.map_err(|e| {
                    error!(error = %e, order_id = %order_id, "Failed to persist automation changes");
                    ServiceError::DatabaseError(e.into())
                })?;

                Ok(())
            }
            EntitySnapshot::MoneyTransaction(_) => Ok(()),
        }
    }
}

fn uuid_value(id: Uuid) -> Value {
    Value::String(id.to_string())
}

fn order_field(model: &order::Model, name: &str) -> Option<Value> {
    match name {
        "warehouse" => Some(uuid_value(model.warehouse_id)),
        "delivery-service" => model.delivery_service_id.map(uuid_value),
        "order-source" => model.order_source_id.map(uuid_value),
        "order-status" => model.order_status_id.map(uuid_value),
        "client" => model.client_id.map(uuid_value),
        "comment" => model.comment.clone().map(Value::String),
        "payment-status" => Some(Value::String(model.payment_status.to_value())),
        "payment-ids" => Some(Value::Array(
            model.payment_id_list().into_iter().map(uuid_value).collect(),
        )),
        "removed" => Some(Value::Bool(model.removed)),
        "created-by" => Some(uuid_value(model.created_by)),
        _ => None,
    }
}

fn transaction_field(model: &money_transaction::Model, name: &str) -> Option<Value> {
    match name {
        "type" => Some(Value::String(model.transaction_type.to_value())),
        "direction" => Some(Value::String(model.direction.to_value())),
        "cashregister" => Some(uuid_value(model.cashregister_id)),
        "account" => Some(uuid_value(model.account_id)),
        "currency" => Some(uuid_value(model.currency_id)),
        "amount" => Some(Value::String(model.amount.to_string())),
        "source-model" => Some(Value::String(model.source_model.to_value())),
        "source-id" => model.source_id.map(uuid_value),
        "confirmed" => Some(Value::Bool(model.confirmed)),
        "description" => model.description.clone().map(Value::String),
        _ => None,
    }
}

/// Evaluates one condition against the snapshot. A field this version does
/// not know, an unset field, or an unknown operator all fail closed.
fn evaluate_condition(snapshot: &EntitySnapshot, condition: &Condition) -> bool {
    let value = match snapshot.field(&condition.field) {
        Some(value) => value,
        None => return false,
    };

    match condition.operator.as_str() {
        OP_EQUALS => condition
            .params
            .first()
            .map(|expected| values_equal(&value, expected))
            .unwrap_or(false),
        OP_NOT_EQUAL => condition
            .params
            .first()
            .map(|expected| !values_equal(&value, expected))
            .unwrap_or(false),
        OP_CONTAINS => condition
            .params
            .first()
            .map(|needle| contains_value(&value, needle))
            .unwrap_or(false),
        OP_NOT_CONTAINS => condition
            .params
            .first()
            .map(|needle| !contains_value(&value, needle))
            .unwrap_or(false),
        OP_IN => condition
            .params
            .iter()
            .any(|candidate| values_equal(&value, candidate)),
        other => {
            debug!(operator = %other, "Unknown condition operator never matches");
            false
        }
    }
}

/// Array membership, with an equality fallback for scalar fields.
fn contains_value(haystack: &Value, needle: &Value) -> bool {
    match haystack {
        Value::Array(items) => items.iter().any(|item| values_equal(item, needle)),
        scalar => values_equal(scalar, needle),
    }
}

/// Loose scalar comparison for rule parameters. Numeric-looking values
/// compare through Decimal so a rule may store `100` or `"100"`; anything
/// else requires matching types.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Null, Value::Null) => true,
        (Value::Number(_), Value::Number(_))
        | (Value::Number(_), Value::String(_))
        | (Value::String(_), Value::Number(_)) => match (as_decimal(a), as_decimal(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
        _ => false,
    }
}

fn as_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => Decimal::from_str(s).ok(),
        _ => None,
    }
}

/// Evaluates stored rules against the entity a domain event points at and
/// applies the actions of every rule whose conditions all pass.
#[derive(Clone)]
pub struct AutomationEngine {
    db_pool: Arc<DbPool>,
    event_sender: Option<EventSender>,
}

impl AutomationEngine {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Runs every active rule bound to the trigger against the entity.
    /// Order rules may rewrite the order row; rules on ledger rows only
    /// ever observe them. Changes are persisted once, after all rules ran.
    #[instrument(skip(self), fields(trigger = ?trigger_type, entity_id = %entity_id))]
    pub async fn run(
        &self,
        trigger_type: TriggerType,
        entity_id: Uuid,
    ) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let automations = Automation::find()
            .filter(automation::Column::TriggerType.eq(trigger_type))
            .filter(automation::Column::Active.eq(true))
            .filter(automation::Column::Removed.eq(false))
            .order_by_asc(automation::Column::CreatedAt)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to load automations");
                ServiceError::DatabaseError(e.into())
            })?;

        let mut snapshot = EntitySnapshot::load(db, trigger_type, entity_id).await?;

        for rule in &automations {
            if !self.conditions_pass(rule, &snapshot) {
                debug!(automation_id = %rule.id, "Automation conditions did not match");
                continue;
            }

            self.apply_actions(rule, &mut snapshot);

            info!(automation_id = %rule.id, name = %rule.name, "Automation applied");

            if let Some(event_sender) = &self.event_sender {
                if let Err(e) = event_sender
                    .send(Event::AutomationApplied {
                        automation_id: rule.id,
                        entity_id,
                    })
                    .await
                {
                    warn!(error = %e, automation_id = %rule.id, "Failed to send automation applied event");
                }
            }
        }

        snapshot.persist(db).await
    }

    fn conditions_pass(&self, rule: &automation::Model, snapshot: &EntitySnapshot) -> bool {
        let conditions: Vec<Condition> = match serde_json::from_value(rule.conditions.clone()) {
            Ok(conditions) => conditions,
            Err(e) => {
                warn!(automation_id = %rule.id, error = %e, "Skipping automation with malformed conditions");
                return false;
            }
        };

        conditions
            .iter()
            .all(|condition| evaluate_condition(snapshot, condition))
    }

    fn apply_actions(&self, rule: &automation::Model, snapshot: &mut EntitySnapshot) {
        let actions: Vec<Action> = match serde_json::from_value(rule.actions.clone()) {
            Ok(actions) => actions,
            Err(e) => {
                warn!(automation_id = %rule.id, error = %e, "Skipping automation with malformed actions");
                return;
            }
        };

        for action in &actions {
            snapshot.apply_action(action);
        }
    }
}
