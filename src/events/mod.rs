use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

// Define the various events that can occur in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Order events
    OrderCreated(Uuid),
    OrderUpdated(Uuid),
    OrderRemoved(Uuid),

    // Payment events
    PaymentRecorded {
        order_id: Uuid,
        payment_id: Uuid,
    },
    PaymentCancelled {
        order_id: Uuid,
        payment_id: Uuid,
    },

    // Money ledger events
    TransactionRecorded(Uuid),
    TransferRecorded {
        transfer_id: Uuid,
        from_leg_id: Uuid,
        to_leg_id: Uuid,
    },

    // Stock events
    StockAdjusted {
        product_id: Uuid,
        warehouse_id: Uuid,
        new_count: i64,
    },

    // Automation events
    AutomationApplied {
        automation_id: Uuid,
        entity_id: Uuid,
    },

    // Generic event for custom messages
    Generic {
        message: String,
        timestamp: DateTime<Utc>,
        metadata: serde_json::Value,
    },
}

impl Event {
    /// Create a generic event with string data
    pub fn with_data(data: String) -> Self {
        Event::Generic {
            message: data,
            timestamp: Utc::now(),
            metadata: serde_json::Value::Null,
        }
    }
}

// Function to process incoming events.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        info!("Received event: {:?}", event);

        match event {
            Event::OrderCreated(order_id) => {
                info!("Order created: {}", order_id);
            }
            Event::OrderRemoved(order_id) => {
                info!("Order removed: {}", order_id);
            }
            Event::StockAdjusted {
                product_id,
                warehouse_id,
                new_count,
            } => {
                if new_count < 0 {
                    // Oversell is allowed but worth flagging
                    warn!(
                        "Stock below zero: product {} in warehouse {} is at {}",
                        product_id, warehouse_id, new_count
                    );
                }
            }
            Event::TransferRecorded {
                transfer_id,
                from_leg_id,
                to_leg_id,
            } => {
                info!(
                    "Transfer {} recorded: legs {} -> {}",
                    transfer_id, from_leg_id, to_leg_id
                );
            }
            Event::AutomationApplied {
                automation_id,
                entity_id,
            } => {
                info!(
                    "Automation {} applied to entity {}",
                    automation_id, entity_id
                );
            }
            _ => {
                info!("No specific handler for event: {:?}", event);
            }
        }
    }

    warn!("Event processing loop has ended");
}
