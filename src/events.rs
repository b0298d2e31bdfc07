use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Domain events emitted by the services after their transactions commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Brand events
    BrandCreated { brand_id: i32, name: String },
    BrandDeleted { brand_id: i32 },

    // Location events
    LocationCreated { location_id: i32, name: String },
    LocationDeleted { location_id: i32 },

    // Inventory events
    InventoryCreated { item_code: String, quantity: i32 },
    InventoryUpdated { item_code: String, quantity: i32 },
    InventoryDeleted { item_code: String },
    StockDeducted {
        item_code: String,
        location_id: i32,
        quantity: i32,
    },
    StockRestored {
        item_code: String,
        location_id: i32,
        quantity: i32,
    },

    // Purchase order events
    PurchaseOrderCreated { item_code: String },
    PurchaseOrderDeleted { item_code: String },

    // Sales events
    TransactionCreated {
        transaction_id: i64,
        invoice_reference: String,
    },
    TransactionDeleted { transaction_id: i64 },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Creates a sender/receiver pair with the given channel capacity.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging (not propagating) a closed-channel failure.
    /// Event delivery must never fail a committed operation.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Event delivery failed: {}", e);
        }
    }
}

/// Consumes events from the channel until all senders are dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::InventoryCreated { item_code, quantity } => {
                info!(item_code = %item_code, quantity = quantity, "Inventory created");
            }
            Event::InventoryUpdated { item_code, quantity } => {
                info!(item_code = %item_code, quantity = quantity, "Inventory updated");
            }
            Event::InventoryDeleted { item_code } => {
                info!(item_code = %item_code, "Inventory deleted");
            }
            Event::StockDeducted {
                item_code,
                location_id,
                quantity,
            } => {
                info!(
                    item_code = %item_code,
                    location_id = location_id,
                    quantity = quantity,
                    "Stock deducted"
                );
            }
            Event::TransactionCreated {
                transaction_id,
                invoice_reference,
            } => {
                info!(
                    transaction_id = transaction_id,
                    invoice_reference = %invoice_reference,
                    "Transaction recorded"
                );
            }
            other => {
                info!("Received event: {:?}", other);
            }
        }
    }

    info!("Event processing loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_event() {
        let (sender, mut rx) = EventSender::channel(4);
        sender
            .send(Event::InventoryDeleted {
                item_code: "Bx0000".into(),
            })
            .await
            .unwrap();

        match rx.recv().await {
            Some(Event::InventoryDeleted { item_code }) => assert_eq!(item_code, "Bx0000"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_or_log_swallows_closed_channel() {
        let (sender, rx) = EventSender::channel(1);
        drop(rx);
        // must not panic or error out
        sender
            .send_or_log(Event::BrandDeleted { brand_id: 1 })
            .await;
    }
}
