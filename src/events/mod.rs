use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
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

    /// Sends an event, logging instead of failing when the processor is gone.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!(error = %e, "Dropping domain event");
        }
    }
}

/// Domain events emitted after a mutation commits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    CompanyCreated(Uuid),
    CompanyUpdated(Uuid),
    CompanyDeleted(Uuid),

    ContactCreated { contact_id: Uuid, company_id: Uuid },

    ProductCreated(Uuid),
    ProductUpdated(Uuid),

    QuotationCreated(Uuid),
    QuotationUpdated(Uuid),
    QuotationDeleted(Uuid),
    QuotationTotalRecalculated {
        quotation_id: Uuid,
        total_amount: Decimal,
    },
    QuotationConverted {
        quotation_id: Uuid,
        order_id: Uuid,
    },

    OrderCreated(Uuid),
    OrderUpdated(Uuid),
    OrderDeleted(Uuid),
    OrderTotalRecalculated {
        order_id: Uuid,
        total_amount: Decimal,
    },

    ExhibitionCreated(Uuid),
    ExhibitionCostRecorded {
        exhibition_id: Uuid,
        cost_id: Uuid,
    },

    TaskCreated(Uuid),
    TaskCompleted {
        task_id: Uuid,
        completed_at: DateTime<Utc>,
    },

    DocumentUploaded {
        document_id: Uuid,
        size_bytes: i64,
    },
    DocumentDeleted(Uuid),

    SettingChanged(String),
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::CompanyCreated(_) => "company_created",
            Event::CompanyUpdated(_) => "company_updated",
            Event::CompanyDeleted(_) => "company_deleted",
            Event::ContactCreated { .. } => "contact_created",
            Event::ProductCreated(_) => "product_created",
            Event::ProductUpdated(_) => "product_updated",
            Event::QuotationCreated(_) => "quotation_created",
            Event::QuotationUpdated(_) => "quotation_updated",
            Event::QuotationDeleted(_) => "quotation_deleted",
            Event::QuotationTotalRecalculated { .. } => "quotation_total_recalculated",
            Event::QuotationConverted { .. } => "quotation_converted",
            Event::OrderCreated(_) => "order_created",
            Event::OrderUpdated(_) => "order_updated",
            Event::OrderDeleted(_) => "order_deleted",
            Event::OrderTotalRecalculated { .. } => "order_total_recalculated",
            Event::ExhibitionCreated(_) => "exhibition_created",
            Event::ExhibitionCostRecorded { .. } => "exhibition_cost_recorded",
            Event::TaskCreated(_) => "task_created",
            Event::TaskCompleted { .. } => "task_completed",
            Event::DocumentUploaded { .. } => "document_uploaded",
            Event::DocumentDeleted(_) => "document_deleted",
            Event::SettingChanged(_) => "setting_changed",
        }
    }
}

/// Drains the event channel, writing each event to the audit log.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        let payload = serde_json::to_string(&event).unwrap_or_else(|_| format!("{:?}", event));
        info!(target: "crm_api::audit", event = event.name(), payload = %payload, "Domain event");
        metrics::counter!("crm_events.processed", 1, "event" => event.name());
    }

    info!("Event channel closed; stopping event processing loop");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sender_delivers_to_receiver() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        let id = Uuid::new_v4();

        sender.send(Event::CompanyCreated(id)).await.unwrap();
        assert_eq!(rx.recv().await, Some(Event::CompanyCreated(id)));
    }

    #[tokio::test]
    async fn send_fails_once_processor_is_gone() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        assert!(sender.send(Event::DocumentDeleted(Uuid::new_v4())).await.is_err());
        // must not panic
        sender.send_or_log(Event::SettingChanged("k".into())).await;
    }

    #[tokio::test]
    async fn processor_stops_when_channel_closes() {
        let (tx, rx) = mpsc::channel(4);
        let handle = tokio::spawn(process_events(rx));
        tx.send(Event::TaskCreated(Uuid::new_v4())).await.unwrap();
        drop(tx);
        handle.await.unwrap();
    }
}
