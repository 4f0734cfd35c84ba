//! Fire-and-forget domain event publishing over NATS.

use bytes::Bytes;

use crate::domain::events::DomainEvent;

/// Publishes to NATS when a client is configured; otherwise drops events.
#[derive(Clone, Default)]
pub struct EventPublisher {
    nats: Option<async_nats::Client>,
}

impl EventPublisher {
    pub fn new(nats: Option<async_nats::Client>) -> Self { Self { nats } }

    pub fn is_enabled(&self) -> bool { self.nats.is_some() }

    /// Never blocks the caller; failures are logged.
    pub fn publish(&self, event: DomainEvent) {
        let Some(client) = self.nats.clone() else {
            tracing::debug!(subject = event.subject(), "Event publishing disabled");
            return;
        };
        let payload = match serde_json::to_vec(&event) {
            Ok(payload) => Bytes::from(payload),
            Err(e) => {
                tracing::warn!(error = %e, subject = event.subject(), "Failed to encode event");
                return;
            }
        };
        let subject = event.subject();
        tokio::spawn(async move {
            if let Err(e) = client.publish(subject.to_string(), payload).await {
                tracing::warn!(error = %e, subject, "Failed to publish event");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_disabled_publisher_drops_events() {
        let publisher = EventPublisher::default();
        assert!(!publisher.is_enabled());
        publisher.publish(DomainEvent::StockLow { product_id: Uuid::nil(), variant_id: None, remaining: 1, threshold: 5 });
    }
}
