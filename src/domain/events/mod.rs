//! Domain events
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    OrderPlaced { order_id: Uuid, order_number: String, user_id: Option<Uuid>, total: Decimal },
    OrderStatusChanged { order_id: Uuid, order_number: String, status: String },
    RepairReceived { repair_id: Uuid, repair_number: String, device_type: String },
    RepairStatusChanged { repair_id: Uuid, repair_number: String, status: String },
    StockLow { product_id: Uuid, variant_id: Option<Uuid>, remaining: i32, threshold: i32 },
}

impl DomainEvent {
    pub fn subject(&self) -> &'static str {
        match self {
            Self::OrderPlaced { .. } => "store.order.placed",
            Self::OrderStatusChanged { .. } => "store.order.status_changed",
            Self::RepairReceived { .. } => "store.repair.received",
            Self::RepairStatusChanged { .. } => "store.repair.status_changed",
            Self::StockLow { .. } => "store.stock.low",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_payload_is_tagged() {
        let event = DomainEvent::RepairReceived {
            repair_id: Uuid::nil(),
            repair_number: "REP-20250123-0001".into(),
            device_type: "Smartphone".into(),
        };
        assert_eq!(event.subject(), "store.repair.received");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "repair_received");
        assert_eq!(json["repair_number"], "REP-20250123-0001");
    }
}
