use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::status::{repair_status_label, RepairStatus};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Repair {
    pub id: Uuid,
    pub repair_number: String,
    pub user_id: Option<Uuid>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub device_type: String,
    pub device_brand: Option<String>,
    pub device_model: Option<String>,
    pub problem_description: String,
    pub status: String,
    pub technician_notes: Option<String>,
    pub estimated_cost: Option<Decimal>,
    pub final_cost: Option<Decimal>,
    pub estimated_completion: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RepairDetail {
    #[serde(flatten)]
    pub repair: Repair,
    pub status_label: String,
    pub suggested_next_status: Option<RepairStatus>,
}

impl From<Repair> for RepairDetail {
    fn from(repair: Repair) -> Self {
        let status_label = repair_status_label(&repair.status).to_string();
        let suggested_next_status = repair.status.parse::<RepairStatus>().ok().and_then(RepairStatus::suggested_next);
        Self { repair, status_label, suggested_next_status }
    }
}

/// Public tracking view: no contact details, no technician notes.
#[derive(Debug, Clone, Serialize)]
pub struct RepairTracking {
    pub repair_number: String,
    pub device_type: String,
    pub device_brand: Option<String>,
    pub device_model: Option<String>,
    pub status: String,
    pub status_label: String,
    pub estimated_cost: Option<Decimal>,
    pub estimated_completion: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Repair> for RepairTracking {
    fn from(r: Repair) -> Self {
        Self {
            status_label: repair_status_label(&r.status).to_string(),
            repair_number: r.repair_number,
            device_type: r.device_type,
            device_brand: r.device_brand,
            device_model: r.device_model,
            status: r.status,
            estimated_cost: r.estimated_cost,
            estimated_completion: r.estimated_completion,
            completed_at: r.completed_at,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repair(status: &str) -> Repair {
        let now = Utc::now();
        Repair {
            id: Uuid::now_v7(),
            repair_number: "REP-20260101-ABCD".into(),
            user_id: None,
            customer_name: "Amira".into(),
            customer_phone: "54 080 419".into(),
            customer_email: None,
            device_type: "smartphone".into(),
            device_brand: Some("Samsung".into()),
            device_model: Some("A54".into()),
            problem_description: "Écran cassé".into(),
            status: status.into(),
            technician_notes: None,
            estimated_cost: None,
            final_cost: None,
            estimated_completion: None,
            completed_at: None,
            assigned_to: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_detail_carries_label_and_next_step() {
        let detail = RepairDetail::from(repair("ready"));
        assert_eq!(detail.status_label, "Prêt");
        assert_eq!(detail.suggested_next_status, Some(RepairStatus::Delivered));

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["repair_number"], "REP-20260101-ABCD");
        assert_eq!(json["suggested_next_status"], "delivered");
    }

    #[test]
    fn test_detail_of_closed_repair_has_no_next_step() {
        let detail = RepairDetail::from(repair("delivered"));
        assert_eq!(detail.status_label, "Livré");
        assert_eq!(detail.suggested_next_status, None);
        assert_eq!(RepairDetail::from(repair("waiting_parts")).status_label, "waiting_parts");
    }
}
