//! Public repair intake and tracking.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{clean, not_blank};
use crate::auth::MaybeUser;
use crate::db::repairs::{NewRepair, RepairRepository};
use crate::domain::events::DomainEvent;
use crate::error::Result;
use crate::models::{RepairDetail, RepairTracking};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/repairs", post(create_repair))
        .route("/repairs/track/:repair_number", get(track_repair))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RepairRequest {
    #[validate(custom = "not_blank")]
    pub customer_name: String,
    #[validate(custom = "not_blank")]
    pub customer_phone: String,
    #[validate(email(message = "must be a valid email"))]
    pub customer_email: Option<String>,
    #[validate(custom = "not_blank")]
    pub device_type: String,
    pub device_brand: Option<String>,
    pub device_model: Option<String>,
    #[validate(custom = "not_blank")]
    pub problem_description: String,
    /// Only honoured for staff intake.
    #[serde(default)]
    pub estimated_cost: Option<Decimal>,
}

impl RepairRequest {
    pub(crate) fn into_new_repair(self, user_id: Option<Uuid>) -> NewRepair {
        NewRepair {
            user_id,
            customer_name: self.customer_name.trim().to_string(),
            customer_phone: self.customer_phone.trim().to_string(),
            customer_email: clean(self.customer_email),
            device_type: self.device_type.trim().to_string(),
            device_brand: clean(self.device_brand),
            device_model: clean(self.device_model),
            problem_description: self.problem_description.trim().to_string(),
            estimated_cost: self.estimated_cost,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RepairCreated {
    pub repair_number: String,
    pub repair: RepairDetail,
}

#[derive(Debug, Deserialize)]
pub struct TrackQuery {
    #[serde(default)]
    pub phone: String,
}

/// Register a repair and notify the workshop.
pub(crate) async fn register(s: &AppState, new: NewRepair) -> Result<RepairCreated> {
    let repair = RepairRepository::new(&s.db).create(&new).await?;
    s.events.publish(DomainEvent::RepairReceived {
        repair_id: repair.id,
        repair_number: repair.repair_number.clone(),
        device_type: repair.device_type.clone(),
    });
    Ok(RepairCreated { repair_number: repair.repair_number.clone(), repair: repair.into() })
}

async fn create_repair(
    State(s): State<AppState>,
    MaybeUser(user): MaybeUser,
    Json(mut r): Json<RepairRequest>,
) -> Result<(StatusCode, Json<RepairCreated>)> {
    r.customer_email = clean(r.customer_email);
    r.validate()?;
    r.estimated_cost = None;
    let created = register(&s, r.into_new_repair(user.map(|u| u.user_id))).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// The phone number must match the ticket; a mismatch is a 404.
async fn track_repair(
    State(s): State<AppState>,
    Path(repair_number): Path<String>,
    Query(q): Query<TrackQuery>,
) -> Result<Json<RepairTracking>> {
    let repair = RepairRepository::new(&s.db).track(&repair_number, &q.phone).await?;
    Ok(Json(repair.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RepairRequest {
        serde_json::from_value(serde_json::json!({
            "customer_name": " Amina ",
            "customer_phone": "54 080 419",
            "customer_email": "",
            "device_type": "Smartphone",
            "device_brand": "Samsung",
            "problem_description": "Écran cassé"
        }))
        .unwrap()
    }

    #[test]
    fn test_blank_required_fields_fail_validation() {
        let mut r = request();
        r.problem_description = "   ".into();
        let errors = r.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("problem_description"));
    }

    #[test]
    fn test_into_new_repair_trims_and_drops_blanks() {
        let new = request().into_new_repair(None);
        assert_eq!(new.customer_name, "Amina");
        assert_eq!(new.customer_email, None);
        assert_eq!(new.device_model, None);
        assert_eq!(new.device_brand.as_deref(), Some("Samsung"));
    }
}
