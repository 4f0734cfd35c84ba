//! Workshop queue: counter intake, triage and status updates.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::ListFilter;
use crate::auth::StaffUser;
use crate::db::repairs::{RepairRepository, RepairUpdate};
use crate::domain::events::DomainEvent;
use crate::domain::status::RepairStatus;
use crate::error::{AppError, Result};
use crate::models::{Repair, RepairDetail};
use crate::routes::clean;
use crate::routes::repairs::{register, RepairCreated, RepairRequest};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/repairs", get(list_repairs).post(create_repair))
        .route("/repairs/:id", get(get_repair).patch(update_repair))
}

#[derive(Debug, Default, Deserialize)]
pub struct RepairUpdateRequest {
    pub status: Option<String>,
    pub technician_notes: Option<String>,
    pub estimated_cost: Option<Decimal>,
    pub final_cost: Option<Decimal>,
    pub estimated_completion: Option<DateTime<Utc>>,
    pub assigned_to: Option<Uuid>,
}

impl RepairUpdateRequest {
    fn parse(self) -> Result<RepairUpdate> {
        for (field, cost) in [("estimated_cost", self.estimated_cost), ("final_cost", self.final_cost)] {
            if cost.is_some_and(|c| c.is_sign_negative()) {
                return Err(AppError::Validation(format!("{field} must not be negative")));
            }
        }
        Ok(RepairUpdate {
            status: clean(self.status).map(|s| s.parse::<RepairStatus>()).transpose()?,
            technician_notes: self.technician_notes.map(|n| n.trim().to_string()),
            estimated_cost: self.estimated_cost,
            final_cost: self.final_cost,
            estimated_completion: self.estimated_completion,
            assigned_to: self.assigned_to,
        })
    }
}

async fn list_repairs(
    State(s): State<AppState>,
    _staff: StaffUser,
    Query(filter): Query<ListFilter>,
) -> Result<Json<Vec<Repair>>> {
    Ok(Json(RepairRepository::new(&s.db).list(filter.selected(), filter.search()).await?))
}

async fn get_repair(State(s): State<AppState>, _staff: StaffUser, Path(id): Path<Uuid>) -> Result<Json<RepairDetail>> {
    Ok(Json(RepairRepository::new(&s.db).get(id).await?.into()))
}

/// Counter intake for walk-in customers; staff may quote a cost up front.
async fn create_repair(
    State(s): State<AppState>,
    _staff: StaffUser,
    Json(mut r): Json<RepairRequest>,
) -> Result<(StatusCode, Json<RepairCreated>)> {
    r.customer_email = clean(r.customer_email);
    r.validate()?;
    if r.estimated_cost.is_some_and(|c| c.is_sign_negative()) {
        return Err(AppError::Validation("estimated_cost must not be negative".into()));
    }
    let created = register(&s, r.into_new_repair(None)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_repair(
    State(s): State<AppState>,
    StaffUser(staff): StaffUser,
    Path(id): Path<Uuid>,
    Json(r): Json<RepairUpdateRequest>,
) -> Result<Json<RepairDetail>> {
    let update = r.parse()?;
    let repair = RepairRepository::new(&s.db).update(id, &update).await?;
    if let Some(status) = update.status {
        tracing::info!(
            repair_id = %id,
            status = %status,
            closed = status.is_terminal(),
            by = %staff.user_id,
            "Repair status changed"
        );
        s.events.publish(DomainEvent::RepairStatusChanged {
            repair_id: id,
            repair_number: repair.repair_number.clone(),
            status: status.as_str().to_string(),
        });
    }
    Ok(Json(repair.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_and_notes() {
        let update = RepairUpdateRequest {
            status: Some("repairing".into()),
            technician_notes: Some(" écran commandé ".into()),
            final_cost: Some(Decimal::new(120_000, 3)),
            ..Default::default()
        }
        .parse()
        .unwrap();
        assert_eq!(update.status, Some(RepairStatus::Repairing));
        assert_eq!(update.technician_notes.as_deref(), Some("écran commandé"));
        assert_eq!(update.final_cost, Some(Decimal::new(120_000, 3)));
    }

    #[test]
    fn test_parse_rejects_unknown_status() {
        let err = RepairUpdateRequest { status: Some("lost".into()), ..Default::default() }.parse().unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_parse_rejects_negative_cost() {
        let err = RepairUpdateRequest { estimated_cost: Some(Decimal::new(-1, 0)), ..Default::default() }.parse().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
