use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use super::ListFilter;
use crate::auth::StaffUser;
use crate::db::orders::{OrderRepository, OrderUpdate};
use crate::domain::events::DomainEvent;
use crate::domain::status::{OrderStatus, PaymentStatus};
use crate::error::Result;
use crate::models::{Order, OrderDetail};
use crate::routes::clean;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/:id", get(get_order).patch(update_order))
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderUpdateRequest {
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub notes: Option<String>,
}

impl OrderUpdateRequest {
    /// Unknown status values are a 400.
    fn parse(self) -> Result<OrderUpdate> {
        Ok(OrderUpdate {
            status: clean(self.status).map(|s| s.parse::<OrderStatus>()).transpose()?,
            payment_status: clean(self.payment_status).map(|s| s.parse::<PaymentStatus>()).transpose()?,
            notes: self.notes.map(|n| n.trim().to_string()),
        })
    }
}

async fn list_orders(
    State(s): State<AppState>,
    _staff: StaffUser,
    Query(filter): Query<ListFilter>,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(OrderRepository::new(&s.db).list(filter.selected(), filter.search()).await?))
}

async fn get_order(State(s): State<AppState>, _staff: StaffUser, Path(id): Path<Uuid>) -> Result<Json<OrderDetail>> {
    Ok(Json(OrderRepository::new(&s.db).get(id).await?))
}

async fn update_order(
    State(s): State<AppState>,
    StaffUser(staff): StaffUser,
    Path(id): Path<Uuid>,
    Json(r): Json<OrderUpdateRequest>,
) -> Result<Json<OrderDetail>> {
    let update = r.parse()?;
    let detail = OrderRepository::new(&s.db).update(id, &update).await?;
    if let Some(status) = update.status {
        tracing::info!(
            order_id = %id,
            status = %status,
            closed = status.is_terminal(),
            by = %staff.user_id,
            "Order status changed"
        );
        s.events.publish(DomainEvent::OrderStatusChanged {
            order_id: id,
            order_number: detail.order.order_number.clone(),
            status: status.as_str().to_string(),
        });
    }
    Ok(Json(detail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_parse_known_values() {
        let update = OrderUpdateRequest {
            status: Some("shipped".into()),
            payment_status: Some("paid".into()),
            notes: Some(" left at the door ".into()),
        }
        .parse()
        .unwrap();
        assert_eq!(update.status, Some(OrderStatus::Shipped));
        assert_eq!(update.payment_status, Some(PaymentStatus::Paid));
        assert_eq!(update.notes.as_deref(), Some("left at the door"));
    }

    #[test]
    fn test_parse_blank_leaves_fields_untouched() {
        let update = OrderUpdateRequest { status: Some("  ".into()), ..Default::default() }.parse().unwrap();
        assert!(update.status.is_none());
        assert!(update.payment_status.is_none());
    }

    #[test]
    fn test_parse_unknown_status_is_bad_request() {
        let err = OrderUpdateRequest { status: Some("teleported".into()), ..Default::default() }
            .parse()
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
