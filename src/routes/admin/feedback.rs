use axum::{
    extract::{Path, State},
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::StaffUser;
use crate::db::feedback::FeedbackRepository;
use crate::domain::status::FeedbackStatus;
use crate::error::Result;
use crate::models::Feedback;
use crate::routes::clean;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/feedback", get(list_feedback))
        .route("/feedback/:id", patch(update_feedback))
}

#[derive(Debug, Deserialize)]
pub struct FeedbackUpdateRequest {
    pub status: Option<String>,
    pub admin_response: Option<String>,
}

async fn list_feedback(State(s): State<AppState>, _staff: StaffUser) -> Result<Json<Vec<Feedback>>> {
    Ok(Json(FeedbackRepository::new(&s.db).list().await?))
}

async fn update_feedback(
    State(s): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<Uuid>,
    Json(r): Json<FeedbackUpdateRequest>,
) -> Result<Json<Feedback>> {
    let status = clean(r.status).map(|s| s.parse::<FeedbackStatus>()).transpose()?;
    let response = clean(r.admin_response);
    Ok(Json(FeedbackRepository::new(&s.db).update(id, status, response.as_deref()).await?))
}
