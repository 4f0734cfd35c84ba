use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;

use crate::auth::StaffUser;
use crate::db::dashboard::{DashboardRepository, DashboardStats};
use crate::error::Result;
use crate::state::AppState;

pub fn routes() -> Router<AppState> { Router::new().route("/dashboard", get(stats)) }

async fn stats(State(s): State<AppState>, _staff: StaffUser) -> Result<Json<DashboardStats>> {
    Ok(Json(DashboardRepository::new(&s.db).stats(Utc::now()).await?))
}
