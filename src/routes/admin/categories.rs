use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use uuid::Uuid;

use crate::auth::{AdminUser, StaffUser};
use crate::db::categories::CategoryRepository;
use crate::domain::aggregates::{CategoryDraft, CategoryInput};
use crate::error::Result;
use crate::models::Category;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/:id", put(update_category).delete(delete_category))
}

async fn list_categories(State(s): State<AppState>, _staff: StaffUser) -> Result<Json<Vec<Category>>> {
    Ok(Json(CategoryRepository::new(&s.db).list_all().await?))
}

async fn create_category(
    State(s): State<AppState>,
    _staff: StaffUser,
    Json(r): Json<CategoryInput>,
) -> Result<(StatusCode, Json<Category>)> {
    let draft = CategoryDraft::validate(r, None)?;
    Ok((StatusCode::CREATED, Json(CategoryRepository::new(&s.db).create(&draft).await?)))
}

async fn update_category(
    State(s): State<AppState>,
    _staff: StaffUser,
    Path(id): Path<Uuid>,
    Json(r): Json<CategoryInput>,
) -> Result<Json<Category>> {
    let draft = CategoryDraft::validate(r, Some(id))?;
    Ok(Json(CategoryRepository::new(&s.db).update(id, &draft).await?))
}

async fn delete_category(State(s): State<AppState>, _admin: AdminUser, Path(id): Path<Uuid>) -> Result<StatusCode> {
    CategoryRepository::new(&s.db).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
