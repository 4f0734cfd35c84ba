//! Self-service account pages. Every lookup is scoped to the session user.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::db::catalog::CatalogRepository;
use crate::db::favorites::FavoriteRepository;
use crate::db::orders::OrderRepository;
use crate::db::profiles::{ProfileRepository, ProfileUpdate};
use crate::db::repairs::RepairRepository;
use crate::error::Result;
use crate::models::{FavoriteProduct, Order, OrderDetail, Profile, RepairDetail};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/me/profile", get(get_profile).put(update_profile))
        .route("/me/orders", get(list_orders))
        .route("/me/orders/:id", get(get_order))
        .route("/me/repairs", get(list_repairs))
        .route("/me/repairs/:id", get(get_repair))
        .route("/me/favorites", get(list_favorites).post(add_favorite))
        .route("/me/favorites/:product_id", delete(remove_favorite))
}

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<ProfileRequest> for ProfileUpdate {
    /// Absent fields are kept; blank ones clear the stored value.
    fn from(r: ProfileRequest) -> Self {
        let trim = |v: Option<String>| v.map(|v| v.trim().to_string());
        Self {
            full_name: trim(r.full_name),
            phone: trim(r.phone),
            address: trim(r.address),
            avatar_url: trim(r.avatar_url),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FavoriteRequest {
    pub product_id: Uuid,
}

async fn get_profile(State(s): State<AppState>, CurrentUser(user): CurrentUser) -> Result<Json<Profile>> {
    Ok(Json(ProfileRepository::new(&s.db).get(user.user_id).await?))
}

async fn update_profile(
    State(s): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(r): Json<ProfileRequest>,
) -> Result<Json<Profile>> {
    Ok(Json(ProfileRepository::new(&s.db).update(user.user_id, &r.into()).await?))
}

async fn list_orders(State(s): State<AppState>, CurrentUser(user): CurrentUser) -> Result<Json<Vec<Order>>> {
    Ok(Json(OrderRepository::new(&s.db).list_for_user(user.user_id).await?))
}

async fn get_order(
    State(s): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderDetail>> {
    Ok(Json(OrderRepository::new(&s.db).get_for_user(user.user_id, id).await?))
}

async fn list_repairs(State(s): State<AppState>, CurrentUser(user): CurrentUser) -> Result<Json<Vec<RepairDetail>>> {
    let repairs = RepairRepository::new(&s.db).list_for_user(user.user_id).await?;
    Ok(Json(repairs.into_iter().map(RepairDetail::from).collect()))
}

async fn get_repair(
    State(s): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<RepairDetail>> {
    Ok(Json(RepairRepository::new(&s.db).get_for_user(user.user_id, id).await?.into()))
}

async fn list_favorites(State(s): State<AppState>, CurrentUser(user): CurrentUser) -> Result<Json<Vec<FavoriteProduct>>> {
    Ok(Json(FavoriteRepository::new(&s.db).list(user.user_id).await?))
}

/// Idempotent.
async fn add_favorite(
    State(s): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(r): Json<FavoriteRequest>,
) -> Result<StatusCode> {
    let product = CatalogRepository::new(&s.db).get(r.product_id).await?;
    FavoriteRepository::new(&s.db).add(user.user_id, product.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove_favorite(
    State(s): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(product_id): Path<Uuid>,
) -> Result<StatusCode> {
    FavoriteRepository::new(&s.db).remove(user.user_id, product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_fields_clear_and_absent_fields_keep() {
        let r: ProfileRequest = serde_json::from_value(serde_json::json!({
            "full_name": " Amina Ben Salah ",
            "phone": "",
            "address": "   "
        }))
        .unwrap();
        let update = ProfileUpdate::from(r);
        assert_eq!(update.full_name.as_deref(), Some("Amina Ben Salah"));
        assert_eq!(update.phone.as_deref(), Some(""));
        assert_eq!(update.address.as_deref(), Some(""));
        assert!(update.avatar_url.is_none());
    }
}
