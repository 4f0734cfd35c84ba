//! Account administration. Admin only.

use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AdminUser;
use crate::db::profiles::ProfileRepository;
use crate::domain::status::Role;
use crate::error::{AppError, Result};
use crate::models::{AccountSummary, Profile};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:user_id/role", put(set_role))
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: String,
}

/// An admin may not demote themselves and lock the shop out of the back-office.
fn check_role_change(actor: Uuid, target: Uuid, role: Role) -> Result<()> {
    if actor == target && role != Role::Admin {
        return Err(AppError::BadRequest("admins cannot remove their own admin role".into()));
    }
    Ok(())
}

async fn list_users(State(s): State<AppState>, _admin: AdminUser) -> Result<Json<Vec<AccountSummary>>> {
    Ok(Json(ProfileRepository::new(&s.db).list_accounts().await?))
}

async fn set_role(
    State(s): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(user_id): Path<Uuid>,
    Json(r): Json<RoleRequest>,
) -> Result<Json<Profile>> {
    let role: Role = r.role.parse()?;
    check_role_change(admin.user_id, user_id, role)?;
    let profile = ProfileRepository::new(&s.db).set_role(user_id, role).await?;
    tracing::info!(user_id = %user_id, role = %role, by = %admin.user_id, "Role changed");
    Ok(Json(profile))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_demotion_rejected() {
        let me = Uuid::now_v7();
        assert!(matches!(check_role_change(me, me, Role::Employee), Err(AppError::BadRequest(_))));
        assert!(check_role_change(me, me, Role::Admin).is_ok());
    }

    #[test]
    fn test_other_accounts_can_change() {
        assert!(check_role_change(Uuid::now_v7(), Uuid::now_v7(), Role::Customer).is_ok());
    }
}
