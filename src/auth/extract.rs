//! Request extractors resolving the bearer session.
//!
//! ```rust,ignore
//! async fn handler(CurrentUser(user): CurrentUser) -> impl IntoResponse { user.email }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use super::session::{bearer_token, hash_token};
use crate::db::sessions::SessionRepository;
use crate::domain::status::Role;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub full_name: Option<String>,
    pub token_hash: String,
}

async fn resolve(parts: &Parts, state: &AppState) -> Result<Option<SessionInfo>, AppError> {
    let Some(token) = bearer_token(&parts.headers)? else { return Ok(None) };
    let token_hash = hash_token(token);
    let user = SessionRepository::new(&state.db)
        .find_user(&token_hash)
        .await?
        .ok_or_else(|| AppError::Unauthorized("invalid or expired session".into()))?;
    Ok(Some(SessionInfo {
        user_id: user.user_id,
        email: user.email,
        role: user.role.parse().unwrap_or_default(),
        full_name: user.full_name,
        token_hash,
    }))
}

/// A signed-in user; 401 otherwise.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub SessionInfo);

/// Anonymous callers pass as `None`; a bad token is still rejected.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<SessionInfo>);

/// Employee or admin; 403 for customers.
#[derive(Debug, Clone)]
pub struct StaffUser(pub SessionInfo);

#[derive(Debug, Clone)]
pub struct AdminUser(pub SessionInfo);

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve(parts, state)
            .await?
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized("authentication required".into()))
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve(parts, state).await?))
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for StaffUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.role.is_staff() {
            return Err(AppError::Forbidden("staff access required".into()));
        }
        Ok(Self(user))
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if user.role != Role::Admin {
            return Err(AppError::Forbidden("admin access required".into()));
        }
        Ok(Self(user))
    }
}
