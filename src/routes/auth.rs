//! Sign-up, sign-in and session management.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::clean;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::session::{generate_token, hash_token};
use crate::auth::CurrentUser;
use crate::db::profiles::ProfileRepository;
use crate::db::sessions::SessionRepository;
use crate::db::RepositoryError;
use crate::domain::status::Role;
use crate::error::{AppError, Result};
use crate::models::Profile;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/signin", post(signin))
        .route("/auth/signout", post(signout))
        .route("/auth/me", get(me))
        .route("/auth/password", put(change_password))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email(message = "must be a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PasswordChange {
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub full_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserSummary,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub profile: Profile,
}

fn normalize_email(email: &str) -> String { email.trim().to_lowercase() }

async fn open_session(state: &AppState, user: UserSummary) -> Result<SessionResponse> {
    let token = generate_token();
    let expires_at = Utc::now() + state.config.session_ttl;
    SessionRepository::new(&state.db).create(user.id, &hash_token(&token), expires_at).await?;
    Ok(SessionResponse { token, expires_at, user })
}

async fn signup(State(s): State<AppState>, Json(r): Json<SignupRequest>) -> Result<(StatusCode, Json<SessionResponse>)> {
    r.validate()?;
    let email = normalize_email(&r.email);
    let full_name = clean(r.full_name);
    let password_hash = hash_password(&r.password)?;
    let user = ProfileRepository::new(&s.db)
        .create_account(&email, &password_hash, full_name.as_deref(), Role::Customer)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => AppError::Conflict("an account with this email already exists".into()),
            other => other.into(),
        })?;
    tracing::info!(user_id = %user.id, "Account created");
    let session = open_session(&s, UserSummary { id: user.id, email: user.email, role: Role::Customer, full_name }).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

async fn signin(State(s): State<AppState>, Json(r): Json<SigninRequest>) -> Result<Json<SessionResponse>> {
    let invalid = || AppError::Unauthorized("invalid email or password".into());
    let profiles = ProfileRepository::new(&s.db);
    let user = profiles.find_by_email(&normalize_email(&r.email)).await?.ok_or_else(invalid)?;
    if !verify_password(&r.password, &user.password_hash)? {
        return Err(invalid());
    }
    let profile = profiles.get(user.id).await?;
    let summary = UserSummary {
        id: user.id,
        email: user.email,
        role: profile.role.parse().unwrap_or_default(),
        full_name: profile.full_name,
    };
    Ok(Json(open_session(&s, summary).await?))
}

async fn signout(State(s): State<AppState>, CurrentUser(user): CurrentUser) -> Result<StatusCode> {
    SessionRepository::new(&s.db).delete(&user.token_hash).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn me(State(s): State<AppState>, CurrentUser(user): CurrentUser) -> Result<Json<MeResponse>> {
    let profile = ProfileRepository::new(&s.db).get(user.user_id).await?;
    Ok(Json(MeResponse { id: user.user_id, email: user.email, role: user.role, profile }))
}

/// Other sessions of the user are signed out.
async fn change_password(
    State(s): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(r): Json<PasswordChange>,
) -> Result<StatusCode> {
    r.validate()?;
    let password_hash = hash_password(&r.new_password)?;
    ProfileRepository::new(&s.db).set_password(user.user_id, &password_hash).await?;
    let revoked = SessionRepository::new(&s.db).delete_others(user.user_id, &user.token_hash).await?;
    tracing::info!(user_id = %user.user_id, revoked, "Password changed");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_validation() {
        let ok = SignupRequest { email: "amina@example.tn".into(), password: "123456".into(), full_name: None };
        assert!(ok.validate().is_ok());

        let short = SignupRequest { email: "amina@example.tn".into(), password: "12345".into(), full_name: None };
        let err = AppError::from(short.validate().unwrap_err());
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.to_string().contains("password"));

        let bad_email = SignupRequest { email: "not-an-email".into(), password: "123456".into(), full_name: None };
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn test_email_is_normalized() {
        assert_eq!(normalize_email("  Admin@Gmail.com "), "admin@gmail.com");
    }
}
