//! HTTP routes.
//!
//! Everything but `/health` lives under `/api/v1`; back-office routes under
//! `/api/v1/admin`.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod chat;
pub mod checkout;
pub mod feedback;
pub mod health;
pub mod profile;
pub mod repairs;

use axum::{routing::get, Router};
use validator::ValidationError;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    let api = Router::new()
        .merge(auth::routes())
        .merge(catalog::routes())
        .merge(cart::routes())
        .merge(checkout::routes())
        .merge(repairs::routes())
        .merge(feedback::routes())
        .merge(profile::routes())
        .merge(chat::routes())
        .nest("/admin", admin::routes());

    Router::new().route("/health", get(health::health)).nest("/api/v1", api)
}

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("is required".into());
        return Err(err);
    }
    Ok(())
}

/// Trim, and treat blank as absent.
pub(crate) fn clean(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_blank() {
        assert!(not_blank("Samsung").is_ok());
        assert!(not_blank("   ").is_err());
        assert!(not_blank("").is_err());
    }

    #[test]
    fn test_clean() {
        assert_eq!(clean(Some("  Zaghouan ".into())).as_deref(), Some("Zaghouan"));
        assert_eq!(clean(Some("  ".into())), None);
        assert_eq!(clean(None), None);
    }
}
