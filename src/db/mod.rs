//! Database access for the store `PostgreSQL`.
//!
//! ## Tables
//!
//! - `users`, `sessions`, `profiles` - accounts, sign-in sessions, roles
//! - `categories`, `products`, `product_variants` - catalog
//! - `cart_items` - pending selections per user
//! - `orders`, `order_items` - checkout snapshots
//! - `repairs` - device repair tickets
//! - `favorites`, `reviews`, `feedback`, `stock_movements` - auxiliary records
//!
//! Migrations live in `migrations/` and run on startup.
//!
//! Self-service queries always filter on the caller's `user_id`; the service
//! has no database-side row-level security to fall back on.

pub mod cart;
pub mod catalog;
pub mod categories;
pub mod dashboard;
pub mod favorites;
pub mod feedback;
pub mod orders;
pub mod profiles;
pub mod repairs;
pub mod reviews;
pub mod sessions;
pub mod stock;

use std::time::Duration;

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;

use crate::domain::reference::{self, ReferenceKind};

/// Attempts at a fresh order or repair number before giving up.
pub const MAX_REFERENCE_ATTEMPTS: usize = 5;

/// A reference number for today (UTC).
pub(crate) fn next_reference(kind: ReferenceKind) -> String {
    reference::generate(kind, Utc::now().date_naive(), &mut rand::thread_rng())
}

/// Escape `%`, `_` and `\` so user input matches literally inside `ILIKE`.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') { escaped.push('\\'); }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> { value.map(str::trim).filter(|v| !v.is_empty()) }

/// Create a `PostgreSQL` connection pool.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("not found")]
    NotFound,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("insufficient stock for {0}")]
    InsufficientStock(String),
}

/// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
pub(crate) fn unique_violation(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(format!("{what} already exists"));
        }
    }
    RepositoryError::Database(err)
}

/// Foreign-key violations mean the caller referenced a row that is gone.
pub(crate) fn reference_violation(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_foreign_key_violation() {
            return RepositoryError::Conflict(format!("{what} is referenced by or references a missing record"));
        }
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(format!("{what} already exists"));
        }
    }
    RepositoryError::Database(err)
}

#[cfg(test)]
pub(crate) mod fixtures;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("coque"), "%coque%");
        assert_eq!(like_pattern("100%_x"), "%100\\%\\_x%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  CMD ")), Some("CMD"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }
}
