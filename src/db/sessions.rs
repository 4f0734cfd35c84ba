//! Sign-in sessions keyed by the SHA-256 of the bearer token.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use super::RepositoryError;
use crate::models::SessionUser;

pub struct SessionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SessionRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self { Self { pool } }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, token_hash))]
    pub async fn create(&self, user_id: Uuid, token_hash: &str, expires_at: DateTime<Utc>) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO sessions (token_hash, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(token_hash).bind(user_id).bind(expires_at)
            .execute(self.pool).await?;
        Ok(())
    }

    /// Resolve an unexpired session to its user and role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_user(&self, token_hash: &str) -> Result<Option<SessionUser>, RepositoryError> {
        let user = sqlx::query_as::<_, SessionUser>(
            r"
            SELECT u.id AS user_id, u.email, COALESCE(p.role, 'customer') AS role, p.full_name
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            LEFT JOIN profiles p ON p.user_id = u.id
            WHERE s.token_hash = $1 AND s.expires_at > NOW()
            ",
        )
        .bind(token_hash)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, token_hash: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = $1").bind(token_hash).execute(self.pool).await?;
        Ok(())
    }

    /// Drop every other session of a user, e.g. after a password change.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_others(&self, user_id: Uuid, keep_token_hash: &str) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1 AND token_hash <> $2")
            .bind(user_id).bind(keep_token_hash)
            .execute(self.pool).await?;
        Ok(result.rows_affected())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn purge_expired(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()").execute(self.pool).await?;
        Ok(result.rows_affected())
    }
}
