//! Accounts and their profile rows.
//!
//! A user and its profile are always created together in one transaction.

use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use super::{unique_violation, RepositoryError};
use crate::domain::status::Role;
use crate::models::{AccountSummary, Profile, UserRecord};

/// Self-service profile fields; `None` leaves the column unchanged and an
/// empty string clears it.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub avatar_url: Option<String>,
}

pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self { Self { pool } }

    /// Create a user and its profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    #[instrument(skip(self, password_hash))]
    pub async fn create_account(
        &self,
        email: &str,
        password_hash: &str,
        full_name: Option<&str>,
        role: Role,
    ) -> Result<UserRecord, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let user = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (id, email, password_hash) VALUES ($1, $2, $3) RETURNING id, email, password_hash, created_at",
        )
        .bind(Uuid::now_v7()).bind(email).bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| unique_violation(e, "email"))?;
        sqlx::query("INSERT INTO profiles (id, user_id, full_name, role) VALUES ($1, $2, $3, $4)")
            .bind(Uuid::now_v7()).bind(user.id).bind(full_name).bind(role.as_str())
            .execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError> {
        let user = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, password_hash, created_at FROM users WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no profile.
    pub async fn get(&self, user_id: Uuid) -> Result<Profile, RepositoryError> {
        sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Updates contact fields only; the role is staff-managed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no profile.
    pub async fn update(&self, user_id: Uuid, update: &ProfileUpdate) -> Result<Profile, RepositoryError> {
        sqlx::query_as::<_, Profile>(
            r"
            UPDATE profiles SET
                full_name = CASE WHEN $2::TEXT IS NULL THEN full_name ELSE NULLIF($2, '') END,
                phone = CASE WHEN $3::TEXT IS NULL THEN phone ELSE NULLIF($3, '') END,
                address = CASE WHEN $4::TEXT IS NULL THEN address ELSE NULLIF($4, '') END,
                avatar_url = CASE WHEN $5::TEXT IS NULL THEN avatar_url ELSE NULLIF($5, '') END,
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING *
            ",
        )
        .bind(user_id)
        .bind(&update.full_name)
        .bind(&update.phone)
        .bind(&update.address)
        .bind(&update.avatar_url)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    #[instrument(skip(self, password_hash))]
    pub async fn set_password(&self, user_id: Uuid, password_hash: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(user_id).bind(password_hash)
            .execute(self.pool).await?;
        if result.rows_affected() == 0 { return Err(RepositoryError::NotFound); }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_accounts(&self) -> Result<Vec<AccountSummary>, RepositoryError> {
        let accounts = sqlx::query_as::<_, AccountSummary>(
            r"
            SELECT u.id AS user_id, u.email, p.full_name, p.phone, COALESCE(p.role, 'customer') AS role, u.created_at
            FROM users u
            LEFT JOIN profiles p ON p.user_id = u.id
            ORDER BY u.created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(accounts)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no profile.
    #[instrument(skip(self))]
    pub async fn set_role(&self, user_id: Uuid, role: Role) -> Result<Profile, RepositoryError> {
        sqlx::query_as::<_, Profile>("UPDATE profiles SET role = $2, updated_at = NOW() WHERE user_id = $1 RETURNING *")
            .bind(user_id)
            .bind(role.as_str())
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::create_test_user;

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_keeps_absent_and_clears_empty_fields(pool: PgPool) {
        let user = create_test_user(&pool, "client@fgs.tn", Role::Customer).await;
        let profiles = ProfileRepository::new(&pool);
        let filled = ProfileUpdate {
            phone: Some("54 080 419".into()),
            address: Some("Zaghouan".into()),
            ..Default::default()
        };
        profiles.update(user.id, &filled).await.unwrap();

        let cleared = ProfileUpdate { phone: Some(String::new()), ..Default::default() };
        let profile = profiles.update(user.id, &cleared).await.unwrap();
        assert_eq!(profile.phone, None);
        assert_eq!(profile.address.as_deref(), Some("Zaghouan"));
        assert_eq!(profile.full_name.as_deref(), Some("Amira Trabelsi"));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_duplicate_email_is_a_conflict(pool: PgPool) {
        create_test_user(&pool, "client@fgs.tn", Role::Customer).await;
        let err = ProfileRepository::new(&pool)
            .create_account("client@fgs.tn", "hash", None, Role::Customer)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }
}
