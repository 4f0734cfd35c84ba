use sqlx::PgPool;
use uuid::Uuid;

use super::RepositoryError;
use crate::domain::status::FeedbackStatus;
use crate::models::Feedback;

#[derive(Debug, Clone, Default)]
pub struct NewFeedback {
    pub user_id: Option<Uuid>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub subject: String,
    pub message: String,
}

pub struct FeedbackRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FeedbackRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self { Self { pool } }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, feedback: &NewFeedback) -> Result<Feedback, RepositoryError> {
        let created = sqlx::query_as::<_, Feedback>(
            r"
            INSERT INTO feedback (id, user_id, customer_name, customer_email, subject, message, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            ",
        )
        .bind(Uuid::now_v7())
        .bind(feedback.user_id)
        .bind(&feedback.customer_name)
        .bind(&feedback.customer_email)
        .bind(&feedback.subject)
        .bind(&feedback.message)
        .bind(FeedbackStatus::New.as_str())
        .fetch_one(self.pool)
        .await?;
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Feedback>, RepositoryError> {
        let feedback = sqlx::query_as::<_, Feedback>("SELECT * FROM feedback ORDER BY created_at DESC")
            .fetch_all(self.pool)
            .await?;
        Ok(feedback)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the message does not exist.
    pub async fn update(
        &self,
        id: Uuid,
        status: Option<FeedbackStatus>,
        admin_response: Option<&str>,
    ) -> Result<Feedback, RepositoryError> {
        sqlx::query_as::<_, Feedback>(
            r"
            UPDATE feedback SET
                status = COALESCE($2, status),
                admin_response = COALESCE($3, admin_response),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(status.map(FeedbackStatus::as_str))
        .bind(admin_response)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}
