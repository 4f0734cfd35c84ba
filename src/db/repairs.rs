//! Repair tickets.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use super::{like_pattern, next_reference, non_blank, reference_violation, RepositoryError, MAX_REFERENCE_ATTEMPTS};
use crate::domain::reference::ReferenceKind;
use crate::domain::status::RepairStatus;
use crate::domain::value_objects::phone_digits;
use crate::models::Repair;

#[derive(Debug, Clone, Default)]
pub struct NewRepair {
    pub user_id: Option<Uuid>,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub device_type: String,
    pub device_brand: Option<String>,
    pub device_model: Option<String>,
    pub problem_description: String,
    pub estimated_cost: Option<Decimal>,
}

/// Workshop edit; `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct RepairUpdate {
    pub status: Option<RepairStatus>,
    pub technician_notes: Option<String>,
    pub estimated_cost: Option<Decimal>,
    pub final_cost: Option<Decimal>,
    pub estimated_completion: Option<DateTime<Utc>>,
    pub assigned_to: Option<Uuid>,
}

pub struct RepairRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RepairRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self { Self { pool } }

    /// Register a device; the ticket starts as `received`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if no free repair number was found.
    #[instrument(skip(self, repair), fields(device_type = %repair.device_type))]
    pub async fn create(&self, repair: &NewRepair) -> Result<Repair, RepositoryError> {
        for _ in 0..MAX_REFERENCE_ATTEMPTS {
            let number = next_reference(ReferenceKind::Repair);
            let created = sqlx::query_as::<_, Repair>(
                r"
                INSERT INTO repairs (id, repair_number, user_id, customer_name, customer_phone, customer_email,
                    device_type, device_brand, device_model, problem_description, status, estimated_cost)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                ON CONFLICT (repair_number) DO NOTHING
                RETURNING *
                ",
            )
            .bind(Uuid::now_v7())
            .bind(&number)
            .bind(repair.user_id)
            .bind(&repair.customer_name)
            .bind(&repair.customer_phone)
            .bind(&repair.customer_email)
            .bind(&repair.device_type)
            .bind(&repair.device_brand)
            .bind(&repair.device_model)
            .bind(&repair.problem_description)
            .bind(RepairStatus::Received.as_str())
            .bind(repair.estimated_cost)
            .fetch_optional(self.pool)
            .await?;
            if let Some(created) = created {
                tracing::info!(repair_number = %created.repair_number, "Repair registered");
                return Ok(created);
            }
            tracing::warn!(repair_number = %number, "Repair number collision, retrying");
        }
        Err(RepositoryError::Conflict("could not allocate a repair number".into()))
    }

    /// Public lookup. A phone that does not match reports the ticket as missing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for an unknown number or wrong phone.
    pub async fn track(&self, repair_number: &str, phone: &str) -> Result<Repair, RepositoryError> {
        let repair = sqlx::query_as::<_, Repair>("SELECT * FROM repairs WHERE repair_number = $1")
            .bind(repair_number.trim().to_uppercase())
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        let given = phone_digits(phone);
        if given.is_empty() || given != phone_digits(&repair.customer_phone) {
            return Err(RepositoryError::NotFound);
        }
        Ok(repair)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Repair>, RepositoryError> {
        let repairs = sqlx::query_as::<_, Repair>("SELECT * FROM repairs WHERE user_id = $1 ORDER BY created_at DESC")
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;
        Ok(repairs)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` unless the ticket belongs to `user_id`.
    pub async fn get_for_user(&self, user_id: Uuid, id: Uuid) -> Result<Repair, RepositoryError> {
        sqlx::query_as::<_, Repair>("SELECT * FROM repairs WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// `search` matches the repair number, customer, phone or device.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn list(&self, status: Option<&str>, search: Option<&str>) -> Result<Vec<Repair>, RepositoryError> {
        let repairs = sqlx::query_as::<_, Repair>(
            r"
            SELECT * FROM repairs
            WHERE ($1::TEXT IS NULL OR status = $1)
              AND ($2::TEXT IS NULL
                   OR repair_number ILIKE $2 OR customer_name ILIKE $2 OR customer_phone ILIKE $2
                   OR device_brand ILIKE $2 OR device_model ILIKE $2)
            ORDER BY created_at DESC
            ",
        )
        .bind(status)
        .bind(non_blank(search).map(like_pattern))
        .fetch_all(self.pool)
        .await?;
        Ok(repairs)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the ticket does not exist.
    pub async fn get(&self, id: Uuid) -> Result<Repair, RepositoryError> {
        sqlx::query_as::<_, Repair>("SELECT * FROM repairs WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Moving a ticket to `delivered` stamps `completed_at` once.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the ticket does not exist,
    /// `RepositoryError::Conflict` if `assigned_to` is not a known user.
    #[instrument(skip(self))]
    pub async fn update(&self, id: Uuid, update: &RepairUpdate) -> Result<Repair, RepositoryError> {
        sqlx::query_as::<_, Repair>(
            r"
            UPDATE repairs SET
                status = COALESCE($2, status),
                technician_notes = COALESCE($3, technician_notes),
                estimated_cost = COALESCE($4, estimated_cost),
                final_cost = COALESCE($5, final_cost),
                estimated_completion = COALESCE($6, estimated_completion),
                assigned_to = COALESCE($7, assigned_to),
                completed_at = CASE
                    WHEN $2 = 'delivered' AND completed_at IS NULL THEN NOW()
                    ELSE completed_at
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(update.status.map(RepairStatus::as_str))
        .bind(&update.technician_notes)
        .bind(update.estimated_cost)
        .bind(update.final_cost)
        .bind(update.estimated_completion)
        .bind(update.assigned_to)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| reference_violation(e, "assigned technician"))?
        .ok_or(RepositoryError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen_repair() -> NewRepair {
        NewRepair {
            customer_name: "Amira Trabelsi".into(),
            customer_phone: "54 080 419".into(),
            device_type: "smartphone".into(),
            device_brand: Some("Samsung".into()),
            device_model: Some("Galaxy A52".into()),
            problem_description: "Écran fissuré".into(),
            ..Default::default()
        }
    }

    fn to_status(status: RepairStatus) -> RepairUpdate {
        RepairUpdate { status: Some(status), ..Default::default() }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_completed_at_is_stamped_once(pool: PgPool) {
        let repairs = RepairRepository::new(&pool);
        let repair = repairs.create(&screen_repair()).await.unwrap();
        assert_eq!(repair.status, "received");

        let ready = repairs.update(repair.id, &to_status(RepairStatus::Ready)).await.unwrap();
        assert!(ready.completed_at.is_none());

        let delivered = repairs.update(repair.id, &to_status(RepairStatus::Delivered)).await.unwrap();
        let stamped = delivered.completed_at.unwrap();

        let again = repairs.update(repair.id, &to_status(RepairStatus::Delivered)).await.unwrap();
        assert_eq!(again.completed_at, Some(stamped));
        let noted = RepairUpdate { technician_notes: Some("Client prévenu".into()), ..Default::default() };
        assert_eq!(repairs.update(repair.id, &noted).await.unwrap().completed_at, Some(stamped));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_track_compares_phone_digits(pool: PgPool) {
        let repairs = RepairRepository::new(&pool);
        let repair = repairs.create(&screen_repair()).await.unwrap();
        let number = repair.repair_number.to_lowercase();

        let found = repairs.track(&number, "54080419").await.unwrap();
        assert_eq!(found.id, repair.id);
        assert!(repairs.track(&repair.repair_number, "54-080-419").await.is_ok());

        for phone in ["99 999 999", "", " - "] {
            let err = repairs.track(&repair.repair_number, phone).await.unwrap_err();
            assert!(matches!(err, RepositoryError::NotFound), "phone {phone:?}");
        }
        let err = repairs.track("REP-19990101-ZZZZ", "54080419").await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_list_filters_by_status_and_search(pool: PgPool) {
        let repairs = RepairRepository::new(&pool);
        let screen = repairs.create(&screen_repair()).await.unwrap();
        let battery = NewRepair {
            customer_name: "Youssef Gharbi".into(),
            customer_phone: "22 111 333".into(),
            device_brand: Some("Apple".into()),
            device_model: Some("iPhone 11".into()),
            problem_description: "Batterie gonflée".into(),
            ..screen_repair()
        };
        repairs.create(&battery).await.unwrap();
        repairs.update(screen.id, &to_status(RepairStatus::Repairing)).await.unwrap();

        assert_eq!(repairs.list(None, None).await.unwrap().len(), 2);
        let samsung = repairs.list(None, Some("samsung")).await.unwrap();
        assert_eq!(samsung.len(), 1);
        assert_eq!(samsung[0].id, screen.id);
        assert_eq!(repairs.list(None, Some("iphone")).await.unwrap().len(), 1);
        assert_eq!(repairs.list(None, Some(&screen.repair_number)).await.unwrap().len(), 1);
        assert_eq!(repairs.list(Some("received"), None).await.unwrap().len(), 1);
        assert!(repairs.list(Some("repairing"), Some("gharbi")).await.unwrap().is_empty());
    }
}
