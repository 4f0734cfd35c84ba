//! Back-office headline figures.

use chrono::{DateTime, Datelike, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use super::RepositoryError;
use crate::domain::stock::DEFAULT_STOCK_THRESHOLD;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DashboardStats {
    pub today_orders_count: i64,
    pub month_orders_count: i64,
    pub pending_orders_count: i64,
    pub active_repairs_count: i64,
    pub low_stock_count: i64,
    pub month_revenue: Decimal,
    pub total_products: i64,
    pub total_orders: i64,
}

/// Start of the current day and of the current month, in UTC.
pub fn period_starts(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let today = now.date_naive();
    let month = today.with_day(1).unwrap_or(today);
    (
        Utc.from_utc_datetime(&today.and_time(NaiveTime::MIN)),
        Utc.from_utc_datetime(&month.and_time(NaiveTime::MIN)),
    )
}

pub struct DashboardRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DashboardRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self { Self { pool } }

    /// Revenue sums every order placed this month, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stats(&self, now: DateTime<Utc>) -> Result<DashboardStats, RepositoryError> {
        let (today, month) = period_starts(now);
        let stats = sqlx::query_as::<_, DashboardStats>(
            r"
            SELECT
                (SELECT COUNT(*) FROM orders WHERE created_at >= $1) AS today_orders_count,
                (SELECT COUNT(*) FROM orders WHERE created_at >= $2) AS month_orders_count,
                (SELECT COUNT(*) FROM orders WHERE status = 'pending') AS pending_orders_count,
                (SELECT COUNT(*) FROM repairs WHERE status NOT IN ('delivered', 'cancelled')) AS active_repairs_count,
                (SELECT COUNT(*) FROM products
                    WHERE stock_quantity <= COALESCE(NULLIF(stock_threshold, 0), $3)) AS low_stock_count,
                (SELECT COALESCE(SUM(total), 0) FROM orders WHERE created_at >= $2) AS month_revenue,
                (SELECT COUNT(*) FROM products) AS total_products,
                (SELECT COUNT(*) FROM orders) AS total_orders
            ",
        )
        .bind(today)
        .bind(month)
        .bind(DEFAULT_STOCK_THRESHOLD)
        .fetch_one(self.pool)
        .await?;
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::db::fixtures::{create_test_product, create_test_user, place_test_order};
    use crate::db::repairs::{NewRepair, RepairRepository, RepairUpdate};
    use crate::domain::status::{RepairStatus, Role};

    #[test]
    fn test_period_starts_are_utc_midnights() {
        let now = Utc.with_ymd_and_hms(2025, 3, 17, 23, 45, 10).unwrap();
        let (today, month) = period_starts(now);
        assert_eq!(today, Utc.with_ymd_and_hms(2025, 3, 17, 0, 0, 0).unwrap());
        assert_eq!(month, Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_first_of_month_is_both_boundaries() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 1).unwrap();
        let (today, month) = period_starts(now);
        assert_eq!(today, month);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_stats_count_current_activity(pool: PgPool) {
        let user = create_test_user(&pool, "client@fgs.tn", Role::Customer).await;
        let case = create_test_product(&pool, "Coque silicone", 25, 50).await;
        let glass = create_test_product(&pool, "Verre trempé", 10, 3).await;
        sqlx::query("UPDATE products SET stock_threshold = 0 WHERE id = $1").bind(glass.id).execute(&pool).await.unwrap();
        let order = place_test_order(&pool, user.id, case.id, 2).await;

        let repairs = RepairRepository::new(&pool);
        let intake = NewRepair {
            customer_name: "Amira Trabelsi".into(),
            customer_phone: "54 080 419".into(),
            device_type: "tablette".into(),
            problem_description: "Ne charge plus".into(),
            ..Default::default()
        };
        repairs.create(&intake).await.unwrap();
        let done = repairs.create(&intake).await.unwrap();
        let delivered = RepairUpdate { status: Some(RepairStatus::Delivered), ..Default::default() };
        repairs.update(done.id, &delivered).await.unwrap();

        let stats = DashboardRepository::new(&pool).stats(Utc::now()).await.unwrap();
        assert_eq!(stats.today_orders_count, 1);
        assert_eq!(stats.month_orders_count, 1);
        assert_eq!(stats.pending_orders_count, 1);
        assert_eq!(stats.active_repairs_count, 1);
        assert_eq!(stats.low_stock_count, 1);
        assert_eq!(stats.month_revenue, order.order.total);
        assert_eq!(stats.total_products, 2);
        assert_eq!(stats.total_orders, 1);

        let next_month = DashboardRepository::new(&pool).stats(Utc::now() + Duration::days(40)).await.unwrap();
        assert_eq!(next_month.today_orders_count, 0);
        assert_eq!(next_month.month_orders_count, 0);
        assert_eq!(next_month.month_revenue, Decimal::ZERO);
        assert_eq!(next_month.total_orders, 1);
    }
}
