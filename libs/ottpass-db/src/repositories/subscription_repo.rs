use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::subscription::Subscription;

#[derive(Debug, Clone)]
pub struct SubscriptionRepository {
    pool: PgPool,
}

impl SubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        user_id: i64,
        plan_type: &str,
        platforms: &[String],
        amount_paid: i64,
        starts_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        payment_id: Option<i64>,
    ) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO subscriptions (user_id, plan_type, platforms, amount_paid, starts_at, expires_at, payment_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(plan_type)
        .bind(platforms)
        .bind(amount_paid)
        .bind(starts_at)
        .bind(expires_at)
        .bind(payment_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create subscription")?;

        Ok(id)
    }

    pub async fn get_all_by_user(&self, user_id: i64) -> Result<Vec<Subscription>> {
        sqlx::query_as::<_, Subscription>(
            "SELECT * FROM subscriptions WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch user subscriptions")
    }

    pub async fn has_active(&self, user_id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM subscriptions
                WHERE user_id = $1 AND is_active = TRUE AND expires_at > CURRENT_TIMESTAMP
            )
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to check active subscription")?;
        Ok(exists)
    }

    /// Reconcile the stored `is_active` flag with the wall clock. Returns
    /// the number of rows flipped.
    pub async fn deactivate_expired(&self) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE subscriptions SET is_active = FALSE WHERE is_active = TRUE AND expires_at <= CURRENT_TIMESTAMP",
        )
        .execute(&self.pool)
        .await
        .context("Failed to deactivate expired subscriptions")?;
        Ok(result.rows_affected())
    }
}
