use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::models::payment::{Payment, PaymentStatus};

#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_payment(row: &PgRow) -> Payment {
        let status_raw: String = row.try_get("status").unwrap_or_default();
        Payment {
            id: row.try_get::<i64, _>("id").unwrap_or_default(),
            payment_uuid: row
                .try_get::<Uuid, _>("payment_uuid")
                .unwrap_or_else(|_| Uuid::nil()),
            user_id: row.try_get::<i64, _>("user_id").unwrap_or_default(),
            amount: row.try_get::<i64, _>("amount").unwrap_or_default(),
            plan_type: row.try_get::<String, _>("plan_type").unwrap_or_default(),
            platforms: row
                .try_get::<Vec<String>, _>("platforms")
                .unwrap_or_default(),
            upi_id: row.try_get::<String, _>("upi_id").unwrap_or_default(),
            screenshot_file_id: row
                .try_get::<Option<String>, _>("screenshot_file_id")
                .ok()
                .flatten(),
            screenshot_url: row
                .try_get::<Option<String>, _>("screenshot_url")
                .ok()
                .flatten(),
            // The status column carries a CHECK constraint, so anything
            // unparseable here is a programming error, not user data.
            status: PaymentStatus::parse(&status_raw).unwrap_or(PaymentStatus::Pending),
            verified_by: row.try_get::<Option<i64>, _>("verified_by").ok().flatten(),
            verified_at: row
                .try_get::<Option<DateTime<Utc>>, _>("verified_at")
                .ok()
                .flatten(),
            rejection_reason: row
                .try_get::<Option<String>, _>("rejection_reason")
                .ok()
                .flatten(),
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .unwrap_or_else(|_| Utc::now()),
            updated_at: row
                .try_get::<DateTime<Utc>, _>("updated_at")
                .unwrap_or_else(|_| Utc::now()),
        }
    }

    pub async fn create(
        &self,
        user_id: i64,
        amount: i64,
        plan_type: &str,
        platforms: &[String],
        upi_id: &str,
    ) -> Result<Payment> {
        let row = sqlx::query(
            r#"
            INSERT INTO payments (payment_uuid, user_id, amount, plan_type, platforms, upi_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(amount)
        .bind(plan_type)
        .bind(platforms)
        .bind(upi_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create payment")?;

        Ok(Self::row_to_payment(&row))
    }

    pub async fn get_by_uuid(&self, payment_uuid: Uuid) -> Result<Option<Payment>> {
        let row = sqlx::query("SELECT * FROM payments WHERE payment_uuid = $1")
            .bind(payment_uuid)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch payment by UUID")?;
        Ok(row.map(|r| Self::row_to_payment(&r)))
    }

    /// Attach the user-submitted proof screenshot. Returns false when the
    /// payment no longer exists; the caller surfaces that to the user.
    pub async fn attach_screenshot(
        &self,
        payment_uuid: Uuid,
        file_id: &str,
        file_url: Option<&str>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET screenshot_file_id = $2, screenshot_url = $3, updated_at = CURRENT_TIMESTAMP
            WHERE payment_uuid = $1
            "#,
        )
        .bind(payment_uuid)
        .bind(file_id)
        .bind(file_url)
        .execute(&self.pool)
        .await
        .context("Failed to attach payment screenshot")?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_by_status(
        &self,
        status: Option<PaymentStatus>,
        limit: i64,
    ) -> Result<Vec<Payment>> {
        let rows = match status {
            Some(status) => {
                sqlx::query(
                    "SELECT * FROM payments WHERE status = $1 ORDER BY created_at DESC LIMIT $2",
                )
                .bind(status.as_str())
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query("SELECT * FROM payments ORDER BY created_at DESC LIMIT $1")
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .context("Failed to list payments")?;

        Ok(rows.iter().map(Self::row_to_payment).collect())
    }

    pub async fn list_by_user(&self, user_id: i64, limit: i64) -> Result<Vec<Payment>> {
        let rows = sqlx::query(
            "SELECT * FROM payments WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list user payments")?;

        Ok(rows.iter().map(Self::row_to_payment).collect())
    }
}
