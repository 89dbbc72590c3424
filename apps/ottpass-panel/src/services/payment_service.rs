use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use ottpass_db::models::payment::{Payment, PaymentStatus};
use ottpass_db::models::plan::PlanType;
use ottpass_db::repositories::{PaymentRepository, UserRepository};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::services::catalog_service::PlanOffer;
use crate::services::referral_service::ReferralService;

#[derive(Debug)]
pub enum DecideOutcome {
    Approved(Payment),
    Rejected(Payment),
    NotFound,
    /// The payment was already verified or rejected; nothing was mutated.
    AlreadyDecided,
}

#[derive(Clone)]
pub struct PaymentService {
    pool: PgPool,
    payments: PaymentRepository,
    users: UserRepository,
    referrals: ReferralService,
    upi_id: String,
}

impl PaymentService {
    pub fn new(
        pool: PgPool,
        payments: PaymentRepository,
        users: UserRepository,
        referrals: ReferralService,
        upi_id: String,
    ) -> Self {
        Self {
            pool,
            payments,
            users,
            referrals,
            upi_id,
        }
    }

    pub async fn create_for_offer(&self, user_id: i64, offer: &PlanOffer) -> Result<Payment> {
        let payment = self
            .payments
            .create(
                user_id,
                offer.price,
                &offer.code,
                &offer.platforms,
                &self.upi_id,
            )
            .await?;
        info!(
            "Created payment {} for user {} ({}, {} paise)",
            payment.payment_uuid, user_id, offer.code, offer.price
        );
        Ok(payment)
    }

    pub async fn get(&self, payment_uuid: Uuid) -> Result<Option<Payment>> {
        self.payments.get_by_uuid(payment_uuid).await
    }

    pub async fn attach_screenshot(
        &self,
        payment_uuid: Uuid,
        file_id: &str,
        file_url: Option<&str>,
    ) -> Result<bool> {
        self.payments
            .attach_screenshot(payment_uuid, file_id, file_url)
            .await
    }

    pub async fn list_by_status(
        &self,
        status: Option<PaymentStatus>,
        limit: i64,
    ) -> Result<Vec<Payment>> {
        self.payments.list_by_status(status, limit).await
    }

    pub async fn user_payments(&self, user_id: i64, limit: i64) -> Result<Vec<Payment>> {
        self.payments.list_by_user(user_id, limit).await
    }

    /// Resolve a pending payment. The status flip is a conditional update
    /// guarded on `status = 'pending'`, so of two concurrent decisions only
    /// one can land; the loser observes zero affected rows and backs off
    /// without touching the subscription set.
    pub async fn decide_payment(
        &self,
        payment_uuid: Uuid,
        admin_tg_id: i64,
        approved: bool,
        reason: Option<&str>,
    ) -> Result<DecideOutcome> {
        if approved {
            self.approve(payment_uuid, admin_tg_id).await
        } else {
            self.reject(payment_uuid, admin_tg_id, reason).await
        }
    }

    async fn approve(&self, payment_uuid: Uuid, admin_tg_id: i64) -> Result<DecideOutcome> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to open approval transaction")?;

        let flipped = sqlx::query_as::<_, (i64, i64, i64, String, Vec<String>)>(
            r#"
            UPDATE payments
            SET status = 'verified',
                verified_by = $2,
                verified_at = CURRENT_TIMESTAMP,
                updated_at = CURRENT_TIMESTAMP
            WHERE payment_uuid = $1 AND status = 'pending'
            RETURNING id, user_id, amount, plan_type, platforms
            "#,
        )
        .bind(payment_uuid)
        .bind(admin_tg_id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to verify payment")?;

        let Some((payment_id, user_id, amount, plan_type, platforms)) = flipped else {
            tx.rollback().await.ok();
            return self.undecidable(payment_uuid).await;
        };

        // Activation rides the same transaction as the status flip, so a
        // verified payment can never be left without its subscription.
        let starts_at = Utc::now();
        let plan = PlanType::parse(&plan_type).unwrap_or(PlanType::Monthly);
        let expires_at = starts_at + Duration::days(plan.duration_days());

        sqlx::query(
            r#"
            INSERT INTO subscriptions (user_id, plan_type, platforms, amount_paid, starts_at, expires_at, payment_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user_id)
        .bind(&plan_type)
        .bind(&platforms)
        .bind(amount)
        .bind(starts_at)
        .bind(expires_at)
        .bind(payment_id)
        .execute(&mut *tx)
        .await
        .context("Failed to activate subscription")?;

        sqlx::query(
            "UPDATE users SET total_spent = total_spent + $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2",
        )
        .bind(amount)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .context("Failed to bump user spend")?;

        tx.commit().await.context("Failed to commit approval")?;

        info!(
            "Payment {} approved by admin {}: {} until {}",
            payment_uuid, admin_tg_id, plan, expires_at
        );

        // The buyer is now an active user, which is what makes their
        // referral edge count. The approval already committed, so a failure
        // here is logged rather than surfaced.
        match self.users.get_by_id(user_id).await {
            Ok(Some(user)) => match self.referrals.validate_referral(user.tg_id).await {
                Ok(true) => info!("Referral validated for user {}", user.tg_id),
                Ok(false) => {}
                Err(e) => warn!("Referral validation failed for user {}: {:#}", user.tg_id, e),
            },
            Ok(None) => warn!("Payment {} belongs to missing user {}", payment_uuid, user_id),
            Err(e) => warn!("Referral validation skipped for user {}: {:#}", user_id, e),
        }

        let payment = self
            .payments
            .get_by_uuid(payment_uuid)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Payment {} vanished after approval", payment_uuid))?;

        Ok(DecideOutcome::Approved(payment))
    }

    async fn reject(
        &self,
        payment_uuid: Uuid,
        admin_tg_id: i64,
        reason: Option<&str>,
    ) -> Result<DecideOutcome> {
        let reason = reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or("Payment verification failed");

        let result = sqlx::query(
            r#"
            UPDATE payments
            SET status = 'rejected',
                verified_by = $2,
                verified_at = CURRENT_TIMESTAMP,
                rejection_reason = $3,
                updated_at = CURRENT_TIMESTAMP
            WHERE payment_uuid = $1 AND status = 'pending'
            "#,
        )
        .bind(payment_uuid)
        .bind(admin_tg_id)
        .bind(reason)
        .execute(&self.pool)
        .await
        .context("Failed to reject payment")?;

        if result.rows_affected() == 0 {
            return self.undecidable(payment_uuid).await;
        }

        info!("Payment {} rejected by admin {}: {}", payment_uuid, admin_tg_id, reason);

        let payment = self
            .payments
            .get_by_uuid(payment_uuid)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Payment {} vanished after rejection", payment_uuid))?;

        Ok(DecideOutcome::Rejected(payment))
    }

    /// Distinguish "never existed" from "already decided" for a conditional
    /// update that affected zero rows.
    async fn undecidable(&self, payment_uuid: Uuid) -> Result<DecideOutcome> {
        match self.payments.get_by_uuid(payment_uuid).await? {
            Some(_) => Ok(DecideOutcome::AlreadyDecided),
            None => Ok(DecideOutcome::NotFound),
        }
    }
}
