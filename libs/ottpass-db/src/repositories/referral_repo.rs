use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::referral::{Referral, ReferralStats};

#[derive(Debug, Clone)]
pub struct ReferralRepository {
    pool: PgPool,
}

impl ReferralRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_stats(&self, tg_id: i64) -> Result<Option<ReferralStats>> {
        sqlx::query_as::<_, ReferralStats>("SELECT * FROM referral_stats WHERE tg_id = $1")
            .bind(tg_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch referral stats")
    }

    pub async fn find_stats_by_code(&self, code: &str) -> Result<Option<ReferralStats>> {
        sqlx::query_as::<_, ReferralStats>("SELECT * FROM referral_stats WHERE referral_code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch referral stats by code")
    }

    /// Insert a fresh stats row. Returns `None` when the generated code hit
    /// the unique index and the caller should retry with another one.
    pub async fn insert_stats(&self, tg_id: i64, code: &str) -> Result<Option<ReferralStats>> {
        let inserted = sqlx::query_as::<_, ReferralStats>(
            r#"
            INSERT INTO referral_stats (tg_id, referral_code)
            VALUES ($1, $2)
            ON CONFLICT (tg_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(tg_id)
        .bind(code)
        .fetch_optional(&self.pool)
        .await;

        match inserted {
            Ok(Some(stats)) => Ok(Some(stats)),
            // tg_id conflict: another caller created the row first.
            Ok(None) => self.get_stats(tg_id).await,
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Ok(None),
            Err(e) => Err(e).context("Failed to insert referral stats"),
        }
    }

    /// Record a referral edge. Returns false when the referred user already
    /// has one; the unique index makes the check race-safe.
    pub async fn insert_edge(
        &self,
        referrer_tg_id: i64,
        referred_tg_id: i64,
        referrer_username: Option<&str>,
        referred_username: Option<&str>,
    ) -> Result<bool> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO referrals (referrer_tg_id, referred_tg_id, referrer_username, referred_username)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(referrer_tg_id)
        .bind(referred_tg_id)
        .bind(referrer_username)
        .bind(referred_username)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => Ok(true),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Ok(false),
            Err(e) => Err(e).context("Failed to insert referral edge"),
        }
    }

    pub async fn list_by_referrer(&self, referrer_tg_id: i64, limit: i64) -> Result<Vec<Referral>> {
        sqlx::query_as::<_, Referral>(
            "SELECT * FROM referrals WHERE referrer_tg_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(referrer_tg_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list referrals")
    }

    /// Flip an edge to valid. Conditional on it still being unvalidated, so
    /// a second call is a no-op. Returns the referrer's tg_id on success.
    pub async fn mark_validated(&self, referred_tg_id: i64) -> Result<Option<i64>> {
        sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE referrals
            SET is_valid = TRUE, validated_at = CURRENT_TIMESTAMP
            WHERE referred_tg_id = $1 AND is_valid = FALSE
            RETURNING referrer_tg_id
            "#,
        )
        .bind(referred_tg_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to validate referral edge")
    }

    pub async fn bump_created(&self, referrer_tg_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE referral_stats
            SET total_referrals = total_referrals + 1,
                pending_referrals = pending_referrals + 1,
                updated_at = CURRENT_TIMESTAMP
            WHERE tg_id = $1
            "#,
        )
        .bind(referrer_tg_id)
        .execute(&self.pool)
        .await
        .context("Failed to bump referral counters")?;
        Ok(())
    }

    pub async fn bump_validated(&self, referrer_tg_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE referral_stats
            SET valid_referrals = valid_referrals + 1,
                pending_referrals = GREATEST(pending_referrals - 1, 0),
                updated_at = CURRENT_TIMESTAMP
            WHERE tg_id = $1
            "#,
        )
        .bind(referrer_tg_id)
        .execute(&self.pool)
        .await
        .context("Failed to bump validated referral counters")?;
        Ok(())
    }

    /// Consume one earned reward unit. The guard repeats the eligibility
    /// arithmetic inside the UPDATE, so two concurrent claims can never
    /// both succeed for a single pending unit.
    pub async fn claim_one(&self, tg_id: i64, threshold: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE referral_stats
            SET rewards_earned = rewards_earned + 1,
                updated_at = CURRENT_TIMESTAMP
            WHERE tg_id = $1 AND (valid_referrals / $2) - rewards_earned > 0
            "#,
        )
        .bind(tg_id)
        .bind(threshold)
        .execute(&self.pool)
        .await
        .context("Failed to claim referral reward")?;

        Ok(result.rows_affected() > 0)
    }
}
