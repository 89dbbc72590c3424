use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use ottpass_db::models::referral::{Referral, ReferralStats};
use ottpass_db::repositories::{ReferralRepository, SubscriptionRepository, UserRepository};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

const CODE_RETRIES: usize = 5;
const REWARD_PLAN: &str = "referral reward";

/// Reward arithmetic for one user, derived entirely from the stats row.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RewardStatus {
    pub valid_referrals: i64,
    pub required_count: i64,
    pub eligible_rewards: i64,
    pub pending_rewards: i64,
    pub rewards_earned: i64,
    pub progress: i64,
    pub next_reward_at: i64,
}

pub(crate) fn reward_status(valid: i64, earned: i64, threshold: i64) -> RewardStatus {
    let eligible = valid / threshold;
    RewardStatus {
        valid_referrals: valid,
        required_count: threshold,
        eligible_rewards: eligible,
        pending_rewards: (eligible - earned).max(0),
        rewards_earned: earned,
        progress: valid % threshold,
        next_reward_at: threshold - (valid % threshold),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReferralOverview {
    pub referral_code: String,
    pub total_referrals: i64,
    pub valid_referrals: i64,
    pub pending_referrals: i64,
    pub rewards: RewardStatus,
}

#[derive(Clone)]
pub struct ReferralService {
    referrals: ReferralRepository,
    subscriptions: SubscriptionRepository,
    users: UserRepository,
    threshold: i64,
    reward_days: i64,
}

impl ReferralService {
    pub fn new(
        referrals: ReferralRepository,
        subscriptions: SubscriptionRepository,
        users: UserRepository,
        threshold: i64,
        reward_days: i64,
    ) -> Self {
        Self {
            referrals,
            subscriptions,
            users,
            threshold,
            reward_days,
        }
    }

    fn generate_code(tg_id: i64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(tg_id.to_le_bytes());
        hasher.update(Uuid::new_v4().as_bytes());
        let digest = hex::encode(hasher.finalize());
        format!("REF{}", digest[..8].to_uppercase())
    }

    /// Fetch a user's stats row, creating it with a fresh code on first
    /// touch. Code collisions hit the unique index and retry with a new
    /// code rather than silently reusing someone else's.
    pub async fn get_or_create_stats(&self, tg_id: i64) -> Result<ReferralStats> {
        if let Some(stats) = self.referrals.get_stats(tg_id).await? {
            return Ok(stats);
        }

        for _ in 0..CODE_RETRIES {
            let code = Self::generate_code(tg_id);
            match self.referrals.insert_stats(tg_id, &code).await? {
                Some(stats) => return Ok(stats),
                None => {
                    warn!("Referral code collision for user {}, regenerating", tg_id);
                }
            }
        }

        Err(anyhow::anyhow!(
            "Could not allocate a unique referral code for user {}",
            tg_id
        ))
    }

    /// Record that `referred` joined through `referrer`'s link. Rejects
    /// self-referrals and users who were already referred by anyone.
    pub async fn add_referral(
        &self,
        referrer_tg_id: i64,
        referred_tg_id: i64,
        referrer_username: Option<&str>,
        referred_username: Option<&str>,
    ) -> Result<bool> {
        if referrer_tg_id == referred_tg_id {
            warn!("User {} tried to refer themselves", referrer_tg_id);
            return Ok(false);
        }

        // Make sure the counters row exists before the atomic bump below.
        self.get_or_create_stats(referrer_tg_id).await?;

        let inserted = self
            .referrals
            .insert_edge(
                referrer_tg_id,
                referred_tg_id,
                referrer_username,
                referred_username,
            )
            .await?;

        if !inserted {
            warn!("User {} was already referred", referred_tg_id);
            return Ok(false);
        }

        self.referrals.bump_created(referrer_tg_id).await?;
        info!("Referral added: {} -> {}", referrer_tg_id, referred_tg_id);
        Ok(true)
    }

    /// Flip the referred user's edge to valid and move the referrer's
    /// counters. Idempotent: an already-valid edge (or no edge) is false.
    pub async fn validate_referral(&self, referred_tg_id: i64) -> Result<bool> {
        let Some(referrer_tg_id) = self.referrals.mark_validated(referred_tg_id).await? else {
            return Ok(false);
        };

        self.referrals.bump_validated(referrer_tg_id).await?;
        info!(
            "Referral validated: {} -> {}",
            referrer_tg_id, referred_tg_id
        );
        Ok(true)
    }

    pub async fn check_rewards(&self, tg_id: i64) -> Result<RewardStatus> {
        let stats = self.get_or_create_stats(tg_id).await?;
        Ok(reward_status(
            stats.valid_referrals,
            stats.rewards_earned,
            self.threshold,
        ))
    }

    pub async fn overview(&self, tg_id: i64) -> Result<ReferralOverview> {
        let stats = self.get_or_create_stats(tg_id).await?;
        let rewards = reward_status(stats.valid_referrals, stats.rewards_earned, self.threshold);
        Ok(ReferralOverview {
            referral_code: stats.referral_code,
            total_referrals: stats.total_referrals,
            valid_referrals: stats.valid_referrals,
            pending_referrals: stats.pending_referrals,
            rewards,
        })
    }

    /// Claim one pending reward unit and grant the premium window it pays
    /// for. One unit per call; a user with several pending units claims
    /// repeatedly.
    pub async fn claim_reward(&self, tg_id: i64) -> Result<bool> {
        if !self.referrals.claim_one(tg_id, self.threshold).await? {
            return Ok(false);
        }

        match self.users.get_by_tg_id(tg_id).await? {
            Some(user) => {
                let starts_at = Utc::now();
                let expires_at = starts_at + Duration::days(self.reward_days);
                self.subscriptions
                    .create(user.id, REWARD_PLAN, &[], 0, starts_at, expires_at, None)
                    .await
                    .context("Failed to grant reward subscription")?;
                info!(
                    "Referral reward claimed by user {}: {} premium days",
                    tg_id, self.reward_days
                );
            }
            None => {
                warn!(
                    "Reward claimed by user {} with no user record; no premium granted",
                    tg_id
                );
            }
        }

        Ok(true)
    }

    pub async fn resolve_code(&self, code: &str) -> Result<Option<i64>> {
        Ok(self
            .referrals
            .find_stats_by_code(code.trim())
            .await?
            .map(|s| s.tg_id))
    }

    pub async fn referral_list(&self, tg_id: i64, limit: i64) -> Result<Vec<Referral>> {
        self.referrals.list_by_referrer(tg_id, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_is_never_negative() {
        for (valid, earned) in [(0, 0), (5, 0), (19, 0), (40, 3), (100, 99)] {
            let status = reward_status(valid, earned, 20);
            assert!(status.pending_rewards >= 0, "valid={valid} earned={earned}");
            assert_eq!(
                status.pending_rewards,
                (valid / 20 - earned).max(0),
                "valid={valid} earned={earned}"
            );
        }
    }

    #[test]
    fn twentieth_valid_referral_unlocks_a_reward() {
        let before = reward_status(19, 0, 20);
        assert_eq!(before.eligible_rewards, 0);
        assert_eq!(before.pending_rewards, 0);
        assert_eq!(before.next_reward_at, 1);

        let after = reward_status(20, 0, 20);
        assert_eq!(after.eligible_rewards, 1);
        assert_eq!(after.pending_rewards, 1);
        assert_eq!(after.progress, 0);

        let claimed = reward_status(20, 1, 20);
        assert_eq!(claimed.pending_rewards, 0);
    }

    #[test]
    fn over_claimed_stats_clamp_to_zero() {
        let status = reward_status(20, 3, 20);
        assert_eq!(status.eligible_rewards, 1);
        assert_eq!(status.pending_rewards, 0);
        assert_eq!(status.rewards_earned, 3);
    }

    #[test]
    fn generated_codes_carry_the_prefix() {
        let code = ReferralService::generate_code(42);
        assert!(code.starts_with("REF"));
        assert_eq!(code.len(), 11);
        assert!(code[3..].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }
}
