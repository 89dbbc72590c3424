use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub tg_id: i64,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub is_admin: bool,
    pub total_spent: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlanOffer {
    pub code: String,
    pub name: String,
    /// Paise.
    pub price: i64,
    pub platforms: Vec<String>,
    pub duration_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Subscription {
    pub id: i64,
    pub plan_type: String,
    pub platforms: Vec<String>,
    pub amount_paid: i64,
    pub starts_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
}

impl Subscription {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active && now < self.expires_at
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RewardStatus {
    pub valid_referrals: i64,
    pub required_count: i64,
    pub eligible_rewards: i64,
    pub pending_rewards: i64,
    pub rewards_earned: i64,
    pub progress: i64,
    pub next_reward_at: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReferralOverview {
    pub referral_code: String,
    pub total_referrals: i64,
    pub valid_referrals: i64,
    pub pending_referrals: i64,
    pub rewards: RewardStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReferralEntry {
    pub referred_username: Option<String>,
    pub is_valid: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuotaInfo {
    pub has_quota: bool,
    pub daily_limit: i32,
    pub used_today: i32,
    pub remaining: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpsertUserResponse {
    pub user: User,
    pub referral_recorded: bool,
}
