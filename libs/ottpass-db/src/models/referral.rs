use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Edge between a referrer and the user they brought in.
///
/// An edge starts unvalidated and flips to valid exactly once, when the
/// referred user's first payment is verified. The unique index on
/// `referred_tg_id` guarantees a user can be referred at most once.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Referral {
    pub id: i64,
    pub referrer_tg_id: i64,
    pub referred_tg_id: i64,
    pub referrer_username: Option<String>,
    pub referred_username: Option<String>,
    pub is_valid: bool,
    pub validated_at: Option<DateTime<Utc>>,
    pub reward_claimed: bool,
    pub created_at: DateTime<Utc>,
}

/// Per-user referral counters. Mutated only with atomic increments so
/// concurrent joins cannot lose updates.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReferralStats {
    pub tg_id: i64,
    pub total_referrals: i64,
    pub valid_referrals: i64,
    pub pending_referrals: i64,
    pub rewards_earned: i64,
    pub referral_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
