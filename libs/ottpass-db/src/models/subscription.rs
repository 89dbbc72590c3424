use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One granted access window. Rows are append-only: a renewal inserts a new
/// row rather than extending an old one, so the purchase history survives.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subscription {
    pub id: i64,
    pub user_id: i64,
    pub plan_type: String,
    pub platforms: Vec<String>,
    pub amount_paid: i64,
    pub starts_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Stored redundantly next to `expires_at`; kept consistent by
    /// `SubscriptionRepository::deactivate_expired`.
    pub is_active: bool,
    pub payment_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active && now < self.expires_at
    }

    pub fn days_left(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_days().max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample(starts_at: DateTime<Utc>, expires_at: DateTime<Utc>, is_active: bool) -> Subscription {
        Subscription {
            id: 1,
            user_id: 7,
            plan_type: "monthly".to_string(),
            platforms: vec!["Netflix".to_string()],
            amount_paid: 29900,
            starts_at,
            expires_at,
            is_active,
            payment_id: Some(3),
            created_at: starts_at,
        }
    }

    #[test]
    fn liveness_follows_the_clock() {
        let now = Utc::now();
        let sub = sample(now - Duration::days(1), now + Duration::days(29), true);
        assert!(sub.is_live(now));
        assert!(!sub.is_live(now + Duration::days(30)));
    }

    #[test]
    fn deactivated_rows_are_dead_even_before_expiry() {
        let now = Utc::now();
        let sub = sample(now - Duration::days(1), now + Duration::days(29), false);
        assert!(!sub.is_live(now));
    }

    #[test]
    fn days_left_never_goes_negative() {
        let now = Utc::now();
        let sub = sample(now - Duration::days(40), now - Duration::days(10), true);
        assert_eq!(sub.days_left(now), 0);
        let fresh = sample(now, now + Duration::days(7), true);
        assert_eq!(fresh.days_left(now), 7);
    }
}
