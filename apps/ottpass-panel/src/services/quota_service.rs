use anyhow::Result;
use chrono::Utc;
use ottpass_db::models::usage::UsageKind;
use ottpass_db::repositories::{SubscriptionRepository, UsageRepository, UserRepository};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct QuotaStatus {
    pub has_quota: bool,
    pub daily_limit: i32,
    pub used_today: i32,
    pub remaining: i32,
}

#[derive(Debug, Clone, Copy)]
pub struct QuotaLimits {
    pub free: i32,
    pub premium: i32,
    pub admin: i32,
}

#[derive(Clone)]
pub struct QuotaService {
    users: UserRepository,
    subscriptions: SubscriptionRepository,
    usage: UsageRepository,
    limits: QuotaLimits,
    admin_tg_ids: Vec<i64>,
}

impl QuotaService {
    pub fn new(
        users: UserRepository,
        subscriptions: SubscriptionRepository,
        usage: UsageRepository,
        limits: QuotaLimits,
        admin_tg_ids: Vec<i64>,
    ) -> Self {
        Self {
            users,
            subscriptions,
            usage,
            limits,
            admin_tg_ids,
        }
    }

    /// Today's extraction allowance for a user. Tier resolution:
    /// admin > premium (any live subscription) > free.
    pub async fn check_quota(&self, tg_id: i64) -> Result<QuotaStatus> {
        let user = self.users.get_by_tg_id(tg_id).await?;

        let is_admin = self.admin_tg_ids.contains(&tg_id)
            || user.as_ref().map(|u| u.is_admin).unwrap_or(false);

        let daily_limit = if is_admin {
            self.limits.admin
        } else {
            let premium = match &user {
                Some(u) => self.subscriptions.has_active(u.id).await?,
                None => false,
            };
            if premium {
                self.limits.premium
            } else {
                self.limits.free
            }
        };

        let today = Utc::now().date_naive();
        let used_today = self
            .usage
            .get_day(tg_id, today)
            .await?
            .map(|d| d.extraction_count)
            .unwrap_or(0);

        let remaining = (daily_limit - used_today).max(0);

        Ok(QuotaStatus {
            has_quota: remaining > 0,
            daily_limit,
            used_today,
            remaining,
        })
    }

    pub async fn record_usage(&self, tg_id: i64, kind: UsageKind) -> Result<()> {
        self.usage
            .increment(tg_id, Utc::now().date_naive(), kind)
            .await
    }
}
