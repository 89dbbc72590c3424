use anyhow::{Context, Result};
use std::env;

/// Runtime configuration, read once at startup from the environment
/// (a local `.env` is honored via dotenvy).
#[derive(Debug, Clone)]
pub struct Settings {
    pub listen_port: u16,
    /// Shared secret the bot presents in `X-Bot-Token`.
    pub bot_api_token: String,
    /// UPI handle buyers are asked to pay to.
    pub upi_id: String,
    pub admin_tg_ids: Vec<i64>,
    /// Valid referrals needed per reward unit.
    pub referral_threshold: i64,
    /// Premium days granted per claimed reward.
    pub referral_reward_days: i64,
    pub free_daily_limit: i32,
    pub premium_daily_limit: i32,
    pub admin_daily_limit: i32,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Settings {
    pub fn load() -> Result<Self> {
        let bot_api_token = env::var("PANEL_TOKEN").context("PANEL_TOKEN must be set")?;

        let admin_tg_ids = env::var("ADMIN_TG_IDS")
            .unwrap_or_default()
            .split_whitespace()
            .filter_map(|s| s.parse().ok())
            .collect();

        Ok(Self {
            listen_port: env_parse("LISTEN_PORT", 8080),
            bot_api_token,
            upi_id: env::var("UPI_ID").unwrap_or_else(|_| "admin@upi".to_string()),
            admin_tg_ids,
            referral_threshold: env_parse("REFERRAL_THRESHOLD", 20),
            referral_reward_days: env_parse("REFERRAL_REWARD_DAYS", 30),
            free_daily_limit: env_parse("FREE_DAILY_LIMIT", 3),
            premium_daily_limit: env_parse("PREMIUM_DAILY_LIMIT", 50),
            admin_daily_limit: env_parse("ADMIN_DAILY_LIMIT", 1000),
        })
    }

    pub fn is_admin_tg(&self, tg_id: i64) -> bool {
        self.admin_tg_ids.contains(&tg_id)
    }
}
