use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Payment {
    pub payment_uuid: String,
    pub user_id: i64,
    /// Paise.
    pub amount: i64,
    pub plan_type: String,
    pub platforms: Vec<String>,
    pub upi_id: String,
    pub screenshot_file_id: Option<String>,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecideResponse {
    pub outcome: String,
    pub payment: Payment,
    pub user_tg_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClaimResponse {
    pub claimed: bool,
    pub reward_days: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttachScreenshotResponse {
    pub attached: bool,
}
