use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Per-user, per-day usage counters for the metered endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UsageDay {
    pub tg_id: i64,
    pub day: NaiveDate,
    pub extraction_count: i32,
    pub download_count: i32,
    pub last_extraction_at: Option<DateTime<Utc>>,
    pub last_download_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageKind {
    Extraction,
    Download,
}
