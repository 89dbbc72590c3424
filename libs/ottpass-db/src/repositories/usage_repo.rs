use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::models::usage::{UsageDay, UsageKind};

#[derive(Debug, Clone)]
pub struct UsageRepository {
    pool: PgPool,
}

impl UsageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_day(&self, tg_id: i64, day: NaiveDate) -> Result<Option<UsageDay>> {
        sqlx::query_as::<_, UsageDay>("SELECT * FROM usage_days WHERE tg_id = $1 AND day = $2")
            .bind(tg_id)
            .bind(day)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch usage day")
    }

    /// Upsert-increment for one counter. The single statement keeps
    /// concurrent requests from losing updates.
    pub async fn increment(&self, tg_id: i64, day: NaiveDate, kind: UsageKind) -> Result<()> {
        let sql = match kind {
            UsageKind::Extraction => {
                r#"
                INSERT INTO usage_days (tg_id, day, extraction_count, last_extraction_at)
                VALUES ($1, $2, 1, CURRENT_TIMESTAMP)
                ON CONFLICT (tg_id, day) DO UPDATE SET
                    extraction_count = usage_days.extraction_count + 1,
                    last_extraction_at = CURRENT_TIMESTAMP
                "#
            }
            UsageKind::Download => {
                r#"
                INSERT INTO usage_days (tg_id, day, download_count, last_download_at)
                VALUES ($1, $2, 1, CURRENT_TIMESTAMP)
                ON CONFLICT (tg_id, day) DO UPDATE SET
                    download_count = usage_days.download_count + 1,
                    last_download_at = CURRENT_TIMESTAMP
                "#
            }
        };

        sqlx::query(sql)
            .bind(tg_id)
            .bind(day)
            .execute(&self.pool)
            .await
            .context("Failed to increment usage counter")?;
        Ok(())
    }
}
