use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::user::User;

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch user by ID")
    }

    pub async fn get_by_tg_id(&self, tg_id: i64) -> Result<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE tg_id = $1")
            .bind(tg_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch user by TG ID")
    }

    pub async fn upsert(
        &self,
        tg_id: i64,
        username: Option<&str>,
        full_name: Option<&str>,
    ) -> Result<User> {
        let user_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (tg_id, username, full_name, last_active)
            VALUES ($1, $2, $3, CURRENT_TIMESTAMP)
            ON CONFLICT(tg_id) DO UPDATE SET
                username = COALESCE(excluded.username, users.username),
                full_name = COALESCE(excluded.full_name, users.full_name),
                last_active = CURRENT_TIMESTAMP,
                updated_at = CURRENT_TIMESTAMP
            RETURNING id
            "#,
        )
        .bind(tg_id)
        .bind(username)
        .bind(full_name)
        .fetch_one(&self.pool)
        .await
        .context("Failed to upsert user")?;

        self.get_by_id(user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User {} not found after upsert", user_id))
    }

    pub async fn add_spent(&self, id: i64, amount: i64) -> Result<()> {
        sqlx::query(
            "UPDATE users SET total_spent = total_spent + $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2",
        )
        .bind(amount)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to bump user spend")?;
        Ok(())
    }
}
