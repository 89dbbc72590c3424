use axum::{
    Json,
    extract::{Path, State},
};

use crate::AppState;
use crate::error::ApiError;
use crate::services::quota_service::QuotaStatus;

pub async fn user_quota(
    State(state): State<AppState>,
    Path(tg_id): Path<i64>,
) -> Result<Json<QuotaStatus>, ApiError> {
    let status = state.quota.check_quota(tg_id).await?;
    Ok(Json(status))
}
