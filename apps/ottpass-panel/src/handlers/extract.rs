use axum::{Json, extract::State};
use ottpass_db::models::usage::UsageKind;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;
use crate::services::extraction::ExtractionResult;

#[derive(Deserialize)]
pub struct ExtractionRequest {
    pub pssh: String,
    pub license_url: String,
    pub telegram_id: Option<i64>,
}

pub async fn extract_keys(
    State(state): State<AppState>,
    Json(req): Json<ExtractionRequest>,
) -> Result<Json<ExtractionResult>, ApiError> {
    if let Some(tg_id) = req.telegram_id {
        let quota = state.quota.check_quota(tg_id).await?;
        if !quota.has_quota {
            return Err(ApiError::QuotaExceeded);
        }
    }

    let result = state
        .extractor
        .extract(&req.pssh, &req.license_url)
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    if let Some(tg_id) = req.telegram_id {
        state.quota.record_usage(tg_id, UsageKind::Extraction).await?;
    }

    info!(
        "Extraction served ({} keys) via {}",
        result.keys.len(),
        result.extractor
    );
    Ok(Json(result))
}

#[derive(Deserialize)]
pub struct DownloadRequest {
    pub url: String,
    pub quality: Option<String>,
    pub telegram_id: Option<i64>,
}

#[derive(Serialize)]
pub struct DownloadTicket {
    pub download_id: Uuid,
    pub url: String,
    pub quality: String,
    pub status: &'static str,
}

pub async fn request_download(
    State(state): State<AppState>,
    Json(req): Json<DownloadRequest>,
) -> Result<Json<DownloadTicket>, ApiError> {
    if req.url.trim().is_empty() {
        return Err(ApiError::BadRequest("url must not be empty".to_string()));
    }

    if let Some(tg_id) = req.telegram_id {
        let quota = state.quota.check_quota(tg_id).await?;
        if !quota.has_quota {
            return Err(ApiError::QuotaExceeded);
        }
        state.quota.record_usage(tg_id, UsageKind::Download).await?;
    }

    Ok(Json(DownloadTicket {
        download_id: Uuid::new_v4(),
        url: req.url,
        quality: req.quality.unwrap_or_else(|| "1080p".to_string()),
        status: "queued",
    }))
}
