use axum::{
    Json,
    extract::{Path, Query, State},
};
use ottpass_db::models::payment::{Payment, PaymentStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;
use crate::services::payment_service::DecideOutcome;

#[derive(Deserialize)]
pub struct PaymentListQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

pub async fn list_payments(
    State(state): State<AppState>,
    Query(query): Query<PaymentListQuery>,
) -> Result<Json<Vec<Payment>>, ApiError> {
    let status = match query.status.as_deref() {
        Some(raw) => Some(
            PaymentStatus::parse(raw)
                .ok_or_else(|| ApiError::BadRequest(format!("Unknown status '{raw}'")))?,
        ),
        None => None,
    };

    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let payments = state.payments.list_by_status(status, limit).await?;
    Ok(Json(payments))
}

#[derive(Serialize)]
pub struct DecideResponse {
    pub outcome: &'static str,
    pub payment: Payment,
    /// Telegram id of the payer, for follow-up notification.
    pub user_tg_id: Option<i64>,
}

pub(crate) async fn decide_to_response(
    state: &AppState,
    outcome: DecideOutcome,
) -> Result<DecideResponse, ApiError> {
    let (label, payment) = match outcome {
        DecideOutcome::Approved(p) => ("approved", p),
        DecideOutcome::Rejected(p) => ("rejected", p),
        DecideOutcome::NotFound => return Err(ApiError::NotFound("Payment")),
        DecideOutcome::AlreadyDecided => {
            return Err(ApiError::InvalidState("Payment is not pending".to_string()));
        }
    };

    let user_tg_id = state.users.get_by_id(payment.user_id).await?.map(|u| u.tg_id);

    Ok(DecideResponse {
        outcome: label,
        payment,
        user_tg_id,
    })
}

#[derive(Deserialize)]
pub struct ApproveRequest {
    pub admin_tg_id: Option<i64>,
}

pub async fn approve_payment(
    State(state): State<AppState>,
    Path(payment_uuid): Path<Uuid>,
    body: Option<Json<ApproveRequest>>,
) -> Result<Json<DecideResponse>, ApiError> {
    let admin_tg_id = body.and_then(|Json(b)| b.admin_tg_id).unwrap_or(0);
    let outcome = state
        .payments
        .decide_payment(payment_uuid, admin_tg_id, true, None)
        .await?;
    Ok(Json(decide_to_response(&state, outcome).await?))
}

#[derive(Deserialize)]
pub struct RejectRequest {
    pub admin_tg_id: Option<i64>,
    pub reason: Option<String>,
}

pub async fn reject_payment(
    State(state): State<AppState>,
    Path(payment_uuid): Path<Uuid>,
    body: Option<Json<RejectRequest>>,
) -> Result<Json<DecideResponse>, ApiError> {
    let (admin_tg_id, reason) = body
        .map(|Json(b)| (b.admin_tg_id.unwrap_or(0), b.reason))
        .unwrap_or((0, None));
    let outcome = state
        .payments
        .decide_payment(payment_uuid, admin_tg_id, false, reason.as_deref())
        .await?;
    Ok(Json(decide_to_response(&state, outcome).await?))
}
