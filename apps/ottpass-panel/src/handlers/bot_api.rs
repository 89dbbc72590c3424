use axum::{
    Json,
    extract::{Path, Query, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use ottpass_db::models::payment::{Payment, PaymentStatus};
use ottpass_db::models::subscription::Subscription;
use ottpass_db::models::user::User;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;
use crate::handlers::admin::{DecideResponse, decide_to_response};
use crate::services::catalog_service::PlanOffer;
use crate::services::quota_service::QuotaStatus;
use crate::services::referral_service::ReferralOverview;

/// Shared-secret gate for everything the bot (and admin tooling) calls.
pub async fn require_bot_token(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let authorized = req
        .headers()
        .get("X-Bot-Token")
        .and_then(|v| v.to_str().ok())
        .map(|token| token == state.settings.bot_api_token)
        .unwrap_or(false);

    if !authorized {
        return ApiError::Unauthorized.into_response();
    }
    next.run(req).await
}

#[derive(Deserialize)]
pub struct UpsertUserRequest {
    pub tg_id: i64,
    pub username: Option<String>,
    pub full_name: Option<String>,
    /// Referral code from a /start deep link, if the user arrived via one.
    pub referral_code: Option<String>,
}

#[derive(Serialize)]
pub struct UpsertUserResponse {
    pub user: User,
    pub referral_recorded: bool,
}

pub async fn upsert_user(
    State(state): State<AppState>,
    Json(payload): Json<UpsertUserRequest>,
) -> Result<Json<UpsertUserResponse>, ApiError> {
    let user = state
        .users
        .upsert(
            payload.tg_id,
            payload.username.as_deref(),
            payload.full_name.as_deref(),
        )
        .await?;

    let mut referral_recorded = false;
    if let Some(code) = payload.referral_code.as_deref().filter(|c| !c.is_empty()) {
        match state.referrals.resolve_code(code).await? {
            Some(referrer_tg_id) => {
                let referrer_username = state
                    .users
                    .get_by_tg_id(referrer_tg_id)
                    .await?
                    .and_then(|u| u.username);
                referral_recorded = state
                    .referrals
                    .add_referral(
                        referrer_tg_id,
                        payload.tg_id,
                        referrer_username.as_deref(),
                        payload.username.as_deref(),
                    )
                    .await?;
            }
            None => warn!("Unknown referral code '{}' from user {}", code, payload.tg_id),
        }
    }

    Ok(Json(UpsertUserResponse {
        user,
        referral_recorded,
    }))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(tg_id): Path<i64>,
) -> Result<Json<Option<User>>, ApiError> {
    Ok(Json(state.users.get_by_tg_id(tg_id).await?))
}

pub async fn user_subscriptions(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<Subscription>>, ApiError> {
    Ok(Json(state.subscriptions.get_all_by_user(user_id).await?))
}

pub async fn plans(State(state): State<AppState>) -> Json<Vec<PlanOffer>> {
    Json(state.catalog.list())
}

#[derive(Deserialize)]
pub struct CreatePaymentRequest {
    pub tg_id: i64,
    pub plan_code: String,
}

pub async fn create_payment(
    State(state): State<AppState>,
    Json(payload): Json<CreatePaymentRequest>,
) -> Result<Json<Payment>, ApiError> {
    let offer = state
        .catalog
        .get(&payload.plan_code)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown plan '{}'", payload.plan_code)))?;

    let user = state
        .users
        .get_by_tg_id(payload.tg_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    let payment = state.payments.create_for_offer(user.id, &offer).await?;
    Ok(Json(payment))
}

pub async fn get_payment(
    State(state): State<AppState>,
    Path(payment_uuid): Path<Uuid>,
) -> Result<Json<Payment>, ApiError> {
    state
        .payments
        .get(payment_uuid)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Payment"))
}

#[derive(Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

pub async fn pending_payments(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<Payment>>, ApiError> {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let payments = state
        .payments
        .list_by_status(Some(PaymentStatus::Pending), limit)
        .await?;
    Ok(Json(payments))
}

#[derive(Deserialize)]
pub struct AttachScreenshotRequest {
    pub file_id: String,
    pub file_url: Option<String>,
}

#[derive(Serialize)]
pub struct AttachScreenshotResponse {
    pub attached: bool,
}

pub async fn attach_screenshot(
    State(state): State<AppState>,
    Path(payment_uuid): Path<Uuid>,
    Json(payload): Json<AttachScreenshotRequest>,
) -> Result<Json<AttachScreenshotResponse>, ApiError> {
    let attached = state
        .payments
        .attach_screenshot(payment_uuid, &payload.file_id, payload.file_url.as_deref())
        .await?;

    if !attached {
        return Err(ApiError::NotFound("Payment"));
    }
    Ok(Json(AttachScreenshotResponse { attached }))
}

#[derive(Deserialize)]
pub struct DecideRequest {
    pub admin_tg_id: i64,
    pub approved: bool,
    pub reason: Option<String>,
}

pub async fn decide_payment(
    State(state): State<AppState>,
    Path(payment_uuid): Path<Uuid>,
    Json(payload): Json<DecideRequest>,
) -> Result<Json<DecideResponse>, ApiError> {
    let outcome = state
        .payments
        .decide_payment(
            payment_uuid,
            payload.admin_tg_id,
            payload.approved,
            payload.reason.as_deref(),
        )
        .await?;
    Ok(Json(decide_to_response(&state, outcome).await?))
}

pub async fn referral_overview(
    State(state): State<AppState>,
    Path(tg_id): Path<i64>,
) -> Result<Json<ReferralOverview>, ApiError> {
    Ok(Json(state.referrals.overview(tg_id).await?))
}

pub async fn referral_list(
    State(state): State<AppState>,
    Path(tg_id): Path<i64>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<ottpass_db::models::referral::Referral>>, ApiError> {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    Ok(Json(state.referrals.referral_list(tg_id, limit).await?))
}

pub async fn user_payments(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<Payment>>, ApiError> {
    let limit = query.limit.unwrap_or(20).clamp(1, 200);
    Ok(Json(state.payments.user_payments(user_id, limit).await?))
}

#[derive(Serialize)]
pub struct ClaimResponse {
    pub claimed: bool,
    pub reward_days: i64,
}

pub async fn claim_reward(
    State(state): State<AppState>,
    Path(tg_id): Path<i64>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claimed = state.referrals.claim_reward(tg_id).await?;
    Ok(Json(ClaimResponse {
        claimed,
        reward_days: state.settings.referral_reward_days,
    }))
}

pub async fn bot_quota(
    State(state): State<AppState>,
    Path(tg_id): Path<i64>,
) -> Result<Json<QuotaStatus>, ApiError> {
    Ok(Json(state.quota.check_quota(tg_id).await?))
}
