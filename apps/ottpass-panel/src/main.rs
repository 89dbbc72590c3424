use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod error;
mod handlers;
mod services;
mod settings;

use ottpass_db::repositories::{
    PaymentRepository, ReferralRepository, SubscriptionRepository, UsageRepository, UserRepository,
};
use services::catalog_service::CatalogService;
use services::extraction::{KeyExtractor, mock::MockExtractor};
use services::payment_service::PaymentService;
use services::quota_service::{QuotaLimits, QuotaService};
use services::referral_service::ReferralService;
use settings::Settings;

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub users: UserRepository,
    pub subscriptions: SubscriptionRepository,
    pub payments: PaymentService,
    pub referrals: ReferralService,
    pub quota: QuotaService,
    pub catalog: CatalogService,
    pub extractor: Arc<dyn KeyExtractor>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ottpass_panel=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load()?;
    tracing::info!("Panel starting...");
    tracing::info!("UPI handle: {}", settings.upi_id);
    tracing::info!("Referral threshold: {}", settings.referral_threshold);

    let pool = ottpass_db::db::init_db().await?;

    let users = UserRepository::new(pool.clone());
    let subscriptions = SubscriptionRepository::new(pool.clone());
    let payment_repo = PaymentRepository::new(pool.clone());
    let referral_repo = ReferralRepository::new(pool.clone());
    let usage_repo = UsageRepository::new(pool.clone());

    let referrals = ReferralService::new(
        referral_repo,
        subscriptions.clone(),
        users.clone(),
        settings.referral_threshold,
        settings.referral_reward_days,
    );
    let payments = PaymentService::new(
        pool.clone(),
        payment_repo,
        users.clone(),
        referrals.clone(),
        settings.upi_id.clone(),
    );
    let quota = QuotaService::new(
        users.clone(),
        subscriptions.clone(),
        usage_repo,
        QuotaLimits {
            free: settings.free_daily_limit,
            premium: settings.premium_daily_limit,
            admin: settings.admin_daily_limit,
        },
        settings.admin_tg_ids.clone(),
    );

    let state = AppState {
        settings: settings.clone(),
        users,
        subscriptions,
        payments,
        referrals,
        quota,
        catalog: CatalogService,
        extractor: Arc::new(MockExtractor),
    };

    start_expiry_sweep(state.clone());

    let admin_routes = Router::new()
        .route("/payments", get(handlers::admin::list_payments))
        .route(
            "/payments/{payment_uuid}/approve",
            put(handlers::admin::approve_payment),
        )
        .route(
            "/payments/{payment_uuid}/reject",
            put(handlers::admin::reject_payment),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            handlers::bot_api::require_bot_token,
        ));

    let bot_routes = Router::new()
        .route("/users", post(handlers::bot_api::upsert_user))
        .route("/users/tg/{tg_id}", get(handlers::bot_api::get_user))
        .route(
            "/users/{user_id}/subs",
            get(handlers::bot_api::user_subscriptions),
        )
        .route(
            "/users/{user_id}/payments",
            get(handlers::bot_api::user_payments),
        )
        .route("/plans", get(handlers::bot_api::plans))
        .route("/payments", post(handlers::bot_api::create_payment))
        .route(
            "/payments/pending",
            get(handlers::bot_api::pending_payments),
        )
        .route("/payments/{payment_uuid}", get(handlers::bot_api::get_payment))
        .route(
            "/payments/{payment_uuid}/screenshot",
            post(handlers::bot_api::attach_screenshot),
        )
        .route(
            "/payments/{payment_uuid}/decide",
            post(handlers::bot_api::decide_payment),
        )
        .route(
            "/referrals/{tg_id}",
            get(handlers::bot_api::referral_overview),
        )
        .route(
            "/referrals/{tg_id}/list",
            get(handlers::bot_api::referral_list),
        )
        .route(
            "/referrals/{tg_id}/claim",
            post(handlers::bot_api::claim_reward),
        )
        .route("/quota/{tg_id}", get(handlers::bot_api::bot_quota))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            handlers::bot_api::require_bot_token,
        ));

    let app = Router::new()
        .route("/api/health", get(handlers::health::health_check))
        .route("/api/extract", post(handlers::extract::extract_keys))
        .route("/api/download", post(handlers::extract::request_download))
        .route("/api/user/quota/{tg_id}", get(handlers::quota::user_quota))
        .nest("/api/admin", admin_routes)
        .nest("/api/v2/bot", bot_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.listen_port));
    tracing::info!("Panel listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Hourly reconciliation of the stored `is_active` subscription flag
/// against the wall clock.
fn start_expiry_sweep(state: AppState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(3600));
        loop {
            interval.tick().await;
            match state.subscriptions.deactivate_expired().await {
                Ok(0) => {}
                Ok(n) => tracing::info!("Deactivated {} expired subscriptions", n),
                Err(e) => tracing::warn!("Expiry sweep failed: {:#}", e),
            }
        }
    });
}
