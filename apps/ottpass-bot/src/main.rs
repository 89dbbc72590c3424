use dotenvy::dotenv;
use std::env;
use std::sync::{Arc, OnceLock};
use teloxide::prelude::*;

mod api_client;
mod bot;
pub mod models;
mod services;
mod state;

use crate::api_client::ApiClient;
use crate::state::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();

    log::info!("Starting OttPass Bot...");

    let token = env::var("BOT_TOKEN").expect("BOT_TOKEN is not set");
    let panel_url = env::var("PANEL_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let panel_token = env::var("PANEL_TOKEN").unwrap_or_default();

    let admin_tg_ids: Vec<i64> = env::var("ADMIN_TG_IDS")
        .unwrap_or_default()
        .split_whitespace()
        .filter_map(|s| s.parse().ok())
        .collect();
    if admin_tg_ids.is_empty() {
        log::warn!("ADMIN_TG_IDS is empty; nobody can verify payments");
    }

    let api_client = ApiClient::new(panel_url, panel_token);

    let store_service = crate::services::store_service::StoreService::new(api_client.clone());
    let pay_service = crate::services::pay_service::PayService::new(api_client.clone());
    let referral_service = crate::services::referral_service::ReferralService::new(api_client.clone());
    let admin_service = crate::services::admin_service::AdminService::new(api_client.clone());

    let state = AppState {
        store_service,
        pay_service,
        referral_service,
        admin_service,
        admin_tg_ids,
        bot_username: Arc::new(OnceLock::new()),
    };

    let bot = Bot::new(token);

    let (_tx, rx) = tokio::sync::broadcast::channel(1);

    bot::run_bot(bot, rx, state).await;
}
