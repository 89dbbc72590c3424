use chrono::Utc;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile, ParseMode, PhotoSize};
use tracing::{error, info, warn};

use crate::bot::keyboards::{admin_review_keyboard, main_menu, plans_keyboard, referral_keyboard};
use crate::bot::utils::{escape_html, fmt_inr};
use crate::state::{AppState, ChatDialogue, ChatState};

pub async fn message_handler(
    bot: Bot,
    dialogue: ChatDialogue,
    msg: Message,
    state: AppState,
) -> Result<(), teloxide::RequestError> {
    info!("Received message: {:?}", msg.text());
    let tg_id = msg.chat.id.0;

    // A photo only means something while we are waiting for payment proof.
    if let Some(photos) = msg.photo() {
        let chat_state = dialogue.get().await.ok().flatten().unwrap_or_default();
        if let ChatState::AwaitingScreenshot { payment_uuid } = chat_state {
            handle_screenshot(&bot, &dialogue, &msg, &state, &payment_uuid, photos).await;
            return Ok(());
        }
    }

    let Some(text) = msg.text() else {
        return Ok(());
    };

    if text.starts_with("/start") {
        let start_param = text.strip_prefix("/start").unwrap_or("").trim();
        let referral_code = (!start_param.is_empty()).then_some(start_param);

        let username = msg.from.as_ref().and_then(|u| u.username.as_deref());
        let full_name = msg
            .from
            .as_ref()
            .map(|u| u.full_name())
            .unwrap_or_else(|| "User".to_string());

        match state
            .store_service
            .upsert_user(tg_id, username, Some(&full_name), referral_code)
            .await
        {
            Ok(resp) => {
                let mut welcome = format!(
                    "👋 <b>Welcome to OttPass, {}!</b>\n\n\
                    Premium OTT bundles at shared prices — Netflix, Prime Video, Hotstar and more.\n\n\
                    Use the menu below to pick a plan.",
                    escape_html(&full_name)
                );
                if resp.referral_recorded {
                    welcome.push_str("\n\n🎁 You joined through a friend's invite!");
                }
                let _ = bot
                    .send_message(msg.chat.id, welcome)
                    .parse_mode(ParseMode::Html)
                    .reply_markup(main_menu())
                    .await;
            }
            Err(e) => {
                error!("Failed to upsert user on /start: {:?}", e);
                let _ = bot
                    .send_message(msg.chat.id, "⚠️ Something went wrong. Please try again later.")
                    .await;
            }
        }
        return Ok(());
    }

    match text {
        "🛍 Buy Subscription" => {
            show_plans(&bot, &msg, &state).await;
        }

        "📦 My Plans" => {
            show_my_plans(&bot, &msg, &state, tg_id).await;
        }

        "🎁 Referrals" => {
            show_referrals(&bot, &msg, &state, tg_id).await;
        }

        "📊 My Quota" => {
            match state.store_service.get_quota(tg_id).await {
                Ok(quota) => {
                    let _ = bot
                        .send_message(
                            msg.chat.id,
                            format!(
                                "📊 <b>Daily quota</b>\n\nUsed today: {}/{}\nRemaining: {}",
                                quota.used_today, quota.daily_limit, quota.remaining
                            ),
                        )
                        .parse_mode(ParseMode::Html)
                        .await;
                }
                Err(e) => {
                    error!("Failed to fetch quota for {}: {:?}", tg_id, e);
                    let _ = bot
                        .send_message(msg.chat.id, "⚠️ Could not load your quota right now.")
                        .await;
                }
            }
        }

        "❓ Help" => {
            let _ = bot
                .send_message(
                    msg.chat.id,
                    "❓ <b>How it works</b>\n\n\
                    1. Pick a plan from 🛍 Buy Subscription.\n\
                    2. Pay the shown amount via UPI.\n\
                    3. Tap “✅ I've Paid” and send the payment screenshot.\n\
                    4. An admin verifies it and your plan goes live.\n\n\
                    Invite friends from 🎁 Referrals to earn free premium time.",
                )
                .parse_mode(ParseMode::Html)
                .await;
        }

        "/pending" => {
            if !state.is_admin(tg_id) {
                let _ = bot
                    .send_message(msg.chat.id, "This command is for admins only.")
                    .await;
                return Ok(());
            }
            show_pending_payments(&bot, &msg, &state).await;
        }

        _ => {
            let _ = bot
                .send_message(msg.chat.id, "Please use the menu buttons below 👇")
                .reply_markup(main_menu())
                .await;
        }
    }

    Ok(())
}

async fn show_plans(bot: &Bot, msg: &Message, state: &AppState) {
    match state.store_service.get_plans().await {
        Ok(plans) if !plans.is_empty() => {
            let mut text = String::from("🛍 <b>Available bundles</b>\n");
            for plan in &plans {
                text.push_str(&format!(
                    "\n<b>{}</b> — {} for {} days\n{}\n",
                    escape_html(&plan.name),
                    fmt_inr(plan.price),
                    plan.duration_days,
                    escape_html(&plan.platforms.join(", "))
                ));
            }
            text.push_str("\nTap a plan to continue:");
            let _ = bot
                .send_message(msg.chat.id, text)
                .parse_mode(ParseMode::Html)
                .reply_markup(plans_keyboard(&plans))
                .await;
        }
        Ok(_) => {
            let _ = bot
                .send_message(msg.chat.id, "No plans are on sale right now. Check back soon!")
                .await;
        }
        Err(e) => {
            error!("Failed to fetch plans: {:?}", e);
            let _ = bot
                .send_message(msg.chat.id, "⚠️ Could not load plans right now.")
                .await;
        }
    }
}

async fn show_my_plans(bot: &Bot, msg: &Message, state: &AppState, tg_id: i64) {
    let user = match state.store_service.get_user_by_tg_id(tg_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            let _ = bot
                .send_message(msg.chat.id, "Please send /start first.")
                .await;
            return;
        }
        Err(e) => {
            error!("Failed to fetch user {}: {:?}", tg_id, e);
            let _ = bot
                .send_message(msg.chat.id, "⚠️ Could not load your plans right now.")
                .await;
            return;
        }
    };

    match state.store_service.get_user_subscriptions(user.id).await {
        Ok(subs) => {
            let now = Utc::now();
            let live: Vec<_> = subs.iter().filter(|s| s.is_live(now)).collect();
            if live.is_empty() {
                let awaiting_verification = state
                    .pay_service
                    .user_payments(user.id, 1)
                    .await
                    .ok()
                    .and_then(|payments| payments.into_iter().next())
                    .map(|p| p.status == "pending")
                    .unwrap_or(false);

                let text = if awaiting_verification {
                    "⏳ Your payment is awaiting verification. You'll be notified once an admin reviews it."
                } else {
                    "You have no active plans yet. Grab one from 🛍 Buy Subscription!"
                };
                let _ = bot.send_message(msg.chat.id, text).await;
                return;
            }

            let mut text = String::from("📦 <b>Your active plans</b>\n");
            for sub in live {
                let days_left = (sub.expires_at - now).num_days().max(0);
                text.push_str(&format!(
                    "\n<b>{}</b>\n{}\nExpires: {} ({} days left)\n",
                    escape_html(&sub.plan_type),
                    escape_html(&sub.platforms.join(", ")),
                    sub.expires_at.format("%d %b %Y"),
                    days_left
                ));
            }
            let _ = bot
                .send_message(msg.chat.id, text)
                .parse_mode(ParseMode::Html)
                .await;
        }
        Err(e) => {
            error!("Failed to fetch subscriptions for {}: {:?}", tg_id, e);
            let _ = bot
                .send_message(msg.chat.id, "⚠️ Could not load your plans right now.")
                .await;
        }
    }
}

async fn show_referrals(bot: &Bot, msg: &Message, state: &AppState, tg_id: i64) {
    match state.referral_service.overview(tg_id).await {
        Ok(overview) => {
            let bot_username = state
                .bot_username
                .get()
                .map(String::as_str)
                .unwrap_or("unknown");
            let link = format!(
                "https://t.me/{}?start={}",
                bot_username,
                urlencoding::encode(&overview.referral_code)
            );
            let rewards = &overview.rewards;
            let mut text = format!(
                "🎁 <b>Referral program</b>\n\n\
                Your code: <code>{}</code>\n\
                Share link: {}\n\n\
                Invited: {} (valid: {}, awaiting first purchase: {})\n\
                Progress: {}/{} toward your next reward\n\
                Rewards earned: {} • Claimable now: {}\n\n\
                Every {} friends who buy a plan earn you free premium time.",
                escape_html(&overview.referral_code),
                link,
                overview.total_referrals,
                overview.valid_referrals,
                overview.pending_referrals,
                rewards.progress,
                rewards.required_count,
                rewards.rewards_earned,
                rewards.pending_rewards,
                rewards.required_count
            );

            if let Ok(entries) = state.referral_service.list(tg_id, 5).await {
                if !entries.is_empty() {
                    text.push_str("\n\nRecent invites:");
                    for entry in entries {
                        let name = entry
                            .referred_username
                            .map(|u| format!("@{}", u))
                            .unwrap_or_else(|| "a friend".to_string());
                        let mark = if entry.is_valid { "✅" } else { "⏳" };
                        text.push_str(&format!("\n{} {}", mark, escape_html(&name)));
                    }
                }
            }

            let _ = bot
                .send_message(msg.chat.id, text)
                .parse_mode(ParseMode::Html)
                .reply_markup(referral_keyboard())
                .await;
        }
        Err(e) => {
            error!("Failed to fetch referral overview for {}: {:?}", tg_id, e);
            let _ = bot
                .send_message(msg.chat.id, "⚠️ Could not load referral info right now.")
                .await;
        }
    }
}

async fn show_pending_payments(bot: &Bot, msg: &Message, state: &AppState) {
    match state.admin_service.pending_payments(5).await {
        Ok(payments) if !payments.is_empty() => {
            for payment in payments {
                let proof = if payment.screenshot_file_id.is_some() {
                    "attached"
                } else {
                    "not sent yet"
                };
                let text = format!(
                    "💳 <b>Pending payment</b>\n\n\
                    Amount: {}\nPlan: {}\nPlatforms: {}\nProof: {}\n\
                    ID: <code>{}</code>",
                    fmt_inr(payment.amount),
                    escape_html(&payment.plan_type),
                    escape_html(&payment.platforms.join(", ")),
                    proof,
                    payment.payment_uuid
                );
                let _ = bot
                    .send_message(msg.chat.id, text)
                    .parse_mode(ParseMode::Html)
                    .reply_markup(admin_review_keyboard(&payment.payment_uuid))
                    .await;
            }
        }
        Ok(_) => {
            let _ = bot.send_message(msg.chat.id, "No pending payments 🎉").await;
        }
        Err(e) => {
            error!("Failed to fetch pending payments: {:?}", e);
            let _ = bot
                .send_message(msg.chat.id, "⚠️ Could not load pending payments.")
                .await;
        }
    }
}

async fn handle_screenshot(
    bot: &Bot,
    dialogue: &ChatDialogue,
    msg: &Message,
    state: &AppState,
    payment_uuid: &str,
    photos: &[PhotoSize],
) {
    // Telegram orders sizes ascending; the last one is the original.
    let Some(photo) = photos.last() else {
        return;
    };
    let file_id = photo.file.id.to_string();

    let attached = state
        .pay_service
        .attach_screenshot(payment_uuid, &file_id, None)
        .await
        .unwrap_or(false);

    if !attached {
        warn!("Screenshot arrived for missing payment {}", payment_uuid);
        let _ = dialogue.exit().await;
        let _ = bot
            .send_message(
                msg.chat.id,
                "⚠️ That payment could not be found anymore. Please start a new purchase.",
            )
            .await;
        return;
    }

    let _ = dialogue.exit().await;
    let _ = bot
        .send_message(
            msg.chat.id,
            "📸 Screenshot received!\n\nAn admin will verify your payment shortly. \
            You'll get a message here once it's done (usually under 1 hour).",
        )
        .await;

    // Fan the proof out to every admin for review.
    let caption = match state.admin_service.get_payment(payment_uuid).await {
        Ok(payment) => format!(
            "💳 <b>Payment review</b>\n\n\
            From: {} (<code>{}</code>)\n\
            Plan: {}\nAmount: {}\n\
            ID: <code>{}</code>",
            escape_html(
                &msg.from
                    .as_ref()
                    .map(|u| u.full_name())
                    .unwrap_or_else(|| "User".to_string())
            ),
            msg.chat.id.0,
            escape_html(&payment.plan_type),
            fmt_inr(payment.amount),
            payment.payment_uuid
        ),
        Err(e) => {
            error!("Failed to fetch payment {} for review: {:?}", payment_uuid, e);
            format!(
                "💳 <b>Payment review</b>\n\nID: <code>{}</code>",
                payment_uuid
            )
        }
    };

    for admin_id in &state.admin_tg_ids {
        let _ = bot
            .send_photo(ChatId(*admin_id), InputFile::file_id(photo.file.id.clone()))
            .caption(caption.clone())
            .parse_mode(ParseMode::Html)
            .reply_markup(admin_review_keyboard(payment_uuid))
            .await;
    }
}
