use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode};
use tracing::{error, info};

use crate::bot::keyboards::payment_confirmation_keyboard;
use crate::bot::utils::{escape_html, fmt_inr};
use crate::state::{AppState, ChatDialogue, ChatState};

pub async fn callback_handler(
    bot: Bot,
    dialogue: ChatDialogue,
    q: CallbackQuery,
    state: AppState,
) -> Result<(), teloxide::RequestError> {
    info!("Received callback: {:?}", q.data);
    let callback_id = q.id.clone();
    let tg_id = q.from.id.0 as i64;

    let Some(data) = q.data.clone() else {
        let _ = bot.answer_callback_query(callback_id).await;
        return Ok(());
    };

    match data.as_str() {
        plan if plan.starts_with("plan_") => {
            let plan_code = plan.trim_start_matches("plan_");
            let _ = bot.answer_callback_query(callback_id).await;

            match state.pay_service.create_payment(tg_id, plan_code).await {
                Ok(payment) => {
                    let text = format!(
                        "🧾 <b>Order created</b>\n\n\
                        Plan: {}\nPlatforms: {}\nAmount: <b>{}</b>\n\n\
                        Pay via UPI to:\n<code>{}</code>\n\n\
                        After paying, tap “✅ I've Paid” and send the payment \
                        screenshot here. Your plan activates once an admin \
                        verifies it.",
                        escape_html(&payment.plan_type),
                        escape_html(&payment.platforms.join(", ")),
                        fmt_inr(payment.amount),
                        escape_html(&payment.upi_id)
                    );
                    if let Some(msg) = q.message {
                        let _ = bot
                            .send_message(msg.chat().id, text)
                            .parse_mode(ParseMode::Html)
                            .reply_markup(payment_confirmation_keyboard(&payment.payment_uuid))
                            .await;
                    }
                }
                Err(e) => {
                    error!("Failed to create payment for {}: {:?}", tg_id, e);
                    if let Some(msg) = q.message {
                        let _ = bot
                            .send_message(
                                msg.chat().id,
                                "⚠️ Could not create the order. Please send /start and try again.",
                            )
                            .await;
                    }
                }
            }
        }

        paid if paid.starts_with("paid_") => {
            let payment_uuid = paid.trim_start_matches("paid_").to_string();
            let _ = dialogue
                .update(ChatState::AwaitingScreenshot { payment_uuid })
                .await;
            let _ = bot.answer_callback_query(callback_id).await;
            if let Some(msg) = q.message {
                let _ = bot
                    .send_message(
                        msg.chat().id,
                        "📸 Great! Now send the payment screenshot as a photo.",
                    )
                    .await;
            }
        }

        "cancel_payment" => {
            let _ = dialogue.exit().await;
            let _ = bot
                .answer_callback_query(callback_id)
                .text("Order cancelled.")
                .await;
            if let Some(msg) = q.message {
                let _ = bot.edit_message_reply_markup(msg.chat().id, msg.id()).await;
            }
        }

        "claim_reward" => match state.referral_service.claim(tg_id).await {
            Ok(resp) if resp.claimed => {
                let _ = bot.answer_callback_query(callback_id).await;
                if let Some(msg) = q.message {
                    let _ = bot
                        .send_message(
                            msg.chat().id,
                            format!(
                                "🎉 Reward claimed! {} days of premium have been added to your account.",
                                resp.reward_days
                            ),
                        )
                        .await;
                }
            }
            Ok(_) => {
                let _ = bot
                    .answer_callback_query(callback_id)
                    .text("No rewards to claim yet. Keep inviting!")
                    .show_alert(true)
                    .await;
            }
            Err(e) => {
                error!("Failed to claim reward for {}: {:?}", tg_id, e);
                let _ = bot
                    .answer_callback_query(callback_id)
                    .text("Could not claim right now. Try again later.")
                    .show_alert(true)
                    .await;
            }
        },

        decision if decision.starts_with("approve_") || decision.starts_with("reject_") => {
            if !state.is_admin(tg_id) {
                let _ = bot
                    .answer_callback_query(callback_id)
                    .text("You are not allowed to do that.")
                    .show_alert(true)
                    .await;
                return Ok(());
            }

            let approved = decision.starts_with("approve_");
            let payment_uuid = decision
                .trim_start_matches("approve_")
                .trim_start_matches("reject_");

            match state
                .admin_service
                .decide(payment_uuid, tg_id, approved, None)
                .await
            {
                Ok(resp) => {
                    let verdict = if approved { "approved ✅" } else { "rejected ❌" };
                    let _ = bot
                        .answer_callback_query(callback_id)
                        .text(format!("Payment {}", verdict))
                        .await;

                    // Buttons are one-shot; drop them once decided.
                    if let Some(msg) = q.message {
                        let _ = bot.edit_message_reply_markup(msg.chat().id, msg.id()).await;
                    }

                    if let Some(user_tg_id) = resp.user_tg_id {
                        let note = if approved {
                            format!(
                                "🎉 <b>Payment verified!</b>\n\nYour <b>{}</b> plan is now active. Enjoy!",
                                escape_html(&resp.payment.plan_type)
                            )
                        } else {
                            format!(
                                "❌ <b>Payment rejected</b>\n\nReason: {}\n\nIf you believe this is a mistake, contact support.",
                                escape_html(
                                    resp.payment
                                        .rejection_reason
                                        .as_deref()
                                        .unwrap_or("Payment verification failed")
                                )
                            )
                        };
                        let _ = bot
                            .send_message(ChatId(user_tg_id), note)
                            .parse_mode(ParseMode::Html)
                            .await;
                    }
                }
                Err(e) => {
                    error!("Failed to decide payment {}: {:?}", payment_uuid, e);
                    let _ = bot
                        .answer_callback_query(callback_id)
                        .text("Payment was already processed or no longer exists.")
                        .show_alert(true)
                        .await;
                }
            }
        }

        _ => {
            let _ = bot.answer_callback_query(callback_id).await;
        }
    }

    Ok(())
}
