use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup};

use crate::bot::utils::fmt_inr;
use crate::models::store::PlanOffer;

pub fn main_menu() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![
            KeyboardButton::new("🛍 Buy Subscription"),
            KeyboardButton::new("📦 My Plans"),
        ],
        vec![
            KeyboardButton::new("🎁 Referrals"),
            KeyboardButton::new("📊 My Quota"),
        ],
        vec![KeyboardButton::new("❓ Help")],
    ])
    .resize_keyboard()
}

pub fn plans_keyboard(plans: &[PlanOffer]) -> InlineKeyboardMarkup {
    let rows = plans
        .iter()
        .map(|p| {
            vec![InlineKeyboardButton::callback(
                format!("{} — {}", p.name, fmt_inr(p.price)),
                format!("plan_{}", p.code),
            )]
        })
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(rows)
}

pub fn payment_confirmation_keyboard(payment_uuid: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "✅ I've Paid",
            format!("paid_{}", payment_uuid),
        )],
        vec![InlineKeyboardButton::callback("❌ Cancel", "cancel_payment")],
    ])
}

pub fn admin_review_keyboard(payment_uuid: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("✅ Approve", format!("approve_{}", payment_uuid)),
        InlineKeyboardButton::callback("❌ Reject", format!("reject_{}", payment_uuid)),
    ]])
}

pub fn referral_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "🎁 Claim Reward",
        "claim_reward",
    )]])
}
