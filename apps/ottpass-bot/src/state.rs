use std::sync::{Arc, OnceLock};

use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

use crate::services::admin_service::AdminService;
use crate::services::pay_service::PayService;
use crate::services::referral_service::ReferralService;
use crate::services::store_service::StoreService;

#[derive(Clone)]
pub struct AppState {
    pub store_service: StoreService,
    pub pay_service: PayService,
    pub referral_service: ReferralService,
    pub admin_service: AdminService,
    pub admin_tg_ids: Vec<i64>,
    pub bot_username: Arc<OnceLock<String>>,
}

impl AppState {
    pub fn is_admin(&self, tg_id: i64) -> bool {
        self.admin_tg_ids.contains(&tg_id)
    }
}

/// Multi-step conversation position for one chat. Lives in the dispatcher's
/// dialogue storage, never in a process-wide map.
#[derive(Clone, Default)]
pub enum ChatState {
    #[default]
    Idle,
    /// The user tapped "I've Paid" and the next photo they send is the
    /// proof for this payment.
    AwaitingScreenshot { payment_uuid: String },
}

pub type ChatDialogue = Dialogue<ChatState, InMemStorage<ChatState>>;
