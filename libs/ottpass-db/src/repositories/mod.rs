pub mod payment_repo;
pub mod referral_repo;
pub mod subscription_repo;
pub mod usage_repo;
pub mod user_repo;

pub use payment_repo::PaymentRepository;
pub use referral_repo::ReferralRepository;
pub use subscription_repo::SubscriptionRepository;
pub use usage_repo::UsageRepository;
pub use user_repo::UserRepository;
