pub mod payment;
pub mod plan;
pub mod referral;
pub mod subscription;
pub mod usage;
pub mod user;
