pub mod admin_service;
pub mod pay_service;
pub mod referral_service;
pub mod store_service;
