pub mod catalog_service;
pub mod extraction;
pub mod payment_service;
pub mod quota_service;
pub mod referral_service;
