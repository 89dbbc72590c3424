use crate::api_client::ApiClient;
use crate::models::payment::ClaimResponse;
use crate::models::store::{ReferralEntry, ReferralOverview};
use anyhow::Result;

#[derive(Clone)]
pub struct ReferralService {
    api: ApiClient,
}

impl ReferralService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn overview(&self, tg_id: i64) -> Result<ReferralOverview> {
        self.api
            .get::<ReferralOverview>(&format!("/referrals/{}", tg_id))
            .await
    }

    pub async fn list(&self, tg_id: i64, limit: i64) -> Result<Vec<ReferralEntry>> {
        self.api
            .get::<Vec<ReferralEntry>>(&format!("/referrals/{}/list?limit={}", tg_id, limit))
            .await
    }

    pub async fn claim(&self, tg_id: i64) -> Result<ClaimResponse> {
        self.api
            .post::<ClaimResponse, _>(
                &format!("/referrals/{}/claim", tg_id),
                &serde_json::json!({}),
            )
            .await
    }
}
