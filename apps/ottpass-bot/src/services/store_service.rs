use crate::api_client::ApiClient;
use crate::models::store::{PlanOffer, QuotaInfo, Subscription, UpsertUserResponse, User};
use anyhow::Result;

#[derive(Clone)]
pub struct StoreService {
    api: ApiClient,
}

impl StoreService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn get_user_by_tg_id(&self, tg_id: i64) -> Result<Option<User>> {
        self.api
            .get::<Option<User>>(&format!("/users/tg/{}", tg_id))
            .await
    }

    pub async fn upsert_user(
        &self,
        tg_id: i64,
        username: Option<&str>,
        full_name: Option<&str>,
        referral_code: Option<&str>,
    ) -> Result<UpsertUserResponse> {
        #[derive(serde::Serialize)]
        struct UpsertReq<'a> {
            tg_id: i64,
            username: Option<&'a str>,
            full_name: Option<&'a str>,
            referral_code: Option<&'a str>,
        }
        let req = UpsertReq {
            tg_id,
            username,
            full_name,
            referral_code,
        };
        self.api.post::<UpsertUserResponse, _>("/users", &req).await
    }

    pub async fn get_plans(&self) -> Result<Vec<PlanOffer>> {
        self.api.get::<Vec<PlanOffer>>("/plans").await
    }

    pub async fn get_user_subscriptions(&self, user_id: i64) -> Result<Vec<Subscription>> {
        self.api
            .get::<Vec<Subscription>>(&format!("/users/{}/subs", user_id))
            .await
    }

    pub async fn get_quota(&self, tg_id: i64) -> Result<QuotaInfo> {
        self.api.get::<QuotaInfo>(&format!("/quota/{}", tg_id)).await
    }
}
