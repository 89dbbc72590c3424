use crate::api_client::ApiClient;
use crate::models::payment::{AttachScreenshotResponse, Payment};
use anyhow::Result;

#[derive(Clone)]
pub struct PayService {
    api: ApiClient,
}

impl PayService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn create_payment(&self, tg_id: i64, plan_code: &str) -> Result<Payment> {
        #[derive(serde::Serialize)]
        struct CreateReq<'a> {
            tg_id: i64,
            plan_code: &'a str,
        }
        self.api
            .post::<Payment, _>("/payments", &CreateReq { tg_id, plan_code })
            .await
    }

    pub async fn user_payments(&self, user_id: i64, limit: i64) -> Result<Vec<Payment>> {
        self.api
            .get::<Vec<Payment>>(&format!("/users/{}/payments?limit={}", user_id, limit))
            .await
    }

    pub async fn attach_screenshot(
        &self,
        payment_uuid: &str,
        file_id: &str,
        file_url: Option<&str>,
    ) -> Result<bool> {
        #[derive(serde::Serialize)]
        struct AttachReq<'a> {
            file_id: &'a str,
            file_url: Option<&'a str>,
        }
        let resp: AttachScreenshotResponse = self
            .api
            .post(
                &format!("/payments/{}/screenshot", payment_uuid),
                &AttachReq { file_id, file_url },
            )
            .await?;
        Ok(resp.attached)
    }
}
