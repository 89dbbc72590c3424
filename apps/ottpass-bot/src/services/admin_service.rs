use crate::api_client::ApiClient;
use crate::models::payment::{DecideResponse, Payment};
use anyhow::Result;

#[derive(Clone)]
pub struct AdminService {
    api: ApiClient,
}

impl AdminService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn pending_payments(&self, limit: i64) -> Result<Vec<Payment>> {
        self.api
            .get::<Vec<Payment>>(&format!("/payments/pending?limit={}", limit))
            .await
    }

    pub async fn get_payment(&self, payment_uuid: &str) -> Result<Payment> {
        self.api
            .get::<Payment>(&format!("/payments/{}", payment_uuid))
            .await
    }

    pub async fn decide(
        &self,
        payment_uuid: &str,
        admin_tg_id: i64,
        approved: bool,
        reason: Option<&str>,
    ) -> Result<DecideResponse> {
        #[derive(serde::Serialize)]
        struct DecideReq<'a> {
            admin_tg_id: i64,
            approved: bool,
            reason: Option<&'a str>,
        }
        self.api
            .post::<DecideResponse, _>(
                &format!("/payments/{}/decide", payment_uuid),
                &DecideReq {
                    admin_tg_id,
                    approved,
                    reason,
                },
            )
            .await
    }
}
