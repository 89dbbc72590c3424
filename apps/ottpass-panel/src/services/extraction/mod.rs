use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

pub mod mock;

#[derive(Debug, Clone, Serialize)]
pub struct ContentKey {
    pub kid: String,
    pub key: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    pub keys: Vec<ContentKey>,
    pub pssh: String,
    pub license_url: String,
    pub extractor: String,
}

/// Capability seam for DRM key retrieval. The payment and referral core has
/// no dependency on this; swapping the implementation never touches them.
#[async_trait]
pub trait KeyExtractor: Send + Sync {
    async fn extract(&self, pssh: &str, license_url: &str) -> Result<ExtractionResult>;

    fn name(&self) -> &str;
}
