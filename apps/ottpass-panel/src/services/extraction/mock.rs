use anyhow::Result;
use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::{ContentKey, ExtractionResult, KeyExtractor};

/// Stand-in extractor that fabricates key material deterministically from
/// the request. It never talks to a license server.
#[derive(Debug, Clone, Default)]
pub struct MockExtractor;

fn synth_key(pssh: &str, license_url: &str, index: u8) -> ContentKey {
    let mut hasher = Sha256::new();
    hasher.update(pssh.as_bytes());
    hasher.update(license_url.as_bytes());
    hasher.update([index]);
    let digest = hex::encode(hasher.finalize());

    ContentKey {
        kid: digest[..32].to_string(),
        key: digest[32..64].to_string(),
    }
}

#[async_trait]
impl KeyExtractor for MockExtractor {
    async fn extract(&self, pssh: &str, license_url: &str) -> Result<ExtractionResult> {
        if pssh.trim().is_empty() {
            return Err(anyhow::anyhow!("PSSH must not be empty"));
        }

        let keys = (0..2).map(|i| synth_key(pssh, license_url, i)).collect();

        Ok(ExtractionResult {
            keys,
            pssh: pssh.to_string(),
            license_url: license_url.to_string(),
            extractor: self.name().to_string(),
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn extraction_is_deterministic() {
        let extractor = MockExtractor;
        let a = extractor.extract("AAAAQnBzc2g", "https://lic.example/wv").await.unwrap();
        let b = extractor.extract("AAAAQnBzc2g", "https://lic.example/wv").await.unwrap();
        assert_eq!(a.keys.len(), 2);
        assert_eq!(a.keys[0].kid, b.keys[0].kid);
        assert_eq!(a.keys[0].key, b.keys[0].key);
        assert_ne!(a.keys[0].kid, a.keys[1].kid);
    }

    #[tokio::test]
    async fn empty_pssh_is_rejected() {
        let extractor = MockExtractor;
        assert!(extractor.extract("  ", "https://lic.example/wv").await.is_err());
    }
}
