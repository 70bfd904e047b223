//! Circle Iris API attestation provider implementation.

use alloy_primitives::B256;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, trace, Instrument};
use url::Url;

use crate::error::{CcipError, Result};
use crate::protocol::AttestationResponse;
use crate::spans;
use crate::traits::AttestationProvider;

/// Seconds to wait when a 429 carries no usable `Retry-After`
const DEFAULT_RETRY_AFTER_SECS: u64 = 300;

/// Attestation provider backed by Circle's Iris API.
///
/// # Examples
///
/// ```rust,no_run
/// use ccip_rs::{AttestationProvider, IrisAttestationProvider};
/// use alloy_primitives::B256;
///
/// # async fn example() -> ccip_rs::Result<()> {
/// let provider = IrisAttestationProvider::sandbox()?;
/// let response = provider.get_attestation(B256::ZERO).await?;
/// println!("{:?}", response.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct IrisAttestationProvider {
    base_url: Url,
    client: Client,
}

impl IrisAttestationProvider {
    /// Creates a provider for the Iris deployment at `base_url`.
    ///
    /// # Errors
    ///
    /// [`CcipError::InvalidConfig`] if `base_url` is not a valid URL.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CcipError::InvalidConfig(format!("invalid Iris URL {base_url}: {e}")))?;
        Ok(Self {
            base_url,
            client: Client::new(),
        })
    }

    /// Circle's production environment
    pub fn production() -> Result<Self> {
        Self::new("https://iris-api.circle.com")
    }

    /// Circle's sandbox (testnet) environment
    pub fn sandbox() -> Result<Self> {
        Self::new("https://iris-api-sandbox.circle.com")
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn attestation_url(&self, message_hash: B256) -> Result<Url> {
        self.base_url
            .join(&format!("v1/attestations/{message_hash}"))
            .map_err(|e| CcipError::InvalidConfig(format!("invalid attestation URL: {e}")))
    }
}

#[async_trait]
impl AttestationProvider for IrisAttestationProvider {
    #[instrument(skip(self), fields(message_hash = %message_hash))]
    async fn get_attestation(&self, message_hash: B256) -> Result<AttestationResponse> {
        let url = self.attestation_url(message_hash)?;
        let span = spans::http_request("GET", &url, None);

        let response = self
            .client
            .get(url.clone())
            .send()
            .instrument(span)
            .await?;

        let status_code = response.status();
        trace!(status_code = %status_code, event = "iris_response_received");

        if status_code == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_seconds = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            debug!(
                retry_after_seconds = retry_after_seconds,
                event = "iris_rate_limited"
            );
            return Err(CcipError::RateLimitExceeded {
                retry_after_seconds,
            });
        }

        if status_code == StatusCode::NOT_FOUND {
            debug!(event = "attestation_not_found");
            return Err(CcipError::AttestationNotFound);
        }

        let body = response.error_for_status()?.text().await?;
        let attestation: AttestationResponse = serde_json::from_str(&body)?;
        debug!(status = ?attestation.status, event = "attestation_response_parsed");
        Ok(attestation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::b256;

    #[test]
    fn test_attestation_url() {
        let provider = IrisAttestationProvider::sandbox().unwrap();
        let hash = b256!("0101010101010101010101010101010101010101010101010101010101010101");
        insta::assert_snapshot!(
            provider.attestation_url(hash).unwrap(),
            @"https://iris-api-sandbox.circle.com/v1/attestations/0x0101010101010101010101010101010101010101010101010101010101010101"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            IrisAttestationProvider::new("not a url"),
            Err(CcipError::InvalidConfig(_))
        ));
    }
}
