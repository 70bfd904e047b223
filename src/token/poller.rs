//! Attestation polling

use alloy_primitives::{Bytes, B256};
use std::time::Duration;
use tracing::{debug, error, info, Instrument};

use crate::config::PollingConfig;
use crate::error::{CcipError, Result};
use crate::protocol::AttestationStatus;
use crate::spans;
use crate::traits::{AttestationProvider, Clock};

/// Polls an [`AttestationProvider`] until an attestation is complete.
///
/// Not-found and pending answers are retried every
/// [`poll_interval`](PollingConfig::poll_interval); a rate-limited request
/// waits as long as the service asks. A failed attestation stops polling.
///
/// # Example
///
/// ```rust,no_run
/// use ccip_rs::{AttestationPoller, PollingConfig, TokioClock};
/// use ccip_rs::testing::FakeAttestationProvider;
/// use alloy_primitives::B256;
///
/// # async fn example() -> ccip_rs::Result<()> {
/// let poller = AttestationPoller::new(
///     FakeAttestationProvider::new(),
///     TokioClock,
///     PollingConfig::fast_transfer(),
/// );
/// let attestation = poller.poll(B256::ZERO).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AttestationPoller<A, C> {
    provider: A,
    clock: C,
    config: PollingConfig,
}

impl<A: AttestationProvider, C: Clock> AttestationPoller<A, C> {
    pub fn new(provider: A, clock: C, config: PollingConfig) -> Self {
        Self {
            provider,
            clock,
            config,
        }
    }

    pub fn config(&self) -> PollingConfig {
        self.config
    }

    /// Returns the attestation bytes for `message_hash`.
    ///
    /// # Errors
    ///
    /// - [`CcipError::AttestationFailed`] if the attester rejected the message
    ///   or reported completion without data
    /// - [`CcipError::AttestationTimeout`] once `max_attempts` is reached
    /// - any non-retryable provider error, unchanged
    pub async fn poll(&self, message_hash: B256) -> Result<Bytes> {
        let span = spans::get_attestation_with_retry(
            &message_hash,
            self.config.max_attempts,
            self.config.poll_interval_secs,
        );
        self.poll_inner(message_hash).instrument(span).await
    }

    async fn poll_inner(&self, message_hash: B256) -> Result<Bytes> {
        let max_attempts = self.config.max_attempts;
        info!(message_hash = %message_hash, event = "attestation_polling_started");

        for attempt in 1..=max_attempts {
            let response = match self
                .provider
                .get_attestation(message_hash)
                .instrument(spans::get_attestation(&message_hash))
                .await
            {
                Ok(response) => response,
                Err(CcipError::RateLimitExceeded {
                    retry_after_seconds,
                }) => {
                    debug!(
                        sleep_secs = retry_after_seconds,
                        attempt = attempt,
                        event = "rate_limit_exceeded"
                    );
                    self.clock
                        .sleep(Duration::from_secs(retry_after_seconds))
                        .await;
                    continue;
                }
                Err(CcipError::AttestationNotFound) => {
                    debug!(attempt = attempt, event = "attestation_not_found");
                    self.clock.sleep(self.config.poll_interval()).await;
                    continue;
                }
                Err(e) => {
                    spans::record_error_with_context(
                        "AttestationRequestFailed",
                        &e.to_string(),
                        Some(&format!("attempt {attempt} of {max_attempts}")),
                    );
                    error!(
                        error = %e,
                        attempt = attempt,
                        event = "attestation_request_failed"
                    );
                    return Err(e);
                }
            };

            match response.status {
                AttestationStatus::Complete => match response.attestation {
                    Some(attestation) => {
                        info!(
                            attestation_length_bytes = attestation.len(),
                            attempt = attempt,
                            event = "attestation_complete"
                        );
                        return Ok(attestation);
                    }
                    None => {
                        spans::record_error_with_context(
                            "AttestationDataMissing",
                            "complete status without attestation bytes",
                            None,
                        );
                        error!(attempt = attempt, event = "attestation_data_missing");
                        return Err(CcipError::AttestationFailed {
                            reason: format!("attestation for {message_hash} is empty"),
                        });
                    }
                },
                AttestationStatus::Failed => {
                    spans::record_error_with_context(
                        "AttestationFailed",
                        "attester rejected the burn",
                        None,
                    );
                    error!(attempt = attempt, event = "attestation_failed");
                    return Err(CcipError::AttestationFailed {
                        reason: format!("attestation for {message_hash} failed"),
                    });
                }
                AttestationStatus::Pending | AttestationStatus::PendingConfirmations => {
                    debug!(
                        attempt = attempt,
                        status = ?response.status,
                        event = "attestation_pending"
                    );
                    self.clock.sleep(self.config.poll_interval()).await;
                }
            }
        }

        let total = self.config.total_timeout_secs();
        spans::record_error_with_context(
            "AttestationTimeout",
            &format!("gave up after {max_attempts} attempts"),
            Some(&format!("{total}s budget")),
        );
        error!(total_duration_secs = total, event = "attestation_timeout");
        Err(CcipError::AttestationTimeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeAttestationProvider, FakeClock};

    fn poller(
        provider: &FakeAttestationProvider,
        clock: &FakeClock,
        max_attempts: u32,
    ) -> AttestationPoller<FakeAttestationProvider, FakeClock> {
        AttestationPoller::new(
            provider.clone(),
            clock.clone(),
            PollingConfig::default()
                .with_max_attempts(max_attempts)
                .with_poll_interval_secs(10),
        )
    }

    #[tokio::test]
    async fn test_pending_then_complete() {
        let provider = FakeAttestationProvider::new();
        let clock = FakeClock::new();
        let hash = B256::repeat_byte(7);
        provider.add_pending_then_complete(hash, 2, Bytes::from_static(&[0xab; 65]));

        let attestation = poller(&provider, &clock, 5).poll(hash).await.unwrap();
        assert_eq!(attestation.len(), 65);
        assert_eq!(clock.sleep_count(), 2);
        assert_eq!(clock.total_sleep_time(), Duration::from_secs(20));
    }

    #[tokio::test]
    async fn test_times_out() {
        let provider = FakeAttestationProvider::new();
        let clock = FakeClock::new();
        let hash = B256::repeat_byte(7);
        provider.add_always_pending(hash);

        let err = poller(&provider, &clock, 3).poll(hash).await.unwrap_err();
        assert!(matches!(err, CcipError::AttestationTimeout));
        assert_eq!(provider.get_call_count(hash), 3);
    }

    #[tokio::test]
    async fn test_not_found_is_retried() {
        let provider = FakeAttestationProvider::new();
        let clock = FakeClock::new();

        let err = poller(&provider, &clock, 4)
            .poll(B256::repeat_byte(9))
            .await
            .unwrap_err();
        assert!(matches!(err, CcipError::AttestationTimeout));
        assert_eq!(clock.sleep_count(), 4);
    }

    #[tokio::test]
    async fn test_failed_stops_polling() {
        let provider = FakeAttestationProvider::new();
        let clock = FakeClock::new();
        let hash = B256::repeat_byte(7);
        provider.add_failed_response(hash);

        let err = poller(&provider, &clock, 5).poll(hash).await.unwrap_err();
        assert!(matches!(err, CcipError::AttestationFailed { .. }));
        assert_eq!(clock.sleep_count(), 0);
    }
}
