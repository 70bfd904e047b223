//! Attestation-gated USDC pool
//!
//! USDC lanes burn through Circle's CCTP on the source chain and mint on the
//! destination only once Circle has attested the burn. The pool wraps a plain
//! burn/mint pool and adds the CCTP bookkeeping around it:
//!
//! - on burn, it emits a [`CctpMessage`] and stores `(nonce, sourceDomain)`
//!   in the transfer's `extraData`;
//! - on mint, it checks the presented CCTP message against that payload and
//!   asks the [`AttestationProvider`] for the attestation before delegating.
//!
//! A missing attestation is retryable: the execution is marked failed and
//! manual execution mints once Circle catches up.

use alloy_primitives::{Bytes, B256};
use alloy_sol_types::SolValue;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::{debug, error, info, Instrument};

use super::{LockOrBurnIn, LockOrBurnOut, ReleaseOrMintIn, ReleaseOrMintOut};
use crate::error::{CcipError, Result};
use crate::protocol::{
    Address, AttestationStatus, CctpMessage, ChainSelector, DomainId, MessageAndAttestation,
    SourceTokenDataPayload, SUPPORTED_CCTP_VERSION,
};
use crate::spans;
use crate::traits::{AttestationProvider, TokenPool};

pub struct UsdcTokenPool<A: AttestationProvider> {
    inner: std::sync::Arc<dyn TokenPool>,
    attestation_provider: A,
    local_domain: DomainId,
    domains: HashMap<ChainSelector, DomainId>,
    next_nonce: AtomicU64,
    sent_messages: Mutex<BTreeMap<u64, Burn>>,
}

/// A burn whose CCTP message is still live
struct Burn {
    input: LockOrBurnIn,
    message: Bytes,
}

impl<A: AttestationProvider> UsdcTokenPool<A> {
    /// Wraps `inner`; remote chains are mapped to CCTP domains by selector
    /// unless overridden with [`with_domain`](Self::with_domain).
    pub fn new(
        inner: std::sync::Arc<dyn TokenPool>,
        attestation_provider: A,
        local_domain: DomainId,
    ) -> Self {
        Self {
            inner,
            attestation_provider,
            local_domain,
            domains: HashMap::new(),
            next_nonce: AtomicU64::new(1),
            sent_messages: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn with_domain(mut self, chain_selector: ChainSelector, domain: DomainId) -> Self {
        self.domains.insert(chain_selector, domain);
        self
    }

    pub fn local_domain(&self) -> DomainId {
        self.local_domain
    }

    pub fn domain_for(&self, chain_selector: ChainSelector) -> Option<DomainId> {
        self.domains
            .get(&chain_selector)
            .copied()
            .or_else(|| DomainId::for_chain_selector(chain_selector))
    }

    /// CCTP message emitted for a burn, as an off-chain relayer would read
    /// it from the `MessageSent` log
    pub fn cctp_message(&self, nonce: u64) -> Option<Bytes> {
        self.sent_messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&nonce)
            .map(|burn| burn.message.clone())
    }

    /// Checks that a presented CCTP message belongs to this transfer
    fn validate_message(
        &self,
        message: &CctpMessage,
        payload: &SourceTokenDataPayload,
    ) -> Result<()> {
        let reason = if message.version != SUPPORTED_CCTP_VERSION {
            format!("unsupported CCTP version {}", message.version)
        } else if message.source_domain != payload.source_domain {
            format!(
                "source domain {} does not match payload {}",
                message.source_domain, payload.source_domain
            )
        } else if message.destination_domain != self.local_domain {
            format!(
                "destination domain {} is not local {}",
                message.destination_domain, self.local_domain
            )
        } else if message.nonce != payload.nonce {
            format!(
                "nonce {} does not match payload {}",
                message.nonce, payload.nonce
            )
        } else {
            return Ok(());
        };
        Err(CcipError::AttestationFailed { reason })
    }

    async fn fetch_attestation(&self, message_hash: B256) -> Result<Bytes> {
        let span = spans::get_attestation(&message_hash);
        self.fetch_attestation_inner(message_hash)
            .instrument(span)
            .await
    }

    async fn fetch_attestation_inner(&self, message_hash: B256) -> Result<Bytes> {
        let response = match self.attestation_provider.get_attestation(message_hash).await {
            Ok(response) => response,
            Err(CcipError::AttestationNotFound) | Err(CcipError::RateLimitExceeded { .. }) => {
                debug!(message_hash = %message_hash, event = "attestation_not_ready");
                return Err(CcipError::AttestationPending { message_hash });
            }
            Err(e) => {
                spans::record_error(&e);
                return Err(e);
            }
        };

        match response.status {
            AttestationStatus::Complete => response.attestation.ok_or_else(|| {
                spans::record_error_with_context(
                    "AttestationDataMissing",
                    "complete status without attestation bytes",
                    None,
                );
                error!(message_hash = %message_hash, event = "attestation_data_missing");
                CcipError::AttestationFailed {
                    reason: format!("attestation for {message_hash} is empty"),
                }
            }),
            AttestationStatus::Failed => {
                error!(message_hash = %message_hash, event = "attestation_failed");
                Err(CcipError::AttestationFailed {
                    reason: format!("attestation for {message_hash} failed"),
                })
            }
            AttestationStatus::Pending | AttestationStatus::PendingConfirmations => {
                debug!(
                    message_hash = %message_hash,
                    status = ?response.status,
                    event = "attestation_pending"
                );
                Err(CcipError::AttestationPending { message_hash })
            }
        }
    }
}

#[async_trait]
impl<A: AttestationProvider> TokenPool for UsdcTokenPool<A> {
    fn token(&self) -> Address {
        self.inner.token()
    }

    fn pool_address(&self) -> Address {
        self.inner.pool_address()
    }

    async fn lock_or_burn(&self, input: LockOrBurnIn) -> Result<LockOrBurnOut> {
        let destination_domain = self.domain_for(input.remote_chain_selector).ok_or_else(|| {
            CcipError::UnsupportedDestinationChain {
                dest_chain_selector: input.remote_chain_selector,
            }
        })?;

        let out = self.inner.lock_or_burn(input.clone()).await?;

        let nonce = self.next_nonce.fetch_add(1, Ordering::SeqCst);
        let message = CctpMessage {
            version: SUPPORTED_CCTP_VERSION,
            source_domain: self.local_domain,
            destination_domain,
            nonce,
            sender: left_pad(self.inner.pool_address().as_bytes()),
            recipient: left_pad(input.receiver.as_bytes()),
            destination_caller: B256::ZERO,
            body: Bytes::from((input.amount, left_pad(input.original_sender.as_bytes())).abi_encode()),
        };
        self.sent_messages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(
                nonce,
                Burn {
                    input: input.clone(),
                    message: message.encode(),
                },
            );

        info!(
            nonce = nonce,
            source_domain = %self.local_domain,
            destination_domain = %destination_domain,
            amount = %input.amount,
            event = "cctp_burn"
        );

        let payload = SourceTokenDataPayload {
            nonce,
            source_domain: self.local_domain,
        };
        Ok(LockOrBurnOut {
            dest_token_address: out.dest_token_address,
            dest_pool_data: Bytes::from(payload.encode()),
        })
    }

    async fn release_or_mint(&self, input: ReleaseOrMintIn) -> Result<ReleaseOrMintOut> {
        let payload = SourceTokenDataPayload::decode(&input.source_pool_data)?;
        if input.offchain_token_data.is_empty() {
            return Err(CcipError::TokenHandlingError {
                reason: format!("missing CCTP message for nonce {}", payload.nonce),
            });
        }
        let message = CctpMessage::decode(&input.offchain_token_data)?;
        self.validate_message(&message, &payload)?;

        let attestation = self.fetch_attestation(message.hash()).await?;

        info!(
            nonce = payload.nonce,
            source_domain = %payload.source_domain,
            attestation_length_bytes = attestation.len(),
            event = "cctp_attestation_complete"
        );

        let offchain_token_data = MessageAndAttestation {
            message: message.encode(),
            attestation,
        }
        .encode();
        self.inner
            .release_or_mint(ReleaseOrMintIn {
                offchain_token_data,
                ..input
            })
            .await
    }

    async fn rollback_lock_or_burn(&self, input: &LockOrBurnIn) -> Result<()> {
        self.inner.rollback_lock_or_burn(input).await?;

        // Rollbacks run newest first, so the latest matching burn is the one undone
        let mut sent = self.sent_messages.lock().unwrap_or_else(|e| e.into_inner());
        let nonce = sent
            .iter()
            .rev()
            .find(|(_, burn)| burn.input == *input)
            .map(|(nonce, _)| *nonce);
        if let Some(nonce) = nonce {
            sent.remove(&nonce);
            debug!(nonce = nonce, event = "cctp_burn_rolled_back");
        }
        Ok(())
    }

    async fn rollback_release_or_mint(&self, input: &ReleaseOrMintIn) -> Result<()> {
        self.inner.rollback_release_or_mint(input).await
    }
}

fn left_pad(bytes: &[u8]) -> B256 {
    let mut word = [0u8; 32];
    let len = bytes.len().min(32);
    word[32 - len..].copy_from_slice(&bytes[bytes.len() - len..]);
    B256::from(word)
}
