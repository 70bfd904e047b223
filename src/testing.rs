//! Test utilities and fake implementations of the pipeline's seams
//!
//! These fakes stand in for token pools, receiver contracts, the attestation
//! API and the wall clock so that the OnRamp, commit store and OffRamp can
//! be exercised end to end, including adversarial cases: pools that fail
//! mid-message, receivers that revert, hang or burn all their gas,
//! attestations that stay pending, and commits that go stale.

use alloy_primitives::{keccak256, Bytes, B256, U256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::token::{LockOrBurnIn, LockOrBurnOut, ReleaseOrMintIn, ReleaseOrMintOut};
use crate::traits::{
    AttestationProvider, Clock, MessageReceiver, ReceivedMessage, ReceiverReceipt, ReceiverRevert,
    TokenPool,
};
use crate::{Address, AttestationResponse, AttestationStatus, CcipError, Result};

// ============================================================================
// Fake Token Pool
// ============================================================================

/// In-memory token pool with switchable failures.
///
/// Failing `lock_or_burn` checks that a rejected send leaves no trace;
/// failing `release_or_mint` and then switching it off drives manual
/// recovery. [`minted`](Self::minted) shows whether retries minted twice.
#[derive(Debug)]
pub struct FakeTokenPool {
    token: Address,
    pool_address: Address,
    dest_token: Address,
    fail_lock_or_burn: AtomicBool,
    hang_lock_or_burn: AtomicBool,
    fail_release_or_mint: AtomicBool,
    locked: Mutex<U256>,
    minted: Mutex<U256>,
    lock_calls: AtomicUsize,
    release_calls: AtomicUsize,
    rollbacks: AtomicUsize,
    last_offchain_token_data: Mutex<Option<Bytes>>,
}

impl FakeTokenPool {
    /// Pool for `token`; the pool address is derived from the token and the
    /// destination token defaults to the same address
    pub fn new(token: Address) -> Self {
        let derived = keccak256(token.as_bytes());
        let pool_address = Address::evm(alloy_primitives::Address::from_word(derived));
        Self {
            dest_token: token.clone(),
            token,
            pool_address,
            fail_lock_or_burn: AtomicBool::new(false),
            hang_lock_or_burn: AtomicBool::new(false),
            fail_release_or_mint: AtomicBool::new(false),
            locked: Mutex::new(U256::ZERO),
            minted: Mutex::new(U256::ZERO),
            lock_calls: AtomicUsize::new(0),
            release_calls: AtomicUsize::new(0),
            rollbacks: AtomicUsize::new(0),
            last_offchain_token_data: Mutex::new(None),
        }
    }

    /// Token that `lock_or_burn` reports for the destination chain
    pub fn with_dest_token(mut self, dest_token: Address) -> Self {
        self.dest_token = dest_token;
        self
    }

    pub fn with_pool_address(mut self, pool_address: Address) -> Self {
        self.pool_address = pool_address;
        self
    }

    pub fn set_fail_lock_or_burn(&self, fail: bool) {
        self.fail_lock_or_burn.store(fail, Ordering::SeqCst);
    }

    /// `lock_or_burn` never returns, so only cancelling the send ends it
    pub fn set_hang_lock_or_burn(&self, hang: bool) {
        self.hang_lock_or_burn.store(hang, Ordering::SeqCst);
    }

    pub fn set_fail_release_or_mint(&self, fail: bool) {
        self.fail_release_or_mint.store(fail, Ordering::SeqCst);
    }

    /// Net amount locked or burned, after rollbacks
    pub fn locked(&self) -> U256 {
        *self.locked.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Net amount released or minted, after rollbacks
    pub fn minted(&self) -> U256 {
        *self.minted.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn lock_or_burn_calls(&self) -> usize {
        self.lock_calls.load(Ordering::SeqCst)
    }

    pub fn release_or_mint_calls(&self) -> usize {
        self.release_calls.load(Ordering::SeqCst)
    }

    pub fn rollback_count(&self) -> usize {
        self.rollbacks.load(Ordering::SeqCst)
    }

    /// Off-chain data passed to the most recent successful mint
    pub fn last_offchain_token_data(&self) -> Option<Bytes> {
        self.last_offchain_token_data.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl TokenPool for FakeTokenPool {
    fn token(&self) -> Address {
        self.token.clone()
    }

    fn pool_address(&self) -> Address {
        self.pool_address.clone()
    }

    async fn lock_or_burn(&self, input: LockOrBurnIn) -> Result<LockOrBurnOut> {
        self.lock_calls.fetch_add(1, Ordering::SeqCst);
        if self.hang_lock_or_burn.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.fail_lock_or_burn.load(Ordering::SeqCst) {
            return Err(CcipError::TokenHandlingError {
                reason: "simulated lock_or_burn failure".to_string(),
            });
        }

        *self.locked.lock().unwrap_or_else(PoisonError::into_inner) += input.amount;
        Ok(LockOrBurnOut {
            dest_token_address: self.dest_token.clone(),
            dest_pool_data: Bytes::new(),
        })
    }

    async fn release_or_mint(&self, input: ReleaseOrMintIn) -> Result<ReleaseOrMintOut> {
        self.release_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_release_or_mint.load(Ordering::SeqCst) {
            return Err(CcipError::TokenHandlingError {
                reason: "simulated release_or_mint failure".to_string(),
            });
        }

        *self.minted.lock().unwrap_or_else(PoisonError::into_inner) += input.amount;
        *self.last_offchain_token_data.lock().unwrap_or_else(PoisonError::into_inner) = Some(input.offchain_token_data);
        Ok(ReleaseOrMintOut {
            destination_amount: input.amount,
        })
    }

    async fn rollback_lock_or_burn(&self, input: &LockOrBurnIn) -> Result<()> {
        self.rollbacks.fetch_add(1, Ordering::SeqCst);
        let mut locked = self.locked.lock().unwrap_or_else(PoisonError::into_inner);
        *locked = locked.saturating_sub(input.amount);
        Ok(())
    }

    async fn rollback_release_or_mint(&self, input: &ReleaseOrMintIn) -> Result<()> {
        self.rollbacks.fetch_add(1, Ordering::SeqCst);
        let mut minted = self.minted.lock().unwrap_or_else(PoisonError::into_inner);
        *minted = minted.saturating_sub(input.amount);
        Ok(())
    }
}

// ============================================================================
// Fake Receiver
// ============================================================================

/// How a [`FakeReceiver`] answers `ccip_receive`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiverBehavior {
    Accept { gas_used: u64 },
    Revert { gas_used: u64, return_data: Bytes },
    /// Never returns; only the OffRamp's timeout ends the call
    Hang,
}

/// A receiver contract that records every message it is handed.
#[derive(Debug)]
pub struct FakeReceiver {
    behavior: Mutex<ReceiverBehavior>,
    received: Mutex<Vec<ReceivedMessage>>,
}

impl Default for FakeReceiver {
    fn default() -> Self {
        Self::with_behavior(ReceiverBehavior::Accept { gas_used: 50_000 })
    }
}

impl FakeReceiver {
    /// A receiver that accepts every message using 50k gas
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behavior(behavior: ReceiverBehavior) -> Self {
        Self {
            behavior: Mutex::new(behavior),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn reverting(return_data: impl Into<Bytes>) -> Self {
        Self::with_behavior(ReceiverBehavior::Revert {
            gas_used: 30_000,
            return_data: return_data.into(),
        })
    }

    pub fn set_behavior(&self, behavior: ReceiverBehavior) {
        *self.behavior.lock().unwrap_or_else(PoisonError::into_inner) = behavior;
    }

    /// Messages handed to the receiver, including ones it reverted on
    pub fn received(&self) -> Vec<ReceivedMessage> {
        self.received.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn call_count(&self) -> usize {
        self.received.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait]
impl MessageReceiver for FakeReceiver {
    async fn ccip_receive(
        &self,
        message: ReceivedMessage,
    ) -> std::result::Result<ReceiverReceipt, ReceiverRevert> {
        self.received.lock().unwrap_or_else(PoisonError::into_inner).push(message);
        let behavior = self.behavior.lock().unwrap_or_else(PoisonError::into_inner).clone();
        match behavior {
            ReceiverBehavior::Accept { gas_used } => Ok(ReceiverReceipt::new(gas_used)),
            ReceiverBehavior::Revert {
                gas_used,
                return_data,
            } => Err(ReceiverRevert::new(gas_used, return_data)),
            ReceiverBehavior::Hang => std::future::pending().await,
        }
    }
}

// ============================================================================
// Fake Attestation Provider
// ============================================================================

#[derive(Debug, Default)]
struct Script {
    responses: Vec<AttestationResponse>,
    calls: usize,
}

/// Scripted stand-in for the Iris API.
///
/// Each hash gets a list of responses served in order, with the last one
/// repeating forever. Hashes without a script answer
/// [`CcipError::AttestationNotFound`], like a 404 for a burn Circle has not
/// seen yet.
#[derive(Clone, Debug, Default)]
pub struct FakeAttestationProvider {
    scripts: Arc<Mutex<HashMap<B256, Script>>>,
}

impl FakeAttestationProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the script for `message_hash` and resets its call count
    pub fn add_response_sequence(&self, message_hash: B256, responses: Vec<AttestationResponse>) {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(message_hash, Script { responses, calls: 0 });
    }

    pub fn add_complete_response(&self, message_hash: B256, attestation: Bytes) {
        self.add_pending_then_complete(message_hash, 0, attestation);
    }

    pub fn add_failed_response(&self, message_hash: B256) {
        self.add_response_sequence(message_hash, vec![status_only(AttestationStatus::Failed)]);
    }

    /// Circle never finishes this one
    pub fn add_always_pending(&self, message_hash: B256) {
        self.add_response_sequence(message_hash, vec![status_only(AttestationStatus::Pending)]);
    }

    pub fn add_pending_then_complete(
        &self,
        message_hash: B256,
        pending_count: usize,
        attestation: Bytes,
    ) {
        let complete = AttestationResponse {
            status: AttestationStatus::Complete,
            attestation: Some(attestation),
        };
        let responses = std::iter::repeat_with(|| status_only(AttestationStatus::Pending))
            .take(pending_count)
            .chain(std::iter::once(complete))
            .collect();
        self.add_response_sequence(message_hash, responses);
    }

    /// Lookups served for `message_hash` since its script was set
    pub fn get_call_count(&self, message_hash: B256) -> usize {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&message_hash)
            .map_or(0, |script| script.calls)
    }
}

fn status_only(status: AttestationStatus) -> AttestationResponse {
    AttestationResponse {
        status,
        attestation: None,
    }
}

#[async_trait]
impl AttestationProvider for FakeAttestationProvider {
    async fn get_attestation(&self, message_hash: B256) -> Result<AttestationResponse> {
        let mut scripts = self.scripts.lock().unwrap_or_else(PoisonError::into_inner);
        let script = scripts
            .get_mut(&message_hash)
            .ok_or(CcipError::AttestationNotFound)?;
        let position = script.calls.min(script.responses.len().saturating_sub(1));
        script.calls += 1;
        script
            .responses
            .get(position)
            .cloned()
            .ok_or(CcipError::AttestationNotFound)
    }
}

// ============================================================================
// Fake Clock
// ============================================================================

#[derive(Debug)]
struct ClockState {
    now: Instant,
    sleeps: Vec<Duration>,
}

/// Manual clock: `sleep` records the duration and jumps time forward
/// instead of waiting, and [`advance`](Self::advance) ages commits on demand.
/// Clones share the same timeline.
#[derive(Clone, Debug)]
pub struct FakeClock {
    state: Arc<Mutex<ClockState>>,
}

impl Default for FakeClock {
    fn default() -> Self {
        let state = ClockState {
            now: Instant::now(),
            sleeps: Vec::new(),
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).now += by;
    }

    /// Sum of every duration passed to `sleep`
    pub fn total_sleep_time(&self) -> Duration {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).sleeps.iter().sum()
    }

    pub fn sleep_count(&self) -> usize {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).sleeps.len()
    }
}

#[async_trait]
impl Clock for FakeClock {
    async fn sleep(&self, duration: Duration) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.sleeps.push(duration);
        state.now += duration;
    }

    fn now(&self) -> Instant {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChainSelector;
    use alloy_primitives::address;

    fn token() -> Address {
        Address::evm(address!("00000000000000000000000000000000000000aa"))
    }

    fn release(amount: u64) -> ReleaseOrMintIn {
        ReleaseOrMintIn::builder()
            .remote_chain_selector(ChainSelector::new(1))
            .original_sender(token())
            .receiver(token())
            .amount(U256::from(amount))
            .local_token(token())
            .source_pool_address(token())
            .build()
    }

    #[tokio::test]
    async fn test_fake_clock_tracks_sleep_calls() {
        let clock = FakeClock::new();
        let start = clock.now();

        clock.sleep(Duration::from_secs(60)).await;
        clock.sleep(Duration::from_secs(120)).await;

        assert_eq!(clock.sleep_count(), 2);
        assert_eq!(clock.total_sleep_time(), Duration::from_secs(180));
        assert_eq!(clock.now() - start, Duration::from_secs(180));
    }

    #[tokio::test]
    async fn test_fake_attestation_provider_sequence() {
        let provider = FakeAttestationProvider::new();
        let message_hash = B256::repeat_byte(1);
        provider.add_pending_then_complete(message_hash, 1, Bytes::from_static(&[0xde, 0xad]));

        let first = provider.get_attestation(message_hash).await.unwrap();
        assert_eq!(first.status, AttestationStatus::Pending);

        let second = provider.get_attestation(message_hash).await.unwrap();
        assert_eq!(second.status, AttestationStatus::Complete);

        let third = provider.get_attestation(message_hash).await.unwrap();
        assert_eq!(third.status, AttestationStatus::Complete);
        assert_eq!(provider.get_call_count(message_hash), 3);
    }

    #[tokio::test]
    async fn test_fake_attestation_provider_not_found() {
        let provider = FakeAttestationProvider::new();
        let result = provider.get_attestation(B256::repeat_byte(1)).await;
        assert!(matches!(result, Err(CcipError::AttestationNotFound)));
    }

    #[tokio::test]
    async fn test_fake_pool_mint_and_rollback() {
        let pool = FakeTokenPool::new(token());
        pool.release_or_mint(release(100)).await.unwrap();
        assert_eq!(pool.minted(), U256::from(100));

        pool.rollback_release_or_mint(&release(100)).await.unwrap();
        assert_eq!(pool.minted(), U256::ZERO);
        assert_eq!(pool.rollback_count(), 1);
    }

    #[tokio::test]
    async fn test_fake_pool_failure_switch() {
        let pool = FakeTokenPool::new(token());
        pool.set_fail_release_or_mint(true);
        assert!(pool.release_or_mint(release(5)).await.is_err());
        pool.set_fail_release_or_mint(false);
        assert!(pool.release_or_mint(release(5)).await.is_ok());
        assert_eq!(pool.release_or_mint_calls(), 2);
        assert_eq!(pool.minted(), U256::from(5));
    }

    #[tokio::test]
    async fn test_fake_receiver_records_reverts() {
        let receiver = FakeReceiver::reverting(vec![0x08, 0xc3, 0x79, 0xa0]);
        let message = ReceivedMessage {
            message_id: B256::ZERO,
            source_chain_selector: ChainSelector::new(1),
            sender: token(),
            data: Bytes::new(),
            dest_token_amounts: vec![],
        };
        let revert = receiver.ccip_receive(message).await.unwrap_err();
        assert_eq!(revert.return_data.len(), 4);
        assert_eq!(receiver.call_count(), 1);
    }
}
