//! Core trait abstractions for the CCIP pipeline.
//!
//! The OnRamp, commit store and OffRamp never talk to a chain, a token
//! contract, a receiver contract, an attestation API, or the wall clock
//! directly. Every such collaborator sits behind one of the traits below so
//! that tests can swap in fakes from [`crate::testing`] and simulate pool
//! failures, reverting receivers, pending attestations or stale commits.
//!
//! # Example: Implementing a Test Fake
//!
//! ```rust,ignore
//! use ccip_rs::{MessageReceiver, ReceivedMessage, ReceiverReceipt, ReceiverRevert};
//!
//! struct AlwaysReverts;
//!
//! #[async_trait::async_trait]
//! impl MessageReceiver for AlwaysReverts {
//!     async fn ccip_receive(&self, _message: ReceivedMessage)
//!         -> Result<ReceiverReceipt, ReceiverRevert> {
//!         Err(ReceiverRevert::new(21_000, vec![0x08, 0xc3, 0x79, 0xa0]))
//!     }
//! }
//! ```

use alloy_primitives::{Bytes, B256};
use async_trait::async_trait;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::events::Cursor;
use crate::protocol::{Address, AttestationResponse, ChainSelector, TokenAmount};
use crate::token::{LockOrBurnIn, LockOrBurnOut, ReleaseOrMintIn, ReleaseOrMintOut};

/// A pool moving one token across lanes.
///
/// Lock/unlock, burn/mint and attested (CCTP) pools all implement this.
/// Since nothing here can revert a whole transaction, pools also expose
/// compensation hooks: when a later transfer in the same message or the
/// receiver callback fails, the already-applied transfers are undone
/// through them.
///
/// # Test Scenarios
///
/// Implementing this trait with fakes enables testing:
/// - Pool failures mid-message
/// - Exactly-once minting across automatic and manual execution
/// - Attestation-gated mints
#[async_trait]
pub trait TokenPool: Send + Sync {
    /// Token this pool manages on its own chain
    fn token(&self) -> Address;

    /// Address of the pool itself, recorded as `sourcePoolAddress`
    fn pool_address(&self) -> Address;

    /// Locks or burns tokens on the source chain.
    ///
    /// # Errors
    ///
    /// Any error aborts the whole send.
    async fn lock_or_burn(&self, input: LockOrBurnIn) -> Result<LockOrBurnOut>;

    /// Releases or mints tokens on the destination chain.
    ///
    /// # Errors
    ///
    /// Any error marks the execution as failed; it can be retried through
    /// manual execution.
    async fn release_or_mint(&self, input: ReleaseOrMintIn) -> Result<ReleaseOrMintOut>;

    /// Undoes a successful [`lock_or_burn`](Self::lock_or_burn)
    async fn rollback_lock_or_burn(&self, _input: &LockOrBurnIn) -> Result<()> {
        Ok(())
    }

    /// Undoes a successful [`release_or_mint`](Self::release_or_mint)
    async fn rollback_release_or_mint(&self, _input: &ReleaseOrMintIn) -> Result<()> {
        Ok(())
    }
}

/// A message as delivered to a receiver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    pub message_id: B256,
    pub source_chain_selector: ChainSelector,
    pub sender: Address,
    pub data: Bytes,
    pub dest_token_amounts: Vec<TokenAmount>,
}

/// Successful receiver call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReceiverReceipt {
    pub gas_used: u64,
}

impl ReceiverReceipt {
    pub fn new(gas_used: u64) -> Self {
        Self { gas_used }
    }
}

/// Reverted receiver call
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReceiverRevert {
    pub gas_used: u64,
    pub return_data: Bytes,
}

impl ReceiverRevert {
    pub fn new(gas_used: u64, return_data: impl Into<Bytes>) -> Self {
        Self {
            gas_used,
            return_data: return_data.into(),
        }
    }
}

/// A destination-chain contract that accepts CCIP messages.
///
/// Calls are bounded by the message gas limit (reported through `gas_used`)
/// and by a wall-clock timeout applied by the OffRamp.
#[async_trait]
pub trait MessageReceiver: Send + Sync {
    async fn ccip_receive(
        &self,
        message: ReceivedMessage,
    ) -> std::result::Result<ReceiverReceipt, ReceiverRevert>;
}

/// Trait for attestation retrieval, e.g. from Circle's Iris API.
///
/// # Test Scenarios
///
/// Implementing this trait with fakes enables testing:
/// - Rate limiting (429 responses)
/// - Not-yet-available attestations (404 responses)
/// - State transitions (Pending → PendingConfirmations → Complete)
/// - Failed attestations
#[async_trait]
pub trait AttestationProvider: Send + Sync {
    /// Fetches attestation status and data for a CCTP message hash.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The HTTP request fails
    /// - The response cannot be parsed
    /// - The API rate-limits the caller or does not know the message
    async fn get_attestation(&self, message_hash: B256) -> Result<AttestationResponse>;
}

/// Trait for time-based operations.
///
/// Commit ages, manual-execution thresholds and polling loops all read
/// time through this trait so tests can fast-forward it.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Asynchronously sleeps for the given duration.
    async fn sleep(&self, duration: Duration);

    /// Returns the current instant in time.
    fn now(&self) -> Instant;
}

/// Pull-based access to an ordered event stream.
///
/// Consumers remember the returned cursor and pass it back on the next
/// call; nothing blocks waiting for new events.
#[async_trait]
pub trait EventSource<E>: Send + Sync {
    /// Returns up to `limit` events starting at `from`, and the cursor to
    /// resume from.
    async fn next_batch(&self, from: Cursor, limit: usize) -> Result<(Vec<E>, Cursor)>;
}
