//! # ccip-rs
//!
//! Protocol core for Chainlink CCIP lanes: message sequencing on the source
//! chain, Merkle commit reports, and exactly-once execution on the
//! destination chain, including the manual recovery path for messages that
//! failed or got stuck.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use alloy_primitives::address;
//! use ccip_rs::{
//!     build_report, Address, ChainSelector, CommitAggregator, Cursor, DestChainConfig,
//!     ExecutionReport, OffRampExecutor, OffRampStaticConfig, OnRampSequencer,
//!     OnRampStaticConfig, SendRequest, SourceChainConfig, TokenAdminRegistry, TokioClock,
//! };
//!
//! # async fn example() -> ccip_rs::Result<()> {
//! let ethereum = ChainSelector::new(5009297550715157269);
//! let base = ChainSelector::new(15971525489660198786);
//! let owner = Address::evm(address!("0000000000000000000000000000000000000001"));
//! let on_ramp_address = Address::evm(address!("00000000000000000000000000000000000000f1"));
//!
//! // Source side: sequence a message
//! let on_ramp = OnRampSequencer::builder()
//!     .static_config(OnRampStaticConfig { chain_selector: ethereum })
//!     .address(on_ramp_address.clone())
//!     .owner(owner.clone())
//!     .token_admin_registry(Arc::new(TokenAdminRegistry::new(owner.clone())))
//!     .build();
//! on_ramp.apply_dest_chain_config(&owner, base, DestChainConfig::default())?;
//! let request = SendRequest::builder()
//!     .receiver(vec![0u8; 32])
//!     .data(b"hello".to_vec())
//!     .build();
//! on_ramp.send(base, &owner, request).await?;
//!
//! // Destination side: commit and execute
//! let commit_store = Arc::new(CommitAggregator::new(base, owner.clone(), TokioClock));
//! commit_store.apply_source_chain_config(&owner, ethereum, SourceChainConfig::enabled(on_ramp_address))?;
//! let (pending, _cursor) = commit_store
//!     .next_report(ethereum, on_ramp.events(), Cursor::START, 100)
//!     .await?;
//!
//! let off_ramp = OffRampExecutor::builder()
//!     .static_config(OffRampStaticConfig::new(base))
//!     .owner(owner.clone())
//!     .commit_store(commit_store.clone())
//!     .token_admin_registry(Arc::new(TokenAdminRegistry::new(owner)))
//!     .build();
//!
//! if let Some(pending) = pending {
//!     commit_store.commit(pending.report.clone())?;
//!     for message in &pending.messages {
//!         let proof = pending.proof(message.sequence_number())?;
//!         off_ramp.execute(ExecutionReport::new(message.clone(), proof)).await?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Public API
//!
//! - [`OnRampSequencer`] - admits messages and assigns lane sequence numbers
//!   and sender nonces
//! - [`CommitAggregator`] and [`build_report`] - Merkle commit reports over
//!   gapless sequence ranges
//! - [`OffRampExecutor`] - proof checks and the execution state machine
//! - [`ManualExecutionRecovery`] - operator retries, including USDC
//!   transfers waiting on CCTP attestations
//! - [`TokenAdminRegistry`], [`TokenPool`] and [`UsdcTokenPool`] - token
//!   movement on both ends
//! - [`CcipError`] and [`Result`] - error types

pub mod chain;
mod config;
mod error;
mod events;
mod offramp;
mod onramp;
mod protocol;
mod providers;
mod token;
mod traits;

// Public module for advanced users who need custom instrumentation
pub mod spans;

// Fakes for the trait seams, for downstream tests as well as ours
pub mod testing;

pub use chain::CcipChain;
pub use config::{
    DestChainConfig, OffRampDynamicConfig, OffRampStaticConfig, OnRampDynamicConfig,
    OnRampStaticConfig, PollingConfig, SourceChainConfig, DEFAULT_MAX_RETURN_BYTES,
};
pub use error::{CcipError, Result};
pub use events::{Cursor, EventLog};
pub use offramp::{
    build_report, proof_for, CommitAggregator, CommitEvent, CommitOutcome, CommittedRoot,
    ExecutionMode, ExecutionOutcome, ExecutionReport, ManualExecutionRecovery, OffRampEvent,
    OffRampExecutor, PendingReport, ReceiverRegistry,
};
pub use onramp::{
    AllowlistConfig, LaneCounters, LaneState, OnRampEvent, OnRampSequencer, SendRequest,
    SenderAllowlist, DEFAULT_TOKEN_DEST_GAS_OVERHEAD,
};
pub use protocol::{
    merkle, Address, AttestationResponse, AttestationStatus, CctpMessage, ChainFamily,
    ChainSelector, CommitReport, DomainId, ExecutionState, ExtraArgs, GasPriceUpdate, Interval,
    InvalidDomainId, InvalidExecutionState, Lane, MerkleTree, Message, MessageAndAttestation,
    OrderingMode, RampMessageHeader, RampTokenAmount, SourceTokenDataPayload, TokenAmount,
    TokenPriceUpdate, DEFAULT_GAS_LIMIT, EVM_EXTRA_ARGS_V1_TAG, GENERIC_EXTRA_ARGS_V2_TAG,
};
pub use providers::{AlloyOnRampLogSource, CCIPMessageSent, IrisAttestationProvider, TokioClock};
pub use token::{
    AttestationPoller, LockOrBurnIn, LockOrBurnOut, ReleaseOrMintIn, ReleaseOrMintOut,
    TokenAdminRegistry, UsdcTokenPool,
};
pub use traits::{
    AttestationProvider, Clock, EventSource, MessageReceiver, ReceivedMessage, ReceiverReceipt,
    ReceiverRevert, TokenPool,
};
