use alloy_primitives::B256;
use thiserror::Error;

use crate::protocol::{Address, ChainFamily, ChainSelector, ExecutionState, MerkleError};

#[derive(Error, Debug)]
pub enum CcipError {
    // Admission
    #[error("Unsupported destination chain: {dest_chain_selector}")]
    UnsupportedDestinationChain { dest_chain_selector: ChainSelector },

    #[error("Sender {sender} not allowed to send to {dest_chain_selector}")]
    SenderNotAllowed {
        dest_chain_selector: ChainSelector,
        sender: Address,
    },

    #[error("Unsupported token: {token}")]
    UnsupportedToken { token: Address },

    #[error("Pool for {expected} manages a different token ({actual})")]
    InvalidTokenPoolToken { expected: Address, actual: Address },

    #[error("Cannot send zero tokens of {token}")]
    CannotSendZeroTokens { token: Address },

    #[error("Destination {dest_chain_selector} requires out-of-order execution")]
    ExtraArgOutOfOrderExecutionMustBeTrue { dest_chain_selector: ChainSelector },

    #[error("Invalid {family} address: {reason}")]
    InvalidAddress { family: ChainFamily, reason: String },

    #[error("Invalid extra args: {reason}")]
    InvalidExtraArgs { reason: String },

    #[error("Message too large: {actual} bytes exceeds {max}")]
    MessageTooLarge { max: usize, actual: usize },

    #[error("Too many tokens: {actual} exceeds {max}")]
    UnsupportedNumberOfTokens { max: usize, actual: usize },

    #[error("Token handling failed: {reason}")]
    TokenHandlingError { reason: String },

    // Administration
    #[error("Only callable by owner")]
    OnlyCallableByOwner,

    #[error("Only callable by owner or allowlist admin")]
    OnlyCallableByOwnerOrAllowlistAdmin,

    #[error("Only the administrator of {token} may do this")]
    OnlyAdministrator { token: Address },

    #[error("Only the pending administrator of {token} may do this")]
    OnlyPendingAdministrator { token: Address },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Commit
    #[error("Invalid commit range for source {source_chain_selector}: min {min} max {max}, expected min {expected}")]
    InvalidCommitRange {
        source_chain_selector: ChainSelector,
        min: u64,
        max: u64,
        expected: u64,
    },

    #[error("Invalid interval [{min}, {max}] for source {source_chain_selector}")]
    InvalidInterval {
        source_chain_selector: ChainSelector,
        min: u64,
        max: u64,
    },

    #[error("Invalid merkle root for source {source_chain_selector}")]
    InvalidRoot { source_chain_selector: ChainSelector },

    #[error("Leaves cannot be empty")]
    LeavesCannotBeEmpty,

    #[error("Root {root} already committed")]
    RootAlreadyCommitted { root: B256 },

    #[error("Source chain not enabled: {source_chain_selector}")]
    SourceChainNotEnabled { source_chain_selector: ChainSelector },

    #[error("Source chain selector mismatch: expected {expected}, got {actual}")]
    SourceChainSelectorMismatch {
        expected: ChainSelector,
        actual: ChainSelector,
    },

    #[error("Merkle error: {0}")]
    Merkle(#[from] MerkleError),

    // Execution
    #[error("Invalid proof for source {source_chain_selector} seq {sequence_number}: {reason}")]
    InvalidProof {
        source_chain_selector: ChainSelector,
        sequence_number: u64,
        reason: String,
    },

    #[error("No committed root covers source {source_chain_selector} seq {sequence_number}")]
    RootNotCommitted {
        source_chain_selector: ChainSelector,
        sequence_number: u64,
    },

    #[error("Message destined for {actual}, this chain is {expected}")]
    InvalidMessageDestChainSelector {
        expected: ChainSelector,
        actual: ChainSelector,
    },

    #[error("Execution of source {source_chain_selector} seq {sequence_number} is in flight")]
    ExecutionInFlight {
        source_chain_selector: ChainSelector,
        sequence_number: u64,
    },

    // Manual execution
    #[error("Message source {source_chain_selector} seq {sequence_number} already executed")]
    AlreadyExecuted {
        source_chain_selector: ChainSelector,
        sequence_number: u64,
    },

    #[error("Commit report for source {source_chain_selector} seq {sequence_number} is stale ({age_secs}s old)")]
    StaleCommitReport {
        source_chain_selector: ChainSelector,
        sequence_number: u64,
        age_secs: u64,
    },

    #[error("Manual execution not yet enabled for source {source_chain_selector} seq {sequence_number} (state {state})")]
    ManualExecutionNotYetEnabled {
        source_chain_selector: ChainSelector,
        sequence_number: u64,
        state: ExecutionState,
    },

    #[error("Message source {source_chain_selector} seq {sequence_number} appears twice in one manual batch")]
    DuplicateManualExecution {
        source_chain_selector: ChainSelector,
        sequence_number: u64,
    },

    #[error("Invalid manual execution gas limit for seq {sequence_number}: {new_limit} < {original}")]
    InvalidManualExecutionGasLimit {
        sequence_number: u64,
        original: u64,
        new_limit: u64,
    },

    // Pool and attestation
    #[error("Attestation pending for {message_hash}")]
    AttestationPending { message_hash: B256 },

    #[error("Attestation failed: {reason}")]
    AttestationFailed { reason: String },

    #[error("Attestation not found (will retry)")]
    AttestationNotFound,

    #[error("Timeout waiting for attestation")]
    AttestationTimeout,

    #[error("Rate limit exceeded, retry after {retry_after_seconds} seconds")]
    RateLimitExceeded { retry_after_seconds: u64 },

    #[error("Chain not supported: {chain}")]
    ChainNotSupported { chain: String },

    // Transport
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("RPC error: {0}")]
    Rpc(#[from] alloy_json_rpc::RpcError<alloy_transport::TransportErrorKind>),

    #[error("Contract call failed: {0}")]
    ContractCall(String),

    #[error("ABI encoding/decoding error: {0}")]
    Abi(#[from] alloy_sol_types::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Hex conversion error: {0}")]
    Hex(#[from] alloy_primitives::hex::FromHexError),
}

impl CcipError {
    /// Pool and attestation failures clear up on their own; manual
    /// execution is the retry path for them.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::AttestationPending { .. }
                | Self::AttestationNotFound
                | Self::AttestationTimeout
                | Self::RateLimitExceeded { .. }
                | Self::TokenHandlingError { .. }
                | Self::Network(_)
                | Self::Rpc(_)
        )
    }

    /// Admission errors reject a send before any state changes
    pub fn is_admission(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedDestinationChain { .. }
                | Self::SenderNotAllowed { .. }
                | Self::UnsupportedToken { .. }
                | Self::InvalidTokenPoolToken { .. }
                | Self::CannotSendZeroTokens { .. }
                | Self::ExtraArgOutOfOrderExecutionMustBeTrue { .. }
                | Self::InvalidAddress { .. }
                | Self::InvalidExtraArgs { .. }
                | Self::MessageTooLarge { .. }
                | Self::UnsupportedNumberOfTokens { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CcipError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(CcipError::AttestationNotFound.is_retryable());
        assert!(CcipError::AttestationPending {
            message_hash: B256::ZERO
        }
        .is_retryable());
        assert!(!CcipError::OnlyCallableByOwner.is_retryable());
        assert!(!CcipError::AttestationFailed {
            reason: "bad".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_commit_range_message() {
        let err = CcipError::InvalidCommitRange {
            source_chain_selector: ChainSelector::new(1),
            min: 4,
            max: 5,
            expected: 3,
        };
        insta::assert_snapshot!(
            err.to_string(),
            @"Invalid commit range for source 1: min 4 max 5, expected min 3"
        );
    }

    #[test]
    fn test_admission_classification() {
        let err = CcipError::UnsupportedDestinationChain {
            dest_chain_selector: ChainSelector::new(9),
        };
        assert!(err.is_admission());
        assert!(!CcipError::LeavesCannotBeEmpty.is_admission());
    }
}
