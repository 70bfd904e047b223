//! CCIP protocol types and definitions
//!
//! This module contains the value layer shared by both ends of a lane:
//! chain identities and addresses, the message model and its content hash,
//! commit reports with their Merkle proofs, execution states, and the CCTP
//! types used by USDC lanes.

mod address;
mod attestation;
mod cctp_message;
mod commit_report;
mod domain_id;
mod execution_state;
mod extra_args;
pub mod hasher;
pub mod merkle;
mod message;
mod selector;

pub use address::Address;
pub use attestation::{AttestationResponse, AttestationStatus, MessageAndAttestation};
pub use cctp_message::{CctpMessage, SUPPORTED_CCTP_VERSION};
pub use commit_report::{CommitReport, GasPriceUpdate, Interval, TokenPriceUpdate};
pub use domain_id::{DomainId, InvalidDomainId, SourceTokenDataPayload};
pub use execution_state::{ExecutionState, InvalidExecutionState};
pub use extra_args::{
    ExtraArgs, DEFAULT_GAS_LIMIT, EVM_EXTRA_ARGS_V1_TAG, GENERIC_EXTRA_ARGS_V2_TAG,
};
pub use merkle::{MerkleError, MerkleTree};
pub use message::{Message, OrderingMode, RampMessageHeader, RampTokenAmount, TokenAmount};
pub use selector::{ChainFamily, ChainSelector, Lane};
