//! Inputs and outputs of token pool calls

use alloy_primitives::{Bytes, U256};
use bon::Builder;

use crate::protocol::{Address, ChainSelector};

/// Source-side request to lock or burn tokens for a message
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
pub struct LockOrBurnIn {
    /// Destination chain of the message
    pub remote_chain_selector: ChainSelector,
    pub original_sender: Address,
    /// Message receiver on the destination chain
    pub receiver: Address,
    pub amount: U256,
    pub local_token: Address,
}

/// What the source pool hands to the destination side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockOrBurnOut {
    /// Token that will be released or minted on the destination
    pub dest_token_address: Address,
    /// Opaque pool payload carried as the transfer's `extraData`
    pub dest_pool_data: Bytes,
}

/// Destination-side request to release or mint tokens for a message
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
pub struct ReleaseOrMintIn {
    /// Source chain of the message
    pub remote_chain_selector: ChainSelector,
    pub original_sender: Address,
    pub receiver: Address,
    pub amount: U256,
    pub local_token: Address,
    /// Pool that locked or burned the tokens on the source
    pub source_pool_address: Address,
    /// `extraData` written by the source pool
    #[builder(default)]
    pub source_pool_data: Bytes,
    /// Data fetched off-chain for this transfer (e.g. a CCTP message)
    #[builder(default)]
    pub offchain_token_data: Bytes,
}

/// Result of a release or mint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseOrMintOut {
    /// Amount actually delivered, in local token decimals
    pub destination_amount: U256,
}
