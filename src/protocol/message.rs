// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Cross-chain message types
//!
//! A [`Message`] is created exactly once by the OnRamp, then travels
//! unchanged through commit and execution. It is content-addressed: the
//! `message_id` in its header is the hash of every other field, so any copy
//! that was altered in transit is detected by [`Message::verify_id`].

use alloy_primitives::{Bytes, B256, U256};
use serde::{Deserialize, Serialize};

use super::{hasher, Address, ChainSelector, ExtraArgs, Lane};
use crate::error::{CcipError, Result};

/// How execution of a message is ordered relative to its sender's other
/// messages
///
/// Ordered messages carry the sender's nonce and must execute in nonce
/// order on the destination. Unordered messages have no nonce at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum OrderingMode {
    Ordered { nonce: u64 },
    Unordered,
}

impl OrderingMode {
    /// Nonce as it appears on the wire; unordered messages use 0
    #[inline]
    pub const fn wire_nonce(self) -> u64 {
        match self {
            Self::Ordered { nonce } => nonce,
            Self::Unordered => 0,
        }
    }

    /// Returns the nonce of an ordered message
    #[inline]
    pub const fn nonce(self) -> Option<u64> {
        match self {
            Self::Ordered { nonce } => Some(nonce),
            Self::Unordered => None,
        }
    }

    #[inline]
    pub const fn is_out_of_order(self) -> bool {
        matches!(self, Self::Unordered)
    }

    /// Rebuilds the mode from a wire nonce (0 means unordered)
    #[inline]
    pub const fn from_wire_nonce(nonce: u64) -> Self {
        if nonce == 0 {
            Self::Unordered
        } else {
            Self::Ordered { nonce }
        }
    }
}

/// Identity of a message on its lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RampMessageHeader {
    /// Content hash of the full message; the global deduplication key
    pub message_id: B256,
    pub source_chain_selector: ChainSelector,
    pub dest_chain_selector: ChainSelector,
    /// Strictly increasing per lane, starting at 1
    pub sequence_number: u64,
    pub ordering: OrderingMode,
}

/// A token and amount as seen by a sender or a receiver
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenAmount {
    pub token: Address,
    pub amount: U256,
}

impl TokenAmount {
    pub fn new(token: impl Into<Address>, amount: U256) -> Self {
        Self {
            token: token.into(),
            amount,
        }
    }
}

/// A token transfer carried by a message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RampTokenAmount {
    /// Pool on the source chain that locked or burned the tokens
    pub source_pool_address: Address,
    /// Token on the destination chain that will be released or minted
    pub dest_token_address: Address,
    /// Opaque data from the source pool for the destination pool
    pub extra_data: Bytes,
    pub amount: U256,
    /// Destination execution hints for the pool (e.g. gas amount)
    pub dest_exec_data: Bytes,
}

/// A fully sequenced cross-chain message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub header: RampMessageHeader,
    /// OnRamp that emitted the message
    pub on_ramp: Address,
    pub sender: Address,
    pub receiver: Address,
    pub data: Bytes,
    /// Gas budget for the receiver callback
    pub gas_limit: u64,
    pub token_amounts: Vec<RampTokenAmount>,
}

impl Message {
    #[inline]
    pub fn message_id(&self) -> B256 {
        self.header.message_id
    }

    #[inline]
    pub fn sequence_number(&self) -> u64 {
        self.header.sequence_number
    }

    #[inline]
    pub fn ordering(&self) -> OrderingMode {
        self.header.ordering
    }

    #[inline]
    pub fn lane(&self) -> Lane {
        Lane::new(
            self.header.source_chain_selector,
            self.header.dest_chain_selector,
        )
    }

    /// Extra args as they were encoded at send time
    pub fn extra_args(&self) -> ExtraArgs {
        ExtraArgs::new(self.gas_limit, self.header.ordering.is_out_of_order())
    }

    /// Recomputes the content hash from every field except `message_id`
    pub fn compute_id(&self) -> B256 {
        hasher::message_id(self)
    }

    /// Checks that the stored id matches the content
    ///
    /// # Errors
    ///
    /// Returns [`CcipError::InvalidProof`] when the message was altered.
    pub fn verify_id(&self) -> Result<()> {
        let computed = self.compute_id();
        if computed != self.header.message_id {
            return Err(CcipError::InvalidProof {
                source_chain_selector: self.header.source_chain_selector,
                sequence_number: self.header.sequence_number,
                reason: format!(
                    "message id mismatch: header {} computed {computed}",
                    self.header.message_id
                ),
            });
        }
        Ok(())
    }

    /// Merkle leaf for this message, derived from the recomputed id
    pub fn leaf_hash(&self) -> B256 {
        hasher::leaf_hash(self.compute_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_nonce() {
        assert_eq!(OrderingMode::Ordered { nonce: 5 }.wire_nonce(), 5);
        assert_eq!(OrderingMode::Unordered.wire_nonce(), 0);
        assert_eq!(OrderingMode::Unordered.nonce(), None);
    }

    #[test]
    fn test_from_wire_nonce() {
        assert_eq!(OrderingMode::from_wire_nonce(0), OrderingMode::Unordered);
        assert_eq!(
            OrderingMode::from_wire_nonce(3),
            OrderingMode::Ordered { nonce: 3 }
        );
    }

    #[test]
    fn test_ordering_serde_shape() {
        let json = serde_json::to_string(&OrderingMode::Ordered { nonce: 2 }).unwrap();
        insta::assert_snapshot!(json, @r#"{"mode":"ordered","nonce":2}"#);
        let json = serde_json::to_string(&OrderingMode::Unordered).unwrap();
        insta::assert_snapshot!(json, @r#"{"mode":"unordered"}"#);
    }
}
