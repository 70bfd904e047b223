// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Message identity hashing
//!
//! ```text
//! metadata   = keccak256(abi.encode(keccak256("Any2AnyMessageHashV1"),
//!                                   sourceChainSelector, destChainSelector,
//!                                   keccak256(onRamp)))
//! message_id = keccak256(abi.encode(metadata, sequenceNumber, nonce,
//!                                   keccak256(sender), keccak256(receiver),
//!                                   keccak256(data), keccak256(tokenAmounts),
//!                                   keccak256(extraArgs)))
//! leaf       = keccak256(0x00 || message_id)
//! ```

use alloy_primitives::{keccak256, Bytes, B256, U256};
use alloy_sol_types::SolValue;

use super::{Address, ChainSelector, Message, RampTokenAmount};

/// Domain string mixed into every message hash
pub const MESSAGE_HASH_DOMAIN: &[u8] = b"Any2AnyMessageHashV1";

/// Prefix byte for Merkle leaves
pub const LEAF_DOMAIN_SEPARATOR: u8 = 0x00;

/// Prefix byte for internal Merkle nodes
pub const INTERNAL_DOMAIN_SEPARATOR: u8 = 0x01;

/// Hash binding a message to its lane and OnRamp
pub fn metadata_hash(source: ChainSelector, dest: ChainSelector, on_ramp: &Address) -> B256 {
    keccak256(
        (
            keccak256(MESSAGE_HASH_DOMAIN),
            source.as_u64(),
            dest.as_u64(),
            keccak256(on_ramp.as_bytes()),
        )
            .abi_encode(),
    )
}

fn token_amounts_hash(token_amounts: &[RampTokenAmount]) -> B256 {
    let encoded: Vec<(Bytes, Bytes, Bytes, U256, Bytes)> = token_amounts
        .iter()
        .map(|t| {
            (
                t.source_pool_address.to_bytes(),
                t.dest_token_address.to_bytes(),
                t.extra_data.clone(),
                t.amount,
                t.dest_exec_data.clone(),
            )
        })
        .collect();
    keccak256(encoded.abi_encode())
}

/// Content hash of a message, ignoring the `message_id` stored in its header
pub fn message_id(message: &Message) -> B256 {
    let header = &message.header;
    let metadata = metadata_hash(
        header.source_chain_selector,
        header.dest_chain_selector,
        &message.on_ramp,
    );

    keccak256(
        (
            metadata,
            header.sequence_number,
            header.ordering.wire_nonce(),
            keccak256(message.sender.as_bytes()),
            keccak256(message.receiver.as_bytes()),
            keccak256(&message.data),
            token_amounts_hash(&message.token_amounts),
            keccak256(message.extra_args().encode()),
        )
            .abi_encode(),
    )
}

/// Merkle leaf for a message id
pub fn leaf_hash(message_id: B256) -> B256 {
    let mut buffer = [0u8; 33];
    buffer[0] = LEAF_DOMAIN_SEPARATOR;
    buffer[1..].copy_from_slice(message_id.as_slice());
    keccak256(buffer)
}

/// Internal Merkle node over a sorted pair
pub fn internal_hash(left: &B256, right: &B256) -> B256 {
    let (first, second) = if left < right {
        (left, right)
    } else {
        (right, left)
    };

    let mut buffer = [0u8; 65];
    buffer[0] = INTERNAL_DOMAIN_SEPARATOR;
    buffer[1..33].copy_from_slice(first.as_slice());
    buffer[33..].copy_from_slice(second.as_slice());
    keccak256(buffer)
}
