// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Execution hints carried with every message
//!
//! # Format
//!
//! - Generic V2: tag `0x181dcf10` + `abi.encode(uint256 gasLimit, bool allowOutOfOrderExecution)`
//! - EVM V1 (legacy, decode only): tag `0x97a657c9` + `abi.encode(uint256 gasLimit)`

use alloy_primitives::{hex, Bytes, U256};
use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};

use crate::error::{CcipError, Result};

/// `bytes4(keccak256("CCIP EVMExtraArgsV1"))`
pub const EVM_EXTRA_ARGS_V1_TAG: [u8; 4] = [0x97, 0xa6, 0x57, 0xc9];

/// `bytes4(keccak256("CCIP GenericExtraArgsV2"))`
pub const GENERIC_EXTRA_ARGS_V2_TAG: [u8; 4] = [0x18, 0x1d, 0xcf, 0x10];

/// Gas limit applied when the sender does not provide extra args
pub const DEFAULT_GAS_LIMIT: u64 = 200_000;

/// Sender-supplied execution hints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraArgs {
    /// Gas budget for the receiver callback on the destination chain
    pub gas_limit: u64,
    /// Opt out of per-sender nonce ordering
    pub allow_out_of_order_execution: bool,
}

impl Default for ExtraArgs {
    fn default() -> Self {
        Self {
            gas_limit: DEFAULT_GAS_LIMIT,
            allow_out_of_order_execution: false,
        }
    }
}

impl ExtraArgs {
    pub fn new(gas_limit: u64, allow_out_of_order_execution: bool) -> Self {
        Self {
            gas_limit,
            allow_out_of_order_execution,
        }
    }

    /// Out-of-order hints with the given gas limit
    pub fn out_of_order(gas_limit: u64) -> Self {
        Self::new(gas_limit, true)
    }

    /// Encodes in the generic V2 format
    pub fn encode(&self) -> Bytes {
        let body = (U256::from(self.gas_limit), self.allow_out_of_order_execution).abi_encode();
        let mut bytes = Vec::with_capacity(4 + body.len());
        bytes.extend_from_slice(&GENERIC_EXTRA_ARGS_V2_TAG);
        bytes.extend_from_slice(&body);
        Bytes::from(bytes)
    }

    /// Decodes either the generic V2 or the legacy EVM V1 format
    ///
    /// Empty input yields [`ExtraArgs::default`].
    ///
    /// # Errors
    ///
    /// Returns [`CcipError::InvalidExtraArgs`] for unknown tags, malformed
    /// bodies, or gas limits that do not fit in 64 bits.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        if bytes.len() < 4 {
            return Err(CcipError::InvalidExtraArgs {
                reason: format!("expected at least 4 bytes, got {}", bytes.len()),
            });
        }

        let (tag, body) = bytes.split_at(4);
        let (gas_limit, allow_out_of_order_execution) = if tag == GENERIC_EXTRA_ARGS_V2_TAG {
            <(U256, bool)>::abi_decode(body).map_err(|e| CcipError::InvalidExtraArgs {
                reason: e.to_string(),
            })?
        } else if tag == EVM_EXTRA_ARGS_V1_TAG {
            let gas_limit = U256::abi_decode(body).map_err(|e| CcipError::InvalidExtraArgs {
                reason: e.to_string(),
            })?;
            (gas_limit, false)
        } else {
            return Err(CcipError::InvalidExtraArgs {
                reason: format!("unknown tag 0x{}", hex::encode(tag)),
            });
        };

        let gas_limit = u64::try_from(gas_limit).map_err(|_| CcipError::InvalidExtraArgs {
            reason: format!("gas limit {gas_limit} exceeds u64"),
        })?;

        Ok(Self {
            gas_limit,
            allow_out_of_order_execution,
        })
    }
}
