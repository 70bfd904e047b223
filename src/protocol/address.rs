// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Chain-agnostic account addresses
//!
//! Addresses are variable-length byte strings tagged with the
//! [`ChainFamily`] that produced them. Hashing and receiver dispatch only
//! ever look at the raw bytes, so EVM, SVM, Aptos, Sui and TON accounts share
//! one type.

use alloy_primitives::{hex, Bytes};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ChainFamily;
use crate::error::{CcipError, Result};

/// A family-tagged account address
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address {
    family: ChainFamily,
    bytes: Bytes,
}

impl Address {
    /// Builds an address from raw bytes, validating the length for the family.
    ///
    /// EVM addresses may also be given in their 32-byte ABI-padded form, in
    /// which case they are normalized to 20 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CcipError::InvalidAddress`] when the length does not match
    /// the family, or a padded EVM word has non-zero high bytes.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ccip_rs::{Address, ChainFamily};
    ///
    /// let solana = Address::new(ChainFamily::Svm, vec![7u8; 32]).unwrap();
    /// assert_eq!(solana.as_bytes().len(), 32);
    /// assert!(Address::new(ChainFamily::Svm, vec![7u8; 20]).is_err());
    /// ```
    pub fn new(family: ChainFamily, bytes: impl Into<Bytes>) -> Result<Self> {
        let bytes: Bytes = bytes.into();

        if family == ChainFamily::Evm && bytes.len() == 32 {
            if bytes[..12].iter().any(|b| *b != 0) {
                return Err(CcipError::InvalidAddress {
                    family,
                    reason: "padded EVM address has non-zero high bytes".to_string(),
                });
            }
            return Ok(Self {
                family,
                bytes: Bytes::copy_from_slice(&bytes[12..]),
            });
        }

        if bytes.len() != family.address_len() {
            return Err(CcipError::InvalidAddress {
                family,
                reason: format!(
                    "expected {} bytes, got {}",
                    family.address_len(),
                    bytes.len()
                ),
            });
        }

        Ok(Self { family, bytes })
    }

    /// Wraps an EVM address
    pub fn evm(address: alloy_primitives::Address) -> Self {
        Self {
            family: ChainFamily::Evm,
            bytes: Bytes::copy_from_slice(address.as_slice()),
        }
    }

    pub fn family(&self) -> ChainFamily {
        self.family
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_bytes(&self) -> Bytes {
        self.bytes.clone()
    }

    /// Returns true when every byte is zero
    pub fn is_zero(&self) -> bool {
        self.bytes.iter().all(|b| *b == 0)
    }

    /// Returns the EVM address if this is an EVM account
    pub fn to_evm(&self) -> Option<alloy_primitives::Address> {
        (self.family == ChainFamily::Evm)
            .then(|| alloy_primitives::Address::from_slice(&self.bytes))
    }
}

impl From<alloy_primitives::Address> for Address {
    fn from(address: alloy_primitives::Address) -> Self {
        Self::evm(address)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:0x{}", self.family, hex::encode(&self.bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_evm_padded_address_is_normalized() {
        let evm = address!("742d35Cc6634C0532925a3b844Bc9e7595f8fA0d");
        let padded = evm.into_word();

        let parsed = Address::new(ChainFamily::Evm, padded.to_vec()).unwrap();
        assert_eq!(parsed, Address::evm(evm));
        assert_eq!(parsed.to_evm(), Some(evm));
    }

    #[test]
    fn test_evm_padded_address_with_dirty_high_bytes() {
        let mut word = [0u8; 32];
        word[0] = 1;
        let result = Address::new(ChainFamily::Evm, word.to_vec());
        assert!(matches!(result, Err(CcipError::InvalidAddress { .. })));
    }

    #[test]
    fn test_family_lengths() {
        assert!(Address::new(ChainFamily::Aptos, vec![1u8; 32]).is_ok());
        assert!(Address::new(ChainFamily::Sui, vec![1u8; 31]).is_err());
        assert!(Address::new(ChainFamily::Ton, vec![1u8; 36]).is_ok());
        assert!(Address::new(ChainFamily::Evm, vec![1u8; 19]).is_err());
    }

    #[test]
    fn test_non_evm_has_no_evm_view() {
        let addr = Address::new(ChainFamily::Svm, vec![9u8; 32]).unwrap();
        assert_eq!(addr.to_evm(), None);
        assert!(!addr.is_zero());
    }

    #[test]
    fn test_display() {
        let addr = Address::evm(alloy_primitives::Address::ZERO);
        insta::assert_snapshot!(addr.to_string(), @"evm:0x0000000000000000000000000000000000000000");
        assert!(addr.is_zero());
    }
}
