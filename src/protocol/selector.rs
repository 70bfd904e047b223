// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Chain selectors, chain families and lanes
//!
//! A CCIP chain selector is an opaque 64-bit identifier assigned to every
//! chain by configuration. Selectors are unique process-wide and never
//! change; a pair of them forms a [`Lane`] with its own sequence-number space.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a chain
///
/// # Example
///
/// ```rust
/// use ccip_rs::ChainSelector;
///
/// let selector = ChainSelector::new(5009297550715157269);
/// assert_eq!(selector.as_u64(), 5009297550715157269);
/// assert_eq!(selector.to_string(), "5009297550715157269");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainSelector(u64);

impl ChainSelector {
    /// Wraps a raw selector value
    #[inline]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw selector value
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns true for the reserved zero selector
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for ChainSelector {
    #[inline]
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<ChainSelector> for u64 {
    #[inline]
    fn from(selector: ChainSelector) -> Self {
        selector.0
    }
}

impl fmt::Display for ChainSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Address and execution family of a chain
///
/// The family decides how account addresses are encoded and whether the
/// destination understands sequential per-sender nonces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainFamily {
    /// Ethereum-compatible chains (20-byte addresses)
    Evm,
    /// Solana virtual machine chains (32-byte public keys)
    Svm,
    /// Aptos (32-byte account addresses)
    Aptos,
    /// Sui (32-byte object/account addresses)
    Sui,
    /// TON (4-byte workchain followed by a 32-byte account hash)
    Ton,
}

impl ChainFamily {
    /// Returns the family name
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Evm => "evm",
            Self::Svm => "svm",
            Self::Aptos => "aptos",
            Self::Sui => "sui",
            Self::Ton => "ton",
        }
    }

    /// Canonical address length in bytes
    #[inline]
    pub const fn address_len(self) -> usize {
        match self {
            Self::Evm => 20,
            Self::Svm | Self::Aptos | Self::Sui => 32,
            Self::Ton => 36,
        }
    }

    /// Destinations without sequential-nonce semantics only accept
    /// out-of-order messages.
    #[inline]
    pub const fn requires_out_of_order(self) -> bool {
        !matches!(self, Self::Evm)
    }
}

impl fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An ordered (source, destination) pair of chains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Lane {
    pub source: ChainSelector,
    pub dest: ChainSelector,
}

impl Lane {
    #[inline]
    pub const fn new(source: ChainSelector, dest: ChainSelector) -> Self {
        Self { source, dest }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.source, self.dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_conversions() {
        let selector: ChainSelector = 42u64.into();
        let raw: u64 = selector.into();
        assert_eq!(raw, 42);
        assert!(!selector.is_zero());
        assert!(ChainSelector::new(0).is_zero());
    }

    #[test]
    fn test_selector_serde_is_transparent() {
        let json = serde_json::to_string(&ChainSelector::new(7)).unwrap();
        assert_eq!(json, "7");
        let parsed: ChainSelector = serde_json::from_str("7").unwrap();
        assert_eq!(parsed, ChainSelector::new(7));
    }

    #[test]
    fn test_family_out_of_order_requirement() {
        assert!(!ChainFamily::Evm.requires_out_of_order());
        for family in [
            ChainFamily::Svm,
            ChainFamily::Aptos,
            ChainFamily::Sui,
            ChainFamily::Ton,
        ] {
            assert!(family.requires_out_of_order(), "{family}");
        }
    }

    #[test]
    fn test_lane_display() {
        let lane = Lane::new(ChainSelector::new(1), ChainSelector::new(2));
        assert_eq!(lane.to_string(), "1->2");
    }
}
