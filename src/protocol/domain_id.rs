//! CCTP domains for USDC lanes
//!
//! USDC moves across CCIP lanes through Circle's CCTP, which names chains by
//! its own 32-bit domain IDs. The USDC token pool needs both sides of that
//! mapping: selector → domain when burning, domain → payload when minting.
//!
//! Domain numbers are listed at
//! <https://developers.circle.com/stablecoins/evm-smart-contracts>.

use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ChainSelector;
use crate::chain::{
    ARBITRUM_MAINNET_SELECTOR, ARBITRUM_SEPOLIA_SELECTOR, AVALANCHE_FUJI_SELECTOR,
    AVALANCHE_MAINNET_SELECTOR, BASE_MAINNET_SELECTOR, BASE_SEPOLIA_SELECTOR,
    ETHEREUM_MAINNET_SELECTOR, ETHEREUM_SEPOLIA_SELECTOR, OPTIMISM_MAINNET_SELECTOR,
    OPTIMISM_SEPOLIA_SELECTOR, POLYGON_AMOY_SELECTOR, POLYGON_MAINNET_SELECTOR,
    SOLANA_DEVNET_SELECTOR, SOLANA_MAINNET_SELECTOR,
};
use crate::error::{CcipError, Result};

/// Circle's numbering of the chains CCTP burns and mints on
///
/// # Example
///
/// ```rust
/// use ccip_rs::DomainId;
///
/// let domain: u32 = DomainId::Arbitrum.into();
/// assert_eq!(domain, 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
#[repr(u32)]
#[non_exhaustive]
pub enum DomainId {
    Ethereum = 0,
    Avalanche = 1,
    Optimism = 2,
    Arbitrum = 3,
    Solana = 5,
    Base = 6,
    Polygon = 7,
}

/// Every known domain with the CCIP selectors (mainnet, testnet) that use it
const DOMAINS: [(DomainId, &str, [ChainSelector; 2]); 7] = [
    (DomainId::Ethereum, "Ethereum", [ETHEREUM_MAINNET_SELECTOR, ETHEREUM_SEPOLIA_SELECTOR]),
    (DomainId::Avalanche, "Avalanche", [AVALANCHE_MAINNET_SELECTOR, AVALANCHE_FUJI_SELECTOR]),
    (DomainId::Optimism, "Optimism", [OPTIMISM_MAINNET_SELECTOR, OPTIMISM_SEPOLIA_SELECTOR]),
    (DomainId::Arbitrum, "Arbitrum", [ARBITRUM_MAINNET_SELECTOR, ARBITRUM_SEPOLIA_SELECTOR]),
    (DomainId::Solana, "Solana", [SOLANA_MAINNET_SELECTOR, SOLANA_DEVNET_SELECTOR]),
    (DomainId::Base, "Base", [BASE_MAINNET_SELECTOR, BASE_SEPOLIA_SELECTOR]),
    (DomainId::Polygon, "Polygon", [POLYGON_MAINNET_SELECTOR, POLYGON_AMOY_SELECTOR]),
];

impl DomainId {
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    pub fn from_u32(value: u32) -> Option<Self> {
        DOMAINS
            .iter()
            .find(|(domain, ..)| domain.as_u32() == value)
            .map(|(domain, ..)| *domain)
    }

    pub fn name(self) -> &'static str {
        DOMAINS
            .iter()
            .find(|(domain, ..)| *domain == self)
            .map_or("Unknown", |(_, name, _)| *name)
    }

    /// CCTP domain of a CCIP chain; testnets share their mainnet's domain
    ///
    /// # Example
    ///
    /// ```rust
    /// use ccip_rs::{chain::BASE_SEPOLIA_SELECTOR, DomainId};
    ///
    /// assert_eq!(DomainId::for_chain_selector(BASE_SEPOLIA_SELECTOR), Some(DomainId::Base));
    /// ```
    pub fn for_chain_selector(selector: ChainSelector) -> Option<Self> {
        DOMAINS
            .iter()
            .find(|(_, _, selectors)| selectors.contains(&selector))
            .map(|(domain, ..)| *domain)
    }
}

impl From<DomainId> for u32 {
    fn from(domain: DomainId) -> Self {
        domain.as_u32()
    }
}

impl TryFrom<u32> for DomainId {
    type Error = InvalidDomainId;

    fn try_from(value: u32) -> std::result::Result<Self, Self::Error> {
        Self::from_u32(value).ok_or(InvalidDomainId(value))
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u32())
    }
}

/// A u32 outside Circle's domain table
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no CCTP domain numbered {0}")]
pub struct InvalidDomainId(pub u32);

/// Source-side CCTP data a USDC pool stores in a token transfer's `extraData`
///
/// Encoded as `abi.encode(uint64 nonce, uint32 sourceDomain)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceTokenDataPayload {
    /// CCTP nonce assigned by the source `MessageTransmitter`
    pub nonce: u64,
    pub source_domain: DomainId,
}

impl SourceTokenDataPayload {
    pub fn encode(&self) -> Vec<u8> {
        (self.nonce, self.source_domain.as_u32()).abi_encode()
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        let (nonce, domain) = <(u64, u32)>::abi_decode(data)?;
        let source_domain = DomainId::from_u32(domain)
            .ok_or_else(|| CcipError::InvalidConfig(InvalidDomainId(domain).to_string()))?;
        Ok(Self {
            nonce,
            source_domain,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_matches_discriminants() {
        for (domain, _, _) in DOMAINS {
            assert_eq!(DomainId::from_u32(domain.as_u32()), Some(domain));
        }
        assert_eq!(u32::from(DomainId::Solana), 5);
    }

    #[test]
    fn test_gaps_are_invalid() {
        assert_eq!(DomainId::from_u32(4), None);
        assert_eq!(DomainId::try_from(8), Err(InvalidDomainId(8)));
        assert_eq!(InvalidDomainId(8).to_string(), "no CCTP domain numbered 8");
    }

    #[test]
    fn test_selector_mapping() {
        assert_eq!(
            DomainId::for_chain_selector(ETHEREUM_MAINNET_SELECTOR),
            Some(DomainId::Ethereum)
        );
        assert_eq!(
            DomainId::for_chain_selector(SOLANA_DEVNET_SELECTOR),
            Some(DomainId::Solana)
        );
        assert_eq!(DomainId::for_chain_selector(ChainSelector::new(42)), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(DomainId::Base.to_string(), "Base (6)");
    }

    #[test]
    fn test_source_payload_decodes() {
        let payload = SourceTokenDataPayload {
            nonce: 77,
            source_domain: DomainId::Optimism,
        };
        assert_eq!(SourceTokenDataPayload::decode(&payload.encode()).unwrap(), payload);
        assert_eq!(payload.encode().len(), 64);
    }

    #[test]
    fn test_source_payload_unknown_domain() {
        let bytes = (1u64, 99u32).abi_encode();
        assert!(matches!(
            SourceTokenDataPayload::decode(&bytes),
            Err(CcipError::InvalidConfig(_))
        ));
    }
}
