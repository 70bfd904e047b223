//! Chain selector lookups for CCIP
//!
//! This module maps `alloy_chains::NamedChain` networks to their CCIP chain
//! selectors and back, and exposes the selector constants for chains that
//! `NamedChain` does not cover (e.g. Solana).

mod selectors;

pub use selectors::*;

use alloy_chains::NamedChain;

use crate::protocol::{ChainFamily, ChainSelector, DomainId};
use crate::{CcipError, Result};

/// CCIP configuration for a named chain
///
/// # Example
///
/// ```rust
/// use alloy_chains::NamedChain;
/// use ccip_rs::{CcipChain, ChainFamily};
///
/// let selector = NamedChain::Mainnet.ccip_chain_selector().unwrap();
/// assert_eq!(selector.as_u64(), 5009297550715157269);
/// assert_eq!(NamedChain::Mainnet.ccip_chain_family(), ChainFamily::Evm);
/// ```
pub trait CcipChain {
    /// The CCIP chain selector of the chain
    fn ccip_chain_selector(&self) -> Result<ChainSelector>;

    /// Address family of the chain; every `NamedChain` is EVM
    fn ccip_chain_family(&self) -> ChainFamily {
        ChainFamily::Evm
    }

    /// CCTP domain of the chain, for USDC lanes
    fn cctp_domain_id(&self) -> Result<DomainId>;
}

impl CcipChain for NamedChain {
    fn ccip_chain_selector(&self) -> Result<ChainSelector> {
        use NamedChain::*;

        match self {
            Mainnet => Ok(ETHEREUM_MAINNET_SELECTOR),
            Arbitrum => Ok(ARBITRUM_MAINNET_SELECTOR),
            Optimism => Ok(OPTIMISM_MAINNET_SELECTOR),
            Base => Ok(BASE_MAINNET_SELECTOR),
            Polygon => Ok(POLYGON_MAINNET_SELECTOR),
            Avalanche => Ok(AVALANCHE_MAINNET_SELECTOR),
            BinanceSmartChain => Ok(BSC_MAINNET_SELECTOR),
            // Testnets
            Sepolia => Ok(ETHEREUM_SEPOLIA_SELECTOR),
            ArbitrumSepolia => Ok(ARBITRUM_SEPOLIA_SELECTOR),
            OptimismSepolia => Ok(OPTIMISM_SEPOLIA_SELECTOR),
            BaseSepolia => Ok(BASE_SEPOLIA_SELECTOR),
            PolygonAmoy => Ok(POLYGON_AMOY_SELECTOR),
            AvalancheFuji => Ok(AVALANCHE_FUJI_SELECTOR),
            _ => Err(CcipError::ChainNotSupported {
                chain: self.to_string(),
            }),
        }
    }

    fn cctp_domain_id(&self) -> Result<DomainId> {
        let selector = self.ccip_chain_selector()?;
        DomainId::for_chain_selector(selector).ok_or_else(|| CcipError::ChainNotSupported {
            chain: self.to_string(),
        })
    }
}

/// Reverse lookup from a selector to a named EVM chain
pub fn named_chain_for_selector(selector: ChainSelector) -> Option<NamedChain> {
    use NamedChain::*;

    [
        Mainnet,
        Arbitrum,
        Optimism,
        Base,
        Polygon,
        Avalanche,
        BinanceSmartChain,
        Sepolia,
        ArbitrumSepolia,
        OptimismSepolia,
        BaseSepolia,
        PolygonAmoy,
        AvalancheFuji,
    ]
    .into_iter()
    .find(|chain| chain.ccip_chain_selector().ok() == Some(selector))
}

/// Address family of a selector, when it is a known chain
pub fn family_for_selector(selector: ChainSelector) -> Option<ChainFamily> {
    if selector == SOLANA_MAINNET_SELECTOR || selector == SOLANA_DEVNET_SELECTOR {
        return Some(ChainFamily::Svm);
    }
    named_chain_for_selector(selector).map(|chain| chain.ccip_chain_family())
}
