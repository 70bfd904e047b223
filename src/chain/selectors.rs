// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! CCIP chain selectors for well-known networks
//!
//! Reference: <https://docs.chain.link/ccip/directory>

use crate::protocol::ChainSelector;

// Mainnets

pub const ETHEREUM_MAINNET_SELECTOR: ChainSelector = ChainSelector::new(5009297550715157269);

pub const ARBITRUM_MAINNET_SELECTOR: ChainSelector = ChainSelector::new(4949039107694359620);

pub const OPTIMISM_MAINNET_SELECTOR: ChainSelector = ChainSelector::new(3734403246176062136);

pub const BASE_MAINNET_SELECTOR: ChainSelector = ChainSelector::new(15971525489660198786);

pub const POLYGON_MAINNET_SELECTOR: ChainSelector = ChainSelector::new(4051577828743386545);

pub const AVALANCHE_MAINNET_SELECTOR: ChainSelector = ChainSelector::new(6433500567565415381);

pub const BSC_MAINNET_SELECTOR: ChainSelector = ChainSelector::new(11344663589394136015);

/// Solana mainnet-beta; not an EVM chain, so not reachable through `NamedChain`
pub const SOLANA_MAINNET_SELECTOR: ChainSelector = ChainSelector::new(124615329519749607);

// Testnets

pub const ETHEREUM_SEPOLIA_SELECTOR: ChainSelector = ChainSelector::new(16015286601757825753);

pub const ARBITRUM_SEPOLIA_SELECTOR: ChainSelector = ChainSelector::new(3478487238524512106);

pub const OPTIMISM_SEPOLIA_SELECTOR: ChainSelector = ChainSelector::new(5224473277236331295);

pub const BASE_SEPOLIA_SELECTOR: ChainSelector = ChainSelector::new(10344971235874465080);

pub const POLYGON_AMOY_SELECTOR: ChainSelector = ChainSelector::new(16281711391670634445);

pub const AVALANCHE_FUJI_SELECTOR: ChainSelector = ChainSelector::new(14767482510784806043);

pub const SOLANA_DEVNET_SELECTOR: ChainSelector = ChainSelector::new(16423721717087811551);
