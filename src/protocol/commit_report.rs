//! Commit report types
//!
//! A commit report binds a contiguous, gapless range of sequence numbers on
//! one lane to the Merkle root of exactly those messages. Reports are
//! produced upstream by the off-chain reporting protocol and accepted once.

use alloy_primitives::{B256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Address, ChainSelector, Lane};

/// Closed range of sequence numbers `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub min: u64,
    pub max: u64,
}

impl Interval {
    #[inline]
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// A range is well-formed when `min <= max`
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.min <= self.max
    }

    #[inline]
    pub const fn contains(self, sequence_number: u64) -> bool {
        self.min <= sequence_number && sequence_number <= self.max
    }

    /// Number of sequence numbers covered
    #[inline]
    pub const fn len(self) -> u64 {
        if self.is_valid() {
            self.max - self.min + 1
        } else {
            0
        }
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Latest USD price of a source token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPriceUpdate {
    pub source_token: Address,
    pub usd_per_token: U256,
}

/// Latest USD price of a unit of gas on a chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasPriceUpdate {
    pub dest_chain_selector: ChainSelector,
    pub usd_per_unit_gas: U256,
}

/// A batch attestation for one lane
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitReport {
    pub source_chain_selector: ChainSelector,
    pub dest_chain_selector: ChainSelector,
    pub interval: Interval,
    pub merkle_root: B256,
    #[serde(default)]
    pub token_price_updates: Vec<TokenPriceUpdate>,
    #[serde(default)]
    pub gas_price_updates: Vec<GasPriceUpdate>,
}

impl CommitReport {
    #[inline]
    pub fn lane(&self) -> Lane {
        Lane::new(self.source_chain_selector, self.dest_chain_selector)
    }

    #[inline]
    pub fn min_seq_nr(&self) -> u64 {
        self.interval.min
    }

    #[inline]
    pub fn max_seq_nr(&self) -> u64 {
        self.interval.max
    }

    /// Returns true when the report carries price data
    pub fn has_price_updates(&self) -> bool {
        !self.token_price_updates.is_empty() || !self.gas_price_updates.is_empty()
    }

    /// Attaches price updates to a report
    pub fn with_price_updates(
        mut self,
        token_price_updates: Vec<TokenPriceUpdate>,
        gas_price_updates: Vec<GasPriceUpdate>,
    ) -> Self {
        self.token_price_updates = token_price_updates;
        self.gas_price_updates = gas_price_updates;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_bounds() {
        let interval = Interval::new(3, 5);
        assert!(interval.is_valid());
        assert_eq!(interval.len(), 3);
        assert!(interval.contains(3));
        assert!(interval.contains(5));
        assert!(!interval.contains(2));
        assert!(!interval.contains(6));
    }

    #[test]
    fn test_inverted_interval_is_empty() {
        let interval = Interval::new(5, 3);
        assert!(!interval.is_valid());
        assert!(interval.is_empty());
    }

    #[test]
    fn test_interval_display() {
        assert_eq!(Interval::new(1, 2).to_string(), "[1, 2]");
    }

    #[test]
    fn test_report_deserializes_without_prices() {
        let json = r#"{
            "sourceChainSelector": 1,
            "destChainSelector": 2,
            "interval": {"min": 1, "max": 2},
            "merkleRoot": "0x0101010101010101010101010101010101010101010101010101010101010101"
        }"#;
        let report: CommitReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.lane(), Lane::new(1.into(), 2.into()));
        assert!(!report.has_price_updates());
    }
}
