//! Per-destination sender allowlists

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use crate::protocol::{Address, ChainSelector};

/// Allowlist of one destination chain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowlistConfig {
    pub enabled: bool,
    pub allowed_senders: BTreeSet<Address>,
}

/// Admission control keyed on sender address.
///
/// A destination without an enabled allowlist admits everyone. Adding a
/// sender twice or removing an absent one is not an error; the methods
/// report which senders actually changed so callers can audit them.
#[derive(Debug, Default)]
pub struct SenderAllowlist {
    configs: RwLock<HashMap<ChainSelector, AllowlistConfig>>,
}

impl SenderAllowlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_allowed(&self, dest_chain_selector: ChainSelector, sender: &Address) -> bool {
        let configs = self.configs.read().unwrap_or_else(|e| e.into_inner());
        match configs.get(&dest_chain_selector) {
            Some(config) if config.enabled => config.allowed_senders.contains(sender),
            _ => true,
        }
    }

    pub fn set_enabled(&self, dest_chain_selector: ChainSelector, enabled: bool) {
        let mut configs = self.configs.write().unwrap_or_else(|e| e.into_inner());
        configs.entry(dest_chain_selector).or_default().enabled = enabled;
    }

    /// Adds senders, returning the ones that were not already listed
    pub fn add_senders(
        &self,
        dest_chain_selector: ChainSelector,
        senders: impl IntoIterator<Item = Address>,
    ) -> Vec<Address> {
        let mut configs = self.configs.write().unwrap_or_else(|e| e.into_inner());
        let config = configs.entry(dest_chain_selector).or_default();
        senders
            .into_iter()
            .filter(|sender| config.allowed_senders.insert(sender.clone()))
            .collect()
    }

    /// Removes senders, returning the ones that were actually listed
    pub fn remove_senders(
        &self,
        dest_chain_selector: ChainSelector,
        senders: impl IntoIterator<Item = Address>,
    ) -> Vec<Address> {
        let mut configs = self.configs.write().unwrap_or_else(|e| e.into_inner());
        let Some(config) = configs.get_mut(&dest_chain_selector) else {
            return Vec::new();
        };
        senders
            .into_iter()
            .filter(|sender| config.allowed_senders.remove(sender))
            .collect()
    }

    pub fn config(&self, dest_chain_selector: ChainSelector) -> AllowlistConfig {
        self.configs
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&dest_chain_selector)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const DEST: ChainSelector = ChainSelector::new(2);

    fn alice() -> Address {
        Address::evm(address!("00000000000000000000000000000000000a11ce"))
    }

    fn bob() -> Address {
        Address::evm(address!("0000000000000000000000000000000000000b0b"))
    }

    #[test]
    fn test_disabled_allows_everyone() {
        let allowlist = SenderAllowlist::new();
        assert!(allowlist.is_allowed(DEST, &alice()));

        allowlist.add_senders(DEST, [bob()]);
        assert!(allowlist.is_allowed(DEST, &alice()));
    }

    #[test]
    fn test_enabled_checks_membership() {
        let allowlist = SenderAllowlist::new();
        allowlist.set_enabled(DEST, true);
        allowlist.add_senders(DEST, [alice()]);

        assert!(allowlist.is_allowed(DEST, &alice()));
        assert!(!allowlist.is_allowed(DEST, &bob()));
        assert!(allowlist.is_allowed(ChainSelector::new(3), &bob()));
    }

    #[test]
    fn test_updates_are_idempotent() {
        let allowlist = SenderAllowlist::new();
        assert_eq!(allowlist.add_senders(DEST, [alice(), bob()]), vec![alice(), bob()]);
        assert_eq!(allowlist.add_senders(DEST, [alice()]), vec![]);

        assert_eq!(allowlist.remove_senders(DEST, [alice()]), vec![alice()]);
        assert_eq!(allowlist.remove_senders(DEST, [alice()]), vec![]);
        assert_eq!(
            allowlist.config(DEST).allowed_senders.into_iter().collect::<Vec<_>>(),
            vec![bob()]
        );
    }
}
