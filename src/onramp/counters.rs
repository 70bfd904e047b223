//! Per-lane sequence and nonce counters
//!
//! Each destination lane owns its counters behind its own mutex, so sends to
//! different destinations never contend and a lane's allocation is a single
//! critical section.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::protocol::{Address, ChainSelector, OrderingMode};

/// Counters of one outbound lane
#[derive(Debug, Default)]
pub struct LaneState {
    last_sequence_number: u64,
    sender_nonces: HashMap<Address, u64>,
}

impl LaneState {
    pub fn last_sequence_number(&self) -> u64 {
        self.last_sequence_number
    }

    /// Last nonce handed to `sender`; 0 if it never sent an ordered message
    pub fn sender_nonce(&self, sender: &Address) -> u64 {
        self.sender_nonces.get(sender).copied().unwrap_or(0)
    }

    /// Allocates the next sequence number and, for ordered messages, the
    /// sender's next nonce
    pub fn allocate(&mut self, sender: &Address, out_of_order: bool) -> (u64, OrderingMode) {
        self.last_sequence_number += 1;
        let ordering = if out_of_order {
            OrderingMode::Unordered
        } else {
            let nonce = self.sender_nonces.entry(sender.clone()).or_default();
            *nonce += 1;
            OrderingMode::Ordered { nonce: *nonce }
        };
        (self.last_sequence_number, ordering)
    }
}

/// Arena of lane counters keyed by destination chain
#[derive(Debug, Default)]
pub struct LaneCounters {
    lanes: RwLock<HashMap<ChainSelector, Arc<Mutex<LaneState>>>>,
}

impl LaneCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters of a lane, created on first use
    pub fn lane(&self, dest_chain_selector: ChainSelector) -> Arc<Mutex<LaneState>> {
        if let Some(lane) = self
            .lanes
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&dest_chain_selector)
        {
            return Arc::clone(lane);
        }
        let mut lanes = self.lanes.write().unwrap_or_else(|e| e.into_inner());
        Arc::clone(lanes.entry(dest_chain_selector).or_default())
    }

    pub fn expected_next_sequence_number(&self, dest_chain_selector: ChainSelector) -> u64 {
        self.read_lane(dest_chain_selector, |lane| lane.last_sequence_number()) + 1
    }

    pub fn sender_nonce(&self, dest_chain_selector: ChainSelector, sender: &Address) -> u64 {
        self.read_lane(dest_chain_selector, |lane| lane.sender_nonce(sender))
    }

    fn read_lane(&self, dest_chain_selector: ChainSelector, f: impl FnOnce(&LaneState) -> u64) -> u64 {
        let lanes = self.lanes.read().unwrap_or_else(|e| e.into_inner());
        lanes
            .get(&dest_chain_selector)
            .map(|lane| f(&lane.lock().unwrap_or_else(|e| e.into_inner())))
            .unwrap_or(0)
    }
}
