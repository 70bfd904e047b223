//! Receiver contracts on the destination chain

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::protocol::Address;
use crate::traits::MessageReceiver;

/// Maps destination addresses to the contracts deployed there.
///
/// An address without a registered receiver is an externally owned
/// account: messages to it deliver their tokens and skip the callback.
#[derive(Default)]
pub struct ReceiverRegistry {
    receivers: RwLock<HashMap<Address, Arc<dyn MessageReceiver>>>,
}

impl fmt::Debug for ReceiverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let receivers = self.receivers.read().unwrap_or_else(|e| e.into_inner());
        f.debug_set().entries(receivers.keys()).finish()
    }
}

impl ReceiverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, address: Address, receiver: Arc<dyn MessageReceiver>) {
        self.receivers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(address, receiver);
    }

    pub fn unregister(&self, address: &Address) -> Option<Arc<dyn MessageReceiver>> {
        self.receivers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(address)
    }

    pub fn get(&self, address: &Address) -> Option<Arc<dyn MessageReceiver>> {
        self.receivers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(address)
            .cloned()
    }

    pub fn is_contract(&self, address: &Address) -> bool {
        self.receivers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(address)
    }
}
