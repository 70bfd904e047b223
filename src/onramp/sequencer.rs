// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! OnRamp: admission, token locking and sequencing of outbound messages

use alloy_primitives::{Bytes, B256};
use alloy_sol_types::SolValue;
use bon::Builder;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{info, warn, Instrument};

use super::{LaneCounters, SenderAllowlist};
use crate::config::{DestChainConfig, OnRampDynamicConfig, OnRampStaticConfig};
use crate::error::{CcipError, Result};
use crate::events::EventLog;
use crate::protocol::{
    Address, ChainSelector, ExtraArgs, Message, RampMessageHeader, RampTokenAmount, TokenAmount,
};
use crate::spans;
use crate::token::{LockOrBurnIn, TokenAdminRegistry};
use crate::traits::TokenPool;

/// Gas the destination pool may spend on a release or mint
pub const DEFAULT_TOKEN_DEST_GAS_OVERHEAD: u32 = 90_000;

/// What a sender asks the OnRamp to deliver
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
pub struct SendRequest {
    /// Receiver in the destination chain's native encoding
    #[builder(into)]
    pub receiver: Bytes,
    #[builder(into, default)]
    pub data: Bytes,
    #[builder(default)]
    pub token_amounts: Vec<TokenAmount>,
    /// Encoded extra args; empty means the default gas limit, ordered
    #[builder(into, default)]
    pub extra_args: Bytes,
}

/// Events recorded by the OnRamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "event")]
pub enum OnRampEvent {
    CcipMessageSent {
        dest_chain_selector: ChainSelector,
        sequence_number: u64,
        message: Message,
    },
    AllowListSendersAdded {
        dest_chain_selector: ChainSelector,
        senders: Vec<Address>,
    },
    AllowListSendersRemoved {
        dest_chain_selector: ChainSelector,
        senders: Vec<Address>,
    },
    DestChainConfigSet {
        dest_chain_selector: ChainSelector,
        config: DestChainConfig,
    },
    AllowListAdminSet {
        allowlist_admin: Option<Address>,
    },
}

impl OnRampEvent {
    /// The sent message, for `CcipMessageSent` events
    pub fn sent_message(&self) -> Option<&Message> {
        match self {
            Self::CcipMessageSent { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// The source side of every lane leaving this chain.
///
/// A send is either rejected with no side effects or sequenced and recorded
/// as a [`OnRampEvent::CcipMessageSent`]. Sequence numbers and nonces are
/// allocated inside one critical section per destination lane, after all
/// tokens have been locked, so there is nothing to undo once a message has
/// a sequence number.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use ccip_rs::{
///     Address, ChainSelector, DestChainConfig, OnRampSequencer, OnRampStaticConfig,
///     SendRequest, TokenAdminRegistry,
/// };
/// use alloy_primitives::address;
///
/// # async fn example() -> ccip_rs::Result<()> {
/// let owner = Address::evm(address!("0000000000000000000000000000000000000001"));
/// let onramp = OnRampSequencer::builder()
///     .static_config(OnRampStaticConfig { chain_selector: ChainSelector::new(1) })
///     .address(Address::evm(address!("00000000000000000000000000000000000000f1")))
///     .owner(owner.clone())
///     .token_admin_registry(Arc::new(TokenAdminRegistry::new(owner.clone())))
///     .build();
/// onramp.apply_dest_chain_config(&owner, ChainSelector::new(2), DestChainConfig::default())?;
///
/// let request = SendRequest::builder()
///     .receiver(address!("00000000000000000000000000000000000000b0").to_vec())
///     .data(b"hello".to_vec())
///     .build();
/// let header = onramp.send(ChainSelector::new(2), &owner, request).await?;
/// assert_eq!(header.sequence_number, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Builder, Debug)]
pub struct OnRampSequencer {
    static_config: OnRampStaticConfig,
    /// Address of this OnRamp; part of every message hash
    address: Address,
    owner: Address,
    token_admin_registry: Arc<TokenAdminRegistry>,
    #[builder(skip)]
    dynamic_config: RwLock<OnRampDynamicConfig>,
    #[builder(skip)]
    dest_chain_configs: RwLock<HashMap<ChainSelector, DestChainConfig>>,
    #[builder(skip)]
    allowlist: SenderAllowlist,
    #[builder(skip)]
    counters: LaneCounters,
    #[builder(skip)]
    events: EventLog<OnRampEvent>,
}

struct LockedTransfer {
    pool: Arc<dyn TokenPool>,
    input: LockOrBurnIn,
}

/// Tokens locked for a send that has no sequence number yet.
///
/// Dropped without [`settle`](Self::settle), e.g. when the send future is
/// cancelled mid-lock, it hands the rollbacks to the tokio runtime.
struct PendingLocks {
    transfers: Vec<LockedTransfer>,
}

impl PendingLocks {
    /// The message was sequenced; its locks stand
    fn settle(mut self) {
        self.transfers.clear();
    }

    async fn release(mut self) {
        release_locked(std::mem::take(&mut self.transfers)).await;
    }
}

impl Drop for PendingLocks {
    fn drop(&mut self) {
        if self.transfers.is_empty() {
            return;
        }
        let transfers = std::mem::take(&mut self.transfers);
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                warn!(transfer_count = transfers.len(), event = "send_cancelled_releasing_locks");
                runtime.spawn(release_locked(transfers));
            }
            Err(_) => {
                warn!(transfer_count = transfers.len(), event = "send_cancelled_locks_stranded");
            }
        }
    }
}

async fn release_locked(locked: Vec<LockedTransfer>) {
    for transfer in locked.into_iter().rev() {
        if let Err(e) = transfer.pool.rollback_lock_or_burn(&transfer.input).await {
            warn!(
                token = %transfer.input.local_token,
                error = %e,
                event = "lock_rollback_failed"
            );
        }
    }
}

impl OnRampSequencer {
    /// Sends a message and returns its header.
    ///
    /// # Errors
    ///
    /// Admission errors ([`CcipError::is_admission`]) and pool failures.
    /// Either way no sequence number is consumed and every token locked for
    /// the message has been released again.
    ///
    /// # Cancellation
    ///
    /// Dropping the future before the message is sequenced releases the
    /// tokens locked so far on a spawned task; outside a tokio runtime they
    /// stay locked and a `send_cancelled_locks_stranded` warning is logged.
    pub async fn send(
        &self,
        dest_chain_selector: ChainSelector,
        sender: &Address,
        request: SendRequest,
    ) -> Result<RampMessageHeader> {
        let span = spans::send(dest_chain_selector, sender, request.token_amounts.len());
        async move {
            let result = self.try_send(dest_chain_selector, sender, request).await;
            if let Err(ref e) = result {
                spans::record_error(e);
                warn!(
                    dest_chain_selector = %dest_chain_selector,
                    sender = %sender,
                    error = %e,
                    event = "send_rejected"
                );
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn try_send(
        &self,
        dest_chain_selector: ChainSelector,
        sender: &Address,
        request: SendRequest,
    ) -> Result<RampMessageHeader> {
        let dest_config = self.dest_chain_config(dest_chain_selector).ok_or(
            CcipError::UnsupportedDestinationChain {
                dest_chain_selector,
            },
        )?;
        if !self.allowlist.is_allowed(dest_chain_selector, sender) {
            return Err(CcipError::SenderNotAllowed {
                dest_chain_selector,
                sender: sender.clone(),
            });
        }

        let receiver = Address::new(dest_config.receiver_family, request.receiver)?;
        let limits = self.dynamic_config();
        if request.data.len() > limits.max_data_bytes {
            return Err(CcipError::MessageTooLarge {
                max: limits.max_data_bytes,
                actual: request.data.len(),
            });
        }
        if request.token_amounts.len() > limits.max_tokens_per_msg {
            return Err(CcipError::UnsupportedNumberOfTokens {
                max: limits.max_tokens_per_msg,
                actual: request.token_amounts.len(),
            });
        }

        let extra_args = ExtraArgs::decode(&request.extra_args)?;
        if dest_config.enforce_out_of_order && !extra_args.allow_out_of_order_execution {
            return Err(CcipError::ExtraArgOutOfOrderExecutionMustBeTrue {
                dest_chain_selector,
            });
        }

        let pools = self.resolve_pools(&request.token_amounts)?;
        let (token_amounts, locks) = self
            .lock_tokens(dest_chain_selector, sender, &receiver, pools, request.token_amounts)
            .await?;

        let lane = self.counters.lane(dest_chain_selector);
        let mut lane = lane.lock().unwrap_or_else(|e| e.into_inner());
        let (sequence_number, ordering) =
            lane.allocate(sender, extra_args.allow_out_of_order_execution);

        let mut message = Message {
            header: RampMessageHeader {
                message_id: B256::ZERO,
                source_chain_selector: self.static_config.chain_selector,
                dest_chain_selector,
                sequence_number,
                ordering,
            },
            on_ramp: self.address.clone(),
            sender: sender.clone(),
            receiver,
            data: request.data,
            gas_limit: extra_args.gas_limit,
            token_amounts,
        };
        message.header.message_id = message.compute_id();
        let header = message.header;

        self.events.push(OnRampEvent::CcipMessageSent {
            dest_chain_selector,
            sequence_number,
            message,
        });
        locks.settle();
        drop(lane);

        let span = tracing::Span::current();
        span.record("sequence_number", sequence_number);
        span.record("message_id", tracing::field::display(header.message_id));
        info!(
            dest_chain_selector = %dest_chain_selector,
            sequence_number = sequence_number,
            nonce = header.ordering.wire_nonce(),
            message_id = %header.message_id,
            event = "ccip_message_sent"
        );
        Ok(header)
    }

    /// Looks up every pool before any token moves
    fn resolve_pools(&self, token_amounts: &[TokenAmount]) -> Result<Vec<Arc<dyn TokenPool>>> {
        token_amounts
            .iter()
            .map(|transfer| {
                if transfer.amount.is_zero() {
                    return Err(CcipError::CannotSendZeroTokens {
                        token: transfer.token.clone(),
                    });
                }
                self.token_admin_registry
                    .pool(&transfer.token)
                    .ok_or_else(|| CcipError::UnsupportedToken {
                        token: transfer.token.clone(),
                    })
            })
            .collect()
    }

    /// Locks or burns every transfer; on failure releases what was locked
    async fn lock_tokens(
        &self,
        dest_chain_selector: ChainSelector,
        sender: &Address,
        receiver: &Address,
        pools: Vec<Arc<dyn TokenPool>>,
        token_amounts: Vec<TokenAmount>,
    ) -> Result<(Vec<RampTokenAmount>, PendingLocks)> {
        let dest_exec_data = Bytes::from(DEFAULT_TOKEN_DEST_GAS_OVERHEAD.abi_encode());
        let mut locked = PendingLocks {
            transfers: Vec::with_capacity(pools.len()),
        };
        let mut ramp_amounts = Vec::with_capacity(pools.len());

        for (pool, transfer) in pools.into_iter().zip(token_amounts) {
            let input = LockOrBurnIn::builder()
                .remote_chain_selector(dest_chain_selector)
                .original_sender(sender.clone())
                .receiver(receiver.clone())
                .amount(transfer.amount)
                .local_token(transfer.token)
                .build();

            match pool.lock_or_burn(input.clone()).await {
                Ok(out) => {
                    ramp_amounts.push(RampTokenAmount {
                        source_pool_address: pool.pool_address(),
                        dest_token_address: out.dest_token_address,
                        extra_data: out.dest_pool_data,
                        amount: input.amount,
                        dest_exec_data: dest_exec_data.clone(),
                    });
                    locked.transfers.push(LockedTransfer { pool, input });
                }
                Err(e) => {
                    locked.release().await;
                    return Err(e);
                }
            }
        }
        Ok((ramp_amounts, locked))
    }

    /// Next sequence number the lane to `dest_chain_selector` will assign
    pub fn get_expected_next_sequence_number(&self, dest_chain_selector: ChainSelector) -> u64 {
        self.counters
            .expected_next_sequence_number(dest_chain_selector)
    }

    /// Last nonce assigned to `sender` on the lane
    pub fn get_sender_nonce(&self, dest_chain_selector: ChainSelector, sender: &Address) -> u64 {
        self.counters.sender_nonce(dest_chain_selector, sender)
    }

    pub fn is_allowed(&self, dest_chain_selector: ChainSelector, sender: &Address) -> bool {
        self.allowlist.is_allowed(dest_chain_selector, sender)
    }

    // ------------------------------------------------------------------
    // Administration
    // ------------------------------------------------------------------

    /// Enables a destination or replaces its configuration (owner only).
    pub fn apply_dest_chain_config(
        &self,
        caller: &Address,
        dest_chain_selector: ChainSelector,
        config: DestChainConfig,
    ) -> Result<()> {
        self.only_owner(caller)?;
        if dest_chain_selector.is_zero()
            || dest_chain_selector == self.static_config.chain_selector
        {
            return Err(CcipError::InvalidConfig(format!(
                "invalid destination chain selector {dest_chain_selector}"
            )));
        }

        self.dest_chain_configs
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(dest_chain_selector, config);
        self.allowlist
            .set_enabled(dest_chain_selector, config.allowlist_enabled);
        self.events.push(OnRampEvent::DestChainConfigSet {
            dest_chain_selector,
            config,
        });

        info!(
            dest_chain_selector = %dest_chain_selector,
            allowlist_enabled = config.allowlist_enabled,
            enforce_out_of_order = config.enforce_out_of_order,
            event = "dest_chain_config_set"
        );
        Ok(())
    }

    /// Adds senders to a destination's allowlist (owner or allowlist admin).
    pub fn add_senders(
        &self,
        caller: &Address,
        dest_chain_selector: ChainSelector,
        senders: Vec<Address>,
    ) -> Result<Vec<Address>> {
        self.only_owner_or_allowlist_admin(caller)?;
        let added = self.allowlist.add_senders(dest_chain_selector, senders);
        if !added.is_empty() {
            info!(
                dest_chain_selector = %dest_chain_selector,
                count = added.len(),
                event = "allowlist_senders_added"
            );
            self.events.push(OnRampEvent::AllowListSendersAdded {
                dest_chain_selector,
                senders: added.clone(),
            });
        }
        Ok(added)
    }

    /// Removes senders from a destination's allowlist (owner or allowlist
    /// admin).
    pub fn remove_senders(
        &self,
        caller: &Address,
        dest_chain_selector: ChainSelector,
        senders: Vec<Address>,
    ) -> Result<Vec<Address>> {
        self.only_owner_or_allowlist_admin(caller)?;
        let removed = self.allowlist.remove_senders(dest_chain_selector, senders);
        if !removed.is_empty() {
            info!(
                dest_chain_selector = %dest_chain_selector,
                count = removed.len(),
                event = "allowlist_senders_removed"
            );
            self.events.push(OnRampEvent::AllowListSendersRemoved {
                dest_chain_selector,
                senders: removed.clone(),
            });
        }
        Ok(removed)
    }

    /// Replaces the dynamic configuration (owner only).
    pub fn set_dynamic_config(&self, caller: &Address, config: OnRampDynamicConfig) -> Result<()> {
        self.only_owner(caller)?;
        if config.max_tokens_per_msg == 0 && config.max_data_bytes == 0 {
            return Err(CcipError::InvalidConfig(
                "dynamic config admits no messages".to_string(),
            ));
        }

        let mut current = self.dynamic_config.write().unwrap_or_else(|e| e.into_inner());
        if current.allowlist_admin != config.allowlist_admin {
            self.events.push(OnRampEvent::AllowListAdminSet {
                allowlist_admin: config.allowlist_admin.clone(),
            });
        }
        *current = config;
        info!(
            max_data_bytes = current.max_data_bytes,
            max_tokens_per_msg = current.max_tokens_per_msg,
            event = "dynamic_config_set"
        );
        Ok(())
    }

    fn only_owner(&self, caller: &Address) -> Result<()> {
        if caller != &self.owner {
            return Err(CcipError::OnlyCallableByOwner);
        }
        Ok(())
    }

    fn only_owner_or_allowlist_admin(&self, caller: &Address) -> Result<()> {
        if caller == &self.owner || self.dynamic_config().allowlist_admin.as_ref() == Some(caller) {
            return Ok(());
        }
        Err(CcipError::OnlyCallableByOwnerOrAllowlistAdmin)
    }

    // ------------------------------------------------------------------
    // Getters
    // ------------------------------------------------------------------

    pub fn static_config(&self) -> OnRampStaticConfig {
        self.static_config
    }

    pub fn dynamic_config(&self) -> OnRampDynamicConfig {
        self.dynamic_config
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn dest_chain_config(&self, dest_chain_selector: ChainSelector) -> Option<DestChainConfig> {
        self.dest_chain_configs
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&dest_chain_selector)
            .copied()
    }

    pub fn allowlist(&self) -> &SenderAllowlist {
        &self.allowlist
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    /// Everything the OnRamp recorded, readable through a cursor
    pub fn events(&self) -> &EventLog<OnRampEvent> {
        &self.events
    }

    /// Messages sent to `dest_chain_selector`, in sequence order
    pub fn sent_messages(&self, dest_chain_selector: ChainSelector) -> Vec<Message> {
        self.events
            .snapshot()
            .into_iter()
            .filter_map(|event| match event {
                OnRampEvent::CcipMessageSent {
                    dest_chain_selector: dest,
                    message,
                    ..
                } if dest == dest_chain_selector => Some(message),
                _ => None,
            })
            .collect()
    }
}
