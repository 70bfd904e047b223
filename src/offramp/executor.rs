// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! OffRamp: proof verification and exactly-once execution
//!
//! Every message moves through one state machine keyed by
//! `(source chain, sequence number)`:
//!
//! 1. the message is checked against the committed root of its lane;
//! 2. the first caller to find it `Untouched` claims it as `InProgress`,
//!    everyone else is skipped;
//! 3. tokens are released or minted, then the receiver is called with a
//!    gas budget and a wall-clock timeout;
//! 4. the terminal state is recorded and announced.
//!
//! Receiver reverts and pool errors do not surface as `Err`; they end in
//! [`ExecutionState::Failure`] with all token effects rolled back, which
//! is what manual execution picks up.

use alloy_primitives::{Bytes, B256};
use bon::Builder;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use tracing::{debug, info, warn, Instrument};

use super::{CommitAggregator, CommittedRoot, ReceiverRegistry};
use crate::config::{OffRampDynamicConfig, OffRampStaticConfig};
use crate::error::{CcipError, Result};
use crate::events::EventLog;
use crate::protocol::{merkle, Address, ChainSelector, ExecutionState, Message, OrderingMode, TokenAmount};
use crate::spans;
use crate::token::{ReleaseOrMintIn, TokenAdminRegistry};
use crate::traits::{Clock, ReceivedMessage, TokenPool};

/// A message with everything needed to execute it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    pub message: Message,
    /// Sibling path from the message's leaf to the committed root
    pub proof: Vec<B256>,
    /// Per token transfer, data fetched off-chain (e.g. a CCTP message);
    /// missing entries are empty
    pub offchain_token_data: Vec<Bytes>,
}

impl ExecutionReport {
    pub fn new(message: Message, proof: Vec<B256>) -> Self {
        Self {
            message,
            proof,
            offchain_token_data: Vec::new(),
        }
    }

    pub fn with_offchain_token_data(mut self, offchain_token_data: Vec<Bytes>) -> Self {
        self.offchain_token_data = offchain_token_data;
        self
    }
}

/// How an execution was triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Automatic,
    /// Operator retry; a non-zero `gas_limit_override` replaces the
    /// message's gas limit
    Manual { gas_limit_override: u64 },
}

impl ExecutionMode {
    pub fn is_manual(self) -> bool {
        matches!(self, Self::Manual { .. })
    }

    fn gas_limit(self, original: u64) -> u64 {
        match self {
            Self::Manual { gas_limit_override } if gas_limit_override != 0 => gas_limit_override,
            _ => original,
        }
    }
}

/// What [`OffRampExecutor::execute`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// The message ran to a terminal state
    Executed {
        state: ExecutionState,
        return_data: Bytes,
    },
    /// Someone else already claimed the message; nothing happened
    SkippedAlreadyExecuted { state: ExecutionState },
    /// An earlier nonce of the same sender has not been attempted yet
    SkippedNonceOutOfOrder { expected: u64, actual: u64 },
    /// Refused after its manual batch had started running, typically
    /// because another worker claimed the message in between; nothing ran
    Rejected { reason: String },
}

impl ExecutionOutcome {
    /// Terminal state reached by this call, if it executed
    pub fn state(&self) -> Option<ExecutionState> {
        match self {
            Self::Executed { state, .. } => Some(*state),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.state() == Some(ExecutionState::Success)
    }
}

/// Events recorded by the OffRamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "event")]
pub enum OffRampEvent {
    ExecutionStateChanged {
        source_chain_selector: ChainSelector,
        sequence_number: u64,
        message_id: B256,
        state: ExecutionState,
        return_data: Bytes,
        gas_used: u64,
    },
    SkippedAlreadyExecutedMessage {
        source_chain_selector: ChainSelector,
        sequence_number: u64,
    },
    SkippedNonceOutOfOrder {
        source_chain_selector: ChainSelector,
        sequence_number: u64,
        sender: Address,
        nonce: u64,
    },
}

type MessageKey = (ChainSelector, u64);

#[derive(Debug, Default)]
struct Ledger {
    states: HashMap<MessageKey, ExecutionState>,
    /// Keys some worker is executing right now
    in_flight: HashSet<MessageKey>,
    inbound_nonces: HashMap<(ChainSelector, Address), u64>,
    /// Mints not yet settled by a terminal state. Entries only outlive an
    /// attempt whose future was dropped, and are undone by the next one.
    unsettled: HashMap<MessageKey, Vec<MintedTransfer>>,
}

/// Clears the in-flight mark even if the executing future is dropped,
/// which leaves the message stuck `InProgress` and open to manual retry.
/// Its mints stay in the ledger's `unsettled` map until that retry.
struct InFlight<'a> {
    ledger: &'a Mutex<Ledger>,
    key: MessageKey,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.ledger
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .in_flight
            .remove(&self.key);
    }
}

enum Claim {
    Run,
    Skip(ExecutionOutcome),
}

#[derive(Clone)]
struct MintedTransfer {
    pool: Arc<dyn TokenPool>,
    input: ReleaseOrMintIn,
}

impl fmt::Debug for MintedTransfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MintedTransfer")
            .field("token", &self.input.local_token)
            .field("amount", &self.input.amount)
            .finish_non_exhaustive()
    }
}

/// Destination side of every lane into this chain.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use ccip_rs::{
///     Address, ChainSelector, CommitAggregator, ExecutionReport, OffRampExecutor,
///     OffRampStaticConfig, TokenAdminRegistry, TokioClock,
/// };
/// use alloy_primitives::address;
///
/// # async fn example(report: ExecutionReport) -> ccip_rs::Result<()> {
/// let owner = Address::evm(address!("0000000000000000000000000000000000000001"));
/// let commit_store = Arc::new(CommitAggregator::new(ChainSelector::new(2), owner.clone(), TokioClock));
/// let offramp = OffRampExecutor::builder()
///     .static_config(OffRampStaticConfig::new(ChainSelector::new(2)))
///     .owner(owner.clone())
///     .commit_store(commit_store)
///     .token_admin_registry(Arc::new(TokenAdminRegistry::new(owner)))
///     .build();
///
/// let outcome = offramp.execute(report).await?;
/// println!("{outcome:?}");
/// # Ok(())
/// # }
/// ```
#[derive(Builder)]
pub struct OffRampExecutor<C: Clock> {
    static_config: OffRampStaticConfig,
    owner: Address,
    commit_store: Arc<CommitAggregator<C>>,
    token_admin_registry: Arc<TokenAdminRegistry>,
    #[builder(default)]
    receivers: Arc<ReceiverRegistry>,
    #[builder(skip)]
    dynamic_config: RwLock<OffRampDynamicConfig>,
    #[builder(skip)]
    ledger: Mutex<Ledger>,
    #[builder(skip)]
    events: EventLog<OffRampEvent>,
}

impl<C: Clock> fmt::Debug for OffRampExecutor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OffRampExecutor")
            .field("static_config", &self.static_config)
            .field("dynamic_config", &self.dynamic_config())
            .field("receivers", &self.receivers)
            .finish_non_exhaustive()
    }
}

impl<C: Clock> OffRampExecutor<C> {
    /// Executes a committed message on the automatic path.
    ///
    /// # Errors
    ///
    /// Only verification failures are errors: a message for another chain,
    /// from a disabled source, without a committed root, or whose proof
    /// does not match. A message that runs and fails returns
    /// `Ok(Executed { state: Failure, .. })`.
    pub async fn execute(&self, report: ExecutionReport) -> Result<ExecutionOutcome> {
        self.execute_with_mode(report, ExecutionMode::Automatic)
            .await
    }

    pub(crate) async fn execute_with_mode(
        &self,
        report: ExecutionReport,
        mode: ExecutionMode,
    ) -> Result<ExecutionOutcome> {
        let header = report.message.header;
        let span = spans::execute(
            header.source_chain_selector,
            header.sequence_number,
            &header.message_id,
            mode.is_manual(),
        );
        async move {
            let result = self.try_execute(report, mode).await;
            if let Err(ref e) = result {
                spans::record_error(e);
                warn!(
                    source_chain_selector = %header.source_chain_selector,
                    sequence_number = header.sequence_number,
                    error = %e,
                    event = "execution_rejected"
                );
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn try_execute(
        &self,
        report: ExecutionReport,
        mode: ExecutionMode,
    ) -> Result<ExecutionOutcome> {
        let committed = self.verify(&report)?;
        let key = message_key(&report.message);

        let claim = {
            let mut ledger = self.lock_ledger();
            self.claim(&mut ledger, &report.message, &committed, mode)?
        };
        if let Claim::Skip(outcome) = claim {
            return Ok(outcome);
        }
        let _in_flight = InFlight {
            ledger: &self.ledger,
            key,
        };

        self.rollback_unsettled(key).await;
        let (state, return_data, gas_used) = self.deliver(&report, mode).await;
        self.finalize(&report.message, state, return_data.clone(), gas_used);
        Ok(ExecutionOutcome::Executed { state, return_data })
    }

    /// Checks that the message is for this chain and covered by a committed
    /// root, returning that root
    fn verify(&self, report: &ExecutionReport) -> Result<CommittedRoot> {
        let message = &report.message;
        let header = &message.header;
        if header.dest_chain_selector != self.static_config.chain_selector {
            return Err(CcipError::InvalidMessageDestChainSelector {
                expected: self.static_config.chain_selector,
                actual: header.dest_chain_selector,
            });
        }

        let source = self
            .commit_store
            .source_chain_config(header.source_chain_selector)
            .filter(|config| config.is_enabled)
            .ok_or(CcipError::SourceChainNotEnabled {
                source_chain_selector: header.source_chain_selector,
            })?;
        let invalid_proof = |reason: String| CcipError::InvalidProof {
            source_chain_selector: header.source_chain_selector,
            sequence_number: header.sequence_number,
            reason,
        };
        if message.on_ramp != source.on_ramp {
            return Err(invalid_proof(format!(
                "on_ramp {} is not configured for the source",
                message.on_ramp
            )));
        }
        message.verify_id()?;

        let committed = self
            .commit_store
            .root_for(header.source_chain_selector, header.sequence_number)
            .ok_or(CcipError::RootNotCommitted {
                source_chain_selector: header.source_chain_selector,
                sequence_number: header.sequence_number,
            })?;
        if !merkle::verify_proof(committed.merkle_root(), message.leaf_hash(), &report.proof) {
            return Err(invalid_proof(format!(
                "proof does not lead to root {} of {}",
                committed.merkle_root(),
                committed.interval()
            )));
        }
        Ok(committed)
    }

    /// Decides under the ledger lock whether this call runs the message
    fn claim(
        &self,
        ledger: &mut Ledger,
        message: &Message,
        committed: &CommittedRoot,
        mode: ExecutionMode,
    ) -> Result<Claim> {
        let key = message_key(message);
        let (source, sequence_number) = key;
        let state = ledger.states.get(&key).copied().unwrap_or_default();

        match mode {
            ExecutionMode::Automatic if state != ExecutionState::Untouched => {
                debug!(state = %state, event = "skipped_already_executed_message");
                self.events.push(OffRampEvent::SkippedAlreadyExecutedMessage {
                    source_chain_selector: source,
                    sequence_number,
                });
                return Ok(Claim::Skip(ExecutionOutcome::SkippedAlreadyExecuted { state }));
            }
            ExecutionMode::Automatic => {}
            ExecutionMode::Manual { gas_limit_override } => self.check_manual_rules(
                message,
                committed,
                state,
                ledger.in_flight.contains(&key),
                gas_limit_override,
            )?,
        }

        if state == ExecutionState::Untouched {
            if let OrderingMode::Ordered { nonce } = message.ordering() {
                let sender_key = (source, message.sender.clone());
                let expected = ledger.inbound_nonces.get(&sender_key).copied().unwrap_or(0) + 1;
                if nonce != expected {
                    info!(
                        sender = %message.sender,
                        nonce = nonce,
                        expected = expected,
                        event = "skipped_nonce_out_of_order"
                    );
                    self.events.push(OffRampEvent::SkippedNonceOutOfOrder {
                        source_chain_selector: source,
                        sequence_number,
                        sender: message.sender.clone(),
                        nonce,
                    });
                    return Ok(Claim::Skip(ExecutionOutcome::SkippedNonceOutOfOrder {
                        expected,
                        actual: nonce,
                    }));
                }
                ledger.inbound_nonces.insert(sender_key, nonce);
            }
        }

        ledger.states.insert(key, ExecutionState::InProgress);
        ledger.in_flight.insert(key);
        Ok(Claim::Run)
    }

    fn check_manual_rules(
        &self,
        message: &Message,
        committed: &CommittedRoot,
        state: ExecutionState,
        live: bool,
        gas_limit_override: u64,
    ) -> Result<()> {
        let (source_chain_selector, sequence_number) = message_key(message);
        if state == ExecutionState::Success {
            return Err(CcipError::AlreadyExecuted {
                source_chain_selector,
                sequence_number,
            });
        }

        let config = self.dynamic_config();
        let age = self
            .commit_store
            .clock()
            .now()
            .saturating_duration_since(committed.committed_at);
        if age > config.manual_execution_horizon {
            return Err(CcipError::StaleCommitReport {
                source_chain_selector,
                sequence_number,
                age_secs: age.as_secs(),
            });
        }

        match state {
            ExecutionState::InProgress if live => {
                return Err(CcipError::ExecutionInFlight {
                    source_chain_selector,
                    sequence_number,
                })
            }
            ExecutionState::Untouched if age < config.permissionless_execution_threshold => {
                return Err(CcipError::ManualExecutionNotYetEnabled {
                    source_chain_selector,
                    sequence_number,
                    state,
                })
            }
            _ => {}
        }

        if gas_limit_override != 0 && gas_limit_override < message.gas_limit {
            return Err(CcipError::InvalidManualExecutionGasLimit {
                sequence_number,
                original: message.gas_limit,
                new_limit: gas_limit_override,
            });
        }
        Ok(())
    }

    /// Checks, without side effects, that a manual execution of `report`
    /// would be admitted right now
    pub fn check_manual_execution(
        &self,
        report: &ExecutionReport,
        gas_limit_override: u64,
    ) -> Result<()> {
        let committed = self.verify(report)?;
        let key = message_key(&report.message);
        let ledger = self.lock_ledger();
        let state = ledger.states.get(&key).copied().unwrap_or_default();
        self.check_manual_rules(
            &report.message,
            &committed,
            state,
            ledger.in_flight.contains(&key),
            gas_limit_override,
        )
    }

    /// Moves the tokens and calls the receiver, returning the terminal
    /// state, return data and gas used
    async fn deliver(
        &self,
        report: &ExecutionReport,
        mode: ExecutionMode,
    ) -> (ExecutionState, Bytes, u64) {
        let key = message_key(&report.message);
        let delivered = match self.release_tokens(report).await {
            Ok(delivered) => delivered,
            Err(e) => {
                spans::record_error(&e);
                warn!(error = %e, retryable = e.is_retryable(), event = "token_handling_failed");
                let reason = self.truncate(Bytes::from(e.to_string().into_bytes()));
                return (ExecutionState::Failure, reason, 0);
            }
        };

        let gas_limit = mode.gas_limit(report.message.gas_limit);
        match self.call_receiver(&report.message, &delivered, gas_limit).await {
            Ok(gas_used) => (ExecutionState::Success, Bytes::new(), gas_used),
            Err((return_data, gas_used)) => {
                self.rollback_unsettled(key).await;
                (ExecutionState::Failure, return_data, gas_used)
            }
        }
    }

    /// Releases every transfer, recording each mint as unsettled the moment
    /// it lands; returns the amounts delivered to the receiver
    async fn release_tokens(&self, report: &ExecutionReport) -> Result<Vec<TokenAmount>> {
        let message = &report.message;
        let key = message_key(message);
        let mut delivered = Vec::with_capacity(message.token_amounts.len());

        for (index, transfer) in message.token_amounts.iter().enumerate() {
            let Some(pool) = self.token_admin_registry.pool(&transfer.dest_token_address) else {
                self.rollback_unsettled(key).await;
                return Err(CcipError::UnsupportedToken {
                    token: transfer.dest_token_address.clone(),
                });
            };

            let input = ReleaseOrMintIn::builder()
                .remote_chain_selector(message.header.source_chain_selector)
                .original_sender(message.sender.clone())
                .receiver(message.receiver.clone())
                .amount(transfer.amount)
                .local_token(transfer.dest_token_address.clone())
                .source_pool_address(transfer.source_pool_address.clone())
                .source_pool_data(transfer.extra_data.clone())
                .offchain_token_data(
                    report
                        .offchain_token_data
                        .get(index)
                        .cloned()
                        .unwrap_or_default(),
                )
                .build();

            match pool.release_or_mint(input.clone()).await {
                Ok(output) => {
                    delivered.push(TokenAmount::new(
                        input.local_token.clone(),
                        output.destination_amount,
                    ));
                    self.lock_ledger()
                        .unsettled
                        .entry(key)
                        .or_default()
                        .push(MintedTransfer { pool, input });
                }
                Err(e) => {
                    self.rollback_unsettled(key).await;
                    return Err(e);
                }
            }
        }
        Ok(delivered)
    }

    /// Undoes the unsettled mints of `key`, latest first. Each entry leaves
    /// the ledger only after its rollback returns, so a rollback cut short
    /// is finished by the next attempt.
    async fn rollback_unsettled(&self, key: MessageKey) {
        let mut rolled_back = 0usize;
        loop {
            let next = self
                .lock_ledger()
                .unsettled
                .get(&key)
                .and_then(|minted| minted.last().cloned());
            let Some(transfer) = next else {
                break;
            };
            if let Err(e) = transfer.pool.rollback_release_or_mint(&transfer.input).await {
                warn!(
                    token = %transfer.input.local_token,
                    error = %e,
                    event = "mint_rollback_failed"
                );
            }
            let mut ledger = self.lock_ledger();
            if let Some(minted) = ledger.unsettled.get_mut(&key) {
                minted.pop();
                if minted.is_empty() {
                    ledger.unsettled.remove(&key);
                }
            }
            rolled_back += 1;
        }
        if rolled_back > 0 {
            debug!(transfer_count = rolled_back, event = "unsettled_mints_rolled_back");
        }
    }

    /// Calls the receiver contract, if any; `Err` carries the return data
    /// and gas used of a failed call
    async fn call_receiver(
        &self,
        message: &Message,
        delivered: &[TokenAmount],
        gas_limit: u64,
    ) -> std::result::Result<u64, (Bytes, u64)> {
        let Some(receiver) = self.receivers.get(&message.receiver) else {
            debug!(receiver = %message.receiver, event = "receiver_not_a_contract");
            return Ok(0);
        };
        if message.data.is_empty() && gas_limit == 0 {
            debug!(event = "receiver_callback_skipped");
            return Ok(0);
        }

        let received = ReceivedMessage {
            message_id: message.message_id(),
            source_chain_selector: message.header.source_chain_selector,
            sender: message.sender.clone(),
            data: message.data.clone(),
            dest_token_amounts: delivered.to_vec(),
        };

        let timeout = self.dynamic_config().receiver_timeout;
        let span = spans::ccip_receive(&message.receiver, gas_limit);
        let call = receiver.ccip_receive(received).instrument(span.clone());

        match tokio::time::timeout(timeout, call).await {
            Err(_) => {
                spans::record_error_with_context(
                    "ReceiverTimeout",
                    &format!("receiver did not return within {timeout:?}"),
                    None,
                );
                warn!(receiver = %message.receiver, event = "receiver_timed_out");
                Err((Bytes::from_static(b"receiver timed out"), gas_limit))
            }
            Ok(Ok(receipt)) if receipt.gas_used > gas_limit => {
                spans::record_error_with_context(
                    "ReceiverOutOfGas",
                    &format!("receiver used {} of {gas_limit} gas", receipt.gas_used),
                    None,
                );
                warn!(
                    gas_used = receipt.gas_used,
                    gas_limit = gas_limit,
                    event = "receiver_out_of_gas"
                );
                Err((Bytes::new(), receipt.gas_used))
            }
            Ok(Ok(receipt)) => {
                span.record("gas_used", receipt.gas_used);
                Ok(receipt.gas_used)
            }
            Ok(Err(revert)) => {
                let return_data = self.truncate(revert.return_data);
                spans::record_error_with_context(
                    "ReceiverReverted",
                    "receiver reverted",
                    Some(&return_data.to_string()),
                );
                warn!(
                    receiver = %message.receiver,
                    gas_used = revert.gas_used,
                    return_data = %return_data,
                    event = "receiver_reverted"
                );
                Err((return_data, revert.gas_used))
            }
        }
    }

    fn finalize(&self, message: &Message, state: ExecutionState, return_data: Bytes, gas_used: u64) {
        let key = message_key(message);
        {
            let mut ledger = self.lock_ledger();
            ledger.states.insert(key, state);
            ledger.in_flight.remove(&key);
            ledger.unsettled.remove(&key);
        }
        tracing::Span::current().record("state", state.name());

        let (source_chain_selector, sequence_number) = key;
        if state == ExecutionState::Success {
            info!(
                source_chain_selector = %source_chain_selector,
                sequence_number = sequence_number,
                gas_used = gas_used,
                event = "execution_state_changed"
            );
        } else {
            warn!(
                source_chain_selector = %source_chain_selector,
                sequence_number = sequence_number,
                state = %state,
                return_data = %return_data,
                event = "execution_state_changed"
            );
        }
        self.events.push(OffRampEvent::ExecutionStateChanged {
            source_chain_selector,
            sequence_number,
            message_id: message.message_id(),
            state,
            return_data,
            gas_used,
        });
    }

    fn truncate(&self, data: Bytes) -> Bytes {
        let max = self.static_config.max_return_bytes;
        if data.len() > max {
            Bytes::copy_from_slice(&data[..max])
        } else {
            data
        }
    }

    fn lock_ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Replaces the timing rules (owner only).
    pub fn set_dynamic_config(&self, caller: &Address, config: OffRampDynamicConfig) -> Result<()> {
        if caller != &self.owner {
            return Err(CcipError::OnlyCallableByOwner);
        }
        if config.manual_execution_horizon < config.permissionless_execution_threshold {
            return Err(CcipError::InvalidConfig(
                "manual execution horizon ends before permissionless execution starts".to_string(),
            ));
        }
        *self.dynamic_config.write().unwrap_or_else(|e| e.into_inner()) = config;
        info!(
            permissionless_execution_threshold_secs = config.permissionless_execution_threshold.as_secs(),
            manual_execution_horizon_secs = config.manual_execution_horizon.as_secs(),
            event = "offramp_dynamic_config_set"
        );
        Ok(())
    }

    pub fn get_execution_state(
        &self,
        source_chain_selector: ChainSelector,
        sequence_number: u64,
    ) -> ExecutionState {
        self.lock_ledger()
            .states
            .get(&(source_chain_selector, sequence_number))
            .copied()
            .unwrap_or_default()
    }

    /// Messages whose last attempt failed, in `(source, sequence)` order
    pub fn failed_messages(&self) -> Vec<(ChainSelector, u64)> {
        let mut failed: Vec<MessageKey> = self
            .lock_ledger()
            .states
            .iter()
            .filter(|(_, state)| **state == ExecutionState::Failure)
            .map(|(key, _)| *key)
            .collect();
        failed.sort();
        failed
    }

    /// Highest nonce of `sender` attempted from a source
    pub fn inbound_nonce(&self, source_chain_selector: ChainSelector, sender: &Address) -> u64 {
        self.lock_ledger()
            .inbound_nonces
            .get(&(source_chain_selector, sender.clone()))
            .copied()
            .unwrap_or(0)
    }

    pub fn static_config(&self) -> OffRampStaticConfig {
        self.static_config
    }

    pub fn dynamic_config(&self) -> OffRampDynamicConfig {
        *self.dynamic_config.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn receivers(&self) -> &ReceiverRegistry {
        &self.receivers
    }

    pub fn commit_store(&self) -> &CommitAggregator<C> {
        &self.commit_store
    }

    pub fn events(&self) -> &EventLog<OffRampEvent> {
        &self.events
    }
}

fn message_key(message: &Message) -> MessageKey {
    (
        message.header.source_chain_selector,
        message.header.sequence_number,
    )
}
