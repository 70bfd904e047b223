//! Commit store: building and accepting commit reports
//!
//! A report binds the next contiguous window of a source lane to a Merkle
//! root. The store accepts reports strictly in lane order, so once
//! `[min, max]` is committed the next report must start at `max + 1`.
//! Accepted roots are kept with their commit time, which the OffRamp uses
//! for its manual execution rules.

use alloy_primitives::{B256, U256};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::SourceChainConfig;
use crate::error::{CcipError, Result};
use crate::events::{Cursor, EventLog};
use crate::onramp::OnRampEvent;
use crate::protocol::{Address, ChainSelector, CommitReport, Interval, MerkleTree, Message};
use crate::spans;
use crate::traits::{Clock, EventSource};

/// An accepted report and when it was accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedRoot {
    pub report: CommitReport,
    pub committed_at: Instant,
}

impl CommittedRoot {
    pub fn merkle_root(&self) -> B256 {
        self.report.merkle_root
    }

    pub fn interval(&self) -> Interval {
        self.report.interval
    }
}

/// Result of [`CommitAggregator::commit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Accepted,
    /// The identical report was accepted before; nothing changed
    AlreadyCommitted,
}

/// A report built from source messages, with the messages themselves
/// (which executors need to produce proofs)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReport {
    pub report: CommitReport,
    pub messages: Vec<Message>,
}

impl PendingReport {
    pub fn message(&self, sequence_number: u64) -> Option<&Message> {
        self.messages
            .iter()
            .find(|m| m.sequence_number() == sequence_number)
    }

    /// Execution proof for one message of the batch
    pub fn proof(&self, sequence_number: u64) -> Result<Vec<B256>> {
        proof_for(&self.messages, sequence_number)
    }
}

/// Events recorded by the commit store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "event")]
pub enum CommitEvent {
    CommitReportAccepted {
        report: CommitReport,
    },
    SourceChainConfigSet {
        source_chain_selector: ChainSelector,
        config: SourceChainConfig,
    },
}

#[derive(Debug)]
struct SourceState {
    config: SourceChainConfig,
    last_committed: u64,
    roots: BTreeMap<u64, CommittedRoot>,
}

#[derive(Debug, Default)]
struct Prices {
    token_prices: HashMap<Address, U256>,
    gas_prices: HashMap<ChainSelector, U256>,
    latest_price_sequence_number: u64,
}

/// Validates and stores commit reports for every lane into this chain.
pub struct CommitAggregator<C: Clock> {
    chain_selector: ChainSelector,
    owner: Address,
    clock: C,
    sources: RwLock<HashMap<ChainSelector, SourceState>>,
    prices: RwLock<Prices>,
    events: EventLog<CommitEvent>,
}

impl<C: Clock> std::fmt::Debug for CommitAggregator<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommitAggregator")
            .field("chain_selector", &self.chain_selector)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

impl<C: Clock> CommitAggregator<C> {
    /// Commit store on `chain_selector`, timestamping commits with `clock`
    pub fn new(chain_selector: ChainSelector, owner: Address, clock: C) -> Self {
        Self {
            chain_selector,
            owner,
            clock,
            sources: RwLock::new(HashMap::new()),
            prices: RwLock::new(Prices::default()),
            events: EventLog::new(),
        }
    }

    /// Enables, disables or reconfigures a source chain (owner only).
    ///
    /// Reconfiguring keeps the lane's committed range.
    pub fn apply_source_chain_config(
        &self,
        caller: &Address,
        source_chain_selector: ChainSelector,
        config: SourceChainConfig,
    ) -> Result<()> {
        if caller != &self.owner {
            return Err(CcipError::OnlyCallableByOwner);
        }
        if source_chain_selector.is_zero() || source_chain_selector == self.chain_selector {
            return Err(CcipError::InvalidConfig(format!(
                "invalid source chain selector {source_chain_selector}"
            )));
        }
        if config.on_ramp.is_zero() {
            return Err(CcipError::InvalidConfig(format!(
                "source {source_chain_selector} has no on_ramp"
            )));
        }

        let mut sources = self.sources.write().unwrap_or_else(|e| e.into_inner());
        match sources.get_mut(&source_chain_selector) {
            Some(state) => state.config = config.clone(),
            None => {
                sources.insert(
                    source_chain_selector,
                    SourceState {
                        config: config.clone(),
                        last_committed: 0,
                        roots: BTreeMap::new(),
                    },
                );
            }
        }
        drop(sources);

        info!(
            source_chain_selector = %source_chain_selector,
            is_enabled = config.is_enabled,
            on_ramp = %config.on_ramp,
            event = "source_chain_config_set"
        );
        self.events.push(CommitEvent::SourceChainConfigSet {
            source_chain_selector,
            config,
        });
        Ok(())
    }

    /// Accepts a report for the next window of its lane.
    ///
    /// # Errors
    ///
    /// A rejected report changes nothing:
    /// - [`CcipError::InvalidMessageDestChainSelector`] for another chain's report
    /// - [`CcipError::SourceChainNotEnabled`] for unknown or disabled sources
    /// - [`CcipError::InvalidInterval`] when `min > max`
    /// - [`CcipError::InvalidRoot`] for a zero root
    /// - [`CcipError::RootAlreadyCommitted`] when the root was used for another window
    /// - [`CcipError::InvalidCommitRange`] unless `min` is the lane's last
    ///   committed sequence number plus one
    pub fn commit(&self, report: CommitReport) -> Result<CommitOutcome> {
        let span = spans::commit(
            report.source_chain_selector,
            report.dest_chain_selector,
            report.interval,
        );
        let _guard = span.enter();

        let result = self.try_commit(report);
        if let Err(ref e) = result {
            spans::record_error(e);
            warn!(error = %e, event = "commit_report_rejected");
        }
        result
    }

    fn try_commit(&self, report: CommitReport) -> Result<CommitOutcome> {
        let source = report.source_chain_selector;
        if report.dest_chain_selector != self.chain_selector {
            return Err(CcipError::InvalidMessageDestChainSelector {
                expected: self.chain_selector,
                actual: report.dest_chain_selector,
            });
        }

        let mut sources = self.sources.write().unwrap_or_else(|e| e.into_inner());
        let state = sources
            .get_mut(&source)
            .filter(|state| state.config.is_enabled)
            .ok_or(CcipError::SourceChainNotEnabled {
                source_chain_selector: source,
            })?;

        let interval = report.interval;
        if !interval.is_valid() {
            return Err(CcipError::InvalidInterval {
                source_chain_selector: source,
                min: interval.min,
                max: interval.max,
            });
        }
        if report.merkle_root.is_zero() {
            return Err(CcipError::InvalidRoot {
                source_chain_selector: source,
            });
        }

        if let Some(existing) = state.roots.get(&interval.min) {
            if existing.report == report {
                debug!(interval = %interval, event = "commit_report_already_committed");
                return Ok(CommitOutcome::AlreadyCommitted);
            }
        }
        if state
            .roots
            .values()
            .any(|root| root.merkle_root() == report.merkle_root)
        {
            return Err(CcipError::RootAlreadyCommitted {
                root: report.merkle_root,
            });
        }

        let expected = state.last_committed + 1;
        if interval.min != expected {
            return Err(CcipError::InvalidCommitRange {
                source_chain_selector: source,
                min: interval.min,
                max: interval.max,
                expected,
            });
        }

        state.last_committed = interval.max;
        state.roots.insert(
            interval.min,
            CommittedRoot {
                report: report.clone(),
                committed_at: self.clock.now(),
            },
        );
        drop(sources);

        if report.has_price_updates() {
            let mut prices = self.prices.write().unwrap_or_else(|e| e.into_inner());
            for update in &report.token_price_updates {
                prices
                    .token_prices
                    .insert(update.source_token.clone(), update.usd_per_token);
            }
            for update in &report.gas_price_updates {
                prices
                    .gas_prices
                    .insert(update.dest_chain_selector, update.usd_per_unit_gas);
            }
            prices.latest_price_sequence_number += 1;
        }

        info!(
            source_chain_selector = %source,
            interval = %interval,
            merkle_root = %report.merkle_root,
            event = "commit_report_accepted"
        );
        self.events.push(CommitEvent::CommitReportAccepted { report });
        Ok(CommitOutcome::Accepted)
    }

    /// Builds the next report for a source from the OnRamp's event stream.
    ///
    /// Reads up to `limit` events after `from`, keeps the lane's sent
    /// messages that are not committed yet and returns a report over them
    /// together with the cursor to resume from. Returns no report when the
    /// batch holds nothing new.
    ///
    /// # Errors
    ///
    /// [`CcipError::InvalidCommitRange`] when the uncommitted messages do
    /// not continue the committed range without gaps.
    pub async fn next_report<S>(
        &self,
        source_chain_selector: ChainSelector,
        events: &S,
        from: Cursor,
        limit: usize,
    ) -> Result<(Option<PendingReport>, Cursor)>
    where
        S: EventSource<OnRampEvent> + ?Sized,
    {
        let (batch, next) = events.next_batch(from, limit).await?;
        let last_committed = self.last_committed_sequence_number(source_chain_selector);

        let messages: Vec<Message> = batch
            .iter()
            .filter_map(OnRampEvent::sent_message)
            .filter(|m| {
                m.header.source_chain_selector == source_chain_selector
                    && m.header.dest_chain_selector == self.chain_selector
                    && m.sequence_number() > last_committed
            })
            .cloned()
            .collect();

        if messages.is_empty() {
            return Ok((None, next));
        }

        let report = build_report(
            source_chain_selector,
            self.chain_selector,
            last_committed + 1,
            &messages,
        )?;
        debug!(
            source_chain_selector = %source_chain_selector,
            interval = %report.interval,
            cursor = %next,
            event = "commit_report_built"
        );
        Ok((Some(PendingReport { report, messages }), next))
    }

    /// Proof for the message with `sequence_number` within a committed
    /// batch of `messages`
    pub fn proof_for(&self, messages: &[Message], sequence_number: u64) -> Result<Vec<B256>> {
        proof_for(messages, sequence_number)
    }

    /// Accepted report covering `sequence_number` on a source lane
    pub fn root_for(
        &self,
        source_chain_selector: ChainSelector,
        sequence_number: u64,
    ) -> Option<CommittedRoot> {
        let sources = self.sources.read().unwrap_or_else(|e| e.into_inner());
        sources
            .get(&source_chain_selector)?
            .roots
            .range(..=sequence_number)
            .next_back()
            .map(|(_, root)| root)
            .filter(|root| root.interval().contains(sequence_number))
            .cloned()
    }

    /// Highest committed sequence number of a source lane; 0 before the
    /// first commit
    pub fn last_committed_sequence_number(&self, source_chain_selector: ChainSelector) -> u64 {
        self.sources
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&source_chain_selector)
            .map(|state| state.last_committed)
            .unwrap_or(0)
    }

    pub fn source_chain_config(
        &self,
        source_chain_selector: ChainSelector,
    ) -> Option<SourceChainConfig> {
        self.sources
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&source_chain_selector)
            .map(|state| state.config.clone())
    }

    /// Number of accepted reports that carried price updates
    pub fn latest_price_sequence_number(&self) -> u64 {
        self.read_prices().latest_price_sequence_number
    }

    pub fn token_price(&self, token: &Address) -> Option<U256> {
        self.read_prices().token_prices.get(token).copied()
    }

    pub fn gas_price(&self, dest_chain_selector: ChainSelector) -> Option<U256> {
        self.read_prices().gas_prices.get(&dest_chain_selector).copied()
    }

    pub fn chain_selector(&self) -> ChainSelector {
        self.chain_selector
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn events(&self) -> &EventLog<CommitEvent> {
        &self.events
    }

    fn read_prices(&self) -> std::sync::RwLockReadGuard<'_, Prices> {
        self.prices.read().unwrap_or_else(|e| e.into_inner())
    }
}

/// Builds a report over `messages`, which must be in sequence order and
/// start at `expected_min`.
pub fn build_report(
    source_chain_selector: ChainSelector,
    dest_chain_selector: ChainSelector,
    expected_min: u64,
    messages: &[Message],
) -> Result<CommitReport> {
    let (first, last) = match (messages.first(), messages.last()) {
        (Some(first), Some(last)) => (first.sequence_number(), last.sequence_number()),
        _ => return Err(CcipError::LeavesCannotBeEmpty),
    };

    let gapless = messages
        .iter()
        .zip(expected_min..)
        .all(|(message, expected)| message.sequence_number() == expected);
    if !gapless {
        return Err(CcipError::InvalidCommitRange {
            source_chain_selector,
            min: first,
            max: last,
            expected: expected_min,
        });
    }

    let tree = MerkleTree::from_leaves(messages.iter().map(Message::leaf_hash).collect())?;
    Ok(CommitReport {
        source_chain_selector,
        dest_chain_selector,
        interval: Interval::new(first, last),
        merkle_root: tree.root(),
        token_price_updates: Vec::new(),
        gas_price_updates: Vec::new(),
    })
}

/// Sibling path for the message with `sequence_number` in a batch
///
/// # Errors
///
/// [`CcipError::InvalidProof`] when no message in the batch has that
/// sequence number.
pub fn proof_for(messages: &[Message], sequence_number: u64) -> Result<Vec<B256>> {
    let index = messages
        .iter()
        .position(|m| m.sequence_number() == sequence_number)
        .ok_or_else(|| CcipError::InvalidProof {
            source_chain_selector: messages
                .first()
                .map_or(ChainSelector::new(0), |m| m.header.source_chain_selector),
            sequence_number,
            reason: "sequence number is not part of the batch".to_string(),
        })?;
    let tree = MerkleTree::from_leaves(messages.iter().map(Message::leaf_hash).collect())?;
    Ok(tree.proof(index)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{merkle, GasPriceUpdate, OrderingMode, RampMessageHeader};
    use crate::testing::FakeClock;
    use alloy_primitives::{address, Bytes};
    use rstest::rstest;

    const SOURCE: ChainSelector = ChainSelector::new(1);
    const DEST: ChainSelector = ChainSelector::new(2);

    fn owner() -> Address {
        Address::evm(address!("0000000000000000000000000000000000000001"))
    }

    fn on_ramp() -> Address {
        Address::evm(address!("00000000000000000000000000000000000000f1"))
    }

    fn message(sequence_number: u64) -> Message {
        let mut message = Message {
            header: RampMessageHeader {
                message_id: B256::ZERO,
                source_chain_selector: SOURCE,
                dest_chain_selector: DEST,
                sequence_number,
                ordering: OrderingMode::Ordered {
                    nonce: sequence_number,
                },
            },
            on_ramp: on_ramp(),
            sender: owner(),
            receiver: owner(),
            data: Bytes::from(sequence_number.to_be_bytes().to_vec()),
            gas_limit: 200_000,
            token_amounts: vec![],
        };
        message.header.message_id = message.compute_id();
        message
    }

    fn store() -> CommitAggregator<FakeClock> {
        let store = CommitAggregator::new(DEST, owner(), FakeClock::new());
        store
            .apply_source_chain_config(&owner(), SOURCE, SourceChainConfig::enabled(on_ramp()))
            .unwrap();
        store
    }

    fn report(min: u64, max: u64) -> CommitReport {
        let messages: Vec<Message> = (min..=max).map(message).collect();
        build_report(SOURCE, DEST, min, &messages).unwrap()
    }

    #[test]
    fn test_gap_rejected() {
        let store = store();
        assert_eq!(store.commit(report(1, 2)).unwrap(), CommitOutcome::Accepted);

        let err = store.commit(report(4, 5)).unwrap_err();
        insta::assert_snapshot!(
            err.to_string(),
            @"Invalid commit range for source 1: min 4 max 5, expected min 3"
        );
        assert_eq!(store.last_committed_sequence_number(SOURCE), 2);
    }

    #[test]
    fn test_identical_report_is_noop() {
        let store = store();
        store.commit(report(1, 3)).unwrap();
        assert_eq!(
            store.commit(report(1, 3)).unwrap(),
            CommitOutcome::AlreadyCommitted
        );
        assert_eq!(store.events().len(), 2);
    }

    #[test]
    fn test_reused_root_rejected() {
        let store = store();
        let first = report(1, 1);
        store.commit(first.clone()).unwrap();

        let mut second = report(2, 2);
        second.merkle_root = first.merkle_root;
        assert!(matches!(
            store.commit(second),
            Err(CcipError::RootAlreadyCommitted { .. })
        ));
    }

    #[rstest]
    #[case::inverted(Interval::new(3, 1), B256::repeat_byte(1))]
    #[case::zero_root(Interval::new(1, 1), B256::ZERO)]
    fn test_malformed_reports_rejected(#[case] interval: Interval, #[case] root: B256) {
        let store = store();
        let mut bad = report(1, 1);
        bad.interval = interval;
        bad.merkle_root = root;

        let err = store.commit(bad).unwrap_err();
        assert!(matches!(
            err,
            CcipError::InvalidInterval { .. } | CcipError::InvalidRoot { .. }
        ));
        assert_eq!(store.last_committed_sequence_number(SOURCE), 0);
    }

    #[test]
    fn test_wrong_chain_or_disabled_source_rejected() {
        let store = store();
        let mut foreign = report(1, 1);
        foreign.dest_chain_selector = ChainSelector::new(9);
        assert!(matches!(
            store.commit(foreign),
            Err(CcipError::InvalidMessageDestChainSelector { .. })
        ));

        store
            .apply_source_chain_config(
                &owner(),
                SOURCE,
                SourceChainConfig {
                    is_enabled: false,
                    on_ramp: on_ramp(),
                },
            )
            .unwrap();
        assert!(matches!(
            store.commit(report(1, 1)),
            Err(CcipError::SourceChainNotEnabled { .. })
        ));
    }

    #[test]
    fn test_root_lookup_and_proofs() {
        let store = store();
        let messages: Vec<Message> = (1..=5).map(message).collect();
        store.commit(report(1, 5)).unwrap();

        let committed = store.root_for(SOURCE, 4).unwrap();
        assert_eq!(committed.interval(), Interval::new(1, 5));
        assert!(store.root_for(SOURCE, 6).is_none());

        for m in &messages {
            let proof = store.proof_for(&messages, m.sequence_number()).unwrap();
            assert!(merkle::verify_proof(
                committed.merkle_root(),
                m.leaf_hash(),
                &proof
            ));
        }
        assert!(store.proof_for(&messages, 6).is_err());
    }

    #[test]
    fn test_price_updates_stored() {
        let store = store();
        let with_prices = report(1, 1).with_price_updates(
            vec![],
            vec![GasPriceUpdate {
                dest_chain_selector: SOURCE,
                usd_per_unit_gas: U256::from(42),
            }],
        );
        store.commit(with_prices).unwrap();
        store.commit(report(2, 2)).unwrap();

        assert_eq!(store.latest_price_sequence_number(), 1);
        assert_eq!(store.gas_price(SOURCE), Some(U256::from(42)));
    }

    #[tokio::test]
    async fn test_next_report_skips_committed_messages() {
        let store = store();
        let log = EventLog::new();
        for seq in 1..=4 {
            log.push(OnRampEvent::CcipMessageSent {
                dest_chain_selector: DEST,
                sequence_number: seq,
                message: message(seq),
            });
        }
        store.commit(report(1, 2)).unwrap();

        let (pending, cursor) = store
            .next_report(SOURCE, &log, Cursor::START, 10)
            .await
            .unwrap();
        let pending = pending.unwrap();
        assert_eq!(pending.report.interval, Interval::new(3, 4));
        assert_eq!(pending.messages.len(), 2);
        assert_eq!(cursor, Cursor::new(4));

        store.commit(pending.report).unwrap();
        let (pending, _) = store.next_report(SOURCE, &log, cursor, 10).await.unwrap();
        assert!(pending.is_none());
    }

    #[test]
    fn test_build_report_requires_contiguous_messages() {
        let messages = vec![message(1), message(3)];
        assert!(matches!(
            build_report(SOURCE, DEST, 1, &messages),
            Err(CcipError::InvalidCommitRange { .. })
        ));
        assert!(matches!(
            build_report(SOURCE, DEST, 1, &[]),
            Err(CcipError::LeavesCannotBeEmpty)
        ));
    }
}
