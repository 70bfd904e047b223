//! End-to-end tests of an Ethereum → Base lane using fake pools, receivers
//! and clocks
//!
//! Messages go through the whole pipeline: the OnRamp sequences them, the
//! commit store builds and accepts a report from the OnRamp's event log, and
//! the OffRamp executes them with proofs against the committed root.

use alloy_primitives::{address, Bytes, B256, U256};
use ccip_rs::chain::{BASE_MAINNET_SELECTOR, ETHEREUM_MAINNET_SELECTOR};
use ccip_rs::testing::{
    FakeAttestationProvider, FakeClock, FakeReceiver, FakeTokenPool, ReceiverBehavior,
};
use ccip_rs::{
    Address, AttestationPoller, CcipError, CctpMessage, CommitAggregator, CommitOutcome, Cursor,
    DestChainConfig, DomainId, ExecutionOutcome, ExecutionReport, ExecutionState, ExtraArgs,
    Interval, ManualExecutionRecovery, OffRampExecutor, OffRampStaticConfig, OnRampSequencer,
    OnRampStaticConfig, PollingConfig, SendRequest, SourceChainConfig, SourceTokenDataPayload,
    TokenAdminRegistry, TokenAmount, TokenPool, UsdcTokenPool,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const SOURCE: ccip_rs::ChainSelector = ETHEREUM_MAINNET_SELECTOR;
const DEST: ccip_rs::ChainSelector = BASE_MAINNET_SELECTOR;

fn owner() -> Address {
    Address::evm(address!("0000000000000000000000000000000000000001"))
}

fn alice() -> Address {
    Address::evm(address!("00000000000000000000000000000000000a11ce"))
}

fn on_ramp_address() -> Address {
    Address::evm(address!("00000000000000000000000000000000000000f1"))
}

fn receiver_address() -> Address {
    Address::evm(address!("00000000000000000000000000000000000000b0"))
}

fn source_token() -> Address {
    Address::evm(address!("00000000000000000000000000000000000000aa"))
}

fn dest_token() -> Address {
    Address::evm(address!("00000000000000000000000000000000000000bb"))
}

/// Logs to the test output when `RUST_LOG` is set, e.g. `RUST_LOG=ccip_rs=debug`
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn register(registry: &TokenAdminRegistry, token: &Address, pool: Arc<dyn TokenPool>) {
    registry
        .propose_administrator(&owner(), token, owner())
        .unwrap();
    registry.accept_admin_role(&owner(), token).unwrap();
    registry.set_pool(&owner(), token, Some(pool)).unwrap();
}

/// One lane with both ends wired to fakes
struct Lane {
    clock: FakeClock,
    on_ramp: Arc<OnRampSequencer>,
    commit_store: Arc<CommitAggregator<FakeClock>>,
    off_ramp: Arc<OffRampExecutor<FakeClock>>,
    recovery: ManualExecutionRecovery<FakeClock>,
    source_registry: Arc<TokenAdminRegistry>,
    dest_registry: Arc<TokenAdminRegistry>,
    receiver: Arc<FakeReceiver>,
    cursor: std::sync::Mutex<Cursor>,
}

impl Lane {
    fn new() -> Self {
        init_tracing();
        let clock = FakeClock::new();
        let source_registry = Arc::new(TokenAdminRegistry::new(owner()));
        let dest_registry = Arc::new(TokenAdminRegistry::new(owner()));

        let on_ramp = Arc::new(
            OnRampSequencer::builder()
                .static_config(OnRampStaticConfig {
                    chain_selector: SOURCE,
                })
                .address(on_ramp_address())
                .owner(owner())
                .token_admin_registry(source_registry.clone())
                .build(),
        );
        on_ramp
            .apply_dest_chain_config(&owner(), DEST, DestChainConfig::default())
            .unwrap();

        let commit_store = Arc::new(CommitAggregator::new(DEST, owner(), clock.clone()));
        commit_store
            .apply_source_chain_config(&owner(), SOURCE, SourceChainConfig::enabled(on_ramp_address()))
            .unwrap();

        let off_ramp = Arc::new(
            OffRampExecutor::builder()
                .static_config(OffRampStaticConfig::new(DEST))
                .owner(owner())
                .commit_store(commit_store.clone())
                .token_admin_registry(dest_registry.clone())
                .build(),
        );
        let receiver = Arc::new(FakeReceiver::new());
        off_ramp
            .receivers()
            .register(receiver_address(), receiver.clone());

        Self {
            clock,
            on_ramp,
            commit_store,
            recovery: ManualExecutionRecovery::new(off_ramp.clone()),
            off_ramp,
            source_registry,
            dest_registry,
            receiver,
            cursor: std::sync::Mutex::new(Cursor::START),
        }
    }

    /// Plain lock/mint pools for the test token on both ends
    fn with_token_pools(&self) -> (Arc<FakeTokenPool>, Arc<FakeTokenPool>) {
        let source_pool = Arc::new(FakeTokenPool::new(source_token()).with_dest_token(dest_token()));
        let dest_pool = Arc::new(FakeTokenPool::new(dest_token()));
        register(&self.source_registry, &source_token(), source_pool.clone());
        register(&self.dest_registry, &dest_token(), dest_pool.clone());
        (source_pool, dest_pool)
    }

    async fn send(&self, amount: u64) -> ccip_rs::RampMessageHeader {
        let token_amounts = if amount == 0 {
            vec![]
        } else {
            vec![TokenAmount::new(source_token(), U256::from(amount))]
        };
        let request = SendRequest::builder()
            .receiver(receiver_address().to_bytes())
            .data(b"ping".to_vec())
            .token_amounts(token_amounts)
            .build();
        self.on_ramp.send(DEST, &alice(), request).await.unwrap()
    }

    /// Commits everything sent since the last call and returns the
    /// execution reports in sequence order
    async fn commit_pending(&self) -> Vec<ExecutionReport> {
        let from = *self.cursor.lock().unwrap();
        let (pending, next) = self
            .commit_store
            .next_report(SOURCE, self.on_ramp.events(), from, 100)
            .await
            .unwrap();
        *self.cursor.lock().unwrap() = next;

        let pending = pending.expect("nothing to commit");
        assert_eq!(
            self.commit_store.commit(pending.report.clone()).unwrap(),
            CommitOutcome::Accepted
        );
        pending
            .messages
            .iter()
            .map(|m| ExecutionReport::new(m.clone(), pending.proof(m.sequence_number()).unwrap()))
            .collect()
    }
}

#[tokio::test]
async fn test_sequence_numbers_and_nonces_per_lane() {
    let lane = Lane::new();

    let first = lane.send(0).await;
    let second = lane.send(0).await;

    assert_eq!(first.sequence_number, 1);
    assert_eq!(first.ordering.nonce(), Some(1));
    assert_eq!(second.sequence_number, 2);
    assert_eq!(second.ordering.nonce(), Some(2));
    assert_eq!(lane.on_ramp.get_expected_next_sequence_number(DEST), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sends_are_gapless() {
    let lane = Lane::new();
    let senders: Vec<Address> = (1u8..=4)
        .map(|i| Address::evm(alloy_primitives::Address::with_last_byte(i)))
        .collect();

    let mut handles = Vec::new();
    for i in 0..40 {
        let on_ramp = lane.on_ramp.clone();
        let sender = senders[i % senders.len()].clone();
        handles.push(tokio::spawn(async move {
            let request = SendRequest::builder()
                .receiver(receiver_address().to_bytes())
                .build();
            on_ramp.send(DEST, &sender, request).await.unwrap()
        }));
    }

    let mut sequence_numbers = Vec::new();
    for handle in handles {
        sequence_numbers.push(handle.await.unwrap().sequence_number);
    }
    sequence_numbers.sort_unstable();
    assert_eq!(sequence_numbers, (1..=40).collect::<Vec<u64>>());

    for sender in &senders {
        let mut nonces: Vec<u64> = lane
            .on_ramp
            .sent_messages(DEST)
            .iter()
            .filter(|m| &m.sender == sender)
            .filter_map(|m| m.ordering().nonce())
            .collect();
        nonces.sort_unstable();
        assert_eq!(nonces, (1..=10).collect::<Vec<u64>>());
    }

    let reports = lane.commit_pending().await;
    assert_eq!(reports.len(), 40);
    assert_eq!(lane.commit_store.last_committed_sequence_number(SOURCE), 40);
}

#[tokio::test]
async fn test_commit_with_gap_rejected() {
    let lane = Lane::new();
    lane.send(0).await;
    lane.send(0).await;
    lane.commit_pending().await;

    let mut report = lane.commit_store.root_for(SOURCE, 1).unwrap().report;
    report.interval = Interval::new(4, 5);
    report.merkle_root = B256::repeat_byte(0x42);

    let err = lane.commit_store.commit(report).unwrap_err();
    insta::assert_snapshot!(
        err,
        @"Invalid commit range for source 5009297550715157269: min 4 max 5, expected min 3"
    );
    assert_eq!(lane.commit_store.last_committed_sequence_number(SOURCE), 2);
}

#[tokio::test]
async fn test_execute_once_then_skip() {
    let lane = Lane::new();
    lane.send(0).await;
    let report = lane.commit_pending().await.remove(0);

    let first = lane.off_ramp.execute(report.clone()).await.unwrap();
    assert!(first.is_success());

    let second = lane.off_ramp.execute(report).await.unwrap();
    assert_eq!(
        second,
        ExecutionOutcome::SkippedAlreadyExecuted {
            state: ExecutionState::Success
        }
    );
    assert_eq!(lane.off_ramp.get_execution_state(SOURCE, 1), ExecutionState::Success);
    assert_eq!(lane.receiver.call_count(), 1);

    let received = lane.receiver.received();
    assert_eq!(received[0].sender, alice());
    assert_eq!(received[0].data, Bytes::from_static(b"ping"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_executions_run_once() {
    let lane = Lane::new();
    let (_, dest_pool) = lane.with_token_pools();
    lane.send(100).await;
    let report = lane.commit_pending().await.remove(0);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let off_ramp = lane.off_ramp.clone();
        let report = report.clone();
        handles.push(tokio::spawn(async move { off_ramp.execute(report).await.unwrap() }));
    }

    let mut executed = 0;
    for handle in handles {
        match handle.await.unwrap() {
            ExecutionOutcome::Executed { state, .. } => {
                assert_eq!(state, ExecutionState::Success);
                executed += 1;
            }
            ExecutionOutcome::SkippedAlreadyExecuted { .. } => {}
            other => panic!("unexpected outcome {other:?}"),
        }
    }
    assert_eq!(executed, 1);
    assert_eq!(dest_pool.minted(), U256::from(100));
    assert_eq!(lane.receiver.call_count(), 1);
}

#[tokio::test]
async fn test_tampered_message_fails_proof() {
    let lane = Lane::new();
    lane.send(0).await;
    let mut report = lane.commit_pending().await.remove(0);
    report.message.receiver = alice();

    let err = lane.off_ramp.execute(report).await.unwrap_err();
    assert!(matches!(err, CcipError::InvalidProof { .. }));
    assert_eq!(lane.receiver.call_count(), 0);
}

#[tokio::test]
async fn test_failed_pool_recovered_by_manual_execution() {
    let lane = Lane::new();
    let (source_pool, dest_pool) = lane.with_token_pools();
    lane.send(100).await;
    assert_eq!(source_pool.locked(), U256::from(100));
    let report = lane.commit_pending().await.remove(0);

    dest_pool.set_fail_release_or_mint(true);
    let outcome = lane.off_ramp.execute(report.clone()).await.unwrap();
    assert_eq!(outcome.state(), Some(ExecutionState::Failure));
    assert_eq!(lane.receiver.call_count(), 0);
    assert_eq!(dest_pool.minted(), U256::ZERO);
    assert_eq!(lane.recovery.failed_messages(), vec![(SOURCE, 1)]);

    dest_pool.set_fail_release_or_mint(false);
    let outcomes = lane
        .recovery
        .manually_execute(vec![report.clone()], vec![])
        .await
        .unwrap();
    assert!(outcomes[0].is_success());
    assert_eq!(dest_pool.minted(), U256::from(100));
    assert_eq!(dest_pool.release_or_mint_calls(), 2);
    assert_eq!(lane.receiver.call_count(), 1);
    assert_eq!(lane.receiver.received()[0].dest_token_amounts[0].token, dest_token());

    let err = lane
        .recovery
        .manually_execute(vec![report], vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, CcipError::AlreadyExecuted { .. }));
    assert_eq!(dest_pool.minted(), U256::from(100));
    assert!(lane.recovery.failed_messages().is_empty());
}

#[tokio::test]
async fn test_manual_batch_is_validated_up_front() {
    let lane = Lane::new();
    lane.send(0).await;
    lane.send(0).await;
    let reports = lane.commit_pending().await;

    lane.receiver
        .set_behavior(ReceiverBehavior::Revert {
            gas_used: 10_000,
            return_data: Bytes::from_static(&[0x08, 0xc3, 0x79, 0xa0]),
        });
    let failed = lane.off_ramp.execute(reports[0].clone()).await.unwrap();
    assert_eq!(failed.state(), Some(ExecutionState::Failure));

    lane.receiver
        .set_behavior(ReceiverBehavior::Accept { gas_used: 10_000 });

    // The second message is untouched and the commit is fresh
    let err = lane
        .recovery
        .manually_execute(reports.clone(), vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, CcipError::ManualExecutionNotYetEnabled { .. }));
    assert_eq!(lane.off_ramp.get_execution_state(SOURCE, 1), ExecutionState::Failure);

    let err = lane
        .recovery
        .manually_execute(reports.clone(), vec![0])
        .await
        .unwrap_err();
    assert!(matches!(err, CcipError::InvalidConfig(_)));

    lane.clock.advance(Duration::from_secs(8 * 60 * 60 + 1));
    let outcomes = lane
        .recovery
        .manually_execute(reports, vec![0, 300_000])
        .await
        .unwrap();
    assert!(outcomes.iter().all(ExecutionOutcome::is_success));
}

#[tokio::test]
async fn test_manual_batch_with_repeated_message_changes_nothing() {
    let lane = Lane::new();
    lane.send(0).await;
    let report = lane.commit_pending().await.remove(0);

    lane.receiver.set_behavior(ReceiverBehavior::Revert {
        gas_used: 10_000,
        return_data: Bytes::new(),
    });
    lane.off_ramp.execute(report.clone()).await.unwrap();
    assert_eq!(lane.off_ramp.get_execution_state(SOURCE, 1), ExecutionState::Failure);

    lane.receiver
        .set_behavior(ReceiverBehavior::Accept { gas_used: 10_000 });
    let err = lane
        .recovery
        .manually_execute(vec![report.clone(), report.clone()], vec![])
        .await
        .unwrap_err();

    insta::assert_snapshot!(
        err,
        @"Message source 5009297550715157269 seq 1 appears twice in one manual batch"
    );
    assert_eq!(lane.off_ramp.get_execution_state(SOURCE, 1), ExecutionState::Failure);
    assert_eq!(lane.receiver.call_count(), 1);

    let outcomes = lane
        .recovery
        .manually_execute(vec![report], vec![])
        .await
        .unwrap();
    assert!(outcomes[0].is_success());
}

#[tokio::test]
async fn test_manual_execution_expires() {
    let lane = Lane::new();
    lane.send(0).await;
    let report = lane.commit_pending().await.remove(0);
    lane.receiver.set_behavior(ReceiverBehavior::Accept { gas_used: 500_000 });
    lane.off_ramp.execute(report.clone()).await.unwrap();

    lane.clock.advance(Duration::from_secs(31 * 24 * 60 * 60));
    let err = lane
        .recovery
        .manually_execute(vec![report], vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, CcipError::StaleCommitReport { .. }));
}

#[tokio::test]
async fn test_out_of_order_nonce_skipped_until_predecessor_runs() {
    let lane = Lane::new();
    lane.send(0).await;
    lane.send(0).await;
    let reports = lane.commit_pending().await;

    let early = lane.off_ramp.execute(reports[1].clone()).await.unwrap();
    assert_eq!(
        early,
        ExecutionOutcome::SkippedNonceOutOfOrder {
            expected: 1,
            actual: 2
        }
    );

    assert!(lane.off_ramp.execute(reports[0].clone()).await.unwrap().is_success());
    assert!(lane.off_ramp.execute(reports[1].clone()).await.unwrap().is_success());
}

#[tokio::test]
async fn test_unordered_messages_skip_nonce_gate() {
    let lane = Lane::new();
    for _ in 0..2 {
        let request = SendRequest::builder()
            .receiver(receiver_address().to_bytes())
            .extra_args(ExtraArgs::out_of_order(100_000).encode())
            .build();
        lane.on_ramp.send(DEST, &alice(), request).await.unwrap();
    }
    assert_eq!(lane.on_ramp.get_sender_nonce(DEST, &alice()), 0);

    let reports = lane.commit_pending().await;
    assert!(lane.off_ramp.execute(reports[1].clone()).await.unwrap().is_success());
    assert!(lane.off_ramp.execute(reports[0].clone()).await.unwrap().is_success());
}

#[tokio::test(start_paused = true)]
async fn test_hanging_receiver_times_out_and_recovers() {
    let lane = Lane::new();
    let (_, dest_pool) = lane.with_token_pools();
    lane.send(100).await;
    let report = lane.commit_pending().await.remove(0);

    lane.receiver.set_behavior(ReceiverBehavior::Hang);
    let outcome = lane.off_ramp.execute(report.clone()).await.unwrap();
    let ExecutionOutcome::Executed { state, return_data } = outcome else {
        panic!("expected an execution");
    };
    assert_eq!(state, ExecutionState::Failure);
    assert_eq!(return_data, Bytes::from_static(b"receiver timed out"));
    assert_eq!(dest_pool.minted(), U256::ZERO);

    lane.receiver.set_behavior(ReceiverBehavior::Accept { gas_used: 1_000 });
    let outcomes = lane
        .recovery
        .manually_execute(vec![report], vec![])
        .await
        .unwrap();
    assert!(outcomes[0].is_success());
    assert_eq!(dest_pool.minted(), U256::from(100));
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_execution_can_be_retried_manually() {
    let lane = Lane::new();
    lane.send(0).await;
    let report = lane.commit_pending().await.remove(0);

    lane.receiver.set_behavior(ReceiverBehavior::Hang);
    let abandoned =
        tokio::time::timeout(Duration::from_millis(10), lane.off_ramp.execute(report.clone())).await;
    assert!(abandoned.is_err());
    assert_eq!(
        lane.off_ramp.get_execution_state(SOURCE, 1),
        ExecutionState::InProgress
    );

    let skipped = lane.off_ramp.execute(report.clone()).await.unwrap();
    assert_eq!(
        skipped,
        ExecutionOutcome::SkippedAlreadyExecuted {
            state: ExecutionState::InProgress
        }
    );

    lane.receiver.set_behavior(ReceiverBehavior::Accept { gas_used: 1_000 });
    let outcomes = lane
        .recovery
        .manually_execute(vec![report], vec![])
        .await
        .unwrap();
    assert!(outcomes[0].is_success());
}

#[tokio::test]
async fn test_abandoned_execution_with_tokens_mints_once() {
    let lane = Lane::new();
    let (_, dest_pool) = lane.with_token_pools();
    lane.send(100).await;
    let report = lane.commit_pending().await.remove(0);

    // Tokens land, then the worker is dropped inside the receiver call
    lane.receiver.set_behavior(ReceiverBehavior::Hang);
    let abandoned =
        tokio::time::timeout(Duration::from_millis(10), lane.off_ramp.execute(report.clone())).await;
    assert!(abandoned.is_err());
    assert_eq!(dest_pool.minted(), U256::from(100));

    lane.receiver.set_behavior(ReceiverBehavior::Accept { gas_used: 1_000 });
    let outcomes = lane
        .recovery
        .manually_execute(vec![report], vec![])
        .await
        .unwrap();

    assert!(outcomes[0].is_success());
    assert_eq!(dest_pool.minted(), U256::from(100));
    assert_eq!(dest_pool.release_or_mint_calls(), 2);
    assert_eq!(dest_pool.rollback_count(), 1);
    assert_eq!(lane.receiver.call_count(), 2);
}

#[tokio::test]
async fn test_usdc_transfer_recovered_once_attested() {
    let lane = Lane::new();
    let usdc_ethereum = source_token();
    let usdc_base = dest_token();

    let source_inner = Arc::new(FakeTokenPool::new(usdc_ethereum.clone()).with_dest_token(usdc_base.clone()));
    let source_pool = Arc::new(UsdcTokenPool::new(
        source_inner,
        FakeAttestationProvider::new(),
        DomainId::Ethereum,
    ));
    register(&lane.source_registry, &usdc_ethereum, source_pool.clone());

    let attestations = FakeAttestationProvider::new();
    let dest_inner = Arc::new(FakeTokenPool::new(usdc_base.clone()));
    let dest_pool = Arc::new(UsdcTokenPool::new(
        dest_inner.clone(),
        attestations.clone(),
        DomainId::Base,
    ));
    register(&lane.dest_registry, &usdc_base, dest_pool);

    lane.send(100).await;
    let report = lane.commit_pending().await.remove(0);

    // A relayer reads the CCTP message from the source chain
    let payload = SourceTokenDataPayload::decode(&report.message.token_amounts[0].extra_data).unwrap();
    let cctp_message = source_pool.cctp_message(payload.nonce).unwrap();
    let message_hash = CctpMessage::decode(&cctp_message).unwrap().hash();
    let report = report.with_offchain_token_data(vec![cctp_message]);

    let outcome = lane.off_ramp.execute(report.clone()).await.unwrap();
    assert_eq!(outcome.state(), Some(ExecutionState::Failure));
    assert_eq!(dest_inner.minted(), U256::ZERO);

    attestations.add_pending_then_complete(message_hash, 2, Bytes::from(vec![0xaa; 65]));
    let poller = AttestationPoller::new(
        attestations.clone(),
        lane.clock.clone(),
        PollingConfig::fast_transfer(),
    );
    let outcome = lane
        .recovery
        .recover_when_attested(report, &poller, 0)
        .await
        .unwrap();

    assert!(outcome.is_success());
    assert_eq!(dest_inner.minted(), U256::from(100));
    assert_eq!(lane.clock.sleep_count(), 2);
    assert_eq!(lane.off_ramp.get_execution_state(SOURCE, 1), ExecutionState::Success);
}

#[tokio::test]
async fn test_usdc_recovery_gives_up_on_failed_attestation() {
    let lane = Lane::new();
    let source_pool = Arc::new(UsdcTokenPool::new(
        Arc::new(FakeTokenPool::new(source_token()).with_dest_token(dest_token())),
        FakeAttestationProvider::new(),
        DomainId::Ethereum,
    ));
    register(&lane.source_registry, &source_token(), source_pool.clone());
    let attestations = FakeAttestationProvider::new();
    register(
        &lane.dest_registry,
        &dest_token(),
        Arc::new(UsdcTokenPool::new(
            Arc::new(FakeTokenPool::new(dest_token())),
            attestations.clone(),
            DomainId::Base,
        )),
    );

    lane.send(100).await;
    let report = lane.commit_pending().await.remove(0);
    let payload = SourceTokenDataPayload::decode(&report.message.token_amounts[0].extra_data).unwrap();
    let cctp_message = source_pool.cctp_message(payload.nonce).unwrap();
    let message_hash = CctpMessage::decode(&cctp_message).unwrap().hash();
    let report = report.with_offchain_token_data(vec![cctp_message]);

    lane.off_ramp.execute(report.clone()).await.unwrap();
    attestations.add_failed_response(message_hash);

    let poller = AttestationPoller::new(attestations, lane.clock.clone(), PollingConfig::default());
    let err = lane
        .recovery
        .recover_when_attested(report, &poller, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, CcipError::AttestationFailed { .. }));
    assert_eq!(lane.off_ramp.get_execution_state(SOURCE, 1), ExecutionState::Failure);
}

#[test]
fn test_wire_values_reachable_from_crate_root() {
    let encoded = ExtraArgs::default().encode();
    assert_eq!(&encoded[..4], &ccip_rs::GENERIC_EXTRA_ARGS_V2_TAG);
    assert_eq!(ExtraArgs::decode(&encoded).unwrap().gas_limit, ccip_rs::DEFAULT_GAS_LIMIT);

    let mut legacy = ccip_rs::EVM_EXTRA_ARGS_V1_TAG.to_vec();
    legacy.extend_from_slice(&U256::from(90_000u64).to_be_bytes::<32>());
    assert_eq!(ExtraArgs::decode(&legacy).unwrap(), ExtraArgs::new(90_000, false));

    assert_eq!(DomainId::try_from(4u32), Err(ccip_rs::InvalidDomainId(4)));
    assert_eq!(ExecutionState::try_from(9u8), Err(ccip_rs::InvalidExecutionState(9)));

    let mut lane = ccip_rs::LaneState::default();
    lane.allocate(&owner(), true);
    assert_eq!(lane.last_sequence_number(), 1);
    assert_eq!(lane.sender_nonce(&owner()), 0);
}
