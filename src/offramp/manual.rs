//! Operator-driven retries of failed or stuck messages

use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, Instrument};

use super::{ExecutionMode, ExecutionOutcome, ExecutionReport, OffRampExecutor};
use crate::error::{CcipError, Result};
use crate::protocol::{ChainSelector, CctpMessage};
use crate::spans;
use crate::token::AttestationPoller;
use crate::traits::{AttestationProvider, Clock};

/// Manual execution on top of an [`OffRampExecutor`].
///
/// Manual execution shares the automatic path's state machine, so a retry
/// can never run a message that already succeeded or that another worker
/// is executing. It differs in who may run it and when:
///
/// - a message that has not been attempted yet can only be forced once the
///   commit is older than the permissionless execution threshold;
/// - nothing can be retried once the commit passes the manual execution
///   horizon;
/// - the gas limit may be raised, never lowered.
#[derive(Debug)]
pub struct ManualExecutionRecovery<C: Clock> {
    executor: Arc<OffRampExecutor<C>>,
}

impl<C: Clock> ManualExecutionRecovery<C> {
    pub fn new(executor: Arc<OffRampExecutor<C>>) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &OffRampExecutor<C> {
        &self.executor
    }

    /// Retries a batch of messages, optionally with raised gas limits.
    ///
    /// `gas_limit_overrides` is either empty or holds one entry per report;
    /// 0 keeps the message's own limit. Every report is validated before
    /// any of them runs, so a batch with one inadmissible report changes
    /// nothing. A report refused once the batch is running, e.g. because
    /// another worker claimed it meanwhile, comes back as
    /// [`ExecutionOutcome::Rejected`].
    ///
    /// # Errors
    ///
    /// The first admission error of the batch, e.g.
    /// [`CcipError::AlreadyExecuted`],
    /// [`CcipError::ManualExecutionNotYetEnabled`] or
    /// [`CcipError::DuplicateManualExecution`].
    pub async fn manually_execute(
        &self,
        reports: Vec<ExecutionReport>,
        gas_limit_overrides: Vec<u64>,
    ) -> Result<Vec<ExecutionOutcome>> {
        let span = spans::manually_execute(reports.len());
        async move {
            let overrides = if gas_limit_overrides.is_empty() {
                vec![0; reports.len()]
            } else if gas_limit_overrides.len() == reports.len() {
                gas_limit_overrides
            } else {
                let e = CcipError::InvalidConfig(format!(
                    "{} gas limit overrides for {} reports",
                    gas_limit_overrides.len(),
                    reports.len()
                ));
                spans::record_error(&e);
                return Err(e);
            };

            let mut seen = HashSet::with_capacity(reports.len());
            for (report, gas_limit_override) in reports.iter().zip(&overrides) {
                let header = &report.message.header;
                let key = (header.source_chain_selector, header.sequence_number);
                let admitted = if seen.insert(key) {
                    self.executor
                        .check_manual_execution(report, *gas_limit_override)
                } else {
                    Err(CcipError::DuplicateManualExecution {
                        source_chain_selector: key.0,
                        sequence_number: key.1,
                    })
                };
                if let Err(e) = admitted {
                    spans::record_error(&e);
                    return Err(e);
                }
            }

            // Past this point earlier reports may have run, so a refusal is
            // reported per report instead of failing the batch
            let mut outcomes = Vec::with_capacity(reports.len());
            for (report, gas_limit_override) in reports.into_iter().zip(overrides) {
                let outcome = match self
                    .executor
                    .execute_with_mode(report, ExecutionMode::Manual { gas_limit_override })
                    .await
                {
                    Ok(outcome) => outcome,
                    Err(e) => ExecutionOutcome::Rejected {
                        reason: e.to_string(),
                    },
                };
                outcomes.push(outcome);
            }

            info!(
                executed = outcomes.iter().filter(|o| o.state().is_some()).count(),
                succeeded = outcomes.iter().filter(|o| o.is_success()).count(),
                event = "manual_execution_completed"
            );
            Ok(outcomes)
        }
        .instrument(span)
        .await
    }

    /// Waits for the CCTP attestations a failed USDC transfer needs, then
    /// retries it.
    ///
    /// Each non-empty `offchain_token_data` entry must be a CCTP message;
    /// its hash is polled until the attestation is complete. The mint then
    /// finds the attestation on its first try.
    ///
    /// # Errors
    ///
    /// Admission errors as for [`manually_execute`](Self::manually_execute),
    /// plus [`CcipError::AttestationFailed`] or
    /// [`CcipError::AttestationTimeout`] from polling.
    pub async fn recover_when_attested<A, P>(
        &self,
        report: ExecutionReport,
        poller: &AttestationPoller<A, P>,
        gas_limit_override: u64,
    ) -> Result<ExecutionOutcome>
    where
        A: AttestationProvider,
        P: Clock,
    {
        self.executor
            .check_manual_execution(&report, gas_limit_override)?;

        for data in report.offchain_token_data.iter().filter(|d| !d.is_empty()) {
            let message_hash = CctpMessage::decode(data)?.hash();
            poller.poll(message_hash).await?;
        }

        info!(
            source_chain_selector = %report.message.header.source_chain_selector,
            sequence_number = report.message.header.sequence_number,
            event = "attestations_ready"
        );
        let mut outcomes = self
            .manually_execute(vec![report], vec![gas_limit_override])
            .await?;
        outcomes
            .pop()
            .ok_or_else(|| CcipError::InvalidConfig("empty manual execution batch".to_string()))
    }

    /// Messages currently eligible for a retry
    pub fn failed_messages(&self) -> Vec<(ChainSelector, u64)> {
        self.executor.failed_messages()
    }
}
