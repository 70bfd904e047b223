//! Destination side of the lanes
//!
//! [`CommitAggregator`] accepts Merkle roots over gapless batches of source
//! messages. [`OffRampExecutor`] proves single messages against those roots
//! and executes each at most once successfully; [`ManualExecutionRecovery`]
//! retries what failed or got stuck.

mod commit;
mod executor;
mod manual;
mod receivers;

pub use commit::{
    build_report, proof_for, CommitAggregator, CommitEvent, CommitOutcome, CommittedRoot,
    PendingReport,
};
pub use executor::{
    ExecutionMode, ExecutionOutcome, ExecutionReport, OffRampEvent, OffRampExecutor,
};
pub use manual::ManualExecutionRecovery;
pub use receivers::ReceiverRegistry;
