//! Source side of the lanes: who may send, and in what order
//!
//! [`OnRampSequencer`] admits messages through the [`SenderAllowlist`],
//! locks their tokens and stamps them with lane sequence numbers kept in
//! [`LaneCounters`].

mod allowlist;
mod counters;
mod sequencer;

pub use allowlist::{AllowlistConfig, SenderAllowlist};
pub use counters::{LaneCounters, LaneState};
pub use sequencer::{OnRampEvent, OnRampSequencer, SendRequest, DEFAULT_TOKEN_DEST_GAS_OVERHEAD};
