//! Production implementations of the pipeline's seams.
//!
//! These talk to the outside world: the system clock, Circle's Iris API for
//! CCTP attestations, and an EVM RPC node for OnRamp logs. Test code uses
//! the fakes in [`crate::testing`] instead.

mod alloy;
mod iris;
mod tokio_clock;

pub use self::alloy::{AlloyOnRampLogSource, CCIPMessageSent};
pub use self::iris::IrisAttestationProvider;
pub use self::tokio_clock::TokioClock;
