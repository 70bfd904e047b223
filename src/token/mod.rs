//! Token transfer plumbing
//!
//! Both ramps move tokens through [`TokenPool`](crate::TokenPool)s found in
//! a [`TokenAdminRegistry`]: the OnRamp locks or burns on send, the OffRamp
//! releases or mints on execution.

mod poller;
mod pool;
mod registry;
mod usdc;

pub use poller::AttestationPoller;
pub use pool::{LockOrBurnIn, LockOrBurnOut, ReleaseOrMintIn, ReleaseOrMintOut};
pub use registry::TokenAdminRegistry;
pub use usdc::UsdcTokenPool;
