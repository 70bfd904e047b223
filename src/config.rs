//! Static and dynamic configuration for the OnRamp and OffRamp
//!
//! Static configs are fixed for the lifetime of a ramp. Dynamic configs may
//! be replaced by the owner at runtime. All of them are plain serde structs
//! so they can be loaded from JSON alongside deployment data.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{CcipError, Result};
use crate::protocol::{Address, ChainFamily, ChainSelector};

/// Return data cap for receiver reverts: a 4-byte selector plus four words
pub const DEFAULT_MAX_RETURN_BYTES: usize = 4 + 4 * 32;

/// Environment variable overriding [`OffRampDynamicConfig::permissionless_execution_threshold`]
pub const PERMISSIONLESS_EXECUTION_THRESHOLD_ENV: &str = "CCIP_PERMISSIONLESS_EXECUTION_THRESHOLD_SECS";

/// Environment variable overriding [`OffRampDynamicConfig::manual_execution_horizon`]
pub const MANUAL_EXECUTION_HORIZON_ENV: &str = "CCIP_MANUAL_EXECUTION_HORIZON_SECS";

/// Environment variable overriding [`OffRampDynamicConfig::receiver_timeout`]
pub const RECEIVER_TIMEOUT_ENV: &str = "CCIP_RECEIVER_TIMEOUT_MS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnRampStaticConfig {
    /// Chain the OnRamp lives on
    pub chain_selector: ChainSelector,
}

/// Per-destination settings of an OnRamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestChainConfig {
    /// Only allowlisted senders may send to this destination
    pub allowlist_enabled: bool,
    /// Reject messages that did not opt into out-of-order execution
    pub enforce_out_of_order: bool,
    /// Address family of receivers on the destination
    pub receiver_family: ChainFamily,
}

impl DestChainConfig {
    /// Defaults for a destination of the given family; non-EVM families
    /// enforce out-of-order execution
    pub fn for_family(receiver_family: ChainFamily) -> Self {
        Self {
            allowlist_enabled: false,
            enforce_out_of_order: receiver_family.requires_out_of_order(),
            receiver_family,
        }
    }

    pub fn with_allowlist_enabled(mut self, enabled: bool) -> Self {
        self.allowlist_enabled = enabled;
        self
    }

    pub fn with_enforce_out_of_order(mut self, enforce: bool) -> Self {
        self.enforce_out_of_order = enforce;
        self
    }
}

impl Default for DestChainConfig {
    fn default() -> Self {
        Self::for_family(ChainFamily::Evm)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnRampDynamicConfig {
    /// Account that may edit allowlists besides the owner
    pub allowlist_admin: Option<Address>,
    pub max_data_bytes: usize,
    pub max_tokens_per_msg: usize,
}

impl Default for OnRampDynamicConfig {
    /// - `max_data_bytes`: 30 000
    /// - `max_tokens_per_msg`: 1
    fn default() -> Self {
        Self {
            allowlist_admin: None,
            max_data_bytes: 30_000,
            max_tokens_per_msg: 1,
        }
    }
}

impl OnRampDynamicConfig {
    pub fn with_allowlist_admin(mut self, admin: Address) -> Self {
        self.allowlist_admin = Some(admin);
        self
    }

    pub fn with_max_data_bytes(mut self, max: usize) -> Self {
        self.max_data_bytes = max;
        self
    }

    pub fn with_max_tokens_per_msg(mut self, max: usize) -> Self {
        self.max_tokens_per_msg = max;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffRampStaticConfig {
    /// Chain the OffRamp lives on
    pub chain_selector: ChainSelector,
    /// Receiver revert data beyond this many bytes is dropped
    pub max_return_bytes: usize,
}

impl OffRampStaticConfig {
    pub fn new(chain_selector: ChainSelector) -> Self {
        Self {
            chain_selector,
            max_return_bytes: DEFAULT_MAX_RETURN_BYTES,
        }
    }

    pub fn with_max_return_bytes(mut self, max: usize) -> Self {
        self.max_return_bytes = max;
        self
    }
}

/// Timing rules of the OffRamp
///
/// # Examples
///
/// ```rust
/// use ccip_rs::OffRampDynamicConfig;
/// use std::time::Duration;
///
/// let config = OffRampDynamicConfig::default()
///     .with_permissionless_execution_threshold(Duration::from_secs(60))
///     .with_receiver_timeout(Duration::from_secs(5));
/// assert_eq!(config.permissionless_execution_threshold.as_secs(), 60);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffRampDynamicConfig {
    /// Time after commit from which anyone may manually execute an
    /// untouched message
    pub permissionless_execution_threshold: Duration,
    /// Commits older than this can no longer be manually executed
    pub manual_execution_horizon: Duration,
    /// Wall-clock budget for one receiver call
    pub receiver_timeout: Duration,
}

impl Default for OffRampDynamicConfig {
    /// - `permissionless_execution_threshold`: 8 hours
    /// - `manual_execution_horizon`: 30 days
    /// - `receiver_timeout`: 30 seconds
    fn default() -> Self {
        Self {
            permissionless_execution_threshold: Duration::from_secs(8 * 60 * 60),
            manual_execution_horizon: Duration::from_secs(30 * 24 * 60 * 60),
            receiver_timeout: Duration::from_secs(30),
        }
    }
}

impl OffRampDynamicConfig {
    /// Reads overrides from the environment (and a `.env` file if present),
    /// falling back to the defaults for unset variables.
    ///
    /// # Errors
    ///
    /// Returns [`CcipError::InvalidConfig`] when a variable is set but is not
    /// a non-negative integer.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            permissionless_execution_threshold: env_u64(PERMISSIONLESS_EXECUTION_THRESHOLD_ENV)?
                .map(Duration::from_secs)
                .unwrap_or(defaults.permissionless_execution_threshold),
            manual_execution_horizon: env_u64(MANUAL_EXECUTION_HORIZON_ENV)?
                .map(Duration::from_secs)
                .unwrap_or(defaults.manual_execution_horizon),
            receiver_timeout: env_u64(RECEIVER_TIMEOUT_ENV)?
                .map(Duration::from_millis)
                .unwrap_or(defaults.receiver_timeout),
        })
    }

    pub fn with_permissionless_execution_threshold(mut self, threshold: Duration) -> Self {
        self.permissionless_execution_threshold = threshold;
        self
    }

    pub fn with_manual_execution_horizon(mut self, horizon: Duration) -> Self {
        self.manual_execution_horizon = horizon;
        self
    }

    pub fn with_receiver_timeout(mut self, timeout: Duration) -> Self {
        self.receiver_timeout = timeout;
        self
    }
}

fn env_u64(key: &str) -> Result<Option<u64>> {
    match dotenvy::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| CcipError::InvalidConfig(format!("{key}={raw}: {e}"))),
        Err(_) => Ok(None),
    }
}

/// Per-source settings of the commit store and OffRamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceChainConfig {
    pub is_enabled: bool,
    /// OnRamp on the source chain; part of every message hash
    pub on_ramp: Address,
}

impl SourceChainConfig {
    pub fn enabled(on_ramp: Address) -> Self {
        Self {
            is_enabled: true,
            on_ramp,
        }
    }
}

/// Configuration for attestation polling behavior.
///
/// # Examples
///
/// ```rust
/// use ccip_rs::PollingConfig;
///
/// let config = PollingConfig::default()
///     .with_max_attempts(20)
///     .with_poll_interval_secs(30);
/// assert_eq!(config.total_timeout_secs(), 600);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollingConfig {
    /// Maximum number of polling attempts before giving up.
    pub max_attempts: u32,
    /// Seconds to wait between polling attempts.
    pub poll_interval_secs: u64,
}

impl Default for PollingConfig {
    /// 30 attempts one minute apart, enough for a finalized CCTP burn
    fn default() -> Self {
        Self {
            max_attempts: 30,
            poll_interval_secs: 60,
        }
    }
}

impl PollingConfig {
    /// For CCTP fast transfers, which attest in well under a minute
    pub fn fast_transfer() -> Self {
        Self {
            max_attempts: 30,
            poll_interval_secs: 5,
        }
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_poll_interval_secs(mut self, secs: u64) -> Self {
        self.poll_interval_secs = secs;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn total_timeout_secs(&self) -> u64 {
        self.max_attempts as u64 * self.poll_interval_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dest_chain_defaults_by_family() {
        assert!(!DestChainConfig::for_family(ChainFamily::Evm).enforce_out_of_order);
        assert!(DestChainConfig::for_family(ChainFamily::Svm).enforce_out_of_order);
        assert!(DestChainConfig::for_family(ChainFamily::Ton).enforce_out_of_order);
    }

    #[test]
    fn test_max_return_bytes_default() {
        let config = OffRampStaticConfig::new(ChainSelector::new(1));
        assert_eq!(config.max_return_bytes, 132);
    }

    #[test]
    fn test_offramp_dynamic_from_env() {
        std::env::set_var(MANUAL_EXECUTION_HORIZON_ENV, "120");
        std::env::set_var(RECEIVER_TIMEOUT_ENV, "250");
        let config = OffRampDynamicConfig::from_env().unwrap();
        assert_eq!(config.manual_execution_horizon, Duration::from_secs(120));
        assert_eq!(config.receiver_timeout, Duration::from_millis(250));

        std::env::set_var(RECEIVER_TIMEOUT_ENV, "soon");
        assert!(matches!(
            OffRampDynamicConfig::from_env(),
            Err(CcipError::InvalidConfig(_))
        ));

        std::env::remove_var(MANUAL_EXECUTION_HORIZON_ENV);
        std::env::remove_var(RECEIVER_TIMEOUT_ENV);
    }

    #[test]
    fn test_polling_config() {
        let config = PollingConfig::default();
        assert_eq!(config.total_timeout_secs(), 1800);
        assert_eq!(PollingConfig::fast_transfer().poll_interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_onramp_dynamic_json() {
        let json = r#"{"allowlistAdmin":null,"maxDataBytes":100,"maxTokensPerMsg":2}"#;
        let config: OnRampDynamicConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.max_data_bytes, 100);
        assert_eq!(config.max_tokens_per_msg, 2);
    }
}
