//! Execution state of a message on the destination chain
//!
//! States move forward only:
//!
//! ```text
//! Untouched ──► InProgress ──► Success
//!                    │
//!                    └──────► Failure ──(manual)──► InProgress
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-(source, sequence number) execution state
///
/// # Examples
///
/// ```rust
/// use ccip_rs::ExecutionState;
///
/// assert_eq!(ExecutionState::Success.as_u8(), 2);
/// assert!(ExecutionState::Success.is_terminal());
/// assert!(!ExecutionState::InProgress.is_terminal());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ExecutionState {
    /// Never attempted
    #[default]
    Untouched = 0,
    /// Claimed by a worker; the receiver call may be running
    InProgress = 1,
    Success = 2,
    /// Eligible for manual execution
    Failure = 3,
}

impl ExecutionState {
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Untouched),
            1 => Some(Self::InProgress),
            2 => Some(Self::Success),
            3 => Some(Self::Failure),
            _ => None,
        }
    }

    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Untouched => "untouched",
            Self::InProgress => "in_progress",
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }

    /// Success and Failure end the automatic path
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }
}

impl From<ExecutionState> for u8 {
    #[inline]
    fn from(state: ExecutionState) -> Self {
        state.as_u8()
    }
}

impl TryFrom<u8> for ExecutionState {
    type Error = InvalidExecutionState;

    #[inline]
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value).ok_or(InvalidExecutionState(value))
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a u8 is not a known execution state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidExecutionState(pub u8);

impl fmt::Display for InvalidExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid execution state: {} (expected 0-3)", self.0)
    }
}

impl std::error::Error for InvalidExecutionState {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, ExecutionState::Untouched)]
    #[case(1, ExecutionState::InProgress)]
    #[case(2, ExecutionState::Success)]
    #[case(3, ExecutionState::Failure)]
    fn test_from_u8(#[case] raw: u8, #[case] state: ExecutionState) {
        assert_eq!(ExecutionState::try_from(raw), Ok(state));
        assert_eq!(u8::from(state), raw);
    }

    #[test]
    fn test_invalid_state() {
        let err = ExecutionState::try_from(4).unwrap_err();
        assert_eq!(err, InvalidExecutionState(4));
        assert_eq!(err.to_string(), "invalid execution state: 4 (expected 0-3)");
    }

    #[test]
    fn test_default_is_untouched() {
        assert_eq!(ExecutionState::default(), ExecutionState::Untouched);
    }

    #[test]
    fn test_display() {
        assert_eq!(ExecutionState::InProgress.to_string(), "in_progress");
    }
}
