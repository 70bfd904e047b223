//! Attestation service wire types
//!
//! Circle's Iris API (`GET /v1/attestations/{messageHash}`) answers with a
//! status and, once complete, the signed attestation as a hex string.

use alloy_primitives::{hex::FromHex, Bytes};
use alloy_sol_types::SolValue;
use serde::{Deserialize, Deserializer};

use crate::error::Result;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttestationStatus {
    Complete,
    Pending,
    PendingConfirmations,
    Failed,
}

impl AttestationStatus {
    #[inline]
    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Still waiting on the attester; retry later
    #[inline]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending | Self::PendingConfirmations)
    }
}

/// Response body of the attestation endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationResponse {
    pub status: AttestationStatus,
    #[serde(default, deserialize_with = "hex_or_placeholder")]
    pub attestation: Option<Bytes>,
}

impl AttestationResponse {
    /// The attestation bytes, present only when the status is complete
    pub fn completed_attestation(&self) -> Option<&Bytes> {
        self.status
            .is_complete()
            .then_some(self.attestation.as_ref())
            .flatten()
    }
}

/// Iris reports a not-yet-signed attestation as `"PENDING"`, an empty
/// string, or null.
fn hex_or_placeholder<'de, D>(deserializer: D) -> std::result::Result<Option<Bytes>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("pending"))
        .map(|s| Bytes::from_hex(&s).map_err(serde::de::Error::custom))
        .transpose()
}

/// Off-chain data handed to a USDC pool on the destination:
/// `abi.encode(bytes message, bytes attestation)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageAndAttestation {
    /// Raw CCTP message emitted by the source `MessageTransmitter`
    pub message: Bytes,
    pub attestation: Bytes,
}

impl MessageAndAttestation {
    pub fn encode(&self) -> Bytes {
        Bytes::from((self.message.clone(), self.attestation.clone()).abi_encode_params())
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        let (message, attestation) = <(Bytes, Bytes)>::abi_decode_params(data)?;
        Ok(Self {
            message,
            attestation,
        })
    }
}
