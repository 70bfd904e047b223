//! CCTP message format used by USDC lanes
//!
//! When a USDC pool burns on the source chain, Circle's `MessageTransmitter`
//! emits a message that the destination pool must present, together with
//! Circle's attestation over its hash, before USDC can be minted.
//!
//! Reference: <https://developers.circle.com/stablecoins/message-format>

use alloy_primitives::{keccak256, Bytes, B256};

use super::DomainId;
use crate::error::{CcipError, Result};

/// CCTP message version understood by the USDC pool
pub const SUPPORTED_CCTP_VERSION: u32 = 0;

/// A CCTP message
///
/// # Format
///
/// - version: uint32 (4 bytes)
/// - sourceDomain: uint32 (4 bytes)
/// - destinationDomain: uint32 (4 bytes)
/// - nonce: uint64 (8 bytes)
/// - sender: bytes32 (32 bytes)
/// - recipient: bytes32 (32 bytes)
/// - destinationCaller: bytes32 (32 bytes)
/// - messageBody: dynamic bytes
///
/// Fixed header size: 4 + 4 + 4 + 8 + 32 + 32 + 32 = 116 bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CctpMessage {
    pub version: u32,
    pub source_domain: DomainId,
    pub destination_domain: DomainId,
    pub nonce: u64,
    pub sender: B256,
    pub recipient: B256,
    /// Account allowed to relay the message on the destination (0 = anyone)
    pub destination_caller: B256,
    pub body: Bytes,
}

impl CctpMessage {
    /// Size of the fixed header in bytes
    pub const HEADER_SIZE: usize = 116;

    pub fn encode(&self) -> Bytes {
        let mut bytes = Vec::with_capacity(Self::HEADER_SIZE + self.body.len());
        bytes.extend_from_slice(&self.version.to_be_bytes());
        bytes.extend_from_slice(&self.source_domain.as_u32().to_be_bytes());
        bytes.extend_from_slice(&self.destination_domain.as_u32().to_be_bytes());
        bytes.extend_from_slice(&self.nonce.to_be_bytes());
        bytes.extend_from_slice(self.sender.as_slice());
        bytes.extend_from_slice(self.recipient.as_slice());
        bytes.extend_from_slice(self.destination_caller.as_slice());
        bytes.extend_from_slice(&self.body);
        Bytes::from(bytes)
    }

    /// Decodes a message, rejecting short input and unknown domains
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::HEADER_SIZE {
            return Err(CcipError::AttestationFailed {
                reason: format!(
                    "CCTP message too short: {} bytes, header is {}",
                    bytes.len(),
                    Self::HEADER_SIZE
                ),
            });
        }

        let domain = |raw: u32| {
            DomainId::from_u32(raw).ok_or_else(|| CcipError::AttestationFailed {
                reason: format!("unknown CCTP domain {raw}"),
            })
        };

        Ok(Self {
            version: read_u32(bytes, 0),
            source_domain: domain(read_u32(bytes, 4))?,
            destination_domain: domain(read_u32(bytes, 8))?,
            nonce: u64::from_be_bytes(fixed(bytes, 12)),
            sender: B256::from_slice(&bytes[20..52]),
            recipient: B256::from_slice(&bytes[52..84]),
            destination_caller: B256::from_slice(&bytes[84..116]),
            body: Bytes::copy_from_slice(&bytes[Self::HEADER_SIZE..]),
        })
    }

    /// Hash the attestation service signs
    pub fn hash(&self) -> B256 {
        keccak256(self.encode())
    }
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes(fixed(bytes, offset))
}

fn fixed<const N: usize>(bytes: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[offset..offset + N]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CctpMessage {
        CctpMessage {
            version: SUPPORTED_CCTP_VERSION,
            source_domain: DomainId::Ethereum,
            destination_domain: DomainId::Base,
            nonce: 0x0102_0304,
            sender: B256::repeat_byte(0x11),
            recipient: B256::repeat_byte(0x22),
            destination_caller: B256::ZERO,
            body: Bytes::from_static(b"burn"),
        }
    }

    #[test]
    fn test_layout() {
        let encoded = sample().encode();
        assert_eq!(encoded.len(), CctpMessage::HEADER_SIZE + 4);
        assert_eq!(&encoded[8..12], &6u32.to_be_bytes());
        assert_eq!(&encoded[12..20], &0x0102_0304u64.to_be_bytes());
        assert_eq!(&encoded[116..], b"burn");
    }

    #[test]
    fn test_decode_matches_encode() {
        let message = sample();
        assert_eq!(CctpMessage::decode(&message.encode()).unwrap(), message);
    }

    #[test]
    fn test_short_message_rejected() {
        assert!(CctpMessage::decode(&[0u8; 115]).is_err());
    }

    #[test]
    fn test_unknown_domain_rejected() {
        let mut encoded = sample().encode().to_vec();
        encoded[4..8].copy_from_slice(&4u32.to_be_bytes());
        assert!(matches!(
            CctpMessage::decode(&encoded),
            Err(CcipError::AttestationFailed { .. })
        ));
    }
}
