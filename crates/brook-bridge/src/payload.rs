//! The cross-domain wire format.
//!
//! The only payload the protocol defines: the sender's locked rate as a
//! 32-byte big-endian unsigned integer. The upper half is zero for `u128`
//! rates; a nonzero upper half means the payload claims a rate the ledger
//! cannot represent and is rejected rather than truncated.

use brook_core::constants::PAYLOAD_LEN;
use brook_core::error::BridgeError;
use brook_core::types::Rate;

/// Encode a locked rate as the fixed-width payload.
pub fn encode_rate(rate: Rate) -> [u8; PAYLOAD_LEN] {
    let mut payload = [0u8; PAYLOAD_LEN];
    payload[PAYLOAD_LEN - 16..].copy_from_slice(&rate.to_be_bytes());
    payload
}

/// Decode a payload back into a locked rate.
///
/// The transport is assumed not to corrupt payloads, but decoding is still
/// total: wrong length or an unrepresentable rate is a typed error.
pub fn decode_rate(bytes: &[u8]) -> Result<Rate, BridgeError> {
    if bytes.len() != PAYLOAD_LEN {
        return Err(BridgeError::MalformedPayload(format!(
            "expected {PAYLOAD_LEN} bytes, got {}",
            bytes.len()
        )));
    }
    if bytes[..PAYLOAD_LEN - 16].iter().any(|&b| b != 0) {
        return Err(BridgeError::MalformedPayload(
            "rate exceeds 128 bits".to_string(),
        ));
    }
    let mut low = [0u8; 16];
    low.copy_from_slice(&bytes[PAYLOAD_LEN - 16..]);
    Ok(Rate::from_be_bytes(low))
}
