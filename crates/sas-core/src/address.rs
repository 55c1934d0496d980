//! Address and digest helpers shared by the Sui and Aptos clients.
//!
//! Both chains use 32-byte account/object addresses rendered as `0x`-prefixed
//! hex. RPC responses are not consistent about leading zeros or case, so every
//! address that enters a record goes through [`normalize_address`].

use crate::errors::{SasError, SasResult};

/// Length of a Move address in bytes.
pub const ADDRESS_LENGTH: usize = 32;

/// The all-zero address, used on-chain as "no reference".
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000000000000000000000000000";

/// Normalize an address to lowercase, zero-padded, `0x`-prefixed form.
///
/// Accepts short forms such as `0x6` or bare hex without the prefix.
pub fn normalize_address(input: &str) -> SasResult<String> {
    let s = input.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);

    if digits.is_empty() || digits.len() > ADDRESS_LENGTH * 2 {
        return Err(SasError::invalid_argument(format!("invalid address length: {input}")));
    }
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(SasError::invalid_argument(format!("address is not hex: {input}")));
    }

    Ok(format!("0x{:0>64}", digits.to_ascii_lowercase()))
}

/// Parse an address into its raw 32 bytes.
pub fn address_bytes(input: &str) -> SasResult<[u8; ADDRESS_LENGTH]> {
    let norm = normalize_address(input)?;
    let mut out = [0u8; ADDRESS_LENGTH];
    hex::decode_to_slice(&norm[2..], &mut out)
        .map_err(|e| SasError::invalid_argument(format!("address {input}: {e}")))?;
    Ok(out)
}

/// Map the on-chain "zero means none" convention onto `Option`.
pub fn optional_address(addr: &str) -> SasResult<Option<String>> {
    let norm = normalize_address(addr)?;
    if norm == ZERO_ADDRESS {
        Ok(None)
    } else {
        Ok(Some(norm))
    }
}

/// Encode a stored transaction hash with base58. Empty input means "absent".
pub fn encode_tx_hash(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        None
    } else {
        Some(bs58::encode(bytes).into_string())
    }
}

/// Decode a base58 32-byte digest (Sui object and transaction digests).
pub fn decode_digest(input: &str) -> SasResult<[u8; 32]> {
    let bytes = bs58::decode(input.trim())
        .into_vec()
        .map_err(|e| SasError::decode(format!("digest {input} is not base58: {e}")))?;
    <[u8; 32]>::try_from(bytes.as_slice())
        .map_err(|_| SasError::decode(format!("digest {input} must be 32 bytes, got {}", bytes.len())))
}
