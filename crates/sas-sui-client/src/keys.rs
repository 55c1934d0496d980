//! Sui address derivation and transaction signatures.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use ed25519_dalek::VerifyingKey;

use sas_core::signer::KeyProvider;
use sas_core::SasResult;

use crate::constants::{ED25519_FLAG, TRANSACTION_INTENT};

type Blake2b256 = Blake2b<U32>;

/// Sui address of an ed25519 public key: `blake2b256(flag || pk)`.
pub fn sui_address(pk: &VerifyingKey) -> String {
    let mut h = Blake2b256::new();
    h.update([ED25519_FLAG]);
    h.update(pk.as_bytes());
    format!("0x{}", hex::encode(h.finalize()))
}

/// Digest that is actually signed: `blake2b256(intent || bcs(tx_data))`.
pub fn intent_digest(tx_bytes: &[u8]) -> [u8; 32] {
    let mut h = Blake2b256::new();
    h.update(TRANSACTION_INTENT);
    h.update(tx_bytes);
    h.finalize().into()
}

/// Sign BCS transaction bytes and return the serialized signature
/// (`base64(flag || sig || pk)`) expected by `sui_executeTransactionBlock`.
pub fn sign_transaction(keys: &dyn KeyProvider, tx_bytes: &[u8]) -> SasResult<String> {
    let sig = keys.sign(&intent_digest(tx_bytes))?;
    let pk = keys.public_key();

    let mut out = Vec::with_capacity(1 + 64 + 32);
    out.push(ED25519_FLAG);
    out.extend_from_slice(&sig.to_bytes());
    out.extend_from_slice(pk.as_bytes());
    Ok(BASE64.encode(out))
}
