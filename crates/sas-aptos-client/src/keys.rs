//! Aptos account addresses and transaction signatures.

use ed25519_dalek::VerifyingKey;
use sha3::{Digest, Sha3_256};

use sas_core::signer::KeyProvider;
use sas_core::SasResult;

use crate::rest::TransactionSignature;

/// Single-key ed25519 authentication scheme.
const ED25519_SCHEME: u8 = 0x00;

/// Account address of an ed25519 key: `sha3_256(pk || scheme)`.
pub fn aptos_address(pk: &VerifyingKey) -> String {
    let mut h = Sha3_256::new();
    h.update(pk.as_bytes());
    h.update([ED25519_SCHEME]);
    format!("0x{}", hex::encode(h.finalize()))
}

/// Sign the node-encoded signing message.
pub fn sign_message(keys: &dyn KeyProvider, message: &[u8]) -> SasResult<TransactionSignature> {
    let sig = keys.sign(message)?;
    Ok(TransactionSignature::ed25519(
        format!("0x{}", hex::encode(keys.public_key().as_bytes())),
        format!("0x{}", hex::encode(sig.to_bytes())),
    ))
}
