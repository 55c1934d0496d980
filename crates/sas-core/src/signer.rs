//! Key material providers.
//!
//! Write-capable clients receive a [`KeyProvider`] explicitly; nothing in the
//! library reads keys from the environment. The CLI decides where a key comes
//! from and falls back to [`Ed25519KeyProvider::ephemeral`].

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use ed25519_dalek::{Signature, Signer as _, SigningKey, VerifyingKey, SECRET_KEY_LENGTH};
use rand::rngs::OsRng;

use crate::errors::{SasError, SasResult};

/// Sui keystore flag byte for ed25519 keys.
const ED25519_FLAG: u8 = 0x00;

/// Source of an ed25519 signing key.
pub trait KeyProvider: Send + Sync {
    fn public_key(&self) -> VerifyingKey;

    fn sign(&self, message: &[u8]) -> SasResult<Signature>;
}

/// In-memory ed25519 key.
#[derive(Clone)]
pub struct Ed25519KeyProvider {
    key: SigningKey,
}

impl Ed25519KeyProvider {
    pub fn from_bytes(secret: &[u8; SECRET_KEY_LENGTH]) -> Self {
        Self {
            key: SigningKey::from_bytes(secret),
        }
    }

    /// Parse a 32-byte secret from hex, with or without `0x`.
    pub fn from_hex(s: &str) -> SasResult<Self> {
        let bytes = hex::decode(s.trim().trim_start_matches("0x"))
            .map_err(|e| SasError::invalid_argument(format!("private key is not hex: {e}")))?;
        Self::from_slice(&bytes)
    }

    /// Parse a base64 secret. Accepts the raw 32 bytes or the Sui keystore
    /// layout (`flag || secret`).
    pub fn from_base64(s: &str) -> SasResult<Self> {
        let bytes = BASE64
            .decode(s.trim())
            .map_err(|e| SasError::invalid_argument(format!("private key is not base64: {e}")))?;
        match bytes.len() {
            33 if bytes[0] == ED25519_FLAG => Self::from_slice(&bytes[1..]),
            33 => Err(SasError::invalid_argument("only ed25519 keys are supported")),
            _ => Self::from_slice(&bytes),
        }
    }

    /// Parse a key in whichever encoding it looks like.
    pub fn parse(s: &str) -> SasResult<Self> {
        let t = s.trim();
        if t.starts_with("0x") || (t.len() == SECRET_KEY_LENGTH * 2 && t.chars().all(|c| c.is_ascii_hexdigit())) {
            Self::from_hex(t)
        } else {
            Self::from_base64(t)
        }
    }

    pub fn generate() -> Self {
        Self {
            key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Generate a fresh key that lives only as long as this process.
    pub fn ephemeral() -> Self {
        tracing::warn!("no signing key configured; generated an ephemeral ed25519 key");
        Self::generate()
    }

    /// Hex export, for `sas keygen`.
    pub fn secret_hex(&self) -> String {
        format!("0x{}", hex::encode(self.key.to_bytes()))
    }

    fn from_slice(bytes: &[u8]) -> SasResult<Self> {
        let secret: [u8; SECRET_KEY_LENGTH] = bytes.try_into().map_err(|_| {
            SasError::invalid_argument(format!(
                "private key must be {SECRET_KEY_LENGTH} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self::from_bytes(&secret))
    }
}

impl KeyProvider for Ed25519KeyProvider {
    fn public_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }

    fn sign(&self, message: &[u8]) -> SasResult<Signature> {
        Ok(self.key.sign(message))
    }
}

impl fmt::Debug for Ed25519KeyProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ed25519KeyProvider")
            .field("public_key", &hex::encode(self.key.verifying_key().as_bytes()))
            .finish()
    }
}
