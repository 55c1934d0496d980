//! SAS data models.
//!
//! These are the plain records returned by both chain clients. They carry no
//! chain-specific types: addresses are normalized `0x` hex strings, raw Move
//! `vector<u8>` fields stay as bytes, and timestamps are milliseconds.
//!
//! Byte fields serialize as `0x` hex so CLI/JSON output stays readable.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Chain;
use crate::version::RegistryVersion;

/// A registered attestation schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRecord {
    pub address: String,
    pub name: String,
    pub description: String,
    pub url: String,
    pub creator: String,
    /// Creation timestamp in milliseconds.
    pub created_at: u64,
    /// Raw schema template bytes. Interpretation is left to the caller.
    #[serde(with = "hex_bytes")]
    pub schema: Vec<u8>,
    pub revokable: bool,
    /// Set at most once, by `add_resolver`.
    pub resolver: Option<Resolver>,
    /// Base58 transaction digest of the creating transaction, when recorded.
    pub tx_hash: Option<String>,
}

impl SchemaRecord {
    pub fn has_resolver(&self) -> bool {
        self.resolver.is_some()
    }
}

/// Resolver attached to a schema.
///
/// Sui resolvers are a rules/config pair stored on the schema. Aptos
/// resolvers are a module account, carried in `address` with empty rules and
/// config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolver {
    #[serde(with = "hex_bytes")]
    pub rules: Vec<u8>,
    #[serde(with = "hex_bytes")]
    pub config: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Resolver {
    pub fn rules(rules: Vec<u8>, config: Vec<u8>) -> Self {
        Self {
            rules,
            config,
            address: None,
        }
    }

    /// A resolver identified by its module address.
    pub fn at_address(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            ..Self::default()
        }
    }
}

/// An issued attestation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationRecord {
    pub address: String,
    pub attestor: String,
    pub recipient: String,
    /// Address of the schema this attestation was issued under.
    pub schema: String,
    /// Earlier attestation this one builds on.
    pub ref_attestation: Option<String>,
    /// Issue time in milliseconds.
    pub time: u64,
    /// Expiration time in milliseconds; `0` means the attestation never expires.
    pub expiration_time: u64,
    /// Set once when revoked; never cleared.
    pub revocation_time: Option<u64>,
    pub revokable: bool,
    #[serde(with = "hex_bytes")]
    pub data: Vec<u8>,
    pub tx_hash: Option<String>,
}

impl AttestationRecord {
    pub fn is_revoked(&self) -> bool {
        self.revocation_time.is_some()
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.expiration_time != 0 && self.expiration_time <= now_ms
    }

    /// Valid means neither revoked nor expired at `now_ms`.
    pub fn is_valid_at(&self, now_ms: u64) -> bool {
        !self.is_revoked() && !self.is_expired(now_ms)
    }
}

/// Input for schema creation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewSchema {
    pub schema: Vec<u8>,
    pub name: String,
    pub description: String,
    pub url: String,
    pub revokable: bool,
}

/// Input for attestation issuance.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewAttestation {
    /// Address of the schema to attest under.
    pub schema: String,
    pub recipient: String,
    pub ref_attestation: Option<String>,
    /// Milliseconds; `0` for no expiry.
    pub expiration_time: u64,
    /// Only used by deployments where revokability is chosen per attestation (Aptos).
    pub revokable: bool,
    pub data: Vec<u8>,
}

/// An on-chain registry object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    pub id: String,
    /// Id of the `Versioned` wrapper whose dynamic fields hold each version's inner state.
    pub versioned_id: String,
    pub version: RegistryVersion,
}

/// The records table active for one registry version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableHandle {
    pub id: String,
    pub version: RegistryVersion,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
    pub has_next_page: bool,
}

/// A finalized transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxReceipt {
    pub chain: Chain,
    /// Sui: base58 digest. Aptos: `0x` hex hash.
    pub digest: String,
    pub success: bool,
    /// Chain-reported status string (`success`, `Executed successfully`, or the failure reason).
    pub status: String,
    /// Object ids created by the transaction (Sui only).
    #[serde(default)]
    pub created_objects: Vec<CreatedObject>,
    /// The untouched RPC response.
    pub raw: Value,
}

impl TxReceipt {
    /// First created object whose type ends with `suffix` (e.g. `::schema::Schema`).
    pub fn created_of_type(&self, suffix: &str) -> Option<&CreatedObject> {
        self.created_objects.iter().find(|o| o.object_type.ends_with(suffix))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedObject {
    pub object_id: String,
    pub object_type: String,
}

pub(crate) mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        hex::decode(s.trim_start_matches("0x")).map_err(serde::de::Error::custom)
    }
}
