//! sas-core
//!
//! Core primitives shared by the SAS chain clients:
//! - schema / attestation record models
//! - deployment table and client configuration
//! - error model
//! - key providers for write-capable clients
//! - the chain-neutral registry read path

pub mod address;
pub mod config;
pub mod errors;
pub mod model;
pub mod registry;
pub mod signer;
pub mod version;

pub use crate::errors::{SasError, SasResult};

/// Names of the on-chain modules and functions both deployments share.
pub mod entry {
    pub const SCHEMA_MODULE: &str = "schema";
    pub const ATTESTATION_MODULE: &str = "attestation";
    pub const SCHEMA_DATA_VIEW: &str = "schema_data";
    pub const ATTESTATION_DATA_VIEW: &str = "attestation_data";
}

/// Milliseconds since the Unix epoch, for expiry checks.
pub fn now_ms() -> u64 {
    let nanos = time::OffsetDateTime::now_utc().unix_timestamp_nanos();
    u64::try_from(nanos / 1_000_000).unwrap_or(0)
}

/// Convenience re-exports.
pub mod prelude {
    pub use crate::config::{Chain, ClientConfig, Deployment, DeploymentTable, Network};
    pub use crate::model::{
        AttestationRecord, NewAttestation, NewSchema, Registry, Resolver, SchemaRecord, TableHandle,
        TxReceipt,
    };
    pub use crate::registry::{ListOptions, RegistrySource};
    pub use crate::signer::{Ed25519KeyProvider, KeyProvider};
    pub use crate::version::RegistryVersion;
    pub use crate::{SasError, SasResult};
}
