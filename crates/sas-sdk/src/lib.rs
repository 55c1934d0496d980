//! sas-sdk
//!
//! One handle for both chains. [`connect`] resolves the deployment and
//! endpoint for a `(chain, network)` pair and returns a read-only
//! [`SasClient`]; [`SasClient::with_signer`] enables writes.
//!
//! Chain-specific operations (Sui resolvers, Sui listing) are reachable
//! through the unified methods where both chains agree and through the
//! per-chain variants otherwise.

use std::sync::Arc;

use tracing::{debug, warn};

use sas_aptos_client::{AptosRegistryClient, AptosWriter, TransactionOptions};
use sas_core::config::{validate_config, Chain, ClientConfig, Network};
use sas_core::model::{AttestationRecord, NewAttestation, NewSchema, Resolver, SchemaRecord, TxReceipt};
use sas_core::registry::ListOptions;
use sas_core::signer::KeyProvider;
use sas_core::{SasError, SasResult};
use sas_sui_client::{SuiRegistryClient, SuiWriter};

pub use sas_aptos_client::keys::aptos_address;
pub use sas_core;
pub use sas_core::prelude;
pub use sas_sui_client::keys::sui_address;

/// Sui reader plus an optional writer.
pub struct SuiClient {
    pub reader: SuiRegistryClient,
    writer: Option<SuiWriter>,
    gas_budget: u64,
    list: ListOptions,
}

/// Aptos reader plus an optional writer.
pub struct AptosClient {
    pub reader: AptosRegistryClient,
    writer: Option<AptosWriter>,
    options: TransactionOptions,
}

pub enum SasClient {
    Sui(SuiClient),
    Aptos(AptosClient),
}

impl std::fmt::Debug for SasClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SasClient::Sui(_) => f.write_str("SasClient::Sui(..)"),
            SasClient::Aptos(_) => f.write_str("SasClient::Aptos(..)"),
        }
    }
}

/// What to revoke. Sui needs the schema's admin cap; the schema itself is
/// looked up from the attestation when not given.
#[derive(Debug, Clone, Default)]
pub struct Revocation {
    pub attestation: String,
    pub schema: Option<String>,
    pub admin_cap: Option<String>,
}

/// Build a read-only client for `chain` on `network`.
pub fn connect(chain: Chain, network: Network, cfg: &ClientConfig) -> SasResult<SasClient> {
    validate_config(cfg)?;
    if cfg.deployments.get(chain, network)?.is_placeholder() {
        warn!(%chain, %network, "built-in deployment ids are placeholders; supply the real ids through ClientConfig::deployments");
    }
    debug!(%chain, %network, "connecting");
    Ok(match chain {
        Chain::Sui => SasClient::Sui(SuiClient {
            reader: SuiRegistryClient::connect(network, cfg)?,
            writer: None,
            gas_budget: cfg.gas_budget,
            list: ListOptions::from(cfg),
        }),
        Chain::Aptos => SasClient::Aptos(AptosClient {
            reader: AptosRegistryClient::connect(network, cfg)?,
            writer: None,
            options: TransactionOptions::from(cfg),
        }),
    })
}

fn missing_signer() -> SasError {
    SasError::configuration("no signer configured; call with_signer first")
}

impl SuiClient {
    fn writer(&self) -> SasResult<&SuiWriter> {
        self.writer.as_ref().ok_or_else(missing_signer)
    }
}

impl AptosClient {
    fn writer(&self) -> SasResult<&AptosWriter> {
        self.writer.as_ref().ok_or_else(missing_signer)
    }
}

impl SasClient {
    pub fn chain(&self) -> Chain {
        match self {
            SasClient::Sui(_) => Chain::Sui,
            SasClient::Aptos(_) => Chain::Aptos,
        }
    }

    /// Attach a key so write calls become available.
    pub fn with_signer(self, keys: Arc<dyn KeyProvider>) -> Self {
        match self {
            SasClient::Sui(mut c) => {
                c.writer = Some(SuiWriter::new(
                    c.reader.rpc().clone(),
                    keys,
                    c.reader.deployment().clone(),
                    c.gas_budget,
                ));
                SasClient::Sui(c)
            }
            SasClient::Aptos(mut c) => {
                c.writer = Some(AptosWriter::new(
                    c.reader.rest().clone(),
                    keys,
                    c.reader.deployment().clone(),
                    c.options,
                ));
                SasClient::Aptos(c)
            }
        }
    }

    /// Address of the configured signer, if any.
    pub fn sender(&self) -> Option<String> {
        match self {
            SasClient::Sui(c) => c.writer.as_ref().map(SuiWriter::sender),
            SasClient::Aptos(c) => c.writer.as_ref().map(AptosWriter::sender),
        }
    }

    pub async fn get_schema(&self, address: &str) -> SasResult<SchemaRecord> {
        match self {
            SasClient::Sui(c) => c.reader.get_schema(address).await,
            SasClient::Aptos(c) => c.reader.get_schema(address).await,
        }
    }

    pub async fn get_attestation(&self, address: &str) -> SasResult<AttestationRecord> {
        match self {
            SasClient::Sui(c) => c.reader.get_attestation(address).await,
            SasClient::Aptos(c) => c.reader.get_attestation(address).await,
        }
    }

    pub async fn list_schemas(&self) -> SasResult<Vec<SchemaRecord>> {
        match self {
            SasClient::Sui(c) => c.reader.list_schemas(&c.list).await,
            SasClient::Aptos(c) => c.reader.list_schemas(&ListOptions::default()).await,
        }
    }

    pub async fn list_attestations(&self) -> SasResult<Vec<AttestationRecord>> {
        match self {
            SasClient::Sui(c) => c.reader.list_attestations(&c.list).await,
            SasClient::Aptos(c) => c.reader.list_attestations(&ListOptions::default()).await,
        }
    }

    /// Sui resolvers take rules and config; Aptos resolvers take a module address.
    pub async fn create_schema(&self, input: &NewSchema, resolver: Option<&Resolver>) -> SasResult<TxReceipt> {
        match (self, resolver) {
            (SasClient::Sui(c), None) => c.writer()?.create_schema(input).await,
            (SasClient::Sui(_), Some(r)) if r.address.is_some() => Err(SasError::invalid_argument(
                "sui resolvers are rules and config, not a module address",
            )),
            (SasClient::Sui(c), Some(r)) => c.writer()?.create_schema_with_resolver(input, r).await,
            (SasClient::Aptos(c), None) => c.writer()?.create_schema(input).await,
            (SasClient::Aptos(c), Some(r)) => c.writer()?.create_schema_with_resolver(input, r).await,
        }
    }

    /// Attach a resolver to a schema that was created without one.
    pub async fn add_resolver(&self, admin_cap: &str, schema: &str, resolver: &Resolver) -> SasResult<TxReceipt> {
        match self {
            SasClient::Sui(c) => c.writer()?.add_resolver(admin_cap, schema, resolver).await,
            SasClient::Aptos(_) => Err(SasError::unsupported(Chain::Aptos.as_str(), "add_resolver")),
        }
    }

    /// On Sui, schemas that carry a resolver are attested through the
    /// request flow in the same transaction.
    pub async fn create_attestation(&self, input: &NewAttestation) -> SasResult<TxReceipt> {
        match self {
            SasClient::Sui(c) => {
                let writer = c.writer()?;
                let schema = c.reader.get_schema(&input.schema).await?;
                if schema.has_resolver() {
                    writer.create_attestation_with_resolver(input).await
                } else {
                    writer.create_attestation(input).await
                }
            }
            SasClient::Aptos(c) => c.writer()?.create_attestation(input).await,
        }
    }

    pub async fn revoke_attestation(&self, revocation: &Revocation) -> SasResult<TxReceipt> {
        match self {
            SasClient::Sui(c) => {
                let writer = c.writer()?;
                let admin_cap = revocation
                    .admin_cap
                    .as_deref()
                    .ok_or_else(|| SasError::invalid_argument("revoking on sui requires the schema admin cap"))?;
                let schema = match &revocation.schema {
                    Some(s) => s.clone(),
                    None => c.reader.get_attestation(&revocation.attestation).await?.schema,
                };
                writer
                    .revoke_attestation(admin_cap, &schema, &revocation.attestation)
                    .await
            }
            SasClient::Aptos(c) => c.writer()?.revoke_attestation(&revocation.attestation).await,
        }
    }
}
