//! Read side of the Sui SAS client.
//!
//! Implements [`RegistrySource`] for schema and attestation records so the
//! chain-neutral read path in `sas_core::registry` can drive it, and offers
//! direct lookups by address.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use sas_core::address::normalize_address;
use sas_core::config::{Chain, ClientConfig, Deployment, Network};
use sas_core::model::{AttestationRecord, Page, Registry, SchemaRecord, TableHandle};
use sas_core::registry::{self, ListOptions, RegistrySource};
use sas_core::version::{RegistryVersion, VersionWatermark};
use sas_core::{SasError, SasResult};

use crate::constants::{FIELD_ATTESTATION_RECORDS, FIELD_SCHEMA_RECORDS, MAX_PAGE_SIZE};
use crate::decode;
use crate::rpc::{DynamicFieldName, SuiObjectData, SuiRpc};

/// Clones share the highest registry versions seen so far, so a regression
/// is caught across every handle of one client.
#[derive(Debug, Clone)]
pub struct SuiRegistryClient {
    rpc: SuiRpc,
    deployment: Deployment,
    schema_version: VersionWatermark,
    attestation_version: VersionWatermark,
}

impl SuiRegistryClient {
    pub fn new(rpc: SuiRpc, deployment: Deployment) -> Self {
        Self {
            rpc,
            deployment,
            schema_version: VersionWatermark::default(),
            attestation_version: VersionWatermark::default(),
        }
    }

    /// Build a client for `network` from explicit configuration.
    pub fn connect(network: Network, cfg: &ClientConfig) -> SasResult<Self> {
        let deployment = cfg.deployments.get(Chain::Sui, network)?.clone();
        let url = cfg.endpoint(Chain::Sui, network)?;
        let rpc = SuiRpc::new(url, Duration::from_millis(cfg.timeout_ms))?;
        Ok(Self::new(rpc, deployment))
    }

    pub fn rpc(&self) -> &SuiRpc {
        &self.rpc
    }

    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    async fn object(&self, id: &str) -> SasResult<SuiObjectData> {
        self.rpc
            .get_object(id)
            .await?
            .ok_or_else(|| SasError::not_found(format!("object {id}")))
    }

    pub async fn get_schema(&self, address: &str) -> SasResult<SchemaRecord> {
        let address = normalize_address(address)?;
        decode::decode_schema(&self.object(&address).await?)
    }

    /// Fetch an attestation and check that the schema it references exists.
    pub async fn get_attestation(&self, address: &str) -> SasResult<AttestationRecord> {
        let address = normalize_address(address)?;
        let record = decode::decode_attestation(&self.object(&address).await?)?;
        if self.rpc.get_object(&record.schema).await?.is_none() {
            return Err(SasError::not_found(format!(
                "schema {} referenced by attestation {address}",
                record.schema
            )));
        }
        Ok(record)
    }

    pub async fn list_schemas(&self, opts: &ListOptions) -> SasResult<Vec<SchemaRecord>> {
        registry::list_records::<SchemaRecord, _>(self, &self.deployment.schema_registry, opts).await
    }

    pub async fn list_attestations(&self, opts: &ListOptions) -> SasResult<Vec<AttestationRecord>> {
        registry::list_records::<AttestationRecord, _>(self, &self.deployment.attestation_registry, opts).await
    }

    async fn registry_object(&self, registry_id: &str) -> SasResult<Registry> {
        let id = normalize_address(registry_id)?;
        let data = self
            .rpc
            .get_object(&id)
            .await?
            .ok_or_else(|| SasError::not_found(format!("registry {id}")))?;
        decode::decode_registry(&data)
    }

    async fn versioned_table(
        &self,
        registry: &Registry,
        version: RegistryVersion,
        table_field: &str,
    ) -> SasResult<TableHandle> {
        let name = DynamicFieldName {
            type_: "u64".to_string(),
            value: json!(version.get().to_string()),
        };
        match self.rpc.get_dynamic_field_object(&registry.versioned_id, &name).await? {
            Some(data) => decode::decode_table(&data, table_field, version),
            None => Err(SasError::stale_version(
                version.get(),
                format!("no versioned field under {} for registry {}", registry.versioned_id, registry.id),
            )),
        }
    }

    async fn table_keys(&self, table: &TableHandle, cursor: Option<&str>, limit: usize) -> SasResult<Page<String>> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let page = self.rpc.get_dynamic_fields(&table.id, cursor, limit).await?;
        let items = page
            .data
            .iter()
            .map(|f| {
                f.name
                    .value
                    .as_str()
                    .ok_or_else(|| SasError::decode(format!("table key is not an address: {}", f.name.value)))
                    .and_then(normalize_address)
            })
            .collect::<SasResult<Vec<_>>>()?;
        debug!(table = %table.id, n = items.len(), more = page.has_next_page, "table page");
        Ok(Page {
            items,
            next_cursor: page.next_cursor,
            has_next_page: page.has_next_page,
        })
    }

    async fn table_contains(&self, table: &TableHandle, key: &str) -> SasResult<bool> {
        let name = DynamicFieldName {
            type_: "address".to_string(),
            value: json!(normalize_address(key)?),
        };
        Ok(self.rpc.get_dynamic_field_object(&table.id, &name).await?.is_some())
    }
}

#[async_trait]
impl RegistrySource<SchemaRecord> for SuiRegistryClient {
    async fn fetch_registry(&self, registry_id: &str) -> SasResult<Registry> {
        self.registry_object(registry_id).await
    }

    async fn resolve_table(&self, registry: &Registry, version: RegistryVersion) -> SasResult<TableHandle> {
        self.versioned_table(registry, version, FIELD_SCHEMA_RECORDS).await
    }

    async fn list_keys(&self, table: &TableHandle, cursor: Option<&str>, limit: usize) -> SasResult<Page<String>> {
        self.table_keys(table, cursor, limit).await
    }

    async fn contains_key(&self, table: &TableHandle, key: &str) -> SasResult<bool> {
        self.table_contains(table, key).await
    }

    async fn fetch_record(&self, key: &str) -> SasResult<SchemaRecord> {
        self.get_schema(key).await
    }

    fn watermark(&self) -> Option<&VersionWatermark> {
        Some(&self.schema_version)
    }
}

#[async_trait]
impl RegistrySource<AttestationRecord> for SuiRegistryClient {
    async fn fetch_registry(&self, registry_id: &str) -> SasResult<Registry> {
        self.registry_object(registry_id).await
    }

    async fn resolve_table(&self, registry: &Registry, version: RegistryVersion) -> SasResult<TableHandle> {
        self.versioned_table(registry, version, FIELD_ATTESTATION_RECORDS).await
    }

    async fn list_keys(&self, table: &TableHandle, cursor: Option<&str>, limit: usize) -> SasResult<Page<String>> {
        self.table_keys(table, cursor, limit).await
    }

    async fn contains_key(&self, table: &TableHandle, key: &str) -> SasResult<bool> {
        self.table_contains(table, key).await
    }

    async fn fetch_record(&self, key: &str) -> SasResult<AttestationRecord> {
        self.get_attestation(key).await
    }

    fn watermark(&self) -> Option<&VersionWatermark> {
        Some(&self.attestation_version)
    }
}
