//! Read side of the Aptos SAS client.
//!
//! Records are read through view functions. The REST API cannot enumerate
//! table contents, so listing is reported as unsupported.

use std::time::Duration;

use serde_json::{json, Value};

use sas_core::address::normalize_address;
use sas_core::config::{Chain, ClientConfig, Deployment, Network};
use sas_core::entry::{ATTESTATION_DATA_VIEW, ATTESTATION_MODULE, SCHEMA_DATA_VIEW, SCHEMA_MODULE};
use sas_core::model::{AttestationRecord, SchemaRecord};
use sas_core::registry::ListOptions;
use sas_core::{SasError, SasResult};

use crate::decode;
use crate::rest::{AptosRest, ViewRequest};

#[derive(Debug, Clone)]
pub struct AptosRegistryClient {
    rest: AptosRest,
    deployment: Deployment,
}

impl AptosRegistryClient {
    pub fn new(rest: AptosRest, deployment: Deployment) -> Self {
        Self { rest, deployment }
    }

    pub fn connect(network: Network, cfg: &ClientConfig) -> SasResult<Self> {
        let deployment = cfg.deployments.get(Chain::Aptos, network)?.clone();
        let url = cfg.endpoint(Chain::Aptos, network)?;
        let rest = AptosRest::new(url, Duration::from_millis(cfg.timeout_ms))?;
        Ok(Self::new(rest, deployment))
    }

    pub fn rest(&self) -> &AptosRest {
        &self.rest
    }

    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    async fn view(&self, module: &str, function: &str, address: &str) -> SasResult<Vec<Value>> {
        let req = ViewRequest {
            function: format!("{}::{module}::{function}", self.deployment.package),
            type_arguments: Vec::new(),
            arguments: vec![json!(address)],
        };
        self.rest.view(&req).await
    }

    pub async fn get_schema(&self, address: &str) -> SasResult<SchemaRecord> {
        let address = normalize_address(address)?;
        let values = self.view(SCHEMA_MODULE, SCHEMA_DATA_VIEW, &address).await?;
        decode::decode_schema(&address, &values)
    }

    /// Fetch an attestation and check that the schema it references exists.
    pub async fn get_attestation(&self, address: &str) -> SasResult<AttestationRecord> {
        let address = normalize_address(address)?;
        let values = self.view(ATTESTATION_MODULE, ATTESTATION_DATA_VIEW, &address).await?;
        let record = decode::decode_attestation(&address, &values)?;
        match self.get_schema(&record.schema).await {
            Ok(_) => Ok(record),
            Err(SasError::NotFound(_)) => Err(SasError::not_found(format!(
                "schema {} referenced by attestation {address}",
                record.schema
            ))),
            Err(e) => Err(e),
        }
    }

    pub async fn list_schemas(&self, _opts: &ListOptions) -> SasResult<Vec<SchemaRecord>> {
        Err(SasError::unsupported(Chain::Aptos.as_str(), "list_schemas"))
    }

    pub async fn list_attestations(&self, _opts: &ListOptions) -> SasResult<Vec<AttestationRecord>> {
        Err(SasError::unsupported(Chain::Aptos.as_str(), "list_attestations"))
    }
}
