//! Write side of the Aptos SAS client.
//!
//! Every operation is one entry-function call: read the sender's sequence
//! number, let the node encode the signing message, sign it, submit, then
//! poll by hash until the transaction is committed.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tracing::info;

use sas_core::address::normalize_address;
use sas_core::config::{Chain, ClientConfig, Deployment};
use sas_core::model::{CreatedObject, NewAttestation, NewSchema, Resolver, TxReceipt};
use sas_core::signer::KeyProvider;
use sas_core::{now_ms, SasError, SasResult};

use crate::constants::{
    FN_CREATE_ATTESTATION, FN_CREATE_SCHEMA, FN_REVOKE_ATTESTATION, MODULE_AAS, NONE_ADDRESS, TXN_EXPIRATION_SECS,
    TYPE_ATTESTATION, TYPE_SCHEMA,
};
use crate::keys::{aptos_address, sign_message};
use crate::rest::{AptosRest, EntryFunctionPayload, SubmitTransactionRequest, UserTransactionRequest};

/// Gas and finality settings for submitted transactions.
#[derive(Debug, Clone, Copy)]
pub struct TransactionOptions {
    pub max_gas_amount: u64,
    pub gas_unit_price: u64,
    pub finality_timeout: Duration,
    pub poll_interval: Duration,
}

impl From<&ClientConfig> for TransactionOptions {
    fn from(cfg: &ClientConfig) -> Self {
        Self {
            max_gas_amount: cfg.max_gas_amount,
            gas_unit_price: cfg.gas_unit_price,
            finality_timeout: Duration::from_millis(cfg.finality_timeout_ms),
            poll_interval: Duration::from_millis(cfg.poll_interval_ms),
        }
    }
}

pub struct AptosWriter {
    rest: AptosRest,
    keys: Arc<dyn KeyProvider>,
    deployment: Deployment,
    options: TransactionOptions,
}

impl AptosWriter {
    pub fn new(rest: AptosRest, keys: Arc<dyn KeyProvider>, deployment: Deployment, options: TransactionOptions) -> Self {
        Self {
            rest,
            keys,
            deployment,
            options,
        }
    }

    pub fn sender(&self) -> String {
        aptos_address(&self.keys.public_key())
    }

    pub async fn create_schema(&self, input: &NewSchema) -> SasResult<TxReceipt> {
        self.execute(FN_CREATE_SCHEMA, create_schema_args(input, None)?).await
    }

    /// Register a schema guarded by the resolver module at `resolver.address`.
    pub async fn create_schema_with_resolver(&self, input: &NewSchema, resolver: &Resolver) -> SasResult<TxReceipt> {
        let address = resolver
            .address
            .as_deref()
            .ok_or_else(|| SasError::invalid_argument("aptos resolvers are identified by a module address"))?;
        self.execute(FN_CREATE_SCHEMA, create_schema_args(input, Some(address))?)
            .await
    }

    pub async fn create_attestation(&self, input: &NewAttestation) -> SasResult<TxReceipt> {
        self.execute(FN_CREATE_ATTESTATION, create_attestation_args(input)?).await
    }

    pub async fn revoke_attestation(&self, attestation: &str) -> SasResult<TxReceipt> {
        let attestation = normalize_address(attestation)?;
        self.execute(FN_REVOKE_ATTESTATION, vec![json!(attestation)]).await
    }

    /// Submit `aas::<function>(arguments)` and wait for it to commit.
    pub async fn execute(&self, function: &str, arguments: Vec<Value>) -> SasResult<TxReceipt> {
        let sender = self.sender();
        let sequence_number = self.rest.get_sequence_number(&sender).await?;
        let expiration_timestamp_secs = now_ms() / 1000 + TXN_EXPIRATION_SECS;

        let request = UserTransactionRequest {
            sender,
            sequence_number,
            max_gas_amount: self.options.max_gas_amount,
            gas_unit_price: self.options.gas_unit_price,
            expiration_timestamp_secs,
            payload: EntryFunctionPayload::new(
                format!("{}::{MODULE_AAS}::{function}", self.deployment.package),
                arguments,
            ),
        };

        let message = self.rest.encode_submission(&request).await?;
        let signature = sign_message(self.keys.as_ref(), &message)?;
        let pending = self
            .rest
            .submit(&SubmitTransactionRequest { request, signature })
            .await?;
        info!(hash = %pending.hash, function, "aptos transaction submitted");

        let txn = self
            .rest
            .wait_for_transaction(
                &pending.hash,
                expiration_timestamp_secs,
                self.options.finality_timeout,
                self.options.poll_interval,
            )
            .await?;
        let receipt = receipt_from(&pending.hash, txn)?;
        info!(hash = %receipt.digest, "aptos transaction committed");
        Ok(receipt)
    }
}

fn hex_arg(bytes: &[u8]) -> Value {
    json!(format!("0x{}", hex::encode(bytes)))
}

pub(crate) fn create_schema_args(input: &NewSchema, resolver: Option<&str>) -> SasResult<Vec<Value>> {
    let resolver = match resolver {
        Some(r) => normalize_address(r)?,
        None => NONE_ADDRESS.to_string(),
    };
    Ok(vec![
        hex_arg(&input.schema),
        json!(input.name),
        json!(input.description),
        json!(input.url),
        json!(input.revokable),
        json!(resolver),
    ])
}

pub(crate) fn create_attestation_args(input: &NewAttestation) -> SasResult<Vec<Value>> {
    let ref_attestation = match &input.ref_attestation {
        Some(r) => normalize_address(r)?,
        None => NONE_ADDRESS.to_string(),
    };
    Ok(vec![
        json!(normalize_address(&input.recipient)?),
        json!(normalize_address(&input.schema)?),
        json!(ref_attestation),
        json!(input.expiration_time.to_string()),
        json!(input.revokable),
        hex_arg(&input.data),
    ])
}

pub(crate) fn receipt_from(hash: &str, txn: Value) -> SasResult<TxReceipt> {
    let success = txn
        .get("success")
        .and_then(Value::as_bool)
        .ok_or_else(|| SasError::decode(format!("transaction {hash} has no success flag")))?;
    let status = txn
        .get("vm_status")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    if !success {
        return Err(SasError::transaction(format!("{hash}: {status}")));
    }

    let created_objects = txn
        .get("changes")
        .and_then(Value::as_array)
        .map(|changes| {
            changes
                .iter()
                .filter(|c| c.get("type").and_then(Value::as_str) == Some("write_resource"))
                .filter_map(|c| {
                    let ty = c.pointer("/data/type")?.as_str()?;
                    if !(ty.ends_with(TYPE_SCHEMA) || ty.ends_with(TYPE_ATTESTATION)) {
                        return None;
                    }
                    Some(CreatedObject {
                        object_id: c.get("address")?.as_str()?.to_string(),
                        object_type: ty.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(TxReceipt {
        chain: Chain::Aptos,
        digest: hash.to_string(),
        success,
        status,
        created_objects,
        raw: txn,
    })
}
