//! Write side of the Sui SAS client.
//!
//! Each convenience method builds a single programmable transaction, signs it
//! with the injected key, submits it with `WaitForLocalExecution`, and returns
//! the finalized receipt. A failed effects status is a `Transaction` error.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::Value;
use tracing::info;

use sas_core::address::{address_bytes, decode_digest, normalize_address};
use sas_core::config::{Chain, Deployment};
use sas_core::model::{CreatedObject, NewAttestation, NewSchema, Resolver, TxReceipt};
use sas_core::signer::KeyProvider;
use sas_core::{SasError, SasResult};

use crate::constants::{CLOCK_OBJECT_ID, SUI_COIN_TYPE};
use crate::keys::{sign_transaction, sui_address};
use crate::ptb::{GasData, ObjectArg, ObjectRef, ObjectDigest, PtbBuilder, TransactionData};
use crate::rpc::{parse_u64, SuiObjectData, SuiRpc};

pub struct SuiWriter {
    rpc: SuiRpc,
    keys: Arc<dyn KeyProvider>,
    deployment: Deployment,
    gas_budget: u64,
}

impl SuiWriter {
    pub fn new(rpc: SuiRpc, keys: Arc<dyn KeyProvider>, deployment: Deployment, gas_budget: u64) -> Self {
        Self {
            rpc,
            keys,
            deployment,
            gas_budget,
        }
    }

    /// Address of the signing key.
    pub fn sender(&self) -> String {
        sui_address(&self.keys.public_key())
    }

    /// A fresh builder bound to the deployment's package.
    pub fn builder(&self) -> SasResult<PtbBuilder> {
        PtbBuilder::new(&self.deployment.package)
    }

    /// Resolve an object id into a transaction input. Shared objects keep
    /// their initial shared version; owned and immutable objects use their
    /// current reference.
    pub async fn object_arg(&self, id: &str, mutable: bool) -> SasResult<ObjectArg> {
        let id = normalize_address(id)?;
        let data = self
            .rpc
            .get_object(&id)
            .await?
            .ok_or_else(|| SasError::not_found(format!("object {id}")))?;
        object_arg_from(&data, mutable)
    }

    /// Sign, submit and wait for a composed transaction.
    pub async fn execute(&self, ptb: PtbBuilder) -> SasResult<TxReceipt> {
        if ptb.is_empty() {
            return Err(SasError::invalid_argument("transaction has no commands"));
        }
        let sender = self.sender();
        let price = self.rpc.get_reference_gas_price().await?;
        let payment = self.gas_coin(&sender).await?;

        let gas = GasData {
            payment: vec![payment],
            owner: address_bytes(&sender)?,
            price,
            budget: self.gas_budget,
        };
        let tx = TransactionData::new(ptb.finish(), address_bytes(&sender)?, gas);
        let tx_bytes = tx.to_bcs()?;
        let signature = sign_transaction(self.keys.as_ref(), &tx_bytes)?;

        let raw = self
            .rpc
            .execute_transaction_block(&BASE64.encode(&tx_bytes), &signature)
            .await?;
        let receipt = receipt_from(raw)?;
        info!(digest = %receipt.digest, "sui transaction finalized");
        Ok(receipt)
    }

    pub async fn create_schema(&self, input: &NewSchema) -> SasResult<TxReceipt> {
        let mut b = self.builder()?;
        let registry = b.object(self.object_arg(&self.deployment.schema_registry, true).await?);
        let cap = b.create_schema(registry, input)?;
        let me = b.pure_address(&self.sender())?;
        b.transfer_objects(vec![cap], me);
        self.execute(b).await
    }

    pub async fn create_schema_with_resolver(&self, input: &NewSchema, resolver: &Resolver) -> SasResult<TxReceipt> {
        let mut b = self.builder()?;
        let registry = b.object(self.object_arg(&self.deployment.schema_registry, true).await?);
        let cap = b.create_schema_with_resolver(registry, input, resolver)?;
        let me = b.pure_address(&self.sender())?;
        b.transfer_objects(vec![cap], me);
        self.execute(b).await
    }

    /// Attach a resolver to an existing schema (`new_resolver_builder` then `add_resolver`).
    pub async fn add_resolver(&self, admin_cap: &str, schema: &str, resolver: &Resolver) -> SasResult<TxReceipt> {
        let mut b = self.builder()?;
        let cap = b.object(self.object_arg(admin_cap, true).await?);
        let schema = b.object(self.object_arg(schema, true).await?);
        let builder = b.new_resolver_builder(cap, schema, resolver)?;
        b.add_resolver(schema, builder);
        self.execute(b).await
    }

    pub async fn create_attestation(&self, input: &NewAttestation) -> SasResult<TxReceipt> {
        let mut b = self.builder()?;
        let (schema, registry, clock) = self.attest_inputs(&mut b, input).await?;
        b.create_attestation(schema, registry, input, clock)?;
        self.execute(b).await
    }

    /// Attest under a resolver-gated schema: `start_attest`, `finish_attest`,
    /// then `sas::attest`, all in one transaction.
    pub async fn create_attestation_with_resolver(&self, input: &NewAttestation) -> SasResult<TxReceipt> {
        let mut b = self.builder()?;
        let (schema, registry, clock) = self.attest_inputs(&mut b, input).await?;
        let request = b.start_attest(schema);
        b.finish_attest(schema, request);
        b.create_attestation(schema, registry, input, clock)?;
        self.execute(b).await
    }

    pub async fn revoke_attestation(&self, admin_cap: &str, schema: &str, attestation: &str) -> SasResult<TxReceipt> {
        let mut b = self.builder()?;
        let cap = b.object(self.object_arg(admin_cap, false).await?);
        let registry = b.object(self.object_arg(&self.deployment.attestation_registry, true).await?);
        let schema = b.object(self.object_arg(schema, false).await?);
        b.revoke_attestation(cap, registry, schema, attestation)?;
        self.execute(b).await
    }

    async fn attest_inputs(
        &self,
        b: &mut PtbBuilder,
        input: &NewAttestation,
    ) -> SasResult<(crate::ptb::Argument, crate::ptb::Argument, crate::ptb::Argument)> {
        let schema = b.object(self.object_arg(&input.schema, false).await?);
        let registry = b.object(self.object_arg(&self.deployment.attestation_registry, true).await?);
        let clock = b.object(self.object_arg(CLOCK_OBJECT_ID, false).await?);
        Ok((schema, registry, clock))
    }

    /// First SUI coin that covers the budget, else the largest one.
    async fn gas_coin(&self, owner: &str) -> SasResult<ObjectRef> {
        let coins = self.rpc.get_coins(owner, SUI_COIN_TYPE).await?;
        let mut best: Option<(u64, ObjectRef)> = None;
        for c in coins.data {
            let balance: u64 = c
                .balance
                .parse()
                .map_err(|_| SasError::decode(format!("coin balance: {}", c.balance)))?;
            let r = ObjectRef {
                object_id: address_bytes(&c.coin_object_id)?,
                version: c
                    .version
                    .parse()
                    .map_err(|_| SasError::decode(format!("coin version: {}", c.version)))?,
                digest: ObjectDigest(decode_digest(&c.digest)?),
            };
            if balance >= self.gas_budget {
                return Ok(r);
            }
            if best.as_ref().map_or(true, |(b, _)| balance > *b) {
                best = Some((balance, r));
            }
        }
        best.map(|(_, r)| r)
            .ok_or_else(|| SasError::transaction(format!("no SUI coins to pay gas for {owner}")))
    }
}

pub(crate) fn object_arg_from(data: &SuiObjectData, mutable: bool) -> SasResult<ObjectArg> {
    let id = address_bytes(&data.object_id)?;
    let shared_version = data
        .owner
        .as_ref()
        .and_then(|o| o.get("Shared"))
        .and_then(|s| s.get("initial_shared_version"))
        .and_then(parse_u64);

    if let Some(initial_shared_version) = shared_version {
        return Ok(ObjectArg::SharedObject {
            id,
            initial_shared_version,
            mutable,
        });
    }

    Ok(ObjectArg::ImmOrOwnedObject(ObjectRef {
        object_id: id,
        version: data
            .version
            .parse()
            .map_err(|_| SasError::decode(format!("object version: {}", data.version)))?,
        digest: ObjectDigest(decode_digest(&data.digest)?),
    }))
}

/// Map `sui_executeTransactionBlock` output onto a receipt.
pub(crate) fn receipt_from(raw: Value) -> SasResult<TxReceipt> {
    let digest = raw
        .get("digest")
        .and_then(Value::as_str)
        .ok_or_else(|| SasError::decode("execution result has no digest"))?
        .to_string();

    let status = raw
        .pointer("/effects/status/status")
        .and_then(Value::as_str)
        .ok_or_else(|| SasError::decode(format!("transaction {digest} has no effects status")))?;

    if status != "success" {
        let reason = raw
            .pointer("/effects/status/error")
            .and_then(Value::as_str)
            .unwrap_or(status);
        return Err(SasError::transaction(format!("{digest}: {reason}")));
    }

    let created_objects = raw
        .get("objectChanges")
        .and_then(Value::as_array)
        .map(|changes| {
            changes
                .iter()
                .filter(|c| c.get("type").and_then(Value::as_str) == Some("created"))
                .filter_map(|c| {
                    Some(CreatedObject {
                        object_id: c.get("objectId")?.as_str()?.to_string(),
                        object_type: c.get("objectType")?.as_str()?.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(TxReceipt {
        chain: Chain::Sui,
        digest,
        success: true,
        status: status.to_string(),
        created_objects,
        raw,
    })
}
