//! Minimal Sui JSON-RPC transport.
//!
//! Only the methods the SAS client needs are wrapped. Each call is a single
//! HTTP POST; there is no retry or pooling beyond what `reqwest` does.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use sas_core::{SasError, SasResult};

const USER_AGENT: &str = concat!("sas-sui-client/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct SuiRpc {
    http: reqwest::Client,
    url: Url,
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// `sui_getObject` / `suix_getDynamicFieldObject` response.
#[derive(Debug, Clone, Deserialize)]
pub struct SuiObjectResponse {
    pub data: Option<SuiObjectData>,
    pub error: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiObjectData {
    pub object_id: String,
    pub version: String,
    pub digest: String,
    #[serde(rename = "type")]
    pub object_type: Option<String>,
    pub owner: Option<Value>,
    pub previous_transaction: Option<String>,
    pub content: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicFieldPage {
    pub data: Vec<DynamicFieldInfo>,
    pub next_cursor: Option<String>,
    pub has_next_page: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicFieldInfo {
    pub name: DynamicFieldName,
    pub object_id: String,
    pub object_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicFieldName {
    #[serde(rename = "type")]
    pub type_: String,
    pub value: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinPage {
    pub data: Vec<Coin>,
    pub next_cursor: Option<String>,
    pub has_next_page: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coin {
    pub coin_object_id: String,
    pub version: String,
    pub digest: String,
    pub balance: String,
}

impl SuiRpc {
    pub fn new(url: Url, timeout: Duration) -> SasResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SasError::configuration(format!("http client: {e}")))?;
        Ok(Self { http, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Issue one JSON-RPC call and decode its `result`.
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> SasResult<T> {
        debug!(method, "sui rpc call");
        let req = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };

        let resp = self
            .http
            .post(self.url.clone())
            .json(&req)
            .send()
            .await
            .map_err(|e| SasError::rpc(format!("{method}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SasError::rpc(format!("{method}: http {status}")));
        }

        let body: RpcResponse<T> = resp
            .json()
            .await
            .map_err(|e| SasError::decode(format!("{method}: {e}")))?;

        if let Some(err) = body.error {
            return Err(SasError::rpc(format!("{method}: {} ({})", err.message, err.code)));
        }
        body.result
            .ok_or_else(|| SasError::decode(format!("{method}: response has neither result nor error")))
    }

    /// Fetch an object with its content, owner and previous transaction.
    /// Returns `None` when the object does not exist.
    pub async fn get_object(&self, object_id: &str) -> SasResult<Option<SuiObjectData>> {
        let resp: SuiObjectResponse = self
            .call(
                "sui_getObject",
                json!([object_id, {
                    "showType": true,
                    "showOwner": true,
                    "showContent": true,
                    "showPreviousTransaction": true,
                }]),
            )
            .await?;
        Ok(present(resp))
    }

    pub async fn get_dynamic_fields(
        &self,
        parent_id: &str,
        cursor: Option<&str>,
        limit: usize,
    ) -> SasResult<DynamicFieldPage> {
        self.call("suix_getDynamicFields", json!([parent_id, cursor, limit])).await
    }

    /// Returns `None` when no field with `name` exists under `parent_id`.
    pub async fn get_dynamic_field_object(
        &self,
        parent_id: &str,
        name: &DynamicFieldName,
    ) -> SasResult<Option<SuiObjectData>> {
        let resp: SuiObjectResponse = self
            .call("suix_getDynamicFieldObject", json!([parent_id, name]))
            .await?;
        Ok(present(resp))
    }

    pub async fn get_reference_gas_price(&self) -> SasResult<u64> {
        let v: Value = self.call("suix_getReferenceGasPrice", json!([])).await?;
        parse_u64(&v).ok_or_else(|| SasError::decode(format!("reference gas price: {v}")))
    }

    pub async fn get_coins(&self, owner: &str, coin_type: &str) -> SasResult<CoinPage> {
        self.call("suix_getCoins", json!([owner, coin_type, Value::Null, Value::Null]))
            .await
    }

    /// Submit a signed transaction and wait for local execution.
    pub async fn execute_transaction_block(&self, tx_bytes_b64: &str, signature_b64: &str) -> SasResult<Value> {
        self.call(
            "sui_executeTransactionBlock",
            json!([
                tx_bytes_b64,
                [signature_b64],
                { "showEffects": true, "showObjectChanges": true },
                "WaitForLocalExecution"
            ]),
        )
        .await
    }
}

/// Missing objects come back as `{"error": {"code": "notExists" | "dynamicFieldNotFound", ..}}`.
fn present(resp: SuiObjectResponse) -> Option<SuiObjectData> {
    if let Some(err) = &resp.error {
        debug!(%err, "object not present");
    }
    resp.data
}

/// Move `u64` values arrive as strings; accept numbers too.
pub(crate) fn parse_u64(v: &Value) -> Option<u64> {
    match v {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}
