//! Aptos fullnode REST transport (`/v1`).
//!
//! JSON only: transactions are encoded by the node (`encode_submission`),
//! signed locally, and submitted as JSON with the signature attached.

use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use tracing::debug;
use url::Url;

use sas_core::{now_ms, SasError, SasResult};

const USER_AGENT: &str = concat!("sas-aptos-client/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct AptosRest {
    http: reqwest::Client,
    base_url: Url,
}

/// Body of `POST /view`.
#[derive(Debug, Clone, Serialize)]
pub struct ViewRequest {
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryFunctionPayload {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<Value>,
}

impl EntryFunctionPayload {
    pub fn new(function: String, arguments: Vec<Value>) -> Self {
        Self {
            kind: "entry_function_payload",
            function,
            type_arguments: Vec::new(),
            arguments,
        }
    }
}

/// Unsigned user transaction, as accepted by `encode_submission`.
#[derive(Debug, Clone, Serialize)]
pub struct UserTransactionRequest {
    pub sender: String,
    #[serde(serialize_with = "as_string")]
    pub sequence_number: u64,
    #[serde(serialize_with = "as_string")]
    pub max_gas_amount: u64,
    #[serde(serialize_with = "as_string")]
    pub gas_unit_price: u64,
    #[serde(serialize_with = "as_string")]
    pub expiration_timestamp_secs: u64,
    pub payload: EntryFunctionPayload,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionSignature {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub public_key: String,
    pub signature: String,
}

impl TransactionSignature {
    pub fn ed25519(public_key: String, signature: String) -> Self {
        Self {
            kind: "ed25519_signature",
            public_key,
            signature,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitTransactionRequest {
    #[serde(flatten)]
    pub request: UserTransactionRequest,
    pub signature: TransactionSignature,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PendingTransaction {
    pub hash: String,
}

#[derive(Debug, Deserialize)]
struct AccountData {
    sequence_number: String,
}

/// Error body returned by the fullnode on non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub struct RestError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub vm_error_code: Option<u64>,
}

fn as_string<S: Serializer>(v: &u64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&v.to_string())
}

impl AptosRest {
    /// `base_url` is the `/v1` root of a fullnode.
    pub fn new(mut base_url: Url, timeout: Duration) -> SasResult<Self> {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SasError::configuration(format!("http client: {e}")))?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> SasResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| SasError::configuration(format!("bad path {path}: {e}")))
    }

    pub async fn get_sequence_number(&self, address: &str) -> SasResult<u64> {
        let account: AccountData = self.get(&format!("accounts/{address}")).await?;
        account
            .sequence_number
            .parse()
            .map_err(|_| SasError::decode(format!("sequence number: {}", account.sequence_number)))
    }

    /// Call a view function; the result is the list of its return values.
    pub async fn view(&self, req: &ViewRequest) -> SasResult<Vec<Value>> {
        self.post("view", req).await
    }

    /// Ask the node for the signing message of `req`.
    pub async fn encode_submission(&self, req: &UserTransactionRequest) -> SasResult<Vec<u8>> {
        let encoded: String = self.post("transactions/encode_submission", req).await?;
        hex::decode(encoded.trim_start_matches("0x"))
            .map_err(|e| SasError::decode(format!("signing message: {e}")))
    }

    pub async fn submit(&self, req: &SubmitTransactionRequest) -> SasResult<PendingTransaction> {
        self.post("transactions", req).await
    }

    /// `None` while the node does not know the hash yet.
    pub async fn get_transaction_by_hash(&self, hash: &str) -> SasResult<Option<Value>> {
        match self.get::<Value>(&format!("transactions/by_hash/{hash}")).await {
            Ok(v) => Ok(Some(v)),
            Err(SasError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Poll until the transaction leaves the mempool, expires, or `timeout` elapses.
    pub async fn wait_for_transaction(
        &self,
        hash: &str,
        expiration_timestamp_secs: u64,
        timeout: Duration,
        delay: Duration,
    ) -> SasResult<Value> {
        let start = Instant::now();
        while start.elapsed() < timeout {
            if let Some(txn) = self.get_transaction_by_hash(hash).await? {
                if txn.get("type").and_then(Value::as_str) != Some("pending_transaction") {
                    return Ok(txn);
                }
            }

            if expiration_timestamp_secs <= now_ms() / 1000 {
                return Err(SasError::transaction(format!("transaction {hash} expired")));
            }

            tokio::time::sleep(delay).await;
        }

        Err(SasError::transaction(format!(
            "transaction {hash} not finalized within {}ms",
            timeout.as_millis()
        )))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> SasResult<T> {
        debug!(path, "aptos rest get");
        let resp = self
            .http
            .get(self.url(path)?)
            .send()
            .await
            .map_err(|e| SasError::rpc(format!("GET {path}: {e}")))?;
        Self::json(path, resp).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> SasResult<T> {
        debug!(path, "aptos rest post");
        let resp = self
            .http
            .post(self.url(path)?)
            .json(body)
            .send()
            .await
            .map_err(|e| SasError::rpc(format!("POST {path}: {e}")))?;
        Self::json(path, resp).await
    }

    async fn json<T: DeserializeOwned>(path: &str, resp: reqwest::Response) -> SasResult<T> {
        let status = resp.status();
        if !status.is_success() {
            let err = resp.json::<RestError>().await.unwrap_or_default();
            return Err(classify(path, status.as_u16(), err));
        }
        resp.json()
            .await
            .map_err(|e| SasError::decode(format!("{path}: {e}")))
    }
}

/// Missing resources and Move aborts inside view functions both mean the
/// requested record does not exist.
fn classify(path: &str, status: u16, err: RestError) -> SasError {
    let missing = status == 404
        || matches!(
            err.error_code.as_deref(),
            Some("resource_not_found" | "account_not_found" | "transaction_not_found")
        )
        || (path == "view" && err.vm_error_code.is_some());
    if missing {
        SasError::not_found(format!("{path}: {}", err.message))
    } else {
        SasError::rpc(format!("{path}: http {status}: {}", err.message))
    }
}
