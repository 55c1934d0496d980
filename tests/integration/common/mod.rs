//! Shared fixtures for the mocked-fullnode tests.
#![allow(dead_code)]

use std::sync::Mutex;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use httpmock::prelude::*;
use httpmock::Mock;
use serde_json::{json, Value};
use url::Url;

use sas_core::config::{Chain, ClientConfig, Deployment, DeploymentTable, Network};
use sas_sui_client::ptb::{Argument, CallArg, Command, ProgrammableMoveCall, SuiAddress, TransactionData};

pub const PKG: &str = "0x00000000000000000000000000000000000000000000000000000000000000aa";
pub const SCHEMA_REGISTRY: &str = "0x0000000000000000000000000000000000000000000000000000000000000010";
pub const ATTESTATION_REGISTRY: &str = "0x0000000000000000000000000000000000000000000000000000000000000020";
pub const VERSIONED: &str = "0x0000000000000000000000000000000000000000000000000000000000000011";
pub const TABLE: &str = "0x0000000000000000000000000000000000000000000000000000000000000012";
pub const CLOCK: &str = "0x0000000000000000000000000000000000000000000000000000000000000006";
pub const ZERO_DIGEST: &str = "11111111111111111111111111111111";

/// `0x` + 62 zeros + two hex digits.
pub fn addr(n: u8) -> String {
    format!("0x{}{n:02x}", "0".repeat(62))
}

pub fn config(url: &str, chain: Chain) -> ClientConfig {
    let mut deployments = DeploymentTable::empty();
    deployments
        .insert(
            chain,
            Network::Localnet,
            Deployment {
                package: PKG.to_string(),
                schema_registry: SCHEMA_REGISTRY.to_string(),
                attestation_registry: ATTESTATION_REGISTRY.to_string(),
            },
        )
        .unwrap();
    ClientConfig {
        rpc_url: Some(Url::parse(url).unwrap()),
        timeout_ms: 5_000,
        finality_timeout_ms: 400,
        poll_interval_ms: 50,
        deployments,
        ..ClientConfig::default()
    }
}

pub fn rpc_ok(result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": 1, "result": result })
}

fn method(name: &str) -> String {
    format!("\"method\":\"{name}\"")
}

pub fn object(id: &str, ty: &str, fields: Value) -> Value {
    json!({
        "data": {
            "objectId": id,
            "version": "12",
            "digest": ZERO_DIGEST,
            "type": ty,
            "owner": { "Shared": { "initial_shared_version": 3 } },
            "previousTransaction": ZERO_DIGEST,
            "content": {
                "dataType": "moveObject",
                "type": ty,
                "hasPublicTransfer": false,
                "fields": fields
            }
        }
    })
}

pub fn missing(id: &str) -> Value {
    json!({ "error": { "code": "notExists", "object_id": id } })
}

pub fn registry_object(id: &str, version: u64) -> Value {
    object(
        id,
        &format!("{PKG}::registry::Registry"),
        json!({
            "id": { "id": id },
            "inner": {
                "type": "0x2::versioned::Versioned",
                "fields": { "id": { "id": VERSIONED }, "version": version.to_string() }
            }
        }),
    )
}

pub fn versioned_field(table_field: &str) -> Value {
    object(
        "0x0000000000000000000000000000000000000000000000000000000000000013",
        "0x2::dynamic_field::Field<u64, Inner>",
        json!({
            "id": { "id": "0x13" },
            "name": "1",
            "value": {
                "type": format!("{PKG}::registry::Inner"),
                "fields": {
                    table_field: { "type": "0x2::table::Table", "fields": { "id": { "id": TABLE }, "size": "3" } }
                }
            }
        }),
    )
}

pub fn schema_object(id: &str, schema: &[u8], resolver: Value) -> Value {
    object(
        id,
        &format!("{PKG}::schema::Schema"),
        json!({
            "id": { "id": id },
            "name": "kyc",
            "description": "kyc schema",
            "url": "https://example.com",
            "creator": addr(0xc0),
            "created_at": "1700000000000",
            "schema": schema,
            "revokable": true,
            "resolver": resolver,
            "tx_hash": [7, 7, 7]
        }),
    )
}

pub fn attestation_object(id: &str, schema: &str, revocation_time: &str) -> Value {
    object(
        id,
        &format!("{PKG}::attestation::Attestation"),
        json!({
            "id": { "id": id },
            "schema": schema,
            "ref_attestation": "0x0",
            "time": "1700000000001",
            "expiration_time": "0",
            "revocation_time": revocation_time,
            "revokable": true,
            "attestor": addr(0xc0),
            "recipient": addr(0xd0),
            "data": [1, 2, 3],
            "tx_hash": []
        }),
    )
}

pub fn field_page(keys: &[String], next_cursor: Option<&str>) -> Value {
    let data: Vec<Value> = keys
        .iter()
        .map(|k| {
            json!({
                "name": { "type": "address", "value": k },
                "objectId": k,
                "objectType": "0x2::dynamic_field::Field<address, bool>"
            })
        })
        .collect();
    json!({ "data": data, "nextCursor": next_cursor, "hasNextPage": next_cursor.is_some() })
}

/// Mock one JSON-RPC method whose request body contains every fragment.
pub async fn rpc<'a>(server: &'a MockServer, name: &str, fragments: &[&str], result: Value) -> Mock<'a> {
    let body = rpc_ok(result);
    let m = method(name);
    let fragments: Vec<String> = fragments.iter().map(|s| s.to_string()).collect();
    server
        .mock_async(move |when, then| {
            fragments
                .iter()
                .fold(when.method(POST).body_contains(m.as_str()), |w, f| w.body_contains(f.as_str()));
            then.status(200).json_body(body);
        })
        .await
}

/// Mocks the registry, its versioned field and the table listing for a
/// registry with `keys`, split into pages of two.
pub async fn registry_with_keys(server: &MockServer, registry: &str, table_field: &str, keys: &[String]) {
    rpc(server, "sui_getObject", &[registry], registry_object(registry, 1)).await;
    rpc(server, "suix_getDynamicFieldObject", &[VERSIONED], versioned_field(table_field)).await;

    let pages: Vec<&[String]> = if keys.is_empty() { vec![&[]] } else { keys.chunks(2).collect() };
    for (i, page) in pages.iter().enumerate() {
        let cursor_in = if i == 0 { format!("\"{TABLE}\",null") } else { format!("\"c{i}\"") };
        let cursor_out = (i + 1 < pages.len()).then(|| format!("c{}", i + 1));
        rpc(
            server,
            "suix_getDynamicFields",
            &[cursor_in.as_str()],
            field_page(page, cursor_out.as_deref()),
        )
        .await;
    }
}

/// Transaction bytes seen by every `sui_executeTransactionBlock` mock in this
/// test binary. Tests tell their transactions apart by sender.
static SUBMITTED: Mutex<Vec<Vec<u8>>> = Mutex::new(Vec::new());

fn capture_tx(req: &HttpMockRequest) -> bool {
    let Some(body) = req.body.as_deref() else {
        return false;
    };
    let Ok(v) = serde_json::from_slice::<Value>(body) else {
        return false;
    };
    if v["method"] != "sui_executeTransactionBlock" {
        return false;
    }
    if let Some(bytes) = v["params"][0].as_str().and_then(|b| BASE64.decode(b).ok()) {
        SUBMITTED.lock().unwrap().push(bytes);
    }
    true
}

/// Mock `sui_executeTransactionBlock`, recording the submitted transaction.
pub async fn execute_capturing<'a>(server: &'a MockServer, result: Value) -> Mock<'a> {
    let body = rpc_ok(result);
    server
        .mock_async(move |when, then| {
            when.method(POST).matches(capture_tx);
            then.status(200).json_body(body);
        })
        .await
}

/// The last transaction submitted by `sender`.
pub fn submitted_by(sender: SuiAddress) -> TransactionData {
    SUBMITTED
        .lock()
        .unwrap()
        .iter()
        .filter_map(|b| TransactionData::from_bcs(b).ok())
        .filter(|tx| tx.sender() == sender)
        .last()
        .expect("no transaction submitted by sender")
}

/// `(module, function)` of every command, in order.
pub fn calls(tx: &TransactionData) -> Vec<(String, String)> {
    tx.programmable()
        .commands
        .iter()
        .map(|c| match c {
            Command::MoveCall(m) => (m.module.clone(), m.function.clone()),
            Command::TransferObjects(..) => ("".into(), "transfer_objects".into()),
        })
        .collect()
}

pub fn move_call(tx: &TransactionData, idx: usize) -> &ProgrammableMoveCall {
    match &tx.programmable().commands[idx] {
        Command::MoveCall(m) => m,
        other => panic!("command {idx} is not a move call: {other:?}"),
    }
}

/// The input an argument points at.
pub fn input(tx: &TransactionData, arg: Argument) -> &CallArg {
    match arg {
        Argument::Input(i) => &tx.programmable().inputs[i as usize],
        other => panic!("{other:?} is not an input"),
    }
}

/// The object id behind an object input argument.
pub fn object_input(tx: &TransactionData, arg: Argument) -> SuiAddress {
    match input(tx, arg) {
        CallArg::Object(o) => o.id(),
        other => panic!("{other:?} is not an object input"),
    }
}

/// 32 bytes of `addr(n)`.
pub fn addr_bytes(n: u8) -> SuiAddress {
    let mut b = [0u8; 32];
    b[31] = n;
    b
}
