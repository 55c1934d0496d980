//! aptos_flow.rs
//!
//! Exercises the Aptos client against a mocked `/v1` REST API: view-based
//! reads, the encode/sign/submit/poll write flow, and its failure modes.

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use httpmock::prelude::*;
use serde_json::{json, Value};

use common::*;
use sas_core::config::{Chain, Network};
use sas_core::model::{NewSchema, Resolver};
use sas_core::signer::{Ed25519KeyProvider, KeyProvider};
use sas_core::SasError;
use sas_sdk::{Revocation, SasClient};

const HASH: &str = "0x5eb1cc0b3b1d0cc5b6c6e1ea7a94d1a2f3bb4b1f7d5e1c3c9a1b2c3d4e5f6a7b";

fn key() -> Arc<Ed25519KeyProvider> {
    Arc::new(Ed25519KeyProvider::from_bytes(&[8u8; 32]))
}

fn aptos(server: &MockServer) -> SasClient {
    sas_sdk::connect(Chain::Aptos, Network::Localnet, &config(&server.url("/v1"), Chain::Aptos)).unwrap()
}

async fn view(server: &MockServer, function: &str, address: &str, result: Value) {
    let function = format!("{PKG}::{function}");
    let address = address.to_string();
    server
        .mock_async(move |when, then| {
            when.method(POST)
                .path("/v1/view")
                .body_contains(function.as_str())
                .body_contains(address.as_str());
            then.status(200).json_body(result);
        })
        .await;
}

fn schema_values(schema_hex: &str) -> Value {
    json!([addr(0xc0), "1700000000000", schema_hex, "profile", "", "", true, "0x0", "0x"])
}

fn attestation_values(schema: &str, revocation: Value) -> Value {
    json!([
        addr(0xa0),
        addr(0xb0),
        schema,
        { "vec": [] },
        "1700000000000",
        "0",
        revocation,
        true,
        "0x68656c6c6f",
        "0x0102"
    ])
}

#[tokio::test]
async fn reads_schema_through_view() {
    let server = MockServer::start_async().await;
    let id = addr(0x51);
    view(&server, "schema::schema_data", &id, schema_values("0xdeadbeef")).await;

    let s = aptos(&server).get_schema(&id).await.unwrap();
    assert_eq!(s.schema, vec![0xde, 0xad, 0xbe, 0xef]);
    assert_eq!(s.creator, addr(0xc0));
    assert!(s.resolver.is_none());
    assert!(s.tx_hash.is_none());
}

#[tokio::test]
async fn reads_schema_resolver_address() {
    let server = MockServer::start_async().await;
    let id = addr(0x51);
    let mut values = schema_values("0x01");
    values[7] = json!(addr(0xe0));
    view(&server, "schema::schema_data", &id, values).await;

    let s = aptos(&server).get_schema(&id).await.unwrap();
    assert_eq!(s.resolver, Some(Resolver::at_address(addr(0xe0))));
    assert!(s.has_resolver());
}

#[tokio::test]
async fn reads_attestation_and_checks_schema() {
    let server = MockServer::start_async().await;
    let schema = addr(0x51);
    let att = addr(0xa1);
    let orphan = addr(0xa2);
    let gone = addr(0x5f);
    view(&server, "schema::schema_data", &schema, schema_values("0x00")).await;
    view(&server, "attestation::attestation_data", &att, attestation_values(&schema, json!({ "vec": ["1700000000500"] }))).await;
    view(&server, "attestation::attestation_data", &orphan, attestation_values(&gone, json!({ "vec": [] }))).await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/view").body_contains(gone.as_str());
            then.status(400).json_body(json!({
                "message": "Move abort in schema: ESCHEMA_NOT_FOUND(0x1)",
                "error_code": "invalid_input",
                "vm_error_code": 4016
            }));
        })
        .await;

    let client = aptos(&server);
    let a = client.get_attestation(&att).await.unwrap();
    assert_eq!(a.revocation_time, Some(1_700_000_000_500));
    assert_eq!(a.data, b"hello".to_vec());
    assert_eq!(a.tx_hash.as_deref(), Some("5T"));

    assert_matches!(client.get_attestation(&orphan).await, Err(SasError::NotFound(_)));
}

#[tokio::test]
async fn listing_is_unsupported() {
    let server = MockServer::start_async().await;
    assert_matches!(aptos(&server).list_schemas().await, Err(SasError::Unsupported { .. }));
}

async fn submission(server: &MockServer) -> String {
    let sender = sas_sdk::aptos_address(&key().public_key());
    server
        .mock_async(|when, then| {
            when.method(GET).path(format!("/v1/accounts/{sender}"));
            then.status(200)
                .json_body(json!({ "sequence_number": "7", "authentication_key": sender }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/transactions/encode_submission")
                .body_contains("\"sequence_number\":\"7\"");
            then.status(200).json_body(json!("0xb5e97db07fa0bd0e5598aa3643a9bc6f6693bddc1a9fec9e674a461eaa00b193"));
        })
        .await;
    sender
}

#[tokio::test]
async fn create_schema_commits() {
    let server = MockServer::start_async().await;
    submission(&server).await;
    let submit = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/transactions")
                .body_contains("ed25519_signature")
                .body_contains("::aas::create_schema");
            then.status(202).json_body(json!({ "hash": HASH }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(format!("/v1/transactions/by_hash/{HASH}"));
            then.status(200).json_body(json!({
                "type": "user_transaction",
                "hash": HASH,
                "success": true,
                "vm_status": "Executed successfully",
                "changes": [
                    { "type": "write_resource", "address": addr(0x51), "data": { "type": format!("{PKG}::schema::Schema") } }
                ]
            }));
        })
        .await;

    let receipt = aptos(&server)
        .with_signer(key())
        .create_schema(
            &NewSchema {
                schema: vec![1, 2, 3],
                name: "profile".into(),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();

    submit.assert_hits_async(1).await;
    assert_eq!(receipt.chain, Chain::Aptos);
    assert_eq!(receipt.digest, HASH);
    assert_eq!(receipt.created_of_type("::schema::Schema").unwrap().object_id, addr(0x51));
}

#[tokio::test]
async fn vm_failure_is_a_transaction_error() {
    let server = MockServer::start_async().await;
    submission(&server).await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/transactions");
            then.status(202).json_body(json!({ "hash": HASH }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(format!("/v1/transactions/by_hash/{HASH}"));
            then.status(200).json_body(json!({
                "type": "user_transaction",
                "success": false,
                "vm_status": "Move abort in aas: ENOT_REVOKABLE(0x5)"
            }));
        })
        .await;

    let err = aptos(&server)
        .with_signer(key())
        .revoke_attestation(&Revocation {
            attestation: addr(0xa1),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_matches!(err, SasError::Transaction(msg) if msg.contains("ENOT_REVOKABLE"));
}

#[tokio::test]
async fn pending_past_the_deadline_times_out() {
    let server = MockServer::start_async().await;
    submission(&server).await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/transactions");
            then.status(202).json_body(json!({ "hash": HASH }));
        })
        .await;
    let poll = server
        .mock_async(|when, then| {
            when.method(GET).path(format!("/v1/transactions/by_hash/{HASH}"));
            then.status(200).json_body(json!({ "type": "pending_transaction", "hash": HASH }));
        })
        .await;

    let err = aptos(&server)
        .with_signer(key())
        .revoke_attestation(&Revocation {
            attestation: addr(0xa1),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_matches!(err, SasError::Transaction(msg) if msg.contains("not finalized"));
    assert!(poll.hits_async().await >= 2);
}

#[tokio::test]
async fn create_schema_passes_the_resolver_address() {
    let server = MockServer::start_async().await;
    submission(&server).await;
    let resolver = addr(0xe0);
    let submit = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/transactions")
                .body_contains("::aas::create_schema")
                .body_contains(resolver.as_str());
            then.status(202).json_body(json!({ "hash": HASH }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(format!("/v1/transactions/by_hash/{HASH}"));
            then.status(200).json_body(json!({
                "type": "user_transaction",
                "hash": HASH,
                "success": true,
                "vm_status": "Executed successfully",
                "changes": []
            }));
        })
        .await;

    let client = aptos(&server).with_signer(key());
    let input = NewSchema {
        schema: vec![1],
        name: "gated".into(),
        ..Default::default()
    };
    client
        .create_schema(&input, Some(&Resolver::at_address(resolver.clone())))
        .await
        .unwrap();
    submit.assert_hits_async(1).await;

    assert_matches!(
        client.create_schema(&input, Some(&Resolver::rules(vec![1], vec![]))).await,
        Err(SasError::InvalidArgument(_))
    );
}
