//! sui_read_flow.rs
//!
//! Drives the Sui read path against a mocked JSON-RPC fullnode: registry
//! resolution, paginated key listing, concurrent record fetches, and the
//! error mapping for missing or malformed objects.

mod common;

use assert_matches::assert_matches;
use httpmock::prelude::*;
use serde_json::json;

use common::*;
use sas_core::config::{Chain, Network};
use sas_core::model::{Resolver, SchemaRecord};
use sas_core::registry;
use sas_core::SasError;
use sas_sdk::{SasClient, SuiClient};

fn sui(server: &MockServer) -> SasClient {
    sas_sdk::connect(Chain::Sui, Network::Localnet, &config(&server.base_url(), Chain::Sui)).unwrap()
}

fn reader(client: &SasClient) -> &SuiClient {
    match client {
        SasClient::Sui(c) => c,
        SasClient::Aptos(_) => unreachable!("sui client expected"),
    }
}

#[tokio::test]
async fn lists_schemas_across_pages_without_duplicates() {
    let server = MockServer::start_async().await;
    let (a, b, c) = (addr(0x51), addr(0x52), addr(0x53));
    registry_with_keys(&server, SCHEMA_REGISTRY, "schema_records", &[a.clone(), b.clone(), b.clone(), c.clone()]).await;
    for id in [&a, &b, &c] {
        rpc(&server, "sui_getObject", &[id.as_str()], schema_object(id, b"name:string", json!(null))).await;
    }

    let mut schemas = sui(&server).list_schemas().await.unwrap();
    schemas.sort_by(|x, y| x.address.cmp(&y.address));
    let addresses: Vec<_> = schemas.iter().map(|s| s.address.clone()).collect();
    assert_eq!(addresses, vec![a, b, c]);
    assert!(schemas.iter().all(|s| s.schema == b"name:string"));
}

#[tokio::test]
async fn empty_registry_lists_nothing() {
    let server = MockServer::start_async().await;
    registry_with_keys(&server, SCHEMA_REGISTRY, "schema_records", &[]).await;

    assert!(sui(&server).list_schemas().await.unwrap().is_empty());
}

#[tokio::test]
async fn one_bad_record_fails_the_whole_listing() {
    let server = MockServer::start_async().await;
    let (a, b) = (addr(0x51), addr(0x52));
    registry_with_keys(&server, SCHEMA_REGISTRY, "schema_records", &[a.clone(), b.clone()]).await;
    rpc(&server, "sui_getObject", &[a.as_str()], schema_object(&a, b"ok", json!(null))).await;
    rpc(&server, "sui_getObject", &[b.as_str()], attestation_object(&b, &a, "0")).await;

    assert_matches!(sui(&server).list_schemas().await, Err(SasError::Decode(_)));
}

#[tokio::test]
async fn missing_versioned_field_is_stale() {
    let server = MockServer::start_async().await;
    rpc(&server, "sui_getObject", &[SCHEMA_REGISTRY], registry_object(SCHEMA_REGISTRY, 4)).await;
    rpc(
        &server,
        "suix_getDynamicFieldObject",
        &[VERSIONED],
        json!({ "error": { "code": "dynamicFieldNotFound", "parent_object_id": VERSIONED } }),
    )
    .await;

    assert_matches!(
        sui(&server).list_schemas().await,
        Err(SasError::StaleVersion { version: 4, .. })
    );
}

#[tokio::test]
async fn schema_with_resolver_reads_back_exactly() {
    let server = MockServer::start_async().await;
    let id = addr(0x51);
    let bytes = vec![0u8, 1, 2, 254, 255];
    rpc(
        &server,
        "sui_getObject",
        &[id.as_str()],
        schema_object(&id, &bytes, json!({ "type": "x::schema::Resolver", "fields": { "rules": [1], "config": [2, 3] } })),
    )
    .await;

    let s: SchemaRecord = sui(&server).get_schema(&id).await.unwrap();
    assert_eq!(s.schema, bytes);
    assert_eq!(s.resolver, Some(Resolver::rules(vec![1], vec![2, 3])));
    assert!(s.tx_hash.is_some());
}

#[tokio::test]
async fn unknown_schema_is_not_found() {
    let server = MockServer::start_async().await;
    let id = addr(0x99);
    rpc(&server, "sui_getObject", &[id.as_str()], missing(&id)).await;

    assert_matches!(sui(&server).get_schema(&id).await, Err(SasError::NotFound(_)));
}

#[tokio::test]
async fn attestation_revocation_and_dangling_schema() {
    let server = MockServer::start_async().await;
    let schema = addr(0x51);
    let live = addr(0xa1);
    let revoked = addr(0xa2);
    let orphan = addr(0xa3);
    let gone = addr(0x5f);
    rpc(&server, "sui_getObject", &[schema.as_str()], schema_object(&schema, b"s", json!(null))).await;
    rpc(&server, "sui_getObject", &[gone.as_str()], missing(&gone)).await;
    rpc(&server, "sui_getObject", &[live.as_str()], attestation_object(&live, &schema, "0")).await;
    rpc(&server, "sui_getObject", &[revoked.as_str()], attestation_object(&revoked, &schema, "1700000000900")).await;
    rpc(&server, "sui_getObject", &[orphan.as_str()], attestation_object(&orphan, &gone, "0")).await;

    let client = sui(&server);
    let a = client.get_attestation(&live).await.unwrap();
    assert_eq!(a.revocation_time, None);
    assert_eq!(a.ref_attestation, None);
    assert_eq!(a.data, vec![1, 2, 3]);

    let r = client.get_attestation(&revoked).await.unwrap();
    assert_eq!(r.revocation_time, Some(1_700_000_000_900));

    assert_matches!(client.get_attestation(&orphan).await, Err(SasError::NotFound(_)));
}

#[tokio::test]
async fn lists_attestations() {
    let server = MockServer::start_async().await;
    let schema = addr(0x51);
    let att = addr(0xa1);
    registry_with_keys(&server, ATTESTATION_REGISTRY, "attestation_records", &[att.clone()]).await;
    rpc(&server, "sui_getObject", &[schema.as_str()], schema_object(&schema, b"s", json!(null))).await;
    rpc(&server, "sui_getObject", &[att.as_str()], attestation_object(&att, &schema, "0")).await;

    let all = sui(&server).list_attestations().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].schema, schema);
}

#[tokio::test]
async fn get_record_checks_table_membership() {
    let server = MockServer::start_async().await;
    let present = addr(0x51);
    let absent = addr(0x52);
    rpc(&server, "sui_getObject", &[SCHEMA_REGISTRY], registry_object(SCHEMA_REGISTRY, 1)).await;
    rpc(&server, "suix_getDynamicFieldObject", &[VERSIONED], versioned_field("schema_records")).await;
    rpc(
        &server,
        "suix_getDynamicFieldObject",
        &[TABLE, present.as_str()],
        object(&present, "0x2::dynamic_field::Field<address, bool>", json!({ "name": present, "value": true })),
    )
    .await;
    rpc(
        &server,
        "suix_getDynamicFieldObject",
        &[TABLE, absent.as_str()],
        json!({ "error": { "code": "dynamicFieldNotFound" } }),
    )
    .await;
    rpc(&server, "sui_getObject", &[present.as_str()], schema_object(&present, b"s", json!(null))).await;

    let client = sui(&server);
    let source = &reader(&client).reader;
    let reg = registry::get_registry::<SchemaRecord, _>(source, SCHEMA_REGISTRY).await.unwrap();
    let table = registry::resolve_current_table::<SchemaRecord, _>(source, &reg).await.unwrap();
    assert_eq!(table.id, TABLE);

    let s: SchemaRecord = registry::get_record(source, &table, &present).await.unwrap();
    assert_eq!(s.address, present);
    assert_matches!(
        registry::get_record::<SchemaRecord, _>(source, &table, &absent).await,
        Err(SasError::NotFound(_))
    );
}

#[tokio::test]
async fn registry_version_regression_is_stale() {
    let server = MockServer::start_async().await;
    let client = sui(&server);
    let source = &reader(&client).reader;

    let mut current = rpc(&server, "sui_getObject", &[SCHEMA_REGISTRY], registry_object(SCHEMA_REGISTRY, 3)).await;
    let reg = registry::get_registry::<SchemaRecord, _>(source, SCHEMA_REGISTRY).await.unwrap();
    assert_eq!(reg.version.get(), 3);

    current.delete_async().await;
    rpc(&server, "sui_getObject", &[SCHEMA_REGISTRY], registry_object(SCHEMA_REGISTRY, 2)).await;
    assert_matches!(
        registry::get_registry::<SchemaRecord, _>(source, SCHEMA_REGISTRY).await,
        Err(SasError::StaleVersion { version: 2, .. })
    );
    assert_matches!(client.list_schemas().await, Err(SasError::StaleVersion { version: 2, .. }));
}
