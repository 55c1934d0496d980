//! Decoding of Sui object JSON into SAS records.
//!
//! Sui renders Move values as JSON: `u64` as decimal strings, `vector<u8>` as
//! arrays of numbers, `address` as hex strings, `UID` as `{"id": "0x.."}`,
//! nested structs as `{"type": .., "fields": {..}}` and `Option<T>` as `null`
//! or the inner value. Anything else is a decode error.

use serde_json::{Map, Value};

use sas_core::address::{encode_tx_hash, normalize_address, optional_address};
use sas_core::model::{AttestationRecord, Registry, Resolver, SchemaRecord, TableHandle};
use sas_core::version::RegistryVersion;
use sas_core::{SasError, SasResult};

use crate::constants::{TYPE_ATTESTATION, TYPE_SCHEMA};
use crate::rpc::{parse_u64, SuiObjectData};

type Fields = Map<String, Value>;

/// Top-level `fields` of a Move object.
pub fn object_fields(data: &SuiObjectData) -> SasResult<&Fields> {
    let content = data
        .content
        .as_ref()
        .ok_or_else(|| SasError::decode(format!("object {} has no content", data.object_id)))?;
    if content.get("dataType").and_then(Value::as_str) != Some("moveObject") {
        return Err(SasError::decode(format!("object {} is not a Move object", data.object_id)));
    }
    content
        .get("fields")
        .and_then(Value::as_object)
        .ok_or_else(|| SasError::decode(format!("object {} has no fields", data.object_id)))
}

fn require_type(data: &SuiObjectData, suffix: &str) -> SasResult<()> {
    let ty = data
        .object_type
        .as_deref()
        .or_else(|| data.content.as_ref().and_then(|c| c.get("type")).and_then(Value::as_str))
        .unwrap_or_default();
    if ty.ends_with(suffix) {
        Ok(())
    } else {
        Err(SasError::decode(format!(
            "object {} has type {ty:?}, expected *{suffix}",
            data.object_id
        )))
    }
}

fn field<'a>(fields: &'a Fields, name: &str) -> SasResult<&'a Value> {
    fields
        .get(name)
        .ok_or_else(|| SasError::decode(format!("missing field `{name}`")))
}

/// Fields of a nested struct value: `{"type": .., "fields": {..}}`, or the
/// plain map when the RPC flattened it.
fn struct_fields<'a>(v: &'a Value, name: &str) -> SasResult<&'a Fields> {
    let obj = v
        .as_object()
        .ok_or_else(|| SasError::decode(format!("field `{name}` is not a struct")))?;
    match obj.get("fields").and_then(Value::as_object) {
        Some(inner) => Ok(inner),
        None => Ok(obj),
    }
}

fn nested<'a>(fields: &'a Fields, name: &str) -> SasResult<&'a Fields> {
    struct_fields(field(fields, name)?, name)
}

fn string(fields: &Fields, name: &str) -> SasResult<String> {
    field(fields, name)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| SasError::decode(format!("field `{name}` is not a string")))
}

fn u64_field(fields: &Fields, name: &str) -> SasResult<u64> {
    let v = field(fields, name)?;
    parse_u64(v).ok_or_else(|| SasError::decode(format!("field `{name}` is not a u64: {v}")))
}

fn bool_field(fields: &Fields, name: &str) -> SasResult<bool> {
    field(fields, name)?
        .as_bool()
        .ok_or_else(|| SasError::decode(format!("field `{name}` is not a bool")))
}

fn address(fields: &Fields, name: &str) -> SasResult<String> {
    normalize_address(&string(fields, name)?)
        .map_err(|e| SasError::decode(format!("field `{name}`: {e}")))
}

fn bytes_value(v: &Value, name: &str) -> SasResult<Vec<u8>> {
    let arr = v
        .as_array()
        .ok_or_else(|| SasError::decode(format!("field `{name}` is not a byte vector")))?;
    arr.iter()
        .map(|b| {
            b.as_u64()
                .and_then(|n| u8::try_from(n).ok())
                .ok_or_else(|| SasError::decode(format!("field `{name}` has a non-byte element: {b}")))
        })
        .collect()
}

fn bytes(fields: &Fields, name: &str) -> SasResult<Vec<u8>> {
    bytes_value(field(fields, name)?, name)
}

/// `UID` fields render as `{"id": "0x.."}`.
fn uid(fields: &Fields, name: &str) -> SasResult<String> {
    let v = field(fields, name)?;
    let id = v
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| SasError::decode(format!("field `{name}` is not a UID")))?;
    normalize_address(id).map_err(|e| SasError::decode(format!("field `{name}`: {e}")))
}

/// Absent fields and `null` both mean `None`.
fn optional<'a>(fields: &'a Fields, name: &str) -> Option<&'a Value> {
    fields.get(name).filter(|v| !v.is_null())
}

/// A registry object: `{ id: UID, inner: Versioned { id: UID, version: u64 } }`.
pub fn decode_registry(data: &SuiObjectData) -> SasResult<Registry> {
    let fields = object_fields(data)?;
    let inner = nested(fields, "inner")?;
    Ok(Registry {
        id: uid(fields, "id")?,
        versioned_id: uid(inner, "id")?,
        version: RegistryVersion::from_json(field(inner, "version")?)?,
    })
}

/// The versioned dynamic field `Field<u64, Inner>`; the table lives in
/// `value.<table_field>`.
pub fn decode_table(data: &SuiObjectData, table_field: &str, version: RegistryVersion) -> SasResult<TableHandle> {
    let fields = object_fields(data)?;
    let inner = nested(fields, "value")?;
    let table = nested(inner, table_field)?;
    Ok(TableHandle {
        id: uid(table, "id")?,
        version,
    })
}

fn decode_resolver(fields: &Fields) -> SasResult<Option<Resolver>> {
    let Some(v) = optional(fields, "resolver") else {
        return Ok(None);
    };
    let r = struct_fields(v, "resolver")?;
    Ok(Some(Resolver::rules(bytes(r, "rules")?, bytes(r, "config")?)))
}

fn tx_hash(fields: &Fields) -> SasResult<Option<String>> {
    match optional(fields, "tx_hash") {
        Some(v) => Ok(encode_tx_hash(&bytes_value(v, "tx_hash")?)),
        None => Ok(None),
    }
}

pub fn decode_schema(data: &SuiObjectData) -> SasResult<SchemaRecord> {
    require_type(data, TYPE_SCHEMA)?;
    let f = object_fields(data)?;
    Ok(SchemaRecord {
        address: normalize_address(&data.object_id)?,
        name: string(f, "name")?,
        description: string(f, "description")?,
        url: string(f, "url")?,
        creator: address(f, "creator")?,
        created_at: u64_field(f, "created_at")?,
        schema: bytes(f, "schema")?,
        revokable: bool_field(f, "revokable")?,
        resolver: decode_resolver(f)?,
        tx_hash: tx_hash(f)?,
    })
}

pub fn decode_attestation(data: &SuiObjectData) -> SasResult<AttestationRecord> {
    require_type(data, TYPE_ATTESTATION)?;
    let f = object_fields(data)?;

    let ref_attestation = optional_address(&string(f, "ref_attestation")?)
        .map_err(|e| SasError::decode(format!("field `ref_attestation`: {e}")))?;
    let revocation_time = match u64_field(f, "revocation_time")? {
        0 => None,
        t => Some(t),
    };

    Ok(AttestationRecord {
        address: normalize_address(&data.object_id)?,
        attestor: address(f, "attestor")?,
        recipient: address(f, "recipient")?,
        schema: address(f, "schema")?,
        ref_attestation,
        time: u64_field(f, "time")?,
        expiration_time: u64_field(f, "expiration_time")?,
        revocation_time,
        revokable: bool_field(f, "revokable")?,
        data: bytes(f, "data")?,
        tx_hash: tx_hash(f)?,
    })
}
