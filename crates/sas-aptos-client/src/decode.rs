//! Decoding of Aptos view results into SAS records.
//!
//! Views return their values positionally:
//!
//! `schema_data(addr)` ->
//! `(creator, created_at, schema, name, description, uri, revokable, resolver, tx_hash)`
//!
//! `attestation_data(addr)` ->
//! `(attestor, recipient, schema, ref_attestation, time, expiration_time, revocation_time, revokable, data, tx_hash)`
//!
//! `vector<u8>` is `0x`-hex, `u64` a decimal string, `Option<T>` `{"vec": [..]}`.
//! Stored transaction hashes are re-encoded as base58, the same as on Sui.

use serde_json::Value;

use sas_core::address::{encode_tx_hash, normalize_address, optional_address};
use sas_core::model::{AttestationRecord, Resolver, SchemaRecord};
use sas_core::{SasError, SasResult};

struct Values<'a> {
    what: &'static str,
    values: &'a [Value],
}

impl<'a> Values<'a> {
    fn new(what: &'static str, values: &'a [Value], expected: usize) -> SasResult<Self> {
        if values.len() < expected {
            return Err(SasError::decode(format!(
                "{what}: expected {expected} return values, got {}",
                values.len()
            )));
        }
        Ok(Self { what, values })
    }

    fn at(&self, idx: usize) -> &'a Value {
        &self.values[idx]
    }

    fn err(&self, idx: usize, expected: &str) -> SasError {
        SasError::decode(format!(
            "{} value {idx}: expected {expected}, got {}",
            self.what,
            self.at(idx)
        ))
    }

    fn string(&self, idx: usize) -> SasResult<String> {
        self.at(idx)
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.err(idx, "string"))
    }

    fn u64(&self, idx: usize) -> SasResult<u64> {
        parse_u64(self.at(idx)).ok_or_else(|| self.err(idx, "u64"))
    }

    fn bool(&self, idx: usize) -> SasResult<bool> {
        self.at(idx).as_bool().ok_or_else(|| self.err(idx, "bool"))
    }

    fn address(&self, idx: usize) -> SasResult<String> {
        let s = self.string(idx)?;
        normalize_address(&s).map_err(|_| self.err(idx, "address"))
    }

    fn bytes(&self, idx: usize) -> SasResult<Vec<u8>> {
        let s = self.string(idx)?;
        hex::decode(s.trim_start_matches("0x")).map_err(|_| self.err(idx, "hex bytes"))
    }

    /// `{"vec": []}`, `{"vec": [x]}`, or a bare value.
    fn option(&self, idx: usize) -> Option<&'a Value> {
        let v = self.at(idx);
        match v.get("vec").and_then(Value::as_array) {
            Some(inner) => inner.first(),
            None if v.is_null() => None,
            None => Some(v),
        }
    }
}

fn parse_u64(v: &Value) -> Option<u64> {
    match v {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

/// The resolver slot holds a module address; zero or an empty option means none.
fn resolver(v: &Values<'_>, idx: usize) -> SasResult<Option<Resolver>> {
    match v.option(idx) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(optional_address(s)
            .map_err(|_| v.err(idx, "resolver address"))?
            .map(Resolver::at_address)),
        Some(_) => Err(v.err(idx, "resolver address")),
    }
}

pub fn decode_schema(address: &str, values: &[Value]) -> SasResult<SchemaRecord> {
    let v = Values::new("schema_data", values, 9)?;
    Ok(SchemaRecord {
        address: normalize_address(address)?,
        creator: v.address(0)?,
        created_at: v.u64(1)?,
        schema: v.bytes(2)?,
        name: v.string(3)?,
        description: v.string(4)?,
        url: v.string(5)?,
        revokable: v.bool(6)?,
        resolver: resolver(&v, 7)?,
        tx_hash: encode_tx_hash(&v.bytes(8)?),
    })
}

pub fn decode_attestation(address: &str, values: &[Value]) -> SasResult<AttestationRecord> {
    let v = Values::new("attestation_data", values, 10)?;

    let ref_attestation = match v.option(3).and_then(Value::as_str) {
        Some(s) => optional_address(s).map_err(|_| v.err(3, "address"))?,
        None => None,
    };
    let revocation_time = match v.option(6) {
        Some(t) => parse_u64(t).ok_or_else(|| v.err(6, "u64"))?,
        None => 0,
    };

    Ok(AttestationRecord {
        address: normalize_address(address)?,
        attestor: v.address(0)?,
        recipient: v.address(1)?,
        schema: v.address(2)?,
        ref_attestation,
        time: v.u64(4)?,
        expiration_time: v.u64(5)?,
        revocation_time: (revocation_time != 0).then_some(revocation_time),
        revokable: v.bool(7)?,
        data: v.bytes(8)?,
        tx_hash: encode_tx_hash(&v.bytes(9)?),
    })
}
