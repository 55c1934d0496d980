//! Registry version helpers.
//!
//! Registries on both chains sit behind a version pointer that only moves
//! forward. Old versions stay readable, so the pointer is parsed strictly and
//! any regression is reported as [`SasError::StaleVersion`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{SasError, SasResult};

/// Version number stored in a registry's `Versioned` wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistryVersion(pub u64);

impl RegistryVersion {
    /// Parse a version from RPC JSON. Move `u64` values arrive as decimal
    /// strings, but plain numbers are accepted too.
    pub fn from_json(v: &Value) -> SasResult<Self> {
        match v {
            Value::String(s) => s
                .parse::<u64>()
                .map(Self)
                .map_err(|_| SasError::decode(format!("registry version is not a u64: {s}"))),
            Value::Number(n) => n
                .as_u64()
                .map(Self)
                .ok_or_else(|| SasError::decode(format!("registry version is not a u64: {n}"))),
            other => Err(SasError::decode(format!(
                "registry version has unexpected shape: {other}"
            ))),
        }
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// Fail if `self` is older than a version the caller has already observed.
    pub fn ensure_not_older(self, seen: RegistryVersion) -> SasResult<()> {
        if self < seen {
            Err(SasError::stale_version(
                self.0,
                format!("registry version went backwards (previously saw {seen})"),
            ))
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for RegistryVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Highest registry version a reader has observed. Clones share the mark.
#[derive(Debug, Clone, Default)]
pub struct VersionWatermark(Arc<AtomicU64>);

impl VersionWatermark {
    pub fn seen(&self) -> RegistryVersion {
        RegistryVersion(self.0.load(Ordering::Acquire))
    }

    /// Record `version`, failing with `StaleVersion` if it is older than one
    /// observed before.
    pub fn observe(&self, version: RegistryVersion) -> SasResult<()> {
        version.ensure_not_older(self.seen())?;
        self.0.fetch_max(version.0, Ordering::AcqRel);
        Ok(())
    }
}
