//! Registry read path.
//!
//! Registries are read in explicit steps:
//!
//! 1. fetch the registry object and its version pointer ([`get_registry`]),
//! 2. pick the version to read ([`resolve_version`]),
//! 3. dereference the versioned dynamic field to the records table
//!    ([`resolve_current_table`] / [`resolve_table_at`]),
//! 4. enumerate the table's keys page by page ([`list_keys_all`]),
//! 5. fetch and decode each record ([`get_record`] / [`list_records`]).
//!
//! Chain clients implement [`RegistrySource`]; the algorithm here is
//! chain-neutral and is what callers use.

use std::collections::HashSet;

use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::debug;

use crate::config::ClientConfig;
use crate::errors::{SasError, SasResult};
use crate::model::{Page, Registry, TableHandle};
use crate::version::{RegistryVersion, VersionWatermark};

/// Chain access needed by the read path, for records of type `R`.
#[async_trait]
pub trait RegistrySource<R>: Send + Sync {
    /// Fetch a registry object. `NotFound` if absent, `Decode` on shape mismatch.
    async fn fetch_registry(&self, registry_id: &str) -> SasResult<Registry>;

    /// Dereference the registry's dynamic field for `version`.
    /// Must fail with `StaleVersion` when no field exists for that version.
    async fn resolve_table(&self, registry: &Registry, version: RegistryVersion) -> SasResult<TableHandle>;

    /// One page of table keys, starting after `cursor`.
    async fn list_keys(&self, table: &TableHandle, cursor: Option<&str>, limit: usize) -> SasResult<Page<String>>;

    /// Whether `key` is present in `table`.
    async fn contains_key(&self, table: &TableHandle, key: &str) -> SasResult<bool>;

    /// Fetch and decode the record stored under `key`.
    async fn fetch_record(&self, key: &str) -> SasResult<R>;

    /// Highest registry version this source has handed out, if it tracks one.
    fn watermark(&self) -> Option<&VersionWatermark> {
        None
    }
}

impl From<&ClientConfig> for ListOptions {
    fn from(cfg: &ClientConfig) -> Self {
        Self {
            page_size: cfg.page_size,
            max_concurrency: cfg.max_concurrency,
        }
    }
}

/// Options for [`list_records`].
#[derive(Debug, Clone, Copy)]
pub struct ListOptions {
    pub page_size: usize,
    pub max_concurrency: usize,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            page_size: 50,
            max_concurrency: 16,
        }
    }
}

pub async fn get_registry<R, S>(source: &S, registry_id: &str) -> SasResult<Registry>
where
    S: RegistrySource<R> + ?Sized,
{
    let registry = source.fetch_registry(registry_id).await?;
    if let Some(mark) = source.watermark() {
        mark.observe(registry.version)?;
    }
    debug!(registry = %registry.id, version = %registry.version, "fetched registry");
    Ok(registry)
}

/// The version a reader should use: the one the registry currently points at.
pub fn resolve_version(registry: &Registry) -> RegistryVersion {
    registry.version
}

/// Resolve the table for the registry's current version.
pub async fn resolve_current_table<R, S>(source: &S, registry: &Registry) -> SasResult<TableHandle>
where
    S: RegistrySource<R> + ?Sized,
{
    resolve_table_at(source, registry, resolve_version(registry)).await
}

/// Resolve the table for an explicit (possibly historical) version.
pub async fn resolve_table_at<R, S>(
    source: &S,
    registry: &Registry,
    version: RegistryVersion,
) -> SasResult<TableHandle>
where
    S: RegistrySource<R> + ?Sized,
{
    if version > registry.version {
        return Err(SasError::stale_version(
            version.get(),
            format!("version {version} is newer than current {} of registry {}", registry.version, registry.id),
        ));
    }
    let table = source.resolve_table(registry, version).await?;
    debug!(registry = %registry.id, %version, table = %table.id, "resolved records table");
    Ok(table)
}

/// Fetch a single record by key. `NotFound` if the key is not in `table`.
pub async fn get_record<R, S>(source: &S, table: &TableHandle, key: &str) -> SasResult<R>
where
    S: RegistrySource<R> + ?Sized,
{
    if !source.contains_key(table, key).await? {
        return Err(SasError::not_found(format!("key {key} not in table {}", table.id)));
    }
    source.fetch_record(key).await
}

/// All keys of `table`, following continuation cursors until exhausted.
///
/// A key that shows up on more than one page (the table changed while we were
/// paging) is kept once, in the position it was first seen.
pub async fn list_keys_all<R, S>(source: &S, table: &TableHandle, page_size: usize) -> SasResult<Vec<String>>
where
    S: RegistrySource<R> + ?Sized,
{
    let mut keys = Vec::new();
    let mut seen = HashSet::new();
    let mut cursors = HashSet::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = source.list_keys(table, cursor.as_deref(), page_size).await?;
        pages += 1;

        for key in page.items {
            if seen.insert(key.clone()) {
                keys.push(key);
            }
        }

        if !page.has_next_page {
            break;
        }
        let next = page
            .next_cursor
            .ok_or_else(|| SasError::decode("page reports more entries but carries no cursor"))?;
        if !cursors.insert(next.clone()) {
            return Err(SasError::rpc(format!("pagination cursor {next} repeated")));
        }
        cursor = Some(next);
    }

    debug!(table = %table.id, pages, keys = keys.len(), "listed table keys");
    Ok(keys)
}

/// Every record currently in the registry.
///
/// Per-record fetches run concurrently (up to `max_concurrency`). The first
/// failure fails the whole call; no partial list is returned and the
/// remaining fetches are dropped.
pub async fn list_records<R, S>(source: &S, registry_id: &str, opts: &ListOptions) -> SasResult<Vec<R>>
where
    S: RegistrySource<R> + ?Sized,
    R: Send,
{
    if opts.page_size == 0 || opts.max_concurrency == 0 {
        return Err(SasError::configuration("page_size and max_concurrency must be non-zero"));
    }

    let registry = get_registry(source, registry_id).await?;
    let table = resolve_current_table(source, &registry).await?;
    let keys = list_keys_all(source, &table, opts.page_size).await?;

    stream::iter(keys)
        .map(|key| async move { source.fetch_record(&key).await })
        .buffer_unordered(opts.max_concurrency)
        .try_collect()
        .await
}
