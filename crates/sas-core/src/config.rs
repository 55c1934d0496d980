//! Deployment and client configuration.
//!
//! Two kinds of configuration live here:
//! - the *deployment table*: which package and registry objects are deployed on
//!   each (chain, network) pair. Resolution is a pure lookup with no I/O.
//! - the *client config*: transport and transaction knobs (timeouts, page sizes,
//!   gas limits).
//!
//! Like the rest of this crate, nothing here reads environment variables.
//! Callers build configuration explicitly (the CLI does it from flags).

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::address::normalize_address;
use crate::errors::{SasError, SasResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Sui,
    Aptos,
}

impl Chain {
    pub fn parse(s: &str) -> SasResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sui" => Ok(Self::Sui),
            "aptos" => Ok(Self::Aptos),
            other => Err(SasError::configuration(format!("unknown chain: {other}"))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sui => "sui",
            Self::Aptos => "aptos",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
    Devnet,
    Localnet,
}

impl Network {
    pub fn parse(s: &str) -> SasResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            "devnet" => Ok(Self::Devnet),
            "localnet" | "local" => Ok(Self::Localnet),
            other => Err(SasError::configuration(format!("unknown network: {other}"))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Devnet => "devnet",
            Self::Localnet => "localnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifiers of one SAS deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    /// Package (Sui) or module account (Aptos) address.
    pub package: String,
    pub schema_registry: String,
    pub attestation_registry: String,
}

impl Deployment {
    /// True for the built-in stand-ins that do not name a real deployment.
    pub fn is_placeholder(&self) -> bool {
        [&self.package, &self.schema_registry, &self.attestation_registry]
            .iter()
            .any(|id| id.starts_with(PLACEHOLDER_PREFIX))
    }

    fn normalized(self) -> SasResult<Self> {
        Ok(Self {
            package: normalize_address(&self.package)?,
            schema_registry: normalize_address(&self.schema_registry)?,
            attestation_registry: normalize_address(&self.attestation_registry)?,
        })
    }
}

/// Known deployments keyed by (chain, network).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentTable {
    entries: BTreeMap<(Chain, Network), Deployment>,
}

/// Prefix of the built-in placeholder ids. Each built-in id is this prefix
/// followed by a chain/network/role code; real ids come from
/// [`DeploymentTable::from_json_file`] (CLI `--deployments`).
pub const PLACEHOLDER_PREFIX: &str = "0x00000000000000000000000000000000000000000000000000000000005a5";

const BUILTIN: &[(Chain, Network, &str, &str, &str)] = &[
    (
        Chain::Sui,
        Network::Mainnet,
        "0x00000000000000000000000000000000000000000000000000000000005a5111",
        "0x00000000000000000000000000000000000000000000000000000000005a5112",
        "0x00000000000000000000000000000000000000000000000000000000005a5113",
    ),
    (
        Chain::Sui,
        Network::Testnet,
        "0x00000000000000000000000000000000000000000000000000000000005a5121",
        "0x00000000000000000000000000000000000000000000000000000000005a5122",
        "0x00000000000000000000000000000000000000000000000000000000005a5123",
    ),
    (
        Chain::Aptos,
        Network::Mainnet,
        "0x00000000000000000000000000000000000000000000000000000000005a5211",
        "0x00000000000000000000000000000000000000000000000000000000005a5211",
        "0x00000000000000000000000000000000000000000000000000000000005a5211",
    ),
    (
        Chain::Aptos,
        Network::Testnet,
        "0x00000000000000000000000000000000000000000000000000000000005a5221",
        "0x00000000000000000000000000000000000000000000000000000000005a5221",
        "0x00000000000000000000000000000000000000000000000000000000005a5221",
    ),
];

impl DeploymentTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The static deployment set shipped with the crate.
    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|(chain, network, package, schemas, attestations)| {
                (
                    (*chain, *network),
                    Deployment {
                        package: (*package).to_string(),
                        schema_registry: (*schemas).to_string(),
                        attestation_registry: (*attestations).to_string(),
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// Parse a table from JSON of the form
    /// `{"sui": {"testnet": {"package": "0x..", "schema_registry": "0x..", "attestation_registry": "0x.."}}}`.
    pub fn from_json_str(raw: &str) -> SasResult<Self> {
        let parsed: BTreeMap<String, BTreeMap<String, Deployment>> = serde_json::from_str(raw)
            .map_err(|e| SasError::configuration(format!("invalid deployments json: {e}")))?;

        let mut table = Self::empty();
        for (chain, networks) in parsed {
            let chain = Chain::parse(&chain)?;
            for (network, deployment) in networks {
                let network = Network::parse(&network)?;
                table.insert(chain, network, deployment)?;
            }
        }
        Ok(table)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> SasResult<Self> {
        let raw = fs::read_to_string(path.as_ref()).map_err(|e| {
            SasError::configuration(format!("read {}: {e}", path.as_ref().display()))
        })?;
        Self::from_json_str(&raw)
    }

    pub fn insert(&mut self, chain: Chain, network: Network, deployment: Deployment) -> SasResult<()> {
        self.entries.insert((chain, network), deployment.normalized()?);
        Ok(())
    }

    /// Overlay `other` onto `self`; entries in `other` win.
    pub fn merge(mut self, other: DeploymentTable) -> Self {
        self.entries.extend(other.entries);
        self
    }

    pub fn get(&self, chain: Chain, network: Network) -> SasResult<&Deployment> {
        self.entries.get(&(chain, network)).ok_or_else(|| {
            SasError::configuration(format!("no deployment known for {chain}/{network}"))
        })
    }

    /// Known pairs in deterministic order.
    pub fn pairs(&self) -> impl Iterator<Item = (Chain, Network)> + '_ {
        self.entries.keys().copied()
    }
}

/// Resolve the built-in deployment for a (chain, network) pair.
pub fn resolve_deployment(chain: Chain, network: Network) -> SasResult<Deployment> {
    DeploymentTable::builtin().get(chain, network).cloned()
}

pub fn get_package_address(chain: Chain, network: Network) -> SasResult<String> {
    Ok(resolve_deployment(chain, network)?.package)
}

pub fn get_schema_registry_id(chain: Chain, network: Network) -> SasResult<String> {
    Ok(resolve_deployment(chain, network)?.schema_registry)
}

pub fn get_attestation_registry_id(chain: Chain, network: Network) -> SasResult<String> {
    Ok(resolve_deployment(chain, network)?.attestation_registry)
}

/// Public fullnode endpoint for a (chain, network) pair.
pub fn default_rpc_url(chain: Chain, network: Network) -> &'static str {
    match (chain, network) {
        (Chain::Sui, Network::Mainnet) => "https://fullnode.mainnet.sui.io:443",
        (Chain::Sui, Network::Testnet) => "https://fullnode.testnet.sui.io:443",
        (Chain::Sui, Network::Devnet) => "https://fullnode.devnet.sui.io:443",
        (Chain::Sui, Network::Localnet) => "http://127.0.0.1:9000",
        (Chain::Aptos, Network::Mainnet) => "https://fullnode.mainnet.aptoslabs.com/v1",
        (Chain::Aptos, Network::Testnet) => "https://fullnode.testnet.aptoslabs.com/v1",
        (Chain::Aptos, Network::Devnet) => "https://fullnode.devnet.aptoslabs.com/v1",
        (Chain::Aptos, Network::Localnet) => "http://127.0.0.1:8080/v1",
    }
}

/// Transport and transaction settings for one client handle.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Overrides [`default_rpc_url`].
    pub rpc_url: Option<Url>,
    /// Per-request HTTP timeout.
    pub timeout_ms: u64,
    /// Page size for dynamic-field listing.
    pub page_size: usize,
    /// Upper bound on concurrent per-record fetches in `list_records`.
    pub max_concurrency: usize,
    /// Sui gas budget in MIST.
    pub gas_budget: u64,
    /// Aptos max gas units.
    pub max_gas_amount: u64,
    /// Aptos gas unit price in octas.
    pub gas_unit_price: u64,
    /// How long to wait for a submitted transaction to finalize.
    pub finality_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub deployments: DeploymentTable,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            timeout_ms: 30_000,
            page_size: 50,
            max_concurrency: 16,
            gas_budget: 50_000_000,
            max_gas_amount: 200_000,
            gas_unit_price: 100,
            finality_timeout_ms: 60_000,
            poll_interval_ms: 500,
            deployments: DeploymentTable::builtin(),
        }
    }
}

impl ClientConfig {
    /// The RPC endpoint to use for `chain`/`network`.
    pub fn endpoint(&self, chain: Chain, network: Network) -> SasResult<Url> {
        match &self.rpc_url {
            Some(u) => Ok(u.clone()),
            None => Url::parse(default_rpc_url(chain, network))
                .map_err(|e| SasError::configuration(format!("default rpc url: {e}"))),
        }
    }
}

/// Validate a full configuration object.
pub fn validate_config(cfg: &ClientConfig) -> SasResult<()> {
    if cfg.timeout_ms == 0 {
        return Err(SasError::configuration("timeout_ms must be greater than zero"));
    }
    if cfg.page_size == 0 {
        return Err(SasError::configuration("page_size must be greater than zero"));
    }
    if cfg.max_concurrency == 0 {
        return Err(SasError::configuration("max_concurrency must be greater than zero"));
    }
    if cfg.poll_interval_ms == 0 || cfg.poll_interval_ms > cfg.finality_timeout_ms {
        return Err(SasError::configuration(
            "poll_interval_ms must be non-zero and not exceed finality_timeout_ms",
        ));
    }
    if cfg.gas_budget == 0 || cfg.max_gas_amount == 0 {
        return Err(SasError::configuration("gas limits must be greater than zero"));
    }
    Ok(())
}
