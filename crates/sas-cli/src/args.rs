use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use url::Url;

use sas_core::config::{Chain, Network};

#[derive(Parser, Debug, Clone)]
#[command(name = "sas", version, about = "SAS CLI: schemas and attestations on Sui and Aptos")]
pub struct Cli {
    /// Emit JSON output on stdout and JSON log lines on stderr.
    #[arg(long, global = true)]
    pub json: bool,

    /// Target chain: sui|aptos
    #[arg(long, global = true, default_value = "sui", value_parser = parse_chain)]
    pub chain: Chain,

    /// Target network: mainnet|testnet|devnet|localnet
    #[arg(long, global = true, default_value = "testnet", value_parser = parse_network)]
    pub network: Network,

    /// Override the public fullnode endpoint.
    #[arg(long, global = true)]
    pub rpc_url: Option<Url>,

    /// Per-request HTTP timeout in milliseconds.
    #[arg(long, global = true, default_value_t = 30_000)]
    pub timeout_ms: u64,

    /// JSON file with deployment overrides, merged over the built-in table.
    #[arg(long, global = true)]
    pub deployments: Option<PathBuf>,

    /// Signing key (hex or base64). Without it, writes use an ephemeral key.
    #[arg(long, global = true, env = "SAS_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show the resolved endpoint and deployment ids.
    Config,

    /// Generate a new ed25519 key and print it with its addresses.
    Keygen,

    /// Schema registry operations.
    #[command(subcommand)]
    Schema(SchemaCommand),

    /// Attestation registry operations.
    #[command(subcommand)]
    Attestation(AttestationCommand),
}

#[derive(Subcommand, Debug, Clone)]
pub enum SchemaCommand {
    /// List every schema in the registry (Sui only).
    List,

    /// Fetch one schema by address.
    Get { address: String },

    /// Register a new schema.
    Create(CreateSchemaArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CreateSchemaArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long, default_value = "")]
    pub description: String,

    #[arg(long, default_value = "")]
    pub url: String,

    /// Schema definition: `0x<hex>`, `@<file>`, or literal text.
    #[arg(long)]
    pub schema: String,

    #[arg(long)]
    pub revokable: bool,

    /// Resolver rules (same encodings as --schema). Sui only.
    #[arg(long, requires = "resolver_config")]
    pub resolver_rules: Option<String>,

    /// Resolver config (same encodings as --schema). Sui only.
    #[arg(long, requires = "resolver_rules")]
    pub resolver_config: Option<String>,

    /// Resolver module address. Aptos only.
    #[arg(long, conflicts_with_all = ["resolver_rules", "resolver_config"])]
    pub resolver_address: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum AttestationCommand {
    /// List every attestation in the registry (Sui only).
    List,

    /// Fetch one attestation by address.
    Get { address: String },

    /// Issue an attestation under a schema.
    Create(CreateAttestationArgs),

    /// Revoke an attestation.
    Revoke(RevokeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CreateAttestationArgs {
    #[arg(long)]
    pub schema: String,

    #[arg(long)]
    pub recipient: String,

    #[arg(long)]
    pub ref_attestation: Option<String>,

    /// Expiry in ms since the epoch; 0 never expires.
    #[arg(long, default_value_t = 0)]
    pub expiration_time: u64,

    #[arg(long)]
    pub revokable: bool,

    /// Payload: `0x<hex>`, `@<file>`, or literal text.
    #[arg(long, default_value = "")]
    pub data: String,
}

#[derive(Args, Debug, Clone)]
pub struct RevokeArgs {
    pub attestation: String,

    /// Schema of the attestation; looked up when omitted.
    #[arg(long)]
    pub schema: Option<String>,

    /// Admin cap of the schema (required on Sui).
    #[arg(long)]
    pub admin_cap: Option<String>,
}

fn parse_chain(s: &str) -> Result<Chain, String> {
    Chain::parse(s).map_err(|e| e.to_string())
}

fn parse_network(s: &str) -> Result<Network, String> {
    Network::parse(s).map_err(|e| e.to_string())
}
