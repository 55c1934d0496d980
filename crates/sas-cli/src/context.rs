use std::sync::Arc;

use anyhow::{Context as _, Result};

use sas_core::config::{ClientConfig, DeploymentTable};
use sas_core::signer::{Ed25519KeyProvider, KeyProvider};
use sas_sdk::SasClient;

use crate::args::Cli;

/// Client configuration from global flags.
pub fn client_config(cli: &Cli) -> Result<ClientConfig> {
    let mut deployments = DeploymentTable::builtin();
    if let Some(path) = &cli.deployments {
        let overrides = DeploymentTable::from_json_file(path)
            .with_context(|| format!("loading deployments from {}", path.display()))?;
        deployments = deployments.merge(overrides);
    }
    Ok(ClientConfig {
        rpc_url: cli.rpc_url.clone(),
        timeout_ms: cli.timeout_ms,
        deployments,
        ..ClientConfig::default()
    })
}

/// The configured key, or an ephemeral one when none was given.
pub fn signer(cli: &Cli) -> Result<Arc<dyn KeyProvider>> {
    let key = match cli.private_key.as_deref() {
        Some(raw) => Ed25519KeyProvider::parse(raw).context("parsing SAS_PRIVATE_KEY")?,
        None => Ed25519KeyProvider::ephemeral(),
    };
    Ok(Arc::new(key))
}

pub fn reader(cli: &Cli) -> Result<SasClient> {
    let cfg = client_config(cli)?;
    Ok(sas_sdk::connect(cli.chain, cli.network, &cfg)?)
}

pub fn writer(cli: &Cli) -> Result<SasClient> {
    Ok(reader(cli)?.with_signer(signer(cli)?))
}
