use anyhow::Result;
use serde::Serialize;

use sas_core::config::{validate_config, Chain, Deployment, Network};

use crate::args::Cli;
use crate::context;
use crate::output;

#[derive(Debug, Serialize)]
pub struct ConfigOut {
    pub chain: Chain,
    pub network: Network,
    pub endpoint: String,
    pub deployment: Option<Deployment>,
    /// The deployment ids are built-in placeholders.
    pub placeholder: bool,
    pub known: Vec<String>,
    pub timeout_ms: u64,
}

pub async fn run(cli: &Cli) -> Result<()> {
    let cfg = context::client_config(cli)?;
    validate_config(&cfg)?;

    let deployment = match cfg.deployments.get(cli.chain, cli.network) {
        Ok(d) => Some(d.clone()),
        Err(e) => {
            output::eprintln_line(&format!("warning: {e}"));
            None
        }
    };

    let placeholder = deployment.as_ref().map_or(false, Deployment::is_placeholder);

    output::print(&ConfigOut {
        chain: cli.chain,
        network: cli.network,
        endpoint: cfg.endpoint(cli.chain, cli.network)?.to_string(),
        deployment,
        placeholder,
        known: cfg
            .deployments
            .pairs()
            .map(|(c, n)| format!("{c}/{n}"))
            .collect(),
        timeout_ms: cfg.timeout_ms,
    })?;
    Ok(())
}
