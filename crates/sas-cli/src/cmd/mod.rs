use anyhow::Result;
use tracing::debug;

use crate::args::{Cli, Command};

mod attestation;
mod config;
mod keygen;
mod schema;

pub async fn dispatch(cli: Cli) -> Result<()> {
    debug!(chain = %cli.chain, network = %cli.network, command = ?cli.command, "dispatch");
    match &cli.command {
        Command::Config => config::run(&cli).await,
        Command::Keygen => keygen::run().await,
        Command::Schema(cmd) => schema::run(&cli, cmd).await,
        Command::Attestation(cmd) => attestation::run(&cli, cmd).await,
    }
}
