use anyhow::Result;
use serde::Serialize;

use sas_core::signer::{Ed25519KeyProvider, KeyProvider};

use crate::output;

#[derive(Debug, Serialize)]
pub struct KeygenOut {
    pub private_key: String,
    pub public_key: String,
    pub sui_address: String,
    pub aptos_address: String,
}

pub async fn run() -> Result<()> {
    let key = Ed25519KeyProvider::generate();
    let pk = key.public_key();
    output::print(&KeygenOut {
        private_key: key.secret_hex(),
        public_key: format!("0x{}", hex::encode(pk.as_bytes())),
        sui_address: sas_sdk::sui_address(&pk),
        aptos_address: sas_sdk::aptos_address(&pk),
    })?;
    output::eprintln_line("export SAS_PRIVATE_KEY=<private_key> to sign with this key");
    Ok(())
}
