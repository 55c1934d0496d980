use anyhow::Result;
use serde::Serialize;

use sas_core::model::{AttestationRecord, NewAttestation};
use sas_core::now_ms;
use sas_sdk::Revocation;

use crate::args::{AttestationCommand, Cli, CreateAttestationArgs, RevokeArgs};
use crate::context;
use crate::io::input::read_bytes_arg;
use crate::output;

#[derive(Debug, Serialize)]
pub struct ListOut {
    pub count: usize,
    pub attestations: Vec<AttestationRecord>,
}

#[derive(Debug, Serialize)]
pub struct GetOut {
    #[serde(flatten)]
    pub record: AttestationRecord,
    pub revoked: bool,
    pub expired: bool,
}

#[derive(Debug, Serialize)]
pub struct TxOut {
    pub digest: String,
    pub status: String,
    pub attestation: Option<String>,
}

pub async fn run(cli: &Cli, cmd: &AttestationCommand) -> Result<()> {
    match cmd {
        AttestationCommand::List => {
            let client = context::reader(cli)?;
            let pb = output::spinner("listing attestations")?;
            let attestations = client.list_attestations().await;
            pb.finish_and_clear();
            let attestations = attestations?;
            output::print(&ListOut {
                count: attestations.len(),
                attestations,
            })
        }
        AttestationCommand::Get { address } => {
            let client = context::reader(cli)?;
            let record = client.get_attestation(address).await?;
            let now = now_ms();
            output::print(&GetOut {
                revoked: record.is_revoked(),
                expired: record.is_expired(now),
                record,
            })
        }
        AttestationCommand::Create(args) => create(cli, args).await,
        AttestationCommand::Revoke(args) => revoke(cli, args).await,
    }
}

async fn create(cli: &Cli, args: &CreateAttestationArgs) -> Result<()> {
    let input = NewAttestation {
        schema: args.schema.clone(),
        recipient: args.recipient.clone(),
        ref_attestation: args.ref_attestation.clone(),
        expiration_time: args.expiration_time,
        revokable: args.revokable,
        data: read_bytes_arg(&args.data)?,
    };

    let client = context::writer(cli)?;
    let pb = output::spinner("creating attestation")?;
    let receipt = client.create_attestation(&input).await;
    pb.finish_and_clear();
    let receipt = receipt?;

    output::print(&TxOut {
        digest: receipt.digest.clone(),
        status: receipt.status.clone(),
        attestation: receipt
            .created_of_type("::attestation::Attestation")
            .map(|o| o.object_id.clone()),
    })
}

async fn revoke(cli: &Cli, args: &RevokeArgs) -> Result<()> {
    let revocation = Revocation {
        attestation: args.attestation.clone(),
        schema: args.schema.clone(),
        admin_cap: args.admin_cap.clone(),
    };

    let client = context::writer(cli)?;
    let pb = output::spinner("revoking attestation")?;
    let receipt = client.revoke_attestation(&revocation).await;
    pb.finish_and_clear();
    let receipt = receipt?;

    output::print(&TxOut {
        digest: receipt.digest,
        status: receipt.status,
        attestation: Some(args.attestation.clone()),
    })
}
