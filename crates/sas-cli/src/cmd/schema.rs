use anyhow::Result;
use serde::Serialize;

use sas_core::model::{NewSchema, Resolver, SchemaRecord, TxReceipt};

use crate::args::{Cli, CreateSchemaArgs, SchemaCommand};
use crate::context;
use crate::io::input::read_bytes_arg;
use crate::output;

#[derive(Debug, Serialize)]
pub struct ListOut {
    pub count: usize,
    pub schemas: Vec<SchemaRecord>,
}

#[derive(Debug, Serialize)]
pub struct CreateOut {
    pub digest: String,
    pub status: String,
    /// Address of the new schema, when the chain reports it.
    pub schema: Option<String>,
    pub admin_cap: Option<String>,
}

pub async fn run(cli: &Cli, cmd: &SchemaCommand) -> Result<()> {
    match cmd {
        SchemaCommand::List => {
            let client = context::reader(cli)?;
            let pb = output::spinner("listing schemas")?;
            let schemas = client.list_schemas().await;
            pb.finish_and_clear();
            let schemas = schemas?;
            output::print(&ListOut {
                count: schemas.len(),
                schemas,
            })
        }
        SchemaCommand::Get { address } => {
            let client = context::reader(cli)?;
            output::print(&client.get_schema(address).await?)
        }
        SchemaCommand::Create(args) => create(cli, args).await,
    }
}

async fn create(cli: &Cli, args: &CreateSchemaArgs) -> Result<()> {
    let input = NewSchema {
        schema: read_bytes_arg(&args.schema)?,
        name: args.name.clone(),
        description: args.description.clone(),
        url: args.url.clone(),
        revokable: args.revokable,
    };
    let resolver = match (&args.resolver_rules, &args.resolver_config, &args.resolver_address) {
        (Some(rules), Some(config), _) => Some(Resolver::rules(read_bytes_arg(rules)?, read_bytes_arg(config)?)),
        (_, _, Some(address)) => Some(Resolver::at_address(address.clone())),
        _ => None,
    };

    let client = context::writer(cli)?;
    let pb = output::spinner("creating schema")?;
    let receipt = client.create_schema(&input, resolver.as_ref()).await;
    pb.finish_and_clear();

    output::print(&create_out(&receipt?))
}

fn create_out(receipt: &TxReceipt) -> CreateOut {
    CreateOut {
        digest: receipt.digest.clone(),
        status: receipt.status.clone(),
        schema: receipt
            .created_of_type("::schema::Schema")
            .map(|o| o.object_id.clone()),
        admin_cap: receipt
            .created_of_type("::schema::AdminCap")
            .map(|o| o.object_id.clone()),
    }
}
