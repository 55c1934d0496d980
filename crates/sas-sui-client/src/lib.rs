//! sas-sui-client
//!
//! Rust client for the SAS Move packages deployed on Sui.
//!
//! It includes:
//! - a thin JSON-RPC transport (`rpc`)
//! - decoders from Move object JSON into the shared record model
//! - registry readers that walk the versioned dynamic-field tables
//! - a programmable transaction builder and a signing writer
//!
//! Package and registry ids come from the deployment table in `sas-core`.

pub mod constants;
pub mod decode;
pub mod keys;
pub mod ptb;
pub mod registry_client;
pub mod rpc;
pub mod writer;

pub use constants::*;
pub use ptb::PtbBuilder;
pub use registry_client::SuiRegistryClient;
pub use rpc::SuiRpc;
pub use writer::SuiWriter;
