//! sas-aptos-client
//!
//! Rust client for the SAS Move package deployed on Aptos.
//!
//! It includes:
//! - a REST transport for the fullnode `/v1` API
//! - view-function readers for schemas and attestations
//! - an entry-function writer with local ed25519 signing
//!
//! Listing is not available on Aptos; the list calls report `Unsupported`.

pub mod constants;
pub mod decode;
pub mod keys;
pub mod registry_client;
pub mod rest;
pub mod writer;

pub use registry_client::AptosRegistryClient;
pub use rest::AptosRest;
pub use writer::{AptosWriter, TransactionOptions};
