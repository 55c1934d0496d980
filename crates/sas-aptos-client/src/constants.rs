//! Module and function names of the SAS Move package on Aptos.

/// Entry module holding every write function.
pub const MODULE_AAS: &str = "aas";

pub const FN_CREATE_SCHEMA: &str = "create_schema";
pub const FN_CREATE_ATTESTATION: &str = "create_attestation";
pub const FN_REVOKE_ATTESTATION: &str = "revoke_attestation";

/// Passed where an address argument is optional and absent.
pub const NONE_ADDRESS: &str = "0x0";

/// How long a submitted transaction stays valid, in seconds.
pub const TXN_EXPIRATION_SECS: u64 = 60;

/// Type suffixes used to pick created objects out of write-set changes.
pub const TYPE_SCHEMA: &str = "::schema::Schema";
pub const TYPE_ATTESTATION: &str = "::attestation::Attestation";
