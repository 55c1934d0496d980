//! Constants shared between the on-chain SAS package and this client.
//!
//! Keep these stable: module and function names are part of the call
//! contract, and argument order for each function is fixed in `ptb.rs`.

/// Move module holding schema records and the resolver / request flow.
pub const MODULE_SCHEMA: &str = "schema";

/// Move module holding attestation issuance and revocation.
pub const MODULE_SAS: &str = "sas";

pub const FN_SCHEMA_NEW: &str = "new";
pub const FN_SCHEMA_NEW_WITH_RESOLVER: &str = "new_with_resolver";
pub const FN_NEW_RESOLVER_BUILDER: &str = "new_resolver_builder";
pub const FN_ADD_RESOLVER: &str = "add_resolver";
pub const FN_NEW_REQUEST: &str = "new_request";
pub const FN_START_ATTEST: &str = "start_attest";
pub const FN_FINISH_ATTEST: &str = "finish_attest";
pub const FN_ATTEST: &str = "attest";
pub const FN_REVOKE: &str = "revoke";

/// Struct type suffixes used to recognize decoded objects.
pub const TYPE_SCHEMA: &str = "::schema::Schema";
pub const TYPE_ATTESTATION: &str = "::attestation::Attestation";
pub const TYPE_ADMIN_CAP: &str = "::schema::AdminCap";

/// Field of the versioned inner registry struct that holds the records table.
pub const FIELD_SCHEMA_RECORDS: &str = "schema_records";
pub const FIELD_ATTESTATION_RECORDS: &str = "attestation_records";

/// Shared system clock object.
pub const CLOCK_OBJECT_ID: &str = "0x6";

pub const SUI_COIN_TYPE: &str = "0x2::sui::SUI";

/// Maximum page size accepted by `suix_getDynamicFields`.
pub const MAX_PAGE_SIZE: usize = 50;

/// Intent prefix for transaction data: (scope = TransactionData, version = V0, app = Sui).
pub const TRANSACTION_INTENT: [u8; 3] = [0, 0, 0];

/// Signature scheme flag for ed25519.
pub const ED25519_FLAG: u8 = 0x00;
