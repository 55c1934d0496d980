//! Programmable transaction blocks.
//!
//! The types below mirror Sui's BCS layout for `TransactionData::V1` closely
//! enough to build the transactions SAS needs; variant order matters because
//! BCS encodes enum variants by index.
//!
//! [`PtbBuilder`] has one method per SAS entry point. Each appends exactly one
//! `MoveCall` with a fixed, ordered argument list and returns the call's
//! result handle so calls can be chained inside one transaction.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use sas_core::address::{address_bytes, ZERO_ADDRESS};
use sas_core::model::{NewAttestation, NewSchema, Resolver};
use sas_core::{SasError, SasResult};

use crate::constants::*;

pub type SuiAddress = [u8; 32];

/// 32-byte digest; BCS-encoded as a length-prefixed byte vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectDigest(pub [u8; 32]);

impl Serialize for ObjectDigest {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_bytes(&self.0)
    }
}

impl<'de> Deserialize<'de> for ObjectDigest {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let bytes = Vec::<u8>::deserialize(d)?;
        let len = bytes.len();
        bytes
            .try_into()
            .map(Self)
            .map_err(|_| <D::Error as serde::de::Error>::custom(format!("digest must be 32 bytes, got {len}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub object_id: SuiAddress,
    pub version: u64,
    pub digest: ObjectDigest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectArg {
    ImmOrOwnedObject(ObjectRef),
    SharedObject {
        id: SuiAddress,
        initial_shared_version: u64,
        mutable: bool,
    },
}

impl ObjectArg {
    pub fn id(&self) -> SuiAddress {
        match self {
            Self::ImmOrOwnedObject(r) => r.object_id,
            Self::SharedObject { id, .. } => *id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallArg {
    Pure(Vec<u8>),
    Object(ObjectArg),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Argument {
    GasCoin,
    Input(u16),
    Result(u16),
    NestedResult(u16, u16),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeTag {
    Bool,
    U8,
    U64,
    U128,
    Address,
    Signer,
    Vector(Box<TypeTag>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgrammableMoveCall {
    pub package: SuiAddress,
    pub module: String,
    pub function: String,
    pub type_arguments: Vec<TypeTag>,
    pub arguments: Vec<Argument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    MoveCall(Box<ProgrammableMoveCall>),
    TransferObjects(Vec<Argument>, Argument),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgrammableTransaction {
    pub inputs: Vec<CallArg>,
    pub commands: Vec<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    ProgrammableTransaction(ProgrammableTransaction),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasData {
    pub payment: Vec<ObjectRef>,
    pub owner: SuiAddress,
    pub price: u64,
    pub budget: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionExpiration {
    None,
    Epoch(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionDataV1 {
    pub kind: TransactionKind,
    pub sender: SuiAddress,
    pub gas_data: GasData,
    pub expiration: TransactionExpiration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionData {
    V1(TransactionDataV1),
}

impl TransactionData {
    pub fn new(pt: ProgrammableTransaction, sender: SuiAddress, gas: GasData) -> Self {
        Self::V1(TransactionDataV1 {
            kind: TransactionKind::ProgrammableTransaction(pt),
            sender,
            gas_data: gas,
            expiration: TransactionExpiration::None,
        })
    }

    pub fn to_bcs(&self) -> SasResult<Vec<u8>> {
        bcs::to_bytes(self).map_err(|e| SasError::invalid_argument(format!("bcs: {e}")))
    }

    pub fn from_bcs(bytes: &[u8]) -> SasResult<Self> {
        bcs::from_bytes(bytes).map_err(|e| SasError::decode(format!("transaction data: {e}")))
    }

    pub fn sender(&self) -> SuiAddress {
        match self {
            Self::V1(v1) => v1.sender,
        }
    }

    pub fn programmable(&self) -> &ProgrammableTransaction {
        match self {
            Self::V1(TransactionDataV1 {
                kind: TransactionKind::ProgrammableTransaction(pt),
                ..
            }) => pt,
        }
    }
}

/// Builder for one programmable transaction against a SAS package.
#[derive(Debug, Clone)]
pub struct PtbBuilder {
    package: SuiAddress,
    inputs: Vec<CallArg>,
    commands: Vec<Command>,
}

impl PtbBuilder {
    pub fn new(package: &str) -> SasResult<Self> {
        Ok(Self {
            package: address_bytes(package)?,
            inputs: Vec::new(),
            commands: Vec::new(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Add a BCS-encoded pure input.
    pub fn pure<T: Serialize + ?Sized>(&mut self, value: &T) -> SasResult<Argument> {
        let bytes = bcs::to_bytes(value).map_err(|e| SasError::invalid_argument(format!("bcs: {e}")))?;
        Ok(self.push_input(CallArg::Pure(bytes)))
    }

    pub fn pure_address(&mut self, addr: &str) -> SasResult<Argument> {
        let bytes = address_bytes(addr)?;
        self.pure(&bytes)
    }

    /// Add an object input. The same object is only added once; Sui rejects
    /// transactions that list an object twice.
    pub fn object(&mut self, arg: ObjectArg) -> Argument {
        let existing = self.inputs.iter().position(|i| match i {
            CallArg::Object(o) => o.id() == arg.id(),
            CallArg::Pure(_) => false,
        });
        match existing {
            Some(idx) => Argument::Input(idx as u16),
            None => self.push_input(CallArg::Object(arg)),
        }
    }

    pub fn move_call(&mut self, module: &str, function: &str, arguments: Vec<Argument>) -> Argument {
        self.commands.push(Command::MoveCall(Box::new(ProgrammableMoveCall {
            package: self.package,
            module: module.to_string(),
            function: function.to_string(),
            type_arguments: Vec::new(),
            arguments,
        })));
        Argument::Result((self.commands.len() - 1) as u16)
    }

    pub fn transfer_objects(&mut self, objects: Vec<Argument>, recipient: Argument) {
        self.commands.push(Command::TransferObjects(objects, recipient));
    }

    pub fn finish(self) -> ProgrammableTransaction {
        ProgrammableTransaction {
            inputs: self.inputs,
            commands: self.commands,
        }
    }

    fn push_input(&mut self, arg: CallArg) -> Argument {
        self.inputs.push(arg);
        Argument::Input((self.inputs.len() - 1) as u16)
    }

    fn schema_args(&mut self, registry: Argument, input: &NewSchema) -> SasResult<Vec<Argument>> {
        Ok(vec![
            registry,
            self.pure(&input.schema)?,
            self.pure(input.name.as_str())?,
            self.pure(input.description.as_str())?,
            self.pure(input.url.as_str())?,
            self.pure(&input.revokable)?,
        ])
    }

    /// `schema::new(registry, schema, name, description, url, revokable) -> AdminCap`
    pub fn create_schema(&mut self, registry: Argument, input: &NewSchema) -> SasResult<Argument> {
        let args = self.schema_args(registry, input)?;
        Ok(self.move_call(MODULE_SCHEMA, FN_SCHEMA_NEW, args))
    }

    /// `schema::new_with_resolver(registry, schema, name, description, url, revokable, rules, config) -> AdminCap`
    pub fn create_schema_with_resolver(
        &mut self,
        registry: Argument,
        input: &NewSchema,
        resolver: &Resolver,
    ) -> SasResult<Argument> {
        let mut args = self.schema_args(registry, input)?;
        args.push(self.pure(&resolver.rules)?);
        args.push(self.pure(&resolver.config)?);
        Ok(self.move_call(MODULE_SCHEMA, FN_SCHEMA_NEW_WITH_RESOLVER, args))
    }

    /// `schema::new_resolver_builder(admin_cap, schema, rules, config) -> ResolverBuilder`
    pub fn new_resolver_builder(
        &mut self,
        admin_cap: Argument,
        schema: Argument,
        resolver: &Resolver,
    ) -> SasResult<Argument> {
        let rules = self.pure(&resolver.rules)?;
        let config = self.pure(&resolver.config)?;
        Ok(self.move_call(
            MODULE_SCHEMA,
            FN_NEW_RESOLVER_BUILDER,
            vec![admin_cap, schema, rules, config],
        ))
    }

    /// `schema::add_resolver(schema, resolver_builder)`
    pub fn add_resolver(&mut self, schema: Argument, builder: Argument) -> Argument {
        self.move_call(MODULE_SCHEMA, FN_ADD_RESOLVER, vec![schema, builder])
    }

    /// `schema::new_request(schema) -> Request`
    pub fn new_request(&mut self, schema: Argument) -> Argument {
        self.move_call(MODULE_SCHEMA, FN_NEW_REQUEST, vec![schema])
    }

    /// `schema::start_attest(schema) -> Request`
    pub fn start_attest(&mut self, schema: Argument) -> Argument {
        self.move_call(MODULE_SCHEMA, FN_START_ATTEST, vec![schema])
    }

    /// `schema::finish_attest(schema, request)`
    pub fn finish_attest(&mut self, schema: Argument, request: Argument) -> Argument {
        self.move_call(MODULE_SCHEMA, FN_FINISH_ATTEST, vec![schema, request])
    }

    /// `sas::attest(schema, attestation_registry, ref_attestation, recipient, expiration_time, data, clock)`
    ///
    /// A missing reference is passed as the zero address.
    pub fn create_attestation(
        &mut self,
        schema: Argument,
        attestation_registry: Argument,
        input: &NewAttestation,
        clock: Argument,
    ) -> SasResult<Argument> {
        let ref_attestation = self.pure_address(input.ref_attestation.as_deref().unwrap_or(ZERO_ADDRESS))?;
        let recipient = self.pure_address(&input.recipient)?;
        let expiration = self.pure(&input.expiration_time)?;
        let data = self.pure(&input.data)?;
        Ok(self.move_call(
            MODULE_SAS,
            FN_ATTEST,
            vec![schema, attestation_registry, ref_attestation, recipient, expiration, data, clock],
        ))
    }

    /// `sas::revoke(admin_cap, attestation_registry, schema, attestation_id)`
    pub fn revoke_attestation(
        &mut self,
        admin_cap: Argument,
        attestation_registry: Argument,
        schema: Argument,
        attestation: &str,
    ) -> SasResult<Argument> {
        let attestation = self.pure_address(attestation)?;
        Ok(self.move_call(
            MODULE_SAS,
            FN_REVOKE,
            vec![admin_cap, attestation_registry, schema, attestation],
        ))
    }
}
