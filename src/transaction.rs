//! Programmable transaction construction

pub mod kiosk;

use crate::{
    error::{KioskError, Result, SigningError},
    types::{Digest, ObjectId, ObjectRef, SequenceNumber, SharedObjectRef, SuiAddress},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default gas budget for transactions built without an explicit one
pub const DEFAULT_GAS_BUDGET: u64 = 50_000_000;

/// Reference to a value inside a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionArgument {
    /// The coin paying for gas
    GasCoin,
    /// An input of the transaction
    Input(u16),
    /// The single result of a command
    Result(u16),
    /// One value of a command returning several
    NestedResult(u16, u16),
}

/// How an object input is referenced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectArg {
    /// Resolved by the executing node at the latest version
    ById(ObjectId),
    ImmOrOwned(ObjectRef),
    Shared(SharedObjectRef),
}

impl ObjectArg {
    pub fn object_id(&self) -> &ObjectId {
        match self {
            ObjectArg::ById(id) => id,
            ObjectArg::ImmOrOwned(object_ref) => &object_ref.object_id,
            ObjectArg::Shared(shared) => &shared.object_id,
        }
    }
}

/// A transaction input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallArg {
    /// bincode-encoded value
    Pure(Vec<u8>),
    Object(ObjectArg),
}

/// A Move function call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCall {
    pub package: String,
    pub module: String,
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<TransactionArgument>,
}

impl MoveCall {
    /// `package::module::function`
    pub fn target(&self) -> String {
        format!("{}::{}::{}", self.package, self.module, self.function)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    MoveCall(MoveCall),
    TransferObjects {
        objects: Vec<TransactionArgument>,
        address: TransactionArgument,
    },
}

/// The signed-over payload of a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionData {
    pub sender: SuiAddress,
    pub gas_budget: u64,
    pub inputs: Vec<CallArg>,
    pub commands: Vec<Command>,
}

impl TransactionData {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Hex blake3 digest of the encoded transaction
    pub fn digest(&self) -> Result<Digest> {
        let bytes = self.to_bytes()?;
        Ok(Digest(hex::encode(blake3::hash(&bytes).as_bytes())))
    }
}

/// Builder for a programmable transaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionBlock {
    sender: Option<SuiAddress>,
    gas_budget: Option<u64>,
    inputs: Vec<CallArg>,
    commands: Vec<Command>,
}

impl TransactionBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_sender(&mut self, sender: SuiAddress) {
        self.sender = Some(sender);
    }

    pub fn set_sender_if_not_set(&mut self, sender: SuiAddress) {
        if self.sender.is_none() {
            self.sender = Some(sender);
        }
    }

    pub fn sender(&self) -> Option<&SuiAddress> {
        self.sender.as_ref()
    }

    pub fn set_gas_budget(&mut self, budget: u64) {
        self.gas_budget = Some(budget);
    }

    pub fn inputs(&self) -> &[CallArg] {
        &self.inputs
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Object input resolved by id; repeated ids share one input
    pub fn object(&mut self, id: ObjectId) -> Result<TransactionArgument> {
        self.object_input(ObjectArg::ById(id))
    }

    pub fn object_ref(&mut self, object_ref: ObjectRef) -> Result<TransactionArgument> {
        self.object_input(ObjectArg::ImmOrOwned(object_ref))
    }

    pub fn shared_object_ref(&mut self, shared: SharedObjectRef) -> Result<TransactionArgument> {
        self.object_input(ObjectArg::Shared(shared))
    }

    fn object_input(&mut self, arg: ObjectArg) -> Result<TransactionArgument> {
        let existing = self.inputs.iter().position(|input| match input {
            CallArg::Object(object) => object.object_id() == arg.object_id(),
            CallArg::Pure(_) => false,
        });

        match existing {
            Some(index) => Ok(TransactionArgument::Input(argument_index(index, "input")?)),
            None => self.push_input(CallArg::Object(arg)),
        }
    }

    /// A pure value input
    pub fn pure<T: Serialize>(&mut self, value: &T) -> Result<TransactionArgument> {
        let bytes = bincode::serialize(value)?;
        self.push_input(CallArg::Pure(bytes))
    }

    fn push_input(&mut self, input: CallArg) -> Result<TransactionArgument> {
        let index = argument_index(self.inputs.len(), "input")?;
        self.inputs.push(input);
        Ok(TransactionArgument::Input(index))
    }

    fn push_command(&mut self, command: Command) -> Result<TransactionArgument> {
        let index = argument_index(self.commands.len(), "command")?;
        self.commands.push(command);
        Ok(TransactionArgument::Result(index))
    }

    /// Call `target` given as `package::module::function`
    pub fn move_call(
        &mut self,
        target: &str,
        type_arguments: Vec<String>,
        arguments: Vec<TransactionArgument>,
    ) -> Result<TransactionArgument> {
        let parts: Vec<&str> = target.split("::").collect();
        let [package, module, function] = parts.as_slice() else {
            return Err(KioskError::invalid_argument(format!(
                "move call target must be package::module::function, got {}",
                target
            )));
        };

        self.push_command(Command::MoveCall(MoveCall {
            package: package.to_string(),
            module: module.to_string(),
            function: function.to_string(),
            type_arguments,
            arguments,
        }))
    }

    pub fn transfer_objects(
        &mut self,
        objects: Vec<TransactionArgument>,
        address: TransactionArgument,
    ) -> Result<TransactionArgument> {
        self.push_command(Command::TransferObjects { objects, address })
    }

    /// Freeze into [`TransactionData`]; the sender must be set
    pub fn build(&self) -> Result<TransactionData> {
        let sender = self.sender.clone().ok_or(SigningError::MissingSender)?;

        Ok(TransactionData {
            sender,
            gas_budget: self.gas_budget.unwrap_or(DEFAULT_GAS_BUDGET),
            inputs: self.inputs.clone(),
            commands: self.commands.clone(),
        })
    }
}

// Arguments address inputs and commands with u16 indices.
fn argument_index(position: usize, kind: &str) -> Result<u16> {
    u16::try_from(position).map_err(|_| {
        KioskError::invalid_argument(format!("a transaction holds at most {} {}s", u16::MAX as usize + 1, kind))
    })
}

/// Pick the `index`-th value of a multi-value command result
pub fn nested(result: TransactionArgument, index: u16) -> Result<TransactionArgument> {
    match result {
        TransactionArgument::Result(command) => Ok(TransactionArgument::NestedResult(command, index)),
        other => Err(KioskError::invalid_argument(format!(
            "{:?} is not a command result",
            other
        ))),
    }
}

/// Any of the ways a caller may refer to an on-chain object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectArgument {
    ById(ObjectId),
    ByRef(ObjectRef),
    BySharedRef(SharedObjectRef),
    Prebuilt(TransactionArgument),
}

impl From<ObjectId> for ObjectArgument {
    fn from(id: ObjectId) -> Self {
        ObjectArgument::ById(id)
    }
}

impl From<&ObjectId> for ObjectArgument {
    fn from(id: &ObjectId) -> Self {
        ObjectArgument::ById(id.clone())
    }
}

impl From<&str> for ObjectArgument {
    fn from(id: &str) -> Self {
        ObjectArgument::ById(ObjectId::new(id))
    }
}

impl From<ObjectRef> for ObjectArgument {
    fn from(object_ref: ObjectRef) -> Self {
        ObjectArgument::ByRef(object_ref)
    }
}

impl From<SharedObjectRef> for ObjectArgument {
    fn from(shared: SharedObjectRef) -> Self {
        ObjectArgument::BySharedRef(shared)
    }
}

impl From<TransactionArgument> for ObjectArgument {
    fn from(arg: TransactionArgument) -> Self {
        ObjectArgument::Prebuilt(arg)
    }
}

impl TryFrom<&Value> for ObjectArgument {
    type Error = KioskError;

    /// Shape dispatch for untyped input. Checked in order: id string,
    /// `{objectId, version, digest}`, `{objectId, initialSharedVersion, mutable}`,
    /// then anything carrying a `kind`.
    fn try_from(value: &Value) -> Result<Self> {
        if let Some(id) = value.as_str() {
            return Ok(ObjectArgument::ById(ObjectId::new(id)));
        }

        let Some(fields) = value.as_object() else {
            return Err(KioskError::invalid_argument(value.to_string()));
        };
        let has = |key: &str| fields.contains_key(key);

        if has("digest") && has("version") && has("objectId") {
            return Ok(ObjectArgument::ByRef(ObjectRef {
                object_id: ObjectId::new(string_field(value, "objectId")?),
                version: version_field(value, "version")?,
                digest: Digest(string_field(value, "digest")?),
            }));
        }

        if has("objectId") && has("initialSharedVersion") && has("mutable") {
            let mutable = value["mutable"]
                .as_bool()
                .ok_or_else(|| KioskError::invalid_argument("mutable must be a boolean"))?;
            return Ok(ObjectArgument::BySharedRef(SharedObjectRef {
                object_id: ObjectId::new(string_field(value, "objectId")?),
                initial_shared_version: version_field(value, "initialSharedVersion")?,
                mutable,
            }));
        }

        if has("kind") {
            return prebuilt_argument(value).map(ObjectArgument::Prebuilt);
        }

        Err(KioskError::invalid_argument(value.to_string()))
    }
}

fn string_field(value: &Value, key: &str) -> Result<String> {
    value[key]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| KioskError::invalid_argument(format!("{} must be a string", key)))
}

// Versions arrive either as JSON numbers or as decimal strings.
fn version_field(value: &Value, key: &str) -> Result<SequenceNumber> {
    match &value[key] {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.parse().ok(),
        _ => None,
    }
    .ok_or_else(|| KioskError::invalid_argument(format!("{} must be an unsigned integer", key)))
}

fn index_field(value: &Value, key: &str) -> Result<u16> {
    value[key]
        .as_u64()
        .and_then(|index| u16::try_from(index).ok())
        .ok_or_else(|| KioskError::invalid_argument(format!("{} must be a u16 index", key)))
}

fn prebuilt_argument(value: &Value) -> Result<TransactionArgument> {
    match value["kind"].as_str() {
        Some("GasCoin") => Ok(TransactionArgument::GasCoin),
        Some("Input") => Ok(TransactionArgument::Input(index_field(value, "index")?)),
        Some("Result") => Ok(TransactionArgument::Result(index_field(value, "index")?)),
        Some("NestedResult") => Ok(TransactionArgument::NestedResult(
            index_field(value, "index")?,
            index_field(value, "resultIndex")?,
        )),
        _ => Err(KioskError::invalid_argument(value.to_string())),
    }
}

/// Turn any [`ObjectArgument`] into an argument of `tx`
pub fn obj_arg(tx: &mut TransactionBlock, arg: impl Into<ObjectArgument>) -> Result<TransactionArgument> {
    match arg.into() {
        ObjectArgument::ById(id) => tx.object(id),
        ObjectArgument::ByRef(object_ref) => tx.object_ref(object_ref),
        ObjectArgument::BySharedRef(shared) => tx.shared_object_ref(shared),
        ObjectArgument::Prebuilt(argument) => Ok(argument),
    }
}
