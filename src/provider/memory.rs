//! In-memory ledger implementing [`KioskProvider`]

use crate::{
    error::{KioskError, ProviderError, Result},
    provider::{
        DynamicFieldInfo, DynamicFieldName, DynamicFieldType, ExecutionStatus, KioskProvider,
        ObjectChange, ObjectData, ObjectDataOptions, ObjectResponse, ObjectResponseQuery, Page,
        PaginationArguments, TransactionEffects, TransactionResponse, TransactionResponseOptions,
    },
    transaction::{CallArg, Command, MoveCall, ObjectArg, TransactionArgument, TransactionData},
    types::{
        Digest, ObjectId, ObjectRef, Owner, SequenceNumber, SuiAddress, KIOSK_MODULE,
        KIOSK_OWNER_CAP, KIOSK_TYPE, SUI_FRAMEWORK,
    },
    utils::current_time_millis,
    wallet::verify_signature,
};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use indexmap::IndexMap;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use sha2::{Digest as _, Sha256};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// Page size used when a query does not set a limit
pub const DEFAULT_PAGE_LIMIT: usize = 50;

const ITEM_KEY_TYPE: &str = "0x2::kiosk::Item";
const LISTING_KEY_TYPE: &str = "0x2::kiosk::Listing";
const LISTING_FIELD_TYPE: &str = "0x2::dynamic_field::Field<0x2::kiosk::Listing, u64>";

/// An object as stored by the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredObject {
    pub object_id: ObjectId,
    pub version: SequenceNumber,
    pub digest: Digest,
    pub object_type: String,
    pub owner: Owner,
    pub fields: Value,
    #[serde(default)]
    pub display: Option<Value>,
}

impl StoredObject {
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef {
            object_id: self.object_id.clone(),
            version: self.version,
            digest: self.digest.clone(),
        }
    }

    fn to_response(&self, options: &ObjectDataOptions) -> ObjectResponse {
        ObjectResponse::found(ObjectData {
            object_id: self.object_id.clone(),
            version: self.version,
            digest: self.digest.clone(),
            type_: options.show_type.then(|| self.object_type.clone()),
            owner: options.show_owner.then(|| self.owner.clone()),
            content: options.show_content.then(|| {
                json!({
                    "dataType": "moveObject",
                    "type": self.object_type,
                    "fields": self.fields,
                })
            }),
            display: options.show_display.then(|| {
                json!({ "data": self.display.clone().unwrap_or(Value::Null) })
            }),
        })
    }

    fn field_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

fn object_digest(object_id: &ObjectId, version: SequenceNumber) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(object_id.as_str().as_bytes());
    hasher.update(version.to_le_bytes());
    Digest(hex::encode(hasher.finalize()))
}

fn bcs_name<T: Serialize>(key: &T) -> String {
    general_purpose::STANDARD.encode(bincode::serialize(key).unwrap_or_default())
}

type ExecResult<T> = std::result::Result<T, String>;

/// Full ledger contents; also the JSON snapshot format
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerState {
    pub objects: IndexMap<ObjectId, StoredObject>,
    pub dynamic_fields: IndexMap<ObjectId, Vec<DynamicFieldInfo>>,
    /// Version assigned to objects touched by the next transaction
    pub lamport: SequenceNumber,
    pub next_object: u64,
}

impl LedgerState {
    fn fresh_id(&mut self) -> ObjectId {
        self.next_object += 1;
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"kiosk-rs::object");
        hasher.update(&self.next_object.to_le_bytes());
        ObjectId::from_bytes(*hasher.finalize().as_bytes())
    }

    fn version(&self) -> SequenceNumber {
        self.lamport.max(1)
    }

    /// Store a new object and return its id
    pub fn insert(&mut self, object_type: &str, owner: Owner, mut fields: Value) -> ObjectId {
        let object_id = self.fresh_id();
        let version = self.version();
        if let Some(map) = fields.as_object_mut() {
            map.insert("id".to_string(), json!(object_id));
        }

        self.objects.insert(
            object_id.clone(),
            StoredObject {
                object_id: object_id.clone(),
                version,
                digest: object_digest(&object_id, version),
                object_type: object_type.to_string(),
                owner,
                fields,
                display: None,
            },
        );
        object_id
    }

    fn object(&self, object_id: &ObjectId) -> ExecResult<&StoredObject> {
        self.objects
            .get(object_id)
            .ok_or_else(|| format!("object {} does not exist", object_id))
    }

    fn object_mut(&mut self, object_id: &ObjectId) -> ExecResult<&mut StoredObject> {
        let version = self.version();
        let object = self
            .objects
            .get_mut(object_id)
            .ok_or_else(|| format!("object {} does not exist", object_id))?;
        object.version = version;
        object.digest = object_digest(object_id, version);
        Ok(object)
    }

    /// Create a Kiosk owned by `owner` together with its owner cap
    pub fn new_kiosk(&mut self, owner: &SuiAddress) -> (ObjectId, ObjectId) {
        let kiosk_id = self.insert(
            KIOSK_TYPE,
            Owner::AddressOwner(owner.clone()),
            json!({ "owner": owner, "item_count": 0, "profits": "0" }),
        );
        let cap_id = self.insert(
            KIOSK_OWNER_CAP,
            Owner::AddressOwner(owner.clone()),
            json!({ "for": kiosk_id }),
        );
        (kiosk_id, cap_id)
    }

    pub fn share(&mut self, object_id: &ObjectId) -> ExecResult<()> {
        let object = self.object_mut(object_id)?;
        if object.owner.is_shared() {
            return Err(format!("object {} is already shared", object_id));
        }
        object.owner = Owner::Shared {
            initial_shared_version: object.version,
        };
        Ok(())
    }

    pub fn transfer(&mut self, object_id: &ObjectId, recipient: &SuiAddress) -> ExecResult<()> {
        let object = self.object_mut(object_id)?;
        if object.owner.is_shared() {
            return Err(format!("shared object {} cannot be transferred", object_id));
        }
        object.owner = Owner::AddressOwner(recipient.clone());
        Ok(())
    }

    fn check_cap(&self, kiosk_id: &ObjectId, cap_id: &ObjectId) -> ExecResult<()> {
        let kiosk = self.object(kiosk_id)?;
        if kiosk.object_type != KIOSK_TYPE {
            return Err(format!("object {} is not a kiosk", kiosk_id));
        }
        let cap = self.object(cap_id)?;
        if cap.object_type != KIOSK_OWNER_CAP || cap.field_str("for") != Some(kiosk_id.as_str()) {
            return Err(format!("{} is not the owner cap of kiosk {}", cap_id, kiosk_id));
        }
        Ok(())
    }

    fn fields_of(&self, kiosk_id: &ObjectId) -> &[DynamicFieldInfo] {
        self.dynamic_fields
            .get(kiosk_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn listing_of(&self, kiosk_id: &ObjectId, item_id: &ObjectId) -> Option<&DynamicFieldInfo> {
        self.fields_of(kiosk_id).iter().find(|field| {
            field.name.type_ == LISTING_KEY_TYPE
                && field.name.value.get("id").and_then(Value::as_str) == Some(item_id.as_str())
        })
    }

    /// Move `item_id` into the Kiosk
    pub fn place(&mut self, kiosk_id: &ObjectId, cap_id: &ObjectId, item_id: &ObjectId) -> ExecResult<()> {
        self.check_cap(kiosk_id, cap_id)?;

        if !matches!(self.object(item_id)?.owner, Owner::AddressOwner(_)) {
            return Err(format!("object {} cannot be placed: not address-owned", item_id));
        }
        if !self.object(kiosk_id)?.fields.is_object() {
            return Err(format!("kiosk {} has malformed fields", kiosk_id));
        }

        let item = self.object_mut(item_id)?;
        item.owner = Owner::ObjectOwner(kiosk_id.clone());
        let item_type = item.object_type.clone();
        let item_ref = item.object_ref();

        let kiosk = self.object_mut(kiosk_id)?;
        if let Some(fields) = kiosk.fields.as_object_mut() {
            let count = fields.get("item_count").and_then(Value::as_u64).unwrap_or(0);
            fields.insert("item_count".to_string(), json!(count + 1));
        }

        self.dynamic_fields
            .entry(kiosk_id.clone())
            .or_default()
            .push(DynamicFieldInfo {
                name: DynamicFieldName {
                    type_: ITEM_KEY_TYPE.to_string(),
                    value: json!({ "id": item_id }),
                },
                bcs_name: bcs_name(item_id),
                type_: DynamicFieldType::DynamicObject,
                object_type: item_type,
                object_id: item_ref.object_id,
                version: item_ref.version,
                digest: item_ref.digest,
            });
        Ok(())
    }

    /// List an item of the Kiosk. Returns the id of the listing field.
    pub fn list(
        &mut self,
        kiosk_id: &ObjectId,
        cap_id: &ObjectId,
        item_id: &ObjectId,
        price: u64,
        is_exclusive: bool,
    ) -> ExecResult<ObjectId> {
        self.check_cap(kiosk_id, cap_id)?;
        if self.object(item_id)?.owner != Owner::ObjectOwner(kiosk_id.clone()) {
            return Err(format!("item {} is not in kiosk {}", item_id, kiosk_id));
        }
        if self.listing_of(kiosk_id, item_id).is_some() {
            return Err(format!("item {} is already listed", item_id));
        }

        let key = json!({ "id": item_id, "is_exclusive": is_exclusive });
        let listing_id = self.insert(
            LISTING_FIELD_TYPE,
            Owner::ObjectOwner(kiosk_id.clone()),
            json!({
                "name": { "type": LISTING_KEY_TYPE, "fields": key },
                "value": price.to_string(),
            }),
        );
        let listing_ref = self.object(&listing_id)?.object_ref();
        self.object_mut(kiosk_id)?;

        self.dynamic_fields
            .entry(kiosk_id.clone())
            .or_default()
            .push(DynamicFieldInfo {
                name: DynamicFieldName {
                    type_: LISTING_KEY_TYPE.to_string(),
                    value: key,
                },
                bcs_name: bcs_name(&(item_id, is_exclusive)),
                type_: DynamicFieldType::DynamicField,
                object_type: "u64".to_string(),
                object_id: listing_ref.object_id,
                version: listing_ref.version,
                digest: listing_ref.digest,
            });
        Ok(listing_id)
    }

    /// Remove a listing. Returns the id of the deleted listing field.
    pub fn delist(&mut self, kiosk_id: &ObjectId, cap_id: &ObjectId, item_id: &ObjectId) -> ExecResult<ObjectId> {
        self.check_cap(kiosk_id, cap_id)?;
        let listing = self
            .listing_of(kiosk_id, item_id)
            .ok_or_else(|| format!("item {} is not listed", item_id))?;
        if listing.name.value["is_exclusive"].as_bool().unwrap_or(false) {
            return Err(format!("item {} is exclusively listed", item_id));
        }
        let listing_id = listing.object_id.clone();

        if let Some(fields) = self.dynamic_fields.get_mut(kiosk_id) {
            fields.retain(|field| field.object_id != listing_id);
        }
        self.objects.shift_remove(&listing_id);
        self.object_mut(kiosk_id)?;
        Ok(listing_id)
    }
}

/// Value produced while executing a transaction
#[derive(Debug, Clone)]
enum RuntimeValue {
    Object(ObjectId),
    Pure(Vec<u8>),
}

#[derive(Debug, Default)]
struct Changes {
    created: Vec<ObjectId>,
    mutated: Vec<ObjectId>,
    deleted: Vec<ObjectId>,
}

impl Changes {
    fn touch(&mut self, object_id: &ObjectId) {
        if !self.created.contains(object_id) && !self.mutated.contains(object_id) {
            self.mutated.push(object_id.clone());
        }
    }
}

struct Execution<'a> {
    state: &'a mut LedgerState,
    data: &'a TransactionData,
    results: Vec<Vec<RuntimeValue>>,
    changes: Changes,
}

impl<'a> Execution<'a> {
    fn new(state: &'a mut LedgerState, data: &'a TransactionData) -> Self {
        Self {
            state,
            data,
            results: Vec::new(),
            changes: Changes::default(),
        }
    }

    fn run(mut self) -> ExecResult<Changes> {
        let data = self.data;
        for command in &data.commands {
            let values = match command {
                Command::MoveCall(call) => self.move_call(call)?,
                Command::TransferObjects { objects, address } => {
                    let recipient: SuiAddress = self.pure(address)?;
                    for object in objects {
                        let object_id = self.object(object)?;
                        self.state.transfer(&object_id, &recipient)?;
                        self.changes.touch(&object_id);
                    }
                    Vec::new()
                },
            };
            self.results.push(values);
        }
        Ok(self.changes)
    }

    fn resolve(&self, argument: &TransactionArgument) -> ExecResult<RuntimeValue> {
        match *argument {
            TransactionArgument::GasCoin => {
                Err("gas coin is not available in the in-memory ledger".to_string())
            },
            TransactionArgument::Input(index) => match self.data.inputs.get(index as usize) {
                Some(CallArg::Pure(bytes)) => Ok(RuntimeValue::Pure(bytes.clone())),
                Some(CallArg::Object(object)) => self.resolve_input(object),
                None => Err(format!("input {} out of bounds", index)),
            },
            TransactionArgument::Result(command) => match self.results.get(command as usize) {
                Some(values) if values.len() == 1 => Ok(values[0].clone()),
                Some(values) => Err(format!(
                    "result of command {} has {} values, expected 1",
                    command,
                    values.len()
                )),
                None => Err(format!("command {} has no result yet", command)),
            },
            TransactionArgument::NestedResult(command, index) => self
                .results
                .get(command as usize)
                .and_then(|values| values.get(index as usize))
                .cloned()
                .ok_or_else(|| format!("no result {} for command {}", index, command)),
        }
    }

    fn resolve_input(&self, arg: &ObjectArg) -> ExecResult<RuntimeValue> {
        let object = self.state.object(arg.object_id())?;
        match arg {
            ObjectArg::ImmOrOwned(object_ref) if object_ref.version != object.version => {
                return Err(format!(
                    "object {} is at version {}, got reference to {}",
                    object.object_id, object.version, object_ref.version
                ));
            },
            ObjectArg::Shared(_) if !object.owner.is_shared() => {
                return Err(format!("object {} is not shared", object.object_id));
            },
            _ => {},
        }

        match &object.owner {
            Owner::AddressOwner(owner) if owner != &self.data.sender => {
                Err(format!("object {} is not owned by the sender", object.object_id))
            },
            Owner::ObjectOwner(_) => {
                Err(format!("object {} is a child object", object.object_id))
            },
            _ => Ok(RuntimeValue::Object(object.object_id.clone())),
        }
    }

    fn object(&self, argument: &TransactionArgument) -> ExecResult<ObjectId> {
        match self.resolve(argument)? {
            RuntimeValue::Object(object_id) => Ok(object_id),
            RuntimeValue::Pure(_) => Err(format!("{:?} is not an object", argument)),
        }
    }

    fn pure<T: DeserializeOwned>(&self, argument: &TransactionArgument) -> ExecResult<T> {
        match self.resolve(argument)? {
            RuntimeValue::Pure(bytes) => bincode::deserialize(&bytes)
                .map_err(|e| format!("cannot decode pure argument {:?}: {}", argument, e)),
            RuntimeValue::Object(_) => Err(format!("{:?} is not a pure value", argument)),
        }
    }

    fn arg(&self, call: &MoveCall, index: usize) -> ExecResult<TransactionArgument> {
        call.arguments
            .get(index)
            .copied()
            .ok_or_else(|| format!("{} expects argument {}", call.target(), index))
    }

    fn check_item_type(&self, call: &MoveCall, item_id: &ObjectId) -> ExecResult<()> {
        let object_type = &self.state.object(item_id)?.object_type;
        match call.type_arguments.first() {
            Some(expected) if expected == object_type => Ok(()),
            Some(expected) => Err(format!("item {} is a {}, not a {}", item_id, object_type, expected)),
            None => Err(format!("{} expects a type argument", call.target())),
        }
    }

    fn move_call(&mut self, call: &MoveCall) -> ExecResult<Vec<RuntimeValue>> {
        let target = call.target();
        let kiosk_fn = |name: &str| format!("{}::{}", KIOSK_MODULE, name);

        if target == kiosk_fn("new") {
            let (kiosk_id, cap_id) = self.state.new_kiosk(&self.data.sender);
            self.changes.created.push(kiosk_id.clone());
            self.changes.created.push(cap_id.clone());
            return Ok(vec![RuntimeValue::Object(kiosk_id), RuntimeValue::Object(cap_id)]);
        }

        if target == format!("{}::transfer::public_share_object", SUI_FRAMEWORK) {
            let object_id = self.object(&self.arg(call, 0)?)?;
            self.state.share(&object_id)?;
            self.changes.touch(&object_id);
            return Ok(Vec::new());
        }

        if target == kiosk_fn("place") || target == kiosk_fn("place_and_list") {
            let kiosk_id = self.object(&self.arg(call, 0)?)?;
            let cap_id = self.object(&self.arg(call, 1)?)?;
            let item_id = self.object(&self.arg(call, 2)?)?;
            self.check_item_type(call, &item_id)?;
            self.state.place(&kiosk_id, &cap_id, &item_id)?;
            self.changes.touch(&kiosk_id);
            self.changes.touch(&item_id);

            if target == kiosk_fn("place_and_list") {
                let price: u64 = self.pure(&self.arg(call, 3)?)?;
                let listing_id = self.state.list(&kiosk_id, &cap_id, &item_id, price, false)?;
                self.changes.created.push(listing_id);
            }
            return Ok(Vec::new());
        }

        if target == kiosk_fn("list") || target == kiosk_fn("delist") {
            let kiosk_id = self.object(&self.arg(call, 0)?)?;
            let cap_id = self.object(&self.arg(call, 1)?)?;
            let item_id: ObjectId = self.pure(&self.arg(call, 2)?)?;
            self.check_item_type(call, &item_id)?;

            if target == kiosk_fn("list") {
                let price: u64 = self.pure(&self.arg(call, 3)?)?;
                let listing_id = self.state.list(&kiosk_id, &cap_id, &item_id, price, false)?;
                self.changes.created.push(listing_id);
            } else {
                let listing_id = self.state.delist(&kiosk_id, &cap_id, &item_id)?;
                self.changes.deleted.push(listing_id);
            }
            self.changes.touch(&kiosk_id);
            return Ok(Vec::new());
        }

        Err(format!("{} is not supported by the in-memory ledger", target))
    }
}

/// In-memory ledger. Executes the Kiosk subset of Move calls; any other
/// call fails the transaction with a failure status.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    state: RwLock<LedgerState>,
    multi_get_calls: AtomicUsize,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: LedgerState) -> Self {
        Self {
            state: RwLock::new(state),
            multi_get_calls: AtomicUsize::new(0),
        }
    }

    /// Load a JSON snapshot written by [`MemoryProvider::save`]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let state: LedgerState = serde_json::from_slice(&bytes)?;
        Ok(Self::from_state(state))
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_vec_pretty(&*self.state.read().await)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    pub async fn snapshot(&self) -> LedgerState {
        self.state.read().await.clone()
    }

    /// Number of batch object fetches served so far
    pub fn multi_get_calls(&self) -> usize {
        self.multi_get_calls.load(Ordering::SeqCst)
    }

    /// Create an address-owned object of any type
    pub async fn mint_object(&self, owner: &SuiAddress, object_type: &str, fields: Value) -> ObjectId {
        let mut state = self.state.write().await;
        state.insert(object_type, Owner::AddressOwner(owner.clone()), fields)
    }

    pub async fn set_display(&self, object_id: &ObjectId, display: Value) -> Result<()> {
        let mut state = self.state.write().await;
        let object = state.objects.get_mut(object_id).ok_or_else(|| ProviderError::ObjectNotFound {
            object_id: object_id.to_string(),
        })?;
        object.display = Some(display);
        Ok(())
    }

    /// Create and share a Kiosk. Returns `(kiosk, owner_cap)`.
    pub async fn create_kiosk(&self, owner: &SuiAddress) -> Result<(ObjectId, ObjectId)> {
        let mut state = self.state.write().await;
        let (kiosk_id, cap_id) = state.new_kiosk(owner);
        state.share(&kiosk_id).map_err(KioskError::validation)?;
        Ok((kiosk_id, cap_id))
    }

    pub async fn place_item(&self, kiosk_id: &ObjectId, cap_id: &ObjectId, item_id: &ObjectId) -> Result<()> {
        let mut state = self.state.write().await;
        state.place(kiosk_id, cap_id, item_id).map_err(KioskError::validation)
    }

    pub async fn list_item(
        &self,
        kiosk_id: &ObjectId,
        cap_id: &ObjectId,
        item_id: &ObjectId,
        price: u64,
        is_exclusive: bool,
    ) -> Result<ObjectId> {
        let mut state = self.state.write().await;
        state
            .list(kiosk_id, cap_id, item_id, price, is_exclusive)
            .map_err(KioskError::validation)
    }

    /// Attach a raw dynamic field descriptor to `parent_id`
    pub async fn add_dynamic_field(&self, parent_id: &ObjectId, field: DynamicFieldInfo) {
        let mut state = self.state.write().await;
        state.dynamic_fields.entry(parent_id.clone()).or_default().push(field);
    }
}

fn paginate<T: Clone>(
    items: &[T],
    key: impl Fn(&T) -> &ObjectId,
    pagination: &PaginationArguments,
) -> Result<Page<T>> {
    let start = match &pagination.cursor {
        None => 0,
        Some(cursor) => {
            items
                .iter()
                .position(|item| key(item).as_str() == cursor)
                .ok_or_else(|| ProviderError::InvalidCursor {
                    cursor: cursor.clone(),
                })?
                + 1
        },
    };
    let limit = pagination.limit.unwrap_or(DEFAULT_PAGE_LIMIT).max(1);
    let end = start.saturating_add(limit).min(items.len());
    let data = items[start..end].to_vec();
    let has_next_page = end < items.len();
    let next_cursor = if has_next_page {
        data.last().map(|item| key(item).to_string())
    } else {
        None
    };

    Ok(Page {
        data,
        next_cursor,
        has_next_page,
    })
}

#[async_trait]
impl KioskProvider for MemoryProvider {
    async fn get_dynamic_fields(
        &self,
        parent_id: &ObjectId,
        pagination: &PaginationArguments,
    ) -> Result<Page<DynamicFieldInfo>> {
        let state = self.state.read().await;
        paginate(state.fields_of(parent_id), |field| &field.object_id, pagination)
    }

    async fn multi_get_objects(
        &self,
        ids: &[ObjectId],
        options: &ObjectDataOptions,
    ) -> Result<Vec<ObjectResponse>> {
        self.multi_get_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .map(|id| match state.objects.get(id) {
                Some(object) => object.to_response(options),
                None => ObjectResponse::not_found(id.clone()),
            })
            .collect())
    }

    async fn get_owned_objects(
        &self,
        owner: &SuiAddress,
        query: &ObjectResponseQuery,
        pagination: &PaginationArguments,
    ) -> Result<Page<ObjectResponse>> {
        let state = self.state.read().await;
        let owned: Vec<&StoredObject> = state
            .objects
            .values()
            .filter(|object| object.owner == Owner::AddressOwner(owner.clone()))
            .filter(|object| {
                query
                    .filter
                    .as_ref()
                    .map_or(true, |filter| filter.matches(&object.object_id, &object.object_type))
            })
            .collect();

        let page = paginate(&owned, |object| &object.object_id, pagination)?;
        Ok(Page {
            data: page.data.iter().map(|object| object.to_response(&query.options)).collect(),
            next_cursor: page.next_cursor,
            has_next_page: page.has_next_page,
        })
    }

    async fn execute_transaction_block(
        &self,
        transaction_block: &str,
        signature: &str,
        options: &TransactionResponseOptions,
    ) -> Result<TransactionResponse> {
        let tx_bytes = general_purpose::STANDARD.decode(transaction_block)?;
        let data = TransactionData::from_bytes(&tx_bytes).map_err(|e| {
            ProviderError::MalformedTransaction {
                reason: e.to_string(),
            }
        })?;

        let signer = verify_signature(&tx_bytes, signature)?;
        if signer != data.sender {
            return Err(ProviderError::InvalidSignature {
                sender: data.sender.to_string(),
            }
            .into());
        }
        let digest = data.digest()?;

        let mut state = self.state.write().await;
        let mut draft = state.clone();
        draft.lamport = draft.version() + 1;

        let (status, changes) = match Execution::new(&mut draft, &data).run() {
            Ok(changes) => (ExecutionStatus::Success, changes),
            Err(error) => {
                tracing::debug!("Transaction {} failed: {}", digest, error);
                (ExecutionStatus::Failure { error }, Changes::default())
            },
        };
        if status.is_success() {
            *state = draft;
        }

        let object_ref = |id: &ObjectId| state.objects.get(id).map(StoredObject::object_ref);
        let effects = options.show_effects.then(|| TransactionEffects {
            status: status.clone(),
            created: changes.created.iter().filter_map(object_ref).collect(),
            mutated: changes.mutated.iter().filter_map(object_ref).collect(),
            deleted: changes.deleted.clone(),
        });

        let object_changes = options.show_object_changes.then(|| {
            let created = changes.created.iter().filter_map(|id| state.objects.get(id)).map(|object| {
                ObjectChange::Created {
                    object_id: object.object_id.clone(),
                    object_type: object.object_type.clone(),
                    owner: object.owner.clone(),
                    version: object.version,
                }
            });
            let mutated = changes.mutated.iter().filter_map(|id| state.objects.get(id)).map(|object| {
                ObjectChange::Mutated {
                    object_id: object.object_id.clone(),
                    object_type: object.object_type.clone(),
                    owner: object.owner.clone(),
                    version: object.version,
                }
            });
            let deleted = changes.deleted.iter().map(|id| ObjectChange::Deleted {
                object_id: id.clone(),
            });
            created.chain(mutated).chain(deleted).collect()
        });

        Ok(TransactionResponse {
            digest,
            transaction: if options.show_input {
                Some(serde_json::to_value(&data)?)
            } else {
                None
            },
            effects,
            object_changes,
            timestamp_ms: current_time_millis(),
        })
    }
}
