//! RPC provider abstraction and the response shapes it returns

pub mod memory;

use crate::{
    error::Result,
    types::{Digest, ObjectId, ObjectRef, Owner, SequenceNumber, SuiAddress},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use memory::MemoryProvider;

/// Read and execute access to an object ledger
#[async_trait]
pub trait KioskProvider: Send + Sync {
    /// One page of the dynamic fields attached to `parent_id`
    async fn get_dynamic_fields(
        &self,
        parent_id: &ObjectId,
        pagination: &PaginationArguments,
    ) -> Result<Page<DynamicFieldInfo>>;

    /// Fetch several objects at once, in the order of `ids`
    async fn multi_get_objects(
        &self,
        ids: &[ObjectId],
        options: &ObjectDataOptions,
    ) -> Result<Vec<ObjectResponse>>;

    /// One page of the objects owned by `owner`
    async fn get_owned_objects(
        &self,
        owner: &SuiAddress,
        query: &ObjectResponseQuery,
        pagination: &PaginationArguments,
    ) -> Result<Page<ObjectResponse>>;

    /// Submit a signed transaction. Both arguments are base64.
    async fn execute_transaction_block(
        &self,
        transaction_block: &str,
        signature: &str,
        options: &TransactionResponseOptions,
    ) -> Result<TransactionResponse>;

    async fn get_object(&self, id: &ObjectId, options: &ObjectDataOptions) -> Result<ObjectResponse> {
        let mut responses = self.multi_get_objects(std::slice::from_ref(id), options).await?;
        Ok(responses.pop().unwrap_or_else(|| ObjectResponse::not_found(id.clone())))
    }
}

/// Cursor-based pagination parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationArguments {
    pub cursor: Option<String>,
    pub limit: Option<usize>,
}

impl PaginationArguments {
    pub fn first(limit: usize) -> Self {
        Self {
            cursor: None,
            limit: Some(limit),
        }
    }

    pub fn after(cursor: impl Into<String>, limit: usize) -> Self {
        Self {
            cursor: Some(cursor.into()),
            limit: Some(limit),
        }
    }
}

/// A page of results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub next_cursor: Option<String>,
    pub has_next_page: bool,
}

/// Key of a dynamic field: its Move type and JSON value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicFieldName {
    #[serde(rename = "type")]
    pub type_: String,
    pub value: Value,
}

/// Whether the field value is stored inline or as a standalone object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DynamicFieldType {
    DynamicField,
    DynamicObject,
}

/// Descriptor of a single dynamic field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicFieldInfo {
    pub name: DynamicFieldName,
    /// Encoded field name, usable for follow-up lookups
    pub bcs_name: String,
    #[serde(rename = "type")]
    pub type_: DynamicFieldType,
    pub object_type: String,
    pub object_id: ObjectId,
    pub version: SequenceNumber,
    pub digest: Digest,
}

/// Which parts of an object to return
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectDataOptions {
    pub show_type: bool,
    pub show_owner: bool,
    pub show_content: bool,
    pub show_display: bool,
}

impl ObjectDataOptions {
    pub fn with_type(mut self) -> Self {
        self.show_type = true;
        self
    }

    pub fn with_owner(mut self) -> Self {
        self.show_owner = true;
        self
    }

    pub fn with_content(mut self) -> Self {
        self.show_content = true;
        self
    }

    pub fn with_display(mut self) -> Self {
        self.show_display = true;
        self
    }
}

/// Object payload, filtered by [`ObjectDataOptions`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectData {
    pub object_id: ObjectId,
    pub version: SequenceNumber,
    pub digest: Digest,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Owner>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<Value>,
}

impl ObjectData {
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef {
            object_id: self.object_id.clone(),
            version: self.version,
            digest: self.digest.clone(),
        }
    }
}

/// Why an object could not be returned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "camelCase")]
pub enum ObjectResponseError {
    NotExists {
        #[serde(rename = "objectId")]
        object_id: ObjectId,
    },
    Deleted {
        #[serde(rename = "objectId")]
        object_id: ObjectId,
    },
}

/// Result of fetching a single object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ObjectData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ObjectResponseError>,
}

impl ObjectResponse {
    pub fn found(data: ObjectData) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn not_found(object_id: ObjectId) -> Self {
        Self {
            data: None,
            error: Some(ObjectResponseError::NotExists { object_id }),
        }
    }

    pub fn object_id(&self) -> Option<&ObjectId> {
        match (&self.data, &self.error) {
            (Some(data), _) => Some(&data.object_id),
            (None, Some(ObjectResponseError::NotExists { object_id }))
            | (None, Some(ObjectResponseError::Deleted { object_id })) => Some(object_id),
            (None, None) => None,
        }
    }

    /// Struct fields of a Move object, if content was requested
    pub fn object_fields(&self) -> Option<&serde_json::Map<String, Value>> {
        self.data
            .as_ref()?
            .content
            .as_ref()?
            .get("fields")?
            .as_object()
    }
}

/// Filter applied to owned-object queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectFilter {
    StructType(String),
    ObjectIds(Vec<ObjectId>),
}

impl ObjectFilter {
    pub fn matches(&self, object_id: &ObjectId, type_: &str) -> bool {
        match self {
            ObjectFilter::StructType(struct_type) => type_ == struct_type,
            ObjectFilter::ObjectIds(ids) => ids.contains(object_id),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectResponseQuery {
    pub filter: Option<ObjectFilter>,
    pub options: ObjectDataOptions,
}

impl ObjectResponseQuery {
    pub fn struct_type(struct_type: impl Into<String>, options: ObjectDataOptions) -> Self {
        Self {
            filter: Some(ObjectFilter::StructType(struct_type.into())),
            options,
        }
    }
}

/// Which parts of a transaction response to return
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionResponseOptions {
    pub show_input: bool,
    pub show_effects: bool,
    pub show_object_changes: bool,
}

impl TransactionResponseOptions {
    /// Effects only, the default for wallet-driven execution
    pub fn effects() -> Self {
        Self {
            show_effects: true,
            ..Self::default()
        }
    }
}

/// Outcome of executing a transaction on chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ExecutionStatus {
    Success,
    Failure { error: String },
}

impl ExecutionStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionStatus::Success)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEffects {
    pub status: ExecutionStatus,
    pub created: Vec<ObjectRef>,
    pub mutated: Vec<ObjectRef>,
    pub deleted: Vec<ObjectId>,
}

/// A created or mutated object as seen by the transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ObjectChange {
    #[serde(rename_all = "camelCase")]
    Created {
        object_id: ObjectId,
        object_type: String,
        owner: Owner,
        version: SequenceNumber,
    },
    #[serde(rename_all = "camelCase")]
    Mutated {
        object_id: ObjectId,
        object_type: String,
        owner: Owner,
        version: SequenceNumber,
    },
    #[serde(rename_all = "camelCase")]
    Deleted { object_id: ObjectId },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub digest: Digest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effects: Option<TransactionEffects>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_changes: Option<Vec<ObjectChange>>,
    pub timestamp_ms: u64,
}

impl TransactionResponse {
    /// `None` when effects were not requested
    pub fn succeeded(&self) -> Option<bool> {
        self.effects.as_ref().map(|effects| effects.status.is_success())
    }
}
