//! Common type definitions

use crate::error::{KioskError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of an object id or address in bytes
pub const ADDRESS_LENGTH: usize = 32;

/// Package that hosts the kiosk module
pub const SUI_FRAMEWORK: &str = "0x2";

/// Fully qualified kiosk module path
pub const KIOSK_MODULE: &str = "0x2::kiosk";

/// Struct type of the Kiosk object
pub const KIOSK_TYPE: &str = "0x2::kiosk::Kiosk";

/// Struct type of the capability that grants ownership of a Kiosk
pub const KIOSK_OWNER_CAP: &str = "0x2::kiosk::KioskOwnerCap";

/// Dynamic field key type suffix for items placed in a Kiosk
pub const KIOSK_ITEM: &str = "kiosk::Item";

/// Dynamic field key type suffix for listings
pub const KIOSK_LISTING: &str = "kiosk::Listing";

macro_rules! hex_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a string as-is, without normalization
            pub fn new<T: Into<String>>(value: T) -> Self {
                Self(value.into())
            }

            /// Parse user input into the canonical form: lowercase, `0x`-prefixed,
            /// left-padded to 32 bytes.
            pub fn parse(input: &str) -> Result<Self> {
                normalize_hex(input).map(Self)
            }

            /// Build from raw bytes
            pub fn from_bytes(bytes: [u8; ADDRESS_LENGTH]) -> Self {
                Self(format!("0x{}", hex::encode(bytes)))
            }

            /// Get as string
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl std::str::FromStr for $name {
            type Err = KioskError;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse(s)
            }
        }
    };
}

hex_id!(
    /// Identifier of an on-chain object
    ObjectId
);

hex_id!(
    /// Account address
    SuiAddress
);

impl From<SuiAddress> for ObjectId {
    fn from(address: SuiAddress) -> Self {
        ObjectId(address.0)
    }
}

fn normalize_hex(input: &str) -> Result<String> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.is_empty() || digits.len() > ADDRESS_LENGTH * 2 {
        return Err(KioskError::invalid_argument(format!(
            "expected 1 to {} hex digits, got {:?}",
            ADDRESS_LENGTH * 2,
            input
        )));
    }
    if !crate::utils::is_valid_hex(digits) {
        return Err(KioskError::invalid_argument(format!("not a hex string: {:?}", input)));
    }

    Ok(format!("0x{:0>width$}", digits.to_lowercase(), width = ADDRESS_LENGTH * 2))
}

/// Object version
pub type SequenceNumber = u64;

/// Object or transaction digest
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest(pub String);

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to an owned or immutable object at a specific version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRef {
    pub object_id: ObjectId,
    pub version: SequenceNumber,
    pub digest: Digest,
}

/// Reference to a shared object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedObjectRef {
    pub object_id: ObjectId,
    pub initial_shared_version: SequenceNumber,
    pub mutable: bool,
}

/// Ownership of an object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    AddressOwner(SuiAddress),
    ObjectOwner(ObjectId),
    Shared { initial_shared_version: SequenceNumber },
    Immutable,
}

impl Owner {
    pub fn is_shared(&self) -> bool {
        matches!(self, Owner::Shared { .. })
    }
}
