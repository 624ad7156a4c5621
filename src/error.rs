//! Error types for the kiosk library

use thiserror::Error;

/// Result type alias for kiosk operations
pub type Result<T> = std::result::Result<T, KioskError>;

/// Main error type for kiosk operations
#[derive(Error, Debug)]
pub enum KioskError {
    /// Errors raised by the RPC provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Wallet signing errors
    #[error("Signing error: {0}")]
    Signing(#[from] SigningError),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// A value could not be turned into a transaction argument
    #[error("Invalid argument type: {0}")]
    InvalidArgument(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with message
    #[error("{0}")]
    Generic(String),
}

/// Provider-specific error types
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Object does not exist on the ledger
    #[error("Object not found: {object_id}")]
    ObjectNotFound { object_id: String },

    /// Pagination cursor is not known to the provider
    #[error("Invalid cursor: {cursor}")]
    InvalidCursor { cursor: String },

    /// Submitted transaction could not be decoded
    #[error("Malformed transaction: {reason}")]
    MalformedTransaction { reason: String },

    /// Signature does not match the transaction sender
    #[error("Invalid signature for sender {sender}")]
    InvalidSignature { sender: String },

    /// Transport or remote failure
    #[error("Request failed: {reason}")]
    RequestFailed { reason: String },
}

/// Wallet signing error types
#[derive(Error, Debug)]
pub enum SigningError {
    /// The user or the wallet declined to sign
    #[error("Signing rejected: {reason}")]
    Rejected { reason: String },

    /// Transaction has no sender set
    #[error("Transaction sender is not set")]
    MissingSender,

    /// Key material could not be parsed
    #[error("Invalid private key: {reason}")]
    InvalidPrivateKey { reason: String },

    /// Signature bytes could not be parsed
    #[error("Malformed signature: {reason}")]
    MalformedSignature { reason: String },
}

/// Serialization error types
#[derive(Error, Debug)]
pub enum SerializationError {
    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary serialization error
    #[error("Binary serialization error: {0}")]
    Binary(#[from] bincode::Error),

    /// Base64 decoding error
    #[error("Base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Missing required field
    #[error("Missing required field: {field}")]
    MissingField { field: String },
}

impl KioskError {
    /// Create an invalid argument error
    pub fn invalid_argument<T: Into<String>>(msg: T) -> Self {
        KioskError::InvalidArgument(msg.into())
    }

    /// Create a validation error
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        KioskError::Validation(msg.into())
    }

    /// Create a configuration error
    pub fn config<T: Into<String>>(msg: T) -> Self {
        KioskError::Config(msg.into())
    }

    /// Create a generic error
    pub fn generic<T: Into<String>>(msg: T) -> Self {
        KioskError::Generic(msg.into())
    }
}

impl From<serde_json::Error> for KioskError {
    fn from(err: serde_json::Error) -> Self {
        KioskError::Serialization(SerializationError::Json(err))
    }
}

impl From<bincode::Error> for KioskError {
    fn from(err: bincode::Error) -> Self {
        KioskError::Serialization(SerializationError::Binary(err))
    }
}

impl From<base64::DecodeError> for KioskError {
    fn from(err: base64::DecodeError) -> Self {
        KioskError::Serialization(SerializationError::Base64(err))
    }
}
