//! # Error Types: Contract Error Taxonomy
//!
//! Every contract operation either succeeds completely or returns one of
//! the [`ContractError`] variants below. There is no partial success: the
//! surrounding ledger transaction discards all effects of a failed
//! invocation.
//!
//! ## Design
//!
//! - State errors carry the record kind, id, current status, and the
//!   operation that was refused.
//! - Substrate errors carry the key or event involved and the underlying
//!   reason, so a failed invocation can be diagnosed from the message alone.
//! - [`ContractError::kind`] collapses the variants to a fieldless
//!   [`ErrorKind`] for callers that only branch on the category.

use thiserror::Error;

/// The kind of record a contract operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// A generic asset tracked by the asset lifecycle contract.
    Asset,
    /// A product tracked by the provenance contract.
    Product,
}

impl RecordKind {
    /// Lowercase noun used in error messages and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Product => "product",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fieldless discriminant of [`ContractError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Creation or registration on a key that already holds a record.
    AlreadyExists,
    /// The targeted key holds no record.
    NotFound,
    /// The operation is illegal for the record's current status.
    InvalidState,
    /// An input payload or argument is malformed.
    InvalidArgument,
    /// A ledger read, write, scan, emit, or policy call failed.
    SubstrateFailure,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::AlreadyExists => "AlreadyExists",
            Self::NotFound => "NotFound",
            Self::InvalidState => "InvalidState",
            Self::InvalidArgument => "InvalidArgument",
            Self::SubstrateFailure => "SubstrateFailure",
        };
        f.write_str(s)
    }
}

/// Top-level error returned by every contract operation.
#[derive(Error, Debug)]
pub enum ContractError {
    /// A record already exists under the requested key.
    #[error("{kind} {id} already exists")]
    AlreadyExists {
        /// Kind of record that was being created.
        kind: RecordKind,
        /// The occupied key.
        id: String,
    },

    /// No record exists under the requested key.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Kind of record that was expected.
        kind: RecordKind,
        /// The missing key.
        id: String,
    },

    /// The record's status forbids the requested operation.
    #[error("{kind} {id} is {status}; {operation} not allowed")]
    InvalidState {
        /// Kind of record.
        kind: RecordKind,
        /// Record key.
        id: String,
        /// Current status, rendered as its wire literal.
        status: String,
        /// The refused operation.
        operation: &'static str,
    },

    /// An argument or payload could not be accepted.
    #[error("invalid argument {name}: {reason}")]
    InvalidArgument {
        /// Argument name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The ledger substrate failed underneath the operation.
    #[error("substrate failure: {0}")]
    Substrate(#[from] SubstrateError),
}

impl ContractError {
    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::Substrate(_) => ErrorKind::SubstrateFailure,
        }
    }

    /// Shorthand for an [`ContractError::InvalidArgument`].
    pub fn invalid_argument(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Failure of a call into the ledger substrate.
#[derive(Error, Debug)]
pub enum SubstrateError {
    /// Reading a key failed.
    #[error("read of {key:?} failed: {reason}")]
    Read {
        /// The key being read.
        key: String,
        /// Underlying reason.
        reason: String,
    },

    /// Writing a key failed.
    #[error("write of {key:?} failed: {reason}")]
    Write {
        /// The key being written.
        key: String,
        /// Underlying reason.
        reason: String,
    },

    /// A range scan failed to start or to advance.
    #[error("range scan failed: {0}")]
    Scan(String),

    /// Emitting an event failed.
    #[error("emit of event {event:?} failed: {reason}")]
    Emit {
        /// Event name.
        event: String,
        /// Underlying reason.
        reason: String,
    },

    /// Declaring a key-level validation policy failed.
    #[error("validation policy for {key:?} failed: {reason}")]
    Policy {
        /// The key whose policy was being set.
        key: String,
        /// Underlying reason.
        reason: String,
    },

    /// The caller identity could not be resolved.
    #[error("identity lookup failed: {0}")]
    Identity(String),

    /// The bytes stored under a key are not a valid record.
    #[error("stored value under {key:?} is not a valid record: {reason}")]
    Corrupt {
        /// The key holding the undecodable value.
        key: String,
        /// Decoder message.
        reason: String,
    },

    /// Encoding a record or event payload failed.
    #[error("encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// The input is not JSON.
    #[error("input is not valid JSON: {0}")]
    InvalidJson(String),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
