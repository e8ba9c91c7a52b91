//! # Identifier Newtypes
//!
//! Newtype wrappers for every identifier that crosses the contract
//! boundary. An `AssetId` cannot be passed where a `ProductId` is
//! expected, and neither can be constructed from an empty string.
//!
//! ## Ledger key rules
//!
//! Record ids are used verbatim as world-state keys. The substrate reserves
//! keys containing U+0000 for composite keys, and an empty key cannot be
//! written at all, so both are rejected at construction.
//!
//! ## Transaction identifiers
//!
//! Custody events carry a `TransactionId` of the form `TXN-<uuid v4>`. A
//! random 128-bit value keeps two generations within the same clock tick
//! distinct. Identifiers already on the ledger in other shapes (for example
//! `TXN-1725782400000`) are still accepted when decoding.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ContractError;

/// Prefix of every generated transaction identifier.
pub const TRANSACTION_ID_PREFIX: &str = "TXN-";

fn validate_key(arg: &str, raw: String) -> Result<String, ContractError> {
    if raw.trim().is_empty() {
        return Err(ContractError::invalid_argument(arg, "must not be empty"));
    }
    if raw.contains('\u{0}') {
        return Err(ContractError::invalid_argument(
            arg,
            "must not contain U+0000 (reserved for composite keys)",
        ));
    }
    Ok(raw)
}

macro_rules! key_newtype {
    ($(#[$meta:meta])* $name:ident, $arg:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and wrap an identifier.
            pub fn new(raw: impl Into<String>) -> Result<Self, ContractError> {
                validate_key($arg, raw.into()).map(Self)
            }

            /// The identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ContractError;

            fn try_from(raw: String) -> Result<Self, Self::Error> {
                Self::new(raw)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

key_newtype!(
    /// Ledger key of an asset record.
    AssetId,
    "id"
);

key_newtype!(
    /// Ledger key of a product record.
    ProductId,
    "productId"
);

key_newtype!(
    /// Membership service provider id of an organization (e.g. `Org1MSP`).
    MspId,
    "mspId"
);

/// Identifier of a single custody event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Generate a fresh `TXN-<uuid v4>` identifier.
    pub fn generate() -> Self {
        Self(format!("{TRANSACTION_ID_PREFIX}{}", Uuid::new_v4()))
    }

    /// Wrap an identifier read from existing ledger data.
    pub fn from_existing(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
