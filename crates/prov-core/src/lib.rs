//! # prov-core: Foundational Types for the Provenance Ledger
//!
//! Leaf crate of the workspace. Defines the primitives every contract
//! invocation flows through: the error taxonomy callers branch on, the
//! UTC timestamp format stamped into records, identifier newtypes, the
//! JSON codec that turns records into ledger bytes, and canonical
//! content digests.
//!
//! ## Key Design Principles
//!
//! 1. **One error taxonomy.** Every failing contract operation returns a
//!    [`ContractError`] whose [`ErrorKind`] is one of `AlreadyExists`,
//!    `NotFound`, `InvalidState`, `InvalidArgument`, or `SubstrateFailure`.
//!
//! 2. **Newtype identifiers.** `AssetId`, `ProductId`, `MspId`, and
//!    `TransactionId` are validated at construction. No bare strings for
//!    ledger keys.
//!
//! 3. **UTC-only timestamps.** [`Timestamp`] renders `YYYY-MM-DDTHH:MM:SSZ`
//!    and nothing else, so every replica writes identical bytes. Stored
//!    values are read into [`RecordedTime`] and written back verbatim.
//!
//! 4. **Stable record bytes.** [`LedgerRecord`] encodes with declaration
//!    field order and compact separators; decode-then-encode is byte-identical.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `prov-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod codec;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use codec::LedgerRecord;
pub use digest::{sha256_digest, sha256_hex, ContentDigest};
pub use error::{CanonicalizationError, ContractError, ErrorKind, RecordKind, SubstrateError};
pub use identity::{AssetId, MspId, ProductId, TransactionId};
pub use temporal::{RecordedTime, Timestamp};
