//! # prov-ledger: Ledger Substrate Interfaces
//!
//! The contracts in `prov-contracts` never touch storage directly. They
//! receive a [`TransactionContext`] for each invocation and reach the
//! world state, the event channel, key-level endorsement policies, and the
//! caller's identity only through it.
//!
//! ## Modules
//!
//! - **context** (`context.rs`): the [`LedgerStub`] and
//!   [`TransactionContext`] traits and [`ClientIdentity`].
//! - **policy** (`policy.rs`): [`EndorsementPolicy`], a builder for the
//!   per-key validation parameter declared when a record becomes terminal.
//! - **memory** (`memory.rs`): [`MemoryLedger`], an ordered in-memory
//!   substrate. Each invocation runs against a private write set that is
//!   committed whole on success and dropped whole on failure.
//! - **snapshot** (`snapshot.rs`): [`LedgerSnapshot`], a JSON dump of a
//!   `MemoryLedger` for file-backed use by the CLI.
//!
//! ## Guarantees a substrate must provide
//!
//! - Invocations on the same key are serialized.
//! - Puts are visible to later reads in the same invocation.
//! - Writes, the emitted event, and declared policies of one invocation
//!   commit together or not at all.

pub mod context;
pub mod memory;
pub mod policy;
pub mod snapshot;

pub use context::{ClientIdentity, LedgerStub, StateEntry, StateIter, TransactionContext};
pub use memory::{ChaincodeEvent, Fault, MemoryLedger, MemoryStub, MemoryTxContext};
pub use policy::{EndorsementPolicy, PolicyError, RoleType};
pub use snapshot::{EventEntry, LedgerSnapshot, SnapshotError};
