//! # prov-contracts: Provenance Ledger Contracts
//!
//! Two independent state machines persisted as JSON records in the world
//! state of a [`prov_ledger::LedgerStub`]:
//!
//! - **asset** (`asset.rs`): [`AssetContract`], OPEN → CLOSED with an
//!   append-only event history. Finalize emits `AssetFinalized` and locks
//!   the key under a joint endorsement policy.
//! - **product** (`product.rs`): [`ProductContract`], ACTIVE → COMPLETED
//!   with an append-only custody chain. Complete emits `ProductCompleted`.
//! - **chaincode** (`chaincode.rs`): [`Chaincode`], routing by function
//!   name for hosts that deliver string arguments.
//! - **config** (`config.rs`): [`ContractConfig`], deployment settings.
//!
//! Contracts hold no ledger state. Every operation loads what it needs
//! through the [`prov_ledger::TransactionContext`] it is given, and every
//! failure leaves the ledger unchanged.

pub mod asset;
pub mod chaincode;
pub mod config;
pub mod product;
mod store;

pub use asset::{AssetContract, AssetFinalized, AssetRecord, AssetStatus};
pub use chaincode::{Chaincode, ContractFunction};
pub use config::{ConfigError, ContractConfig};
pub use product::{
    CustodyEvent, FarmerDetails, ProductCompleted, ProductContract, ProductDetails, ProductRecord,
    ProductStatus,
};
