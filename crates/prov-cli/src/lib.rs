//! # prov-cli: Command-Line Host for the Provenance Contracts
//!
//! Provides the `prov` binary. Each run loads a ledger snapshot file, runs
//! one contract invocation against it, and saves the snapshot if the
//! invocation mutated state and succeeded.
//!
//! ## Subcommands
//!
//! - `prov asset`: Asset lifecycle (create, append, finalize, read).
//! - `prov product`: Product custody (register, transfer, complete, history, list).
//! - `prov invoke`: Raw function-name dispatch.
//! - `prov events`: Committed event log.
//! - `prov policy`: Declared key-level endorsement policy.
//!
//! ```bash
//! prov asset create --id A1 --owner alice --metadata-file meta.json
//! prov asset finalize --id A1 --receipt-hash r1
//! prov invoke GetAllProducts
//! ```

pub mod asset;
pub mod config;
pub mod invoke;
pub mod product;
pub mod session;
