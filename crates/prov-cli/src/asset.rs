//! # Asset Subcommand
//!
//! Asset lifecycle operations against the session ledger.
//!
//! - `create`: Create an OPEN asset.
//! - `append` / `update`: Append an event to an OPEN asset.
//! - `finalize`: Close an asset with a consumer receipt hash.
//! - `read`: Print the stored asset.
//! - `exists`: Print `true` or `false`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use prov_contracts::AssetRecord;
use prov_core::{sha256_hex, CanonicalBytes};

use crate::session::{print_json, Session};

/// Arguments for the `prov asset` subcommand.
#[derive(Args, Debug)]
pub struct AssetArgs {
    #[command(subcommand)]
    pub command: AssetCommand,
}

/// Asset subcommands.
#[derive(Subcommand, Debug)]
pub enum AssetCommand {
    /// Create a new asset in OPEN state.
    Create {
        /// Asset identifier.
        #[arg(long)]
        id: String,
        /// Owning party.
        #[arg(long)]
        owner: String,
        /// Opaque metadata hash to store.
        #[arg(long, conflicts_with = "metadata_file")]
        metadata_hash: Option<String>,
        /// JSON metadata document; its canonical SHA-256 becomes the hash.
        #[arg(long)]
        metadata_file: Option<PathBuf>,
    },

    /// Append an event to an OPEN asset.
    Append {
        #[arg(long)]
        id: String,
        /// Event payload, stored verbatim.
        #[arg(long)]
        event: String,
    },

    /// Same as `append`.
    Update {
        #[arg(long)]
        id: String,
        #[arg(long)]
        event: String,
    },

    /// Finalize an OPEN asset (OPEN → CLOSED).
    Finalize {
        #[arg(long)]
        id: String,
        /// Consumer receipt hash to record.
        #[arg(long)]
        receipt_hash: String,
    },

    /// Show the stored asset.
    Read {
        #[arg(long)]
        id: String,
    },

    /// Report whether the asset exists.
    Exists {
        #[arg(long)]
        id: String,
    },
}

/// Execute the asset subcommand.
pub fn run_asset(args: &AssetArgs, session: &Session) -> Result<u8> {
    match &args.command {
        AssetCommand::Create {
            id,
            owner,
            metadata_hash,
            metadata_file,
        } => {
            let hash = match (metadata_hash, metadata_file) {
                (Some(h), _) => h.clone(),
                (None, Some(path)) => metadata_digest(path)?,
                (None, None) => String::new(),
            };
            print_json(&cmd_create(session, id, owner, &hash)?)?;
        }
        AssetCommand::Append { id, event } | AssetCommand::Update { id, event } => {
            print_json(&cmd_append(session, id, event)?)?;
        }
        AssetCommand::Finalize { id, receipt_hash } => {
            print_json(&cmd_finalize(session, id, receipt_hash)?)?;
        }
        AssetCommand::Read { id } => print_json(&cmd_read(session, id)?)?,
        AssetCommand::Exists { id } => print_json(&cmd_exists(session, id)?)?,
    }
    Ok(0)
}

/// SHA-256 hex of the JCS-canonical form of the JSON document at `path`.
pub fn metadata_digest(path: &Path) -> Result<String> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read metadata {}", path.display()))?;
    let canonical = CanonicalBytes::from_json_str(&raw)
        .with_context(|| format!("metadata {} is not valid JSON", path.display()))?;
    Ok(sha256_hex(&canonical))
}

fn cmd_create(session: &Session, id: &str, owner: &str, hash: &str) -> Result<AssetRecord> {
    session.submit(|cc, ctx| cc.assets().create_asset(ctx, id, owner, hash))
}

fn cmd_append(session: &Session, id: &str, event: &str) -> Result<AssetRecord> {
    session.submit(|cc, ctx| cc.assets().append_event(ctx, id, event))
}

fn cmd_finalize(session: &Session, id: &str, receipt_hash: &str) -> Result<AssetRecord> {
    session.submit(|cc, ctx| cc.assets().finalize_asset(ctx, id, receipt_hash))
}

fn cmd_read(session: &Session, id: &str) -> Result<AssetRecord> {
    session.evaluate(|cc, ctx| cc.assets().read_asset(ctx, id))
}

fn cmd_exists(session: &Session, id: &str) -> Result<bool> {
    session.evaluate(|cc, ctx| cc.assets().asset_exists(ctx, id))
}
