//! A CLI session: one chaincode deployment bound to one snapshot file.
//!
//! Every command reloads the snapshot, so each CLI run is one invocation
//! against the last committed state. Submitted invocations save the
//! snapshot only after the contract succeeds; evaluated ones never write.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use prov_contracts::Chaincode;
use prov_core::ContractError;
use prov_ledger::{ClientIdentity, LedgerSnapshot, MemoryLedger, MemoryTxContext};

use crate::config::CliConfig;

pub struct Session {
    ledger_path: PathBuf,
    identity: ClientIdentity,
    chaincode: Chaincode,
}

impl Session {
    pub fn open(config: &CliConfig) -> Result<Self> {
        let chaincode = Chaincode::new(&config.contract).context("invalid contract config")?;
        Ok(Self {
            ledger_path: config.ledger_path.clone(),
            identity: config.identity()?,
            chaincode,
        })
    }

    pub fn ledger_path(&self) -> &Path {
        &self.ledger_path
    }

    /// The committed ledger as of now.
    pub fn committed(&self) -> Result<MemoryLedger> {
        let snapshot = LedgerSnapshot::load_or_default(&self.ledger_path)
            .with_context(|| format!("failed to load ledger {}", self.ledger_path.display()))?;
        Ok(MemoryLedger::from_snapshot(snapshot))
    }

    /// Run a mutating operation and persist its effects.
    pub fn submit<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Chaincode, &mut MemoryTxContext<'_>) -> Result<T, ContractError>,
    {
        let ledger = self.committed()?;
        let out = ledger.invoke(self.identity.clone(), |ctx| f(&self.chaincode, ctx))?;
        ledger
            .snapshot()?
            .save(&self.ledger_path)
            .with_context(|| format!("failed to save ledger {}", self.ledger_path.display()))?;
        tracing::debug!(ledger = %self.ledger_path.display(), "ledger saved");
        Ok(out)
    }

    /// Run a query; nothing is persisted.
    pub fn evaluate<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Chaincode, &mut MemoryTxContext<'_>) -> Result<T, ContractError>,
    {
        let ledger = self.committed()?;
        Ok(ledger.evaluate(self.identity.clone(), |ctx| f(&self.chaincode, ctx))?)
    }
}

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
