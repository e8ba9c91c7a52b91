//! # CLI Configuration
//!
//! Resolved in three layers, later layers winning:
//!
//! 1. YAML file given with `--config` (or built-in defaults).
//! 2. Environment: `PROV_LEDGER`, `PROV_MSP_ID`, `PROV_CLIENT_ID`.
//! 3. Explicit flags (`--ledger`, `--msp-id`), applied by the binary.
//!
//! ```yaml
//! ledger_path: .prov/ledger.json
//! msp_id: Org1MSP
//! client_id: farmer1
//! contract:
//!   finalize_endorsers: [Org1MSP, Org2MSP]
//!   endorser_role: PEER
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use prov_contracts::ContractConfig;
use prov_core::MspId;
use prov_ledger::ClientIdentity;

pub const ENV_LEDGER: &str = "PROV_LEDGER";
pub const ENV_MSP_ID: &str = "PROV_MSP_ID";
pub const ENV_CLIENT_ID: &str = "PROV_CLIENT_ID";

/// Settings for one CLI run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Snapshot file holding the ledger.
    pub ledger_path: PathBuf,
    /// Organization the caller acts for.
    pub msp_id: String,
    /// Caller identity within the organization.
    pub client_id: String,
    /// Contract deployment settings.
    pub contract: ContractConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            ledger_path: PathBuf::from(".prov").join("ledger.json"),
            msp_id: "Org1MSP".to_string(),
            client_id: "cli-user".to_string(),
            contract: ContractConfig::default(),
        }
    }
}

impl CliConfig {
    /// Parse a YAML config file.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config
            .contract
            .validate()
            .with_context(|| format!("invalid contract section in {}", path.display()))?;
        Ok(config)
    }

    /// File (if any), then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_yaml_file(p)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Override fields from `lookup`. Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(v) = get(ENV_LEDGER) {
            self.ledger_path = PathBuf::from(v);
        }
        if let Some(v) = get(ENV_MSP_ID) {
            self.msp_id = v;
        }
        if let Some(v) = get(ENV_CLIENT_ID) {
            self.client_id = v;
        }
    }

    /// The identity invocations are submitted under.
    pub fn identity(&self) -> Result<ClientIdentity> {
        let msp_id = MspId::new(self.msp_id.as_str()).context("invalid msp_id")?;
        Ok(ClientIdentity::new(msp_id, self.client_id.as_str()))
    }
}
