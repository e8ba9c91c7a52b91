//! Deployment configuration for the contracts.
//!
//! Settings here are fixed when the chaincode is instantiated. No
//! invocation argument can change them: the organizations that must
//! jointly endorse writes to a finalized asset are part of the deployment,
//! not of the call.
//!
//! ```yaml
//! finalize_endorsers: [Org1MSP, Org2MSP]
//! endorser_role: PEER
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use prov_core::MspId;
use prov_ledger::{EndorsementPolicy, RoleType};

/// Endorsers used when no configuration is supplied.
pub const DEFAULT_FINALIZE_ENDORSERS: [&str; 2] = ["Org1MSP", "Org2MSP"];

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The YAML document could not be parsed.
    #[error("invalid contract config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Joint endorsement needs at least two organizations.
    #[error("finalize_endorsers must list at least two organizations, got {count}")]
    TooFewEndorsers {
        /// Number of distinct organizations given.
        count: usize,
    },

    /// An organization is listed twice.
    #[error("finalize_endorsers lists {0} more than once")]
    DuplicateEndorser(String),

    /// An entry is not a valid MSP id.
    #[error("finalize_endorsers entry {0:?} is not a valid MSP id")]
    InvalidEndorser(String),
}

/// Contract deployment settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContractConfig {
    /// Organizations whose joint endorsement a finalized asset requires.
    pub finalize_endorsers: Vec<String>,
    /// Principal role required of each endorsing organization.
    pub endorser_role: RoleType,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            finalize_endorsers: DEFAULT_FINALIZE_ENDORSERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            endorser_role: RoleType::Peer,
        }
    }
}

impl ContractConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(doc: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(doc)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the endorser list and return it as MSP ids.
    pub fn validate(&self) -> Result<Vec<MspId>, ConfigError> {
        let mut seen = BTreeSet::new();
        let mut ids = Vec::with_capacity(self.finalize_endorsers.len());
        for raw in &self.finalize_endorsers {
            let id = MspId::new(raw.trim())
                .map_err(|_| ConfigError::InvalidEndorser(raw.clone()))?;
            if !seen.insert(id.clone()) {
                return Err(ConfigError::DuplicateEndorser(id.to_string()));
            }
            ids.push(id);
        }
        if ids.len() < 2 {
            return Err(ConfigError::TooFewEndorsers { count: ids.len() });
        }
        Ok(ids)
    }

    /// The key-level policy declared on every finalized asset.
    pub fn finalize_policy(&self) -> Result<EndorsementPolicy, ConfigError> {
        let endorsers = self.validate()?;
        let mut policy = EndorsementPolicy::new();
        policy.add_orgs(self.endorser_role, &endorsers);
        Ok(policy)
    }
}
