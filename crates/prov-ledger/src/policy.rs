//! # Key-Level Endorsement Policies
//!
//! A validation parameter attached to a single key overrides the
//! chaincode-wide endorsement policy for future writes to that key. The
//! policies built here require a signature from *every* listed
//! organization (`n` out of `n`), which is what makes a finalized record
//! require joint endorsement.
//!
//! ## Wire form
//!
//! ```json
//! {"version":0,
//!  "rule":{"nOutOf":{"n":2,"rules":[{"signedBy":0},{"signedBy":1}]}},
//!  "identities":[{"mspId":"Org1MSP","role":"PEER"},{"mspId":"Org2MSP","role":"PEER"}]}
//! ```
//!
//! Identities are listed in MSP id order, so one set of organizations
//! always produces the same bytes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use prov_core::MspId;

/// Which principals of an organization may endorse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoleType {
    /// Any member of the organization.
    Member,
    /// Only peers of the organization.
    Peer,
}

impl std::fmt::Display for RoleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Member => "MEMBER",
            Self::Peer => "PEER",
        })
    }
}

/// Errors building or parsing a policy.
#[derive(Error, Debug)]
pub enum PolicyError {
    /// A policy with no organizations cannot be satisfied.
    #[error("endorsement policy lists no organizations")]
    Empty,

    /// The bytes are not a policy this builder produces.
    #[error("malformed endorsement policy: {0}")]
    Malformed(String),

    /// JSON encoding or decoding failed.
    #[error("endorsement policy encoding: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct PolicyEnvelope {
    version: u32,
    rule: PolicyRule,
    identities: Vec<PolicyIdentity>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PolicyRule {
    n_out_of: NOutOf,
}

#[derive(Debug, Serialize, Deserialize)]
struct NOutOf {
    n: usize,
    rules: Vec<SignedBy>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignedBy {
    signed_by: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PolicyIdentity {
    msp_id: MspId,
    role: RoleType,
}

/// Builder for an all-of-N key-level endorsement policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndorsementPolicy {
    orgs: BTreeMap<MspId, RoleType>,
}

impl EndorsementPolicy {
    /// An empty policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a policy previously produced by [`EndorsementPolicy::policy`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PolicyError> {
        let envelope: PolicyEnvelope = serde_json::from_slice(bytes)?;
        let identities = envelope.identities;
        let rules = envelope.rule.n_out_of.rules;
        if envelope.rule.n_out_of.n != identities.len() || rules.len() != identities.len() {
            return Err(PolicyError::Malformed(format!(
                "expected {n}-of-{n} over listed identities, got {}-of-{} with {} identities",
                envelope.rule.n_out_of.n,
                rules.len(),
                identities.len(),
                n = identities.len(),
            )));
        }
        if let Some(bad) = rules.iter().find(|r| r.signed_by >= identities.len()) {
            return Err(PolicyError::Malformed(format!(
                "rule references identity {} of {}",
                bad.signed_by,
                identities.len()
            )));
        }
        let orgs = identities
            .into_iter()
            .map(|identity| (identity.msp_id, identity.role))
            .collect();
        Ok(Self { orgs })
    }

    /// Require endorsement from each of `msp_ids` with `role`.
    pub fn add_orgs(&mut self, role: RoleType, msp_ids: &[MspId]) -> &mut Self {
        for msp in msp_ids {
            self.orgs.insert(msp.clone(), role);
        }
        self
    }

    /// Stop requiring endorsement from `msp_ids`.
    pub fn del_orgs(&mut self, msp_ids: &[MspId]) -> &mut Self {
        for msp in msp_ids {
            self.orgs.remove(msp);
        }
        self
    }

    /// Organizations whose endorsement is required, in MSP id order.
    pub fn list_orgs(&self) -> Vec<MspId> {
        self.orgs.keys().cloned().collect()
    }

    /// Role required of `msp_id`, if it is listed.
    pub fn role_of(&self, msp_id: &MspId) -> Option<RoleType> {
        self.orgs.get(msp_id).copied()
    }

    /// Serialize to the validation-parameter bytes.
    pub fn policy(&self) -> Result<Vec<u8>, PolicyError> {
        if self.orgs.is_empty() {
            return Err(PolicyError::Empty);
        }
        let identities: Vec<PolicyIdentity> = self
            .orgs
            .iter()
            .map(|(msp_id, role)| PolicyIdentity {
                msp_id: msp_id.clone(),
                role: *role,
            })
            .collect();
        let envelope = PolicyEnvelope {
            version: 0,
            rule: PolicyRule {
                n_out_of: NOutOf {
                    n: identities.len(),
                    rules: (0..identities.len())
                        .map(|signed_by| SignedBy { signed_by })
                        .collect(),
                },
            },
            identities,
        };
        Ok(serde_json::to_vec(&envelope)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msp(s: &str) -> MspId {
        MspId::new(s).unwrap()
    }

    #[test]
    fn two_org_policy_wire_form() {
        let mut ep = EndorsementPolicy::new();
        ep.add_orgs(RoleType::Peer, &[msp("Org2MSP"), msp("Org1MSP")]);
        let bytes = ep.policy().unwrap();
        assert_eq!(
            std::str::from_utf8(&bytes).unwrap(),
            r#"{"version":0,"rule":{"nOutOf":{"n":2,"rules":[{"signedBy":0},{"signedBy":1}]}},"identities":[{"mspId":"Org1MSP","role":"PEER"},{"mspId":"Org2MSP","role":"PEER"}]}"#
        );
    }

    #[test]
    fn empty_policy_rejected() {
        assert!(matches!(EndorsementPolicy::new().policy(), Err(PolicyError::Empty)));
    }

    #[test]
    fn parse_round_trip() {
        let mut ep = EndorsementPolicy::new();
        ep.add_orgs(RoleType::Member, &[msp("RetailMSP")])
            .add_orgs(RoleType::Peer, &[msp("FarmMSP")]);
        let parsed = EndorsementPolicy::from_bytes(&ep.policy().unwrap()).unwrap();
        assert_eq!(parsed, ep);
        assert_eq!(parsed.role_of(&msp("RetailMSP")), Some(RoleType::Member));
    }

    #[test]
    fn del_orgs_removes() {
        let mut ep = EndorsementPolicy::new();
        ep.add_orgs(RoleType::Peer, &[msp("Org1MSP"), msp("Org2MSP")]);
        ep.del_orgs(&[msp("Org1MSP")]);
        assert_eq!(ep.list_orgs(), vec![msp("Org2MSP")]);
    }

    #[test]
    fn rejects_partial_threshold() {
        let bytes = br#"{"version":0,"rule":{"nOutOf":{"n":1,"rules":[{"signedBy":0},{"signedBy":1}]}},"identities":[{"mspId":"A","role":"PEER"},{"mspId":"B","role":"PEER"}]}"#;
        assert!(matches!(
            EndorsementPolicy::from_bytes(bytes),
            Err(PolicyError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_rule() {
        let bytes = br#"{"version":0,"rule":{"nOutOf":{"n":1,"rules":[{"signedBy":3}]}},"identities":[{"mspId":"A","role":"PEER"}]}"#;
        assert!(EndorsementPolicy::from_bytes(bytes).is_err());
    }
}
