//! # Transaction Context
//!
//! Call-scoped capabilities handed to every contract operation. Nothing
//! here outlives a single invocation; contracts hold no ledger state
//! between calls and reload what they need each time.

use serde::{Deserialize, Serialize};

use prov_core::{MspId, SubstrateError, Timestamp};

/// One `(key, value)` pair yielded by a range scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateEntry {
    /// World-state key.
    pub key: String,
    /// Raw stored bytes.
    pub value: Vec<u8>,
}

/// Lazy range-scan iterator. Each step may fail independently.
pub type StateIter<'a> = Box<dyn Iterator<Item = Result<StateEntry, SubstrateError>> + 'a>;

/// World-state and side-effect access for one invocation.
pub trait LedgerStub {
    /// Read the value under `key`; `None` if absent.
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, SubstrateError>;

    /// Write `value` under `key`.
    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), SubstrateError>;

    /// Scan keys in `[start, end)`. An empty bound is open on that side.
    /// Iteration order is defined by the substrate.
    fn get_state_by_range(&self, start: &str, end: &str) -> Result<StateIter<'_>, SubstrateError>;

    /// Emit a named event to off-chain listeners when the invocation commits.
    fn set_event(&mut self, name: &str, payload: Vec<u8>) -> Result<(), SubstrateError>;

    /// Declare the endorsement policy for future writes to `key`.
    fn set_state_validation_parameter(
        &mut self,
        key: &str,
        policy: Vec<u8>,
    ) -> Result<(), SubstrateError>;

    /// The endorsement policy currently declared for `key`, if any.
    fn get_state_validation_parameter(&self, key: &str) -> Result<Option<Vec<u8>>, SubstrateError>;

    /// Identifier of the invocation.
    fn tx_id(&self) -> &str;

    /// Timestamp assigned to the invocation. Identical on every replica.
    fn tx_timestamp(&self) -> Timestamp;
}

/// The caller's verified organizational identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientIdentity {
    msp_id: MspId,
    id: String,
}

impl ClientIdentity {
    /// Identity `id` issued by organization `msp_id`.
    pub fn new(msp_id: MspId, id: impl Into<String>) -> Self {
        Self {
            msp_id,
            id: id.into(),
        }
    }

    /// The caller's organization.
    pub fn msp_id(&self) -> &MspId {
        &self.msp_id
    }

    /// The caller's identity within its organization.
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Everything a contract operation may use, passed in explicitly.
pub trait TransactionContext {
    /// Read-only world-state access.
    fn stub(&self) -> &dyn LedgerStub;

    /// Mutable world-state and side-effect access.
    fn stub_mut(&mut self) -> &mut dyn LedgerStub;

    /// Identity of the submitting client.
    fn client_identity(&self) -> &ClientIdentity;
}
