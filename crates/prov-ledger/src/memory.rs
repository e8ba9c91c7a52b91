//! # In-Memory Ledger Substrate
//!
//! `MemoryLedger` holds an ordered world state and runs one invocation at a
//! time. Each invocation gets a [`MemoryTxContext`] whose stub buffers
//! puts, the event, and validation parameters in a private write set:
//!
//! - `invoke` takes the exclusive lock, runs the closure, and on `Ok`
//!   applies the whole write set. On `Err` the write set is dropped and the
//!   committed state is untouched.
//! - `evaluate` takes the shared lock and always drops the write set, the
//!   way a query is evaluated without being submitted for ordering.
//!
//! Reads see the invocation's own puts. Range scans see committed state
//! only, as on a replicated ledger where the scan is part of the read set.
//!
//! Faults can be injected per substrate call to exercise the
//! all-or-nothing path.
//!
//! The committed event log is append-only and unbounded, and a snapshot
//! carries all of it. This substrate is for development and tests, not
//! for long-running ledgers.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use prov_core::{ContractError, SubstrateError, Timestamp};

use crate::context::{ClientIdentity, LedgerStub, StateEntry, StateIter, TransactionContext};

/// A substrate call that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Fault {
    /// `get_state` fails.
    GetState,
    /// `put_state` fails.
    PutState,
    /// `get_state_by_range` fails.
    RangeScan,
    /// `set_event` fails.
    SetEvent,
    /// `set_state_validation_parameter` fails.
    SetValidationParameter,
}

/// An event published by a committed invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChaincodeEvent {
    /// The invocation that emitted it.
    pub tx_id: String,
    /// Event name, e.g. `AssetFinalized`.
    pub name: String,
    /// Raw payload bytes.
    pub payload: Vec<u8>,
}

#[derive(Debug, Default)]
pub(crate) struct WorldState {
    pub(crate) state: BTreeMap<String, Vec<u8>>,
    pub(crate) validation_parameters: BTreeMap<String, Vec<u8>>,
    pub(crate) events: Vec<ChaincodeEvent>,
    pub(crate) faults: BTreeSet<Fault>,
    pub(crate) pinned_time: Option<Timestamp>,
}

/// Thread-safe in-memory ledger. Clones share the same world state.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    inner: Arc<RwLock<WorldState>>,
}

impl MemoryLedger {
    /// An empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_world(world: WorldState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(world)),
        }
    }

    pub(crate) fn read_world<R>(&self, f: impl FnOnce(&WorldState) -> R) -> R {
        f(&self.inner.read())
    }

    /// Run a mutating invocation; commit its effects only if it succeeds.
    pub fn invoke<T, F>(&self, identity: ClientIdentity, f: F) -> Result<T, ContractError>
    where
        F: FnOnce(&mut MemoryTxContext<'_>) -> Result<T, ContractError>,
    {
        let mut world = self.inner.write();
        let (result, effects) = execute(&world, identity, f);
        match result {
            Ok(value) => {
                tracing::debug!(
                    tx_id = %effects.tx_id,
                    writes = effects.writes.len(),
                    event = effects.event.as_ref().map(|(name, _)| name.as_str()),
                    "committing invocation"
                );
                effects.apply(&mut world);
                Ok(value)
            }
            Err(e) => {
                tracing::debug!(tx_id = %effects.tx_id, error = %e, "invocation failed; discarding write set");
                Err(e)
            }
        }
    }

    /// Run a query invocation; its effects are never committed.
    pub fn evaluate<T, F>(&self, identity: ClientIdentity, f: F) -> Result<T, ContractError>
    where
        F: FnOnce(&mut MemoryTxContext<'_>) -> Result<T, ContractError>,
    {
        let world = self.inner.read();
        execute(&world, identity, f).0
    }

    /// Committed value under `key`.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.inner.read().state.get(key).cloned()
    }

    /// Write `value` under `key` outside any invocation, e.g. to seed
    /// legacy or corrupt data.
    pub fn seed(&self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.inner.write().state.insert(key.into(), value.into());
    }

    /// Committed validation parameter for `key`.
    pub fn validation_parameter(&self, key: &str) -> Option<Vec<u8>> {
        self.inner.read().validation_parameters.get(key).cloned()
    }

    /// All committed events, oldest first.
    pub fn events(&self) -> Vec<ChaincodeEvent> {
        self.inner.read().events.clone()
    }

    /// Committed events with the given name, oldest first.
    pub fn events_named(&self, name: &str) -> Vec<ChaincodeEvent> {
        self.inner
            .read()
            .events
            .iter()
            .filter(|e| e.name == name)
            .cloned()
            .collect()
    }

    /// Number of committed keys.
    pub fn len(&self) -> usize {
        self.inner.read().state.len()
    }

    /// True if no key has been committed.
    pub fn is_empty(&self) -> bool {
        self.inner.read().state.is_empty()
    }

    /// Make every subsequent `fault` call fail until cleared.
    pub fn inject_fault(&self, fault: Fault) {
        self.inner.write().faults.insert(fault);
    }

    /// Remove all injected faults.
    pub fn clear_faults(&self) {
        self.inner.write().faults.clear();
    }

    /// Stamp every subsequent invocation with `at` instead of the wall clock.
    pub fn pin_time(&self, at: Option<Timestamp>) {
        self.inner.write().pinned_time = at;
    }
}

struct TxEffects {
    tx_id: String,
    writes: BTreeMap<String, Vec<u8>>,
    event: Option<(String, Vec<u8>)>,
    validation_parameters: BTreeMap<String, Vec<u8>>,
}

impl TxEffects {
    fn apply(self, world: &mut WorldState) {
        world.state.extend(self.writes);
        world.validation_parameters.extend(self.validation_parameters);
        if let Some((name, payload)) = self.event {
            world.events.push(ChaincodeEvent {
                tx_id: self.tx_id,
                name,
                payload,
            });
        }
    }
}

fn execute<T, F>(
    world: &WorldState,
    identity: ClientIdentity,
    f: F,
) -> (Result<T, ContractError>, TxEffects)
where
    F: FnOnce(&mut MemoryTxContext<'_>) -> Result<T, ContractError>,
{
    let mut ctx = MemoryTxContext {
        stub: MemoryStub {
            world,
            tx_id: Uuid::new_v4().simple().to_string(),
            timestamp: world.pinned_time.unwrap_or_else(Timestamp::now),
            writes: BTreeMap::new(),
            event: None,
            validation_parameters: BTreeMap::new(),
        },
        identity,
    };
    let result = f(&mut ctx);
    let stub = ctx.stub;
    let effects = TxEffects {
        tx_id: stub.tx_id,
        writes: stub.writes,
        event: stub.event,
        validation_parameters: stub.validation_parameters,
    };
    (result, effects)
}

/// Stub for one invocation against a [`MemoryLedger`].
pub struct MemoryStub<'a> {
    world: &'a WorldState,
    tx_id: String,
    timestamp: Timestamp,
    writes: BTreeMap<String, Vec<u8>>,
    event: Option<(String, Vec<u8>)>,
    validation_parameters: BTreeMap<String, Vec<u8>>,
}

impl MemoryStub<'_> {
    fn faulted(&self, fault: Fault) -> bool {
        self.world.faults.contains(&fault)
    }
}

impl LedgerStub for MemoryStub<'_> {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>, SubstrateError> {
        if self.faulted(Fault::GetState) {
            return Err(SubstrateError::Read {
                key: key.to_string(),
                reason: "injected fault".into(),
            });
        }
        if key.is_empty() {
            return Err(SubstrateError::Read {
                key: String::new(),
                reason: "key must not be empty".into(),
            });
        }
        Ok(self
            .writes
            .get(key)
            .or_else(|| self.world.state.get(key))
            .cloned())
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), SubstrateError> {
        if self.faulted(Fault::PutState) {
            return Err(SubstrateError::Write {
                key: key.to_string(),
                reason: "injected fault".into(),
            });
        }
        if key.is_empty() {
            return Err(SubstrateError::Write {
                key: String::new(),
                reason: "key must not be empty".into(),
            });
        }
        self.writes.insert(key.to_string(), value);
        Ok(())
    }

    fn get_state_by_range(&self, start: &str, end: &str) -> Result<StateIter<'_>, SubstrateError> {
        if self.faulted(Fault::RangeScan) {
            return Err(SubstrateError::Scan("injected fault".into()));
        }
        if !start.is_empty() && !end.is_empty() && start > end {
            return Err(SubstrateError::Scan(format!(
                "start key {start:?} sorts after end key {end:?}"
            )));
        }
        let lower = if start.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Included(start)
        };
        let upper = if end.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded(end)
        };
        let iter = self
            .world
            .state
            .range::<str, _>((lower, upper))
            .map(|(key, value)| {
                Ok(StateEntry {
                    key: key.clone(),
                    value: value.clone(),
                })
            });
        Ok(Box::new(iter))
    }

    fn set_event(&mut self, name: &str, payload: Vec<u8>) -> Result<(), SubstrateError> {
        if self.faulted(Fault::SetEvent) {
            return Err(SubstrateError::Emit {
                event: name.to_string(),
                reason: "injected fault".into(),
            });
        }
        if name.is_empty() {
            return Err(SubstrateError::Emit {
                event: String::new(),
                reason: "event name must not be empty".into(),
            });
        }
        // One event per invocation; the last one set wins.
        self.event = Some((name.to_string(), payload));
        Ok(())
    }

    fn set_state_validation_parameter(
        &mut self,
        key: &str,
        policy: Vec<u8>,
    ) -> Result<(), SubstrateError> {
        if self.faulted(Fault::SetValidationParameter) {
            return Err(SubstrateError::Policy {
                key: key.to_string(),
                reason: "injected fault".into(),
            });
        }
        if key.is_empty() {
            return Err(SubstrateError::Policy {
                key: String::new(),
                reason: "key must not be empty".into(),
            });
        }
        self.validation_parameters.insert(key.to_string(), policy);
        Ok(())
    }

    fn get_state_validation_parameter(&self, key: &str) -> Result<Option<Vec<u8>>, SubstrateError> {
        Ok(self
            .validation_parameters
            .get(key)
            .or_else(|| self.world.validation_parameters.get(key))
            .cloned())
    }

    fn tx_id(&self) -> &str {
        &self.tx_id
    }

    fn tx_timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

/// Transaction context for one invocation against a [`MemoryLedger`].
pub struct MemoryTxContext<'a> {
    stub: MemoryStub<'a>,
    identity: ClientIdentity,
}

impl TransactionContext for MemoryTxContext<'_> {
    fn stub(&self) -> &dyn LedgerStub {
        &self.stub
    }

    fn stub_mut(&mut self) -> &mut dyn LedgerStub {
        &mut self.stub
    }

    fn client_identity(&self) -> &ClientIdentity {
        &self.identity
    }
}
