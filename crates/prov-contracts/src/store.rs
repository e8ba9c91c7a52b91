//! Load/store helpers shared by both contracts.
//!
//! Every operation follows the same shape: load the record (or confirm
//! absence), validate the transition, mutate in memory, encode, write back,
//! then emit. These helpers own the first and last steps and translate
//! substrate answers into the contract error taxonomy.

use serde::Serialize;

use prov_core::codec::encode_payload;
use prov_core::{ContractError, LedgerRecord};
use prov_ledger::LedgerStub;

/// True if any value is stored under `key`.
pub(crate) fn exists(stub: &dyn LedgerStub, key: &str) -> Result<bool, ContractError> {
    Ok(stub.get_state(key)?.is_some())
}

/// Fail with `AlreadyExists` if `key` is occupied.
pub(crate) fn ensure_absent<R: LedgerRecord>(
    stub: &dyn LedgerStub,
    key: &str,
) -> Result<(), ContractError> {
    if exists(stub, key)? {
        return Err(ContractError::AlreadyExists {
            kind: R::KIND,
            id: key.to_string(),
        });
    }
    Ok(())
}

/// Load and decode the record under `key`, or fail with `NotFound`.
pub(crate) fn load<R: LedgerRecord>(stub: &dyn LedgerStub, key: &str) -> Result<R, ContractError> {
    let bytes = stub.get_state(key)?.ok_or_else(|| ContractError::NotFound {
        kind: R::KIND,
        id: key.to_string(),
    })?;
    tracing::debug!(kind = %R::KIND, key, len = bytes.len(), "loaded record");
    Ok(R::from_bytes(key, &bytes)?)
}

/// Encode `record` and write it under its own key.
pub(crate) fn store<R: LedgerRecord>(
    stub: &mut dyn LedgerStub,
    record: &R,
) -> Result<(), ContractError> {
    let bytes = record.to_bytes()?;
    tracing::debug!(kind = %R::KIND, key = record.key(), len = bytes.len(), "storing record");
    stub.put_state(record.key(), bytes)?;
    Ok(())
}

/// Emit `payload` as JSON under `name`.
pub(crate) fn emit<E: Serialize>(
    stub: &mut dyn LedgerStub,
    name: &str,
    payload: &E,
) -> Result<(), ContractError> {
    stub.set_event(name, encode_payload(payload)?)?;
    Ok(())
}

/// Decode every value in the full keyspace as `R`, skipping values that
/// are not records of that type. Iterator failures are not skipped.
pub(crate) fn scan_all<R: LedgerRecord>(stub: &dyn LedgerStub) -> Result<Vec<R>, ContractError> {
    let mut records = Vec::new();
    let mut skipped = 0usize;
    for entry in stub.get_state_by_range("", "")? {
        let entry = entry?;
        match R::from_bytes(&entry.key, &entry.value) {
            Ok(record) => records.push(record),
            Err(e) => {
                skipped += 1;
                tracing::warn!(kind = %R::KIND, key = %entry.key, error = %e, "skipping undecodable value in scan");
            }
        }
    }
    tracing::debug!(kind = %R::KIND, found = records.len(), skipped, "range scan complete");
    Ok(records)
}
