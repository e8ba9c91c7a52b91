//! # Ledger Snapshots
//!
//! A `LedgerSnapshot` is the committed contents of a [`MemoryLedger`] as
//! a JSON document: world state, declared validation parameters, and the
//! event log. The CLI loads one before an invocation and saves it after a
//! successful mutation, which gives a single-node, file-backed ledger for
//! development and inspection.
//!
//! Values are stored as UTF-8 strings. Every value the contracts write is
//! JSON, so this keeps snapshots readable; a non-UTF-8 value cannot be
//! snapshotted and is reported with its key.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::memory::{ChaincodeEvent, MemoryLedger, WorldState};

/// Errors reading or writing a snapshot.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Filesystem failure.
    #[error("snapshot io error at {path}: {source}")]
    Io {
        /// File involved.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The snapshot file is not valid JSON of the expected shape.
    #[error("snapshot format error: {0}")]
    Format(#[from] serde_json::Error),

    /// A stored value is not UTF-8.
    #[error("value under {key:?} is not UTF-8 and cannot be snapshotted")]
    NonUtf8 {
        /// Key holding the value.
        key: String,
    },
}

/// One committed event in snapshot form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEntry {
    /// Emitting invocation.
    pub tx_id: String,
    /// Event name.
    pub name: String,
    /// Payload as text.
    pub payload: String,
}

/// Serializable committed contents of a ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    /// World state, key → value.
    pub state: BTreeMap<String, String>,
    /// Key-level endorsement policies, key → policy.
    #[serde(default)]
    pub validation_parameters: BTreeMap<String, String>,
    /// Committed events, oldest first.
    #[serde(default)]
    pub events: Vec<EventEntry>,
}

impl LedgerSnapshot {
    /// Read a snapshot file.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Read a snapshot file, or start empty if it does not exist yet.
    pub fn load_or_default(path: &Path) -> Result<Self, SnapshotError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write the snapshot, replacing the file atomically.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let io_err = |source: std::io::Error| SnapshotError::Io {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(io_err)?;
        std::fs::rename(&tmp, path).map_err(io_err)?;
        Ok(())
    }
}

fn to_text(key: &str, bytes: &[u8]) -> Result<String, SnapshotError> {
    String::from_utf8(bytes.to_vec()).map_err(|_| SnapshotError::NonUtf8 {
        key: key.to_string(),
    })
}

impl MemoryLedger {
    /// Build a ledger holding the snapshot's committed contents.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        let world = WorldState {
            state: snapshot
                .state
                .into_iter()
                .map(|(k, v)| (k, v.into_bytes()))
                .collect(),
            validation_parameters: snapshot
                .validation_parameters
                .into_iter()
                .map(|(k, v)| (k, v.into_bytes()))
                .collect(),
            events: snapshot
                .events
                .into_iter()
                .map(|e| ChaincodeEvent {
                    tx_id: e.tx_id,
                    name: e.name,
                    payload: e.payload.into_bytes(),
                })
                .collect(),
            ..WorldState::default()
        };
        Self::from_world(world)
    }

    /// Capture the committed contents.
    pub fn snapshot(&self) -> Result<LedgerSnapshot, SnapshotError> {
        self.read_world(|world| -> Result<LedgerSnapshot, SnapshotError> {
            let state: BTreeMap<String, String> = world
                .state
                .iter()
                .map(|(k, v)| Ok((k.clone(), to_text(k, v)?)))
                .collect::<Result<_, SnapshotError>>()?;
            let validation_parameters: BTreeMap<String, String> = world
                .validation_parameters
                .iter()
                .map(|(k, v)| Ok((k.clone(), to_text(k, v)?)))
                .collect::<Result<_, SnapshotError>>()?;
            let events: Vec<EventEntry> = world
                .events
                .iter()
                .map(|e| {
                    Ok(EventEntry {
                        tx_id: e.tx_id.clone(),
                        name: e.name.clone(),
                        payload: to_text(&e.name, &e.payload)?,
                    })
                })
                .collect::<Result<_, SnapshotError>>()?;
            Ok(LedgerSnapshot {
                state,
                validation_parameters,
                events,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ClientIdentity, TransactionContext};
    use prov_core::MspId;

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ledger.json");

        let ledger = MemoryLedger::new();
        let caller = ClientIdentity::new(MspId::new("Org1MSP").unwrap(), "t");
        ledger
            .invoke(caller, |ctx| {
                ctx.stub_mut().put_state("A1", br#"{"id":"A1"}"#.to_vec())?;
                ctx.stub_mut().set_event("Made", br#"{"id":"A1"}"#.to_vec())?;
                ctx.stub_mut()
                    .set_state_validation_parameter("A1", b"{}".to_vec())?;
                Ok(())
            })
            .unwrap();

        ledger.snapshot().unwrap().save(&path).unwrap();
        let restored = MemoryLedger::from_snapshot(LedgerSnapshot::load(&path).unwrap());

        assert_eq!(restored.get("A1"), Some(br#"{"id":"A1"}"#.to_vec()));
        assert_eq!(restored.validation_parameter("A1"), Some(b"{}".to_vec()));
        assert_eq!(restored.events_named("Made").len(), 1);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let snap = LedgerSnapshot::load_or_default(&dir.path().join("absent.json")).unwrap();
        assert_eq!(snap, LedgerSnapshot::default());
        assert!(LedgerSnapshot::load(&dir.path().join("absent.json")).is_err());
    }

    #[test]
    fn non_utf8_value_reported_with_key() {
        let ledger = MemoryLedger::new();
        ledger.seed("bin", vec![0xff, 0xfe]);
        match ledger.snapshot() {
            Err(SnapshotError::NonUtf8 { key }) => assert_eq!(key, "bin"),
            other => panic!("expected NonUtf8, got {other:?}"),
        }
    }

    #[test]
    fn malformed_file_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        std::fs::write(&path, "[1,2,3]").unwrap();
        assert!(matches!(
            LedgerSnapshot::load(&path),
            Err(SnapshotError::Format(_))
        ));
    }
}
