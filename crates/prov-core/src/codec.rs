//! # Record Codec: Ledger Bytes for Records
//!
//! Records are stored as compact JSON objects whose keys appear in struct
//! declaration order, matching the shape existing ledger data was written
//! in. Optional fields are omitted when empty (never `null`), and status
//! enums use their upper-case wire literals.
//!
//! ## Byte Stability
//!
//! `to_bytes(from_bytes(to_bytes(r)))` equals `to_bytes(r)`: field order is
//! fixed by the type, separators are compact, and every field type in a
//! record (`String`, `Vec`, `RecordedTime`, status enums) has exactly one
//! rendering. Fields the record type does not model are carried through
//! unchanged.
//!
//! This is deliberately *not* [`CanonicalBytes`](crate::CanonicalBytes):
//! JCS sorts keys, which would reorder the fields of records already on the
//! ledger.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{RecordKind, SubstrateError};

/// A record persisted under a single world-state key.
pub trait LedgerRecord: Serialize + DeserializeOwned {
    /// Which contract owns records of this type.
    const KIND: RecordKind;

    /// The world-state key of this record.
    fn key(&self) -> &str;

    /// Encode for `put_state`.
    fn to_bytes(&self) -> Result<Vec<u8>, SubstrateError> {
        encode_payload(self)
    }

    /// Decode bytes returned by `get_state` for `key`.
    ///
    /// A record whose own id differs from `key` is `Corrupt`: writing it
    /// back would land under a different key.
    fn from_bytes(key: &str, bytes: &[u8]) -> Result<Self, SubstrateError> {
        let record: Self = serde_json::from_slice(bytes).map_err(|e| SubstrateError::Corrupt {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
        if record.key() != key {
            return Err(SubstrateError::Corrupt {
                key: key.to_string(),
                reason: format!("record id {:?} does not match its key", record.key()),
            });
        }
        Ok(record)
    }
}

/// Encode any payload (record or event body) as compact JSON.
pub fn encode_payload<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, SubstrateError> {
    Ok(serde_json::to_vec(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Widget {
        id: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        note: String,
        tags: Vec<String>,
    }

    impl LedgerRecord for Widget {
        const KIND: RecordKind = RecordKind::Asset;

        fn key(&self) -> &str {
            &self.id
        }
    }

    #[test]
    fn encodes_in_declaration_order_and_compact() {
        let w = Widget {
            id: "W1".into(),
            note: String::new(),
            tags: vec!["b".into(), "a".into()],
        };
        let bytes = w.to_bytes().unwrap();
        assert_eq!(bytes, br#"{"id":"W1","tags":["b","a"]}"#);
    }

    #[test]
    fn decode_reencode_is_byte_identical() {
        let stored = br#"{"id":"W1","note":"x","tags":["z","y"]}"#;
        let w = Widget::from_bytes("W1", stored).unwrap();
        assert_eq!(w.to_bytes().unwrap(), stored.to_vec());
    }

    #[test]
    fn id_must_match_key() {
        let err = Widget::from_bytes("W1", br#"{"id":"W2","tags":[]}"#).unwrap_err();
        match err {
            SubstrateError::Corrupt { key, reason } => {
                assert_eq!(key, "W1");
                assert!(reason.contains("W2"));
            }
            other => panic!("expected Corrupt, got {other}"),
        }
    }

    #[test]
    fn undecodable_bytes_report_key() {
        let err = Widget::from_bytes("W9", b"not json").unwrap_err();
        match err {
            SubstrateError::Corrupt { key, .. } => assert_eq!(key, "W9"),
            other => panic!("expected Corrupt, got {other}"),
        }
    }
}
