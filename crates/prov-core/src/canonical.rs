//! # Canonical Serialization: JCS Bytes for Digests
//!
//! `CanonicalBytes` is the sole input to [`sha256_digest`](crate::sha256_digest).
//! Off-chain documents (asset metadata, consumer receipts) are hashed
//! before their digest is written into a record as `metadataHash` or
//! `lastScanHash`. Two parties holding the same document must arrive at
//! the same digest regardless of key order or whitespace, so the document
//! is first brought into RFC 8785 (JSON Canonicalization Scheme) form:
//! sorted keys, compact separators, deterministic number rendering.
//!
//! Records themselves are never canonicalized; see [`crate::codec`].

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization.
///
/// The inner `Vec<u8>` is private; the constructors are the only way in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        Ok(Self(serde_jcs::to_vec(&value)?))
    }

    /// Parse a JSON document and canonicalize it.
    pub fn from_json_str(document: &str) -> Result<Self, CanonicalizationError> {
        let value: Value = serde_json::from_str(document)
            .map_err(|e| CanonicalizationError::InvalidJson(e.to_string()))?;
        Self::new(&value)
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_keys_compact() {
        let data = serde_json::json!({"lot": "B-7", "crop": "mango", "kg": 100});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(
            std::str::from_utf8(cb.as_bytes()).unwrap(),
            r#"{"crop":"mango","kg":100,"lot":"B-7"}"#
        );
    }

    #[test]
    fn test_nested_objects_sorted() {
        let data = serde_json::json!({"outer": {"b": 2, "a": 1}, "list": [3, 2, 1]});
        let cb = CanonicalBytes::new(&data).unwrap();
        assert_eq!(cb.as_bytes(), br#"{"list":[3,2,1],"outer":{"a":1,"b":2}}"#);
    }

    #[test]
    fn test_whitespace_and_order_insensitive() {
        let a = CanonicalBytes::from_json_str("{ \"b\" : 1,\n \"a\" : [true, null] }").unwrap();
        let b = CanonicalBytes::from_json_str(r#"{"a":[true,null],"b":1}"#).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_json_rejected() {
        let err = CanonicalBytes::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, CanonicalizationError::InvalidJson(_)));
    }

    #[test]
    fn test_unicode_passthrough() {
        let cb = CanonicalBytes::new(&serde_json::json!({"farm": "Nāshik"})).unwrap();
        assert!(std::str::from_utf8(cb.as_bytes()).unwrap().contains("Nāshik"));
    }

    #[test]
    fn test_len_and_is_empty() {
        let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        assert_eq!(cb.len(), 2);
        assert!(!cb.is_empty());
    }
}
