//! # Asset Lifecycle Contract
//!
//! Tracks an asset from creation through an append-only event history to a
//! terminal finalization.
//!
//! ## States
//!
//! ```text
//! OPEN ──(finalize)──▶ CLOSED
//! ```
//!
//! `CLOSED` is terminal: no operation changes a closed record. Finalizing
//! records the consumer receipt hash, stamps the close time, emits
//! `AssetFinalized`, and declares a key-level endorsement policy that
//! requires every configured organization to co-sign any later write to
//! the key.

use serde::{Deserialize, Serialize};

use prov_core::{AssetId, ContractError, LedgerRecord, RecordKind, Timestamp};
use prov_ledger::{EndorsementPolicy, TransactionContext};

use crate::config::{ConfigError, ContractConfig};
use crate::store;

/// History entry written when an asset is created.
pub const CREATED: &str = "CREATED";

/// History entry written when an asset is finalized.
pub const FINALIZED: &str = "FINALIZED";

/// Name of the event emitted on finalize.
pub const ASSET_FINALIZED: &str = "AssetFinalized";

/// Lifecycle state of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssetStatus {
    /// Accepting events.
    Open,
    /// Finalized. Terminal.
    Closed,
}

impl AssetStatus {
    /// The wire literal.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
        }
    }

    /// Whether no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl std::fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An asset as stored on the ledger.
///
/// Fields are private so the history can only grow through
/// [`append_event`](Self::append_event) and [`finalize`](Self::finalize).
/// Stored fields outside this set are carried through rewrites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    id: AssetId,
    owner: String,
    status: AssetStatus,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    metadata_hash: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    events: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    closed_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    last_scan_hash: String,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl LedgerRecord for AssetRecord {
    const KIND: RecordKind = RecordKind::Asset;

    fn key(&self) -> &str {
        self.id.as_str()
    }
}

impl AssetRecord {
    /// A freshly created, open asset.
    pub fn open(id: AssetId, owner: impl Into<String>, metadata_hash: impl Into<String>) -> Self {
        Self {
            id,
            owner: owner.into(),
            status: AssetStatus::Open,
            metadata_hash: metadata_hash.into(),
            events: vec![CREATED.to_string()],
            closed_at: None,
            last_scan_hash: String::new(),
            extra: serde_json::Map::new(),
        }
    }

    /// World-state key of the asset.
    pub fn id(&self) -> &AssetId {
        &self.id
    }

    /// Owning party.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Current lifecycle status.
    pub fn status(&self) -> AssetStatus {
        self.status
    }

    /// Opaque metadata hash given at creation.
    pub fn metadata_hash(&self) -> &str {
        &self.metadata_hash
    }

    /// History, oldest first.
    pub fn events(&self) -> &[String] {
        &self.events
    }

    /// Finalize time, absent while OPEN.
    pub fn closed_at(&self) -> Option<Timestamp> {
        self.closed_at
    }

    /// Consumer receipt hash recorded at finalize.
    pub fn last_scan_hash(&self) -> &str {
        &self.last_scan_hash
    }

    /// Append one entry to the history (OPEN only).
    pub fn append_event(&mut self, entry: impl Into<String>) -> Result<(), ContractError> {
        self.require_open("append event")?;
        self.events.push(entry.into());
        Ok(())
    }

    /// OPEN → CLOSED.
    pub fn finalize(
        &mut self,
        consumer_receipt_hash: impl Into<String>,
        closed_at: Timestamp,
    ) -> Result<(), ContractError> {
        self.require_open("finalize")?;
        self.status = AssetStatus::Closed;
        self.last_scan_hash = consumer_receipt_hash.into();
        self.closed_at = Some(closed_at);
        self.events.push(FINALIZED.to_string());
        Ok(())
    }

    fn require_open(&self, operation: &'static str) -> Result<(), ContractError> {
        if self.status.is_terminal() {
            return Err(ContractError::InvalidState {
                kind: RecordKind::Asset,
                id: self.id.to_string(),
                status: self.status.to_string(),
                operation,
            });
        }
        Ok(())
    }
}

/// Payload of the `AssetFinalized` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetFinalized {
    pub asset_id: AssetId,
    pub status: AssetStatus,
}

/// The asset lifecycle contract.
#[derive(Debug, Clone)]
pub struct AssetContract {
    finalize_policy: EndorsementPolicy,
}

impl AssetContract {
    /// Build the contract for a deployment.
    pub fn new(config: &ContractConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            finalize_policy: config.finalize_policy()?,
        })
    }

    /// The policy declared on every finalized asset.
    pub fn finalize_policy(&self) -> &EndorsementPolicy {
        &self.finalize_policy
    }

    /// Whether a record exists under `id`.
    pub fn asset_exists<C>(&self, ctx: &C, id: &str) -> Result<bool, ContractError>
    where
        C: TransactionContext + ?Sized,
    {
        let id = AssetId::new(id)?;
        store::exists(ctx.stub(), id.as_str())
    }

    /// Create an OPEN asset whose history is `["CREATED"]`.
    pub fn create_asset<C>(
        &self,
        ctx: &mut C,
        id: &str,
        owner: &str,
        metadata_hash: &str,
    ) -> Result<AssetRecord, ContractError>
    where
        C: TransactionContext + ?Sized,
    {
        let id = AssetId::new(id)?;
        store::ensure_absent::<AssetRecord>(ctx.stub(), id.as_str())?;

        let record = AssetRecord::open(id, owner, metadata_hash);
        store::store(ctx.stub_mut(), &record)?;

        tracing::info!(
            asset_id = %record.id,
            caller = %ctx.client_identity().msp_id(),
            tx_id = ctx.stub().tx_id(),
            "asset created"
        );
        Ok(record)
    }

    /// Append `event_json` verbatim to an OPEN asset's history.
    pub fn update_asset<C>(
        &self,
        ctx: &mut C,
        id: &str,
        event_json: &str,
    ) -> Result<AssetRecord, ContractError>
    where
        C: TransactionContext + ?Sized,
    {
        let id = AssetId::new(id)?;
        let mut record: AssetRecord = store::load(ctx.stub(), id.as_str())?;
        record.append_event(event_json)?;
        store::store(ctx.stub_mut(), &record)?;

        tracing::info!(
            asset_id = %record.id,
            events = record.events.len(),
            caller = %ctx.client_identity().msp_id(),
            "asset event appended"
        );
        Ok(record)
    }

    /// Alias of [`update_asset`](Self::update_asset).
    pub fn append_event<C>(
        &self,
        ctx: &mut C,
        id: &str,
        event_json: &str,
    ) -> Result<AssetRecord, ContractError>
    where
        C: TransactionContext + ?Sized,
    {
        self.update_asset(ctx, id, event_json)
    }

    /// Close an OPEN asset, emit `AssetFinalized`, and lock the key under
    /// the joint endorsement policy. Fails as a whole if any step fails.
    pub fn finalize_asset<C>(
        &self,
        ctx: &mut C,
        id: &str,
        consumer_receipt_hash: &str,
    ) -> Result<AssetRecord, ContractError>
    where
        C: TransactionContext + ?Sized,
    {
        let id = AssetId::new(id)?;
        let mut record: AssetRecord = store::load(ctx.stub(), id.as_str())?;
        let closed_at = ctx.stub().tx_timestamp();
        record.finalize(consumer_receipt_hash, closed_at)?;

        store::store(ctx.stub_mut(), &record)?;
        store::emit(
            ctx.stub_mut(),
            ASSET_FINALIZED,
            &AssetFinalized {
                asset_id: record.id.clone(),
                status: record.status,
            },
        )?;

        let policy = self
            .finalize_policy
            .policy()
            .map_err(|e| prov_core::SubstrateError::Policy {
                key: record.id.to_string(),
                reason: e.to_string(),
            })?;
        ctx.stub_mut()
            .set_state_validation_parameter(record.id.as_str(), policy)?;

        tracing::info!(
            asset_id = %record.id,
            closed_at = %closed_at,
            endorsers = self.finalize_policy.list_orgs().len(),
            caller = %ctx.client_identity().msp_id(),
            tx_id = ctx.stub().tx_id(),
            "asset finalized"
        );
        Ok(record)
    }

    /// The stored asset.
    pub fn read_asset<C>(&self, ctx: &C, id: &str) -> Result<AssetRecord, ContractError>
    where
        C: TransactionContext + ?Sized,
    {
        let id = AssetId::new(id)?;
        store::load(ctx.stub(), id.as_str())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn history_only_grows_until_closed(entries in proptest::collection::vec(".{0,24}", 0..12)) {
            let mut rec = AssetRecord::open(AssetId::new("A1").unwrap(), "o", "h");
            let mut prev: Vec<String> = rec.events().to_vec();
            for e in &entries {
                rec.append_event(e.clone()).unwrap();
                prop_assert_eq!(&rec.events()[..prev.len()], &prev[..]);
                prop_assert_eq!(rec.events().len(), prev.len() + 1);
                prev = rec.events().to_vec();
            }
            rec.finalize("r", Timestamp::from_epoch_secs(0).unwrap()).unwrap();
            let closed = rec.clone();
            prop_assert!(rec.append_event("late").is_err());
            prop_assert!(rec.finalize("r2", Timestamp::from_epoch_secs(1).unwrap()).is_err());
            prop_assert_eq!(rec, closed);
        }

        #[test]
        fn encoding_is_byte_stable(entries in proptest::collection::vec(".{0,24}", 0..6), hash in "[a-f0-9]{0,16}") {
            let mut rec = AssetRecord::open(AssetId::new("A1").unwrap(), "owner", hash);
            for e in entries {
                rec.append_event(e).unwrap();
            }
            let first = rec.to_bytes().unwrap();
            let again = AssetRecord::from_bytes("A1", &first).unwrap().to_bytes().unwrap();
            prop_assert_eq!(first, again);
        }
    }
}
