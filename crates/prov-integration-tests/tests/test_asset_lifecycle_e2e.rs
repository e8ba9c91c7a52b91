//! End-to-end asset lifecycle against the in-memory ledger: create, append,
//! finalize, and every way a closed asset refuses further change.

use prov_contracts::{AssetContract, AssetStatus, ContractConfig};
use prov_core::{ErrorKind, MspId, Timestamp};
use prov_ledger::{ClientIdentity, EndorsementPolicy, MemoryLedger, RoleType};

fn org(msp: &str) -> ClientIdentity {
    ClientIdentity::new(MspId::new(msp).unwrap(), "user1")
}

fn contract() -> AssetContract {
    AssetContract::new(&ContractConfig::default()).unwrap()
}

#[test]
fn create_append_finalize_scenario() {
    let ledger = MemoryLedger::new();
    let c = contract();

    ledger
        .invoke(org("Org1MSP"), |ctx| c.create_asset(ctx, "A1", "alice", "h1"))
        .unwrap();
    let rec = ledger
        .evaluate(org("Org1MSP"), |ctx| c.read_asset(ctx, "A1"))
        .unwrap();
    assert_eq!(rec.status(), AssetStatus::Open);
    assert_eq!(rec.events(), &["CREATED"]);

    ledger
        .invoke(org("Org1MSP"), |ctx| c.append_event(ctx, "A1", r#"{"note":"x"}"#))
        .unwrap();
    let rec = ledger
        .evaluate(org("Org1MSP"), |ctx| c.read_asset(ctx, "A1"))
        .unwrap();
    assert_eq!(rec.events(), &["CREATED", r#"{"note":"x"}"#]);

    ledger
        .invoke(org("Org2MSP"), |ctx| c.finalize_asset(ctx, "A1", "r1"))
        .unwrap();
    let rec = ledger
        .evaluate(org("Org1MSP"), |ctx| c.read_asset(ctx, "A1"))
        .unwrap();
    assert_eq!(rec.status(), AssetStatus::Closed);
    assert_eq!(rec.last_scan_hash(), "r1");
    assert_eq!(rec.events().last().unwrap(), "FINALIZED");
    assert!(rec.closed_at().is_some());

    let finalized = ledger.events_named("AssetFinalized");
    assert_eq!(finalized.len(), 1);
    let payload: serde_json::Value = serde_json::from_slice(&finalized[0].payload).unwrap();
    assert_eq!(payload, serde_json::json!({"assetId": "A1", "status": "CLOSED"}));

    let err = ledger
        .invoke(org("Org1MSP"), |ctx| c.finalize_asset(ctx, "A1", "r2"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(ledger.events_named("AssetFinalized").len(), 1);
}

#[test]
fn finalize_declares_two_org_peer_policy() {
    let ledger = MemoryLedger::new();
    let c = contract();
    ledger
        .invoke(org("Org1MSP"), |ctx| {
            c.create_asset(ctx, "A1", "alice", "")?;
            c.finalize_asset(ctx, "A1", "r1")
        })
        .unwrap();

    let raw = ledger.validation_parameter("A1").unwrap();
    assert_eq!(
        raw,
        br#"{"version":0,"rule":{"nOutOf":{"n":2,"rules":[{"signedBy":0},{"signedBy":1}]}},"identities":[{"mspId":"Org1MSP","role":"PEER"},{"mspId":"Org2MSP","role":"PEER"}]}"#
    );
    let policy = EndorsementPolicy::from_bytes(&raw).unwrap();
    for msp in ["Org1MSP", "Org2MSP"] {
        assert_eq!(
            policy.role_of(&MspId::new(msp).unwrap()),
            Some(RoleType::Peer)
        );
    }
}

#[test]
fn finalize_is_stamped_with_transaction_time() {
    let ledger = MemoryLedger::new();
    let c = contract();
    let t = Timestamp::parse("2025-03-04T05:06:07Z").unwrap();
    ledger.pin_time(Some(t));
    let rec = ledger
        .invoke(org("Org1MSP"), |ctx| {
            c.create_asset(ctx, "A1", "alice", "")?;
            c.finalize_asset(ctx, "A1", "r1")
        })
        .unwrap();
    assert_eq!(rec.closed_at(), Some(t));
    let stored: serde_json::Value = serde_json::from_slice(&ledger.get("A1").unwrap()).unwrap();
    assert_eq!(stored["closedAt"], "2025-03-04T05:06:07Z");
}

#[test]
fn closed_asset_bytes_never_change() {
    let ledger = MemoryLedger::new();
    let c = contract();
    ledger
        .invoke(org("Org1MSP"), |ctx| {
            c.create_asset(ctx, "A1", "alice", "h")?;
            c.finalize_asset(ctx, "A1", "r1")
        })
        .unwrap();
    let sealed = ledger.get("A1").unwrap();

    for attempt in 0..3 {
        let payload = format!("late-{attempt}");
        assert!(ledger
            .invoke(org("Org2MSP"), |ctx| c.update_asset(ctx, "A1", &payload))
            .is_err());
        assert!(ledger
            .invoke(org("Org2MSP"), |ctx| c.finalize_asset(ctx, "A1", &payload))
            .is_err());
        assert!(ledger
            .invoke(org("Org2MSP"), |ctx| c.create_asset(ctx, "A1", "mallory", ""))
            .is_err());
    }
    assert_eq!(ledger.get("A1").unwrap(), sealed);
}

#[test]
fn operations_on_missing_asset_are_not_found() {
    let ledger = MemoryLedger::new();
    let c = contract();
    let errs = [
        ledger
            .invoke(org("Org1MSP"), |ctx| c.update_asset(ctx, "ghost", "{}"))
            .unwrap_err(),
        ledger
            .invoke(org("Org1MSP"), |ctx| c.finalize_asset(ctx, "ghost", "r"))
            .unwrap_err(),
        ledger
            .evaluate(org("Org1MSP"), |ctx| c.read_asset(ctx, "ghost"))
            .unwrap_err(),
    ];
    for err in errs {
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
    assert!(ledger.is_empty());
}

#[test]
fn ids_with_nul_are_rejected() {
    let ledger = MemoryLedger::new();
    let c = contract();
    let err = ledger
        .invoke(org("Org1MSP"), |ctx| c.create_asset(ctx, "A\u{0}1", "alice", ""))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn concurrent_appends_are_serialized() {
    let ledger = MemoryLedger::new();
    let c = contract();
    ledger
        .invoke(org("Org1MSP"), |ctx| c.create_asset(ctx, "A1", "alice", ""))
        .unwrap();

    let threads: Vec<_> = (0..8)
        .map(|t| {
            let ledger = ledger.clone();
            let c = c.clone();
            std::thread::spawn(move || {
                for i in 0..25 {
                    let ev = format!("t{t}-{i}");
                    ledger
                        .invoke(org("Org1MSP"), |ctx| c.append_event(ctx, "A1", &ev))
                        .unwrap();
                }
            })
        })
        .collect();
    for t in threads {
        t.join().unwrap();
    }

    let rec = ledger
        .evaluate(org("Org1MSP"), |ctx| c.read_asset(ctx, "A1"))
        .unwrap();
    assert_eq!(rec.events().len(), 1 + 8 * 25);
}
