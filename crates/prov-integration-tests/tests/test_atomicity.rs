//! All-or-nothing invocations: a failure at any substrate call leaves
//! state, events, and policies exactly as they were.

use prov_contracts::{Chaincode, ContractConfig};
use prov_core::{ErrorKind, MspId};
use prov_ledger::{ClientIdentity, Fault, LedgerSnapshot, MemoryLedger};

fn caller() -> ClientIdentity {
    ClientIdentity::new(MspId::new("Org1MSP").unwrap(), "ops")
}

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn seeded() -> (MemoryLedger, Chaincode) {
    let ledger = MemoryLedger::new();
    let cc = Chaincode::new(&ContractConfig::default()).unwrap();
    ledger
        .invoke(caller(), |ctx| {
            cc.invoke(ctx, "CreateAsset", &args(&["A1", "alice", "h"]))?;
            cc.invoke(
                ctx,
                "RegisterProduct",
                &args(&[
                    "P1",
                    r#"{"name":"F","location":"L"}"#,
                    r#"{"productType":"Rice","batchSize":"1 t","harvestDate":"2024-10-01"}"#,
                ]),
            )
        })
        .unwrap();
    (ledger, cc)
}

fn committed(ledger: &MemoryLedger) -> LedgerSnapshot {
    ledger.snapshot().unwrap()
}

#[test]
fn every_fault_on_every_mutation_rolls_back() {
    let faults = [
        Fault::GetState,
        Fault::PutState,
        Fault::SetEvent,
        Fault::SetValidationParameter,
    ];
    let calls: [(&str, &[&str]); 5] = [
        ("UpdateAsset", &["A1", "{}"][..]),
        ("FinalizeAsset", &["A1", "r"][..]),
        ("TransferOwnership", &["P1", "Miller", "Mill", "Town"][..]),
        ("CompleteProduct", &["P1"][..]),
        ("CreateAsset", &["A2", "bob"][..]),
    ];

    for fault in faults {
        for (function, list) in calls {
            let (ledger, cc) = seeded();
            let before = committed(&ledger);
            ledger.inject_fault(fault);
            let result = ledger.invoke(caller(), |ctx| cc.invoke(ctx, function, &args(list)));
            ledger.clear_faults();

            if let Err(err) = result {
                assert_eq!(err.kind(), ErrorKind::SubstrateFailure, "{function} under {fault:?}");
                assert_eq!(committed(&ledger), before, "{function} under {fault:?}");
            }
        }
    }
}

#[test]
fn policy_fault_blocks_write_and_event() {
    let (ledger, cc) = seeded();
    let before = committed(&ledger);
    ledger.inject_fault(Fault::SetValidationParameter);
    let err = ledger
        .invoke(caller(), |ctx| cc.invoke(ctx, "FinalizeAsset", &args(&["A1", "r"])))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SubstrateFailure);

    let after = committed(&ledger);
    assert_eq!(after, before);
    assert!(after.events.is_empty());
    assert!(after.validation_parameters.is_empty());

    ledger.clear_faults();
    ledger
        .invoke(caller(), |ctx| cc.invoke(ctx, "FinalizeAsset", &args(&["A1", "r"])))
        .unwrap();
    assert_eq!(ledger.events_named("AssetFinalized").len(), 1);
}

#[test]
fn contract_error_after_writes_discards_them() {
    let (ledger, cc) = seeded();
    let before = committed(&ledger);
    let err = ledger
        .invoke(caller(), |ctx| {
            cc.invoke(ctx, "UpdateAsset", &args(&["A1", "first"]))?;
            cc.invoke(ctx, "FinalizeAsset", &args(&["A1", "r"]))?;
            cc.invoke(ctx, "FinalizeAsset", &args(&["A1", "again"]))
        })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(committed(&ledger), before);
}

#[test]
fn read_only_functions_never_commit() {
    let (ledger, cc) = seeded();
    let before = committed(&ledger);
    for (function, list) in [
        ("ReadAsset", vec!["A1"]),
        ("AssetExists", vec!["A1"]),
        ("GetProductHistory", vec!["P1"]),
        ("GetAllProducts", vec![]),
        ("ProductExists", vec!["P1"]),
    ] {
        assert!(function.parse::<prov_contracts::ContractFunction>().unwrap().is_read_only());
        ledger
            .invoke(caller(), |ctx| cc.invoke(ctx, function, &args(&list)))
            .unwrap();
    }
    assert_eq!(committed(&ledger), before);
}
