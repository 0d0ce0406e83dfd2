// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use serde_json::json;
use sui_types::base_types::{random_object_ref, SuiAddress};
use sui_types::programmable_transaction_builder::ProgrammableTransactionBuilder;

use super::*;
use crate::test_utils::{simulated_effects, MockNode, TEST_GAS_PRICE};

fn unsigned_transfer() -> TransactionData {
    let sender = SuiAddress::random_for_testing_only();
    let mut ptb = ProgrammableTransactionBuilder::new();
    ptb.transfer_sui(SuiAddress::random_for_testing_only(), Some(100));
    TransactionData::new_programmable(
        sender,
        vec![random_object_ref()],
        ptb.finish(),
        50_000_000,
        TEST_GAS_PRICE,
    )
}

#[tokio::test]
async fn budget_is_computation_plus_storage_minus_rebate() {
    let node = MockNode::new();
    node.set_dry_run(Ok(simulated_effects(1000, 500, 200)));
    let tx_data = unsigned_transfer();

    assert_eq!(estimate_budget(&node, &tx_data).await.unwrap(), 1300);
    assert_eq!(node.dry_runs(), vec![tx_data]);
}

#[tokio::test]
async fn rebate_larger_than_cost_is_an_error() {
    let node = MockNode::new();
    node.set_dry_run(Ok(simulated_effects(100, 50, 1000)));
    assert!(matches!(
        estimate_budget(&node, &unsigned_transfer()).await.unwrap_err(),
        Error::NegativeGasEstimate {
            computation_cost: 100,
            storage_cost: 50,
            storage_rebate: 1000,
        }
    ));
}

#[tokio::test]
async fn rejected_dry_run_is_simulation_failure() {
    let node = MockNode::new();
    node.set_dry_run(Err("InsufficientGas".to_string()));
    assert!(matches!(
        estimate_budget(&node, &unsigned_transfer()).await.unwrap_err(),
        Error::SimulationFailed(reason) if reason == "InsufficientGas"
    ));
}

#[tokio::test]
async fn failed_simulated_status_is_simulation_failure() {
    let node = MockNode::new();
    let mut effects = simulated_effects(1000, 500, 200);
    effects["status"] = json!({ "status": "failure", "error": "MoveAbort(cetus, 6)" });
    node.set_dry_run(Ok(effects));
    assert!(matches!(
        estimate_budget(&node, &unsigned_transfer()).await.unwrap_err(),
        Error::SimulationFailed(reason) if reason.contains("MoveAbort")
    ));
}

#[test]
fn missing_cost_field_is_malformed() {
    let mut effects = simulated_effects(1000, 500, 200);
    effects["gasUsed"]
        .as_object_mut()
        .unwrap()
        .remove("storageRebate");
    assert!(matches!(
        parse_simulated_effects(effects).unwrap_err(),
        Error::MalformedSimulationResponse(_)
    ));
}

#[test]
fn missing_gas_section_is_malformed() {
    assert!(matches!(
        parse_simulated_effects(json!({ "status": { "status": "success" } })).unwrap_err(),
        Error::MalformedSimulationResponse(_)
    ));
}

#[test]
fn non_numeric_or_negative_costs_are_malformed() {
    for bad in [json!("12abc"), json!("-5"), json!(-5), json!(1.5), json!(null)] {
        let mut effects = simulated_effects(1000, 500, 200);
        effects["gasUsed"]["computationCost"] = bad.clone();
        assert!(
            matches!(
                parse_simulated_effects(effects).unwrap_err(),
                Error::MalformedSimulationResponse(_)
            ),
            "{bad} should be rejected"
        );
    }
}

#[test]
fn numeric_costs_are_accepted() {
    let effects = json!({
        "gasUsed": { "computationCost": 10, "storageCost": 20, "storageRebate": 5 }
    });
    let estimate = parse_simulated_effects(effects).unwrap();
    assert_eq!(estimate.net_cost().unwrap(), 25);
}

#[test]
fn overflowing_cost_is_malformed() {
    let estimate = GasEstimate {
        computation_cost: u64::MAX,
        storage_cost: 1,
        storage_rebate: 0,
    };
    assert!(matches!(
        estimate.net_cost().unwrap_err(),
        Error::MalformedSimulationResponse(_)
    ));
}

#[test]
fn margins_truncate_like_the_node_expects() {
    let margins = GasMargins::default();
    assert_eq!(margins.gas_price(1000), 1050);
    assert_eq!(margins.gas_price(751), 788);
    assert_eq!(margins.gas_budget(1300), 1560);
    assert_eq!(apply_margin(0, 1.2), 0);
    assert_eq!(apply_margin(10, 1.0), 10);
}
