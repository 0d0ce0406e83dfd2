// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use super::*;
use crate::test_utils::MockNode;

const USDC: &str = "0xdba34672e30cb065b1f93e3ab55318768fd6fef66c15942c9f7cb846e2f900e7::usdc::USDC";

#[tokio::test]
async fn lists_coins_of_requested_type_only() {
    let node = MockNode::new();
    let owner = SuiAddress::random_for_testing_only();
    let usdc = node.add_coin(owner, USDC, 5);
    node.add_coin(owner, SUI_COIN_TYPE, 1_000);
    node.add_coin(SuiAddress::random_for_testing_only(), USDC, 7);

    let coins = get_coins(&node, owner, USDC).await.unwrap();
    assert_eq!(coins.len(), 1);
    assert_eq!(coins[0].object_ref.0, usdc);
    assert_eq!(coins[0].balance, 5);
}

#[tokio::test]
async fn no_coins_is_an_error() {
    let node = MockNode::new();
    let owner = SuiAddress::random_for_testing_only();
    let err = get_coins(&node, owner, USDC).await.unwrap_err();
    assert!(
        matches!(
            &err,
            Error::NoCoinsFound { owner: o, coin_type } if *o == owner && coin_type == USDC
        ),
        "{err}"
    );
}

#[tokio::test]
async fn gas_coin_is_the_richest_sui_coin() {
    let node = MockNode::new();
    let owner = SuiAddress::random_for_testing_only();
    node.add_coin(owner, SUI_COIN_TYPE, 10);
    let richest = node.add_coin(owner, SUI_COIN_TYPE, 5_000_000_000);
    node.add_coin(owner, SUI_COIN_TYPE, 300);
    node.add_coin(owner, USDC, 9_000_000_000);

    let gas = select_gas_coin(&node, owner).await.unwrap();
    assert_eq!(gas.object_id, richest);
}

#[tokio::test]
async fn gas_selection_without_sui_fails() {
    let node = MockNode::new();
    let owner = SuiAddress::random_for_testing_only();
    node.add_coin(owner, USDC, 1);
    assert!(matches!(
        select_gas_coin(&node, owner).await.unwrap_err(),
        Error::NoCoinsFound { .. }
    ));
}
