// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use sui_sdk::SUI_COIN_TYPE;
use sui_types::base_types::SuiAddress;
use tracing::info;

use crate::error::{Error, SwapResult};
use crate::node::{CoinInfo, NodeClient};
use crate::object_ref::OwnedReference;

#[cfg(test)]
#[path = "unit_tests/coin_tests.rs"]
mod coin_tests;

/// Every coin of `coin_type` held by `owner`. Fails if there are none.
pub async fn get_coins(
    node: &(impl NodeClient + ?Sized),
    owner: SuiAddress,
    coin_type: &str,
) -> SwapResult<Vec<CoinInfo>> {
    let coins = node.get_coins(owner, coin_type).await?;
    if coins.is_empty() {
        return Err(Error::NoCoinsFound {
            owner,
            coin_type: coin_type.to_string(),
        });
    }
    Ok(coins)
}

/// The SUI coin with the largest balance, to pay for gas.
pub async fn select_gas_coin(
    node: &(impl NodeClient + ?Sized),
    owner: SuiAddress,
) -> SwapResult<OwnedReference> {
    let coins = get_coins(node, owner, SUI_COIN_TYPE).await?;
    let coin = coins
        .into_iter()
        .max_by_key(|coin| coin.balance)
        .ok_or_else(|| Error::NoCoinsFound {
            owner,
            coin_type: SUI_COIN_TYPE.to_string(),
        })?;
    let (object_id, version, digest) = coin.object_ref;
    info!(%object_id, balance = coin.balance, "Selected gas coin");
    Ok(OwnedReference {
        object_id,
        version,
        digest,
    })
}
