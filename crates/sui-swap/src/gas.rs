// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Gas budget estimation by dry run.

use serde::Deserialize;
use sui_types::transaction::TransactionData;
use tracing::{debug, info};

use crate::error::{Error, SwapResult};
use crate::node::NodeClient;

#[cfg(test)]
#[path = "unit_tests/gas_tests.rs"]
mod gas_tests;

pub const DEFAULT_GAS_PRICE_MARGIN: f64 = 1.05;
pub const DEFAULT_GAS_BUDGET_MARGIN: f64 = 1.2;

/// The gas cost reported by a dry run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GasEstimate {
    pub computation_cost: u64,
    pub storage_cost: u64,
    pub storage_rebate: u64,
}

impl GasEstimate {
    /// `computation_cost + storage_cost - storage_rebate`.
    pub fn net_cost(&self) -> SwapResult<u64> {
        let gross = self
            .computation_cost
            .checked_add(self.storage_cost)
            .ok_or_else(|| {
                Error::MalformedSimulationResponse("gas cost overflows u64".to_string())
            })?;
        gross
            .checked_sub(self.storage_rebate)
            .ok_or(Error::NegativeGasEstimate {
                computation_cost: self.computation_cost,
                storage_cost: self.storage_cost,
                storage_rebate: self.storage_rebate,
            })
    }
}

/// Multipliers applied to the reference gas price and to the estimated budget.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GasMargins {
    pub price: f64,
    pub budget: f64,
}

impl Default for GasMargins {
    fn default() -> Self {
        Self {
            price: DEFAULT_GAS_PRICE_MARGIN,
            budget: DEFAULT_GAS_BUDGET_MARGIN,
        }
    }
}

impl GasMargins {
    pub fn gas_price(&self, reference_gas_price: u64) -> u64 {
        apply_margin(reference_gas_price, self.price)
    }

    pub fn gas_budget(&self, estimate: u64) -> u64 {
        apply_margin(estimate, self.budget)
    }
}

/// Scale `value` by `margin`, truncating toward zero.
pub fn apply_margin(value: u64, margin: f64) -> u64 {
    (value as f64 * margin) as u64
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SimulatedEffects {
    #[serde(default)]
    status: Option<SimulatedStatus>,
    gas_used: SimulatedGasUsed,
}

#[derive(Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
enum SimulatedStatus {
    Success,
    Failure { error: String },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SimulatedGasUsed {
    computation_cost: CostField,
    storage_cost: CostField,
    storage_rebate: CostField,
}

/// JSON-RPC renders u64 amounts as decimal strings; plain numbers are accepted too.
#[derive(Deserialize)]
#[serde(untagged)]
enum CostField {
    Text(String),
    Number(u64),
}

impl CostField {
    fn parse(self, field: &str) -> SwapResult<u64> {
        match self {
            CostField::Number(value) => Ok(value),
            CostField::Text(text) => text.parse::<u64>().map_err(|e| {
                Error::MalformedSimulationResponse(format!("{field} `{text}`: {e}"))
            }),
        }
    }
}

/// Decode the gas section of simulated transaction effects.
pub fn parse_simulated_effects(effects: serde_json::Value) -> SwapResult<GasEstimate> {
    let effects: SimulatedEffects = serde_json::from_value(effects)
        .map_err(|e| Error::MalformedSimulationResponse(e.to_string()))?;
    if let Some(SimulatedStatus::Failure { error }) = effects.status {
        return Err(Error::SimulationFailed(error));
    }
    let gas = effects.gas_used;
    Ok(GasEstimate {
        computation_cost: gas.computation_cost.parse("computationCost")?,
        storage_cost: gas.storage_cost.parse("storageCost")?,
        storage_rebate: gas.storage_rebate.parse("storageRebate")?,
    })
}

/// Dry run `tx_data` and return the raw, unmargined gas budget it needs.
pub async fn estimate_budget(
    node: &(impl NodeClient + ?Sized),
    tx_data: &TransactionData,
) -> SwapResult<u64> {
    let effects = node.dry_run_transaction(tx_data.clone()).await?;
    debug!(%effects, "Dry run effects");
    let estimate = parse_simulated_effects(effects)?;
    let budget = estimate.net_cost()?;
    info!(
        computation_cost = estimate.computation_cost,
        storage_cost = estimate.storage_cost,
        storage_rebate = estimate.storage_rebate,
        budget,
        "Estimated gas budget"
    );
    Ok(budget)
}
