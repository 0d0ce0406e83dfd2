// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use sui_types::base_types::{ObjectID, SuiAddress};
use sui_types::{parse_sui_type_tag, Identifier};

use crate::error::{Error, SwapResult};
use crate::gas::{GasMargins, DEFAULT_GAS_BUDGET_MARGIN, DEFAULT_GAS_PRICE_MARGIN};
use crate::node::WaitMode;
use crate::swap::{CallArgument, SwapPlan};

#[cfg(test)]
#[path = "unit_tests/config_tests.rs"]
mod config_tests;

pub const DEFAULT_PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DRY_RUN_GAS_BUDGET: u64 = 50_000_000;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SwapConfig {
    /// Full node JSON-RPC endpoint.
    pub rpc_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Environment variable holding the `suiprivkey` encoded signer key.
    #[serde(default = "default_private_key_env")]
    pub private_key_env: String,

    /// Coin paying for gas. When absent, the signer's largest SUI coin is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_coin: Option<String>,

    #[serde(default = "default_gas_price_margin")]
    pub gas_price_margin: f64,

    #[serde(default = "default_gas_budget_margin")]
    pub gas_budget_margin: f64,

    /// Budget declared on the transaction that is dry run to estimate the real budget.
    #[serde(default = "default_dry_run_gas_budget")]
    pub dry_run_gas_budget: u64,

    #[serde(default)]
    pub wait_for: WaitMode,

    pub swap: SwapCallConfig,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SwapCallConfig {
    pub package: String,
    pub module: String,
    pub function: String,
    #[serde(default)]
    pub type_arguments: Vec<String>,
    /// MIST split off the gas coin and handed to the call.
    pub amount: u64,
    pub arguments: Vec<CallArgumentConfig>,
    /// Receiver of the call's result. Defaults to the signer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
}

/// One move call argument, in call order.
///
/// `mutable` has no default: every shared input states whether the call writes it.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum CallArgumentConfig {
    Shared {
        #[serde(rename = "object-id")]
        object_id: String,
        mutable: bool,
    },
    Owned {
        #[serde(rename = "object-id")]
        object_id: String,
    },
    SplitCoin,
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_private_key_env() -> String {
    DEFAULT_PRIVATE_KEY_ENV.to_string()
}

fn default_gas_price_margin() -> f64 {
    DEFAULT_GAS_PRICE_MARGIN
}

fn default_gas_budget_margin() -> f64 {
    DEFAULT_GAS_BUDGET_MARGIN
}

fn default_dry_run_gas_budget() -> u64 {
    DEFAULT_DRY_RUN_GAS_BUDGET
}

/// Settings shared by every command that submits a transaction.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSettings {
    pub gas_coin: Option<ObjectID>,
    pub margins: GasMargins,
    pub dry_run_gas_budget: u64,
    pub wait_mode: WaitMode,
}

pub fn parse_object_id(value: &str) -> SwapResult<ObjectID> {
    ObjectID::from_hex_literal(value.trim()).map_err(|e| Error::invalid_input(value, e))
}

pub fn parse_address(value: &str) -> SwapResult<SuiAddress> {
    SuiAddress::from_str(value.trim()).map_err(|e| Error::invalid_input(value, e))
}

fn parse_identifier(value: &str) -> SwapResult<Identifier> {
    Identifier::new(value.trim()).map_err(|e| Error::invalid_input(value, e))
}

fn check_margin(name: &str, margin: f64) -> SwapResult<f64> {
    if !margin.is_finite() || margin < 1.0 {
        return Err(Error::Config(format!(
            "{name} must be a finite number >= 1.0, got {margin}"
        )));
    }
    Ok(margin)
}

impl SwapConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Unable to read config file {}", path.display()))?;
        serde_yaml::from_str(&contents)
            .with_context(|| format!("Unable to parse config file {}", path.display()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The signer key, read from the configured environment variable.
    pub fn private_key(&self) -> SwapResult<String> {
        std::env::var(&self.private_key_env).map_err(|e| {
            Error::Config(format!(
                "cannot read private key from ${}: {e}",
                self.private_key_env
            ))
        })
    }

    pub fn run_settings(&self) -> SwapResult<RunSettings> {
        let price = check_margin("gas-price-margin", self.gas_price_margin)?;
        let budget = check_margin("gas-budget-margin", self.gas_budget_margin)?;
        if self.dry_run_gas_budget == 0 {
            return Err(Error::Config("dry-run-gas-budget must be positive".to_string()));
        }
        Ok(RunSettings {
            gas_coin: self.gas_coin.as_deref().map(parse_object_id).transpose()?,
            margins: GasMargins { price, budget },
            dry_run_gas_budget: self.dry_run_gas_budget,
            wait_mode: self.wait_for,
        })
    }

    /// Parse and cross-check the swap call before anything is sent to the node.
    pub fn swap_plan(&self) -> SwapResult<SwapPlan> {
        let call = &self.swap;
        if call.amount == 0 {
            return Err(Error::Config("swap.amount must be positive".to_string()));
        }

        let type_arguments = call
            .type_arguments
            .iter()
            .map(|t| parse_sui_type_tag(t).map_err(|e| Error::invalid_input(t.as_str(), e)))
            .collect::<SwapResult<Vec<_>>>()?;

        let mut split_coins = 0;
        let mut declared: BTreeMap<ObjectID, Option<bool>> = BTreeMap::new();
        let mut arguments = Vec::with_capacity(call.arguments.len());
        for argument in &call.arguments {
            let (parsed, object) = match argument {
                CallArgumentConfig::Shared { object_id, mutable } => {
                    let object_id = parse_object_id(object_id)?;
                    (
                        CallArgument::Shared {
                            object_id,
                            mutable: *mutable,
                        },
                        Some((object_id, Some(*mutable))),
                    )
                }
                CallArgumentConfig::Owned { object_id } => {
                    let object_id = parse_object_id(object_id)?;
                    (CallArgument::Owned(object_id), Some((object_id, None)))
                }
                CallArgumentConfig::SplitCoin => {
                    split_coins += 1;
                    (CallArgument::SplitCoin, None)
                }
            };
            if let Some((object_id, access)) = object {
                match declared.insert(object_id, access) {
                    Some(previous) if previous != access => {
                        return Err(Error::Config(format!(
                            "object {object_id} is declared more than once with conflicting access \
                             ({} vs {}); declare it once with the intended mutability",
                            describe_access(previous),
                            describe_access(access)
                        )));
                    }
                    Some(_) if access.is_none() => {
                        return Err(Error::Config(format!(
                            "owned object {object_id} cannot be passed to the call twice"
                        )));
                    }
                    _ => {}
                }
            }
            arguments.push(parsed);
        }
        if split_coins != 1 {
            return Err(Error::Config(format!(
                "swap.arguments must contain exactly one split-coin entry, found {split_coins}"
            )));
        }

        Ok(SwapPlan {
            package: parse_object_id(&call.package)?,
            module: parse_identifier(&call.module)?,
            function: parse_identifier(&call.function)?,
            type_arguments,
            amount: call.amount,
            arguments,
            recipient: call.recipient.as_deref().map(parse_address).transpose()?,
        })
    }
}

fn describe_access(access: Option<bool>) -> &'static str {
    match access {
        Some(true) => "shared mutable",
        Some(false) => "shared immutable",
        None => "owned",
    }
}
