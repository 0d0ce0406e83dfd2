// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Programmable transactions for the swap call and for coin merging.

use std::collections::BTreeMap;

use sui_types::base_types::{ObjectID, SuiAddress};
use sui_types::programmable_transaction_builder::ProgrammableTransactionBuilder;
use sui_types::transaction::{Argument, Command, ObjectArg, ProgrammableTransaction};
use sui_types::{Identifier, TypeTag};
use tracing::info;

use crate::error::{Error, SwapResult};
use crate::node::NodeClient;
use crate::object_ref::{resolve_owned, resolve_shared, ObjectReference, OwnedReference};

#[cfg(test)]
#[path = "unit_tests/swap_tests.rs"]
mod swap_tests;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallArgument {
    Shared { object_id: ObjectID, mutable: bool },
    Owned(ObjectID),
    /// The coin of `amount` MIST split off the gas coin.
    SplitCoin,
}

/// A validated move call that swaps `amount` MIST taken from the gas coin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapPlan {
    pub package: ObjectID,
    pub module: Identifier,
    pub function: Identifier,
    pub type_arguments: Vec<TypeTag>,
    pub amount: u64,
    pub arguments: Vec<CallArgument>,
    pub recipient: Option<SuiAddress>,
}

impl SwapPlan {
    /// Object ids in first-use order, each with its declared access.
    fn objects(&self) -> Vec<(ObjectID, Option<bool>)> {
        let mut seen = BTreeMap::new();
        let mut objects = vec![];
        for argument in &self.arguments {
            let (object_id, access) = match argument {
                CallArgument::Shared { object_id, mutable } => (*object_id, Some(*mutable)),
                CallArgument::Owned(object_id) => (*object_id, None),
                CallArgument::SplitCoin => continue,
            };
            if seen.insert(object_id, access).is_none() {
                objects.push((object_id, access));
            }
        }
        objects
    }
}

/// Fetch a fresh reference for every object the plan touches, one query per object.
pub async fn resolve_inputs(
    node: &(impl NodeClient + ?Sized),
    plan: &SwapPlan,
) -> SwapResult<BTreeMap<ObjectID, ObjectReference>> {
    let mut resolved = BTreeMap::new();
    for (object_id, access) in plan.objects() {
        let reference = match access {
            Some(mutable) => {
                ObjectReference::Shared(resolve_shared(node, object_id, mutable).await?)
            }
            None => ObjectReference::Owned(resolve_owned(node, object_id).await?),
        };
        resolved.insert(object_id, reference);
    }
    Ok(resolved)
}

/// Split `amount` off the gas coin, pass it to the move call with the resolved
/// objects, and send the call's result to `recipient`.
pub fn build_swap_transaction(
    plan: &SwapPlan,
    inputs: &BTreeMap<ObjectID, ObjectReference>,
    recipient: SuiAddress,
) -> SwapResult<ProgrammableTransaction> {
    let mut builder = ProgrammableTransactionBuilder::new();
    let amount = builder.pure(plan.amount).map_err(assembly)?;
    let Argument::Result(split) =
        builder.command(Command::SplitCoins(Argument::GasCoin, vec![amount]))
    else {
        return Err(Error::Assembly(
            "split command did not produce a result".to_string(),
        ));
    };

    let mut call_args = Vec::with_capacity(plan.arguments.len());
    for argument in &plan.arguments {
        let arg = match argument {
            CallArgument::SplitCoin => Argument::NestedResult(split, 0),
            CallArgument::Shared { object_id, .. } | CallArgument::Owned(object_id) => {
                let reference = inputs.get(object_id).ok_or_else(|| {
                    Error::Assembly(format!("object {object_id} was not resolved"))
                })?;
                builder
                    .obj(ObjectArg::from(*reference))
                    .map_err(assembly)?
            }
        };
        call_args.push(arg);
    }

    let output = builder.programmable_move_call(
        plan.package,
        plan.module.clone(),
        plan.function.clone(),
        plan.type_arguments.clone(),
        call_args,
    );
    builder.transfer_arg(recipient, output);
    info!(
        package = %plan.package,
        module = %plan.module,
        function = %plan.function,
        amount = plan.amount,
        %recipient,
        "Built swap transaction"
    );
    Ok(builder.finish())
}

/// Merge `coins` into `primary`.
pub fn build_merge_coins_transaction(
    primary: OwnedReference,
    coins: &[OwnedReference],
) -> SwapResult<ProgrammableTransaction> {
    if coins.is_empty() {
        return Err(Error::invalid_input(
            primary.object_id.to_string(),
            "no coins to merge into the primary coin",
        ));
    }
    if let Some(coin) = coins.iter().find(|c| c.object_id == primary.object_id) {
        return Err(Error::invalid_input(
            coin.object_id.to_string(),
            "a coin cannot be merged into itself",
        ));
    }
    let mut builder = ProgrammableTransactionBuilder::new();
    let target = builder.obj(ObjectArg::from(primary)).map_err(assembly)?;
    let sources = coins
        .iter()
        .map(|coin| builder.obj(ObjectArg::from(*coin)).map_err(assembly))
        .collect::<SwapResult<Vec<_>>>()?;
    builder.command(Command::MergeCoins(target, sources));
    Ok(builder.finish())
}

fn assembly(e: anyhow::Error) -> Error {
    Error::Assembly(e.to_string())
}
