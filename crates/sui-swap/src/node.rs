// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The full node capabilities the swap pipeline depends on.
//!
//! Everything that talks to a node goes through [`NodeClient`], so the resolver, the gas
//! estimator and the monitor can be driven by an in-memory node in tests. Node responses are
//! decoded into strict types here, at the boundary, and nowhere else.

use async_trait::async_trait;
use jsonrpsee::core::ClientError;
use serde::{Deserialize, Serialize};
use sui_json_rpc_types::{
    SuiExecutionStatus, SuiObjectDataOptions, SuiObjectResponseError,
    SuiTransactionBlockEffectsAPI, SuiTransactionBlockResponseOptions,
};
use sui_sdk::error::Error as SdkError;
use sui_sdk::SuiClient;
use sui_types::base_types::{ObjectDigest, ObjectID, ObjectRef, SequenceNumber, SuiAddress};
use sui_types::digests::TransactionDigest;
use sui_types::gas::GasCostSummary;
use sui_types::object::Owner;
use sui_types::quorum_driver_types::ExecuteTransactionRequestType;
use sui_types::transaction::{Transaction, TransactionData};
use tracing::debug;

use crate::error::{Error, SwapResult};

#[cfg(test)]
#[path = "unit_tests/node_tests.rs"]
mod node_tests;

/// Ownership of an object as far as transaction inputs are concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectOwnership {
    /// Owned by an address or by another object.
    Owned(SuiAddress),
    Shared {
        initial_shared_version: SequenceNumber,
    },
    Immutable,
}

impl std::fmt::Display for ObjectOwnership {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectOwnership::Owned(owner) => write!(f, "Owned({owner})"),
            ObjectOwnership::Shared {
                initial_shared_version,
            } => write!(f, "Shared({})", initial_shared_version.value()),
            ObjectOwnership::Immutable => write!(f, "Immutable"),
        }
    }
}

/// Current on-chain metadata of an object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectInfo {
    pub object_id: ObjectID,
    pub version: SequenceNumber,
    pub digest: ObjectDigest,
    pub owner: ObjectOwnership,
}

impl ObjectInfo {
    pub fn object_ref(&self) -> ObjectRef {
        (self.object_id, self.version, self.digest)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoinInfo {
    pub coin_type: String,
    pub object_ref: ObjectRef,
    pub balance: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WaitMode {
    EffectsCert,
    #[default]
    LocalExecution,
}

impl From<WaitMode> for ExecuteTransactionRequestType {
    fn from(mode: WaitMode) -> Self {
        match mode {
            WaitMode::EffectsCert => ExecuteTransactionRequestType::WaitForEffectsCert,
            WaitMode::LocalExecution => ExecuteTransactionRequestType::WaitForLocalExecution,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionReport {
    pub digest: TransactionDigest,
    /// `None` when the node returned no effects for the transaction.
    pub gas_used: Option<GasCostSummary>,
}

#[async_trait]
pub trait NodeClient: Send + Sync {
    async fn get_object(&self, object_id: ObjectID) -> SwapResult<ObjectInfo>;

    /// All coins of `coin_type` owned by `owner`, across every page.
    async fn get_coins(&self, owner: SuiAddress, coin_type: &str) -> SwapResult<Vec<CoinInfo>>;

    async fn get_reference_gas_price(&self) -> SwapResult<u64>;

    /// Simulate `tx_data` and return the transaction effects in their JSON wire form.
    async fn dry_run_transaction(&self, tx_data: TransactionData)
        -> SwapResult<serde_json::Value>;

    async fn execute_transaction(
        &self,
        tx: Transaction,
        wait_mode: WaitMode,
    ) -> SwapResult<ExecutionReport>;

    async fn get_latest_checkpoint_sequence_number(&self) -> SwapResult<u64>;
}

fn decode_owner(object_id: ObjectID, owner: Option<Owner>) -> SwapResult<ObjectOwnership> {
    let owner = owner.ok_or_else(|| Error::ObjectDecode {
        object_id,
        reason: "node response carries no owner".to_string(),
    })?;
    match owner {
        Owner::AddressOwner(address) | Owner::ObjectOwner(address) => {
            Ok(ObjectOwnership::Owned(address))
        }
        Owner::Shared {
            initial_shared_version,
        } => Ok(ObjectOwnership::Shared {
            initial_shared_version,
        }),
        Owner::Immutable => Ok(ObjectOwnership::Immutable),
        #[allow(unreachable_patterns)]
        other => Err(Error::ObjectDecode {
            object_id,
            reason: format!("unsupported owner kind {other}"),
        }),
    }
}

/// Transport failures and timeouts are query failures. Anything the node answered is a
/// rejected simulation.
fn dry_run_error(err: SdkError) -> Error {
    match &err {
        SdkError::RpcError(
            ClientError::Transport(_) | ClientError::RestartNeeded(_) | ClientError::RequestTimeout,
        ) => Error::query_failed(err),
        _ => Error::SimulationFailed(err.to_string()),
    }
}

#[async_trait]
impl NodeClient for SuiClient {
    async fn get_object(&self, object_id: ObjectID) -> SwapResult<ObjectInfo> {
        let response = self
            .read_api()
            .get_object_with_options(object_id, SuiObjectDataOptions::new().with_owner())
            .await
            .map_err(Error::query_failed)?;

        match (response.data, response.error) {
            (Some(data), _) => Ok(ObjectInfo {
                object_id: data.object_id,
                version: data.version,
                digest: data.digest,
                owner: decode_owner(object_id, data.owner)?,
            }),
            (
                None,
                Some(SuiObjectResponseError::NotExists { .. })
                | Some(SuiObjectResponseError::Deleted { .. }),
            ) => Err(Error::ObjectNotFound(object_id)),
            (None, Some(err)) => Err(Error::query_failed(err)),
            (None, None) => Err(Error::QueryFailed(format!(
                "empty response for object {object_id}"
            ))),
        }
    }

    async fn get_coins(&self, owner: SuiAddress, coin_type: &str) -> SwapResult<Vec<CoinInfo>> {
        let mut coins = vec![];
        let mut cursor = None;
        loop {
            let page = self
                .coin_read_api()
                .get_coins(owner, Some(coin_type.to_string()), cursor, None)
                .await
                .map_err(Error::query_failed)?;
            coins.extend(page.data.into_iter().map(|coin| CoinInfo {
                object_ref: coin.object_ref(),
                coin_type: coin.coin_type,
                balance: coin.balance,
            }));
            if !page.has_next_page {
                break;
            }
            cursor = page.next_cursor;
        }
        Ok(coins)
    }

    async fn get_reference_gas_price(&self) -> SwapResult<u64> {
        self.read_api()
            .get_reference_gas_price()
            .await
            .map_err(Error::query_failed)
    }

    async fn dry_run_transaction(
        &self,
        tx_data: TransactionData,
    ) -> SwapResult<serde_json::Value> {
        let response = self
            .read_api()
            .dry_run_transaction_block(tx_data)
            .await
            .map_err(dry_run_error)?;
        serde_json::to_value(&response.effects)
            .map_err(|e| Error::MalformedSimulationResponse(e.to_string()))
    }

    async fn execute_transaction(
        &self,
        tx: Transaction,
        wait_mode: WaitMode,
    ) -> SwapResult<ExecutionReport> {
        let digest = *tx.digest();
        let response = self
            .quorum_driver_api()
            .execute_transaction_block(
                tx,
                SuiTransactionBlockResponseOptions::full_content(),
                Some(wait_mode.into()),
            )
            .await
            .map_err(|e| Error::ExecutionFailed {
                digest: Some(digest),
                reason: e.to_string(),
            })?;
        debug!(?response, "Execution response");

        let gas_used = match &response.effects {
            Some(effects) => {
                if let SuiExecutionStatus::Failure { error } = effects.status() {
                    return Err(Error::ExecutionFailed {
                        digest: Some(response.digest),
                        reason: error.clone(),
                    });
                }
                Some(effects.gas_cost_summary().clone())
            }
            None => None,
        };
        Ok(ExecutionReport {
            digest: response.digest,
            gas_used,
        })
    }

    async fn get_latest_checkpoint_sequence_number(&self) -> SwapResult<u64> {
        self.read_api()
            .get_latest_checkpoint_sequence_number()
            .await
            .map_err(Error::query_failed)
    }
}
