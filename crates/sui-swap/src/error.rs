// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use sui_types::base_types::{ObjectID, SuiAddress, TransactionDigest};
use thiserror::Error;

pub type SwapResult<T = ()> = Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid private key format: {0}")]
    InvalidFormat(String),
    #[error("Invalid private key length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("Invalid input `{value}`: {reason}")]
    InvalidInput { value: String, reason: String },
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Node query failed: {0}")]
    QueryFailed(String),
    #[error("Object {0} does not exist")]
    ObjectNotFound(ObjectID),
    #[error("Object {object_id} is not a shared object (owner: {owner})")]
    NotSharedObject { object_id: ObjectID, owner: String },
    #[error("Object {object_id} is shared and cannot be passed as an owned input")]
    NotOwnedObject { object_id: ObjectID },
    #[error("Cannot decode object {object_id}: {reason}")]
    ObjectDecode { object_id: ObjectID, reason: String },
    #[error("No coins of type {coin_type} found for address [{owner}]")]
    NoCoinsFound { owner: SuiAddress, coin_type: String },

    #[error("Malformed simulation response: {0}")]
    MalformedSimulationResponse(String),
    #[error("Dry run rejected by the node: {0}")]
    SimulationFailed(String),
    #[error(
        "Gas estimate is negative: computation {computation_cost} + storage {storage_cost} < rebate {storage_rebate}"
    )]
    NegativeGasEstimate {
        computation_cost: u64,
        storage_cost: u64,
        storage_rebate: u64,
    },

    #[error("Transaction assembly failed: {0}")]
    Assembly(String),
    #[error(transparent)]
    Bcs(#[from] bcs::Error),
    #[error("Transaction {digest:?} failed: {reason}")]
    ExecutionFailed {
        digest: Option<TransactionDigest>,
        reason: String,
    },
}

impl Error {
    pub fn invalid_input(value: impl Into<String>, reason: impl ToString) -> Self {
        Error::InvalidInput {
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    pub fn query_failed(err: impl ToString) -> Self {
        Error::QueryFailed(err.to_string())
    }
}
