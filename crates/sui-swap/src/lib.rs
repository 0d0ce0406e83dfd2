// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Build, price, sign and send a swap through a Move pool on Sui.
//!
//! The pipeline loads a signer from a `suiprivkey` string, resolves the objects the swap call
//! reads or writes, estimates the gas budget with a dry run and submits the signed
//! transaction. All node access goes through [`node::NodeClient`].

pub mod coin;
pub mod config;
pub mod error;
pub mod gas;
pub mod monitor;
pub mod node;
pub mod object_ref;
pub mod signer;
pub mod submit;
pub mod swap;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{RunSettings, SwapConfig};
pub use error::{Error, SwapResult};
pub use node::NodeClient;
pub use signer::{load_signer, SigningIdentity};
pub use submit::{PreparedTransaction, SubmitOutcome, TransactionSubmitter};
pub use swap::SwapPlan;
