// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sui_types::base_types::TransactionDigest;
use sui_types::crypto::Signature;
use sui_types::transaction::{
    CallArg, ObjectArg, ProgrammableTransaction, Transaction, TransactionData,
};
use tracing::info;

use crate::coin::select_gas_coin;
use crate::config::RunSettings;
use crate::error::{Error, SwapResult};
use crate::gas::estimate_budget;
use crate::node::{ExecutionReport, NodeClient};
use crate::object_ref::{resolve_owned, OwnedReference};
use crate::signer::SigningIdentity;

#[cfg(test)]
#[path = "unit_tests/submit_tests.rs"]
mod submit_tests;

/// A signed transaction, ready to be sent.
#[derive(Clone, Debug)]
pub struct PreparedTransaction {
    pub transaction: Transaction,
    pub signature: Signature,
    pub gas_coin: OwnedReference,
    pub gas_price: u64,
    pub gas_budget: u64,
}

impl PreparedTransaction {
    pub fn tx_data(&self) -> &TransactionData {
        self.transaction.transaction_data()
    }

    pub fn digest(&self) -> TransactionDigest {
        *self.transaction.digest()
    }

    /// BCS encoded transaction data, base64 encoded.
    pub fn tx_bytes_base64(&self) -> SwapResult<String> {
        Ok(STANDARD.encode(bcs::to_bytes(self.tx_data())?))
    }

    pub fn signature_base64(&self) -> String {
        STANDARD.encode(self.signature.as_ref())
    }
}

#[derive(Debug)]
pub enum SubmitOutcome {
    DryRun(PreparedTransaction),
    Executed {
        prepared: PreparedTransaction,
        report: ExecutionReport,
    },
}

/// Prices, signs and sends programmable transactions for one signer.
pub struct TransactionSubmitter<'a, N: ?Sized> {
    node: &'a N,
    signer: &'a SigningIdentity,
    settings: &'a RunSettings,
}

impl<'a, N: NodeClient + ?Sized> TransactionSubmitter<'a, N> {
    pub fn new(node: &'a N, signer: &'a SigningIdentity, settings: &'a RunSettings) -> Self {
        Self {
            node,
            signer,
            settings,
        }
    }

    /// The configured gas coin at its current version, or the signer's richest SUI coin.
    pub async fn gas_coin(&self) -> SwapResult<OwnedReference> {
        match self.settings.gas_coin {
            Some(object_id) => resolve_owned(self.node, object_id).await,
            None => select_gas_coin(self.node, self.signer.address()).await,
        }
    }

    /// Price `pt` from a dry run and sign it.
    pub async fn prepare(&self, pt: ProgrammableTransaction) -> SwapResult<PreparedTransaction> {
        let sender = self.signer.address();
        let gas_coin = self.gas_coin().await?;
        let gas_is_input = pt.inputs.iter().any(|input| match input {
            CallArg::Object(ObjectArg::ImmOrOwnedObject((id, _, _))) => *id == gas_coin.object_id,
            _ => false,
        });
        if gas_is_input {
            return Err(Error::Assembly(format!(
                "gas coin {} is also a transaction input; configure a different gas-coin",
                gas_coin.object_id
            )));
        }

        let reference_gas_price = self.node.get_reference_gas_price().await?;
        let gas_price = self.settings.margins.gas_price(reference_gas_price);
        info!(reference_gas_price, gas_price, "Gas price");

        let provisional = TransactionData::new_programmable(
            sender,
            vec![gas_coin.object_ref()],
            pt.clone(),
            self.settings.dry_run_gas_budget,
            gas_price,
        );
        let estimate = estimate_budget(self.node, &provisional).await?;
        let gas_budget = self.settings.margins.gas_budget(estimate);

        let tx_data = TransactionData::new_programmable(
            sender,
            vec![gas_coin.object_ref()],
            pt,
            gas_budget,
            gas_price,
        );
        let (transaction, signature) = self.signer.sign_and_wrap(tx_data);
        let prepared = PreparedTransaction {
            transaction,
            signature,
            gas_coin,
            gas_price,
            gas_budget,
        };
        info!(
            digest = %prepared.digest(),
            gas_budget,
            tx_bytes = %prepared.tx_bytes_base64()?,
            signature = %prepared.signature_base64(),
            "Signed transaction"
        );
        Ok(prepared)
    }

    /// Prepare `pt` and, unless `dry_run` is set, execute it.
    pub async fn run(
        &self,
        pt: ProgrammableTransaction,
        dry_run: bool,
    ) -> SwapResult<SubmitOutcome> {
        let prepared = self.prepare(pt).await?;
        if dry_run {
            info!(digest = %prepared.digest(), "Dry run only, transaction not sent");
            return Ok(SubmitOutcome::DryRun(prepared));
        }
        let report = self
            .node
            .execute_transaction(prepared.transaction.clone(), self.settings.wait_mode)
            .await?;
        info!(digest = %report.digest, gas_used = ?report.gas_used, "Transaction executed");
        Ok(SubmitOutcome::Executed { prepared, report })
    }
}
