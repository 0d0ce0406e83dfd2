// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! An in-memory [`NodeClient`] for tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bech32::{ToBase32, Variant};
use serde_json::json;
use sui_types::base_types::{ObjectDigest, ObjectID, SequenceNumber, SuiAddress};
use sui_types::crypto::SignatureScheme;
use sui_types::gas::GasCostSummary;
use sui_types::transaction::{Transaction, TransactionData};

use crate::error::{Error, SwapResult};
use crate::node::{CoinInfo, ExecutionReport, NodeClient, ObjectInfo, ObjectOwnership, WaitMode};
use crate::signer::{load_signer, SigningIdentity, SEED_LENGTH, SUI_PRIV_KEY_PREFIX};

pub const TEST_GAS_PRICE: u64 = 1000;

pub fn simulated_effects(computation: u64, storage: u64, rebate: u64) -> serde_json::Value {
    json!({
        "messageVersion": "v1",
        "status": { "status": "success" },
        "executedEpoch": "0",
        "gasUsed": {
            "computationCost": computation.to_string(),
            "storageCost": storage.to_string(),
            "storageRebate": rebate.to_string(),
            "nonRefundableStorageFee": "0"
        }
    })
}

/// `suiprivkey` encoding of an Ed25519 seed.
pub fn encode_private_key(seed: [u8; SEED_LENGTH]) -> String {
    let mut payload = vec![SignatureScheme::ED25519.flag()];
    payload.extend_from_slice(&seed);
    bech32::encode(SUI_PRIV_KEY_PREFIX, payload.to_base32(), Variant::Bech32).unwrap()
}

pub fn test_signer(seed_byte: u8) -> SigningIdentity {
    load_signer(&encode_private_key([seed_byte; SEED_LENGTH])).unwrap()
}

pub struct MockNode {
    objects: Mutex<BTreeMap<ObjectID, ObjectInfo>>,
    coins: Mutex<Vec<CoinInfo>>,
    gas_price: u64,
    dry_run: Mutex<Result<serde_json::Value, String>>,
    execution_failure: Mutex<Option<String>>,
    offline: Mutex<bool>,
    checkpoint: AtomicUsize,
    get_object_calls: AtomicUsize,
    dry_runs: Mutex<Vec<TransactionData>>,
    executed: Mutex<Vec<Transaction>>,
}

impl Default for MockNode {
    fn default() -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            coins: Mutex::new(vec![]),
            gas_price: TEST_GAS_PRICE,
            dry_run: Mutex::new(Ok(simulated_effects(1000, 500, 200))),
            execution_failure: Mutex::new(None),
            offline: Mutex::new(false),
            checkpoint: AtomicUsize::new(0),
            get_object_calls: AtomicUsize::new(0),
            dry_runs: Mutex::new(vec![]),
            executed: Mutex::new(vec![]),
        }
    }
}

impl MockNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gas_price(mut self, gas_price: u64) -> Self {
        self.gas_price = gas_price;
        self
    }

    pub fn insert_object(&self, object_id: ObjectID, version: u64, owner: ObjectOwnership) {
        self.objects.lock().unwrap().insert(
            object_id,
            ObjectInfo {
                object_id,
                version: SequenceNumber::from_u64(version),
                digest: ObjectDigest::random(),
                owner,
            },
        );
    }

    pub fn add_owned(&self, owner: SuiAddress, version: u64) -> ObjectID {
        let id = ObjectID::random();
        self.insert_object(id, version, ObjectOwnership::Owned(owner));
        id
    }

    pub fn add_shared(&self, initial_shared_version: u64) -> ObjectID {
        let id = ObjectID::random();
        self.insert_object(
            id,
            initial_shared_version + 10,
            ObjectOwnership::Shared {
                initial_shared_version: SequenceNumber::from_u64(initial_shared_version),
            },
        );
        id
    }

    /// Bump the version of `object_id`, as a transaction touching it would.
    pub fn mutate(&self, object_id: ObjectID) {
        let mut objects = self.objects.lock().unwrap();
        let info = objects.get_mut(&object_id).expect("unknown object");
        info.version = SequenceNumber::from_u64(info.version.value() + 1);
        info.digest = ObjectDigest::random();
    }

    pub fn add_coin(&self, owner: SuiAddress, coin_type: &str, balance: u64) -> ObjectID {
        let id = self.add_owned(owner, 1);
        let object_ref = self.objects.lock().unwrap()[&id].object_ref();
        self.coins.lock().unwrap().push(CoinInfo {
            coin_type: coin_type.to_string(),
            object_ref,
            balance,
        });
        id
    }

    pub fn set_dry_run(&self, response: Result<serde_json::Value, String>) {
        *self.dry_run.lock().unwrap() = response;
    }

    pub fn fail_execution(&self, reason: &str) {
        *self.execution_failure.lock().unwrap() = Some(reason.to_string());
    }

    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock().unwrap() = offline;
    }

    pub fn set_checkpoint(&self, checkpoint: usize) {
        self.checkpoint.store(checkpoint, Ordering::SeqCst);
    }

    pub fn get_object_calls(&self) -> usize {
        self.get_object_calls.load(Ordering::SeqCst)
    }

    pub fn dry_runs(&self) -> Vec<TransactionData> {
        self.dry_runs.lock().unwrap().clone()
    }

    pub fn executed(&self) -> Vec<Transaction> {
        self.executed.lock().unwrap().clone()
    }

    fn check_online(&self) -> SwapResult<()> {
        if *self.offline.lock().unwrap() {
            return Err(Error::QueryFailed("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl NodeClient for MockNode {
    async fn get_object(&self, object_id: ObjectID) -> SwapResult<ObjectInfo> {
        self.get_object_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        self.objects
            .lock()
            .unwrap()
            .get(&object_id)
            .cloned()
            .ok_or(Error::ObjectNotFound(object_id))
    }

    async fn get_coins(&self, owner: SuiAddress, coin_type: &str) -> SwapResult<Vec<CoinInfo>> {
        self.check_online()?;
        let objects = self.objects.lock().unwrap();
        Ok(self
            .coins
            .lock()
            .unwrap()
            .iter()
            .filter(|coin| coin.coin_type == coin_type)
            .filter(|coin| {
                objects.get(&coin.object_ref.0).map(|info| info.owner)
                    == Some(ObjectOwnership::Owned(owner))
            })
            .cloned()
            .collect())
    }

    async fn get_reference_gas_price(&self) -> SwapResult<u64> {
        self.check_online()?;
        Ok(self.gas_price)
    }

    async fn dry_run_transaction(
        &self,
        tx_data: TransactionData,
    ) -> SwapResult<serde_json::Value> {
        self.check_online()?;
        self.dry_runs.lock().unwrap().push(tx_data);
        self.dry_run
            .lock()
            .unwrap()
            .clone()
            .map_err(Error::SimulationFailed)
    }

    async fn execute_transaction(
        &self,
        tx: Transaction,
        _wait_mode: WaitMode,
    ) -> SwapResult<ExecutionReport> {
        self.check_online()?;
        let digest = *tx.digest();
        if let Some(reason) = self.execution_failure.lock().unwrap().clone() {
            return Err(Error::ExecutionFailed {
                digest: Some(digest),
                reason,
            });
        }
        self.executed.lock().unwrap().push(tx);
        Ok(ExecutionReport {
            digest,
            gas_used: Some(GasCostSummary::new(1000, 500, 200, 0)),
        })
    }

    async fn get_latest_checkpoint_sequence_number(&self) -> SwapResult<u64> {
        self.check_online()?;
        Ok(self.checkpoint.load(Ordering::SeqCst) as u64)
    }
}
