// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;
use std::time::Duration;

use sui_types::base_types::{ObjectID, SequenceNumber};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::node::NodeClient;

#[cfg(test)]
#[path = "unit_tests/monitor_tests.rs"]
mod monitor_tests;

const CHANGE_CHANNEL_SIZE: usize = 16;

/// An observed bump of an object's version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionChange {
    pub object_id: ObjectID,
    pub from: SequenceNumber,
    pub to: SequenceNumber,
    /// Time since the previous version was first observed.
    pub elapsed: Duration,
    /// Latest checkpoint when the change was seen, if the node reported one.
    pub checkpoint: Option<u64>,
}

pub struct VersionMonitor;

impl VersionMonitor {
    /// Poll `object_id` every `period` and report each version change.
    ///
    /// Query failures are logged and retried on the next tick. The task stops when `cancel`
    /// is signalled or the returned receiver is dropped.
    pub fn spawn<N: NodeClient + ?Sized + 'static>(
        node: Arc<N>,
        object_id: ObjectID,
        initial_version: SequenceNumber,
        period: Duration,
        cancel: CancellationToken,
    ) -> (JoinHandle<()>, mpsc::Receiver<VersionChange>) {
        let (tx, rx) = mpsc::channel(CHANGE_CHANNEL_SIZE);
        let handle = tokio::spawn(async move {
            let mut poll = interval(period);
            poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut baseline = initial_version;
            let mut since = Instant::now();

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!(%object_id, "Shutdown received, stopping version monitor");
                        break;
                    }
                    _ = tx.closed() => {
                        debug!(%object_id, "Receiver dropped, stopping version monitor");
                        break;
                    }
                    _ = poll.tick() => {}
                }

                let info = match node.get_object(object_id).await {
                    Ok(info) => info,
                    Err(e) => {
                        warn!(%object_id, "Failed to poll object: {e}");
                        continue;
                    }
                };
                if info.version == baseline {
                    debug!(%object_id, version = baseline.value(), "No version change");
                    continue;
                }

                let checkpoint = match node.get_latest_checkpoint_sequence_number().await {
                    Ok(checkpoint) => Some(checkpoint),
                    Err(e) => {
                        warn!("Failed to fetch latest checkpoint: {e}");
                        None
                    }
                };
                let change = VersionChange {
                    object_id,
                    from: baseline,
                    to: info.version,
                    elapsed: since.elapsed(),
                    checkpoint,
                };
                info!(
                    %object_id,
                    from = change.from.value(),
                    to = change.to.value(),
                    elapsed_ms = change.elapsed.as_millis() as u64,
                    checkpoint = ?change.checkpoint,
                    "Object version changed"
                );
                if tx.send(change).await.is_err() {
                    debug!(%object_id, "Receiver dropped, stopping version monitor");
                    break;
                }
                baseline = info.version;
                since = Instant::now();
            }
        });
        (handle, rx)
    }
}
