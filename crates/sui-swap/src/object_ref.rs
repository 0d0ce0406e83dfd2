// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use sui_types::base_types::{ObjectDigest, ObjectID, ObjectRef, SequenceNumber};
use sui_types::transaction::ObjectArg;
use tracing::debug;

use crate::error::{Error, SwapResult};
use crate::node::{NodeClient, ObjectOwnership};

#[cfg(test)]
#[path = "unit_tests/object_ref_tests.rs"]
mod object_ref_tests;

/// A single-owner object at the version it had when it was resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OwnedReference {
    pub object_id: ObjectID,
    pub version: SequenceNumber,
    pub digest: ObjectDigest,
}

impl OwnedReference {
    pub fn object_ref(&self) -> ObjectRef {
        (self.object_id, self.version, self.digest)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SharedReference {
    pub object_id: ObjectID,
    pub initial_shared_version: SequenceNumber,
    /// Whether the transaction intends to write the object.
    pub mutable: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectReference {
    Owned(OwnedReference),
    Shared(SharedReference),
}

impl From<OwnedReference> for ObjectArg {
    fn from(r: OwnedReference) -> Self {
        ObjectArg::ImmOrOwnedObject(r.object_ref())
    }
}

impl From<SharedReference> for ObjectArg {
    fn from(r: SharedReference) -> Self {
        ObjectArg::SharedObject {
            id: r.object_id,
            initial_shared_version: r.initial_shared_version,
            mutable: r.mutable,
        }
    }
}

impl From<ObjectReference> for ObjectArg {
    fn from(r: ObjectReference) -> Self {
        match r {
            ObjectReference::Owned(owned) => owned.into(),
            ObjectReference::Shared(shared) => shared.into(),
        }
    }
}

/// Fetch the current version and digest of `object_id`.
///
/// Immutable objects are referenced the same way as owned ones. Shared objects are rejected.
pub async fn resolve_owned(
    node: &(impl NodeClient + ?Sized),
    object_id: ObjectID,
) -> SwapResult<OwnedReference> {
    let info = node.get_object(object_id).await?;
    if let ObjectOwnership::Shared { .. } = info.owner {
        return Err(Error::NotOwnedObject { object_id });
    }
    debug!(
        %object_id,
        version = info.version.value(),
        digest = %info.digest,
        "Resolved owned object"
    );
    Ok(OwnedReference {
        object_id,
        version: info.version,
        digest: info.digest,
    })
}

/// Fetch the initial shared version of `object_id`. `mutable` is recorded as given.
pub async fn resolve_shared(
    node: &(impl NodeClient + ?Sized),
    object_id: ObjectID,
    mutable: bool,
) -> SwapResult<SharedReference> {
    let info = node.get_object(object_id).await?;
    match info.owner {
        ObjectOwnership::Shared {
            initial_shared_version,
        } => {
            debug!(
                %object_id,
                initial_shared_version = initial_shared_version.value(),
                mutable,
                "Resolved shared object"
            );
            Ok(SharedReference {
                object_id,
                initial_shared_version,
                mutable,
            })
        }
        owner => Err(Error::NotSharedObject {
            object_id,
            owner: owner.to_string(),
        }),
    }
}
