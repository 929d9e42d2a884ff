// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership enforcement for user-scoped records.
//!
//! A record owned by someone else is reported as not found, so ids belonging
//! to other users are indistinguishable from ids that do not exist.

use uuid::Uuid;

use super::{StoreError, StoreResult};

/// Trait for resources that have an owner.
pub trait OwnedResource {
    /// Internal id of the owning user.
    fn owner_id(&self) -> Uuid;

    /// Entity name used in not-found errors.
    fn kind() -> &'static str;
}

/// Narrow a lookup result to records owned by `owner`.
pub trait OwnershipCheck<T> {
    fn owned_by(self, owner: Uuid) -> StoreResult<T>;
}

impl<T: OwnedResource> OwnershipCheck<T> for Option<T> {
    fn owned_by(self, owner: Uuid) -> StoreResult<T> {
        match self {
            Some(resource) if resource.owner_id() == owner => Ok(resource),
            _ => Err(StoreError::NotFound(T::kind().to_string())),
        }
    }
}
