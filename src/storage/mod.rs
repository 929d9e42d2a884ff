// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! All persistent state lives in a managed Postgres database reached through
//! its REST interface. The [`Database`] trait is the narrow row-level seam the
//! repositories are written against:
//!
//! - [`RestDatabase`]: the production backend (PostgREST over HTTPS)
//! - [`MemoryDatabase`]: an in-process backend for development and tests
//!
//! ## Tables
//!
//! ```text
//! user_profiles                 one row per identity-provider subject
//! cooks                         cooks attached to a user
//! onboarding_*                  read-only reference lists
//! user_meal_plan                dated meal plans per user
//! user_meal_plan_details        planned items per date and meal type
//! ```
//!
//! Rows cross the seam as JSON objects; repositories convert them to typed
//! records immediately.

pub mod memory;
pub mod ownership;
pub mod query;
pub mod repository;
pub mod rest;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};

pub use memory::MemoryDatabase;
pub use ownership::{OwnedResource, OwnershipCheck};
pub use query::{Direction, Query};
pub use repository::{
    Cook, CookChanges, CookRepository, MealItemRepository, MealPlanRepository, NewCook,
    ProfileChanges, ReferenceRepository, UserProfile, UserRepository,
};
pub use rest::RestDatabase;

/// A single row as returned by the store.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Storage error type.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No row matched
    #[error("not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint rejected the write
    #[error("conflict: {0}")]
    Conflict(String),

    /// The store could not be reached or timed out
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store answered with an error status
    #[error("store rejected request with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// A row did not have the expected shape
    #[error("unexpected row shape: {0}")]
    Decode(String),
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Row-level access to the backing store.
#[async_trait]
pub trait Database: Send + Sync {
    async fn select(&self, query: &Query) -> StoreResult<Vec<Row>>;

    /// Insert one row and return it as stored (with defaults filled in).
    async fn insert(&self, table: &str, row: Row) -> StoreResult<Row>;

    /// Apply `patch` to every matching row; returns the updated rows.
    async fn update(&self, query: &Query, patch: Row) -> StoreResult<Vec<Row>>;

    /// Delete every matching row; returns the deleted rows.
    async fn delete(&self, query: &Query) -> StoreResult<Vec<Row>>;

    /// Cheap reachability check for readiness probes.
    async fn ping(&self) -> StoreResult<()>;

    fn backend(&self) -> &'static str;
}

pub(crate) fn from_row<T: DeserializeOwned>(row: Row) -> StoreResult<T> {
    serde_json::from_value(serde_json::Value::Object(row))
        .map_err(|e| StoreError::Decode(e.to_string()))
}

pub(crate) fn from_rows<T: DeserializeOwned>(rows: Vec<Row>) -> StoreResult<Vec<T>> {
    rows.into_iter().map(from_row).collect()
}

pub(crate) fn to_row<T: Serialize>(value: &T) -> StoreResult<Row> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Object(row)) => Ok(row),
        Ok(other) => Err(StoreError::Decode(format!("expected an object, got {other}"))),
        Err(e) => Err(StoreError::Decode(e.to_string())),
    }
}

/// Treat an explicit `null` column like a missing one.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct Sample {
        name: String,
        #[serde(default, deserialize_with = "null_as_default")]
        tags: Vec<String>,
    }

    #[test]
    fn rows_convert_to_records() {
        let row = to_row(&json!({"name": "a", "tags": null})).unwrap();
        let sample: Sample = from_row(row).unwrap();
        assert_eq!(sample.tags, Vec::<String>::new());

        let row = to_row(&json!({"name": "b"})).unwrap();
        assert_eq!(from_row::<Sample>(row).unwrap().name, "b");
    }

    #[test]
    fn wrong_shape_is_decode_error() {
        let row = to_row(&json!({"tags": []})).unwrap();
        assert!(matches!(from_row::<Sample>(row), Err(StoreError::Decode(_))));
        assert!(matches!(to_row(&json!([1, 2])), Err(StoreError::Decode(_))));
    }
}
