// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User profile repository.
//!
//! One row per identity-provider subject. `full_name` is a column; the other
//! profile answers (age, gender, household sizes, dietary choices) live in
//! the `metadata` bag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::storage::{
    from_row, from_rows, null_as_default, to_row, Database, Query, StoreError, StoreResult,
};

pub const USER_PROFILES: &str = "user_profiles";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct UserProfile {
    pub id: Uuid,
    /// Identity-provider subject
    pub firebase_uid: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    #[schema(value_type = Object)]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Serialize)]
struct NewUserRow<'a> {
    firebase_uid: &'a str,
    phone_number: &'a str,
    last_login: DateTime<Utc>,
}

/// Changes to apply to a profile. `metadata` keys are merged, not replaced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileChanges {
    pub full_name: Option<String>,
    pub metadata: Map<String, Value>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.metadata.is_empty()
    }
}

/// Repository for user profiles.
pub struct UserRepository<'a> {
    db: &'a dyn Database,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a dyn Database) -> Self {
        Self { db }
    }

    async fn find_one(&self, query: Query) -> StoreResult<Option<UserProfile>> {
        let rows = self.db.select(&query.limit(1)).await?;
        rows.into_iter().next().map(from_row).transpose()
    }

    pub async fn find_by_id(&self, user_id: Uuid) -> StoreResult<Option<UserProfile>> {
        self.find_one(Query::table(USER_PROFILES).eq("id", user_id.to_string()))
            .await
    }

    /// Get a profile, failing with `NotFound` when absent.
    pub async fn get(&self, user_id: Uuid) -> StoreResult<UserProfile> {
        self.find_by_id(user_id)
            .await?
            .ok_or_else(|| StoreError::NotFound("User".to_string()))
    }

    pub async fn find_by_subject(&self, subject: &str) -> StoreResult<Option<UserProfile>> {
        self.find_one(Query::table(USER_PROFILES).eq("firebase_uid", subject))
            .await
    }

    /// Fetch several profiles at once; unknown ids are skipped.
    pub async fn list_by_ids(&self, user_ids: &[Uuid]) -> StoreResult<Vec<UserProfile>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids = user_ids.iter().map(Uuid::to_string);
        from_rows(
            self.db
                .select(&Query::table(USER_PROFILES).one_of("id", ids))
                .await?,
        )
    }

    /// Insert a profile for a first-time subject. `Conflict` if one exists.
    pub async fn create(&self, subject: &str, phone_number: &str) -> StoreResult<UserProfile> {
        let row = to_row(&NewUserRow {
            firebase_uid: subject,
            phone_number,
            last_login: Utc::now(),
        })?;
        from_row(self.db.insert(USER_PROFILES, row).await?)
    }

    pub async fn touch_last_login(&self, user_id: Uuid) -> StoreResult<UserProfile> {
        let mut patch = Map::new();
        patch.insert("last_login".to_string(), Value::String(Utc::now().to_rfc3339()));
        self.update_row(user_id, patch).await
    }

    /// Apply profile changes and return the updated profile.
    ///
    /// The metadata merge reads the stored bag and writes the merged bag
    /// back in a second request. The row store has no atomic JSON merge
    /// over its REST interface, so two concurrent updates of the same user
    /// can drop each other's keys (last write wins). Keys written by one
    /// update are kept by every later, non-overlapping update.
    pub async fn update(&self, user_id: Uuid, changes: ProfileChanges) -> StoreResult<UserProfile> {
        let mut patch = Map::new();
        if let Some(full_name) = changes.full_name {
            patch.insert("full_name".to_string(), Value::String(full_name));
        }
        if !changes.metadata.is_empty() {
            let mut metadata = self.get(user_id).await?.metadata;
            metadata.extend(changes.metadata);
            patch.insert("metadata".to_string(), Value::Object(metadata));
        }
        patch.insert("updated_at".to_string(), Value::String(Utc::now().to_rfc3339()));
        self.update_row(user_id, patch).await
    }

    async fn update_row(&self, user_id: Uuid, patch: Map<String, Value>) -> StoreResult<UserProfile> {
        let query = Query::table(USER_PROFILES).eq("id", user_id.to_string());
        let rows = self.db.update(&query, patch).await?;
        rows.into_iter()
            .next()
            .map(from_row)
            .transpose()?
            .ok_or_else(|| StoreError::NotFound("User".to_string()))
    }
}
