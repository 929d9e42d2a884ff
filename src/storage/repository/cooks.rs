// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cook repository.
//!
//! Cooks belong to exactly one user. Every lookup is scoped by the owner, so
//! a cook id belonging to someone else behaves like an unknown id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::storage::{
    from_row, from_rows, null_as_default, to_row, Database, Direction, OwnedResource,
    OwnershipCheck, Query, StoreError, StoreResult,
};

pub const COOKS: &str = "cooks";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Cook {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub phone_number: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub languages_known: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_smart_phone: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl OwnedResource for Cook {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }

    fn kind() -> &'static str {
        "Cook"
    }
}

/// Validated fields of a new cook.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewCook {
    pub name: String,
    pub phone_number: String,
    pub languages_known: Vec<String>,
    pub has_smart_phone: bool,
}

/// Validated partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct CookChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages_known: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_smart_phone: Option<bool>,
}

impl CookChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone_number.is_none()
            && self.languages_known.is_none()
            && self.has_smart_phone.is_none()
    }
}

pub struct CookRepository<'a> {
    db: &'a dyn Database,
}

impl<'a> CookRepository<'a> {
    pub fn new(db: &'a dyn Database) -> Self {
        Self { db }
    }

    fn scoped(owner: Uuid, cook_id: Uuid) -> Query {
        Query::table(COOKS)
            .eq("id", cook_id.to_string())
            .eq("user_id", owner.to_string())
    }

    pub async fn add(&self, owner: Uuid, cook: NewCook) -> StoreResult<Cook> {
        let mut row = to_row(&cook)?;
        row.insert("user_id".to_string(), Value::String(owner.to_string()));
        from_row(self.db.insert(COOKS, row).await?)
    }

    /// All cooks of `owner`, oldest first.
    pub async fn list(&self, owner: Uuid) -> StoreResult<Vec<Cook>> {
        let query = Query::table(COOKS)
            .eq("user_id", owner.to_string())
            .order_by("created_at", Direction::Asc);
        from_rows(self.db.select(&query).await?)
    }

    pub async fn get(&self, owner: Uuid, cook_id: Uuid) -> StoreResult<Cook> {
        let rows = self
            .db
            .select(&Query::table(COOKS).eq("id", cook_id.to_string()).limit(1))
            .await?;
        let cook: Option<Cook> = rows.into_iter().next().map(from_row).transpose()?;
        cook.owned_by(owner)
    }

    pub async fn update(&self, owner: Uuid, cook_id: Uuid, changes: CookChanges) -> StoreResult<Cook> {
        let mut patch: Map<String, Value> = to_row(&changes)?;
        patch.insert("updated_at".to_string(), Value::String(Utc::now().to_rfc3339()));

        let rows = self.db.update(&Self::scoped(owner, cook_id), patch).await?;
        rows.into_iter()
            .next()
            .map(from_row)
            .transpose()?
            .ok_or_else(|| StoreError::NotFound(Cook::kind().to_string()))
    }

    pub async fn delete(&self, owner: Uuid, cook_id: Uuid) -> StoreResult<()> {
        let deleted = self.db.delete(&Self::scoped(owner, cook_id)).await?;
        if deleted.is_empty() {
            return Err(StoreError::NotFound(Cook::kind().to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryDatabase;

    fn ramesh() -> NewCook {
        NewCook {
            name: "Ramesh Kumar".to_string(),
            phone_number: "9876543210".to_string(),
            languages_known: vec!["Hindi".to_string(), "English".to_string()],
            has_smart_phone: true,
        }
    }

    #[tokio::test]
    async fn add_list_get() {
        let db = MemoryDatabase::new();
        let repo = CookRepository::new(&db);
        let owner = Uuid::new_v4();

        let cook = repo.add(owner, ramesh()).await.unwrap();
        assert_eq!(cook.user_id, owner);
        assert_eq!(cook.languages_known, vec!["Hindi", "English"]);

        let cooks = repo.list(owner).await.unwrap();
        assert_eq!(cooks, vec![cook.clone()]);
        assert_eq!(repo.get(owner, cook.id).await.unwrap(), cook);
    }

    #[tokio::test]
    async fn other_owner_sees_not_found() {
        let db = MemoryDatabase::new();
        let repo = CookRepository::new(&db);
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let cook = repo.add(owner, ramesh()).await.unwrap();

        assert!(repo.list(stranger).await.unwrap().is_empty());
        assert!(matches!(
            repo.get(stranger, cook.id).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            repo.update(
                stranger,
                cook.id,
                CookChanges {
                    name: Some("x".into()),
                    ..Default::default()
                }
            )
            .await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            repo.delete(stranger, cook.id).await,
            Err(StoreError::NotFound(_))
        ));

        // untouched
        assert_eq!(repo.get(owner, cook.id).await.unwrap().name, "Ramesh Kumar");
    }

    #[tokio::test]
    async fn update_changes_only_given_fields() {
        let db = MemoryDatabase::new();
        let repo = CookRepository::new(&db);
        let owner = Uuid::new_v4();
        let cook = repo.add(owner, ramesh()).await.unwrap();

        let updated = repo
            .update(
                owner,
                cook.id,
                CookChanges {
                    languages_known: Some(vec!["Tamil".into()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Ramesh Kumar");
        assert_eq!(updated.languages_known, vec!["Tamil"]);
        assert!(updated.updated_at.is_some());
    }

    #[tokio::test]
    async fn delete_removes_cook() {
        let db = MemoryDatabase::new();
        let repo = CookRepository::new(&db);
        let owner = Uuid::new_v4();
        let cook = repo.add(owner, ramesh()).await.unwrap();

        repo.delete(owner, cook.id).await.unwrap();
        assert!(repo.list(owner).await.unwrap().is_empty());
        assert!(matches!(
            repo.delete(owner, cook.id).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
