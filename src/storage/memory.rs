// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process [`Database`] used for development and tests.
//!
//! Mirrors the parts of the real schema the service relies on: generated
//! `id`/`created_at` defaults and unique columns.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::query::Query;
use super::repository::users::USER_PROFILES;
use super::{Database, Row, StoreError, StoreResult};

#[derive(Default)]
pub struct MemoryDatabase {
    tables: RwLock<HashMap<String, Vec<Row>>>,
    unique: HashMap<String, Vec<String>>,
}

impl MemoryDatabase {
    /// Empty store with the service's unique constraints.
    pub fn new() -> Self {
        Self::default().with_unique(USER_PROFILES, "firebase_uid")
    }

    pub fn with_unique(mut self, table: &str, column: &str) -> Self {
        self.unique
            .entry(table.to_string())
            .or_default()
            .push(column.to_string());
        self
    }

    /// Preload rows verbatim (no defaults, no constraint checks).
    pub fn with_rows(mut self, table: &str, rows: impl IntoIterator<Item = Value>) -> Self {
        let stored = self.tables.get_mut().entry(table.to_string()).or_default();
        stored.extend(rows.into_iter().filter_map(|value| match value {
            Value::Object(row) => Some(row),
            _ => None,
        }));
        self
    }

    fn check_unique(&self, table: &str, existing: &[Row], row: &Row, skip: Option<usize>) -> StoreResult<()> {
        let Some(columns) = self.unique.get(table) else {
            return Ok(());
        };
        for column in columns {
            let Some(value) = row.get(column).filter(|v| !v.is_null()) else {
                continue;
            };
            let clash = existing
                .iter()
                .enumerate()
                .any(|(idx, other)| Some(idx) != skip && other.get(column) == Some(value));
            if clash {
                return Err(StoreError::Conflict(format!("{table}.{column}")));
            }
        }
        Ok(())
    }
}

fn now_timestamp() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn select(&self, query: &Query) -> StoreResult<Vec<Row>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Row> = tables
            .get(query.table_name())
            .map(|rows| rows.iter().filter(|row| query.matches(row)).cloned().collect())
            .unwrap_or_default();
        query.arrange(&mut rows);
        Ok(rows)
    }

    async fn insert(&self, table: &str, mut row: Row) -> StoreResult<Row> {
        row.entry("id")
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        row.entry("created_at").or_insert_with(now_timestamp);

        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();
        self.check_unique(table, rows, &row, None)?;
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, query: &Query, patch: Row) -> StoreResult<Vec<Row>> {
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(query.table_name()) else {
            return Ok(Vec::new());
        };

        let targets: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| query.matches(row))
            .map(|(idx, _)| idx)
            .collect();

        for &idx in &targets {
            let mut candidate = rows[idx].clone();
            candidate.extend(patch.clone());
            self.check_unique(query.table_name(), rows, &candidate, Some(idx))?;
        }

        let mut updated = Vec::with_capacity(targets.len());
        for idx in targets {
            rows[idx].extend(patch.clone());
            updated.push(rows[idx].clone());
        }
        Ok(updated)
    }

    async fn delete(&self, query: &Query) -> StoreResult<Vec<Row>> {
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(query.table_name()) else {
            return Ok(Vec::new());
        };
        let (deleted, kept): (Vec<Row>, Vec<Row>) =
            rows.drain(..).partition(|row| query.matches(row));
        *rows = kept;
        Ok(deleted)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
