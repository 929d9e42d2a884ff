// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Catalogue of active meal items.

use super::meal_plans::MEAL_ITEMS;
use crate::storage::{Database, Direction, Query, Row, StoreResult};

/// Columns never returned to clients.
pub const HIDDEN_COLUMNS: [&str; 2] = ["created_at", "is_active"];

/// Boolean columns a catalogue listing can be filtered on.
pub const FILTER_COLUMNS: [&str; 9] = [
    "can_vegetarian_eat",
    "can_eggetarian_eat",
    "can_carnitarian_eat",
    "can_omnitarian_eat",
    "can_vegan_eat",
    "is_breakfast",
    "is_lunch",
    "is_dinner",
    "is_snacks",
];

pub struct MealItemRepository<'a> {
    db: &'a dyn Database,
}

impl<'a> MealItemRepository<'a> {
    pub fn new(db: &'a dyn Database) -> Self {
        Self { db }
    }

    /// Active items matching every `(column, value)` filter, in id order.
    /// Rows keep their table columns apart from [`HIDDEN_COLUMNS`].
    pub async fn active(&self, filters: &[(&str, bool)]) -> StoreResult<Vec<Row>> {
        let query = filters
            .iter()
            .fold(Query::table(MEAL_ITEMS).eq("is_active", true), |query, (column, value)| {
                query.eq(column, *value)
            })
            .order_by("id", Direction::Asc);

        let mut rows = self.db.select(&query).await?;
        for row in &mut rows {
            for column in HIDDEN_COLUMNS {
                row.remove(column);
            }
        }
        Ok(rows)
    }
}
