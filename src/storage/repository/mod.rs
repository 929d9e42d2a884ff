// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the row store.
//!
//! Each repository borrows a [`Database`](super::Database) and converts rows
//! to records at the boundary.

pub mod cooks;
pub mod meal_items;
pub mod meal_plans;
pub mod reference;
pub mod users;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

pub use cooks::{Cook, CookChanges, CookRepository, NewCook};
pub use meal_items::MealItemRepository;
pub use meal_plans::{MealGroup, MealPlan, MealPlanRepository};
pub use reference::{MealItemOption, ReferenceList, ReferenceOption, ReferenceRepository};
pub use users::{ProfileChanges, UserProfile, UserRepository};

/// Primary key of a reference or plan row: integer or text, as the table
/// defines it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum RowId {
    Int(i64),
    Text(String),
}

impl From<&RowId> for Value {
    fn from(id: &RowId) -> Self {
        match id {
            RowId::Int(n) => Value::from(*n),
            RowId::Text(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Int(n) => write!(f, "{n}"),
            RowId::Text(s) => f.write_str(s),
        }
    }
}
