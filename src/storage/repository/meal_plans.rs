// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Meal plan repository (read side).
//!
//! Plans are generated elsewhere; this service only reads which plans are
//! active on a date and which meals they hold for it.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::reference::MEAL_TYPES;
use super::RowId;
use crate::storage::{from_row, from_rows, Database, Direction, Query, StoreResult};

pub const USER_MEAL_PLAN: &str = "user_meal_plan";
pub const USER_MEAL_PLAN_DETAILS: &str = "user_meal_plan_details";
pub const MEAL_ITEMS: &str = "meal_items";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct MealPlan {
    pub id: RowId,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Items planned for one meal type on one date.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct MealGroup {
    pub meal_type_id: RowId,
    /// Lower-cased meal type name (`breakfast`, `lunch`, ...)
    pub meal_type: String,
    pub items: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PlanDetail {
    meal_type_id: RowId,
    meal_item_id: RowId,
}

#[derive(Debug, Deserialize)]
struct Named {
    id: RowId,
    name: String,
}

pub struct MealPlanRepository<'a> {
    db: &'a dyn Database,
}

impl<'a> MealPlanRepository<'a> {
    pub fn new(db: &'a dyn Database) -> Self {
        Self { db }
    }

    fn active_on(date: NaiveDate) -> Query {
        let day = date.to_string();
        Query::table(USER_MEAL_PLAN)
            .eq("is_active", true)
            .lte("start_date", day.clone())
            .gte("end_date", day)
    }

    /// Every active plan whose range covers `date`.
    pub async fn active_plans_on(&self, date: NaiveDate) -> StoreResult<Vec<MealPlan>> {
        let query = Self::active_on(date).order_by("id", Direction::Desc);
        from_rows(self.db.select(&query).await?)
    }

    /// The newest active plan of `user_id` covering `date`.
    pub async fn active_plan_for(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Option<MealPlan>> {
        let query = Self::active_on(date)
            .eq("user_id", user_id.to_string())
            .order_by("id", Direction::Desc)
            .limit(1);
        let rows = self.db.select(&query).await?;
        rows.into_iter().next().map(from_row).transpose()
    }

    /// Meals of `plan` on `date`, grouped by meal type in meal-type id order.
    pub async fn meals_on(
        &self,
        plan: &RowId,
        date: NaiveDate,
        meal_type_id: Option<&RowId>,
    ) -> StoreResult<Vec<MealGroup>> {
        let mut query = Query::table(USER_MEAL_PLAN_DETAILS)
            .eq("user_meal_plan_id", plan)
            .eq("date", date.to_string())
            .eq("is_active", true);
        if let Some(meal_type_id) = meal_type_id {
            query = query.eq("meal_type_id", meal_type_id);
        }
        let query = query.order_by("meal_type_id", Direction::Asc);

        let details: Vec<PlanDetail> = from_rows(self.db.select(&query).await?)?;
        if details.is_empty() {
            return Ok(Vec::new());
        }

        let type_ids: Vec<&RowId> = details.iter().map(|d| &d.meal_type_id).collect();
        let item_ids: Vec<&RowId> = details.iter().map(|d| &d.meal_item_id).collect();
        let types_query = Query::table(MEAL_TYPES).one_of("id", type_ids);
        let items_query = Query::table(MEAL_ITEMS).one_of("id", item_ids);
        let (types, items) = tokio::try_join!(
            self.db.select(&types_query),
            self.db.select(&items_query),
        )?;

        let type_names = names_by_id(from_rows(types)?);
        let item_names = names_by_id(from_rows(items)?);

        let mut groups: Vec<MealGroup> = Vec::new();
        for detail in details {
            let (Some(meal_type), Some(item)) = (
                type_names.get(&detail.meal_type_id),
                item_names.get(&detail.meal_item_id),
            ) else {
                continue;
            };
            let meal_type = meal_type.to_lowercase();
            match groups.iter_mut().find(|g| g.meal_type == meal_type) {
                Some(group) => group.items.push(item.clone()),
                None => groups.push(MealGroup {
                    meal_type_id: detail.meal_type_id,
                    meal_type,
                    items: vec![item.clone()],
                }),
            }
        }
        Ok(groups)
    }
}

fn names_by_id(rows: Vec<Named>) -> HashMap<RowId, String> {
    rows.into_iter()
        .filter(|row| !row.name.trim().is_empty())
        .map(|row| (row.id, row.name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryDatabase;
    use serde_json::json;

    fn seeded(user: Uuid) -> MemoryDatabase {
        MemoryDatabase::new()
            .with_rows(
                USER_MEAL_PLAN,
                vec![
                    json!({"id": 1, "user_id": user.to_string(), "is_active": true,
                           "start_date": "2025-01-01", "end_date": "2025-01-31"}),
                    json!({"id": 2, "user_id": user.to_string(), "is_active": false,
                           "start_date": "2025-01-01", "end_date": "2025-01-31"}),
                ],
            )
            .with_rows(
                USER_MEAL_PLAN_DETAILS,
                vec![
                    json!({"user_meal_plan_id": 1, "date": "2025-01-15", "meal_type_id": 2, "meal_item_id": 20, "is_active": true}),
                    json!({"user_meal_plan_id": 1, "date": "2025-01-15", "meal_type_id": 1, "meal_item_id": 10, "is_active": true}),
                    json!({"user_meal_plan_id": 1, "date": "2025-01-15", "meal_type_id": 1, "meal_item_id": 11, "is_active": true}),
                    json!({"user_meal_plan_id": 1, "date": "2025-01-15", "meal_type_id": 1, "meal_item_id": 12, "is_active": false}),
                    json!({"user_meal_plan_id": 1, "date": "2025-01-16", "meal_type_id": 1, "meal_item_id": 10, "is_active": true}),
                ],
            )
            .with_rows(
                MEAL_TYPES,
                vec![json!({"id": 1, "name": "Breakfast"}), json!({"id": 2, "name": "Lunch"})],
            )
            .with_rows(
                MEAL_ITEMS,
                vec![
                    json!({"id": 10, "name": "Poha"}),
                    json!({"id": 11, "name": "Chai"}),
                    json!({"id": 12, "name": "Upma"}),
                    json!({"id": 20, "name": "Dal Rice"}),
                ],
            )
    }

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn finds_active_plans_covering_date() {
        let user = Uuid::new_v4();
        let db = seeded(user);
        let repo = MealPlanRepository::new(&db);

        let plans = repo.active_plans_on(day("2025-01-15")).await.unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].id, RowId::Int(1));
        assert!(repo.active_plans_on(day("2025-02-01")).await.unwrap().is_empty());

        assert!(repo
            .active_plan_for(user, day("2025-01-31"))
            .await
            .unwrap()
            .is_some());
        assert!(repo
            .active_plan_for(Uuid::new_v4(), day("2025-01-15"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn meals_grouped_by_type_in_id_order() {
        let db = seeded(Uuid::new_v4());
        let repo = MealPlanRepository::new(&db);

        let groups = repo
            .meals_on(&RowId::Int(1), day("2025-01-15"), None)
            .await
            .unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].meal_type, "breakfast");
        assert_eq!(groups[0].items, vec!["Poha", "Chai"]);
        assert_eq!(groups[1].meal_type, "lunch");
        assert_eq!(groups[1].items, vec!["Dal Rice"]);
    }

    #[tokio::test]
    async fn meals_filtered_by_type() {
        let db = seeded(Uuid::new_v4());
        let repo = MealPlanRepository::new(&db);

        let groups = repo
            .meals_on(&RowId::Int(1), day("2025-01-15"), Some(&RowId::Int(2)))
            .await
            .unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].meal_type, "lunch");

        let none = repo
            .meals_on(&RowId::Int(1), day("2025-01-20"), None)
            .await
            .unwrap();
        assert!(none.is_empty());
    }
}
