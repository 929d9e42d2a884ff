// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Read-only onboarding reference lists.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::RowId;
use crate::storage::{from_rows, Database, Direction, Query, StoreResult};

pub const MEAL_ITEM_LINKS: &str = "onboarding_meal_items_meal_types";
pub const ONBOARDING_MEAL_ITEMS: &str = "onboarding_meal_items";
pub const MEAL_TYPES: &str = "meal_types";

/// The simple reference lists, each backed by one `onboarding_*` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceList {
    Goals,
    DietaryPatterns,
    DietaryRestrictions,
    MedicalRestrictions,
    NutritionPreferences,
    SpiceLevels,
    CookingOils,
    Cuisines,
}

impl ReferenceList {
    pub const ALL: [ReferenceList; 8] = [
        ReferenceList::Goals,
        ReferenceList::DietaryPatterns,
        ReferenceList::DietaryRestrictions,
        ReferenceList::MedicalRestrictions,
        ReferenceList::NutritionPreferences,
        ReferenceList::SpiceLevels,
        ReferenceList::CookingOils,
        ReferenceList::Cuisines,
    ];

    /// Response key (`dietary_patterns`); the table is `onboarding_<key>`.
    pub fn key(self) -> &'static str {
        match self {
            ReferenceList::Goals => "goals",
            ReferenceList::DietaryPatterns => "dietary_patterns",
            ReferenceList::DietaryRestrictions => "dietary_restrictions",
            ReferenceList::MedicalRestrictions => "medical_restrictions",
            ReferenceList::NutritionPreferences => "nutrition_preferences",
            ReferenceList::SpiceLevels => "spice_levels",
            ReferenceList::CookingOils => "cooking_oils",
            ReferenceList::Cuisines => "cuisines",
        }
    }

    pub fn table(self) -> String {
        format!("onboarding_{}", self.key())
    }

    /// Parse the URL form (`dietary-patterns`).
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|list| list.key().replace('_', "-") == slug)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ReferenceOption {
    pub id: RowId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub display_order: Option<i32>,
}

/// A meal item offered during onboarding, with the diets that can eat it.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
pub struct MealItemOption {
    pub onboarding_meal_item_name: String,
    pub onboarding_meal_item_id: RowId,
    pub onboarding_meal_item_image_url: Option<String>,
    pub meal_type_name: String,
    pub meal_type_id: RowId,
    pub can_vegetarian_eat: Option<bool>,
    pub can_eggetarian_eat: Option<bool>,
    pub can_carnitarian_eat: Option<bool>,
    pub can_omnitarian_eat: Option<bool>,
    pub can_vegan_eat: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct MealItemLink {
    onboarding_meal_item_id: RowId,
    meal_type_id: RowId,
    #[serde(default)]
    can_vegetarian_eat: Option<bool>,
    #[serde(default)]
    can_eggetarian_eat: Option<bool>,
    #[serde(default)]
    can_carnitarian_eat: Option<bool>,
    #[serde(default)]
    can_omnitarian_eat: Option<bool>,
    #[serde(default)]
    can_vegan_eat: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct NamedRow {
    id: RowId,
    name: String,
    #[serde(default)]
    image_url: Option<String>,
}

pub struct ReferenceRepository<'a> {
    db: &'a dyn Database,
}

impl<'a> ReferenceRepository<'a> {
    pub fn new(db: &'a dyn Database) -> Self {
        Self { db }
    }

    /// Active options of one list, by `display_order`.
    pub async fn list(&self, list: ReferenceList) -> StoreResult<Vec<ReferenceOption>> {
        let query = Query::table(&list.table())
            .eq("is_active", true)
            .order_by("display_order", Direction::Asc);
        from_rows(self.db.select(&query).await?)
    }

    /// Meal items joined with their meal types. Links to inactive or missing
    /// items or types are dropped.
    pub async fn meal_items(&self) -> StoreResult<Vec<MealItemOption>> {
        let links_query =
            Query::table(MEAL_ITEM_LINKS).order_by("onboarding_meal_item_id", Direction::Asc);
        let items_query = Query::table(ONBOARDING_MEAL_ITEMS).eq("is_active", true);
        let types_query = Query::table(MEAL_TYPES);

        let (links, items, types) = tokio::try_join!(
            self.db.select(&links_query),
            self.db.select(&items_query),
            self.db.select(&types_query),
        )?;

        let links: Vec<MealItemLink> = from_rows(links)?;
        let items: HashMap<RowId, NamedRow> = from_rows::<NamedRow>(items)?
            .into_iter()
            .map(|row| (row.id.clone(), row))
            .collect();
        let types: HashMap<RowId, NamedRow> = from_rows::<NamedRow>(types)?
            .into_iter()
            .map(|row| (row.id.clone(), row))
            .collect();

        Ok(links
            .into_iter()
            .filter_map(|link| {
                let item = items.get(&link.onboarding_meal_item_id)?;
                let meal_type = types.get(&link.meal_type_id)?;
                Some(MealItemOption {
                    onboarding_meal_item_name: item.name.clone(),
                    onboarding_meal_item_id: item.id.clone(),
                    onboarding_meal_item_image_url: item.image_url.clone(),
                    meal_type_name: meal_type.name.clone(),
                    meal_type_id: meal_type.id.clone(),
                    can_vegetarian_eat: link.can_vegetarian_eat,
                    can_eggetarian_eat: link.can_eggetarian_eat,
                    can_carnitarian_eat: link.can_carnitarian_eat,
                    can_omnitarian_eat: link.can_omnitarian_eat,
                    can_vegan_eat: link.can_vegan_eat,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryDatabase;
    use serde_json::json;

    #[test]
    fn slugs_round_trip() {
        for list in ReferenceList::ALL {
            let slug = list.key().replace('_', "-");
            assert_eq!(ReferenceList::from_slug(&slug), Some(list));
        }
        assert_eq!(
            ReferenceList::DietaryPatterns.table(),
            "onboarding_dietary_patterns"
        );
        assert_eq!(ReferenceList::from_slug("dietary_patterns"), None);
        assert_eq!(ReferenceList::from_slug("meal-items"), None);
    }

    #[tokio::test]
    async fn list_returns_active_in_display_order() {
        let db = MemoryDatabase::new().with_rows(
            "onboarding_goals",
            vec![
                json!({"id": 1, "name": "Lose weight", "is_active": true, "display_order": 2}),
                json!({"id": 2, "name": "Eat healthy", "is_active": true, "display_order": 1}),
                json!({"id": 3, "name": "Retired", "is_active": false, "display_order": 0}),
            ],
        );
        let repo = ReferenceRepository::new(&db);

        let goals = repo.list(ReferenceList::Goals).await.unwrap();
        let names: Vec<&str> = goals.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Eat healthy", "Lose weight"]);
    }

    #[tokio::test]
    async fn meal_items_are_joined() {
        let db = MemoryDatabase::new()
            .with_rows(
                MEAL_ITEM_LINKS,
                vec![
                    json!({"onboarding_meal_item_id": 10, "meal_type_id": 1, "can_vegan_eat": true}),
                    json!({"onboarding_meal_item_id": 11, "meal_type_id": 2, "can_vegan_eat": false}),
                    json!({"onboarding_meal_item_id": 12, "meal_type_id": 1}),
                ],
            )
            .with_rows(
                ONBOARDING_MEAL_ITEMS,
                vec![
                    json!({"id": 10, "name": "Poha", "image_url": "https://img/poha.png", "is_active": true}),
                    json!({"id": 11, "name": "Rajma", "is_active": true}),
                    json!({"id": 12, "name": "Old dish", "is_active": false}),
                ],
            )
            .with_rows(
                MEAL_TYPES,
                vec![
                    json!({"id": 1, "name": "Breakfast"}),
                    json!({"id": 2, "name": "Lunch"}),
                ],
            );
        let repo = ReferenceRepository::new(&db);

        let items = repo.meal_items().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].onboarding_meal_item_name, "Poha");
        assert_eq!(items[0].meal_type_name, "Breakfast");
        assert_eq!(items[0].can_vegan_eat, Some(true));
        assert_eq!(
            items[0].onboarding_meal_item_image_url.as_deref(),
            Some("https://img/poha.png")
        );
        assert_eq!(items[1].onboarding_meal_item_name, "Rajma");
        assert_eq!(items[1].meal_type_id, RowId::Int(2));
    }
}
