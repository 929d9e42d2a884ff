// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Public onboarding reference data.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::ApiError,
    models::{Envelope, OnboardingOptions},
    state::AppState,
    storage::repository::{MealItemOption, ReferenceList, ReferenceOption},
};

/// Every onboarding list, fetched concurrently.
#[utoipa::path(
    get,
    path = "/onboarding",
    tag = "Onboarding",
    responses((status = 200, body = Envelope<OnboardingOptions>))
)]
pub async fn all_options(
    State(state): State<AppState>,
) -> Result<Json<Envelope<OnboardingOptions>>, ApiError> {
    let reference = state.reference();
    let (
        goals,
        dietary_patterns,
        dietary_restrictions,
        medical_restrictions,
        nutrition_preferences,
        spice_levels,
        cooking_oils,
        cuisines,
        meal_items,
    ) = tokio::try_join!(
        reference.list(ReferenceList::Goals),
        reference.list(ReferenceList::DietaryPatterns),
        reference.list(ReferenceList::DietaryRestrictions),
        reference.list(ReferenceList::MedicalRestrictions),
        reference.list(ReferenceList::NutritionPreferences),
        reference.list(ReferenceList::SpiceLevels),
        reference.list(ReferenceList::CookingOils),
        reference.list(ReferenceList::Cuisines),
        reference.meal_items(),
    )?;

    Ok(Json(Envelope::ok(OnboardingOptions {
        goals,
        dietary_patterns,
        dietary_restrictions,
        medical_restrictions,
        nutrition_preferences,
        spice_levels,
        cooking_oils,
        cuisines,
        meal_items,
    })))
}

/// One list, by its URL slug (`dietary-patterns`, `spice-levels`, ...).
#[utoipa::path(
    get,
    path = "/onboarding/{list}",
    params(
        ("list" = String, Path, description = "goals, dietary-patterns, dietary-restrictions, medical-restrictions, nutrition-preferences, spice-levels, cooking-oils or cuisines")
    ),
    tag = "Onboarding",
    responses(
        (status = 200, body = Envelope<Vec<ReferenceOption>>),
        (status = 404, description = "Unknown list")
    )
)]
pub async fn list_options(
    Path(slug): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Envelope<Vec<ReferenceOption>>>, ApiError> {
    let list = ReferenceList::from_slug(&slug)
        .ok_or_else(|| ApiError::not_found(format!("Unknown onboarding list: {slug}")))?;
    let options = state.reference().list(list).await?;
    Ok(Json(Envelope::ok(options)))
}

#[utoipa::path(
    get,
    path = "/onboarding/meal-items",
    tag = "Onboarding",
    responses((status = 200, body = Envelope<Vec<MealItemOption>>))
)]
pub async fn meal_items(
    State(state): State<AppState>,
) -> Result<Json<Envelope<Vec<MealItemOption>>>, ApiError> {
    let items = state.reference().meal_items().await?;
    Ok(Json(Envelope::ok(items)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::storage::MemoryDatabase;
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::Arc;

    fn state(db: MemoryDatabase) -> AppState {
        AppState::with_database(AppConfig::for_tests("onboarding-secret-16"), Arc::new(db))
            .unwrap()
    }

    fn seeded() -> MemoryDatabase {
        MemoryDatabase::new()
            .with_rows(
                "onboarding_spice_levels",
                vec![
                    json!({"id": 1, "name": "Mild", "is_active": true, "display_order": 1}),
                    json!({"id": 2, "name": "Hot", "is_active": true, "display_order": 2}),
                ],
            )
            .with_rows(
                "onboarding_goals",
                vec![json!({"id": "g1", "name": "Weight Loss", "is_active": true})],
            )
    }

    #[tokio::test]
    async fn single_list_by_slug() {
        let Json(envelope) = list_options(Path("spice-levels".into()), State(state(seeded())))
            .await
            .unwrap();
        let names: Vec<&str> = envelope.data.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["Mild", "Hot"]);
    }

    #[tokio::test]
    async fn unknown_slug_is_not_found() {
        let err = list_options(Path("desserts".into()), State(state(seeded())))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn all_lists_in_one_response() {
        let Json(envelope) = all_options(State(state(seeded()))).await.unwrap();
        let options = envelope.data;
        assert_eq!(options.spice_levels.len(), 2);
        assert_eq!(options.goals[0].name, "Weight Loss");
        assert!(options.cuisines.is_empty());
        assert!(options.meal_items.is_empty());

        let body = serde_json::to_value(&options).unwrap();
        for key in [
            "goals",
            "dietary_patterns",
            "dietary_restrictions",
            "medical_restrictions",
            "nutrition_preferences",
            "spice_levels",
            "cooking_oils",
            "cuisines",
            "meal_items",
        ] {
            assert!(body.get(key).is_some(), "missing {key}");
        }
    }
}
