// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Today's meal messages for the household cook.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;

use crate::{
    auth::Owner,
    error::ApiError,
    models::{CookSummary, MealMessageQuery, MealMessages, MealMessagesResponse},
    reminders::{day_message, meals_by_type},
    state::AppState,
    storage::repository::RowId,
};

/// Messages are produced in English only.
pub const MESSAGE_LANGUAGE: &str = "en";
pub const NO_PLAN_MESSAGE: &str = "No meal plan found for today";
pub const NO_COOK_MESSAGE: &str = "No cook found. Messages are in English only.";

#[utoipa::path(
    get,
    path = "/meal-messaging/{user_id}/today",
    params(
        ("user_id" = String, Path, description = "Internal user id; must be the caller"),
        MealMessageQuery
    ),
    tag = "Meal Messaging",
    security(("bearer" = [])),
    responses(
        (status = 200, body = MealMessagesResponse),
        (status = 400, description = "Bad date or meal type"),
        (status = 404, description = "No active plan covers the date")
    )
)]
pub async fn today_messages(
    Owner(user): Owner,
    State(state): State<AppState>,
    Query(query): Query<MealMessageQuery>,
) -> Result<Json<MealMessagesResponse>, ApiError> {
    let day = query.day(Utc::now().date_naive())?;
    let meal_type = query.meal_type()?.map(RowId::Int);

    let plans = state.meal_plans();
    let plan = plans
        .active_plan_for(user.user_id, day)
        .await?
        .ok_or_else(|| ApiError::not_found(NO_PLAN_MESSAGE))?;
    let meals = meals_by_type(plans.meals_on(&plan.id, day, meal_type.as_ref()).await?);
    if meals.is_empty() {
        return Err(ApiError::not_found(NO_PLAN_MESSAGE));
    }

    let cooks = state.cooks().list(user.user_id).await?;
    let cook = match query.cook_id {
        Some(id) => cooks.into_iter().find(|cook| cook.id == id),
        None => cooks.into_iter().next(),
    };

    let english = day_message(&meals);
    let message = cook.is_none().then(|| NO_COOK_MESSAGE.to_string());

    Ok(Json(MealMessagesResponse {
        success: true,
        date: day,
        messages: MealMessages {
            cook_language: english.clone(),
            english,
            cook_language_code: MESSAGE_LANGUAGE.to_string(),
        },
        meals: meals
            .into_iter()
            .map(|(meal_type, items)| (meal_type.key().to_string(), items))
            .collect(),
        cook: cook.map(|cook| CookSummary {
            id: cook.id,
            name: cook.name,
            language: MESSAGE_LANGUAGE.to_string(),
            languages_known: cook.languages_known,
        }),
        message,
    }))
}
