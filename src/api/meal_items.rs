// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::ApiError,
    models::{MealItemList, MealItemsQuery},
    state::AppState,
};

/// Active meal items, optionally filtered by diet and meal slot.
#[utoipa::path(
    get,
    path = "/meal-items",
    params(MealItemsQuery),
    tag = "Meal Items",
    responses(
        (status = 200, body = MealItemList),
        (status = 400, description = "A filter is not true or false")
    )
)]
pub async fn list_meal_items(
    State(state): State<AppState>,
    Query(query): Query<MealItemsQuery>,
) -> Result<Json<MealItemList>, ApiError> {
    let data = state.meal_items().active(&query.filters()).await?;
    Ok(Json(MealItemList {
        success: true,
        count: data.len(),
        data,
    }))
}
