// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Household cook endpoints, scoped to the owning user.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::Owner,
    error::ApiError,
    models::{CookList, CookRequest, DeleteCookResponse, Envelope, UpdateCookRequest},
    state::AppState,
    storage::Cook,
};

/// Cook ids that are not UUIDs cannot exist; report them like any missing cook.
fn cook_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found("Cook not found"))
}

#[utoipa::path(
    post,
    path = "/cook/user/{user_id}/cooks",
    params(("user_id" = String, Path, description = "Internal user id; must be the caller")),
    request_body = CookRequest,
    tag = "Cooks",
    security(("bearer" = [])),
    responses(
        (status = 201, body = Envelope<Cook>),
        (status = 400, description = "Invalid cook details"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Token belongs to another user")
    )
)]
pub async fn add_cook(
    Owner(user): Owner,
    State(state): State<AppState>,
    Json(request): Json<CookRequest>,
) -> Result<(StatusCode, Json<Envelope<Cook>>), ApiError> {
    let cook = state.cooks().add(user.user_id, request.validate()?).await?;
    info!(user_id = %user.user_id, cook_id = %cook.id, "cook added");
    Ok((StatusCode::CREATED, Json(Envelope::ok(cook))))
}

#[utoipa::path(
    get,
    path = "/cook/user/{user_id}/cooks",
    params(("user_id" = String, Path, description = "Internal user id; must be the caller")),
    tag = "Cooks",
    security(("bearer" = [])),
    responses(
        (status = 200, body = CookList),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Token belongs to another user")
    )
)]
pub async fn list_cooks(
    Owner(user): Owner,
    State(state): State<AppState>,
) -> Result<Json<CookList>, ApiError> {
    let cooks = state.cooks().list(user.user_id).await?;
    Ok(Json(CookList {
        success: true,
        count: cooks.len(),
        data: cooks,
    }))
}

#[utoipa::path(
    get,
    path = "/cook/user/{user_id}/cooks/{cook_id}",
    params(
        ("user_id" = String, Path, description = "Internal user id; must be the caller"),
        ("cook_id" = String, Path, description = "Cook id")
    ),
    tag = "Cooks",
    security(("bearer" = [])),
    responses(
        (status = 200, body = Envelope<Cook>),
        (status = 404, description = "No such cook for this user")
    )
)]
pub async fn get_cook(
    Owner(user): Owner,
    Path((_user_id, raw_cook_id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Json<Envelope<Cook>>, ApiError> {
    let cook = state.cooks().get(user.user_id, cook_id(&raw_cook_id)?).await?;
    Ok(Json(Envelope::ok(cook)))
}

#[utoipa::path(
    put,
    path = "/cook/user/{user_id}/cooks/{cook_id}",
    params(
        ("user_id" = String, Path, description = "Internal user id; must be the caller"),
        ("cook_id" = String, Path, description = "Cook id")
    ),
    request_body = UpdateCookRequest,
    tag = "Cooks",
    security(("bearer" = [])),
    responses(
        (status = 200, body = Envelope<Cook>),
        (status = 400, description = "Invalid values or nothing to update"),
        (status = 404, description = "No such cook for this user")
    )
)]
pub async fn update_cook(
    Owner(user): Owner,
    Path((_user_id, raw_cook_id)): Path<(String, String)>,
    State(state): State<AppState>,
    Json(request): Json<UpdateCookRequest>,
) -> Result<Json<Envelope<Cook>>, ApiError> {
    let cook_id = cook_id(&raw_cook_id)?;
    let changes = request.validate()?;
    let cook = state.cooks().update(user.user_id, cook_id, changes).await?;
    info!(user_id = %user.user_id, %cook_id, "cook updated");
    Ok(Json(Envelope::ok(cook)))
}

#[utoipa::path(
    delete,
    path = "/cook/user/{user_id}/cooks/{cook_id}",
    params(
        ("user_id" = String, Path, description = "Internal user id; must be the caller"),
        ("cook_id" = String, Path, description = "Cook id")
    ),
    tag = "Cooks",
    security(("bearer" = [])),
    responses(
        (status = 200, body = DeleteCookResponse),
        (status = 404, description = "No such cook for this user")
    )
)]
pub async fn delete_cook(
    Owner(user): Owner,
    Path((_user_id, raw_cook_id)): Path<(String, String)>,
    State(state): State<AppState>,
) -> Result<Json<DeleteCookResponse>, ApiError> {
    let cook_id = cook_id(&raw_cook_id)?;
    state.cooks().delete(user.user_id, cook_id).await?;
    info!(user_id = %user.user_id, %cook_id, "cook deleted");
    Ok(Json(DeleteCookResponse {
        success: true,
        message: "Cook deleted successfully".to_string(),
        cook_id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedUser;
    use crate::config::AppConfig;
    use crate::storage::MemoryDatabase;
    use chrono::{Duration, Utc};
    use std::sync::Arc;

    fn state() -> AppState {
        AppState::with_database(
            AppConfig::for_tests("cooks-route-secret-16"),
            Arc::new(MemoryDatabase::new()),
        )
        .unwrap()
    }

    fn owner(user_id: Uuid) -> Owner {
        Owner(AuthenticatedUser {
            user_id,
            subject: format!("uid-{user_id}"),
            phone_number: "+919876543210".into(),
            expires_at: Utc::now() + Duration::hours(1),
            is_new_user: false,
        })
    }

    fn ramesh() -> Json<CookRequest> {
        Json(CookRequest {
            name: "Ramesh Kumar".into(),
            phone_number: "9876543210".into(),
            languages_known: vec!["Hindi".into(), "English".into()],
            has_smart_phone: true,
        })
    }

    fn path(user_id: Uuid, cook_id: impl ToString) -> Path<(String, String)> {
        Path((user_id.to_string(), cook_id.to_string()))
    }

    #[tokio::test]
    async fn add_list_get_cook() {
        let state = state();
        let user = Uuid::new_v4();

        let (status, Json(created)) = add_cook(owner(user), State(state.clone()), ramesh())
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.data.user_id, user);
        assert_eq!(created.data.languages_known, vec!["Hindi", "English"]);

        let Json(list) = list_cooks(owner(user), State(state.clone())).await.unwrap();
        assert_eq!(list.count, 1);
        assert_eq!(list.data[0].id, created.data.id);

        let Json(fetched) = get_cook(owner(user), path(user, created.data.id), State(state))
            .await
            .unwrap();
        assert_eq!(fetched.data, created.data);
    }

    #[tokio::test]
    async fn other_users_cooks_are_not_found() {
        let state = state();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let (_, Json(created)) = add_cook(owner(alice), State(state.clone()), ramesh())
            .await
            .unwrap();

        let err = get_cook(owner(bob), path(bob, created.data.id), State(state.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let err = delete_cook(owner(bob), path(bob, created.data.id), State(state.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let Json(list) = list_cooks(owner(bob), State(state)).await.unwrap();
        assert_eq!(list.count, 0);
    }

    #[tokio::test]
    async fn update_then_delete() {
        let state = state();
        let user = Uuid::new_v4();
        let (_, Json(created)) = add_cook(owner(user), State(state.clone()), ramesh())
            .await
            .unwrap();
        let id = created.data.id;

        let changes = UpdateCookRequest {
            has_smart_phone: Some(false),
            ..Default::default()
        };
        let Json(updated) = update_cook(owner(user), path(user, id), State(state.clone()), Json(changes))
            .await
            .unwrap();
        assert!(!updated.data.has_smart_phone);
        assert_eq!(updated.data.name, "Ramesh Kumar");
        assert!(updated.data.updated_at.is_some());

        let Json(deleted) = delete_cook(owner(user), path(user, id), State(state.clone()))
            .await
            .unwrap();
        assert_eq!(deleted.cook_id, id);

        let err = get_cook(owner(user), path(user, id), State(state)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_input_is_rejected() {
        let state = state();
        let user = Uuid::new_v4();

        let bad = Json(CookRequest {
            name: String::new(),
            phone_number: "9876543210".into(),
            languages_known: vec![],
            has_smart_phone: false,
        });
        let err = add_cook(owner(user), State(state.clone()), bad).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = get_cook(owner(user), path(user, "not-a-uuid"), State(state))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
