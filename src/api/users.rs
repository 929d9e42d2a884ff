// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User profile endpoints. Every route is owner-only.

use axum::{extract::State, Json};
use chrono::Utc;
use tracing::info;

use crate::{
    auth::Owner,
    error::ApiError,
    models::{Envelope, MessageEnvelope, OnboardingRequest, OnboardingStatus, ProfileUpdateRequest},
    state::AppState,
    storage::UserProfile,
};

#[utoipa::path(
    get,
    path = "/user/{user_id}",
    params(("user_id" = String, Path, description = "Internal user id; must be the caller")),
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, body = Envelope<UserProfile>),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Token belongs to another user"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    Owner(user): Owner,
    State(state): State<AppState>,
) -> Result<Json<Envelope<UserProfile>>, ApiError> {
    let profile = state.users().get(user.user_id).await?;
    Ok(Json(Envelope::ok(profile)))
}

/// Update `full_name` and merge profile answers into the metadata bag.
#[utoipa::path(
    put,
    path = "/user/{user_id}/profile",
    params(("user_id" = String, Path, description = "Internal user id; must be the caller")),
    request_body = ProfileUpdateRequest,
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, body = MessageEnvelope<UserProfile>),
        (status = 400, description = "Invalid values or nothing to update"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Token belongs to another user")
    )
)]
pub async fn update_profile(
    Owner(user): Owner,
    State(state): State<AppState>,
    Json(request): Json<ProfileUpdateRequest>,
) -> Result<Json<MessageEnvelope<UserProfile>>, ApiError> {
    let changes = request.into_changes()?;
    let profile = state.users().update(user.user_id, changes).await?;
    info!(user_id = %user.user_id, "profile updated");
    Ok(Json(MessageEnvelope::ok(
        "User profile updated successfully",
        profile,
    )))
}

/// Save onboarding answers and mark onboarding as completed.
#[utoipa::path(
    put,
    path = "/user/{user_id}/onboarding",
    params(("user_id" = String, Path, description = "Internal user id; must be the caller")),
    request_body = OnboardingRequest,
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, body = MessageEnvelope<UserProfile>),
        (status = 400, description = "Invalid values"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Token belongs to another user"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_onboarding(
    Owner(user): Owner,
    State(state): State<AppState>,
    Json(request): Json<OnboardingRequest>,
) -> Result<Json<MessageEnvelope<UserProfile>>, ApiError> {
    let changes = request.into_changes(Utc::now())?;
    let profile = state.users().update(user.user_id, changes).await?;
    info!(user_id = %user.user_id, "onboarding completed");
    Ok(Json(MessageEnvelope::ok(
        "Onboarding data saved successfully",
        profile,
    )))
}

#[utoipa::path(
    get,
    path = "/user/{user_id}/onboarding-status",
    params(("user_id" = String, Path, description = "Internal user id; must be the caller")),
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, body = Envelope<OnboardingStatus>),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Token belongs to another user")
    )
)]
pub async fn onboarding_status(
    Owner(user): Owner,
    State(state): State<AppState>,
) -> Result<Json<Envelope<OnboardingStatus>>, ApiError> {
    let profile = state.users().get(user.user_id).await?;
    Ok(Json(Envelope::ok(OnboardingStatus::from(&profile))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedUser;
    use crate::config::AppConfig;
    use crate::storage::MemoryDatabase;
    use axum::http::StatusCode;
    use chrono::Duration;
    use serde_json::json;
    use std::sync::Arc;

    async fn signed_in() -> (AppState, Owner) {
        let state = AppState::with_database(
            AppConfig::for_tests("users-route-secret-16"),
            Arc::new(MemoryDatabase::new()),
        )
        .unwrap();
        let profile = state.users().create("uid-1", "+919876543210").await.unwrap();
        let owner = Owner(AuthenticatedUser {
            user_id: profile.id,
            subject: "uid-1".into(),
            phone_number: "+919876543210".into(),
            expires_at: Utc::now() + Duration::hours(1),
            is_new_user: false,
        });
        (state, owner)
    }

    fn owner_of(owner: &Owner) -> Owner {
        Owner(owner.0.clone())
    }

    #[tokio::test]
    async fn get_user_returns_profile() {
        let (state, owner) = signed_in().await;
        let id = owner.0.user_id;

        let Json(envelope) = get_user(owner, State(state)).await.unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.data.id, id);
        assert_eq!(envelope.data.firebase_uid, "uid-1");
    }

    #[tokio::test]
    async fn profile_update_merges_metadata() {
        let (state, owner) = signed_in().await;

        let first: ProfileUpdateRequest =
            serde_json::from_value(json!({"age": 34, "metadata": {"theme": "dark"}})).unwrap();
        update_profile(owner_of(&owner), State(state.clone()), Json(first))
            .await
            .unwrap();

        let second: ProfileUpdateRequest =
            serde_json::from_value(json!({"full_name": "Priya Sharma", "gender": "female"}))
                .unwrap();
        let Json(envelope) = update_profile(owner, State(state), Json(second))
            .await
            .unwrap();

        assert_eq!(envelope.message, "User profile updated successfully");
        let profile = envelope.data;
        assert_eq!(profile.full_name.as_deref(), Some("Priya Sharma"));
        assert_eq!(profile.phone_number.as_deref(), Some("+919876543210"));
        assert_eq!(profile.metadata["age"], json!(34));
        assert_eq!(profile.metadata["theme"], json!("dark"));
        assert_eq!(profile.metadata["gender"], json!("female"));
        assert!(profile.updated_at.is_some());
    }

    #[tokio::test]
    async fn empty_profile_update_is_bad_request() {
        let (state, owner) = signed_in().await;
        let request: ProfileUpdateRequest =
            serde_json::from_value(json!({"firebase_uid": "other"})).unwrap();

        let err = update_profile(owner, State(state), Json(request))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "No fields provided to update");
    }

    #[tokio::test]
    async fn onboarding_flips_status() {
        let (state, owner) = signed_in().await;

        let Json(before) = onboarding_status(owner_of(&owner), State(state.clone()))
            .await
            .unwrap();
        assert_eq!(
            before.data,
            OnboardingStatus {
                onboarding_completed: false,
                onboarding_completed_at: None,
                has_name: false,
            }
        );

        let request: OnboardingRequest = serde_json::from_value(json!({
            "full_name": "Priya Sharma",
            "goals": ["Weight Loss"],
            "spice_level": "Medium"
        }))
        .unwrap();
        let Json(saved) = update_onboarding(owner_of(&owner), State(state.clone()), Json(request))
            .await
            .unwrap();
        assert_eq!(saved.message, "Onboarding data saved successfully");
        assert_eq!(saved.data.metadata["spice_level"], json!("Medium"));

        let Json(after) = onboarding_status(owner, State(state)).await.unwrap();
        assert!(after.data.onboarding_completed);
        assert!(after.data.onboarding_completed_at.is_some());
        assert!(after.data.has_name);
    }
}
