// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for the authorized owner of a user-scoped route.
//!
//! ```rust,ignore
//! async fn get_user(Owner(user): Owner, State(state): State<AppState>) -> ... {
//!     // user.user_id equals the {user_id} in the path
//! }
//! ```

use std::collections::HashMap;

use axum::{
    extract::{FromRequestParts, Path},
    http::{header::AUTHORIZATION, request::Parts},
};

use super::middleware::USER_ID_PARAM;
use super::{AuthError, AuthenticatedUser};
use crate::state::AppState;

/// The caller, already checked to be the user the path addresses.
pub struct Owner(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Owner {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Set by `require_owner` when the route is layered.
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Owner(user));
        }

        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|e| AuthError::Internal(format!("path parameters unavailable: {e}")))?;
        let path_user_id = params
            .get(USER_ID_PARAM)
            .ok_or_else(|| AuthError::Internal("route has no user_id parameter".to_string()))?;

        let user = state
            .guard()
            .authorize(parts.headers.get(AUTHORIZATION), path_user_id)
            .await?;
        parts.extensions.insert(user.clone());
        Ok(Owner(user))
    }
}
