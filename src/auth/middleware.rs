// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access guard as Axum middleware.
//!
//! Applied with `route_layer` to every user-scoped router, so a protected
//! handler cannot forget the check. On success the [`AuthenticatedUser`] is
//! stored in the request extensions, where the [`Owner`](super::Owner)
//! extractor picks it up.
//!
//! ```rust,ignore
//! let protected = Router::new()
//!     .route("/{user_id}", get(get_user))
//!     .route_layer(axum::middleware::from_fn_with_state(state.clone(), require_owner));
//! ```

use std::collections::HashMap;

use axum::{
    extract::{Path, Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{AuthError, AuthenticatedUser};
use crate::state::AppState;

/// Name of the path parameter holding the addressed user id.
pub const USER_ID_PARAM: &str = "user_id";

/// Run the access guard against the route's `{user_id}`.
pub async fn require_owner(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(path_user_id) = params.get(USER_ID_PARAM) else {
        return AuthError::Internal("guarded route has no user_id parameter".to_string())
            .into_response();
    };

    let authorization = request.headers().get(AUTHORIZATION).cloned();
    match state
        .guard()
        .authorize(authorization.as_ref(), path_user_id)
        .await
    {
        Ok(user) => {
            request.extensions_mut().insert::<AuthenticatedUser>(user);
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}
