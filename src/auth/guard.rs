// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access guard for user-scoped routes.
//!
//! Steps, in order:
//!
//! 1. Extract the bearer credential (missing or malformed header fails before
//!    any network call)
//! 2. Verify it
//! 3. Resolve the subject to an internal user
//! 4. Compare with the `user_id` the route addresses

use axum::http::HeaderValue;
use tracing::{debug, warn};
use uuid::Uuid;

use super::claims::AuthenticatedUser;
use super::error::AuthError;
use super::resolver::IdentityResolver;
use super::verifier::CredentialVerifier;
use crate::logging::credential_preview;

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&HeaderValue>) -> Result<&str, AuthError> {
    let value = header
        .ok_or(AuthError::MissingCredential)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AuthError::MalformedHeader),
    }
}

pub struct AccessGuard<'a> {
    verifier: &'a dyn CredentialVerifier,
    resolver: IdentityResolver<'a>,
}

impl<'a> AccessGuard<'a> {
    pub fn new(verifier: &'a dyn CredentialVerifier, resolver: IdentityResolver<'a>) -> Self {
        Self { verifier, resolver }
    }

    /// Steps 1-3: who is calling.
    pub async fn authenticate(
        &self,
        authorization: Option<&HeaderValue>,
    ) -> Result<AuthenticatedUser, AuthError> {
        let token = bearer_token(authorization)?;

        let verified = self.verifier.verify(token).await.map_err(|err| {
            debug!(
                token = %credential_preview(token),
                error = %err,
                "credential rejected"
            );
            AuthError::Credential(err)
        })?;

        let resolution = self
            .resolver
            .resolve(&verified.subject, &verified.phone_number)
            .await
            .map_err(|err| AuthError::Internal(err.to_string()))?;

        Ok(AuthenticatedUser {
            user_id: resolution.user.id,
            subject: verified.subject,
            phone_number: verified.phone_number,
            expires_at: verified.expires_at,
            is_new_user: resolution.is_new_user,
        })
    }

    /// All four steps: the caller must be the user the route addresses.
    pub async fn authorize(
        &self,
        authorization: Option<&HeaderValue>,
        path_user_id: &str,
    ) -> Result<AuthenticatedUser, AuthError> {
        let caller = self.authenticate(authorization).await?;

        match Uuid::parse_str(path_user_id) {
            Ok(requested) if requested == caller.user_id => Ok(caller),
            _ => {
                warn!(
                    caller = %caller.user_id,
                    requested = %path_user_id,
                    "caller addressed another user's resources"
                );
                Err(AuthError::Forbidden)
            }
        }
    }
}
