// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.
//!
//! [`CredentialError`] is raised by verifiers; [`AuthError`] is the access
//! guard's taxonomy and the only place failure kinds become HTTP statuses.

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Failure verifying or decoding a bearer credential.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    /// The credential cannot be decoded as a token of the issuer's format.
    #[error("credential is malformed")]
    Malformed,

    /// Signature, key, issuer or audience did not check out.
    #[error("credential is invalid: {0}")]
    Invalid(String),

    /// The credential's expiry timestamp is in the past.
    #[error("credential has expired")]
    Expired,

    /// The identity provider (or its signing keys) could not be reached.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Authentication error type.
#[derive(Debug)]
pub enum AuthError {
    /// No authorization header present
    MissingCredential,
    /// Authorization header is not `Bearer <token>`
    MalformedHeader,
    /// Credential verification failed
    Credential(CredentialError),
    /// Authenticated, but the resource belongs to someone else
    Forbidden,
    /// Store or other unexpected failure
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    detail: String,
}

impl AuthError {
    /// Stable machine-readable code, used in logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "missing_credential",
            AuthError::MalformedHeader => "malformed_header",
            AuthError::Credential(CredentialError::Malformed) => "malformed_token",
            AuthError::Credential(CredentialError::Invalid(_)) => "invalid_token",
            AuthError::Credential(CredentialError::Expired) => "token_expired",
            AuthError::Credential(CredentialError::Unavailable(_)) => "provider_unavailable",
            AuthError::Forbidden => "forbidden",
            AuthError::Internal(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredential
            | AuthError::MalformedHeader
            | AuthError::Credential(CredentialError::Malformed)
            | AuthError::Credential(CredentialError::Invalid(_))
            | AuthError::Credential(CredentialError::Expired) => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::Credential(CredentialError::Unavailable(_)) | AuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Full description for server-side logs. Never sent to clients.
    pub fn detail(&self) -> String {
        match self {
            AuthError::Credential(inner) => inner.to_string(),
            AuthError::Internal(msg) => format!("internal authentication error: {msg}"),
            other => other.to_string(),
        }
    }
}

impl From<CredentialError> for AuthError {
    fn from(err: CredentialError) -> Self {
        AuthError::Credential(err)
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingCredential => write!(f, "Authorization header is required"),
            AuthError::MalformedHeader => write!(
                f,
                "Invalid authorization header format. Expected: Bearer <token>"
            ),
            AuthError::Credential(CredentialError::Malformed) => {
                write!(f, "Invalid token format. Please login again.")
            }
            AuthError::Credential(CredentialError::Invalid(_)) => {
                write!(f, "Invalid token. Please login again.")
            }
            AuthError::Credential(CredentialError::Expired) => {
                write!(f, "Token expired. Please login again.")
            }
            AuthError::Credential(CredentialError::Unavailable(_)) | AuthError::Internal(_) => {
                write!(f, "{}", crate::error::INTERNAL_ERROR_MESSAGE)
            }
            AuthError::Forbidden => {
                write!(f, "You don't have permission to access this resource")
            }
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(
                error_code = self.error_code(),
                error = %self.detail(),
                "authentication failed with internal error"
            );
        } else {
            tracing::debug!(error_code = self.error_code(), "request rejected by access guard");
        }

        let body = Json(AuthErrorBody {
            detail: self.to_string(),
        });
        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
