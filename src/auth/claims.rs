// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims, verified credentials and the authenticated caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::error::CredentialError;

/// Claims carried by both provider ID tokens and development tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the identity provider's stable user id
    pub sub: String,
    #[serde(default)]
    pub iat: i64,
    pub exp: i64,
    #[serde(default)]
    pub iss: String,
    /// Provider project id; validated by `jsonwebtoken`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl TokenClaims {
    pub fn issued_at(&self) -> Result<DateTime<Utc>, CredentialError> {
        DateTime::from_timestamp(self.iat, 0).ok_or(CredentialError::Malformed)
    }

    pub fn expires_at(&self) -> Result<DateTime<Utc>, CredentialError> {
        DateTime::from_timestamp(self.exp, 0).ok_or(CredentialError::Malformed)
    }
}

/// Outcome of a successful verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedCredential {
    pub subject: String,
    pub phone_number: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Absent on development tokens
    pub audience: Option<String>,
}

impl TryFrom<TokenClaims> for VerifiedCredential {
    type Error = CredentialError;

    fn try_from(claims: TokenClaims) -> Result<Self, Self::Error> {
        if claims.sub.trim().is_empty() {
            return Err(CredentialError::Invalid("empty subject".to_string()));
        }
        let issued_at = claims.issued_at()?;
        let expires_at = claims.expires_at()?;
        let phone_number = claims
            .phone_number
            .filter(|phone| !phone.trim().is_empty())
            .ok_or_else(|| CredentialError::Invalid("no phone number claim".to_string()))?;

        Ok(Self {
            subject: claims.sub,
            phone_number,
            issued_at,
            expires_at,
            audience: claims.aud,
        })
    }
}

/// Expiry facts about a credential, computed against a given instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExpiryInfo {
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Seconds until expiry; negative once expired
    pub expires_in_seconds: i64,
    pub is_expired: bool,
}

impl ExpiryInfo {
    pub fn new(issued_at: DateTime<Utc>, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let expires_in_seconds = (expires_at - now).num_seconds();
        Self {
            issued_at,
            expires_at,
            expires_in_seconds,
            // Whole seconds, matching how `exp` is checked on verification.
            is_expired: expires_at.timestamp() < now.timestamp(),
        }
    }
}

/// Authenticated, authorized caller attached to guarded requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Internal user id (the `user_profiles` row id)
    pub user_id: Uuid,
    pub subject: String,
    pub phone_number: String,
    pub expires_at: DateTime<Utc>,
    pub is_new_user: bool,
}
