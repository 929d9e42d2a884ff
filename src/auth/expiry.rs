// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Refresh advice for clients holding a credential close to expiry.

use serde::Serialize;
use utoipa::ToSchema;

use super::claims::ExpiryInfo;

/// A credential with this many seconds (or fewer) left should be refreshed.
pub const REFRESH_THRESHOLD_SECS: i64 = 300;

/// Lifetime of an ID token issued by the provider.
pub const PROVIDER_TOKEN_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct RefreshAdvice {
    pub expires_in_seconds: i64,
    pub needs_refresh: bool,
}

pub fn advise(info: &ExpiryInfo) -> RefreshAdvice {
    RefreshAdvice {
        expires_in_seconds: info.expires_in_seconds,
        needs_refresh: info.expires_in_seconds <= REFRESH_THRESHOLD_SECS,
    }
}
