// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Phone-OTP authentication for the FoodEasy API.
//!
//! ## Auth Flow
//!
//! 1. The mobile app completes phone-OTP sign-in with the identity provider
//! 2. The app sends `Authorization: Bearer <ID token>`
//! 3. The server:
//!    - verifies the token (provider JWKS, or the dev shared secret)
//!    - maps the `sub` claim to one internal user, creating it on first sight
//!    - on user-scoped routes, requires the path `user_id` to be the caller
//!
//! ## Security
//!
//! - Missing or malformed headers are rejected before any network call
//! - JWKS is fetched over HTTPS and cached for five minutes
//! - Clock skew leeway defaults to zero (`AUTH_CLOCK_SKEW_SECS`)

pub mod claims;
pub mod error;
pub mod expiry;
pub mod extractor;
pub mod guard;
pub mod jwks;
pub mod middleware;
pub mod resolver;
pub mod verifier;

pub use claims::{AuthenticatedUser, ExpiryInfo, VerifiedCredential};
pub use error::{AuthError, CredentialError};
pub use expiry::{advise, RefreshAdvice};
pub use extractor::Owner;
pub use guard::{bearer_token, AccessGuard};
pub use jwks::JwksManager;
pub use middleware::require_owner;
pub use resolver::{IdentityResolver, Resolution};
pub use verifier::{CredentialVerifier, FirebaseVerifier, SharedSecretVerifier};
