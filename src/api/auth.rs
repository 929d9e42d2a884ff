// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Public authentication endpoints.
//!
//! OTP delivery and token refresh happen in the provider's client SDK; the
//! server verifies the resulting ID token and reports on its lifetime.

use axum::{extract::State, Json};
use tracing::info;

use super::health::{check_store, check_verifier};
use crate::{
    auth::{advise, expiry::PROVIDER_TOKEN_LIFETIME_SECS, AuthError, ExpiryInfo},
    error::ApiError,
    models::{
        AuthHealthResponse, Envelope, IdTokenRequest, MessageEnvelope, RefreshTokenResponse,
        ResendOtpRequest, ResendOtpResponse, TokenCheck, VerifyOtpResponse,
    },
    state::AppState,
};

pub const RESEND_OTP_MESSAGE: &str =
    "Phone number validated. Please call Firebase signInWithPhoneNumber() on client to resend OTP.";
pub const RESEND_OTP_NOTE: &str = "Actual OTP sending is handled by Firebase SDK on the client side.";
pub const TOKEN_VERIFIED_MESSAGE: &str = "Token verified successfully";
pub const REFRESH_TOKEN_MESSAGE: &str =
    "Token refresh must be done client-side using Firebase SDK: await user.getIdToken(true)";

/// Verify the ID token from a completed OTP sign-in and find or create the user.
#[utoipa::path(
    post,
    path = "/auth/verify-otp",
    request_body = IdTokenRequest,
    tag = "Authentication",
    responses(
        (status = 200, body = VerifyOtpResponse),
        (status = 400, description = "Empty id_token"),
        (status = 401, description = "Invalid, malformed or expired token")
    )
)]
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(request): Json<IdTokenRequest>,
) -> Result<Json<VerifyOtpResponse>, ApiError> {
    let token = request.token()?;
    let verified = state
        .verifier
        .verify(token)
        .await
        .map_err(AuthError::from)?;

    let resolution = state
        .resolver()
        .resolve(&verified.subject, &verified.phone_number)
        .await?;
    info!(
        user_id = %resolution.user.id,
        is_new_user = resolution.is_new_user,
        "phone sign-in verified"
    );

    Ok(Json(VerifyOtpResponse {
        user_id: resolution.user.id,
        phone_number: verified.phone_number,
        is_new_user: resolution.is_new_user,
    }))
}

/// Verify an ID token and echo its claims, without touching user records.
#[utoipa::path(
    post,
    path = "/auth/test-token",
    request_body = IdTokenRequest,
    tag = "Authentication",
    responses(
        (status = 200, body = MessageEnvelope<TokenCheck>),
        (status = 400, description = "Empty id_token"),
        (status = 401, description = "Invalid, malformed or expired token")
    )
)]
pub async fn test_token(
    State(state): State<AppState>,
    Json(request): Json<IdTokenRequest>,
) -> Result<Json<MessageEnvelope<TokenCheck>>, ApiError> {
    let token = request.token()?;
    let verified = state
        .verifier
        .verify(token)
        .await
        .map_err(AuthError::from)?;
    Ok(Json(MessageEnvelope::ok(
        TOKEN_VERIFIED_MESSAGE,
        TokenCheck::from(verified),
    )))
}

/// Expiry details of an ID token. Expired tokens are reported, not rejected.
#[utoipa::path(
    post,
    path = "/auth/token-info",
    request_body = IdTokenRequest,
    tag = "Authentication",
    responses(
        (status = 200, body = Envelope<ExpiryInfo>),
        (status = 401, description = "Invalid or malformed token")
    )
)]
pub async fn token_info(
    State(state): State<AppState>,
    Json(request): Json<IdTokenRequest>,
) -> Result<Json<Envelope<ExpiryInfo>>, ApiError> {
    let token = request.token()?;
    let info = state
        .verifier
        .inspect(token)
        .await
        .map_err(AuthError::from)?;
    Ok(Json(Envelope::ok(info)))
}

/// Whether the client should fetch a fresh ID token now.
#[utoipa::path(
    post,
    path = "/auth/refresh-token",
    request_body = IdTokenRequest,
    tag = "Authentication",
    responses(
        (status = 200, body = RefreshTokenResponse),
        (status = 401, description = "Invalid or malformed token")
    )
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<IdTokenRequest>,
) -> Result<Json<RefreshTokenResponse>, ApiError> {
    let token = request.token()?;
    let info = state
        .verifier
        .inspect(token)
        .await
        .map_err(AuthError::from)?;
    let advice = advise(&info);

    Ok(Json(RefreshTokenResponse {
        success: true,
        needs_refresh: advice.needs_refresh,
        expires_in_seconds: advice.expires_in_seconds,
        data: info,
        message: REFRESH_TOKEN_MESSAGE.to_string(),
    }))
}

/// Validate a phone number before the client asks the provider to resend.
#[utoipa::path(
    post,
    path = "/auth/resend-otp",
    request_body = ResendOtpRequest,
    tag = "Authentication",
    responses(
        (status = 200, body = ResendOtpResponse),
        (status = 400, description = "Not an E.164 phone number")
    )
)]
pub async fn resend_otp(
    Json(request): Json<ResendOtpRequest>,
) -> Result<Json<ResendOtpResponse>, ApiError> {
    let phone_number = request.validate()?;
    Ok(Json(ResendOtpResponse {
        success: true,
        message: RESEND_OTP_MESSAGE.to_string(),
        phone_number: phone_number.to_string(),
        note: RESEND_OTP_NOTE.to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/auth/health",
    tag = "Authentication",
    responses((status = 200, body = AuthHealthResponse))
)]
pub async fn auth_health(State(state): State<AppState>) -> Json<AuthHealthResponse> {
    let (verifier_ok, store_ok) = tokio::join!(check_verifier(&state), check_store(&state));
    let status = |ok: bool| if ok { "connected" } else { "unavailable" }.to_string();

    Json(AuthHealthResponse {
        success: verifier_ok && store_ok,
        service: "auth".to_string(),
        verifier: state.verifier.name().to_string(),
        verifier_status: status(verifier_ok),
        store: state.database.backend().to_string(),
        store_status: status(store_ok),
        token_expiration_seconds: PROVIDER_TOKEN_LIFETIME_SECS,
    })
}
