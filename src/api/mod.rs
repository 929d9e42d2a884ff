// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{debug_span, warn, Span};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{require_owner, ExpiryInfo},
    config::CorsOrigins,
    models::{
        AuthHealthResponse, CookList, CookRequest, CookSummary, DeleteCookResponse,
        IdTokenRequest, MealItemList, MealMessages, MealMessagesResponse, OnboardingOptions,
        OnboardingRequest, OnboardingStatus, ProfileUpdateRequest, RefreshTokenResponse,
        ResendOtpRequest, ResendOtpResponse, TokenCheck, UpdateCookRequest, VerifyOtpResponse,
    },
    state::AppState,
    storage::{
        repository::{MealItemOption, ReferenceOption},
        Cook, UserProfile,
    },
};

pub mod auth;
pub mod cooks;
pub mod health;
pub mod meal_items;
pub mod meal_messaging;
pub mod onboarding;
pub mod users;

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .route("/auth/verify-otp", post(auth::verify_otp))
        .route("/auth/test-token", post(auth::test_token))
        .route("/auth/token-info", post(auth::token_info))
        .route("/auth/refresh-token", post(auth::refresh_token))
        .route("/auth/resend-otp", post(auth::resend_otp))
        .route("/auth/health", get(auth::auth_health))
        .route("/onboarding", get(onboarding::all_options))
        .route("/onboarding/meal-items", get(onboarding::meal_items))
        .route("/onboarding/{list}", get(onboarding::list_options))
        .route("/meal-items", get(meal_items::list_meal_items));

    // Every route below addresses one user and is guarded against the caller.
    let owner_routes = Router::new()
        .route("/user/{user_id}", get(users::get_user))
        .route("/user/{user_id}/profile", put(users::update_profile))
        .route("/user/{user_id}/onboarding", put(users::update_onboarding))
        .route(
            "/user/{user_id}/onboarding-status",
            get(users::onboarding_status),
        )
        .route(
            "/cook/user/{user_id}/cooks",
            get(cooks::list_cooks).post(cooks::add_cook),
        )
        .route(
            "/cook/user/{user_id}/cooks/{cook_id}",
            get(cooks::get_cook)
                .put(cooks::update_cook)
                .delete(cooks::delete_cook),
        )
        .route(
            "/meal-messaging/{user_id}/today",
            get(meal_messaging::today_messages),
        )
        .route_layer(from_fn_with_state(state.clone(), require_owner));

    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .merge(public_routes)
        .merge(owner_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors),
        )
}

fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    match origins {
        CorsOrigins::Any => CorsLayer::permissive(),
        CorsOrigins::List(list) => {
            let origins: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!(%origin, "ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("none");

    debug_span!(
        "http-request",
        method = %request.method(),
        path = request.uri().path(),
        request_id
    )
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::root,
        health::health,
        health::liveness,
        health::readiness,
        auth::verify_otp,
        auth::test_token,
        auth::token_info,
        auth::refresh_token,
        auth::resend_otp,
        auth::auth_health,
        users::get_user,
        users::update_profile,
        users::update_onboarding,
        users::onboarding_status,
        cooks::add_cook,
        cooks::list_cooks,
        cooks::get_cook,
        cooks::update_cook,
        cooks::delete_cook,
        onboarding::all_options,
        onboarding::list_options,
        onboarding::meal_items,
        meal_items::list_meal_items,
        meal_messaging::today_messages
    ),
    components(
        schemas(
            health::ServiceInfo,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse,
            IdTokenRequest,
            VerifyOtpResponse,
            TokenCheck,
            ExpiryInfo,
            RefreshTokenResponse,
            ResendOtpRequest,
            ResendOtpResponse,
            AuthHealthResponse,
            UserProfile,
            ProfileUpdateRequest,
            OnboardingRequest,
            OnboardingStatus,
            Cook,
            CookRequest,
            UpdateCookRequest,
            CookList,
            DeleteCookResponse,
            ReferenceOption,
            MealItemOption,
            OnboardingOptions,
            MealItemList,
            MealMessages,
            CookSummary,
            MealMessagesResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health probes"),
        (name = "Authentication", description = "Phone OTP credential verification"),
        (name = "Users", description = "User profile and onboarding answers"),
        (name = "Cooks", description = "Household cooks"),
        (name = "Onboarding", description = "Onboarding reference lists"),
        (name = "Meal Items", description = "Meal item catalogue"),
        (name = "Meal Messaging", description = "Daily meal messages")
    )
)]
pub struct ApiDoc;
