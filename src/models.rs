// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the REST API. Requests are validated at
//! the boundary (`validate` / `into_*`) so handlers and repositories only
//! ever see checked values.
//!
//! ## Model Categories
//!
//! - **Envelopes**: `{"success": true, "data": ...}` wrappers
//! - **Auth**: OTP verification and token introspection
//! - **Profile**: profile updates, onboarding answers, onboarding status
//! - **Cooks**: household cooks
//! - **Meal messaging**: today's meal messages for the cook

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::{ExpiryInfo, VerifiedCredential};
use crate::error::ApiError;
use crate::storage::repository::meal_items::FILTER_COLUMNS;
use crate::storage::repository::{MealItemOption, ReferenceOption};
use crate::storage::{Cook, CookChanges, NewCook, ProfileChanges, UserProfile};

pub const NAME_MAX_CHARS: usize = 100;
pub const COOK_PHONE_MIN_CHARS: usize = 10;
pub const COOK_PHONE_MAX_CHARS: usize = 15;
pub const EXTRA_INPUT_MAX_CHARS: usize = 1000;
pub const MAX_AGE: i64 = 120;

/// Metadata keys written when onboarding is saved.
pub const ONBOARDING_COMPLETED_KEY: &str = "onboarding_completed";
pub const ONBOARDING_COMPLETED_AT_KEY: &str = "onboarding_completed_at";

const NO_FIELDS_MESSAGE: &str = "No fields provided to update";

fn check_chars(field: &str, value: &str, min: usize, max: usize) -> Result<(), ApiError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(ApiError::bad_request(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    Ok(())
}

fn check_range(field: &str, value: i64, min: i64, max: Option<i64>) -> Result<(), ApiError> {
    let too_big = max.is_some_and(|max| value > max);
    if value < min || too_big {
        let message = match max {
            Some(max) => format!("{field} must be between {min} and {max}"),
            None => format!("{field} must be at least {min}"),
        };
        return Err(ApiError::bad_request(message));
    }
    Ok(())
}

// =============================================================================
// Envelopes
// =============================================================================

/// Standard success envelope.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Success envelope carrying a human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct MessageEnvelope<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> MessageEnvelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

// =============================================================================
// Auth
// =============================================================================

/// Body of every endpoint that takes a provider ID token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IdTokenRequest {
    /// ID token from the identity provider's client SDK
    pub id_token: String,
}

impl IdTokenRequest {
    /// The trimmed token; blank tokens are rejected.
    pub fn token(&self) -> Result<&str, ApiError> {
        let token = self.id_token.trim();
        if token.is_empty() {
            return Err(ApiError::bad_request("id_token cannot be empty"));
        }
        Ok(token)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct VerifyOtpResponse {
    pub user_id: Uuid,
    pub phone_number: String,
    /// True only on the first sign-in of this phone identity
    pub is_new_user: bool,
}

/// Claims of a verified ID token, as reported by `/auth/test-token`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct TokenCheck {
    pub uid: String,
    pub phone_number: String,
    /// Token audience; the provider project id
    pub project_id: Option<String>,
    /// Unix seconds
    pub issued_at: i64,
    /// Unix seconds
    pub expires_at: i64,
}

impl From<VerifiedCredential> for TokenCheck {
    fn from(verified: VerifiedCredential) -> Self {
        Self {
            uid: verified.subject,
            phone_number: verified.phone_number,
            project_id: verified.audience,
            issued_at: verified.issued_at.timestamp(),
            expires_at: verified.expires_at.timestamp(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct RefreshTokenResponse {
    pub success: bool,
    pub needs_refresh: bool,
    pub expires_in_seconds: i64,
    pub data: ExpiryInfo,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResendOtpRequest {
    /// Phone number in E.164 format, e.g. `+919876543210`
    pub phone_number: String,
}

impl ResendOtpRequest {
    /// `+`, a non-zero digit, then at most 14 more digits.
    pub fn validate(&self) -> Result<&str, ApiError> {
        let phone = self.phone_number.trim();
        let valid = phone
            .strip_prefix('+')
            .filter(|digits| (2..=15).contains(&digits.len()))
            .filter(|digits| digits.bytes().all(|b| b.is_ascii_digit()))
            .is_some_and(|digits| !digits.starts_with('0'));
        if !valid {
            return Err(ApiError::bad_request(
                "Invalid phone number format. Use E.164 format (e.g., +919876543210)",
            ));
        }
        Ok(phone)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ResendOtpResponse {
    pub success: bool,
    pub message: String,
    pub phone_number: String,
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AuthHealthResponse {
    pub success: bool,
    pub service: String,
    /// Credential verifier in use and whether it can verify right now
    pub verifier: String,
    pub verifier_status: String,
    pub store: String,
    pub store_status: String,
    /// Typical lifetime of a provider ID token
    pub token_expiration_seconds: i64,
}

// =============================================================================
// Profile
// =============================================================================

/// `PUT /user/{user_id}/profile`. Unknown fields (including `id`,
/// `firebase_uid`, `phone_number`, `created_at`) are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ProfileUpdateRequest {
    pub full_name: Option<String>,
    pub age: Option<i64>,
    /// male, female, other, prefer_not_to_say
    pub gender: Option<String>,
    pub total_household_adults: Option<i64>,
    pub total_household_children: Option<i64>,
    /// Merged key by key into the stored metadata
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Map<String, Value>>,
}

impl ProfileUpdateRequest {
    pub fn into_changes(self) -> Result<ProfileChanges, ApiError> {
        if let Some(name) = &self.full_name {
            check_chars("full_name", name, 1, NAME_MAX_CHARS)?;
        }
        if let Some(age) = self.age {
            check_range("age", age, 1, Some(MAX_AGE))?;
        }
        if let Some(adults) = self.total_household_adults {
            check_range("total_household_adults", adults, 1, None)?;
        }
        if let Some(children) = self.total_household_children {
            check_range("total_household_children", children, 0, None)?;
        }

        let mut metadata = Map::new();
        if let Some(age) = self.age {
            metadata.insert("age".to_string(), Value::from(age));
        }
        if let Some(gender) = self.gender {
            metadata.insert("gender".to_string(), Value::String(gender));
        }
        if let Some(adults) = self.total_household_adults {
            metadata.insert("total_household_adults".to_string(), Value::from(adults));
        }
        if let Some(children) = self.total_household_children {
            metadata.insert("total_household_children".to_string(), Value::from(children));
        }
        if let Some(explicit) = self.metadata {
            metadata.extend(explicit);
        }

        let changes = ProfileChanges {
            full_name: self.full_name,
            metadata,
        };
        if changes.is_empty() {
            return Err(ApiError::bad_request(NO_FIELDS_MESSAGE));
        }
        Ok(changes)
    }
}

fn default_adults() -> Option<i64> {
    Some(1)
}

fn default_children() -> Option<i64> {
    Some(0)
}

/// `PUT /user/{user_id}/onboarding`. Selections are names, not ids.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OnboardingRequest {
    /// Stored as a column, not in metadata
    #[serde(default, skip_serializing)]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default = "default_adults", skip_serializing_if = "Option::is_none")]
    pub total_household_adults: Option<i64>,
    #[serde(default = "default_children", skip_serializing_if = "Option::is_none")]
    pub total_household_children: Option<i64>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub medical_restrictions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dietary_pattern: Option<String>,
    #[serde(default)]
    pub nutrition_preferences: Vec<String>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spice_level: Option<String>,
    #[serde(default)]
    pub cooking_oil_preferences: Vec<String>,
    #[serde(default)]
    pub cuisines_preferences: Vec<String>,
    #[serde(default)]
    pub breakfast_preferences: Vec<String>,
    #[serde(default)]
    pub lunch_preferences: Vec<String>,
    #[serde(default)]
    pub snacks_preferences: Vec<String>,
    #[serde(default)]
    pub dinner_preferences: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_input: Option<String>,
}

impl OnboardingRequest {
    /// Validate and turn the answers into profile changes that also mark
    /// onboarding as completed at `now`.
    pub fn into_changes(self, now: DateTime<Utc>) -> Result<ProfileChanges, ApiError> {
        if let Some(name) = &self.full_name {
            check_chars("full_name", name, 1, NAME_MAX_CHARS)?;
        }
        if let Some(age) = self.age {
            check_range("age", age, 1, Some(MAX_AGE))?;
        }
        if let Some(adults) = self.total_household_adults {
            check_range("total_household_adults", adults, 1, None)?;
        }
        if let Some(children) = self.total_household_children {
            check_range("total_household_children", children, 0, None)?;
        }
        if let Some(extra) = &self.extra_input {
            check_chars("extra_input", extra, 0, EXTRA_INPUT_MAX_CHARS)?;
        }

        let mut metadata = match serde_json::to_value(&self) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Map::new(),
            Err(e) => return Err(ApiError::internal(&format!("onboarding encode: {e}"))),
        };
        metadata.insert(ONBOARDING_COMPLETED_KEY.to_string(), Value::Bool(true));
        metadata.insert(
            ONBOARDING_COMPLETED_AT_KEY.to_string(),
            Value::String(now.to_rfc3339()),
        );

        Ok(ProfileChanges {
            full_name: self.full_name,
            metadata,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct OnboardingStatus {
    pub onboarding_completed: bool,
    pub onboarding_completed_at: Option<String>,
    pub has_name: bool,
}

impl From<&UserProfile> for OnboardingStatus {
    fn from(user: &UserProfile) -> Self {
        let metadata = &user.metadata;
        Self {
            onboarding_completed: metadata
                .get(ONBOARDING_COMPLETED_KEY)
                .and_then(Value::as_bool)
                .unwrap_or(false),
            onboarding_completed_at: metadata
                .get(ONBOARDING_COMPLETED_AT_KEY)
                .and_then(Value::as_str)
                .map(str::to_string),
            has_name: user
                .full_name
                .as_deref()
                .is_some_and(|name| !name.trim().is_empty()),
        }
    }
}

// =============================================================================
// Cooks
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CookRequest {
    pub name: String,
    pub phone_number: String,
    #[serde(default)]
    pub languages_known: Vec<String>,
    #[serde(default)]
    pub has_smart_phone: bool,
}

impl CookRequest {
    pub fn validate(self) -> Result<NewCook, ApiError> {
        check_chars("name", &self.name, 1, NAME_MAX_CHARS)?;
        check_chars(
            "phone_number",
            &self.phone_number,
            COOK_PHONE_MIN_CHARS,
            COOK_PHONE_MAX_CHARS,
        )?;
        Ok(NewCook {
            name: self.name,
            phone_number: self.phone_number,
            languages_known: self.languages_known,
            has_smart_phone: self.has_smart_phone,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateCookRequest {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub languages_known: Option<Vec<String>>,
    pub has_smart_phone: Option<bool>,
}

impl UpdateCookRequest {
    pub fn validate(self) -> Result<CookChanges, ApiError> {
        if let Some(name) = &self.name {
            check_chars("name", name, 1, NAME_MAX_CHARS)?;
        }
        if let Some(phone) = &self.phone_number {
            check_chars("phone_number", phone, COOK_PHONE_MIN_CHARS, COOK_PHONE_MAX_CHARS)?;
        }
        let changes = CookChanges {
            name: self.name,
            phone_number: self.phone_number,
            languages_known: self.languages_known,
            has_smart_phone: self.has_smart_phone,
        };
        if changes.is_empty() {
            return Err(ApiError::bad_request(NO_FIELDS_MESSAGE));
        }
        Ok(changes)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct CookList {
    pub success: bool,
    pub data: Vec<Cook>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DeleteCookResponse {
    pub success: bool,
    pub message: String,
    pub cook_id: Uuid,
}

// =============================================================================
// Onboarding reference data
// =============================================================================

/// Every onboarding list in one response.
#[derive(Debug, Clone, Default, Serialize, ToSchema, PartialEq)]
pub struct OnboardingOptions {
    pub goals: Vec<ReferenceOption>,
    pub dietary_patterns: Vec<ReferenceOption>,
    pub dietary_restrictions: Vec<ReferenceOption>,
    pub medical_restrictions: Vec<ReferenceOption>,
    pub nutrition_preferences: Vec<ReferenceOption>,
    pub spice_levels: Vec<ReferenceOption>,
    pub cooking_oils: Vec<ReferenceOption>,
    pub cuisines: Vec<ReferenceOption>,
    pub meal_items: Vec<MealItemOption>,
}

// =============================================================================
// Meal items
// =============================================================================

/// Optional filters over the meal item catalogue; unset filters match all.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MealItemsQuery {
    pub can_vegetarian_eat: Option<bool>,
    pub can_eggetarian_eat: Option<bool>,
    pub can_carnitarian_eat: Option<bool>,
    pub can_omnitarian_eat: Option<bool>,
    pub can_vegan_eat: Option<bool>,
    pub is_breakfast: Option<bool>,
    pub is_lunch: Option<bool>,
    pub is_dinner: Option<bool>,
    pub is_snacks: Option<bool>,
}

impl MealItemsQuery {
    /// The set filters as `(column, value)` pairs.
    pub fn filters(&self) -> Vec<(&'static str, bool)> {
        let values = [
            self.can_vegetarian_eat,
            self.can_eggetarian_eat,
            self.can_carnitarian_eat,
            self.can_omnitarian_eat,
            self.can_vegan_eat,
            self.is_breakfast,
            self.is_lunch,
            self.is_dinner,
            self.is_snacks,
        ];
        FILTER_COLUMNS
            .into_iter()
            .zip(values)
            .filter_map(|(column, value)| value.map(|value| (column, value)))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct MealItemList {
    pub success: bool,
    /// Meal item rows without `created_at` and `is_active`
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Map<String, Value>>,
    pub count: usize,
}

// =============================================================================
// Meal messaging
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MealMessageQuery {
    /// Date as YYYY-MM-DD; defaults to today (UTC)
    pub date: Option<String>,
    /// Only this meal type (e.g. 1 for breakfast)
    pub meal_type_id: Option<i64>,
    /// Cook to address; defaults to the first cook
    pub cook_id: Option<Uuid>,
}

impl MealMessageQuery {
    pub fn day(&self, today: NaiveDate) -> Result<NaiveDate, ApiError> {
        match self.date.as_deref().map(str::trim) {
            None | Some("") => Ok(today),
            Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| ApiError::bad_request("Invalid date format. Use YYYY-MM-DD")),
        }
    }

    pub fn meal_type(&self) -> Result<Option<i64>, ApiError> {
        match self.meal_type_id {
            Some(id) if id <= 0 => Err(ApiError::bad_request("meal_type_id must be positive")),
            other => Ok(other),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct MealMessages {
    pub english: String,
    /// Same text as `english`; only English is produced
    pub cook_language: String,
    pub cook_language_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct CookSummary {
    pub id: Uuid,
    pub name: String,
    pub language: String,
    pub languages_known: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct MealMessagesResponse {
    pub success: bool,
    pub date: NaiveDate,
    pub messages: MealMessages,
    /// Meal type (lower case) to item names
    pub meals: BTreeMap<String, Vec<String>>,
    pub cook: Option<CookSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
