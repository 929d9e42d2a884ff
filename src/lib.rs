// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! FoodEasy Server - meal planning backend
//!
//! Verifies phone-OTP ID tokens, stores user and cook profiles in a managed
//! Postgres REST API, serves onboarding reference data, and composes daily
//! meal reminders.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Credential verification and the owner-only access guard
//! - `reminders` - Meal message composition and the webhook reminder job
//! - `storage` - Row store client and typed repositories

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod reminders;
pub mod state;
pub mod storage;
