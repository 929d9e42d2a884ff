// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Meal Reminders
//!
//! Daily job, run by the `meal-reminders` binary from an external scheduler:
//!
//! 1. Find every active meal plan covering today (newest plan per user)
//! 2. Load each user's meals for today and group them into the four slots
//! 3. Post one webhook message per (user, slot) with something planned
//!
//! The job shares no state with the API process and never retries; any
//! delivery failure makes the run exit with status 1.

pub mod compose;
pub mod job;
pub mod slack;

pub use compose::{day_message, join_items, meal_message, meals_by_type, MealType};
pub use job::{JobTargets, ReminderJob, RunSummary, SetupError};
pub use slack::{Notifier, NotifyError, Reminder, SlackWebhook};
