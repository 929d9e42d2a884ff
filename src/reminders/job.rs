// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! One pass of the daily meal reminder job.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::Client;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::compose::{meal_message, meals_by_type, MealType};
use super::slack::{Notifier, Reminder, SlackWebhook};
use crate::config::{AppConfig, SLACK_WEBHOOK_URL_ENV, SUPABASE_URL_ENV};
use crate::storage::repository::MealPlan;
use crate::storage::{
    Database, MealPlanRepository, RestDatabase, StoreError, StoreResult, UserRepository,
};

/// Name used when a user has not set one yet.
pub const UNKNOWN_USER_NAME: &str = "Unknown";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Users with an active plan covering the day
    pub users: usize,
    /// Users with nothing planned for the day
    pub skipped: usize,
    pub sent: usize,
    pub failures: Vec<String>,
}

impl RunSummary {
    pub fn exit_code(&self) -> i32 {
        if self.failures.is_empty() {
            0
        } else {
            1
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("{0} is not set, refusing to run")]
    Missing(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Row store and webhook a run talks to.
pub struct JobTargets {
    pub database: Arc<dyn Database>,
    pub webhook: SlackWebhook,
}

impl JobTargets {
    /// Both the webhook and the row store must be configured. The in-memory
    /// store holds no plans, so the job never falls back to it.
    pub fn from_config(config: &AppConfig, client: Client) -> Result<Self, SetupError> {
        let webhook_url = config
            .slack_webhook_url
            .clone()
            .ok_or(SetupError::Missing(SLACK_WEBHOOK_URL_ENV))?;
        let store = config
            .store
            .as_ref()
            .ok_or(SetupError::Missing(SUPABASE_URL_ENV))?;

        Ok(Self {
            database: Arc::new(RestDatabase::new(store, client.clone())?),
            webhook: SlackWebhook::new(webhook_url, client),
        })
    }
}

pub struct ReminderJob<'a> {
    db: &'a dyn Database,
    notifier: &'a dyn Notifier,
}

impl<'a> ReminderJob<'a> {
    pub fn new(db: &'a dyn Database, notifier: &'a dyn Notifier) -> Self {
        Self { db, notifier }
    }

    /// Send one reminder per user and planned meal slot for `day`.
    ///
    /// Fails only when the plan or user lookup fails; per-user problems are
    /// collected in the summary.
    pub async fn run(&self, day: NaiveDate) -> StoreResult<RunSummary> {
        let plans = newest_plan_per_user(
            MealPlanRepository::new(self.db)
                .active_plans_on(day)
                .await?,
        );
        info!(%day, users = plans.len(), "active meal plans found");

        let user_ids: Vec<Uuid> = plans.iter().map(|plan| plan.user_id).collect();
        let names: HashMap<Uuid, String> = UserRepository::new(self.db)
            .list_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|user| {
                let name = user
                    .full_name
                    .filter(|name| !name.trim().is_empty())
                    .unwrap_or_else(|| UNKNOWN_USER_NAME.to_string());
                (user.id, name)
            })
            .collect();

        let mut summary = RunSummary::default();
        for plan in plans {
            let Some(user_name) = names.get(&plan.user_id) else {
                warn!(user_id = %plan.user_id, "meal plan owner has no profile");
                continue;
            };
            summary.users += 1;
            self.remind_user(&plan, user_name, day, &mut summary).await;
        }

        info!(
            users = summary.users,
            skipped = summary.skipped,
            sent = summary.sent,
            failed = summary.failures.len(),
            "meal reminder run finished"
        );
        Ok(summary)
    }

    async fn remind_user(
        &self,
        plan: &MealPlan,
        user_name: &str,
        day: NaiveDate,
        summary: &mut RunSummary,
    ) {
        let groups = match MealPlanRepository::new(self.db)
            .meals_on(&plan.id, day, None)
            .await
        {
            Ok(groups) => groups,
            Err(e) => {
                error!(user_id = %plan.user_id, error = %e, "failed to load meals");
                summary
                    .failures
                    .push(format!("user {}: failed to load meals: {e}", plan.user_id));
                return;
            }
        };

        let meals = meals_by_type(groups);
        if meals.is_empty() {
            info!(user_id = %plan.user_id, "no meals planned, skipping");
            summary.skipped += 1;
            return;
        }

        for meal_type in MealType::ORDER {
            let Some(message) = meals
                .get(&meal_type)
                .and_then(|items| meal_message(meal_type, items))
            else {
                continue;
            };
            let reminder = Reminder {
                user_id: plan.user_id,
                user_name: user_name.to_string(),
                meal_type,
                message,
            };
            match self.notifier.send(&reminder).await {
                Ok(()) => summary.sent += 1,
                Err(e) => {
                    error!(user_id = %plan.user_id, %meal_type, error = %e, "reminder not delivered");
                    summary
                        .failures
                        .push(format!("user {}: {meal_type}: {e}", plan.user_id));
                }
            }
        }
    }
}

/// Plans arrive newest first; keep the first one seen for each user.
fn newest_plan_per_user(plans: Vec<MealPlan>) -> Vec<MealPlan> {
    let mut seen = HashSet::new();
    plans
        .into_iter()
        .filter(|plan| seen.insert(plan.user_id))
        .collect()
}
