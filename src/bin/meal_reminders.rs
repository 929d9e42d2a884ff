// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Daily meal reminder job, run once per day by cron.
//!
//! Exits 0 when every reminder was delivered, 1 otherwise. Refuses to run
//! without `SLACK_WEBHOOK_URL` and `SUPABASE_URL`.

use chrono::Utc;
use foodeasy_server::{
    config::AppConfig,
    logging::init_tracing,
    reminders::{JobTargets, ReminderJob},
    state::http_client,
};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(Default::default());
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };
    init_tracing(config.log_format);

    let client = match http_client(&config) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "failed to build HTTP client");
            std::process::exit(1);
        }
    };
    let JobTargets { database, webhook } = match JobTargets::from_config(&config, client) {
        Ok(targets) => targets,
        Err(e) => {
            error!(error = %e, "meal reminder job is not configured");
            std::process::exit(1);
        }
    };

    let today = Utc::now().date_naive();
    match ReminderJob::new(database.as_ref(), &webhook).run(today).await {
        Ok(summary) => {
            info!(
                %today,
                users = summary.users,
                skipped = summary.skipped,
                sent = summary.sent,
                failed = summary.failures.len(),
                "meal reminder run finished"
            );
            std::process::exit(summary.exit_code());
        }
        Err(e) => {
            error!(error = %e, "meal reminder run failed");
            std::process::exit(1);
        }
    }
}
