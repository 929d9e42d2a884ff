// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Mint a development credential for the shared-secret verifier.
//!
//! ```text
//! DEV_JWT_SECRET=... issue-dev-token --phone +919876543210
//! ```

use chrono::Duration;
use clap::Parser;
use foodeasy_server::{
    auth::SharedSecretVerifier,
    config::{DEV_JWT_SECRET_ENV, MIN_DEV_SECRET_LEN},
};

#[derive(Debug, Parser)]
#[command(name = "issue-dev-token", about = "Mint a development ID token")]
struct Args {
    /// Phone number claim, E.164
    #[arg(long)]
    phone: String,

    /// Subject claim; defaults to a value derived from the phone number
    #[arg(long)]
    subject: Option<String>,

    /// Lifetime in minutes
    #[arg(long, default_value_t = 60)]
    ttl_minutes: i64,

    #[arg(long, env = DEV_JWT_SECRET_ENV, hide_env_values = true)]
    secret: String,
}

fn main() {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    if args.secret.len() < MIN_DEV_SECRET_LEN {
        eprintln!("{DEV_JWT_SECRET_ENV} must be at least {MIN_DEV_SECRET_LEN} characters");
        std::process::exit(2);
    }

    let subject = args
        .subject
        .unwrap_or_else(|| format!("dev-{}", args.phone.trim_start_matches('+')));
    let verifier = SharedSecretVerifier::new(&args.secret, 0);
    match verifier.issue(&subject, Some(&args.phone), Duration::minutes(args.ttl_minutes)) {
        Ok(token) => println!("{token}"),
        Err(e) => {
            eprintln!("failed to issue token: {e}");
            std::process::exit(1);
        }
    }
}
