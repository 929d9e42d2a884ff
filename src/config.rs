// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values, and the
//! [`AppConfig`] struct built once at startup. Components receive the config
//! by reference; nothing reads the environment after [`AppConfig::from_env`].
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `API_HOST` | Server bind address | `0.0.0.0` |
//! | `API_PORT` | Server bind port | `8000` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//! | `CORS_ORIGINS` | `*` or comma-separated list of origins | `*` |
//! | `FIREBASE_PROJECT_ID` | Identity provider project (enables provider tokens) | Optional |
//! | `FIREBASE_JWKS_URL` | Provider signing keys | Google securetoken JWK set |
//! | `DEV_JWT_SECRET` | Shared secret for development tokens (min 16 chars) | Optional |
//! | `AUTH_CLOCK_SKEW_SECS` | Leeway applied to `exp`/`nbf` checks | `0` |
//! | `SUPABASE_URL` | Row store base URL | Optional (in-memory store) |
//! | `SUPABASE_SERVICE_ROLE_KEY` | Row store service key | Required with `SUPABASE_URL` |
//! | `STORE_TIMEOUT_SECS` | Timeout for outbound calls | `10` |
//! | `SLACK_WEBHOOK_URL` | Meal reminder destination | Required by `meal-reminders` |

use std::{env, fmt, net::SocketAddr, str::FromStr, time::Duration};

use url::Url;

pub const API_HOST_ENV: &str = "API_HOST";
pub const API_PORT_ENV: &str = "API_PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
pub const CORS_ORIGINS_ENV: &str = "CORS_ORIGINS";
pub const FIREBASE_PROJECT_ID_ENV: &str = "FIREBASE_PROJECT_ID";
pub const FIREBASE_JWKS_URL_ENV: &str = "FIREBASE_JWKS_URL";
pub const DEV_JWT_SECRET_ENV: &str = "DEV_JWT_SECRET";
pub const AUTH_CLOCK_SKEW_ENV: &str = "AUTH_CLOCK_SKEW_SECS";
pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";
pub const SUPABASE_SERVICE_ROLE_KEY_ENV: &str = "SUPABASE_SERVICE_ROLE_KEY";
pub const STORE_TIMEOUT_ENV: &str = "STORE_TIMEOUT_SECS";
pub const SLACK_WEBHOOK_URL_ENV: &str = "SLACK_WEBHOOK_URL";

/// Public JWK set for Firebase ID tokens.
pub const DEFAULT_FIREBASE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;

/// Shortest accepted development secret.
pub const MIN_DEV_SECRET_LEN: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("{0} is required but not set")]
    Missing(&'static str),

    #[error("no credential verifier configured: set FIREBASE_PROJECT_ID or DEV_JWT_SECRET")]
    NoVerifier,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "" => Ok(LogFormat::Pretty),
            other => Err(ConfigError::Invalid {
                name: LOG_FORMAT_ENV,
                reason: format!("expected 'json' or 'pretty', got '{other}'"),
            }),
        }
    }
}

/// Allowed CORS origins.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CorsOrigins {
    #[default]
    Any,
    List(Vec<String>),
}

impl CorsOrigins {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw == "*" {
            return CorsOrigins::Any;
        }
        CorsOrigins::List(
            raw.split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

/// How bearer credentials are verified.
#[derive(Clone, PartialEq, Eq)]
pub enum VerifierConfig {
    /// Provider-issued ID tokens checked against the provider's JWK set.
    Firebase { project_id: String, jwks_url: String },
    /// Development tokens signed with a shared secret.
    SharedSecret { secret: String },
}

impl fmt::Debug for VerifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifierConfig::Firebase {
                project_id,
                jwks_url,
            } => f
                .debug_struct("Firebase")
                .field("project_id", project_id)
                .field("jwks_url", jwks_url)
                .finish(),
            VerifierConfig::SharedSecret { .. } => f
                .debug_struct("SharedSecret")
                .field("secret", &"<redacted>")
                .finish(),
        }
    }
}

/// Connection details for the managed row store.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub base_url: Url,
    pub service_key: String,
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("base_url", &self.base_url.as_str())
            .field("service_key", &"<redacted>")
            .finish()
    }
}

/// Process-wide configuration, constructed once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub log_format: LogFormat,
    pub cors_origins: CorsOrigins,
    pub verifier: VerifierConfig,
    pub clock_skew_secs: u64,
    /// `None` selects the in-process store.
    pub store: Option<StoreConfig>,
    pub outbound_timeout: Duration,
    pub slack_webhook_url: Option<Url>,
}

impl AppConfig {
    /// Load configuration from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let host = get(API_HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or(get(API_PORT_ENV), API_PORT_ENV, DEFAULT_PORT)?;
        let bind_addr: SocketAddr =
            format!("{host}:{port}")
                .parse()
                .map_err(|e| ConfigError::Invalid {
                    name: API_HOST_ENV,
                    reason: format!("{e}"),
                })?;

        let log_format = get(LOG_FORMAT_ENV)
            .map(|raw| raw.parse::<LogFormat>())
            .transpose()?
            .unwrap_or_default();

        let cors_origins = get(CORS_ORIGINS_ENV)
            .map(|raw| CorsOrigins::parse(&raw))
            .unwrap_or_default();

        let verifier = match (get(FIREBASE_PROJECT_ID_ENV), get(DEV_JWT_SECRET_ENV)) {
            (Some(project_id), _) => VerifierConfig::Firebase {
                project_id,
                jwks_url: get(FIREBASE_JWKS_URL_ENV)
                    .unwrap_or_else(|| DEFAULT_FIREBASE_JWKS_URL.to_string()),
            },
            (None, Some(secret)) => {
                if secret.len() < MIN_DEV_SECRET_LEN {
                    return Err(ConfigError::Invalid {
                        name: DEV_JWT_SECRET_ENV,
                        reason: format!("must be at least {MIN_DEV_SECRET_LEN} characters"),
                    });
                }
                VerifierConfig::SharedSecret { secret }
            }
            (None, None) => return Err(ConfigError::NoVerifier),
        };

        let clock_skew_secs = parse_or(get(AUTH_CLOCK_SKEW_ENV), AUTH_CLOCK_SKEW_ENV, 0u64)?;

        let store = match get(SUPABASE_URL_ENV) {
            Some(raw) => Some(StoreConfig {
                base_url: parse_url(&raw, SUPABASE_URL_ENV)?,
                service_key: get(SUPABASE_SERVICE_ROLE_KEY_ENV)
                    .ok_or(ConfigError::Missing(SUPABASE_SERVICE_ROLE_KEY_ENV))?,
            }),
            None => None,
        };

        let timeout_secs = parse_or(
            get(STORE_TIMEOUT_ENV),
            STORE_TIMEOUT_ENV,
            DEFAULT_STORE_TIMEOUT_SECS,
        )?;

        let slack_webhook_url = get(SLACK_WEBHOOK_URL_ENV)
            .map(|raw| parse_url(&raw, SLACK_WEBHOOK_URL_ENV))
            .transpose()?;

        Ok(Self {
            bind_addr,
            log_format,
            cors_origins,
            verifier,
            clock_skew_secs,
            store,
            outbound_timeout: Duration::from_secs(timeout_secs),
            slack_webhook_url,
        })
    }

    /// Configuration for tests: development verifier, in-memory store.
    pub fn for_tests(secret: &str) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            log_format: LogFormat::Pretty,
            cors_origins: CorsOrigins::Any,
            verifier: VerifierConfig::SharedSecret {
                secret: secret.to_string(),
            },
            clock_skew_secs: 0,
            store: None,
            outbound_timeout: Duration::from_secs(DEFAULT_STORE_TIMEOUT_SECS),
            slack_webhook_url: None,
        }
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: fmt::Display,
{
    match raw {
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn parse_url(raw: &str, name: &'static str) -> Result<Url, ConfigError> {
    Url::parse(raw.trim()).map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}
