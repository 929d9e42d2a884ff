// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::{verifier, AccessGuard, CredentialVerifier, IdentityResolver};
use crate::config::{AppConfig, ConfigError};
use crate::storage::{
    CookRepository, Database, MealItemRepository, MealPlanRepository, MemoryDatabase,
    ReferenceRepository, RestDatabase, StoreError, UserRepository,
};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared, read-only application state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub verifier: Arc<dyn CredentialVerifier>,
    pub database: Arc<dyn Database>,
}

/// Outbound HTTP client with the configured timeout.
pub fn http_client(config: &AppConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(config.outbound_timeout)
        .build()
}

/// Row store selected by `config`: the REST store, or the in-memory one.
pub fn database_from_config(
    config: &AppConfig,
    client: reqwest::Client,
) -> Result<Arc<dyn Database>, StoreError> {
    match &config.store {
        Some(store) => Ok(Arc::new(RestDatabase::new(store, client)?)),
        None => {
            warn!("SUPABASE_URL not set, using the in-memory store");
            Ok(Arc::new(MemoryDatabase::new()))
        }
    }
}

impl AppState {
    pub fn new(
        config: AppConfig,
        verifier: Arc<dyn CredentialVerifier>,
        database: Arc<dyn Database>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            verifier,
            database,
        }
    }

    /// Wire the verifier and store selected by `config`.
    pub fn from_config(config: AppConfig) -> Result<Self, StartupError> {
        let client = http_client(&config)?;

        let database = database_from_config(&config, client.clone())?;
        let verifier = verifier::from_config(&config, client);
        info!(
            verifier = verifier.name(),
            store = database.backend(),
            "application state initialized"
        );

        Ok(Self::new(config, verifier, database))
    }

    /// Configured verifier over an explicit store.
    pub fn with_database(
        config: AppConfig,
        database: Arc<dyn Database>,
    ) -> Result<Self, StartupError> {
        let verifier = verifier::from_config(&config, http_client(&config)?);
        Ok(Self::new(config, verifier, database))
    }

    pub fn users(&self) -> UserRepository<'_> {
        UserRepository::new(self.database.as_ref())
    }

    pub fn cooks(&self) -> CookRepository<'_> {
        CookRepository::new(self.database.as_ref())
    }

    pub fn reference(&self) -> ReferenceRepository<'_> {
        ReferenceRepository::new(self.database.as_ref())
    }

    pub fn meal_items(&self) -> MealItemRepository<'_> {
        MealItemRepository::new(self.database.as_ref())
    }

    pub fn meal_plans(&self) -> MealPlanRepository<'_> {
        MealPlanRepository::new(self.database.as_ref())
    }

    pub fn resolver(&self) -> IdentityResolver<'_> {
        IdentityResolver::new(self.users())
    }

    pub fn guard(&self) -> AccessGuard<'_> {
        AccessGuard::new(self.verifier.as_ref(), self.resolver())
    }
}
