// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! PostgREST-backed [`Database`] for the managed Postgres instance.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use url::Url;

use super::query::Query;
use super::{Database, Row, StoreError, StoreResult};
use crate::config::StoreConfig;

/// Postgres error code for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

pub struct RestDatabase {
    client: Client,
    rest_root: Url,
    service_key: String,
}

#[derive(Debug, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl RestDatabase {
    pub fn new(config: &StoreConfig, client: Client) -> StoreResult<Self> {
        let rest_root = config
            .base_url
            .join("rest/v1/")
            .map_err(|e| StoreError::Unavailable(format!("invalid store URL: {e}")))?;
        Ok(Self {
            client,
            rest_root,
            service_key: config.service_key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> StoreResult<Url> {
        self.rest_root
            .join(table)
            .map_err(|e| StoreError::Unavailable(format!("invalid table path {table}: {e}")))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    fn returning(&self, request: RequestBuilder) -> RequestBuilder {
        self.authorized(request)
            .header("Prefer", "return=representation")
    }

    async fn send(&self, request: RequestBuilder, table: &str) -> StoreResult<Vec<Row>> {
        let response = request.send().await.map_err(transport_error)?;
        read_rows(response, table).await
    }
}

fn transport_error(err: reqwest::Error) -> StoreError {
    if err.is_timeout() {
        StoreError::Unavailable("request timed out".to_string())
    } else {
        StoreError::Unavailable(err.to_string())
    }
}

async fn read_rows(response: Response, table: &str) -> StoreResult<Vec<Row>> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<Vec<Row>>()
            .await
            .map_err(|e| StoreError::Decode(format!("{table}: {e}")));
    }

    let body = response.text().await.unwrap_or_default();
    Err(rejection(status, &body, table))
}

fn rejection(status: StatusCode, body: &str, table: &str) -> StoreError {
    let parsed = serde_json::from_str::<PostgrestError>(body).ok();
    let code = parsed.as_ref().and_then(|e| e.code.as_deref());

    // PostgREST also answers 409 for foreign-key violations; only a unique
    // violation means the row already exists.
    if code == Some(UNIQUE_VIOLATION) {
        return StoreError::Conflict(format!("{table} row"));
    }

    let message = parsed
        .and_then(|e| e.message)
        .unwrap_or_else(|| body.chars().take(200).collect());
    StoreError::Rejected {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl Database for RestDatabase {
    async fn select(&self, query: &Query) -> StoreResult<Vec<Row>> {
        let table = query.table_name();
        let request = self
            .authorized(self.client.get(self.table_url(table)?))
            .query(&[("select", "*")])
            .query(&query.postgrest_params());
        self.send(request, table).await
    }

    async fn insert(&self, table: &str, row: Row) -> StoreResult<Row> {
        let request = self
            .returning(self.client.post(self.table_url(table)?))
            .json(&row);
        self.send(request, table)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode(format!("{table}: insert returned no rows")))
    }

    async fn update(&self, query: &Query, patch: Row) -> StoreResult<Vec<Row>> {
        let table = query.table_name();
        let request = self
            .returning(self.client.patch(self.table_url(table)?))
            .query(&query.postgrest_params())
            .json(&patch);
        self.send(request, table).await
    }

    async fn delete(&self, query: &Query) -> StoreResult<Vec<Row>> {
        let table = query.table_name();
        let request = self
            .returning(self.client.delete(self.table_url(table)?))
            .query(&query.postgrest_params());
        self.send(request, table).await
    }

    async fn ping(&self) -> StoreResult<()> {
        let response = self
            .authorized(self.client.get(self.rest_root.clone()))
            .send()
            .await
            .map_err(transport_error)?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(StoreError::Rejected {
                status: response.status().as_u16(),
                message: "store health check failed".to_string(),
            })
        }
    }

    fn backend(&self) -> &'static str {
        "postgrest"
    }
}
