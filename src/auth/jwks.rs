// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) fetching and caching.
//!
//! - Keys are cached with a configurable TTL
//! - An unknown `kid` forces one refetch, so key rotation is picked up early
//! - A stale cache is served when a refetch fails

use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet, KeyAlgorithm};
use jsonwebtoken::{Algorithm, DecodingKey};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::error::CredentialError;

/// Default JWKS cache TTL (5 minutes).
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

struct CacheEntry {
    jwks: JwkSet,
    fetched_at: Instant,
}

/// JWKS manager with caching.
///
/// Fetches the identity provider's public signing keys.
#[derive(Clone)]
pub struct JwksManager {
    jwks_url: String,
    cache_ttl: Duration,
    cache: Arc<RwLock<Option<CacheEntry>>>,
    client: reqwest::Client,
}

impl JwksManager {
    /// Create a new JWKS manager using a pre-configured HTTP client
    /// (timeouts are the client's concern).
    pub fn new(jwks_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            jwks_url: jwks_url.into(),
            cache_ttl: DEFAULT_CACHE_TTL,
            cache: Arc::new(RwLock::new(None)),
            client,
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    async fn cached(&self, allow_stale: bool) -> Option<JwkSet> {
        let cache = self.cache.read().await;
        cache
            .as_ref()
            .filter(|entry| allow_stale || entry.fetched_at.elapsed() < self.cache_ttl)
            .map(|entry| entry.jwks.clone())
    }

    async fn get_jwks(&self) -> Result<JwkSet, CredentialError> {
        if let Some(jwks) = self.cached(false).await {
            return Ok(jwks);
        }

        match self.refresh().await {
            Ok(jwks) => Ok(jwks),
            Err(err) => match self.cached(true).await {
                Some(stale) => {
                    warn!(error = %err, "JWKS refresh failed, serving stale keys");
                    Ok(stale)
                }
                None => Err(err),
            },
        }
    }

    async fn fetch_jwks(&self) -> Result<JwkSet, CredentialError> {
        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| CredentialError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CredentialError::Unavailable(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| CredentialError::Unavailable(format!("unreadable JWKS: {e}")))
    }

    /// Get a decoding key for the given key ID.
    pub async fn get_decoding_key(
        &self,
        kid: &str,
    ) -> Result<(DecodingKey, Algorithm), CredentialError> {
        let jwks = self.get_jwks().await?;
        if let Some(jwk) = find_key(&jwks, kid) {
            return jwk_to_decoding_key(jwk);
        }

        debug!(kid = %kid, "signing key not cached, refetching JWKS");
        let jwks = self.refresh().await?;
        let jwk = find_key(&jwks, kid)
            .ok_or_else(|| CredentialError::Invalid("unknown signing key".to_string()))?;
        jwk_to_decoding_key(jwk)
    }

    /// Force refresh the JWKS cache.
    pub async fn refresh(&self) -> Result<JwkSet, CredentialError> {
        let jwks = self.fetch_jwks().await?;
        let mut cache = self.cache.write().await;
        *cache = Some(CacheEntry {
            jwks: jwks.clone(),
            fetched_at: Instant::now(),
        });
        Ok(jwks)
    }

    /// Check if JWKS is currently cached and valid.
    pub async fn is_cached(&self) -> bool {
        self.cached(false).await.is_some()
    }
}

fn find_key<'a>(jwks: &'a JwkSet, kid: &str) -> Option<&'a Jwk> {
    jwks.keys
        .iter()
        .find(|k| k.common.key_id.as_deref() == Some(kid))
}

fn jwk_to_decoding_key(jwk: &Jwk) -> Result<(DecodingKey, Algorithm), CredentialError> {
    match &jwk.algorithm {
        AlgorithmParameters::RSA(rsa) => {
            let key = DecodingKey::from_rsa_components(&rsa.n, &rsa.e)
                .map_err(|e| CredentialError::Invalid(format!("unusable RSA key: {e}")))?;

            let alg = match jwk.common.key_algorithm {
                Some(KeyAlgorithm::RS384) => Algorithm::RS384,
                Some(KeyAlgorithm::RS512) => Algorithm::RS512,
                _ => Algorithm::RS256,
            };
            Ok((key, alg))
        }
        _ => Err(CredentialError::Invalid(
            "unsupported key type in JWKS".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // RFC 7517 appendix A.1 example key.
    const RSA_N: &str = "0vx7agoebGcQSuuPiLJXZptN9nndrQmbXEps2aiAFbWhM78LhWx4cbbfAAtVT86zwu1RK7aPFFxuhDR1L6tSoc_BJECPebWKRXjBZCiFV4n3oknjhMstn64tZ_2W-5JsGY4Hc5n9yBXArwl93lqt7_RN5w6Cf0h4QyQ5v-65YGjQR0_FDW2QvzqY368QQMicAtaSqzs8KJZgnYb9c7d0zgdAZHzu6qMQvRL5hajrn1n91CbOpbISD08qNLyrdkt-bFTWhAI4vMQFh6WeZu0fM4lFd2NcRwr3XPksINHaQ-G_xBniIqbw0Ls1jF44-csFCur-kEgU8awapJzKnqDKgw";

    fn jwks_body(kid: &str) -> serde_json::Value {
        serde_json::json!({
            "keys": [{
                "kty": "RSA",
                "alg": "RS256",
                "use": "sig",
                "kid": kid,
                "n": RSA_N,
                "e": "AQAB"
            }]
        })
    }

    fn manager(server: &MockServer) -> JwksManager {
        JwksManager::new(format!("{}/jwks", server.uri()), reqwest::Client::new())
    }

    #[test]
    fn custom_cache_ttl() {
        let manager = JwksManager::new("https://example.com/jwks", reqwest::Client::new())
            .with_cache_ttl(Duration::from_secs(60));
        assert_eq!(manager.cache_ttl, Duration::from_secs(60));
        assert_eq!(manager.jwks_url(), "https://example.com/jwks");
    }

    #[tokio::test]
    async fn cache_initially_empty() {
        let manager = JwksManager::new("https://example.com/jwks", reqwest::Client::new());
        assert!(!manager.is_cached().await);
    }

    #[tokio::test]
    async fn known_kid_is_served_from_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jwks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(jwks_body("key-1")))
            .expect(1)
            .mount(&server)
            .await;

        let manager = manager(&server);
        let (_, alg) = manager.get_decoding_key("key-1").await.unwrap();
        assert_eq!(alg, Algorithm::RS256);
        assert!(manager.is_cached().await);

        manager.get_decoding_key("key-1").await.unwrap();
    }

    #[tokio::test]
    async fn unknown_kid_triggers_refetch_then_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jwks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(jwks_body("key-1")))
            .expect(2)
            .mount(&server)
            .await;

        let manager = manager(&server);
        let err = manager.get_decoding_key("rotated").await.unwrap_err();
        assert!(matches!(err, CredentialError::Invalid(_)));
    }

    #[tokio::test]
    async fn endpoint_failure_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jwks"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let manager = manager(&server);
        let err = manager.get_decoding_key("key-1").await.unwrap_err();
        assert!(matches!(err, CredentialError::Unavailable(_)));
    }

    #[tokio::test]
    async fn stale_keys_survive_refresh_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jwks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(jwks_body("key-1")))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/jwks"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let manager = manager(&server).with_cache_ttl(Duration::ZERO);
        manager.get_decoding_key("key-1").await.unwrap();
        assert!(!manager.is_cached().await);

        manager.get_decoding_key("key-1").await.unwrap();
    }
}
