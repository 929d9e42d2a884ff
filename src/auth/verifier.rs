// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential verifiers.
//!
//! Two implementations sit behind [`CredentialVerifier`]:
//!
//! - [`FirebaseVerifier`]: RS256 ID tokens signed by the identity provider,
//!   checked against its JWK set, issuer and audience.
//! - [`SharedSecretVerifier`]: HS256 tokens minted locally for development
//!   and tests.
//!
//! The active implementation is chosen once from [`AppConfig`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, decode_header, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};

use super::claims::{ExpiryInfo, TokenClaims, VerifiedCredential};
use super::error::CredentialError;
use super::jwks::JwksManager;
use crate::config::{AppConfig, VerifierConfig};

/// Issuer claim of development tokens.
pub const DEV_TOKEN_ISSUER: &str = "foodeasy-dev";

const FIREBASE_ISSUER_PREFIX: &str = "https://securetoken.google.com/";

/// Validates bearer credentials.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Verify signature, issuer, audience and expiry, then extract identity.
    async fn verify(&self, credential: &str) -> Result<VerifiedCredential, CredentialError>;

    /// Decode expiry facts. The signature is checked; expiry is not.
    async fn inspect(&self, credential: &str) -> Result<ExpiryInfo, CredentialError>;

    /// Short label for logs and health output.
    fn name(&self) -> &'static str;

    /// Whether the verifier can currently verify credentials.
    async fn check_ready(&self) -> Result<(), CredentialError> {
        Ok(())
    }
}

/// Build the configured verifier.
pub fn from_config(config: &AppConfig, client: reqwest::Client) -> Arc<dyn CredentialVerifier> {
    match &config.verifier {
        VerifierConfig::Firebase {
            project_id,
            jwks_url,
        } => Arc::new(FirebaseVerifier::new(
            project_id.clone(),
            JwksManager::new(jwks_url.clone(), client),
            config.clock_skew_secs,
        )),
        VerifierConfig::SharedSecret { secret } => {
            Arc::new(SharedSecretVerifier::new(secret, config.clock_skew_secs))
        }
    }
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> CredentialError {
    match err.kind() {
        ErrorKind::ExpiredSignature => CredentialError::Expired,
        ErrorKind::InvalidSignature => CredentialError::Invalid("signature mismatch".into()),
        ErrorKind::InvalidIssuer => CredentialError::Invalid("unexpected issuer".into()),
        ErrorKind::InvalidAudience => CredentialError::Invalid("unexpected audience".into()),
        ErrorKind::ImmatureSignature => CredentialError::Invalid("not yet valid".into()),
        ErrorKind::InvalidAlgorithm => CredentialError::Invalid("unexpected algorithm".into()),
        _ => CredentialError::Malformed,
    }
}

fn expiry_of(claims: &TokenClaims) -> Result<ExpiryInfo, CredentialError> {
    Ok(ExpiryInfo::new(
        claims.issued_at()?,
        claims.expires_at()?,
        Utc::now(),
    ))
}

// =============================================================================
// Identity provider tokens
// =============================================================================

pub struct FirebaseVerifier {
    project_id: String,
    issuer: String,
    jwks: JwksManager,
    leeway: u64,
}

impl FirebaseVerifier {
    pub fn new(project_id: impl Into<String>, jwks: JwksManager, leeway: u64) -> Self {
        let project_id = project_id.into();
        Self {
            issuer: format!("{FIREBASE_ISSUER_PREFIX}{project_id}"),
            project_id,
            jwks,
            leeway,
        }
    }

    async fn decode(
        &self,
        credential: &str,
        validate_exp: bool,
    ) -> Result<TokenClaims, CredentialError> {
        let header = decode_header(credential).map_err(|_| CredentialError::Malformed)?;
        let kid = header
            .kid
            .ok_or_else(|| CredentialError::Invalid("missing key id".to_string()))?;

        let (key, algorithm) = self.jwks.get_decoding_key(&kid).await?;

        let mut validation = Validation::new(algorithm);
        validation.leeway = self.leeway;
        validation.validate_exp = validate_exp;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.project_id]);

        decode::<TokenClaims>(credential, &key, &validation)
            .map(|data| data.claims)
            .map_err(map_jwt_error)
    }
}

#[async_trait]
impl CredentialVerifier for FirebaseVerifier {
    async fn verify(&self, credential: &str) -> Result<VerifiedCredential, CredentialError> {
        self.decode(credential, true).await?.try_into()
    }

    async fn inspect(&self, credential: &str) -> Result<ExpiryInfo, CredentialError> {
        expiry_of(&self.decode(credential, false).await?)
    }

    fn name(&self) -> &'static str {
        "firebase"
    }

    async fn check_ready(&self) -> Result<(), CredentialError> {
        if self.jwks.is_cached().await {
            return Ok(());
        }
        self.jwks.refresh().await.map(|_| ())
    }
}

// =============================================================================
// Development tokens
// =============================================================================

pub struct SharedSecretVerifier {
    encoding: EncodingKey,
    decoding: DecodingKey,
    leeway: u64,
}

impl SharedSecretVerifier {
    pub fn new(secret: &str, leeway: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            leeway,
        }
    }

    fn validation(&self, validate_exp: bool) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway;
        validation.validate_exp = validate_exp;
        validation.validate_aud = false;
        validation.set_issuer(&[DEV_TOKEN_ISSUER]);
        validation
    }

    fn decode(&self, credential: &str, validate_exp: bool) -> Result<TokenClaims, CredentialError> {
        decode::<TokenClaims>(credential, &self.decoding, &self.validation(validate_exp))
            .map(|data| data.claims)
            .map_err(map_jwt_error)
    }

    /// Mint a token valid for `ttl` from now.
    pub fn issue(
        &self,
        subject: &str,
        phone_number: Option<&str>,
        ttl: Duration,
    ) -> Result<String, CredentialError> {
        let now = Utc::now();
        self.issue_at(subject, phone_number, now, now + ttl)
    }

    pub fn issue_at(
        &self,
        subject: &str,
        phone_number: Option<&str>,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<String, CredentialError> {
        let claims = TokenClaims {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            iss: DEV_TOKEN_ISSUER.to_string(),
            aud: None,
            phone_number: phone_number.map(str::to_string),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| CredentialError::Invalid(format!("could not sign token: {e}")))
    }
}

#[async_trait]
impl CredentialVerifier for SharedSecretVerifier {
    async fn verify(&self, credential: &str) -> Result<VerifiedCredential, CredentialError> {
        self.decode(credential, true)?.try_into()
    }

    async fn inspect(&self, credential: &str) -> Result<ExpiryInfo, CredentialError> {
        expiry_of(&self.decode(credential, false)?)
    }

    fn name(&self) -> &'static str {
        "shared-secret"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SECRET: &str = "test-secret-at-least-16";
    const PHONE: &str = "+919876543210";

    fn dev() -> SharedSecretVerifier {
        SharedSecretVerifier::new(SECRET, 0)
    }

    #[tokio::test]
    async fn dev_token_round_trip() {
        let verifier = dev();
        let token = verifier.issue("uid-1", Some(PHONE), Duration::hours(1)).unwrap();

        let verified = verifier.verify(&token).await.unwrap();
        assert_eq!(verified.subject, "uid-1");
        assert_eq!(verified.phone_number, PHONE);
    }

    #[tokio::test]
    async fn expired_dev_token_is_expired() {
        let verifier = dev();
        let now = Utc::now();
        let token = verifier
            .issue_at("uid-1", Some(PHONE), now - Duration::hours(1), now - Duration::seconds(10))
            .unwrap();

        assert_eq!(verifier.verify(&token).await, Err(CredentialError::Expired));
    }

    #[tokio::test]
    async fn foreign_secret_is_invalid() {
        let other = SharedSecretVerifier::new("another-secret-of-16+", 0);
        let token = other.issue("uid-1", Some(PHONE), Duration::hours(1)).unwrap();

        let err = dev().verify(&token).await.unwrap_err();
        assert!(matches!(err, CredentialError::Invalid(_)));
    }

    #[tokio::test]
    async fn garbage_is_malformed() {
        assert_eq!(
            dev().verify("not-a-token").await,
            Err(CredentialError::Malformed)
        );
    }

    #[tokio::test]
    async fn missing_phone_claim_is_invalid() {
        let verifier = dev();
        let token = verifier.issue("uid-1", None, Duration::hours(1)).unwrap();
        let err = verifier.verify(&token).await.unwrap_err();
        assert!(matches!(err, CredentialError::Invalid(_)));
    }

    #[tokio::test]
    async fn inspect_reports_expired_tokens() {
        let verifier = dev();
        let now = Utc::now();
        let token = verifier
            .issue_at("uid-1", Some(PHONE), now - Duration::hours(1), now - Duration::seconds(30))
            .unwrap();

        let info = verifier.inspect(&token).await.unwrap();
        assert!(info.is_expired);
        assert!(info.expires_in_seconds <= -30);
    }

    #[tokio::test]
    async fn inspect_still_checks_signature() {
        let other = SharedSecretVerifier::new("another-secret-of-16+", 0);
        let token = other.issue("uid-1", Some(PHONE), Duration::hours(1)).unwrap();
        assert!(matches!(
            dev().inspect(&token).await,
            Err(CredentialError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn leeway_accepts_recently_expired() {
        let verifier = SharedSecretVerifier::new(SECRET, 60);
        let now = Utc::now();
        let token = verifier
            .issue_at("uid-1", Some(PHONE), now - Duration::hours(1), now - Duration::seconds(10))
            .unwrap();
        assert!(verifier.verify(&token).await.is_ok());
    }

    // Identity provider tokens, signed with a throwaway RSA key served via a mock JWKS.

    const PROJECT: &str = "foodeasy-test";
    const KID: &str = "test-key";
    const TEST_KEY_PEM: &str = include_str!("testdata/provider_test_key.pem");
    const TEST_KEY_N: &str = include_str!("testdata/provider_test_key.n");

    async fn provider() -> (MockServer, FirebaseVerifier) {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "keys": [{
                "kty": "RSA",
                "alg": "RS256",
                "use": "sig",
                "kid": KID,
                "n": TEST_KEY_N.trim(),
                "e": "AQAB"
            }]
        });
        Mock::given(method("GET"))
            .and(path("/jwks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let jwks = JwksManager::new(format!("{}/jwks", server.uri()), reqwest::Client::new());
        (server, FirebaseVerifier::new(PROJECT, jwks, 0))
    }

    fn provider_token(kid: Option<&str>, iss: &str, aud: &str, exp_offset: Duration) -> String {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: "firebase-uid".to_string(),
            iat: (now - Duration::minutes(1)).timestamp(),
            exp: (now + exp_offset).timestamp(),
            iss: iss.to_string(),
            aud: Some(aud.to_string()),
            phone_number: Some(PHONE.to_string()),
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = kid.map(str::to_string);
        let key = EncodingKey::from_rsa_pem(TEST_KEY_PEM.as_bytes()).unwrap();
        encode(&header, &claims, &key).unwrap()
    }

    fn issuer() -> String {
        format!("{FIREBASE_ISSUER_PREFIX}{PROJECT}")
    }

    #[tokio::test]
    async fn provider_token_verifies() {
        let (_server, verifier) = provider().await;
        let token = provider_token(Some(KID), &issuer(), PROJECT, Duration::hours(1));

        let verified = verifier.verify(&token).await.unwrap();
        assert_eq!(verified.subject, "firebase-uid");
        assert_eq!(verified.phone_number, PHONE);
        assert_eq!(verified.audience.as_deref(), Some(PROJECT));
        assert!(verifier.check_ready().await.is_ok());
    }

    #[tokio::test]
    async fn provider_token_with_wrong_audience_is_invalid() {
        let (_server, verifier) = provider().await;
        let token = provider_token(Some(KID), &issuer(), "other-project", Duration::hours(1));
        assert!(matches!(
            verifier.verify(&token).await,
            Err(CredentialError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn provider_token_with_wrong_issuer_is_invalid() {
        let (_server, verifier) = provider().await;
        let token = provider_token(
            Some(KID),
            "https://securetoken.google.com/other",
            PROJECT,
            Duration::hours(1),
        );
        assert!(matches!(
            verifier.verify(&token).await,
            Err(CredentialError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn provider_token_without_kid_is_invalid() {
        let (_server, verifier) = provider().await;
        let token = provider_token(None, &issuer(), PROJECT, Duration::hours(1));
        assert!(matches!(
            verifier.verify(&token).await,
            Err(CredentialError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn expired_provider_token_is_expired_but_inspectable() {
        let (_server, verifier) = provider().await;
        let token = provider_token(Some(KID), &issuer(), PROJECT, -Duration::seconds(10));

        assert_eq!(verifier.verify(&token).await, Err(CredentialError::Expired));
        let info = verifier.inspect(&token).await.unwrap();
        assert!(info.is_expired);
    }

    #[tokio::test]
    async fn dev_token_is_rejected_by_provider_verifier() {
        let (_server, verifier) = provider().await;
        let token = dev().issue("uid-1", Some(PHONE), Duration::hours(1)).unwrap();
        assert!(matches!(
            verifier.verify(&token).await,
            Err(CredentialError::Invalid(_))
        ));
    }
}
