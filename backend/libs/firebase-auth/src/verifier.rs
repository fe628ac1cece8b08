//! ID token verification
//!
//! Steps, in order:
//!
//! 1. split and decode the token (no network access yet)
//! 2. require an RSA `alg` and a `kid`, then decode the claims
//! 3. fetch the provider certificates and look up `kid`
//! 4. decode the certificate and extract its RSA key
//! 5. verify the signature, `exp` and `nbf`
//! 6. check `aud`, `iss`, `sub`
//!
//! The `kid` lookup happens before any certificate is parsed, so a token can
//! never make the verifier decode key material the provider did not publish.

use crate::cache::CachedKeySource;
use crate::cert::decoding_key_from_certificate;
use crate::claims::{validate_claims, IdTokenClaims};
use crate::config::VerifierConfig;
use crate::error::{Result, VerifyError};
use crate::keys::{HttpKeyFetcher, KeySource};
use crate::token::UnverifiedToken;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use tracing::debug;

/// Verifies ID tokens against the provider's published certificates.
///
/// Holds no per-token state; share one instance behind an `Arc`.
#[derive(Clone)]
pub struct TokenVerifier {
    config: VerifierConfig,
    key_source: Arc<dyn KeySource>,
}

impl TokenVerifier {
    /// Verifier fetching certificates from `config.cert_url`, through a
    /// cache when `config.cache_ttl` is set
    pub fn new(config: VerifierConfig) -> Result<Self> {
        config.validate()?;

        let fetcher = HttpKeyFetcher::new(&config)?;
        let key_source: Arc<dyn KeySource> = match config.cache_ttl {
            Some(ttl) => Arc::new(CachedKeySource::new(fetcher, ttl)),
            None => Arc::new(fetcher),
        };

        Ok(Self { config, key_source })
    }

    /// Verifier using an arbitrary key source; `config.cert_url` and
    /// `config.cache_ttl` are ignored
    pub fn with_key_source(config: VerifierConfig, key_source: impl KeySource + 'static) -> Self {
        Self {
            config,
            key_source: Arc::new(key_source),
        }
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verify `token` for `expected_audience` (the project ID) and return the
    /// subject identifier
    pub async fn verify(&self, token: &str, expected_audience: &str) -> Result<String> {
        self.verify_claims(token, expected_audience)
            .await
            .map(|claims| claims.sub)
    }

    /// Same checks as [`TokenVerifier::verify`], returning every claim
    pub async fn verify_claims(
        &self,
        token: &str,
        expected_audience: &str,
    ) -> Result<IdTokenClaims> {
        let unverified = UnverifiedToken::parse(token)?;
        let algorithm = unverified.rsa_algorithm()?;
        let kid = unverified.key_id()?;
        // payload must decode before any key is fetched
        unverified.claims()?;

        let keys = self.key_source.fetch().await?;
        let certificate = keys
            .get(kid)
            .ok_or_else(|| VerifyError::UnknownKey(kid.to_string()))?;
        let decoding_key = decoding_key_from_certificate(certificate)?;

        let claims = self.verify_signature(token, algorithm, &decoding_key)?;

        let expected_issuer = self.config.expected_issuer(expected_audience);
        validate_claims(&claims, expected_audience, &expected_issuer)?;

        debug!(kid = %kid, sub = %claims.sub, "ID token verified");
        Ok(claims)
    }

    fn verify_signature(
        &self,
        token: &str,
        algorithm: Algorithm,
        decoding_key: &DecodingKey,
    ) -> Result<IdTokenClaims> {
        let mut validation = Validation::new(algorithm);
        validation.leeway = self.config.clock_leeway.as_secs();
        validation.validate_exp = true;
        validation.validate_nbf = true;
        // aud/iss are checked afterwards in a fixed order with descriptive errors
        validation.validate_aud = false;

        decode::<IdTokenClaims>(token, decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(map_jwt_error)
    }
}

fn map_jwt_error(err: JwtError) -> VerifyError {
    match err.kind() {
        ErrorKind::InvalidSignature => VerifyError::SignatureInvalid,
        ErrorKind::ExpiredSignature => VerifyError::TokenExpired,
        ErrorKind::ImmatureSignature => VerifyError::TokenNotYetValid,
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
            VerifyError::UnsupportedAlgorithm(err.to_string())
        }
        ErrorKind::InvalidRsaKey(_)
        | ErrorKind::InvalidKeyFormat
        | ErrorKind::InvalidEcdsaKey
        | ErrorKind::RsaFailedSigning
        | ErrorKind::Crypto(_) => VerifyError::CertificateParse(err.to_string()),
        ErrorKind::InvalidAudience => VerifyError::claim("aud", err.to_string()),
        ErrorKind::InvalidIssuer => VerifyError::claim("iss", err.to_string()),
        ErrorKind::InvalidSubject => VerifyError::claim("sub", err.to_string()),
        // remaining kinds describe the token itself, never the signature
        _ => VerifyError::MalformedToken(err.to_string()),
    }
}

/// Verify `token` for `project_id` with the default configuration.
///
/// Builds a fresh verifier per call, so keys are always fetched. Services
/// verifying many tokens should keep a [`TokenVerifier`] instead.
pub async fn verify_id_token(token: &str, project_id: &str) -> Result<String> {
    TokenVerifier::new(VerifierConfig::default())?
        .verify(token, project_id)
        .await
}
