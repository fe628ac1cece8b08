//! Signing key retrieval
//!
//! The provider publishes its current certificates as a flat JSON object:
//!
//! ```json
//! {
//!   "6f8b...": "-----BEGIN CERTIFICATE-----\nMIIDHD...\n-----END CERTIFICATE-----\n",
//!   "1c3a...": "-----BEGIN CERTIFICATE-----\nMIIDHD...\n-----END CERTIFICATE-----\n"
//! }
//! ```

use crate::config::VerifierConfig;
use crate::error::{Result, VerifyError};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Certificates keyed by key identifier (`kid`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SigningKeySet {
    certificates: HashMap<String, String>,
}

impl SigningKeySet {
    pub fn new(certificates: HashMap<String, String>) -> Self {
        Self { certificates }
    }

    /// Parse the provider response body
    pub fn from_json(body: &[u8]) -> Result<Self> {
        let certificates: HashMap<String, String> = serde_json::from_slice(body).map_err(|e| {
            VerifyError::Parse(format!("expected a JSON object of certificates: {e}"))
        })?;
        Ok(Self { certificates })
    }

    /// Raw certificate text for `kid`, exactly as received
    pub fn get(&self, kid: &str) -> Option<&str> {
        self.certificates.get(kid).map(String::as_str)
    }

    pub fn contains(&self, kid: &str) -> bool {
        self.certificates.contains_key(kid)
    }

    pub fn key_ids(&self) -> impl Iterator<Item = &str> {
        self.certificates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }
}

impl FromIterator<(String, String)> for SigningKeySet {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            certificates: iter.into_iter().collect(),
        }
    }
}

/// Where the verifier gets the provider's current signing keys
#[async_trait]
pub trait KeySource: Send + Sync {
    async fn fetch(&self) -> Result<SigningKeySet>;
}

/// A fixed key set, for pinned keys and tests
#[async_trait]
impl KeySource for SigningKeySet {
    async fn fetch(&self) -> Result<SigningKeySet> {
        Ok(self.clone())
    }
}

#[async_trait]
impl<S: KeySource + ?Sized> KeySource for Arc<S> {
    async fn fetch(&self) -> Result<SigningKeySet> {
        (**self).fetch().await
    }
}

/// Fetches the certificate set over HTTPS on every call
#[derive(Clone)]
pub struct HttpKeyFetcher {
    http_client: Client,
    cert_url: String,
}

impl HttpKeyFetcher {
    /// Build a fetcher whose requests are bounded by `config.http_timeout`
    pub fn new(config: &VerifierConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| VerifyError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(http_client, config.cert_url.clone()))
    }

    /// Use a caller-provided client; its timeout settings apply as-is
    pub fn with_client(http_client: Client, cert_url: impl Into<String>) -> Self {
        Self {
            http_client,
            cert_url: cert_url.into(),
        }
    }

    pub fn cert_url(&self) -> &str {
        &self.cert_url
    }
}

#[async_trait]
impl KeySource for HttpKeyFetcher {
    async fn fetch(&self) -> Result<SigningKeySet> {
        let response = self
            .http_client
            .get(&self.cert_url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(VerifyError::Network(format!(
                "HTTP {} from {}",
                status, self.cert_url
            )));
        }

        let body = response.bytes().await?;
        let keys = SigningKeySet::from_json(&body)?;

        debug!(
            cert_url = %self.cert_url,
            key_count = keys.len(),
            "Fetched signing certificates"
        );

        Ok(keys)
    }
}
