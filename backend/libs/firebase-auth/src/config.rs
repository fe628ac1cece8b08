use crate::error::{Result, VerifyError};
use std::env;
use std::time::Duration;

/// Public certificates for the secure token service, keyed by `kid`
pub const DEFAULT_CERT_URL: &str =
    "https://www.googleapis.com/robot/v1/metadata/x509/securetoken@system.gserviceaccount.com";

/// The project ID is appended to this prefix to build the expected `iss`
pub const DEFAULT_ISSUER_PREFIX: &str = "https://securetoken.google.com/";

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 5;
const DEFAULT_CLOCK_LEEWAY_SECS: u64 = 30; // clock skew tolerance for exp/nbf

/// Verifier settings.
///
/// Defaults target the production secure token service. Tests point
/// `cert_url` and `issuer_prefix` at a mock key server instead.
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// Endpoint returning a JSON object of `kid -> PEM certificate`
    pub cert_url: String,
    pub issuer_prefix: String,
    /// Upper bound for the certificate request
    pub http_timeout: Duration,
    pub clock_leeway: Duration,
    /// `None` fetches keys on every verification
    pub cache_ttl: Option<Duration>,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            cert_url: DEFAULT_CERT_URL.to_string(),
            issuer_prefix: DEFAULT_ISSUER_PREFIX.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            clock_leeway: Duration::from_secs(DEFAULT_CLOCK_LEEWAY_SECS),
            cache_ttl: None,
        }
    }
}

impl VerifierConfig {
    /// Load overrides from environment variables
    ///
    /// **Environment Variables** (all optional):
    /// - `FIREBASE_CERT_URL`: certificate endpoint
    /// - `FIREBASE_ISSUER_PREFIX`: issuer prefix, project ID is appended
    /// - `FIREBASE_HTTP_TIMEOUT_SECS`: certificate request timeout (default: 5)
    /// - `FIREBASE_CLOCK_LEEWAY_SECS`: allowed clock skew (default: 30)
    /// - `FIREBASE_KEY_CACHE_TTL_SECS`: enables the key cache when set and non-zero
    ///
    /// The expected audience is not read from the environment; it is
    /// always passed per verification.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let cert_url = env::var("FIREBASE_CERT_URL").unwrap_or(defaults.cert_url);
        let issuer_prefix = env::var("FIREBASE_ISSUER_PREFIX").unwrap_or(defaults.issuer_prefix);

        let http_timeout = parse_secs("FIREBASE_HTTP_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.http_timeout);
        let clock_leeway = parse_secs("FIREBASE_CLOCK_LEEWAY_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.clock_leeway);
        let cache_ttl = parse_secs("FIREBASE_KEY_CACHE_TTL_SECS")?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let config = Self {
            cert_url,
            issuer_prefix,
            http_timeout,
            clock_leeway,
            cache_ttl,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_cert_url(mut self, cert_url: impl Into<String>) -> Self {
        self.cert_url = cert_url.into();
        self
    }

    pub fn with_issuer_prefix(mut self, issuer_prefix: impl Into<String>) -> Self {
        self.issuer_prefix = issuer_prefix.into();
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn with_clock_leeway(mut self, leeway: Duration) -> Self {
        self.clock_leeway = leeway;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Issuer a token for `audience` must carry
    pub fn expected_issuer(&self, audience: &str) -> String {
        format!("{}{}", self.issuer_prefix, audience)
    }

    /// Reject settings that would make verification unsafe or impossible
    pub fn validate(&self) -> Result<()> {
        if self.cert_url.trim().is_empty() {
            return Err(VerifyError::Config("certificate URL must not be empty".into()));
        }
        if self.issuer_prefix.trim().is_empty() {
            return Err(VerifyError::Config("issuer prefix must not be empty".into()));
        }
        if self.http_timeout.is_zero() {
            return Err(VerifyError::Config(
                "HTTP timeout must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

fn parse_secs(var: &str) -> Result<Option<u64>> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| VerifyError::Config(format!("{var} must be a number of seconds: {e}"))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_target_production() {
        let config = VerifierConfig::default();
        assert_eq!(config.cert_url, DEFAULT_CERT_URL);
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert!(config.cache_ttl.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_expected_issuer_appends_audience() {
        let config = VerifierConfig::default().with_issuer_prefix("https://securetoken.example.com/");
        assert_eq!(
            config.expected_issuer("test-project"),
            "https://securetoken.example.com/test-project"
        );
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = VerifierConfig::default().with_http_timeout(Duration::ZERO);
        assert!(matches!(config.validate(), Err(VerifyError::Config(_))));
    }

    #[test]
    fn test_empty_cert_url_rejected() {
        let config = VerifierConfig::default().with_cert_url("  ");
        assert!(matches!(config.validate(), Err(VerifyError::Config(_))));
    }
}
