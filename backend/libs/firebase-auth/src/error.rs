//! Error types for ID token verification

use thiserror::Error;

pub type Result<T> = std::result::Result<T, VerifyError>;

/// Every way a verification can fail.
///
/// Each variant corresponds to one verification step, so callers can tell a
/// transient key-fetch problem apart from a token that must be rejected.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("Failed to fetch signing certificates: {0}")]
    Network(String),

    #[error("Invalid signing certificate response: {0}")]
    Parse(String),

    #[error("Malformed ID token: {0}")]
    MalformedToken(String),

    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("ID token signed with unknown key: {0}")]
    UnknownKey(String),

    #[error("Invalid signing certificate: {0}")]
    CertificateParse(String),

    #[error("ID token signature is invalid")]
    SignatureInvalid,

    /// `exp` is further in the past than [`VerifierConfig::clock_leeway`]
    /// allows. With the default 30 s leeway, a token that expired moments ago
    /// still verifies; set the leeway to zero for strict expiry.
    ///
    /// [`VerifierConfig::clock_leeway`]: crate::VerifierConfig::clock_leeway
    #[error("ID token has expired")]
    TokenExpired,

    /// `nbf` is later than now plus the clock leeway
    #[error("ID token is not yet valid")]
    TokenNotYetValid,

    #[error("ID token has incorrect '{claim}' claim: {reason}")]
    ClaimValidation { claim: &'static str, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl VerifyError {
    pub(crate) fn claim(claim: &'static str, reason: impl Into<String>) -> Self {
        Self::ClaimValidation {
            claim,
            reason: reason.into(),
        }
    }

    /// True when the failure came from fetching keys rather than from the
    /// token itself. Retrying a rejected token never helps.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Name of the offending claim for [`VerifyError::ClaimValidation`].
    pub fn claim_name(&self) -> Option<&'static str> {
        match self {
            Self::ClaimValidation { claim, .. } => Some(claim),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for VerifyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Network(format!("request timed out: {err}"))
        } else if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}
