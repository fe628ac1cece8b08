use crate::error::{Result, VerifyError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on the subject identifier, in characters
pub const MAX_SUBJECT_LEN: usize = 128;

/// Claims carried by an ID token.
///
/// `aud`, `iss`, `sub` and `exp` are required. A payload missing one of them,
/// or carrying any claim with the wrong JSON type, fails to decode and the
/// token is treated as malformed. `iat` is informational and may be absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdTokenClaims {
    /// Audience (the project ID)
    pub aud: String,
    /// Issuer
    pub iss: String,
    /// Subject (the user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Not before (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    /// Time the user authenticated (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firebase: Option<FirebaseInfo>,
}

impl IdTokenClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.iat.and_then(|iat| DateTime::from_timestamp(iat, 0))
    }

    pub fn sign_in_provider(&self) -> Option<&str> {
        self.firebase.as_ref()?.sign_in_provider.as_deref()
    }
}

/// Provider-specific `firebase` claim
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FirebaseInfo {
    /// e.g. "password", "google.com", "anonymous"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign_in_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
}

/// Check the provider claims in a fixed order: `aud`, then `iss`, then `sub`.
///
/// The first failing claim is reported, so the error for a given token is
/// always the same.
pub fn validate_claims(
    claims: &IdTokenClaims,
    expected_audience: &str,
    expected_issuer: &str,
) -> Result<()> {
    if claims.aud != expected_audience {
        return Err(VerifyError::claim(
            "aud",
            format!(
                "expected \"{}\" but got \"{}\"",
                expected_audience, claims.aud
            ),
        ));
    }

    if claims.iss != expected_issuer {
        return Err(VerifyError::claim(
            "iss",
            format!("expected \"{}\" but got \"{}\"", expected_issuer, claims.iss),
        ));
    }

    if claims.sub.is_empty() {
        return Err(VerifyError::claim("sub", "must be a non-empty string"));
    }

    let sub_len = claims.sub.chars().count();
    if sub_len > MAX_SUBJECT_LEN {
        return Err(VerifyError::claim(
            "sub",
            format!(
                "must be at most {} characters, got {}",
                MAX_SUBJECT_LEN, sub_len
            ),
        ));
    }

    Ok(())
}
