//! Structural parsing of compact ID tokens
//!
//! Everything here runs before any key is fetched: a token that cannot be
//! split and decoded is rejected without touching the network.
//!
//! The payload stays as raw bytes until the header has been checked, so a
//! token with a non-RSA `alg` is reported as unsupported whatever its claims.

use crate::claims::IdTokenClaims;
use crate::error::{Result, VerifyError};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use jsonwebtoken::Algorithm;
use serde::Deserialize;

/// JOSE header fields the verifier reads.
///
/// `alg` is kept as a string so that names `jsonwebtoken` does not know
/// (such as `none`) are reported as unsupported rather than malformed.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenHeader {
    pub alg: String,
    #[serde(default)]
    pub kid: Option<String>,
    #[serde(default)]
    pub typ: Option<String>,
}

/// Header and payload of a token whose signature has not been checked yet
#[derive(Debug, Clone)]
pub struct UnverifiedToken {
    pub header: TokenHeader,
    payload: Vec<u8>,
}

impl UnverifiedToken {
    /// Split and decode `header.payload.signature`
    pub fn parse(token: &str) -> Result<Self> {
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 {
            return Err(VerifyError::MalformedToken(format!(
                "expected 3 segments, found {}",
                segments.len()
            )));
        }

        let header_bytes = decode_segment("header", segments[0])?;
        let payload_bytes = decode_segment("payload", segments[1])?;
        decode_segment("signature", segments[2])?;

        let header: TokenHeader = serde_json::from_slice(&header_bytes)
            .map_err(|e| VerifyError::MalformedToken(format!("invalid header: {e}")))?;

        Ok(Self {
            header,
            payload: payload_bytes,
        })
    }

    /// Decode the payload into typed claims.
    ///
    /// Call after [`UnverifiedToken::rsa_algorithm`]. The claims are not
    /// trusted until the signature has been verified.
    pub fn claims(&self) -> Result<IdTokenClaims> {
        serde_json::from_slice(&self.payload)
            .map_err(|e| VerifyError::MalformedToken(format!("invalid claims: {e}")))
    }

    /// Signing algorithm, restricted to the RSA PKCS#1 v1.5 family.
    ///
    /// Accepting anything else would let a caller pick the verification
    /// scheme, e.g. HMAC keyed with the public certificate.
    pub fn rsa_algorithm(&self) -> Result<Algorithm> {
        match self.header.alg.as_str() {
            "RS256" => Ok(Algorithm::RS256),
            "RS384" => Ok(Algorithm::RS384),
            "RS512" => Ok(Algorithm::RS512),
            other => Err(VerifyError::UnsupportedAlgorithm(other.to_string())),
        }
    }

    pub fn key_id(&self) -> Result<&str> {
        match self.header.kid.as_deref() {
            Some(kid) if !kid.is_empty() => Ok(kid),
            _ => Err(VerifyError::MalformedToken(
                "header has no 'kid' claim".to_string(),
            )),
        }
    }
}

fn decode_segment(name: &str, segment: &str) -> Result<Vec<u8>> {
    if segment.is_empty() {
        return Err(VerifyError::MalformedToken(format!("empty {name} segment")));
    }
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| VerifyError::MalformedToken(format!("{name} is not base64url: {e}")))
}
