//! Firebase Auth ID token verification
//!
//! **Security Features**:
//! - RS256/RS384/RS512 only: no symmetric or `none` algorithms, so a token
//!   cannot choose a key the provider does not control
//! - Signing keys looked up by `kid` in the provider's published certificate
//!   set before any certificate is parsed
//! - `exp`/`nbf` enforced with a bounded clock-skew leeway
//! - `aud`, `iss`, `sub` checked in a fixed order with descriptive errors
//! - Bounded HTTP timeout on every certificate fetch
//!
//! # Example
//!
//! ```no_run
//! use firebase_auth::{TokenVerifier, VerifierConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let verifier = TokenVerifier::new(VerifierConfig::from_env()?)?;
//!
//!     let uid = verifier.verify("eyJhbGciOi...", "my-project-id").await?;
//!     println!("authenticated {uid}");
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod cert;
pub mod claims;
pub mod config;
pub mod error;
pub mod keys;
pub mod token;
pub mod verifier;

#[cfg(test)]
mod test_utils;

pub use cache::CachedKeySource;
pub use cert::{decoding_key_from_certificate, normalize_certificate_pem};
pub use claims::{validate_claims, FirebaseInfo, IdTokenClaims, MAX_SUBJECT_LEN};
pub use config::{VerifierConfig, DEFAULT_CERT_URL, DEFAULT_ISSUER_PREFIX};
pub use error::{Result, VerifyError};
pub use keys::{HttpKeyFetcher, KeySource, SigningKeySet};
pub use token::{TokenHeader, UnverifiedToken};
pub use verifier::{verify_id_token, TokenVerifier};
