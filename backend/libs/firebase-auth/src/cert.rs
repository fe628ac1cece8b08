//! Signing certificate decoding
//!
//! Certificates arrive as JSON string values. Depending on how the response
//! was produced they may still carry transport escaping, so the text is
//! normalized before PEM decoding:
//!
//! 1. each literal `\n` (backslash + `n`) becomes a line feed
//! 2. each literal `\r` (backslash + `r`) is dropped
//! 3. every `"` is dropped
//! 4. surrounding whitespace is trimmed
//!
//! The result must be a single `CERTIFICATE` PEM block whose subject public
//! key is RSA.

use crate::error::{Result, VerifyError};
use jsonwebtoken::DecodingKey;
use x509_parser::prelude::*;
use x509_parser::public_key::PublicKey;

const CERTIFICATE_TAG: &str = "CERTIFICATE";

/// Undo JSON transport artifacts in certificate text
pub fn normalize_certificate_pem(raw: &str) -> String {
    raw.replace("\\n", "\n")
        .replace("\\r", "")
        .replace('"', "")
        .trim()
        .to_string()
}

/// Extract the RSA verification key from a (possibly escaped) PEM certificate
pub fn decoding_key_from_certificate(raw: &str) -> Result<DecodingKey> {
    let normalized = normalize_certificate_pem(raw);

    let block = ::pem::parse(normalized.as_bytes())
        .map_err(|e| VerifyError::CertificateParse(format!("PEM decode failed: {e}")))?;
    if block.tag() != CERTIFICATE_TAG {
        return Err(VerifyError::CertificateParse(format!(
            "expected {CERTIFICATE_TAG} block, found {}",
            block.tag()
        )));
    }

    let (_, cert) = X509Certificate::from_der(block.contents())
        .map_err(|e| VerifyError::CertificateParse(format!("X.509 parse failed: {e}")))?;

    let spki = cert.public_key();
    match spki.parsed() {
        Ok(PublicKey::RSA(_)) => {}
        Ok(_) => {
            return Err(VerifyError::CertificateParse(
                "certificate does not carry an RSA public key".to_string(),
            ))
        }
        Err(e) => {
            return Err(VerifyError::CertificateParse(format!(
                "unreadable public key: {e}"
            )))
        }
    }

    // The subjectPublicKey bit string of an RSA key is the PKCS#1 RSAPublicKey DER
    Ok(DecodingKey::from_rsa_der(&spki.subject_public_key.data))
}
