//! # Envelope Verifier
//!
//! Authenticates a counterparty's compact token against a trust anchor
//! certificate obtained out of band. The key embedded in or referenced by a
//! token is never consulted.
//!
//! ## Security Invariant
//!
//! Verification fails closed. The header's `alg` must be `RS256` before any
//! signature check is attempted; `none`, `HS256` and every other value is
//! an [`EnvelopeVerificationError::AlgorithmMismatch`]. A token that does
//! not verify is rejected outright and its claims are never returned.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use fiskal_core::EnvelopeVerificationError;
use fiskal_crypto::PublicCertificate;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::Value;

use crate::builder::ALGORITHM;

/// Header and claims of a token whose signature verified.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedEnvelope {
    pub header: Value,
    pub claims: Value,
}

/// Verifies tokens against one trusted certificate.
#[derive(Clone)]
pub struct EnvelopeVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
    anchor_subject: String,
}

impl EnvelopeVerifier {
    /// Trust tokens signed by the key of `anchor`.
    pub fn new(anchor: &PublicCertificate) -> Result<Self, EnvelopeVerificationError> {
        let pkcs1 = anchor
            .public_key_pkcs1_der()
            .map_err(|e| EnvelopeVerificationError::TrustAnchor(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_aud = false;

        Ok(Self {
            decoding_key: DecodingKey::from_rsa_der(&pkcs1),
            validation,
            anchor_subject: anchor.identity().subject_name().to_string(),
        })
    }

    /// Subject name of the trust anchor.
    pub fn anchor_subject(&self) -> &str {
        &self.anchor_subject
    }

    /// Verify `token` and return its header and claims.
    pub fn verify(&self, token: &str) -> Result<VerifiedEnvelope, EnvelopeVerificationError> {
        let header = decode_header(token)?;
        let alg = header.get("alg").and_then(Value::as_str).unwrap_or_default();
        if alg != ALGORITHM {
            tracing::warn!(found = alg, "rejecting envelope with unexpected algorithm");
            return Err(EnvelopeVerificationError::AlgorithmMismatch {
                expected: ALGORITHM.to_string(),
                found: alg.to_string(),
            });
        }

        let data = decode::<Value>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidRsaKey(_) => {
                    tracing::warn!(anchor = %self.anchor_subject, "envelope signature does not verify");
                    EnvelopeVerificationError::InvalidSignature(e.to_string())
                }
                ErrorKind::InvalidAlgorithm => EnvelopeVerificationError::AlgorithmMismatch {
                    expected: ALGORITHM.to_string(),
                    found: alg.to_string(),
                },
                _ => EnvelopeVerificationError::Malformed(e.to_string()),
            }
        })?;

        Ok(VerifiedEnvelope {
            header,
            claims: data.claims,
        })
    }
}

impl std::fmt::Debug for EnvelopeVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeVerifier")
            .field("anchor_subject", &self.anchor_subject)
            .finish_non_exhaustive()
    }
}

fn decode_header(token: &str) -> Result<Value, EnvelopeVerificationError> {
    let mut parts = token.split('.');
    let (Some(header), Some(_), Some(_), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(EnvelopeVerificationError::Malformed(
            "expected three dot-separated segments".into(),
        ));
    };
    let bytes = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|e| EnvelopeVerificationError::Malformed(format!("header encoding: {e}")))?;
    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|e| EnvelopeVerificationError::Malformed(format!("header JSON: {e}")))?;
    if !value.is_object() {
        return Err(EnvelopeVerificationError::Malformed(
            "header is not a JSON object".into(),
        ));
    }
    Ok(value)
}
