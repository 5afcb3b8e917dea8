//! # Envelope Builder
//!
//! Produces the compact signed token submitted to the regulator:
//!
//! ```text
//! base64url(header) . base64url(payload) . base64url(RSA-SHA256(signing input))
//! ```
//!
//! The header carries the signer's certificate identity:
//!
//! ```json
//! {"alg":"RS256","subject_name":"C=SI,...","issuer_name":"C=SI,...","serial":"11651590505119483672"}
//! ```
//!
//! No `iat`, `exp` or other timing claim is added; the payload header's
//! `DateTime` is the only timestamp.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use fiskal_core::{CanonicalizationError, CryptoError};
use fiskal_crypto::{CertificateIdentity, Identity};
use fiskal_schema::ValidatedPayload;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// The only signature algorithm the protocol accepts.
pub const ALGORITHM: &str = "RS256";

/// Token type header value.
pub const TOKEN_TYPE: &str = "JWT";

/// Failure to produce an envelope.
#[derive(Error, Debug)]
pub enum EnvelopeBuildError {
    #[error("envelope serialization failed: {0}")]
    Serialization(#[from] CanonicalizationError),

    #[error("envelope signing failed: {0}")]
    Signing(#[from] CryptoError),
}

impl From<serde_json::Error> for EnvelopeBuildError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(CanonicalizationError::SerializationFailed(e))
    }
}

/// Protected header of an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeHeader {
    pub alg: String,
    pub typ: String,
    pub subject_name: String,
    pub issuer_name: String,
    /// Certificate serial number in decimal.
    pub serial: String,
}

impl EnvelopeHeader {
    /// Header claims for a signer with the given certificate.
    pub fn for_certificate(identity: &CertificateIdentity) -> Self {
        Self {
            alg: ALGORITHM.to_string(),
            typ: TOKEN_TYPE.to_string(),
            subject_name: identity.subject_name().to_string(),
            issuer_name: identity.issuer_name().to_string(),
            serial: identity.serial_decimal(),
        }
    }
}

/// A compact signed token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignedEnvelope(String);

impl SignedEnvelope {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for SignedEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sign a validated payload with `identity`.
pub fn build_envelope(
    payload: &ValidatedPayload,
    identity: &Identity,
) -> Result<SignedEnvelope, EnvelopeBuildError> {
    let envelope = sign_claims(payload.as_value(), identity)?;
    tracing::debug!(
        message_id = %payload.payload().message_id(),
        kind = %payload.payload().kind(),
        token_len = envelope.as_str().len(),
        "built signed envelope"
    );
    Ok(envelope)
}

/// Sign arbitrary JSON claims under the envelope header of `identity`.
///
/// Request payloads go through [`build_envelope`]; this is the primitive
/// underneath it, also used to produce response tokens in test harnesses.
pub fn sign_claims(claims: &Value, identity: &Identity) -> Result<SignedEnvelope, EnvelopeBuildError> {
    let header = EnvelopeHeader::for_certificate(identity.certificate_identity());
    let header_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?);
    let payload_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims)?);
    let signing_input = format!("{header_b64}.{payload_b64}");
    let signature = identity.signing_key().sign(signing_input.as_bytes())?;
    Ok(SignedEnvelope(format!(
        "{signing_input}.{}",
        URL_SAFE_NO_PAD.encode(signature)
    )))
}
