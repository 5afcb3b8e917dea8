//! # fiskal-envelope — Signed Envelopes
//!
//! Every request to the regulator travels as an RS256 compact token whose
//! header names the signer's certificate, and every response comes back
//! the same way. This crate builds the former and authenticates the
//! latter:
//!
//! - [`build_envelope`] signs a [`ValidatedPayload`](fiskal_schema::ValidatedPayload).
//!   Only validated payloads can be signed.
//! - [`EnvelopeVerifier`] checks a response against the regulator's
//!   certificate, obtained out of band.
//! - [`interpret_response`] extracts the EOR from verified claims.
//!
//! ## Crate Policy
//!
//! - Verification fails closed: an unverifiable token yields no claims.
//! - Semantic problems with a verified response are reported as
//!   `ProtocolSemanticError`, never as verification errors.

pub mod builder;
pub mod response;
pub mod verifier;

#[cfg(test)]
pub(crate) mod testutil;

use serde::{Deserialize, Serialize};

pub use builder::{build_envelope, sign_claims, EnvelopeBuildError, EnvelopeHeader, SignedEnvelope};
pub use response::{interpret_response, VerificationResult};
pub use verifier::{EnvelopeVerifier, VerifiedEnvelope};

/// Wire body of both requests and responses: `{"token": "<envelope>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMessage {
    pub token: String,
}

impl From<SignedEnvelope> for TokenMessage {
    fn from(envelope: SignedEnvelope) -> Self {
        Self {
            token: envelope.into_string(),
        }
    }
}
