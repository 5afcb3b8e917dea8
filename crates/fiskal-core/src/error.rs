//! # Error Types — Fiscal Pipeline Failure Taxonomy
//!
//! Every stage of the submission pipeline fails fast with one of the typed
//! errors below. None of them carry defaults or partial results.
//!
//! ## Design
//!
//! - Key-material errors are fatal and never retried.
//! - Canonicalization errors are raised before anything is signed.
//! - Envelope verification errors mean the counterparty did not
//!   authenticate; semantic errors mean it did, but the content is unusable.
//!
//! Schema violations live in `fiskal-schema` and transport failures in
//! `fiskal-client`, next to the code that produces them.

use thiserror::Error;

/// The key container could not be turned into a usable signing identity.
#[derive(Error, Debug)]
pub enum KeyMaterialError {
    /// The container MAC did not verify under the supplied passphrase.
    #[error("key container passphrase is incorrect")]
    WrongPassphrase,

    /// The container bytes are not a decodable PKCS#12 structure.
    #[error("malformed key container: {0}")]
    Malformed(String),

    /// No private-key bag shares a local-key id with a certificate bag.
    #[error("key container holds no private key paired with a certificate")]
    NoKeyCertificatePair,

    /// The paired private key does not belong to the paired certificate.
    #[error("private key does not match certificate public key")]
    KeyMismatch,

    /// The certificate could not be decoded.
    #[error("invalid certificate: {0}")]
    Certificate(String),

    /// The key is not an RSA key or could not be decoded.
    #[error("unsupported private key: {0}")]
    UnsupportedKey(String),
}

/// A field value cannot be rendered into the frozen canonical layout.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// NaN or infinite amounts have no two-decimal rendering.
    #[error("amount must be finite, got {0}")]
    NonFiniteAmount(f64),

    /// Amounts carry at most two decimal digits; rounding is not performed.
    #[error("amount {0} has more than two decimal digits")]
    AmountPrecision(String),

    /// Amount text could not be parsed.
    #[error("invalid amount {value:?}: {reason}")]
    InvalidAmount {
        /// The rejected input.
        value: String,
        /// Parser message.
        reason: String,
    },

    /// Tax numbers are exactly eight decimal digits.
    #[error("tax number must be exactly 8 digits, got {0:?}")]
    InvalidTaxNumber(String),

    /// Premise/device identifiers are 1–20 ASCII alphanumerics.
    #[error("{field} must be 1-20 ASCII alphanumeric characters, got {value:?}")]
    InvalidIdentifier {
        /// Name of the identifier field.
        field: &'static str,
        /// The rejected input.
        value: String,
    },

    /// Invoice numbers are non-negative integers of up to 20 digits.
    #[error("invalid invoice number {0:?}")]
    InvalidInvoiceNumber(String),

    /// Protected IDs are 32 lowercase hexadecimal characters.
    #[error("protected id must be 32 lowercase hex characters, got {0:?}")]
    InvalidProtectedId(String),

    /// A timestamp did not match its required layout.
    #[error("invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Errors in signing operations with already-extracted key material.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// RSA signing failed.
    #[error("signing failed: {0}")]
    SigningFailed(String),

    /// Public key could not be decoded or re-encoded.
    #[error("key error: {0}")]
    KeyError(String),
}

/// A signed token could not be authenticated. Always fatal.
#[derive(Error, Debug)]
pub enum EnvelopeVerificationError {
    /// Not a three-part compact token, or a part is not valid base64/JSON.
    #[error("malformed envelope: {0}")]
    Malformed(String),

    /// The header names an algorithm other than the one the protocol fixes.
    #[error("algorithm mismatch: expected {expected}, found {found}")]
    AlgorithmMismatch {
        /// Required algorithm.
        expected: String,
        /// Algorithm named by the token.
        found: String,
    },

    /// The signature does not verify under the trusted public key.
    #[error("signature verification failed: {0}")]
    InvalidSignature(String),

    /// The trust anchor is unusable for RS256 verification.
    #[error("trust anchor unusable: {0}")]
    TrustAnchor(String),
}

/// A verified response does not carry what the request requires.
#[derive(Error, Debug)]
pub enum ProtocolSemanticError {
    /// An invoice response without `InvoiceResponse.UniqueInvoiceID`.
    #[error("verified invoice response carries no unique invoice id (EOR)")]
    MissingUniqueInvoiceId,

    /// The regulator answered with an explicit error object.
    #[error("regulator rejected the request: [{code}] {message}")]
    Rejected {
        /// Regulator error code.
        code: String,
        /// Regulator error message.
        message: String,
    },

    /// The response claims do not have the expected shape.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The echo endpoint returned a different text than was sent.
    #[error("echo mismatch: sent {sent:?}, received {received:?}")]
    EchoMismatch {
        /// Text sent.
        sent: String,
        /// Text received.
        received: String,
    },
}
