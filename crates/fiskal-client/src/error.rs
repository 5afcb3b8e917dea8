//! Client error types.
//!
//! [`TransportError`] covers the HTTP exchange alone. [`FiskalError`] is what
//! the submission pipeline returns: one variant per stage, so callers can
//! tell a rejected payload from an unreachable server from a forged reply.

use std::time::Duration;

use fiskal_core::{
    CanonicalizationError, CryptoError, EnvelopeVerificationError, KeyMaterialError,
    ProtocolSemanticError,
};
use fiskal_envelope::EnvelopeBuildError;
use fiskal_schema::SchemaValidationError;

use crate::config::ConfigError;

/// Errors from a single HTTP exchange with the service.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection, TLS handshake or timeout failure; no response was read.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The service returned a non-2xx status.
    #[error("{endpoint} returned {status}: {body}")]
    ApiError {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// The 2xx response body is not the expected JSON.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The request body could not be encoded.
    #[error("request encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
    /// The HTTP client could not be built from the TLS material.
    #[error("TLS setup failed: {0}")]
    Tls(String),
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl TransportError {
    /// Whether repeating the exchange could succeed.
    ///
    /// True for connection failures, timeouts and 5xx statuses. A 4xx, an
    /// unreadable 2xx body or a setup problem will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { source, .. } => {
                source.is_connect() || source.is_timeout() || source.is_request()
            }
            Self::ApiError { status, .. } => *status >= 500,
            Self::Deserialization { .. }
            | Self::Encoding(_)
            | Self::Tls(_)
            | Self::Config(_) => false,
        }
    }
}

/// Every way a submission can fail, by pipeline stage.
#[derive(Debug, thiserror::Error)]
pub enum FiskalError {
    #[error(transparent)]
    KeyMaterial(#[from] KeyMaterialError),

    #[error(transparent)]
    Canonicalization(#[from] CanonicalizationError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Validation(#[from] SchemaValidationError),

    #[error(transparent)]
    EnvelopeBuild(#[from] EnvelopeBuildError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Verification(#[from] EnvelopeVerificationError),

    #[error(transparent)]
    Semantic(#[from] ProtocolSemanticError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The submission did not finish within its unit budget.
    #[error("submission timed out after {0:?}")]
    UnitTimeout(Duration),

    /// The worker running the submission panicked or was aborted.
    #[error("submission task failed: {0}")]
    TaskFailed(String),
}

impl FiskalError {
    /// Only transport failures that could succeed on repeat are retryable.
    /// Anything that happened after a response verified is final.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Whether the request may have reached the service.
    pub fn reached_network(&self) -> bool {
        matches!(
            self,
            Self::Transport(_)
                | Self::Verification(_)
                | Self::Semantic(_)
                | Self::UnitTimeout(_)
                | Self::TaskFailed(_)
        )
    }
}
