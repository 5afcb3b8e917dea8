//! Client configuration.
//!
//! Defaults point at the regulator's test endpoint. Override via environment
//! variables or explicit construction.

use std::time::Duration;

use fiskal_crypto::{Identity, PublicCertificate};
use url::Url;
use zeroize::Zeroizing;

/// Default service base URL (regulator test environment).
pub const DEFAULT_ENDPOINT_URL: &str = "https://blagajne-test.fu.gov.si:9002/v1/cash_registers";

/// Configuration for talking to the fiscal verification service.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service base URL; endpoint paths are appended to it.
    pub endpoint_url: Url,
    /// Timeout for a single HTTP exchange, in seconds.
    pub timeout_secs: u64,
    /// Budget for one submission including retries, in seconds.
    pub unit_timeout_secs: u64,
    /// Retries after the first attempt on retryable transport failures.
    pub max_retries: u32,
    /// First backoff delay in milliseconds; doubles per retry.
    pub retry_base_ms: u64,
    /// Submissions in flight at once in a [`SubmissionPool`](crate::SubmissionPool).
    pub max_concurrency: usize,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `FISKAL_ENDPOINT_URL` (default: [`DEFAULT_ENDPOINT_URL`])
    /// - `FISKAL_TIMEOUT_SECS` (default: 30)
    /// - `FISKAL_UNIT_TIMEOUT_SECS` (default: 60)
    /// - `FISKAL_MAX_RETRIES` (default: 3)
    /// - `FISKAL_RETRY_BASE_MS` (default: 200)
    /// - `FISKAL_MAX_CONCURRENCY` (default: 4)
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            endpoint_url: env_url("FISKAL_ENDPOINT_URL", DEFAULT_ENDPOINT_URL)?,
            timeout_secs: env_number("FISKAL_TIMEOUT_SECS", 30)?,
            unit_timeout_secs: env_number("FISKAL_UNIT_TIMEOUT_SECS", 60)?,
            max_retries: env_number("FISKAL_MAX_RETRIES", 3)?,
            retry_base_ms: env_number("FISKAL_RETRY_BASE_MS", 200)?,
            max_concurrency: env_number("FISKAL_MAX_CONCURRENCY", 4)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Configuration pointing at a local mock server (for testing).
    ///
    /// Short timeouts and backoff so retry paths run quickly.
    pub fn local_mock(base_url: &str) -> Result<Self, ConfigError> {
        let endpoint_url = Url::parse(base_url)
            .map_err(|e| ConfigError::InvalidUrl(base_url.to_string(), e.to_string()))?;
        Ok(Self {
            endpoint_url,
            timeout_secs: 5,
            unit_timeout_secs: 10,
            max_retries: 2,
            retry_base_ms: 10,
            max_concurrency: 2,
        })
    }

    /// Reject values the client cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                var: "timeout_secs".into(),
                value: "0".into(),
            });
        }
        if self.unit_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                var: "unit_timeout_secs".into(),
                value: "0".into(),
            });
        }
        if self.max_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                var: "max_concurrency".into(),
                value: "0".into(),
            });
        }
        match self.endpoint_url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ConfigError::InvalidUrl(
                self.endpoint_url.to_string(),
                format!("unsupported scheme {other:?}"),
            )),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn unit_timeout(&self) -> Duration {
        Duration::from_secs(self.unit_timeout_secs)
    }

    /// Full URL of an endpoint below the base, e.g. `invoices/register`.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.endpoint_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Key material for the mutual-TLS handshake.
///
/// The client identity is derived from the same key container that signs
/// envelopes. Built-in root certificates are never trusted; the server must
/// chain to `server_ca`.
///
/// Custom `Debug` implementation redacts the private key.
#[derive(Clone)]
pub struct TlsMaterial {
    identity_pem: Zeroizing<String>,
    server_ca_pem: String,
}

impl TlsMaterial {
    /// Client identity from `identity`, server pinned to `server_ca`.
    pub fn new(identity: &Identity, server_ca: &PublicCertificate) -> Result<Self, ConfigError> {
        let identity_pem = identity
            .to_identity_pem()
            .map_err(|e| ConfigError::TlsMaterial(e.to_string()))?;
        let server_ca_pem = server_ca
            .to_pem()
            .map_err(|e| ConfigError::TlsMaterial(e.to_string()))?;
        Ok(Self {
            identity_pem,
            server_ca_pem,
        })
    }

    pub(crate) fn identity_pem(&self) -> &[u8] {
        self.identity_pem.as_bytes()
    }

    pub(crate) fn server_ca_pem(&self) -> &[u8] {
        self.server_ca_pem.as_bytes()
    }
}

impl std::fmt::Debug for TlsMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsMaterial")
            .field("identity_pem", &"[REDACTED]")
            .field("server_ca_pem_len", &self.server_ca_pem.len())
            .finish()
    }
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

fn env_number<T: std::str::FromStr>(var: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            var: var.to_string(),
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: String, value: String },
    #[error("TLS material unusable: {0}")]
    TlsMaterial(String),
}
