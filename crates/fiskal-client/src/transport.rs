//! # Transport
//!
//! One HTTP exchange per call: POST a signed envelope as
//! `{"token": "<envelope>"}` and hand back the response token, unverified.
//! Retrying is the caller's business; every failure here is reported as a
//! [`TransportError`] the first time it happens.
//!
//! ## Endpoints
//!
//! | Method | Path | Body |
//! |--------|------|------|
//! | POST   | `{base}/invoices` | signed `InvoiceRequest` |
//! | POST   | `{base}/invoices/register` | signed `BusinessPremiseRequest` |
//! | POST   | `{base}/echo` | unsigned `{"EchoRequest": "..."}` |
//!
//! ## Security Invariant
//!
//! An `https` base URL requires [`TlsMaterial`]. The server is then only
//! trusted if it chains to the pinned CA; built-in roots are disabled.

use fiskal_core::PayloadKind;
use fiskal_envelope::{SignedEnvelope, TokenMessage};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::config::{ClientConfig, TlsMaterial};
use crate::error::TransportError;

/// Content type the service expects on every request.
pub const CONTENT_TYPE_JSON_UTF8: &str = "application/json; UTF-8";

const INVOICES_PATH: &str = "invoices";
const REGISTER_PATH: &str = "invoices/register";
const ECHO_PATH: &str = "echo";

#[derive(Debug, Serialize)]
struct EchoRequest<'a> {
    #[serde(rename = "EchoRequest")]
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct EchoResponse {
    #[serde(rename = "EchoResponse")]
    text: String,
}

/// HTTP client bound to one service base URL.
#[derive(Debug, Clone)]
pub struct Transport {
    http: reqwest::Client,
    config: ClientConfig,
}

impl Transport {
    /// Build the HTTP client, with mutual TLS when `tls` is given.
    pub fn new(config: ClientConfig, tls: Option<&TlsMaterial>) -> Result<Self, TransportError> {
        config.validate()?;

        let mut builder = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("fiskal/", env!("CARGO_PKG_VERSION")));

        match tls {
            Some(tls) => {
                let identity = reqwest::Identity::from_pem(tls.identity_pem())
                    .map_err(|e| TransportError::Tls(format!("client identity: {e}")))?;
                let server_ca = reqwest::Certificate::from_pem(tls.server_ca_pem())
                    .map_err(|e| TransportError::Tls(format!("server CA: {e}")))?;
                builder = builder
                    .use_rustls_tls()
                    .tls_built_in_root_certs(false)
                    .add_root_certificate(server_ca)
                    .identity(identity);
            }
            None if config.endpoint_url.scheme() == "https" => {
                return Err(TransportError::Tls(
                    "https endpoint requires client identity and server CA".into(),
                ));
            }
            None => {}
        }

        let http = builder.build().map_err(|e| TransportError::Http {
            endpoint: "client_init".into(),
            source: e,
        })?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// POST a signed request and return the raw response token.
    pub async fn submit(
        &self,
        kind: PayloadKind,
        envelope: &SignedEnvelope,
    ) -> Result<String, TransportError> {
        let path = match kind {
            PayloadKind::Invoice => INVOICES_PATH,
            PayloadKind::BusinessPremise => REGISTER_PATH,
        };
        let endpoint = format!("POST /{path}");
        let body = TokenMessage::from(envelope.clone());
        tracing::debug!(%endpoint, token_len = body.token.len(), "sending signed envelope");

        let response: TokenMessage = self.post_json(&endpoint, path, &body).await?;
        tracing::debug!(%endpoint, token_len = response.token.len(), "received response token");
        Ok(response.token)
    }

    /// Round-trip `text` through the echo endpoint and return what came back.
    pub async fn echo(&self, text: &str) -> Result<String, TransportError> {
        let endpoint = format!("POST /{ECHO_PATH}");
        let response: EchoResponse = self
            .post_json(&endpoint, ECHO_PATH, &EchoRequest { text })
            .await?;
        Ok(response.text)
    }

    async fn post_json<B, R>(&self, endpoint: &str, path: &str, body: &B) -> Result<R, TransportError>
    where
        B: Serialize + ?Sized,
        R: for<'de> Deserialize<'de>,
    {
        let bytes = serde_json::to_vec(body)?;

        let resp = self
            .http
            .post(self.config.endpoint(path))
            .header(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON_UTF8))
            .body(bytes)
            .send()
            .await
            .map_err(|e| TransportError::Http {
                endpoint: endpoint.to_string(),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read response body: {e}>"));
            return Err(TransportError::ApiError {
                endpoint: endpoint.to_string(),
                status,
                body,
            });
        }

        resp.json().await.map_err(|e| TransportError::Deserialization {
            endpoint: endpoint.to_string(),
            source: e,
        })
    }
}
