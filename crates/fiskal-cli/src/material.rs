//! # Key Material and Service Arguments
//!
//! Shared flags for every subcommand that needs the signing identity or the
//! service connection, plus the loaders behind them.
//!
//! ## Security Invariant
//!
//! The key container passphrase is read only from `FISKAL_P12_PASSPHRASE`,
//! never from a flag, so it does not appear in shell history or process
//! listings. It is held in a `Zeroizing` buffer and dropped right after the
//! container is opened.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use fiskal_client::{ClientConfig, FiscalClient};
use fiskal_crypto::{Identity, PublicCertificate};
use serde::de::DeserializeOwned;
use url::Url;
use zeroize::Zeroizing;

/// Environment variable holding the key container passphrase.
pub const PASSPHRASE_VAR: &str = "FISKAL_P12_PASSPHRASE";

/// Location of the signing key container.
#[derive(Args, Debug, Clone)]
pub struct KeyArgs {
    /// PKCS#12 key container issued by the tax authority.
    #[arg(long, env = "FISKAL_P12_PATH")]
    pub p12: PathBuf,
}

/// Everything needed to talk to the service.
#[derive(Args, Debug, Clone)]
pub struct ServiceArgs {
    #[command(flatten)]
    pub key: KeyArgs,

    /// CA certificate the service's TLS certificate must chain to (PEM or DER).
    #[arg(long, env = "FISKAL_SERVER_CA")]
    pub server_ca: PathBuf,

    /// Certificate whose key signs the service's responses (PEM or DER).
    #[arg(long, env = "FISKAL_TRUST_ANCHOR")]
    pub trust_anchor: PathBuf,

    /// Service base URL. Overrides FISKAL_ENDPOINT_URL.
    #[arg(long)]
    pub endpoint: Option<Url>,
}

/// Open the key container named by `args`.
pub fn load_identity(args: &KeyArgs) -> Result<Identity> {
    let passphrase = Zeroizing::new(std::env::var(PASSPHRASE_VAR).with_context(|| {
        format!("{PASSPHRASE_VAR} must hold the key container passphrase")
    })?);
    open_container(&args.p12, &passphrase)
}

/// Open a key container with an explicit passphrase.
pub fn open_container(path: &Path, passphrase: &str) -> Result<Identity> {
    let bytes = Zeroizing::new(
        std::fs::read(path)
            .with_context(|| format!("cannot read key container {}", path.display()))?,
    );
    let identity = Identity::from_pkcs12(&bytes, passphrase)
        .with_context(|| format!("cannot open key container {}", path.display()))?;
    tracing::debug!(
        subject = %identity.certificate_identity().subject_name(),
        "loaded signing identity"
    );
    Ok(identity)
}

/// Read a certificate file in PEM or DER form.
pub fn load_certificate(path: &Path) -> Result<PublicCertificate> {
    let bytes =
        std::fs::read(path).with_context(|| format!("cannot read certificate {}", path.display()))?;
    PublicCertificate::from_pem_or_der(&bytes)
        .with_context(|| format!("invalid certificate {}", path.display()))
}

/// Build a mutual-TLS client from flags and environment.
pub fn connect(args: &ServiceArgs) -> Result<FiscalClient> {
    let mut config = ClientConfig::from_env().context("invalid client configuration")?;
    if let Some(endpoint) = &args.endpoint {
        config.endpoint_url = endpoint.clone();
    }
    let identity = Arc::new(load_identity(&args.key)?);
    let server_ca = load_certificate(&args.server_ca)?;
    let trust_anchor = load_certificate(&args.trust_anchor)?;
    tracing::info!(endpoint = %config.endpoint_url, "connecting");
    FiscalClient::connect(config, identity, &server_ca, &trust_anchor)
        .context("cannot set up the service client")
}

/// Deserialize a JSON document from `path`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid JSON in {}", path.display()))
}
