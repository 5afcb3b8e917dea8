//! Mutual-TLS handshakes against a local rustls server that requires a
//! client certificate chaining to `testdata/mtls/ca.pem`.

mod common;

use std::net::SocketAddr;
use std::sync::Arc;

use common::client_identity;
use fiskal_client::{ClientConfig, TlsMaterial, Transport, TransportError};
use fiskal_crypto::{Identity, PublicCertificate};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_rustls::rustls::crypto::ring;
use tokio_rustls::rustls::pki_types::CertificateDer;
use tokio_rustls::rustls::server::WebPkiClientVerifier;
use tokio_rustls::rustls::{RootCertStore, ServerConfig};
use tokio_rustls::TlsAcceptor;

const MTLS_CA_PEM: &str = include_str!("../../../testdata/mtls/ca.pem");
const MTLS_CLIENT_P12: &[u8] = include_bytes!("../../../testdata/mtls/client.p12");
const SERVER_PEM: &str = include_str!("../../../testdata/mtls/server.pem");
const SERVER_KEY: &str = include_str!("../../../testdata/mtls/server.key");

fn mtls_identity() -> Identity {
    Identity::from_pkcs12(MTLS_CLIENT_P12, "test-pass").unwrap()
}

fn mtls_ca() -> PublicCertificate {
    PublicCertificate::from_pem(MTLS_CA_PEM).unwrap()
}

fn server_config() -> ServerConfig {
    let provider = Arc::new(ring::default_provider());

    let mut roots = RootCertStore::empty();
    for cert in rustls_pemfile::certs(&mut MTLS_CA_PEM.as_bytes()) {
        roots.add(cert.unwrap()).unwrap();
    }
    let verifier = WebPkiClientVerifier::builder_with_provider(Arc::new(roots), provider.clone())
        .build()
        .unwrap();

    let chain: Vec<CertificateDer<'static>> = rustls_pemfile::certs(&mut SERVER_PEM.as_bytes())
        .collect::<Result<_, _>>()
        .unwrap();
    let key = rustls_pemfile::private_key(&mut SERVER_KEY.as_bytes())
        .unwrap()
        .unwrap();

    ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_client_cert_verifier(verifier)
        .with_single_cert(chain, key)
        .unwrap()
}

/// Serve `/echo` over TLS, answering each connection once.
async fn spawn_echo_server() -> SocketAddr {
    let acceptor = TlsAcceptor::from(Arc::new(server_config()));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                let Ok(mut tls) = acceptor.accept(stream).await else {
                    return;
                };
                let Some(body) = read_request_body(&mut tls).await else {
                    return;
                };
                let request: Value = serde_json::from_slice(&body).unwrap_or_default();
                let reply = json!({"EchoResponse": request["EchoRequest"]}).to_string();
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{reply}",
                    reply.len()
                );
                let _ = tls.write_all(response.as_bytes()).await;
                let _ = tls.shutdown().await;
            });
        }
    });

    addr
}

async fn read_request_body<S: AsyncReadExt + Unpin>(stream: &mut S) -> Option<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let content_length: usize = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    Some(buf[header_end..header_end + content_length].to_vec())
}

fn transport_for(addr: SocketAddr, identity: &Identity, server_ca: &PublicCertificate) -> Transport {
    let config = ClientConfig::local_mock(&format!("https://127.0.0.1:{}", addr.port())).unwrap();
    let tls = TlsMaterial::new(identity, server_ca).unwrap();
    Transport::new(config, Some(&tls)).unwrap()
}

#[tokio::test]
async fn echo_completes_mutual_tls_handshake() {
    let addr = spawn_echo_server().await;
    let transport = transport_for(addr, &mtls_identity(), &mtls_ca());

    assert_eq!(transport.echo("ping").await.unwrap(), "ping");
}

#[tokio::test]
async fn server_rejects_client_certificate_from_unknown_issuer() {
    let addr = spawn_echo_server().await;
    // Trusts the server, but presents a certificate the server cannot chain.
    let transport = transport_for(addr, &client_identity(), &mtls_ca());

    let err = transport.echo("ping").await.unwrap_err();
    assert!(matches!(err, TransportError::Http { .. }), "got {err:?}");
}

#[tokio::test]
async fn client_rejects_server_outside_pinned_ca() {
    let addr = spawn_echo_server().await;
    let wrong_ca = PublicCertificate::from_pem(common::CA_PEM).unwrap();
    let transport = transport_for(addr, &mtls_identity(), &wrong_ca);

    let err = transport.echo("ping").await.unwrap_err();
    assert!(matches!(err, TransportError::Http { .. }), "got {err:?}");
}
