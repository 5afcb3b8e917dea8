//! # fiskal-crypto — Key Material and Integrity Codes
//!
//! - **Key container extraction**: PKCS#12 → [`Identity`] (signing key,
//!   certificate, certificate identity, chain).
//! - **RSA/SHA-256** signing and verification, PKCS#1 v1.5.
//! - **Protected ID (ZOI)** from an invoice and a signing key.
//! - **QR control code** from a ZOI, issue time and tax number.
//!
//! ## Crate Policy
//!
//! - Depends only on `fiskal-core` internally.
//! - No mocking of cryptographic operations in tests. All tests use the
//!   real containers and certificates under `testdata/`.
//! - Private keys and passphrases are never logged.

pub mod certificate;
pub mod distinguished_name;
pub mod key_container;
pub mod qr;
pub mod signing;
pub mod zoi;

pub use certificate::{CertificateIdentity, PublicCertificate};
pub use key_container::Identity;
pub use qr::QrCode;
pub use signing::{verify_signature, SigningKey};
pub use zoi::protected_id;
