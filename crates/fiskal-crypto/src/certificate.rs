//! # Certificates and Certificate Identity
//!
//! [`CertificateIdentity`] is the part of a certificate that travels in
//! envelope headers: the serial number and the issuer/subject names.
//! [`PublicCertificate`] wraps a parsed X.509 certificate together with its
//! RSA public key; it is used both for the signer's own certificate and for
//! the regulator's out-of-band trust anchor.
//!
//! ## Serial Numbers
//!
//! DER encodes the serial as a signed big-endian integer, so a serial whose
//! top bit is set carries a leading `0x00` byte. The conversion reads the
//! magnitude as unsigned and rejects negative encodings outright.

use der::pem::LineEnding;
use der::{Decode, DecodePem, Encode, EncodePem};
use fiskal_core::{CryptoError, KeyMaterialError};
use num_bigint::BigUint;
use rsa::pkcs1::EncodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::RsaPublicKey;
use x509_cert::Certificate;

use crate::distinguished_name::format_name;

/// Serial number and names of a certificate, as they appear in envelope
/// headers. Immutable once extracted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CertificateIdentity {
    serial_number: BigUint,
    issuer_name: String,
    subject_name: String,
}

impl CertificateIdentity {
    /// Extract the identity of a parsed certificate.
    pub fn from_certificate(cert: &Certificate) -> Result<Self, KeyMaterialError> {
        let tbs = &cert.tbs_certificate;
        Ok(Self {
            serial_number: serial_to_biguint(tbs.serial_number.as_bytes())?,
            issuer_name: format_name(&tbs.issuer)?,
            subject_name: format_name(&tbs.subject)?,
        })
    }

    /// The serial number as an unsigned integer.
    pub fn serial_number(&self) -> &BigUint {
        &self.serial_number
    }

    /// The serial number in decimal, as emitted in the `serial` claim.
    pub fn serial_decimal(&self) -> String {
        self.serial_number.to_str_radix(10)
    }

    pub fn issuer_name(&self) -> &str {
        &self.issuer_name
    }

    pub fn subject_name(&self) -> &str {
        &self.subject_name
    }
}

fn serial_to_biguint(bytes: &[u8]) -> Result<BigUint, KeyMaterialError> {
    match bytes.first() {
        None => Err(KeyMaterialError::Certificate("empty serial number".into())),
        Some(b) if b & 0x80 != 0 => Err(KeyMaterialError::Certificate(
            "negative serial number".into(),
        )),
        Some(_) => Ok(BigUint::from_bytes_be(bytes)),
    }
}

/// A parsed X.509 certificate with an RSA subject key.
#[derive(Clone)]
pub struct PublicCertificate {
    certificate: Certificate,
    public_key: RsaPublicKey,
    identity: CertificateIdentity,
}

impl PublicCertificate {
    /// Parse a DER-encoded certificate.
    pub fn from_der(der: &[u8]) -> Result<Self, KeyMaterialError> {
        let certificate = Certificate::from_der(der)
            .map_err(|e| KeyMaterialError::Certificate(e.to_string()))?;
        Self::from_certificate(certificate)
    }

    /// Parse a PEM-encoded certificate (`BEGIN CERTIFICATE`).
    pub fn from_pem(pem: &str) -> Result<Self, KeyMaterialError> {
        let certificate = Certificate::from_pem(pem)
            .map_err(|e| KeyMaterialError::Certificate(e.to_string()))?;
        Self::from_certificate(certificate)
    }

    /// Parse PEM if the bytes look like PEM, DER otherwise.
    pub fn from_pem_or_der(bytes: &[u8]) -> Result<Self, KeyMaterialError> {
        match std::str::from_utf8(bytes) {
            Ok(text) if text.trim_start().starts_with("-----BEGIN") => Self::from_pem(text),
            _ => Self::from_der(bytes),
        }
    }

    pub(crate) fn from_certificate(certificate: Certificate) -> Result<Self, KeyMaterialError> {
        let spki = certificate
            .tbs_certificate
            .subject_public_key_info
            .to_der()
            .map_err(|e| KeyMaterialError::Certificate(e.to_string()))?;
        let public_key = RsaPublicKey::from_public_key_der(&spki)
            .map_err(|e| KeyMaterialError::UnsupportedKey(e.to_string()))?;
        let identity = CertificateIdentity::from_certificate(&certificate)?;
        Ok(Self {
            certificate,
            public_key,
            identity,
        })
    }

    /// The subject's RSA public key.
    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    /// Serial and names.
    pub fn identity(&self) -> &CertificateIdentity {
        &self.identity
    }

    /// The public key as PKCS#1 `RSAPublicKey` DER.
    pub fn public_key_pkcs1_der(&self) -> Result<Vec<u8>, CryptoError> {
        self.public_key
            .to_pkcs1_der()
            .map(|doc| doc.as_bytes().to_vec())
            .map_err(|e| CryptoError::KeyError(e.to_string()))
    }

    /// The certificate as DER.
    pub fn to_der(&self) -> Result<Vec<u8>, CryptoError> {
        self.certificate
            .to_der()
            .map_err(|e| CryptoError::KeyError(e.to_string()))
    }

    /// The certificate as PEM.
    pub fn to_pem(&self) -> Result<String, CryptoError> {
        self.certificate
            .to_pem(LineEnding::LF)
            .map_err(|e| CryptoError::KeyError(e.to_string()))
    }
}

impl std::fmt::Debug for PublicCertificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicCertificate")
            .field("subject", &self.identity.subject_name)
            .field("serial", &self.identity.serial_decimal())
            .finish()
    }
}
