//! # RSA/SHA-256 Signing
//!
//! RSASSA-PKCS1-v1_5 with SHA-256, the only signature scheme the protocol
//! uses. It signs both the ZOI input and the envelope.
//!
//! ## Security Invariant
//!
//! - The private key is never serialized or logged. `SigningKey` does not
//!   implement `Serialize` and its `Debug` output is redacted.
//! - PKCS#1 v1.5 signing is deterministic: the same key and message always
//!   yield the same signature, which is what makes the ZOI reproducible.

use der::pem::LineEnding;
use fiskal_core::{CryptoError, KeyMaterialError};
use rsa::pkcs1v15;
use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use zeroize::Zeroizing;

/// An RSA private key that signs with PKCS#1 v1.5 / SHA-256.
#[derive(Clone)]
pub struct SigningKey {
    private_key: RsaPrivateKey,
    signer: pkcs1v15::SigningKey<Sha256>,
}

impl SigningKey {
    /// Wrap an RSA private key.
    pub fn new(private_key: RsaPrivateKey) -> Self {
        let signer = pkcs1v15::SigningKey::<Sha256>::new(private_key.clone());
        Self {
            private_key,
            signer,
        }
    }

    /// Decode an unencrypted PKCS#8 `PrivateKeyInfo`.
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self, KeyMaterialError> {
        RsaPrivateKey::from_pkcs8_der(der)
            .map(Self::new)
            .map_err(|e| KeyMaterialError::UnsupportedKey(e.to_string()))
    }

    /// Sign `message`, returning the raw signature bytes.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.signer
            .try_sign(message)
            .map(|sig| sig.to_vec())
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))
    }

    /// The matching public key.
    pub fn public_key(&self) -> RsaPublicKey {
        RsaPublicKey::from(&self.private_key)
    }

    /// PKCS#8 PEM of the private key, for building a TLS client identity.
    pub(crate) fn to_pkcs8_pem(&self) -> Result<Zeroizing<String>, CryptoError> {
        self.private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| CryptoError::KeyError(e.to_string()))
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

/// Verify an RSA/SHA-256 PKCS#1 v1.5 signature.
pub fn verify_signature(
    public_key: &RsaPublicKey,
    message: &[u8],
    signature: &[u8],
) -> Result<(), CryptoError> {
    let verifier = pkcs1v15::VerifyingKey::<Sha256>::new(public_key.clone());
    let signature = pkcs1v15::Signature::try_from(signature)
        .map_err(|e| CryptoError::SigningFailed(format!("malformed signature: {e}")))?;
    verifier
        .verify(message, &signature)
        .map_err(|e| CryptoError::SigningFailed(format!("signature does not verify: {e}")))
}
