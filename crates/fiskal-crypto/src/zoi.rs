//! # Protected ID (ZOI)
//!
//! `ZOI = hex(MD5(RSA-SHA256-sign(signable string)))`.
//!
//! ## Security Invariant
//!
//! The digest is taken over the raw signature bytes. This reduction and the
//! signable-string layout are a frozen contract with the regulator's
//! verifier; the regression vector in the tests pins both against the
//! fixed test key in `testdata/client.p12`.

use fiskal_core::{CryptoError, InvoiceRecord, ProtectedId};
use md5::{Digest, Md5};

use crate::signing::SigningKey;

/// Compute the Protected ID of `record` under `key`.
pub fn protected_id(record: &InvoiceRecord, key: &SigningKey) -> Result<ProtectedId, CryptoError> {
    let signable = record.signable_string();
    let signature = key.sign(signable.as_bytes())?;
    Ok(reduce_signature(&signature))
}

/// Reduce a raw signature to its Protected ID.
pub fn reduce_signature(signature: &[u8]) -> ProtectedId {
    let digest = Md5::digest(signature);
    let mut out = [0u8; 16];
    out.copy_from_slice(&digest);
    ProtectedId::from_digest(out)
}
