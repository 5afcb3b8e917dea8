//! # Fiscal Identifier Newtypes
//!
//! Newtype wrappers for every identifier that flows into the signable
//! string or the wire payload. Each has a validating constructor, so an
//! out-of-format value is rejected with a `CanonicalizationError` long
//! before anything is signed.
//!
//! ## Security Invariant
//!
//! Identifiers that participate in the ZOI signable string
//! (`TaxNumber`, `InvoiceNumber`, `BusinessPremiseId`,
//! `ElectronicDeviceId`) have a single rendering. The signer and the
//! regulator's verifier must produce byte-identical text from them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CanonicalizationError;

/// Eight-digit taxpayer number.
///
/// Fixed width keeps the QR control code at a constant 60 digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct TaxNumber(u32);

impl TaxNumber {
    /// Smallest eight-digit value.
    pub const MIN: u32 = 10_000_000;
    /// Largest eight-digit value.
    pub const MAX: u32 = 99_999_999;

    /// Validate an eight-digit tax number.
    pub fn new(value: u32) -> Result<Self, CanonicalizationError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(CanonicalizationError::InvalidTaxNumber(value.to_string()))
        }
    }

    /// The numeric value.
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for TaxNumber {
    type Error = CanonicalizationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TaxNumber> for u32 {
    fn from(t: TaxNumber) -> u32 {
        t.0
    }
}

impl FromStr for TaxNumber {
    type Err = CanonicalizationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CanonicalizationError::InvalidTaxNumber(s.to_string()));
        }
        let value = s
            .parse::<u32>()
            .map_err(|_| CanonicalizationError::InvalidTaxNumber(s.to_string()))?;
        Self::new(value)
    }
}

impl fmt::Display for TaxNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sequential invoice number within a premise or device.
///
/// Serialized on the wire as a digit string, as the regulator format expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InvoiceNumber(u64);

impl InvoiceNumber {
    /// Wrap a numeric invoice number.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// The numeric value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl FromStr for InvoiceNumber {
    type Err = CanonicalizationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.len() > 20 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CanonicalizationError::InvalidInvoiceNumber(s.to_string()));
        }
        s.parse::<u64>()
            .map(Self)
            .map_err(|_| CanonicalizationError::InvalidInvoiceNumber(s.to_string()))
    }
}

impl TryFrom<String> for InvoiceNumber {
    type Error = CanonicalizationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<InvoiceNumber> for String {
    fn from(n: InvoiceNumber) -> String {
        n.0.to_string()
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn validate_alnum_id(field: &'static str, value: &str) -> Result<(), CanonicalizationError> {
    if value.is_empty() || value.len() > 20 || !value.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(CanonicalizationError::InvalidIdentifier {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

macro_rules! alnum_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and wrap the identifier.
            pub fn new(value: impl Into<String>) -> Result<Self, CanonicalizationError> {
                let value = value.into();
                validate_alnum_id($field, &value)?;
                Ok(Self(value))
            }

            /// The identifier text.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = CanonicalizationError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::new(s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

alnum_id!(
    /// Business premise identifier registered with the regulator.
    BusinessPremiseId,
    "BusinessPremiseID"
);

alnum_id!(
    /// Electronic (cash register) device identifier within a premise.
    ElectronicDeviceId,
    "ElectronicDeviceID"
);

/// Per-submission message identifier (UUID v4).
///
/// A retry of the same invoice is a new message and gets a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub Uuid);

impl MessageId {
    /// Generate a fresh random message identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Protected ID (ZOI): 32 lowercase hex characters over a 16-byte digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProtectedId {
    digest: [u8; 16],
    hex: String,
}

impl ProtectedId {
    /// Render a 16-byte digest as a protected id.
    pub fn from_digest(digest: [u8; 16]) -> Self {
        let hex = digest.iter().map(|b| format!("{b:02x}")).collect();
        Self { digest, hex }
    }

    /// Parse a protected id, requiring exactly 32 lowercase hex characters.
    pub fn parse(s: &str) -> Result<Self, CanonicalizationError> {
        let invalid = || CanonicalizationError::InvalidProtectedId(s.to_string());
        if s.len() != 32 {
            return Err(invalid());
        }
        let mut digest = [0u8; 16];
        for (byte, pair) in digest.iter_mut().zip(s.as_bytes().chunks_exact(2)) {
            let hi = lower_hex_value(pair[0]).ok_or_else(invalid)?;
            let lo = lower_hex_value(pair[1]).ok_or_else(invalid)?;
            *byte = (hi << 4) | lo;
        }
        Ok(Self {
            digest,
            hex: s.to_string(),
        })
    }

    /// The hex text.
    pub fn as_str(&self) -> &str {
        &self.hex
    }

    /// The digest bytes.
    pub fn digest(&self) -> &[u8; 16] {
        &self.digest
    }
}

fn lower_hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        _ => None,
    }
}

impl TryFrom<String> for ProtectedId {
    type Error = CanonicalizationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ProtectedId> for String {
    fn from(id: ProtectedId) -> String {
        id.hex
    }
}

impl fmt::Display for ProtectedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex)
    }
}

/// Unique invoice identifier (EOR) assigned by the regulator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UniqueInvoiceId(pub String);

impl UniqueInvoiceId {
    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UniqueInvoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tax_number_accepts_eight_digits() {
        let t = TaxNumber::new(10489185).unwrap();
        assert_eq!(t.to_string(), "10489185");
        assert_eq!("10489185".parse::<TaxNumber>().unwrap(), t);
    }

    #[test]
    fn tax_number_rejects_other_widths() {
        assert!(TaxNumber::new(1234567).is_err());
        assert!(TaxNumber::new(100_000_000).is_err());
        assert!("01234567".parse::<TaxNumber>().is_err());
        assert!("1234567a".parse::<TaxNumber>().is_err());
    }

    #[test]
    fn tax_number_serializes_as_integer() {
        let t = TaxNumber::new(42531357).unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), "42531357");
        assert!(serde_json::from_str::<TaxNumber>("123").is_err());
    }

    #[test]
    fn invoice_number_serializes_as_string() {
        let n = InvoiceNumber::new(145);
        assert_eq!(serde_json::to_string(&n).unwrap(), "\"145\"");
        let back: InvoiceNumber = serde_json::from_str("\"145\"").unwrap();
        assert_eq!(back, n);
        assert!(serde_json::from_str::<InvoiceNumber>("\"14a\"").is_err());
    }

    #[test]
    fn premise_id_validation() {
        assert!(BusinessPremiseId::new("BPID1").is_ok());
        assert!(BusinessPremiseId::new("").is_err());
        assert!(BusinessPremiseId::new("BP-1").is_err());
        assert!(BusinessPremiseId::new("A".repeat(21)).is_err());
        assert!(ElectronicDeviceId::new("EDID1").is_ok());
        assert!(ElectronicDeviceId::new("ED ID").is_err());
    }

    #[test]
    fn protected_id_requires_lowercase_hex() {
        assert!(ProtectedId::parse("1314144c07e572239bbb0e5e8ec103dc").is_ok());
        assert!(ProtectedId::parse("1314144C07E572239BBB0E5E8EC103DC").is_err());
        assert!(ProtectedId::parse("abc").is_err());
    }

    #[test]
    fn protected_id_from_digest_is_hex() {
        let id = ProtectedId::from_digest([0xab; 16]);
        assert_eq!(id.as_str(), "ab".repeat(16));
    }

    #[test]
    fn protected_id_parse_recovers_digest() {
        let id = ProtectedId::parse("000102030405060708090a0b0c0d0eff").unwrap();
        assert_eq!(
            id.digest(),
            &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 0xff]
        );
        assert_eq!(id, ProtectedId::from_digest(*id.digest()));
        assert!(ProtectedId::parse("000102030405060708090a0b0c0d0eg0").is_err());
    }

    #[test]
    fn message_ids_are_unique() {
        assert_ne!(MessageId::new(), MessageId::new());
    }
}
