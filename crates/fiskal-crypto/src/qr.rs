//! # QR Control Code
//!
//! The numeric code printed on receipts for scan-based verification:
//!
//! | Digits | Content |
//! |--------|---------|
//! | 39 | ZOI read as a base-16 integer, in decimal, left-padded with `0` |
//! | 12 | issue time `YYMMDDHHmmss` |
//! | 8 | tax number |
//! | 1 | sum of all preceding digits, mod 10 |
//!
//! A ZOI is 128 bits and `u128::MAX` has exactly 39 decimal digits, so the
//! first segment never overflows its width.

use std::fmt;

use fiskal_core::{IssueDateTime, ProtectedId, TaxNumber};

/// Width of the ZOI segment.
pub const ZOI_DIGITS: usize = 39;

/// A checksum-terminated QR control code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QrCode(String);

impl QrCode {
    /// Derive the code from a ZOI, issue time and tax number.
    pub fn generate(zoi: &ProtectedId, issued: &IssueDateTime, tax_number: TaxNumber) -> Self {
        let zoi_value = u128::from_be_bytes(*zoi.digest());
        let body = format!(
            "{zoi_value:0width$}{}{}",
            issued.to_qr_digits(),
            tax_number,
            width = ZOI_DIGITS
        );
        let check = checksum(&body);
        Self(format!("{body}{check}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the final digit matches the checksum of the rest.
    pub fn has_valid_checksum(code: &str) -> bool {
        match code.char_indices().last() {
            Some((idx, last)) => {
                code.bytes().all(|b| b.is_ascii_digit())
                    && last.to_digit(10) == Some(checksum(&code[..idx]))
            }
            None => false,
        }
    }
}

impl fmt::Display for QrCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn checksum(digits: &str) -> u32 {
    digits.chars().filter_map(|c| c.to_digit(10)).sum::<u32>() % 10
}
