//! # Signable String — Frozen ZOI Canonicalization
//!
//! This module defines `SignableString`, the sole construction path for
//! the bytes that are signed into a Protected ID (ZOI).
//!
//! ## Security Invariant
//!
//! The layout is a contract with the regulator's verifier and must match
//! it bit for bit. The six fields are concatenated in this order with no
//! separators:
//!
//! | # | Field | Rendering |
//! |---|-------|-----------|
//! | 1 | tax number | 8 digits |
//! | 2 | issue time | `DD.MM.YYYY HH:mm:ss` |
//! | 3 | invoice number | decimal, no padding |
//! | 4 | business premise id | as registered |
//! | 5 | electronic device id | as registered |
//! | 6 | invoice amount | exactly two decimals |
//!
//! The inner `String` is private; the only constructor takes an
//! [`InvoiceRecord`], whose field types have already rejected anything
//! that cannot be rendered.

use crate::invoice::InvoiceRecord;

/// The exact byte sequence signed to produce a ZOI.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignableString(String);

impl SignableString {
    /// Concatenate the ZOI fields of `invoice` in the frozen order.
    pub fn from_invoice(invoice: &InvoiceRecord) -> Self {
        let parts = [
            invoice.tax_number.to_string(),
            invoice.issue_date_time.to_signable(),
            invoice.invoice_number.to_string(),
            invoice.business_premise_id.to_string(),
            invoice.electronic_device_id.to_string(),
            invoice.invoice_amount.to_signable(),
        ];
        Self(parts.concat())
    }

    /// Access the bytes for signing.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Access the text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<[u8]> for SignableString {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}
