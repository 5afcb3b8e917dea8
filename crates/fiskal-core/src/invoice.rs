//! # Invoice Record
//!
//! The caller-supplied business data of one retail invoice. A record is
//! an immutable snapshot: the ZOI is computed from a shared reference to
//! it, and any change produces a new record whose ZOI must be recomputed.

use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::canonical::SignableString;
use crate::identity::{BusinessPremiseId, ElectronicDeviceId, InvoiceNumber, TaxNumber};
use crate::temporal::IssueDateTime;

/// How invoice numbers are allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum NumberingStructure {
    /// Sequential per business premise.
    #[default]
    B,
    /// Sequential per electronic device.
    C,
}

/// One VAT row of the tax breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatRow {
    /// Rate in percent, e.g. `22.00`.
    #[serde(rename = "TaxRate")]
    pub rate: Amount,
    /// Net base taxed at `rate`.
    #[serde(rename = "TaxableAmount")]
    pub taxable_amount: Amount,
    /// Tax due on `taxable_amount`.
    #[serde(rename = "TaxAmount")]
    pub tax_amount: Amount,
}

impl VatRow {
    /// Gross value of this row (`taxable + tax`).
    pub fn gross(&self) -> Amount {
        self.taxable_amount + self.tax_amount
    }
}

/// A retail invoice as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Issuer's tax number.
    pub tax_number: TaxNumber,
    /// Local wall-clock issue time.
    pub issue_date_time: IssueDateTime,
    /// Numbering scheme for `invoice_number`.
    #[serde(default)]
    pub numbering_structure: NumberingStructure,
    /// Sequential invoice number.
    pub invoice_number: InvoiceNumber,
    /// Premise the invoice was issued in.
    pub business_premise_id: BusinessPremiseId,
    /// Device the invoice was issued on.
    pub electronic_device_id: ElectronicDeviceId,
    /// Total amount of the invoice.
    pub invoice_amount: Amount,
    /// Amount actually paid.
    pub payment_amount: Amount,
    /// VAT breakdown.
    #[serde(default)]
    pub tax_breakdown: Vec<VatRow>,
    /// Tax number of the operator who issued the invoice.
    pub operator_tax_number: TaxNumber,
    /// The operator is a foreign national without a tax number.
    #[serde(default)]
    pub foreign_operator: bool,
    /// Invoice was issued offline and is submitted after the fact.
    #[serde(default)]
    pub subsequent_submit: bool,
    /// Free-form notes.
    #[serde(default)]
    pub special_notes: Option<String>,
}

impl InvoiceRecord {
    /// The frozen ZOI input for this record.
    pub fn signable_string(&self) -> SignableString {
        SignableString::from_invoice(self)
    }

    /// Sum of `taxable + tax` across all VAT rows.
    pub fn breakdown_total(&self) -> Amount {
        self.tax_breakdown
            .iter()
            .fold(Amount::ZERO, |acc, row| acc + row.gross())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// The worked example: 1000.00 net at 22% = 1220.00.
    pub fn sample_invoice() -> InvoiceRecord {
        InvoiceRecord {
            tax_number: TaxNumber::new(10489185).unwrap(),
            issue_date_time: IssueDateTime::parse_signable("01.01.2024 10:00:00").unwrap(),
            numbering_structure: NumberingStructure::B,
            invoice_number: InvoiceNumber::new(145),
            business_premise_id: BusinessPremiseId::new("BPID1").unwrap(),
            electronic_device_id: ElectronicDeviceId::new("EDID1").unwrap(),
            invoice_amount: Amount::from_cents(122000),
            payment_amount: Amount::from_cents(122000),
            tax_breakdown: vec![VatRow {
                rate: Amount::from_cents(2200),
                taxable_amount: Amount::from_cents(100000),
                tax_amount: Amount::from_cents(22000),
            }],
            operator_tax_number: TaxNumber::new(42531357).unwrap(),
            foreign_operator: false,
            subsequent_submit: false,
            special_notes: None,
        }
    }
}
