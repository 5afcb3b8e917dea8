//! # Payload Builder
//!
//! Assembles the two mutually exclusive request shapes of the protocol:
//!
//! ```json
//! {"InvoiceRequest": {"Header": {...}, "Invoice": {...}}}
//! {"BusinessPremiseRequest": {"Header": {...}, "BusinessPremise": {...}}}
//! ```
//!
//! Every payload is created with a fresh [`Header`]: a new UUID message id
//! and the current UTC time. A retry of the same invoice is a new message,
//! so [`Payload::with_fresh_header`] re-stamps an existing payload rather
//! than reusing its id.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::amount::Amount;
use crate::error::CanonicalizationError;
use crate::identity::{
    BusinessPremiseId, ElectronicDeviceId, InvoiceNumber, MessageId, ProtectedId, TaxNumber,
};
use crate::invoice::{InvoiceRecord, NumberingStructure, VatRow};
use crate::premise::BusinessPremiseRecord;
use crate::temporal::{IssueDateTime, Timestamp};

/// Message header carried by every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    #[serde(rename = "MessageID")]
    pub message_id: MessageId,
    #[serde(rename = "DateTime")]
    pub date_time: Timestamp,
}

impl Header {
    /// A new message id stamped with the current UTC time.
    pub fn fresh() -> Self {
        Self {
            message_id: MessageId::new(),
            date_time: Timestamp::now(),
        }
    }
}

/// Invoice identification triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceIdentifier {
    #[serde(rename = "BusinessPremiseID")]
    pub business_premise_id: BusinessPremiseId,
    #[serde(rename = "ElectronicDeviceID")]
    pub electronic_device_id: ElectronicDeviceId,
    #[serde(rename = "InvoiceNumber")]
    pub invoice_number: InvoiceNumber,
}

/// Taxes attributed to one seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxesPerSeller {
    #[serde(rename = "VAT")]
    pub vat: Vec<VatRow>,
}

/// Wire form of an invoice, including its Protected ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvoiceBody {
    pub tax_number: TaxNumber,
    pub issue_date_time: IssueDateTime,
    pub numbering_structure: NumberingStructure,
    pub invoice_identifier: InvoiceIdentifier,
    pub invoice_amount: Amount,
    pub payment_amount: Amount,
    pub taxes_per_seller: Vec<TaxesPerSeller>,
    pub operator_tax_number: TaxNumber,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub foreign_operator: bool,
    #[serde(rename = "ProtectedID")]
    pub protected_id: ProtectedId,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub subsequent_submit: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_notes: Option<String>,
}

impl InvoiceBody {
    /// Project a record and its ZOI into wire form.
    pub fn from_record(record: &InvoiceRecord, protected_id: &ProtectedId) -> Self {
        Self {
            tax_number: record.tax_number,
            issue_date_time: record.issue_date_time,
            numbering_structure: record.numbering_structure,
            invoice_identifier: InvoiceIdentifier {
                business_premise_id: record.business_premise_id.clone(),
                electronic_device_id: record.electronic_device_id.clone(),
                invoice_number: record.invoice_number,
            },
            invoice_amount: record.invoice_amount,
            payment_amount: record.payment_amount,
            taxes_per_seller: vec![TaxesPerSeller {
                vat: record.tax_breakdown.clone(),
            }],
            operator_tax_number: record.operator_tax_number,
            foreign_operator: record.foreign_operator,
            protected_id: protected_id.clone(),
            subsequent_submit: record.subsequent_submit,
            special_notes: record.special_notes.clone(),
        }
    }
}

/// Invoice submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRequest {
    #[serde(rename = "Header")]
    pub header: Header,
    #[serde(rename = "Invoice")]
    pub invoice: InvoiceBody,
}

/// Business premise registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessPremiseRequest {
    #[serde(rename = "Header")]
    pub header: Header,
    #[serde(rename = "BusinessPremise")]
    pub business_premise: BusinessPremiseRecord,
}

/// Which request shape a payload is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    Invoice,
    BusinessPremise,
}

impl PayloadKind {
    /// Top-level claim of the request.
    pub fn request_claim(&self) -> &'static str {
        match self {
            Self::Invoice => "InvoiceRequest",
            Self::BusinessPremise => "BusinessPremiseRequest",
        }
    }

    /// Top-level claim the regulator answers with.
    pub fn response_claim(&self) -> &'static str {
        match self {
            Self::Invoice => "InvoiceResponse",
            Self::BusinessPremise => "BusinessPremiseResponse",
        }
    }
}

impl std::fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.request_claim())
    }
}

/// One submission's request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    InvoiceRequest(InvoiceRequest),
    BusinessPremiseRequest(BusinessPremiseRequest),
}

impl Payload {
    /// Build an invoice submission with a fresh header.
    pub fn invoice(record: &InvoiceRecord, protected_id: &ProtectedId) -> Self {
        Self::InvoiceRequest(InvoiceRequest {
            header: Header::fresh(),
            invoice: InvoiceBody::from_record(record, protected_id),
        })
    }

    /// Build a premise registration with a fresh header.
    pub fn business_premise(record: BusinessPremiseRecord) -> Self {
        Self::BusinessPremiseRequest(BusinessPremiseRequest {
            header: Header::fresh(),
            business_premise: record,
        })
    }

    /// The same body under a new message id and time.
    pub fn with_fresh_header(&self) -> Self {
        let mut next = self.clone();
        *next.header_mut() = Header::fresh();
        next
    }

    /// Which request shape this is.
    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::InvoiceRequest(_) => PayloadKind::Invoice,
            Self::BusinessPremiseRequest(_) => PayloadKind::BusinessPremise,
        }
    }

    /// The message header.
    pub fn header(&self) -> &Header {
        match self {
            Self::InvoiceRequest(r) => &r.header,
            Self::BusinessPremiseRequest(r) => &r.header,
        }
    }

    fn header_mut(&mut self) -> &mut Header {
        match self {
            Self::InvoiceRequest(r) => &mut r.header,
            Self::BusinessPremiseRequest(r) => &mut r.header,
        }
    }

    /// Shorthand for `header().message_id`.
    pub fn message_id(&self) -> MessageId {
        self.header().message_id
    }

    /// The payload as a JSON value, for validation and signing.
    pub fn to_value(&self) -> Result<Value, CanonicalizationError> {
        Ok(serde_json::to_value(self)?)
    }
}
