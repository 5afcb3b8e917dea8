//! Shared fixtures for the client contract tests.
//!
//! The mock regulator signs its responses with `testdata/regulator.p12`;
//! clients trust `testdata/regulator.pem`.

#![allow(dead_code)]

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use fiskal_client::{ClientConfig, FiscalClient, Transport};
use fiskal_core::{
    Address, Amount, BusinessPremiseId, BusinessPremiseRecord, ElectronicDeviceId, InvoiceNumber,
    InvoiceRecord, IssueDateTime, NumberingStructure, PremiseIdentifier, PropertyId,
    RealEstatePremise, SoftwareSupplier, TaxNumber, Timestamp, VatRow,
};
use fiskal_crypto::{Identity, PublicCertificate};
use fiskal_envelope::sign_claims;
use serde_json::{json, Value};
use wiremock::{MockServer, Request};

const CLIENT_P12: &[u8] = include_bytes!("../../../../testdata/client.p12");
const REGULATOR_P12: &[u8] = include_bytes!("../../../../testdata/regulator.p12");
const ROGUE_P12: &[u8] = include_bytes!("../../../../testdata/rogue.p12");
const REGULATOR_PEM: &str = include_str!("../../../../testdata/regulator.pem");
pub const CA_PEM: &str = include_str!("../../../../testdata/ca.pem");

/// ZOI of [`sample_invoice`] under the client key.
pub const SAMPLE_ZOI: &str = "1314144c07e572239bbb0e5e8ec103dc";
/// QR code of [`sample_invoice`].
pub const SAMPLE_QR: &str = "025359589529060300343318914103555195868240101100000104891858";

pub fn client_identity() -> Arc<Identity> {
    Arc::new(Identity::from_pkcs12(CLIENT_P12, "test-pass").unwrap())
}

pub fn regulator_identity() -> Identity {
    Identity::from_pkcs12(REGULATOR_P12, "regulator-pass").unwrap()
}

pub fn rogue_identity() -> Identity {
    Identity::from_pkcs12(ROGUE_P12, "rogue-pass").unwrap()
}

pub fn regulator_certificate() -> PublicCertificate {
    PublicCertificate::from_pem(REGULATOR_PEM).unwrap()
}

pub fn test_client(mock_server: &MockServer) -> FiscalClient {
    let config = ClientConfig::local_mock(&mock_server.uri()).unwrap();
    let transport = Transport::new(config, None).unwrap();
    FiscalClient::new(transport, client_identity(), &regulator_certificate()).unwrap()
}

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

pub fn invoice_numbered(n: u64) -> InvoiceRecord {
    InvoiceRecord {
        invoice_number: InvoiceNumber::new(n),
        ..sample_invoice()
    }
}

pub fn sample_premise() -> BusinessPremiseRecord {
    BusinessPremiseRecord {
        tax_number: TaxNumber::new(10489185).unwrap(),
        business_premise_id: BusinessPremiseId::new("BPID1").unwrap(),
        identifier: PremiseIdentifier::RealEstate(RealEstatePremise {
            property_id: PropertyId {
                cadastral_number: 365,
                building_number: 12,
                building_section_number: 3,
            },
            address: Address {
                street: "Trzaska cesta".into(),
                house_number: "24".into(),
                house_number_additional: None,
                community: "Ljubljana".into(),
                city: "Ljubljana".into(),
                postal_code: "1000".into(),
            },
        }),
        validity_date: Timestamp::parse("2024-01-01T00:00:00Z").unwrap(),
        closing_tag: None,
        software_suppliers: vec![SoftwareSupplier::TaxNumber(TaxNumber::new(10489185).unwrap())],
        special_notes: None,
    }
}

/// Wire body of a response signed by `identity`.
pub fn token_body(claims: &Value, identity: &Identity) -> Value {
    json!({ "token": sign_claims(claims, identity).unwrap().into_string() })
}

/// Wire body of a regulator-signed response.
pub fn regulator_response(claims: Value) -> Value {
    token_body(&claims, &regulator_identity())
}

pub fn invoice_accepted(eor: &str) -> Value {
    regulator_response(json!({
        "InvoiceResponse": {
            "Header": {"MessageID": "8f9e8b2c-1f6e-4d1a-9b2a-3c4d5e6f7a8b", "DateTime": "2024-01-01T10:00:01Z"},
            "UniqueInvoiceID": eor
        }
    }))
}

/// Claims of the token a client sent in `request`, without verifying it.
pub fn sent_claims(request: &Request) -> Value {
    let body: Value = serde_json::from_slice(&request.body).unwrap();
    let token = body["token"].as_str().unwrap();
    let payload = token.split('.').nth(1).unwrap();
    serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap()
}
