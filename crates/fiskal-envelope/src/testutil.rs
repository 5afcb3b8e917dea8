use fiskal_core::{
    Amount, BusinessPremiseId, ElectronicDeviceId, InvoiceNumber, InvoiceRecord, IssueDateTime,
    NumberingStructure, Payload, ProtectedId, TaxNumber, VatRow,
};
use fiskal_crypto::{Identity, PublicCertificate};
use fiskal_schema::{PayloadValidator, ValidatedPayload};

const CLIENT_P12: &[u8] = include_bytes!("../../../testdata/client.p12");
const ROGUE_P12: &[u8] = include_bytes!("../../../testdata/rogue.p12");
const REGULATOR_PEM: &str = include_str!("../../../testdata/regulator.pem");

pub fn client_identity() -> Identity {
    Identity::from_pkcs12(CLIENT_P12, "test-pass").unwrap()
}

pub fn rogue_identity() -> Identity {
    Identity::from_pkcs12(ROGUE_P12, "rogue-pass").unwrap()
}

pub fn regulator_certificate() -> PublicCertificate {
    PublicCertificate::from_pem(REGULATOR_PEM).unwrap()
}

pub fn validated_invoice() -> ValidatedPayload {
    let record = InvoiceRecord {
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
    };
    let zoi = ProtectedId::parse("1314144c07e572239bbb0e5e8ec103dc").unwrap();
    PayloadValidator::bundled()
        .unwrap()
        .validate_payload(&Payload::invoice(&record, &zoi))
        .unwrap()
}
