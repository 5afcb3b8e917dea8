//! # Payload Validation
//!
//! Validates assembled request payloads against the fiscal-verification
//! JSON Schema (Draft 2020-12), then applies the invoice-totals rule that
//! JSON Schema cannot express.
//!
//! ## Security Invariant
//!
//! Validation is the gate in front of signing and transport. A payload
//! with any violation is rejected with the full list of violations, each
//! carrying the instance path, the schema path and a message. The caller
//! must not build an envelope from a rejected payload.
//!
//! ## Invoice Totals Rule
//!
//! When an invoice carries at least one VAT row, `InvoiceAmount` must equal
//! the sum of `TaxableAmount + TaxAmount` over every row of every seller.
//! Amounts are compared as two-decimal `Amount`s, not floats.

use std::fmt;
use std::path::Path;

use fiskal_core::{Amount, Payload};
use jsonschema::{Draft, Validator};
use serde_json::Value;
use thiserror::Error;

/// Name of the bundled schema.
pub const BUNDLED_SCHEMA_NAME: &str = "fiscal-verification.schema.json";

const BUNDLED_SCHEMA: &str = include_str!("../schemas/fiscal-verification.schema.json");

/// Schema path reported for invoice-totals violations.
pub const TOTALS_RULE_PATH: &str = "#/x-rules/invoice-totals";

/// Error during schema validation.
#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// The document did not conform to the schema.
    #[error("validation failed against schema '{schema_name}':\n{violations}")]
    ValidationFailed {
        /// Name of the schema that was validated against.
        schema_name: String,
        /// Structured list of individual violations.
        violations: ValidationViolations,
    },

    /// The schema document could not be read or parsed.
    #[error("schema load error for '{schema_name}': {reason}")]
    SchemaLoadError {
        /// Schema filename or identifier.
        schema_name: String,
        /// Reason the schema could not be loaded.
        reason: String,
    },

    /// The compiled validator could not be built (e.g., invalid schema).
    #[error("validator build error for schema '{schema_name}': {reason}")]
    ValidatorBuildError {
        /// Schema filename or identifier.
        schema_name: String,
        /// Reason the validator could not be built.
        reason: String,
    },

    /// The payload could not be converted to JSON for validation.
    #[error("payload serialization failed: {0}")]
    Serialization(String),
}

impl SchemaValidationError {
    /// The violations, if this is a validation failure.
    pub fn violations(&self) -> Option<&ValidationViolations> {
        match self {
            Self::ValidationFailed { violations, .. } => Some(violations),
            _ => None,
        }
    }
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the instance.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Collection of validation violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// A compiled validator for request payloads.
///
/// `Send + Sync`; compile once and share across submissions.
pub struct PayloadValidator {
    schema_name: String,
    validator: Validator,
}

impl PayloadValidator {
    /// The schema shipped with this crate.
    pub fn bundled() -> Result<Self, SchemaValidationError> {
        let schema: Value = serde_json::from_str(BUNDLED_SCHEMA).map_err(|e| {
            SchemaValidationError::SchemaLoadError {
                schema_name: BUNDLED_SCHEMA_NAME.to_string(),
                reason: format!("invalid JSON: {e}"),
            }
        })?;
        Self::from_schema(BUNDLED_SCHEMA_NAME, &schema)
    }

    /// Compile an already-loaded schema document.
    pub fn from_schema(
        schema_name: impl Into<String>,
        schema: &Value,
    ) -> Result<Self, SchemaValidationError> {
        let schema_name = schema_name.into();
        let mut opts = jsonschema::options();
        opts.with_draft(Draft::Draft202012);
        let validator = opts
            .build(schema)
            .map_err(|e| SchemaValidationError::ValidatorBuildError {
                schema_name: schema_name.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            schema_name,
            validator,
        })
    }

    /// Load and compile a schema file.
    pub fn from_file(path: &Path) -> Result<Self, SchemaValidationError> {
        let schema_name = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SchemaValidationError::SchemaLoadError {
                schema_name: schema_name.clone(),
                reason: format!("cannot read file: {e}"),
            }
        })?;
        let schema: Value = serde_json::from_str(&content).map_err(|e| {
            SchemaValidationError::SchemaLoadError {
                schema_name: schema_name.clone(),
                reason: format!("invalid JSON: {e}"),
            }
        })?;
        Self::from_schema(schema_name, &schema)
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    /// Validate a JSON document.
    pub fn validate_document(&self, instance: &Value) -> Result<(), SchemaValidationError> {
        let mut errors: Vec<Violation> = self
            .validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        // Totals are only meaningful once the structure is sound.
        if errors.is_empty() {
            errors.extend(check_invoice_totals(instance));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            tracing::debug!(
                schema = %self.schema_name,
                violations = errors.len(),
                "payload rejected by validator"
            );
            Err(SchemaValidationError::ValidationFailed {
                schema_name: self.schema_name.clone(),
                violations: ValidationViolations { violations: errors },
            })
        }
    }

    /// Validate an assembled payload.
    ///
    /// On success the payload and the exact JSON that was validated are
    /// returned together; that JSON is what the envelope signs.
    pub fn validate_payload(
        &self,
        payload: &Payload,
    ) -> Result<ValidatedPayload, SchemaValidationError> {
        let value = payload
            .to_value()
            .map_err(|e| SchemaValidationError::Serialization(e.to_string()))?;
        self.validate_document(&value)?;
        Ok(ValidatedPayload {
            payload: payload.clone(),
            value,
        })
    }
}

/// A payload that passed validation.
///
/// Only [`PayloadValidator::validate_payload`] constructs this type, so
/// anything that accepts a `ValidatedPayload` cannot be handed an
/// unvalidated one.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPayload {
    payload: Payload,
    value: Value,
}

impl ValidatedPayload {
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The validated JSON document.
    pub fn as_value(&self) -> &Value {
        &self.value
    }
}

impl fmt::Debug for PayloadValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayloadValidator")
            .field("schema_name", &self.schema_name)
            .finish_non_exhaustive()
    }
}

fn check_invoice_totals(instance: &Value) -> Option<Violation> {
    let invoice = instance.pointer("/InvoiceRequest/Invoice")?;
    let rows: Vec<&Value> = invoice
        .get("TaxesPerSeller")?
        .as_array()?
        .iter()
        .filter_map(|seller| seller.get("VAT").and_then(Value::as_array))
        .flatten()
        .collect();
    if rows.is_empty() {
        return None;
    }

    let amount = |v: Option<&Value>| v.and_then(Value::as_f64).and_then(|f| Amount::from_f64(f).ok());
    let declared = amount(invoice.get("InvoiceAmount"));
    let gross: Option<Vec<Amount>> = rows
        .iter()
        .flat_map(|row| [row.get("TaxableAmount"), row.get("TaxAmount")])
        .map(amount)
        .collect();

    let (declared, gross) = match (declared, gross) {
        (Some(d), Some(g)) => (d, Amount::sum(&g)),
        _ => {
            return Some(Violation {
                instance_path: "/InvoiceRequest/Invoice".to_string(),
                schema_path: TOTALS_RULE_PATH.to_string(),
                message: "amounts must have at most two decimal digits".to_string(),
            })
        }
    };
    (declared != gross).then(|| Violation {
        instance_path: "/InvoiceRequest/Invoice/InvoiceAmount".to_string(),
        schema_path: TOTALS_RULE_PATH.to_string(),
        message: format!(
            "InvoiceAmount {declared} does not equal the VAT breakdown total {gross}"
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fiskal_core::{
        Address, BusinessPremiseId, BusinessPremiseRecord, ElectronicDeviceId, InvoiceNumber,
        InvoiceRecord, IssueDateTime, MovablePremiseType, NumberingStructure, PremiseIdentifier,
        PropertyId, ProtectedId, RealEstatePremise, SoftwareSupplier, TaxNumber, Timestamp, VatRow,
    };
    use serde_json::json;

    fn invoice() -> InvoiceRecord {
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

    fn premise() -> BusinessPremiseRecord {
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
                    street: "Trg republike".into(),
                    house_number: "3".into(),
                    house_number_additional: None,
                    community: "Ljubljana".into(),
                    city: "Ljubljana".into(),
                    postal_code: "1000".into(),
                },
            }),
            validity_date: Timestamp::parse("2024-01-01T00:00:00Z").unwrap(),
            closing_tag: None,
            software_suppliers: vec![SoftwareSupplier::TaxNumber(TaxNumber::new(24564444).unwrap())],
            special_notes: None,
        }
    }

    fn zoi() -> ProtectedId {
        ProtectedId::parse("1314144c07e572239bbb0e5e8ec103dc").unwrap()
    }

    fn validator() -> PayloadValidator {
        PayloadValidator::bundled().unwrap()
    }

    #[test]
    fn bundled_schema_compiles() {
        assert_eq!(validator().schema_name(), BUNDLED_SCHEMA_NAME);
    }

    #[test]
    fn valid_invoice_request_passes() {
        let payload = Payload::invoice(&invoice(), &zoi());
        let validated = validator().validate_payload(&payload).unwrap();
        assert_eq!(validated.payload(), &payload);
        assert_eq!(validated.as_value(), &payload.to_value().unwrap());
    }

    #[test]
    fn valid_premise_requests_pass() {
        validator()
            .validate_payload(&Payload::business_premise(premise()))
            .unwrap();

        let mut movable = premise();
        movable.identifier = PremiseIdentifier::Movable(MovablePremiseType::C);
        movable.software_suppliers = vec![SoftwareSupplier::NameForeign("Kassen GmbH".into())];
        validator()
            .validate_payload(&Payload::business_premise(movable.closed()))
            .unwrap();
    }

    #[test]
    fn missing_required_field_is_reported() {
        let mut doc = Payload::invoice(&invoice(), &zoi()).to_value().unwrap();
        doc["InvoiceRequest"]["Invoice"]
            .as_object_mut()
            .unwrap()
            .remove("ProtectedID");
        let err = validator().validate_document(&doc).unwrap_err();
        let violations = err.violations().unwrap();
        assert!(!violations.is_empty());
        assert!(violations.to_string().contains("ProtectedID"));
    }

    #[test]
    fn both_request_kinds_at_once_is_rejected() {
        let inv = Payload::invoice(&invoice(), &zoi()).to_value().unwrap();
        let bp = Payload::business_premise(premise()).to_value().unwrap();
        let doc = json!({
            "InvoiceRequest": inv["InvoiceRequest"],
            "BusinessPremiseRequest": bp["BusinessPremiseRequest"],
        });
        assert!(validator().validate_document(&doc).is_err());
    }

    #[test]
    fn wrong_types_are_reported_with_paths() {
        let mut doc = Payload::invoice(&invoice(), &zoi()).to_value().unwrap();
        doc["InvoiceRequest"]["Invoice"]["TaxNumber"] = json!("10489185");
        doc["InvoiceRequest"]["Header"]["DateTime"] = json!("2024-01-01T10:00:00+01:00");
        let err = validator().validate_document(&doc).unwrap_err();
        assert!(err.violations().unwrap().len() >= 1);
    }

    #[test]
    fn totals_mismatch_is_a_violation() {
        let mut record = invoice();
        record.invoice_amount = Amount::from_cents(122001);
        let err = validator()
            .validate_payload(&Payload::invoice(&record, &zoi()))
            .unwrap_err();
        let v = &err.violations().unwrap().violations()[0];
        assert_eq!(v.schema_path, TOTALS_RULE_PATH);
        assert_eq!(v.instance_path, "/InvoiceRequest/Invoice/InvoiceAmount");
    }

    #[test]
    fn totals_sum_across_rows() {
        let mut record = invoice();
        record.tax_breakdown.push(VatRow {
            rate: Amount::from_cents(950),
            taxable_amount: Amount::from_cents(10000),
            tax_amount: Amount::from_cents(950),
        });
        record.invoice_amount = Amount::from_cents(132950);
        record.payment_amount = record.invoice_amount;
        validator()
            .validate_payload(&Payload::invoice(&record, &zoi()))
            .unwrap();
    }

    #[test]
    fn empty_breakdown_skips_totals_rule() {
        let mut record = invoice();
        record.tax_breakdown.clear();
        record.invoice_amount = Amount::from_cents(500);
        validator()
            .validate_payload(&Payload::invoice(&record, &zoi()))
            .unwrap();
    }

    #[test]
    fn external_schema_document() {
        let schema = json!({
            "type": "object",
            "required": ["InvoiceRequest"]
        });
        let v = PayloadValidator::from_schema("invoice-only", &schema).unwrap();
        assert!(v
            .validate_payload(&Payload::business_premise(premise()))
            .is_err());
    }

    #[test]
    fn invalid_schema_fails_to_build() {
        let schema = json!({ "type": 12 });
        assert!(matches!(
            PayloadValidator::from_schema("broken", &schema),
            Err(SchemaValidationError::ValidatorBuildError { .. })
        ));
    }

    #[test]
    fn missing_schema_file() {
        assert!(matches!(
            PayloadValidator::from_file(Path::new("/nonexistent/schema.json")),
            Err(SchemaValidationError::SchemaLoadError { .. })
        ));
    }
}
