//! # Business Premise Record
//!
//! Registration data for a business premise: either an immovable premise
//! identified by its cadastral property and address, or a movable premise
//! identified only by its type.
//!
//! Field names follow the regulator's wire format directly, since this
//! record is embedded verbatim in a `BusinessPremiseRequest`.

use serde::{Deserialize, Serialize};

use crate::identity::{BusinessPremiseId, TaxNumber};
use crate::temporal::Timestamp;

/// Cadastral identification of a building section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PropertyId {
    pub cadastral_number: u32,
    pub building_number: u32,
    pub building_section_number: u32,
}

/// Postal address of an immovable premise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Address {
    pub street: String,
    pub house_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house_number_additional: Option<String>,
    pub community: String,
    pub city: String,
    pub postal_code: String,
}

/// An immovable premise (shop, office).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealEstatePremise {
    #[serde(rename = "PropertyID")]
    pub property_id: PropertyId,
    #[serde(rename = "Address")]
    pub address: Address,
}

/// Kind of movable premise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovablePremiseType {
    /// Vehicle.
    A,
    /// Object at a fixed location (market stall, kiosk).
    B,
    /// Individual electronic device used in no fixed premise.
    C,
}

/// Identity of a premise; exactly one form is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PremiseIdentifier {
    #[serde(rename = "RealEstateBP")]
    RealEstate(RealEstatePremise),
    #[serde(rename = "PremiseType")]
    Movable(MovablePremiseType),
}

/// Supplier of the cash-register software.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoftwareSupplier {
    /// Domestic supplier identified by tax number.
    TaxNumber(TaxNumber),
    /// Foreign supplier identified by name.
    NameForeign(String),
}

/// Marks a premise registration as a closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClosingTag {
    Z,
}

/// A business premise registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessPremiseRecord {
    #[serde(rename = "TaxNumber")]
    pub tax_number: TaxNumber,
    #[serde(rename = "BusinessPremiseID")]
    pub business_premise_id: BusinessPremiseId,
    #[serde(rename = "BPIdentifier")]
    pub identifier: PremiseIdentifier,
    #[serde(rename = "ValidityDate")]
    pub validity_date: Timestamp,
    #[serde(rename = "ClosingTag", default, skip_serializing_if = "Option::is_none")]
    pub closing_tag: Option<ClosingTag>,
    #[serde(rename = "SoftwareSupplier")]
    pub software_suppliers: Vec<SoftwareSupplier>,
    #[serde(rename = "SpecialNotes", default, skip_serializing_if = "Option::is_none")]
    pub special_notes: Option<String>,
}

impl BusinessPremiseRecord {
    /// Mark this registration as closing the premise.
    pub fn closed(mut self) -> Self {
        self.closing_tag = Some(ClosingTag::Z);
        self
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

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
                    street: "Tržaška cesta".into(),
                    house_number: "24".into(),
                    house_number_additional: Some("B".into()),
                    community: "Ljubljana".into(),
                    city: "Ljubljana".into(),
                    postal_code: "1000".into(),
                },
            }),
            validity_date: Timestamp::parse("2024-01-01T00:00:00Z").unwrap(),
            closing_tag: None,
            software_suppliers: vec![SoftwareSupplier::TaxNumber(
                TaxNumber::new(10489185).unwrap(),
            )],
            special_notes: None,
        }
    }
}
