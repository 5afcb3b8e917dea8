//! # Distinguished Name Rendering
//!
//! Renders an X.509 `Name` as comma-joined `key=value` pairs in the order
//! the certificate encodes them. This is the form carried in the
//! `issuer_name` and `subject_name` envelope header claims, so it must not
//! be reordered (RFC 4514 reverses the order; this does not).
//!
//! Attribute keys use the short symbolic name where one is customary
//! (`CN`, `O`, `C`, ...) and the long name otherwise (`serialNumber`).
//! Unknown attribute types fall back to their dotted OID.

use der::asn1::Any;
use der::{Tag, Tagged};
use fiskal_core::KeyMaterialError;
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::Name;

/// OID, short name, long name.
const ATTRIBUTE_NAMES: &[(&str, Option<&str>, &str)] = &[
    ("2.5.4.3", Some("CN"), "commonName"),
    ("2.5.4.4", None, "surname"),
    ("2.5.4.5", None, "serialNumber"),
    ("2.5.4.6", Some("C"), "countryName"),
    ("2.5.4.7", Some("L"), "localityName"),
    ("2.5.4.8", Some("ST"), "stateOrProvinceName"),
    ("2.5.4.9", None, "streetAddress"),
    ("2.5.4.10", Some("O"), "organizationName"),
    ("2.5.4.11", Some("OU"), "organizationalUnitName"),
    ("2.5.4.12", None, "title"),
    ("2.5.4.13", None, "description"),
    ("2.5.4.17", None, "postalCode"),
    ("2.5.4.42", None, "givenName"),
    ("2.5.4.97", None, "organizationIdentifier"),
    ("1.2.840.113549.1.9.1", Some("E"), "emailAddress"),
    ("0.9.2342.19200300.100.1.25", Some("DC"), "domainComponent"),
];

/// The key under which an attribute type is rendered.
pub fn attribute_key(oid: &str) -> String {
    ATTRIBUTE_NAMES
        .iter()
        .find(|(o, _, _)| *o == oid)
        .map(|(_, short, long)| short.unwrap_or(long).to_string())
        .unwrap_or_else(|| oid.to_string())
}

/// Render `name` as `k=v,k=v,...` in encoding order.
pub fn format_name(name: &Name) -> Result<String, KeyMaterialError> {
    let pairs = name
        .0
        .iter()
        .flat_map(|rdn| rdn.0.iter())
        .map(format_attribute)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(pairs.join(","))
}

fn format_attribute(atv: &AttributeTypeAndValue) -> Result<String, KeyMaterialError> {
    let key = attribute_key(&atv.oid.to_string());
    let value = attribute_value(&atv.value)?;
    Ok(format!("{key}={value}"))
}

fn attribute_value(any: &Any) -> Result<String, KeyMaterialError> {
    let bytes = any.value();
    match any.tag() {
        Tag::Utf8String
        | Tag::PrintableString
        | Tag::Ia5String
        | Tag::VisibleString
        | Tag::TeletexString
        | Tag::NumericString => String::from_utf8(bytes.to_vec())
            .map_err(|e| KeyMaterialError::Certificate(format!("attribute value: {e}"))),
        Tag::BmpString => decode_bmp(bytes),
        other => Err(KeyMaterialError::Certificate(format!(
            "unsupported attribute value type {other}"
        ))),
    }
}

fn decode_bmp(bytes: &[u8]) -> Result<String, KeyMaterialError> {
    if bytes.len() % 2 != 0 {
        return Err(KeyMaterialError::Certificate(
            "BMPString has odd length".to_string(),
        ));
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units)
        .map_err(|e| KeyMaterialError::Certificate(format!("BMPString: {e}")))
}
