//! # Response Interpretation
//!
//! Turns the verified claims of a regulator response into a
//! [`VerificationResult`]. Only call this on a [`VerifiedEnvelope`]; by the
//! time a response gets here the regulator has authenticated itself, so
//! every failure is a [`ProtocolSemanticError`], never a verification
//! error.
//!
//! Response shapes:
//!
//! ```json
//! {"InvoiceResponse": {"Header": {...}, "UniqueInvoiceID": "..."}}
//! {"InvoiceResponse": {"Header": {...}, "Error": {"ErrorCode": "S001", "ErrorMessage": "..."}}}
//! {"BusinessPremiseResponse": {"Header": {...}}}
//! ```

use fiskal_core::{PayloadKind, ProtocolSemanticError, UniqueInvoiceId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::verifier::VerifiedEnvelope;

/// Decoded response claims plus the assigned EOR, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationResult {
    #[serde(skip)]
    pub kind: PayloadKind,
    /// The full verified claims.
    pub claims: Value,
    /// The unique invoice id (EOR); always present for invoice responses.
    pub unique_invoice_id: Option<UniqueInvoiceId>,
}

#[derive(Debug, Deserialize)]
struct RegulatorError {
    #[serde(rename = "ErrorCode", default)]
    code: Value,
    #[serde(rename = "ErrorMessage", default)]
    message: Option<String>,
}

/// Interpret the verified response to a request of `kind`.
pub fn interpret_response(
    kind: PayloadKind,
    envelope: VerifiedEnvelope,
) -> Result<VerificationResult, ProtocolSemanticError> {
    let claim = kind.response_claim();
    let body = envelope.claims.get(claim).ok_or_else(|| {
        ProtocolSemanticError::UnexpectedResponse(format!("response has no {claim} claim"))
    })?;
    if !body.is_object() {
        return Err(ProtocolSemanticError::UnexpectedResponse(format!(
            "{claim} is not an object"
        )));
    }

    if let Some(error) = body.get("Error") {
        let error: RegulatorError = serde_json::from_value(error.clone()).map_err(|e| {
            ProtocolSemanticError::UnexpectedResponse(format!("malformed Error object: {e}"))
        })?;
        let code = match error.code {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        };
        return Err(ProtocolSemanticError::Rejected {
            code,
            message: error.message.unwrap_or_default(),
        });
    }

    let unique_invoice_id = match kind {
        PayloadKind::Invoice => {
            let eor = body
                .get("UniqueInvoiceID")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .ok_or(ProtocolSemanticError::MissingUniqueInvoiceId)?;
            Some(UniqueInvoiceId(eor.to_string()))
        }
        PayloadKind::BusinessPremise => None,
    };

    Ok(VerificationResult {
        kind,
        claims: envelope.claims,
        unique_invoice_id,
    })
}
