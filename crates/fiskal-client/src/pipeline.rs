//! # Submission Pipeline
//!
//! One submission runs these stages in order, each failing fast:
//!
//! 1. receipt codes (ZOI, QR) from the invoice record and signing key
//! 2. payload with a fresh header
//! 3. schema validation
//! 4. envelope signing
//! 5. POST over mutual TLS
//! 6. response verification against the regulator's certificate
//! 7. response interpretation (EOR)
//!
//! Stages 2 to 7 repeat under the [`RetryPolicy`] when the transport fails
//! in a retryable way; each retry carries a new `MessageID`.
//!
//! ## Security Invariant
//!
//! A payload that fails validation is never signed and never sent. The
//! envelope builder only accepts a
//! [`ValidatedPayload`](fiskal_schema::ValidatedPayload), so there is no
//! path around stage 3.

use std::sync::Arc;

use fiskal_core::{
    BusinessPremiseRecord, InvoiceRecord, MessageId, Payload, ProtectedId, ProtocolSemanticError,
    UniqueInvoiceId,
};
use fiskal_crypto::{protected_id, Identity, PublicCertificate, QrCode, SigningKey};
use fiskal_envelope::{build_envelope, interpret_response, EnvelopeVerifier, VerificationResult};
use fiskal_schema::PayloadValidator;

use crate::config::{ClientConfig, TlsMaterial};
use crate::error::FiskalError;
use crate::retry::RetryPolicy;
use crate::transport::Transport;

/// The printable codes of one invoice.
///
/// Computed before anything touches the network and kept regardless of how
/// the submission ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptCodes {
    pub zoi: ProtectedId,
    pub qr: QrCode,
}

impl ReceiptCodes {
    pub fn compute(record: &InvoiceRecord, key: &SigningKey) -> Result<Self, FiskalError> {
        let zoi = protected_id(record, key)?;
        let qr = QrCode::generate(&zoi, &record.issue_date_time, record.tax_number);
        Ok(Self { zoi, qr })
    }
}

/// A submission the regulator accepted and acknowledged with an EOR.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceOutcome {
    pub codes: ReceiptCodes,
    pub unique_invoice_id: UniqueInvoiceId,
    /// Message id of the attempt that got the accepted response.
    pub message_id: MessageId,
    pub result: VerificationResult,
}

/// A failed invoice submission, with the receipt codes if they were computed.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct SubmissionFailure {
    pub codes: Option<ReceiptCodes>,
    #[source]
    pub error: FiskalError,
}

impl SubmissionFailure {
    pub(crate) fn new(codes: Option<ReceiptCodes>, error: FiskalError) -> Self {
        Self { codes, error }
    }
}

/// Submits invoices and premise registrations for one signing identity.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
#[derive(Debug)]
pub struct FiscalClient {
    identity: Arc<Identity>,
    validator: Arc<PayloadValidator>,
    verifier: EnvelopeVerifier,
    transport: Transport,
    retry: RetryPolicy,
}

impl FiscalClient {
    /// Client over an existing transport, validating against the bundled
    /// schema and trusting responses signed by `trust_anchor`.
    pub fn new(
        transport: Transport,
        identity: Arc<Identity>,
        trust_anchor: &PublicCertificate,
    ) -> Result<Self, FiskalError> {
        let retry = RetryPolicy::from_config(transport.config());
        Ok(Self {
            identity,
            validator: Arc::new(PayloadValidator::bundled()?),
            verifier: EnvelopeVerifier::new(trust_anchor)?,
            transport,
            retry,
        })
    }

    /// Mutual-TLS client: the TLS identity comes from `identity`, the server
    /// must chain to `server_ca`.
    pub fn connect(
        config: ClientConfig,
        identity: Arc<Identity>,
        server_ca: &PublicCertificate,
        trust_anchor: &PublicCertificate,
    ) -> Result<Self, FiskalError> {
        let tls = TlsMaterial::new(&identity, server_ca)?;
        let transport = Transport::new(config, Some(&tls))?;
        Self::new(transport, identity, trust_anchor)
    }

    /// Validate against a different schema.
    pub fn with_validator(mut self, validator: Arc<PayloadValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn config(&self) -> &ClientConfig {
        self.transport.config()
    }

    /// ZOI and QR for `record`. Needs no network.
    pub fn receipt_codes(&self, record: &InvoiceRecord) -> Result<ReceiptCodes, FiskalError> {
        ReceiptCodes::compute(record, self.identity.signing_key())
    }

    /// Full pipeline for one invoice.
    pub async fn submit_invoice(
        &self,
        record: &InvoiceRecord,
    ) -> Result<InvoiceOutcome, SubmissionFailure> {
        let codes = self
            .receipt_codes(record)
            .map_err(|e| SubmissionFailure::new(None, e))?;
        self.transmit_invoice(record, &codes)
            .await
            .map_err(|e| SubmissionFailure::new(Some(codes), e))
    }

    /// Stages 2 to 7 for an invoice whose codes are already known.
    pub async fn transmit_invoice(
        &self,
        record: &InvoiceRecord,
        codes: &ReceiptCodes,
    ) -> Result<InvoiceOutcome, FiskalError> {
        let payload = Payload::invoice(record, &codes.zoi);
        let (message_id, result) = self.submit_payload(payload).await?;
        let unique_invoice_id = result
            .unique_invoice_id
            .clone()
            .ok_or(ProtocolSemanticError::MissingUniqueInvoiceId)?;
        tracing::info!(
            zoi = %codes.zoi,
            eor = %unique_invoice_id,
            %message_id,
            "invoice accepted"
        );
        Ok(InvoiceOutcome {
            codes: codes.clone(),
            unique_invoice_id,
            message_id,
            result,
        })
    }

    /// Register or close a business premise.
    pub async fn register_premise(
        &self,
        record: BusinessPremiseRecord,
    ) -> Result<VerificationResult, FiskalError> {
        let premise_id = record.business_premise_id.clone();
        let (message_id, result) = self.submit_payload(Payload::business_premise(record)).await?;
        tracing::info!(premise = %premise_id, %message_id, "business premise registered");
        Ok(result)
    }

    /// Validate, sign, send, verify and interpret `payload`, retrying
    /// transport failures under a fresh header.
    pub async fn submit_payload(
        &self,
        payload: Payload,
    ) -> Result<(MessageId, VerificationResult), FiskalError> {
        self.retry
            .run(|attempt| {
                let payload = if attempt == 0 {
                    payload.clone()
                } else {
                    payload.with_fresh_header()
                };
                async move { self.exchange(payload, attempt).await }
            })
            .await
    }

    async fn exchange(
        &self,
        payload: Payload,
        attempt: u32,
    ) -> Result<(MessageId, VerificationResult), FiskalError> {
        let kind = payload.kind();
        let message_id = payload.message_id();

        let validated = self.validator.validate_payload(&payload)?;
        let envelope = build_envelope(&validated, &self.identity)?;

        tracing::info!(%kind, %message_id, attempt, "submitting");
        let token = self.transport.submit(kind, &envelope).await?;

        let verified = self.verifier.verify(&token)?;
        let result = interpret_response(kind, verified)?;
        Ok((message_id, result))
    }

    /// Check connectivity: the service must return `text` unchanged.
    pub async fn echo(&self, text: &str) -> Result<String, FiskalError> {
        let received = self.transport.echo(text).await?;
        if received != text {
            return Err(ProtocolSemanticError::EchoMismatch {
                sent: text.to_string(),
                received,
            }
            .into());
        }
        Ok(received)
    }
}
