//! # fiskal-schema — Payload Validation
//!
//! Validates `InvoiceRequest` and `BusinessPremiseRequest` payloads before
//! anything is signed or sent. The bundled schema lives in
//! `schemas/fiscal-verification.schema.json`; callers may also supply
//! their own already-loaded schema document.
//!
//! ## Crate Policy
//!
//! - Depends only on `fiskal-core` internally.
//! - Validation is pure: no I/O beyond explicit schema-file loading.
//! - Invalid payloads are rejected with structured violations including
//!   instance path, schema path and message.

pub mod validate;

pub use validate::{
    PayloadValidator, SchemaValidationError, ValidatedPayload, ValidationViolations, Violation,
    BUNDLED_SCHEMA_NAME,
};
