//! # fiskal-core — Foundational Types for Fiscal Verification
//!
//! This crate defines the business data of a retail invoice and of a
//! business premise, the identifiers they are made of, and the single
//! path from an invoice to the bytes that are signed into its Protected
//! ID (ZOI). Every other crate in the workspace depends on `fiskal-core`;
//! it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for fiscal identifiers.** `TaxNumber`,
//!    `InvoiceNumber`, `BusinessPremiseId`, `ElectronicDeviceId`,
//!    `ProtectedId`. Validating constructors, no bare strings.
//!
//! 2. **`SignableString` newtype.** The ZOI input is only constructible
//!    from an `InvoiceRecord`, so the field order and renderings are fixed
//!    in one place.
//!
//! 3. **Decimal amounts.** `Amount` wraps `rust_decimal::Decimal` and
//!    rejects sub-cent precision instead of rounding.
//!
//! 4. **Two clocks.** `Timestamp` is UTC with a Z suffix; `IssueDateTime`
//!    is the zone-less time printed on the receipt.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `fiskal-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod amount;
pub mod canonical;
pub mod error;
pub mod identity;
pub mod invoice;
pub mod payload;
pub mod premise;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use amount::Amount;
pub use canonical::SignableString;
pub use error::{
    CanonicalizationError, CryptoError, EnvelopeVerificationError, KeyMaterialError,
    ProtocolSemanticError,
};
pub use identity::{
    BusinessPremiseId, ElectronicDeviceId, InvoiceNumber, MessageId, ProtectedId, TaxNumber,
    UniqueInvoiceId,
};
pub use invoice::{InvoiceRecord, NumberingStructure, VatRow};
pub use payload::{Header, Payload, PayloadKind};
pub use premise::{
    Address, BusinessPremiseRecord, ClosingTag, MovablePremiseType, PremiseIdentifier,
    PropertyId, RealEstatePremise, SoftwareSupplier,
};
pub use temporal::{IssueDateTime, Timestamp};
