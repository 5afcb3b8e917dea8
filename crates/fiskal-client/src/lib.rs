//! # fiskal-client — Fiscal Verification Client
//!
//! Talks to the regulator's fiscal verification service over mutual TLS:
//!
//! - [`FiscalClient::receipt_codes`] computes the ZOI and QR code locally.
//! - [`FiscalClient::submit_invoice`] runs the whole pipeline and returns the
//!   EOR assigned by the regulator.
//! - [`FiscalClient::register_premise`] registers or closes a business premise.
//! - [`FiscalClient::echo`] checks connectivity.
//! - [`SubmissionPool`] submits many invoices with bounded concurrency.
//!
//! ## Crate Policy
//!
//! - This crate is the only one that performs network I/O.
//! - Only transport failures are retried. A response that verified is final,
//!   whatever it says.
//! - Receipt codes survive every failure after they are computed.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod pool;
pub mod retry;
pub mod transport;

pub use config::{ClientConfig, ConfigError, TlsMaterial, DEFAULT_ENDPOINT_URL};
pub use error::{FiskalError, TransportError};
pub use pipeline::{FiscalClient, InvoiceOutcome, ReceiptCodes, SubmissionFailure};
pub use pool::{SubmissionPool, SubmissionResult};
pub use retry::RetryPolicy;
pub use transport::{Transport, CONTENT_TYPE_JSON_UTF8};
