//! # Invoice Subcommand
//!
//! Submits one or more invoices and prints one JSON line per invoice, in
//! the order given. The ZOI and QR code are printed even when submission
//! fails, so the receipt can still be issued and resubmitted later.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use fiskal_client::{SubmissionPool, SubmissionResult};
use fiskal_core::InvoiceRecord;
use serde::Serialize;

use crate::material::{connect, read_json, ServiceArgs};

/// Arguments for the invoice subcommand.
#[derive(Args, Debug)]
pub struct InvoiceArgs {
    #[command(flatten)]
    pub service: ServiceArgs,

    /// Invoice records (JSON), one file per invoice.
    #[arg(required = true)]
    pub invoices: Vec<PathBuf>,
}

/// One line of output.
#[derive(Debug, Serialize)]
pub struct InvoiceReport {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InvoiceReport {
    pub fn new(file: String, result: &SubmissionResult) -> Self {
        match result {
            Ok(outcome) => Self {
                file,
                zoi: Some(outcome.codes.zoi.to_string()),
                qr: Some(outcome.codes.qr.to_string()),
                eor: Some(outcome.unique_invoice_id.to_string()),
                message_id: Some(outcome.message_id.to_string()),
                error: None,
            },
            Err(failure) => Self {
                file,
                zoi: failure.codes.as_ref().map(|c| c.zoi.to_string()),
                qr: failure.codes.as_ref().map(|c| c.qr.to_string()),
                eor: None,
                message_id: None,
                error: Some(failure.error.to_string()),
            },
        }
    }
}

/// Execute the invoice subcommand. Exits 1 if any invoice failed.
pub async fn run_invoice(args: &InvoiceArgs) -> Result<u8> {
    let records = args
        .invoices
        .iter()
        .map(|path| read_json::<InvoiceRecord>(path))
        .collect::<Result<Vec<_>>>()?;

    let client = Arc::new(connect(&args.service)?);
    let results = SubmissionPool::new(client).submit_all(records).await;

    let mut failed = 0usize;
    for (path, result) in args.invoices.iter().zip(&results) {
        if result.is_err() {
            failed += 1;
        }
        let report = InvoiceReport::new(path.display().to_string(), result);
        println!("{}", serde_json::to_string(&report)?);
    }

    if failed > 0 {
        tracing::error!(failed, total = results.len(), "some invoices were not accepted");
        return Ok(1);
    }
    Ok(0)
}
