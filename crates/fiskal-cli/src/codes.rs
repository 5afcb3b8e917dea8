//! # Codes Subcommand
//!
//! Computes the ZOI and QR control code of an invoice without contacting
//! the service. Used to print receipts while offline.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use fiskal_client::ReceiptCodes;
use fiskal_core::InvoiceRecord;
use fiskal_crypto::Identity;
use serde::Serialize;

use crate::material::{load_identity, read_json, KeyArgs};

/// Arguments for the codes subcommand.
#[derive(Args, Debug)]
pub struct CodesArgs {
    #[command(flatten)]
    pub key: KeyArgs,

    /// Invoice record (JSON).
    #[arg(long)]
    pub invoice: PathBuf,
}

/// Printed form of [`ReceiptCodes`].
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CodesOutput {
    pub zoi: String,
    pub qr: String,
}

impl From<&ReceiptCodes> for CodesOutput {
    fn from(codes: &ReceiptCodes) -> Self {
        Self {
            zoi: codes.zoi.to_string(),
            qr: codes.qr.to_string(),
        }
    }
}

/// Execute the codes subcommand.
pub fn run_codes(args: &CodesArgs) -> Result<u8> {
    let identity = load_identity(&args.key)?;
    let record: InvoiceRecord = read_json(&args.invoice)?;
    let output = compute_codes(&identity, &record)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(0)
}

pub fn compute_codes(identity: &Identity, record: &InvoiceRecord) -> Result<CodesOutput> {
    let codes = ReceiptCodes::compute(record, identity.signing_key())?;
    Ok(CodesOutput::from(&codes))
}
