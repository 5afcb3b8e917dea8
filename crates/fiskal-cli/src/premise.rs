//! # Premise Subcommand
//!
//! Registers a business premise, or closes it with `--close`.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use fiskal_core::BusinessPremiseRecord;

use crate::material::{connect, read_json, ServiceArgs};

/// Arguments for the premise subcommand.
#[derive(Args, Debug)]
pub struct PremiseArgs {
    #[command(flatten)]
    pub service: ServiceArgs,

    /// Business premise record (JSON, regulator field names).
    #[arg(long)]
    pub premise: PathBuf,

    /// Register the premise as closed.
    #[arg(long)]
    pub close: bool,
}

/// Execute the premise subcommand.
pub async fn run_premise(args: &PremiseArgs) -> Result<u8> {
    let mut record: BusinessPremiseRecord = read_json(&args.premise)?;
    if args.close {
        record = record.closed();
    }
    let client = connect(&args.service)?;
    let result = client.register_premise(record).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(0)
}
