//! # Echo Subcommand
//!
//! Checks that the service is reachable over mutual TLS and answers.

use anyhow::Result;
use clap::Args;

use crate::material::{connect, ServiceArgs};

/// Arguments for the echo subcommand.
#[derive(Args, Debug)]
pub struct EchoArgs {
    #[command(flatten)]
    pub service: ServiceArgs,

    /// Text to send.
    #[arg(long, default_value = "fiskal")]
    pub text: String,
}

/// Execute the echo subcommand.
pub async fn run_echo(args: &EchoArgs) -> Result<u8> {
    let client = connect(&args.service)?;
    let received = client.echo(&args.text).await?;
    println!("{received}");
    Ok(0)
}
