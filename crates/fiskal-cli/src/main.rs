//! # fiskal CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fiskal_cli::codes::{run_codes, CodesArgs};
use fiskal_cli::echo::{run_echo, EchoArgs};
use fiskal_cli::invoice::{run_invoice, InvoiceArgs};
use fiskal_cli::premise::{run_premise, PremiseArgs};

/// Fiscal verification client.
///
/// Computes receipt codes, submits signed invoices and premise
/// registrations over mutual TLS, and prints the regulator's answers.
/// The key container passphrase is read from FISKAL_P12_PASSPHRASE.
#[derive(Parser, Debug)]
#[command(name = "fiskal", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute the ZOI and QR code of an invoice without contacting the service.
    Codes(CodesArgs),

    /// Submit invoices and print their unique invoice ids (EOR).
    Invoice(InvoiceArgs),

    /// Register or close a business premise.
    Premise(PremiseArgs),

    /// Check connectivity with the echo endpoint.
    Echo(EchoArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let result = match &cli.command {
        Commands::Codes(args) => run_codes(args),
        Commands::Invoice(args) => run_invoice(args).await,
        Commands::Premise(args) => run_premise(args).await,
        Commands::Echo(args) => run_echo(args).await,
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

/// `RUST_LOG` wins over `-v` when set.
fn init_tracing(verbose: u8, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
