//! # fiskal-cli — Fiscal Verification Command-Line Interface
//!
//! ## Subcommands
//!
//! - `codes` — ZOI and QR code of an invoice, offline
//! - `invoice` — submit invoices and print their EORs
//! - `premise` — register or close a business premise
//! - `echo` — connectivity check
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from the work, which lives in
//!   `fiskal-client`.
//! - Results go to stdout as JSON; logs go to stderr.

pub mod codes;
pub mod echo;
pub mod invoice;
pub mod material;
pub mod premise;
