//! # service_cli: mdengine command line
//!
//! Drives the market data engine from a TOML configuration and CSV inputs.
//!
//! # Commands
//!
//! - `mdengine run --config <file> [--format table|json]` - Build the market
//!   data of every configured calculation and report the result
//! - `mdengine check --config <file>` - Validate the configuration and print
//!   the build plan
//!
//! # Architecture
//!
//! As the service layer of the workspace, this crate only wires inputs into
//! `marketdata_engine` and formats what comes back.

pub mod commands;
pub mod config;
pub mod data;
pub mod error;
pub mod report;

pub use config::AppConfig;
pub use error::{CliError, Result};
pub use report::{BuildReport, OutputFormat};
