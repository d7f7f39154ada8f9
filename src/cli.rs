// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `kicheck`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "kicheck",
    version,
    about = "Run EDA preflight checks and outputs by driving external tools.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Kicheck.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Kicheck.toml")]
    pub config: String,

    /// Print the files each enabled preflight would produce, without
    /// running anything.
    #[arg(long)]
    pub list_targets: bool,

    /// Skip one preflight by name (may be repeated).
    #[arg(long, value_name = "NAME")]
    pub skip: Vec<String>,

    /// Increase verbosity; also forwarded to child tools (`-v` per level).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `-v` counters, then `KICHECK_LOG`, then a default apply.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
