// src/errors.rs

//! Crate-wide error type and the fixed process exit codes.
//!
//! Nothing below `main.rs` ever calls `std::process::exit`; fatal outcomes
//! are returned as [`KicheckError`] values and the driver maps them to the
//! exit codes in [`exit_codes`].

use std::path::PathBuf;

use thiserror::Error;

/// Process exit codes surfaced to the caller, one per failure category.
///
/// These are a stable contract: downstream CI scripts match on them.
pub mod exit_codes {
    pub const INTERNAL_ERROR: i32 = 1;
    pub const WRONG_ARGUMENTS: i32 = 2;
    pub const MISSING_TOOL: i32 = 4;
    pub const DRC_ERROR: i32 = 5;
    pub const BAD_CONFIG: i32 = 7;
    pub const NO_PCB_FILE: i32 = 8;
    pub const NO_SCH_FILE: i32 = 9;
    pub const ERC_ERROR: i32 = 10;
    pub const RENDER_ERROR: i32 = 12;
    pub const FAILED_EXECUTE: i32 = 20;
}

#[derive(Error, Debug)]
pub enum KicheckError {
    #[error("configuration error: {0}")]
    Config(String),

    /// A mandatory external tool could not be resolved.
    #[error("missing tool `{tool}` (need version {version} or newer)")]
    MissingTool { tool: String, version: String },

    /// The external tool ran and returned a nonzero error code.
    #[error("{check} returned {code}")]
    ToolFailed {
        check: &'static str,
        code: i32,
        /// Fixed exit code for this check's failure category.
        exit_code: i32,
    },

    /// The external tool died from a signal. Always fatal.
    #[error("{check} died from signal {signal} (raw status {raw})")]
    ToolSignalled {
        check: &'static str,
        signal: i32,
        raw: i32,
        exit_code: i32,
    },

    /// The child process could not be spawned at all.
    #[error("cannot execute `{command}`: {source}")]
    Exec {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no schematic file available (set [global].schematic)")]
    NoSchematic,

    #[error("no board file available (set [global].board)")]
    NoBoard,

    #[error("design file not found: {0}")]
    DesignNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl KicheckError {
    /// Map this error onto the fixed exit code of its failure category.
    pub fn exit_code(&self) -> i32 {
        use exit_codes::*;
        match self {
            KicheckError::Config(_) => BAD_CONFIG,
            KicheckError::MissingTool { .. } => MISSING_TOOL,
            KicheckError::ToolFailed { exit_code, .. } => *exit_code,
            KicheckError::ToolSignalled { exit_code, .. } => *exit_code,
            KicheckError::Exec { .. } => FAILED_EXECUTE,
            KicheckError::NoSchematic => NO_SCH_FILE,
            KicheckError::NoBoard => NO_PCB_FILE,
            KicheckError::DesignNotFound(_) => NO_SCH_FILE,
            KicheckError::Toml(_) => BAD_CONFIG,
            KicheckError::Io(_) => INTERNAL_ERROR,
            KicheckError::Other(_) => INTERNAL_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, KicheckError>;
