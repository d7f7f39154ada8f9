// src/preflight/mod.rs

//! The preflight execution engine.
//!
//! - [`registry`] holds the explicit registry of check types.
//! - [`target`] computes output targets without running anything.
//! - [`erc`] / [`drc`] are the concrete tool-driving checks.
//! - [`options`] holds option-only preflights (`erc_warnings`,
//!   `ignore_unconnected`) whose configured value other checks read as a
//!   shared option.
//!
//! Checks run sequentially in registration order. A check's fatal outcome
//! aborts the whole run; already-produced report files are left in place as
//! diagnostic artifacts.

pub mod drc;
pub mod erc;
pub mod options;
pub mod registry;
pub mod target;

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::ConfigFile;
use crate::design::{DesignLoader, DesignState};
use crate::errors::Result;
use crate::exec::CommandRunner;
use crate::tools::ToolCache;

pub use registry::{ConfiguredChecks, PreflightRegistry};
pub use target::{resolve as resolve_target, TargetSpec};

/// Which design representation a check needs loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesignRelation {
    Schematic,
    Layout,
    None,
}

/// A configured option value exported by a check.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Str(String),
}

/// Cross-cutting options collected from every configured check.
///
/// One check's behavior (e.g. "emit warnings") can be configured as a
/// global toggle declared by another registered check.
#[derive(Debug, Default)]
pub struct SharedOptions {
    map: BTreeMap<&'static str, OptionValue>,
}

impl SharedOptions {
    pub fn insert(&mut self, name: &'static str, value: OptionValue) {
        self.map.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.map.get(name)
    }

    pub fn get_bool(&self, name: &str) -> bool {
        matches!(self.map.get(name), Some(OptionValue::Bool(true)))
    }
}

/// Everything a check needs during one orchestration run.
///
/// All of it is borrowed, immutable configuration except the design state
/// (write-once cells) and the tool cache (memoized lookups).
pub struct RunContext<'a> {
    pub config: &'a ConfigFile,
    pub design: &'a DesignState,
    pub loader: &'a dyn DesignLoader,
    pub tools: ToolCache<'a>,
    pub runner: &'a dyn CommandRunner,
    pub shared: &'a SharedOptions,
    /// Forwarded to child tools as `-v` per level.
    pub verbosity: u8,
}

/// A named, independently toggleable unit of pre-build work.
pub trait PreflightCheck {
    /// Unique key, e.g. `"run_erc"`.
    fn name(&self) -> &'static str;

    /// Whether this check executes at all this run.
    fn enabled(&self) -> bool;

    fn relation(&self) -> DesignRelation {
        DesignRelation::None
    }

    /// Options this check exports for other checks to read.
    fn shared_options(&self) -> Vec<(&'static str, OptionValue)> {
        Vec::new()
    }

    /// The files this check will produce.
    ///
    /// May trigger lazy design loading, but must not execute any external
    /// process and must not fail if the target directory does not exist.
    fn targets(&self, ctx: &RunContext<'_>) -> Result<Vec<PathBuf>>;

    /// Execute the check. A returned error aborts the whole run.
    fn run(&self, ctx: &RunContext<'_>) -> Result<()>;
}

/// Run every enabled check in registration order.
///
/// Targets are computed for all checks before any tool runs, so a
/// configuration problem surfaces before partial side effects.
pub fn run_preflights(
    ctx: &RunContext<'_>,
    checks: &[Box<dyn PreflightCheck>],
) -> Result<()> {
    let enabled: Vec<_> = checks.iter().filter(|c| c.enabled()).collect();

    for check in &enabled {
        let targets = check.targets(ctx)?;
        debug!(check = check.name(), ?targets, "targets computed");
    }

    for check in &enabled {
        info!(check = check.name(), "running preflight");
        check.run(ctx)?;
    }

    Ok(())
}
