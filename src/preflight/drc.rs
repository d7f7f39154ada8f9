// src/preflight/drc.rs

//! `run_drc` — Design Rules Check on the board layout.
//!
//! Structurally the layout sibling of [`crate::preflight::erc`]: same target
//! derivation, same exit-code handling, different tool verb and design
//! representation.

use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

use tracing::{debug, error, info, warn};

use crate::errors::{exit_codes, KicheckError, Result};
use crate::exec::status::{ExitConvention, RunOutcome};
use crate::exec::{add_verbose_flags, exec_with_retry, RetryPolicy};
use crate::preflight::target::{resolve, TargetSpec};
use crate::preflight::{DesignRelation, PreflightCheck, RunContext};
use crate::tools::{ToolDependency, ToolRole};

pub const KIAUTO_PCB: ToolDependency = ToolDependency {
    name: "KiAuto",
    command: "pcbnew_do",
    version: "1.5.4",
    role: ToolRole::Mandatory,
    debian_package: "kiauto",
};

pub struct RunDrc {
    enabled: bool,
}

impl RunDrc {
    pub const NAME: &'static str = "run_drc";
    const EXPAND_ID: &'static str = "drc";
    const EXPAND_EXT: &'static str = "txt";

    pub fn from_value(name: &str, value: &toml::Value) -> Result<Box<dyn PreflightCheck>> {
        let enabled = value.as_bool().ok_or_else(|| {
            KicheckError::Config(format!("`{name}` must be boolean"))
        })?;
        Ok(Box::new(Self { enabled }))
    }

    fn target(&self, ctx: &RunContext<'_>) -> Result<PathBuf> {
        let design = ctx.design.board(ctx.loader)?;
        let spec = TargetSpec::for_preflight(ctx.config, Self::EXPAND_ID, Self::EXPAND_EXT);
        resolve(&spec, design)
    }
}

impl PreflightCheck for RunDrc {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn relation(&self) -> DesignRelation {
        DesignRelation::Layout
    }

    fn targets(&self, ctx: &RunContext<'_>) -> Result<Vec<PathBuf>> {
        Ok(vec![self.target(ctx)?])
    }

    fn run(&self, ctx: &RunContext<'_>) -> Result<()> {
        let command = ctx.tools.ensure(&KIAUTO_PCB)?;
        let output = self.target(ctx)?;
        let design = ctx.design.board(ctx.loader)?;

        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }
        debug!("DRC report: {}", output.display());

        let mut cmd: Vec<OsString> = vec![
            command.into(),
            "run_drc".into(),
            "-o".into(),
            output.clone().into(),
        ];
        if ctx.shared.get_bool("ignore_unconnected") {
            cmd.push("-i".into());
        }
        if let Some(filter) = ctx.config.global.filter_file.as_deref() {
            cmd.push("-f".into());
            cmd.push(filter.into());
        }
        cmd.push(design.primary_file.clone().into());
        cmd.push(design.working_dir.clone().into());
        add_verbose_flags(&mut cmd, ctx.verbosity);

        info!("- Running the DRC");
        let section = ctx.config.tool_section(KIAUTO_PCB.command);
        let convention = ExitConvention::from_tool_section(&section);
        let policy = RetryPolicy::from_tool_section(&section);
        let status = exec_with_retry(ctx.runner, &cmd, &policy, &convention)?;

        match convention.classify(status) {
            RunOutcome::Success => Ok(()),
            RunOutcome::Findings(count) => {
                warn!("DRC reported {count} findings, see {}", output.display());
                Ok(())
            }
            RunOutcome::ToolError(code) => {
                error!("DRC returned {code}");
                Err(KicheckError::ToolFailed {
                    check: "DRC",
                    code,
                    exit_code: exit_codes::DRC_ERROR,
                })
            }
            RunOutcome::Signalled(signal) => {
                error!("DRC died from signal {signal} (raw status {status})");
                Err(KicheckError::ToolSignalled {
                    check: "DRC",
                    signal,
                    raw: status,
                    exit_code: exit_codes::DRC_ERROR,
                })
            }
        }
    }
}
