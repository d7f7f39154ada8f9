// src/preflight/erc.rs

//! `run_erc` — Electrical Rules Check.
//!
//! Drives the schematic automation tool to verify the design is electrically
//! correct. The report file name is controlled by the global output pattern
//! (`%i` = `erc`, `%x` = `txt`).

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

pub const KIAUTO_SCH: ToolDependency = ToolDependency {
    name: "KiAuto",
    command: "eeschema_do",
    version: "1.5.4",
    role: ToolRole::Mandatory,
    debian_package: "kiauto",
};

pub struct RunErc {
    enabled: bool,
}

impl RunErc {
    pub const NAME: &'static str = "run_erc";
    const EXPAND_ID: &'static str = "erc";
    const EXPAND_EXT: &'static str = "txt";

    pub fn from_value(name: &str, value: &toml::Value) -> Result<Box<dyn PreflightCheck>> {
        let enabled = value.as_bool().ok_or_else(|| {
            KicheckError::Config(format!("`{name}` must be boolean"))
        })?;
        Ok(Box::new(Self { enabled }))
    }

    fn target(&self, ctx: &RunContext<'_>) -> Result<PathBuf> {
        // The schematic is normally loaded right before a tool needs it,
        // but the target name depends on its metadata.
        let design = ctx.design.schematic(ctx.loader)?;
        let spec = TargetSpec::for_preflight(ctx.config, Self::EXPAND_ID, Self::EXPAND_EXT);
        resolve(&spec, design)
    }
}

impl PreflightCheck for RunErc {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn relation(&self) -> DesignRelation {
        DesignRelation::Schematic
    }

    fn targets(&self, ctx: &RunContext<'_>) -> Result<Vec<PathBuf>> {
        Ok(vec![self.target(ctx)?])
    }

    fn run(&self, ctx: &RunContext<'_>) -> Result<()> {
        // Tool presence is checked before anything touches the filesystem.
        let command = ctx.tools.ensure(&KIAUTO_SCH)?;
        let output = self.target(ctx)?;
        let design = ctx.design.schematic(ctx.loader)?;

        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }
        debug!("ERC report: {}", output.display());

        let mut cmd: Vec<OsString> = vec![
            command.into(),
            "run_erc".into(),
            "-o".into(),
            output.clone().into(),
        ];
        if ctx.shared.get_bool("erc_warnings") {
            cmd.push("-w".into());
        }
        if let Some(filter) = ctx.config.global.filter_file.as_deref() {
            cmd.push("-f".into());
            cmd.push(filter.into());
        }
        cmd.push(design.primary_file.clone().into());
        cmd.push(design.working_dir.clone().into());
        add_verbose_flags(&mut cmd, ctx.verbosity);

        info!("- Running the ERC");
        let section = ctx.config.tool_section(KIAUTO_SCH.command);
        let convention = ExitConvention::from_tool_section(&section);
        let policy = RetryPolicy::from_tool_section(&section);
        let status = exec_with_retry(ctx.runner, &cmd, &policy, &convention)?;

        match convention.classify(status) {
            RunOutcome::Success => Ok(()),
            RunOutcome::Findings(count) => {
                warn!("ERC reported {count} findings, see {}", output.display());
                Ok(())
            }
            RunOutcome::ToolError(code) => {
                error!("ERC returned {code}");
                if design.annotation_error {
                    error!("Make sure your schematic is fully annotated");
                }
                Err(KicheckError::ToolFailed {
                    check: "ERC",
                    code,
                    exit_code: exit_codes::ERC_ERROR,
                })
            }
            RunOutcome::Signalled(signal) => {
                error!("ERC died from signal {signal} (raw status {status})");
                Err(KicheckError::ToolSignalled {
                    check: "ERC",
                    signal,
                    raw: status,
                    exit_code: exit_codes::ERC_ERROR,
                })
            }
        }
    }
}
