// src/lib.rs

pub mod cli;
pub mod config;
pub mod design;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod preflight;
pub mod render;
pub mod tools;

use std::path::PathBuf;

use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::load_and_validate;
use crate::design::{DesignState, FileDesignLoader};
use crate::errors::Result;
use crate::exec::ProcessRunner;
use crate::preflight::{PreflightCheck, PreflightRegistry, RunContext};
use crate::tools::{PathResolver, ToolCache};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the preflight registry and its configured checks
/// - the shared design state, tool cache and process runner
/// - the optional board render output
pub fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    let registry = PreflightRegistry::builtin();
    let mut configured = registry.configure(&cfg.preflight)?;
    if !args.skip.is_empty() {
        info!(skip = ?args.skip, "skipping preflights by request");
        configured.skip(&args.skip);
    }

    let loader = FileDesignLoader::new(
        cfg.global.schematic.clone(),
        cfg.global.board.clone(),
    );
    let design = DesignState::new();
    let resolver = PathResolver;
    let runner = ProcessRunner::new();

    let ctx = RunContext {
        config: &cfg,
        design: &design,
        loader: &loader,
        tools: ToolCache::new(&resolver),
        runner: &runner,
        shared: &configured.shared,
        verbosity: args.verbose,
    };

    if args.list_targets {
        return print_targets(&ctx, &configured.checks);
    }

    preflight::run_preflights(&ctx, &configured.checks)?;

    if let Some(render_cfg) = cfg.render.as_ref().filter(|r| r.enabled) {
        let report = render::run_render(&ctx, render_cfg)?;
        debug!(converter = ?report.converter, "render finished");
    }

    Ok(())
}

/// Print what every enabled check would produce; nothing is executed.
fn print_targets(ctx: &RunContext<'_>, checks: &[Box<dyn PreflightCheck>]) -> Result<()> {
    for check in checks.iter().filter(|c| c.enabled()) {
        for target in check.targets(ctx)? {
            println!("{}\t{}", check.name(), target.display());
        }
    }
    Ok(())
}
