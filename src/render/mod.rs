// src/render/mod.rs

//! Board image output.
//!
//! Renders the board to SVG through the drawing tool, then converts to
//! PNG/JPG through optional system converters:
//!
//! - PNG wants `rsvg-convert` (package `librsvg2-bin`);
//! - JPG additionally wants ImageMagick's `convert` (package `imagemagick`).
//!
//! A missing converter never aborts the run: the drawing tool's own raster
//! backend is used instead and a warning names the package that would fix
//! the fidelity loss. Downstream tooling matches on that warning text, so
//! it is part of [`RenderReport`] as well as the log.

use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

use tracing::{debug, error, info, warn};

use crate::config::{ImageFormat, RenderSection};
use crate::errors::{exit_codes, KicheckError, Result};
use crate::exec::status::{ExitConvention, RunOutcome};
use crate::exec::{add_verbose_flags, exec_with_retry, RetryPolicy};
use crate::preflight::target::{resolve, TargetSpec};
use crate::preflight::RunContext;
use crate::tools::{ToolDependency, ToolRole};

pub const PCBDRAW: ToolDependency = ToolDependency {
    name: "PcbDraw",
    command: "pcbdraw",
    version: "0.9.0",
    role: ToolRole::Mandatory,
    debian_package: "pcbdraw",
};

pub const RSVG: ToolDependency = ToolDependency {
    name: "rsvg-convert",
    command: "rsvg-convert",
    version: "2.40",
    role: ToolRole::Optional,
    debian_package: "librsvg2-bin",
};

pub const CONVERT: ToolDependency = ToolDependency {
    name: "ImageMagick",
    command: "convert",
    version: "6.9",
    role: ToolRole::Optional,
    debian_package: "imagemagick",
};

const EXPAND_ID: &str = "assembly";

/// How the final raster image was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Converter {
    /// No conversion needed (SVG output).
    NotNeeded,
    RsvgConvert,
    ImageMagick,
    /// Degraded mode: the drawing tool's own lower-fidelity rasterizer.
    Fallback,
}

/// Which components end up drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentSelection {
    All,
    None,
    /// The variant/filter mechanism decides.
    Variant(String),
    Listed(Vec<String>),
}

/// Outcome of one render, with the warnings downstream tooling matches on.
#[derive(Debug)]
pub struct RenderReport {
    pub target: PathBuf,
    pub converter: Converter,
    pub selection: ComponentSelection,
    pub warnings: Vec<String>,
}

/// Render the board per `[render]`.
pub fn run_render(ctx: &RunContext<'_>, opts: &RenderSection) -> Result<RenderReport> {
    let command = ctx.tools.ensure(&PCBDRAW)?;
    let design = ctx.design.board(ctx.loader)?;

    let mut warnings = Vec::new();
    let selection = resolve_selection(ctx, opts, &mut warnings);

    let spec = TargetSpec::for_output(ctx.config, EXPAND_ID, opts.format.extension());
    let target = resolve(&spec, design)?;
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }

    // SVG is always drawn first; rasterization is a separate step.
    let svg = target.with_extension("svg");
    draw(ctx, &command, design, &selection, &svg)?;

    let converter = match opts.format {
        ImageFormat::Svg => Converter::NotNeeded,
        ImageFormat::Png => convert_png(ctx, &command, design, &selection, &svg, &target, &mut warnings)?,
        ImageFormat::Jpg => convert_jpg(ctx, &command, design, &selection, &svg, &target, &mut warnings)?,
    };

    info!("board image: {}", target.display());
    Ok(RenderReport { target, converter, selection, warnings })
}

/// Decide which components to draw.
///
/// An explicitly empty `show_components` list and a configured variant or
/// filter are two selection mechanisms that conflict; the variant/filter
/// wins and the ambiguity is reported.
fn resolve_selection(
    ctx: &RunContext<'_>,
    opts: &RenderSection,
    warnings: &mut Vec<String>,
) -> ComponentSelection {
    let variant_or_filter = ctx
        .config
        .global
        .variant
        .clone()
        .or_else(|| ctx.config.global.filter_file.clone());

    match (&opts.show_components, variant_or_filter) {
        (Some(list), Some(variant)) if list.is_empty() => {
            let msg = "Ambiguous list of components to show <none> vs variant/filter"
                .to_string();
            warn!("{msg}");
            warnings.push(msg);
            ComponentSelection::Variant(variant)
        }
        (_, Some(variant)) => ComponentSelection::Variant(variant),
        (Some(list), None) if list.is_empty() => ComponentSelection::None,
        (Some(list), None) => ComponentSelection::Listed(list.clone()),
        (None, None) => ComponentSelection::All,
    }
}

/// Invoke the drawing tool to produce `out`.
fn draw(
    ctx: &RunContext<'_>,
    command: &PathBuf,
    design: &crate::design::DesignHandle,
    selection: &ComponentSelection,
    out: &PathBuf,
) -> Result<()> {
    let mut cmd: Vec<OsString> = vec![command.clone().into(), "plot".into()];
    match selection {
        ComponentSelection::All => {}
        ComponentSelection::None => {
            cmd.push("--filter".into());
            cmd.push("".into());
        }
        ComponentSelection::Variant(v) => {
            cmd.push("--variant".into());
            cmd.push(v.into());
        }
        ComponentSelection::Listed(refs) => {
            cmd.push("--filter".into());
            cmd.push(refs.join(",").into());
        }
    }
    cmd.push(design.primary_file.clone().into());
    cmd.push(out.clone().into());
    add_verbose_flags(&mut cmd, ctx.verbosity);

    debug!("drawing board: {}", out.display());
    run_step(ctx, PCBDRAW.command, "render", cmd)
}

fn convert_png(
    ctx: &RunContext<'_>,
    draw_cmd: &PathBuf,
    design: &crate::design::DesignHandle,
    selection: &ComponentSelection,
    svg: &PathBuf,
    target: &PathBuf,
    warnings: &mut Vec<String>,
) -> Result<Converter> {
    match ctx.tools.try_resolve(&RSVG) {
        Some(rsvg) => {
            let cmd: Vec<OsString> = vec![
                rsvg.into(),
                "-o".into(),
                target.clone().into(),
                svg.clone().into(),
            ];
            run_step(ctx, RSVG.command, "render", cmd)?;
            Ok(Converter::RsvgConvert)
        }
        None => {
            degrade(&RSVG, warnings);
            draw(ctx, draw_cmd, design, selection, target)?;
            Ok(Converter::Fallback)
        }
    }
}

fn convert_jpg(
    ctx: &RunContext<'_>,
    draw_cmd: &PathBuf,
    design: &crate::design::DesignHandle,
    selection: &ComponentSelection,
    svg: &PathBuf,
    target: &PathBuf,
    warnings: &mut Vec<String>,
) -> Result<Converter> {
    let Some(rsvg) = ctx.tools.try_resolve(&RSVG) else {
        degrade(&RSVG, warnings);
        draw(ctx, draw_cmd, design, selection, target)?;
        return Ok(Converter::Fallback);
    };
    let Some(convert) = ctx.tools.try_resolve(&CONVERT) else {
        degrade(&CONVERT, warnings);
        draw(ctx, draw_cmd, design, selection, target)?;
        return Ok(Converter::Fallback);
    };

    let png = target.with_extension("png");
    let cmd: Vec<OsString> = vec![
        rsvg.into(),
        "-o".into(),
        png.clone().into(),
        svg.clone().into(),
    ];
    run_step(ctx, RSVG.command, "render", cmd)?;

    let cmd: Vec<OsString> = vec![convert.into(), png.into(), target.clone().into()];
    run_step(ctx, CONVERT.command, "render", cmd)?;
    Ok(Converter::ImageMagick)
}

/// Log the degraded mode and which system package would restore fidelity.
fn degrade(dep: &ToolDependency, warnings: &mut Vec<String>) {
    let msg = format!(
        "`{}` not installed, using unreliable PNG/JPG conversion. \
         Install the `{}` system package for better results",
        dep.command, dep.debian_package
    );
    warn!("{msg}");
    warnings.push(msg);
}

/// Run one external step of the render pipeline, classifying its status.
fn run_step(
    ctx: &RunContext<'_>,
    tool_command: &str,
    check: &'static str,
    cmd: Vec<OsString>,
) -> Result<()> {
    let section = ctx.config.tool_section(tool_command);
    let convention = ExitConvention::from_tool_section(&section);
    let policy = RetryPolicy::from_tool_section(&section);
    let status = exec_with_retry(ctx.runner, &cmd, &policy, &convention)?;

    match convention.classify(status) {
        RunOutcome::Success => Ok(()),
        RunOutcome::Findings(count) => {
            warn!("{tool_command} reported {count} findings");
            Ok(())
        }
        RunOutcome::ToolError(code) => {
            error!("{tool_command} returned {code}");
            Err(KicheckError::ToolFailed {
                check,
                code,
                exit_code: exit_codes::RENDER_ERROR,
            })
        }
        RunOutcome::Signalled(signal) => {
            error!("{tool_command} died from signal {signal} (raw status {status})");
            Err(KicheckError::ToolSignalled {
                check,
                signal,
                raw: status,
                exit_code: exit_codes::RENDER_ERROR,
            })
        }
    }
}
