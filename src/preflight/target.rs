// src/preflight/target.rs

//! Output target computation.
//!
//! Computing where a check will write its report is deterministic and pure:
//! the same inputs always produce the same absolute path, and nothing here
//! touches the filesystem. Directories are created lazily at run time, not
//! at target-computation time.

use std::path::{Path, PathBuf};

use crate::config::{ConfigFile, DEF_OUTPUT_PATTERN};
use crate::design::expand::expand_pattern;
use crate::design::DesignHandle;
use crate::errors::Result;

/// Inputs for one target computation.
#[derive(Debug, Clone)]
pub struct TargetSpec<'a> {
    /// Configured naming pattern; `None` falls back to `default_pattern`.
    pub pattern: Option<&'a str>,
    pub default_pattern: &'a str,
    pub expand_id: &'a str,
    pub expand_ext: &'a str,
    pub out_dir: &'a Path,
    /// Optional global subdirectory below `out_dir`.
    pub global_subdir: Option<&'a str>,
    /// Whether this target nests under `global_subdir` at all.
    pub use_subdir: bool,
}

impl<'a> TargetSpec<'a> {
    /// Spec for a preflight report: honors `[global].use_dir_for_preflights`.
    pub fn for_preflight(config: &'a ConfigFile, expand_id: &'a str, expand_ext: &'a str) -> Self {
        Self {
            pattern: config.global.output.as_deref(),
            default_pattern: DEF_OUTPUT_PATTERN,
            expand_id,
            expand_ext,
            out_dir: &config.global.out_dir,
            global_subdir: config.global.dir.as_deref(),
            use_subdir: config.global.use_dir_for_preflights,
        }
    }

    /// Spec for a regular output: always nests under the global subdirectory.
    pub fn for_output(config: &'a ConfigFile, expand_id: &'a str, expand_ext: &'a str) -> Self {
        Self {
            use_subdir: true,
            ..Self::for_preflight(config, expand_id, expand_ext)
        }
    }
}

/// Compute the absolute path a check will produce.
pub fn resolve(spec: &TargetSpec<'_>, design: &DesignHandle) -> Result<PathBuf> {
    let pattern = spec.pattern.unwrap_or(spec.default_pattern);
    let name = expand_pattern(pattern, spec.expand_id, spec.expand_ext, design);

    let mut dir = spec.out_dir.to_path_buf();
    if let (Some(subdir), true) = (spec.global_subdir, spec.use_subdir) {
        dir.push(subdir);
    }

    Ok(std::path::absolute(dir.join(name))?)
}
