// src/design/mod.rs

//! Design loading and the shared, lazily-initialized design handles.
//!
//! The schematic and board representations are loaded at most once per run.
//! [`DesignState`] owns a write-once cell for each; checks borrow the loaded
//! handle through it, never through module-level state.

pub mod expand;

use std::cell::OnceCell;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;

use crate::errors::{KicheckError, Result};

/// Everything the orchestrator needs to know about a loaded design file.
#[derive(Debug, Clone)]
pub struct DesignHandle {
    /// The design's main file (schematic or board).
    pub primary_file: PathBuf,
    /// Directory containing the design, passed to external tools.
    pub working_dir: PathBuf,
    /// Base name used by `%f` in naming patterns.
    pub name: String,
    /// True when the design still carries unannotated references (`R?`).
    pub annotation_error: bool,
}

/// Loads the schematic / board representations of the design.
///
/// Implementations must be idempotent: loading twice yields the same handle.
pub trait DesignLoader {
    fn load_schematic(&self) -> Result<DesignHandle>;
    fn load_board(&self) -> Result<DesignHandle>;
}

/// Write-once cells for the two design representations.
///
/// First access wins; the result is memoized for the remainder of the run.
#[derive(Debug, Default)]
pub struct DesignState {
    schematic: OnceCell<DesignHandle>,
    board: OnceCell<DesignHandle>,
}

impl DesignState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the schematic handle, loading it on first access.
    pub fn schematic(&self, loader: &dyn DesignLoader) -> Result<&DesignHandle> {
        if let Some(handle) = self.schematic.get() {
            return Ok(handle);
        }
        let loaded = loader.load_schematic()?;
        debug!(file = ?loaded.primary_file, "schematic loaded");
        Ok(self.schematic.get_or_init(|| loaded))
    }

    /// Get the board handle, loading it on first access.
    pub fn board(&self, loader: &dyn DesignLoader) -> Result<&DesignHandle> {
        if let Some(handle) = self.board.get() {
            return Ok(handle);
        }
        let loaded = loader.load_board()?;
        debug!(file = ?loaded.primary_file, "board loaded");
        Ok(self.board.get_or_init(|| loaded))
    }
}

/// Production loader backed by the paths in `[global]`.
///
/// "Loading" here verifies the file exists and extracts the metadata the
/// orchestrator needs; the heavy parsing stays inside the external tools.
#[derive(Debug)]
pub struct FileDesignLoader {
    pub schematic: Option<PathBuf>,
    pub board: Option<PathBuf>,
}

impl FileDesignLoader {
    pub fn new(schematic: Option<PathBuf>, board: Option<PathBuf>) -> Self {
        Self { schematic, board }
    }

    fn load_file(path: &Path, check_annotation: bool) -> Result<DesignHandle> {
        if !path.is_file() {
            return Err(KicheckError::DesignNotFound(path.to_path_buf()));
        }
        let working_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "design".to_string());
        let annotation_error = if check_annotation {
            let contents = fs::read_to_string(path)?;
            has_unannotated_references(&contents)
        } else {
            false
        };
        Ok(DesignHandle {
            primary_file: path.to_path_buf(),
            working_dir,
            name,
            annotation_error,
        })
    }
}

impl DesignLoader for FileDesignLoader {
    fn load_schematic(&self) -> Result<DesignHandle> {
        let path = self.schematic.as_deref().ok_or(KicheckError::NoSchematic)?;
        Self::load_file(path, true)
    }

    fn load_board(&self) -> Result<DesignHandle> {
        let path = self.board.as_deref().ok_or(KicheckError::NoBoard)?;
        Self::load_file(path, false)
    }
}

/// Detect references that were never annotated, e.g. `(reference "R?")`.
fn has_unannotated_references(contents: &str) -> bool {
    use std::sync::OnceLock;
    static UNANNOTATED: OnceLock<Regex> = OnceLock::new();
    // The pattern is stable across the s-expression schematic formats.
    let re = UNANNOTATED
        .get_or_init(|| Regex::new(r#"\(reference\s+"[A-Za-z_]+\?"\)"#).expect("static regex"));
    re.is_match(contents)
}
