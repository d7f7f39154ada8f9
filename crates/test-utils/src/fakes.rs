//! Fake collaborators for tests.
//!
//! - [`FakeToolResolver`] simulates which external tools are installed.
//! - [`PanicResolver`] / [`PanicRunner`] prove that a code path resolves no
//!   tool and spawns no process.
//! - [`FakeRunner`] records command lines and returns scripted statuses
//!   without spawning anything.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

use kicheck::errors::{KicheckError, Result};
use kicheck::exec::CommandRunner;
use kicheck::tools::{ToolDependency, ToolResolver};

/// Resolver backed by an explicit command -> path map.
#[derive(Debug, Default)]
pub struct FakeToolResolver {
    map: HashMap<String, PathBuf>,
}

impl FakeToolResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `command` as installed at `path`.
    pub fn with(mut self, command: &str, path: impl Into<PathBuf>) -> Self {
        self.map.insert(command.to_string(), path.into());
        self
    }
}

impl ToolResolver for FakeToolResolver {
    fn resolve(&self, dep: &ToolDependency) -> Result<PathBuf> {
        self.map.get(dep.command).cloned().ok_or_else(|| {
            KicheckError::MissingTool {
                tool: dep.name.to_string(),
                version: dep.version.to_string(),
            }
        })
    }
}

/// Panics when asked for any tool; use to prove no resolution happens.
#[derive(Debug, Default)]
pub struct PanicResolver;

impl ToolResolver for PanicResolver {
    fn resolve(&self, dep: &ToolDependency) -> Result<PathBuf> {
        panic!("tool resolver invoked for `{}`", dep.command);
    }
}

/// Panics when asked to run anything; use to prove no process spawns.
#[derive(Debug, Default)]
pub struct PanicRunner;

impl CommandRunner for PanicRunner {
    fn run(&self, argv: &[OsString]) -> Result<i32> {
        panic!("process spawned: {argv:?}");
    }
}

/// Records command lines and returns scripted exit statuses.
///
/// With `touch_outputs`, each call also creates an empty file at the
/// argument following `-o` (or the last argument otherwise), mimicking a
/// tool that writes its output.
pub struct FakeRunner {
    statuses: RefCell<VecDeque<i32>>,
    touch_outputs: bool,
    calls: RefCell<Vec<Vec<String>>>,
}

impl FakeRunner {
    /// Always succeeds.
    pub fn ok() -> Self {
        Self::with_statuses(vec![])
    }

    /// Returns the given statuses in order, then 0.
    pub fn with_statuses(statuses: Vec<i32>) -> Self {
        Self {
            statuses: RefCell::new(statuses.into()),
            touch_outputs: false,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn touching_outputs(mut self) -> Self {
        self.touch_outputs = true;
        self
    }

    /// Every command line seen so far, lossily stringified.
    pub fn commands(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    fn output_path(argv: &[OsString]) -> Option<PathBuf> {
        if let Some(pos) = argv.iter().position(|a| a == "-o") {
            return argv.get(pos + 1).map(PathBuf::from);
        }
        argv.last().map(PathBuf::from)
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, argv: &[OsString]) -> Result<i32> {
        self.calls.borrow_mut().push(
            argv.iter()
                .map(|a| a.to_string_lossy().into_owned())
                .collect(),
        );
        if self.touch_outputs {
            if let Some(path) = Self::output_path(argv) {
                if let Some(parent) = path.parent() {
                    let _ = fs::create_dir_all(parent);
                }
                fs::write(&path, b"")?;
            }
        }
        Ok(self.statuses.borrow_mut().pop_front().unwrap_or(0))
    }
}
