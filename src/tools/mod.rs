// src/tools/mod.rs

//! External tool dependencies and their resolution.
//!
//! Each check declares the tools it needs as [`ToolDependency`] constants.
//! Resolution goes through the [`ToolResolver`] trait so tests can fake the
//! environment; results (hits and misses) are memoized per run by
//! [`ToolCache`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{KicheckError, Result};

/// Whether a missing tool aborts the run or just degrades functionality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolRole {
    Mandatory,
    Optional,
}

/// A named external tool a check depends on.
#[derive(Debug, Clone, Copy)]
pub struct ToolDependency {
    /// Human-readable name used in logs ("KiAuto").
    pub name: &'static str,
    /// Executable looked up on `$PATH` ("eeschema_do").
    pub command: &'static str,
    /// Minimum supported version, reported when the tool is missing.
    pub version: &'static str,
    pub role: ToolRole,
    /// System package that provides the command, for remediation hints.
    pub debian_package: &'static str,
}

/// Locates the executable for a tool dependency.
pub trait ToolResolver {
    fn resolve(&self, dep: &ToolDependency) -> Result<PathBuf>;
}

/// Production resolver: probes every `$PATH` entry for the command.
#[derive(Debug, Clone, Default)]
pub struct PathResolver;

impl ToolResolver for PathResolver {
    fn resolve(&self, dep: &ToolDependency) -> Result<PathBuf> {
        let paths = env::var_os("PATH").unwrap_or_default();
        for dir in env::split_paths(&paths) {
            let candidate = dir.join(dep.command);
            if is_executable(&candidate) {
                return Ok(candidate);
            }
        }
        Err(KicheckError::MissingTool {
            tool: dep.name.to_string(),
            version: dep.version.to_string(),
        })
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Per-run memoization of tool lookups, hits and misses alike.
pub struct ToolCache<'a> {
    resolver: &'a dyn ToolResolver,
    cache: RefCell<HashMap<&'static str, Option<PathBuf>>>,
}

impl<'a> ToolCache<'a> {
    pub fn new(resolver: &'a dyn ToolResolver) -> Self {
        Self {
            resolver,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Resolve a mandatory dependency, failing with `MissingTool` otherwise.
    pub fn ensure(&self, dep: &ToolDependency) -> Result<PathBuf> {
        match self.lookup(dep) {
            Some(path) => Ok(path),
            None => Err(KicheckError::MissingTool {
                tool: dep.name.to_string(),
                version: dep.version.to_string(),
            }),
        }
    }

    /// Resolve an optional dependency; `None` means "degrade, don't abort".
    pub fn try_resolve(&self, dep: &ToolDependency) -> Option<PathBuf> {
        self.lookup(dep)
    }

    fn lookup(&self, dep: &ToolDependency) -> Option<PathBuf> {
        if let Some(cached) = self.cache.borrow().get(dep.command) {
            return cached.clone();
        }
        let resolved = self.resolver.resolve(dep).ok();
        match &resolved {
            Some(path) => debug!(tool = dep.name, path = ?path, "tool resolved"),
            None => debug!(tool = dep.name, command = dep.command, "tool not found"),
        }
        self.cache
            .borrow_mut()
            .insert(dep.command, resolved.clone());
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const FAKE_DEP: ToolDependency = ToolDependency {
        name: "KiAuto",
        command: "eeschema_do",
        version: "1.5.4",
        role: ToolRole::Mandatory,
        debian_package: "kiauto",
    };

    /// Counts how many times it is asked, to prove the cache memoizes.
    struct CountingResolver {
        calls: Cell<u32>,
        found: bool,
    }

    impl ToolResolver for CountingResolver {
        fn resolve(&self, dep: &ToolDependency) -> Result<PathBuf> {
            self.calls.set(self.calls.get() + 1);
            if self.found {
                Ok(PathBuf::from("/usr/bin").join(dep.command))
            } else {
                Err(KicheckError::MissingTool {
                    tool: dep.name.to_string(),
                    version: dep.version.to_string(),
                })
            }
        }
    }

    #[test]
    fn cache_memoizes_hits() {
        let resolver = CountingResolver { calls: Cell::new(0), found: true };
        let cache = ToolCache::new(&resolver);
        let a = cache.ensure(&FAKE_DEP).unwrap();
        let b = cache.ensure(&FAKE_DEP).unwrap();
        assert_eq!(a, b);
        assert_eq!(resolver.calls.get(), 1);
    }

    #[test]
    fn cache_memoizes_misses() {
        let resolver = CountingResolver { calls: Cell::new(0), found: false };
        let cache = ToolCache::new(&resolver);
        assert!(cache.try_resolve(&FAKE_DEP).is_none());
        let err = cache.ensure(&FAKE_DEP).unwrap_err();
        assert!(matches!(err, KicheckError::MissingTool { .. }));
        assert_eq!(resolver.calls.get(), 1);
    }
}
