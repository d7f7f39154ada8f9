//! Test harness bundling the borrowed pieces a [`RunContext`] needs.

use kicheck::config::{ConfigFile, RawConfigFile};
use kicheck::design::{DesignState, FileDesignLoader};
use kicheck::exec::CommandRunner;
use kicheck::preflight::{ConfiguredChecks, PreflightRegistry, RunContext};
use kicheck::tools::{ToolCache, ToolResolver};

/// Parse and validate a config from inline TOML.
pub fn config_from_toml(toml_text: &str) -> ConfigFile {
    let raw: RawConfigFile = toml::from_str(toml_text).expect("valid TOML");
    ConfigFile::try_from(raw).expect("valid config")
}

/// Owns everything a `RunContext` borrows, so tests can build one in two
/// lines without fighting lifetimes.
pub struct Harness {
    pub config: ConfigFile,
    pub design: DesignState,
    pub loader: FileDesignLoader,
    pub configured: ConfiguredChecks,
}

impl Harness {
    pub fn new(config: ConfigFile) -> Self {
        let configured = PreflightRegistry::builtin()
            .configure(&config.preflight)
            .expect("configurable preflights");
        let loader = FileDesignLoader::new(
            config.global.schematic.clone(),
            config.global.board.clone(),
        );
        Self {
            config,
            design: DesignState::new(),
            loader,
            configured,
        }
    }

    pub fn from_toml(toml_text: &str) -> Self {
        Self::new(config_from_toml(toml_text))
    }

    pub fn ctx<'a>(
        &'a self,
        resolver: &'a dyn ToolResolver,
        runner: &'a dyn CommandRunner,
    ) -> RunContext<'a> {
        RunContext {
            config: &self.config,
            design: &self.design,
            loader: &self.loader,
            tools: ToolCache::new(resolver),
            runner,
            shared: &self.configured.shared,
            verbosity: 0,
        }
    }
}
