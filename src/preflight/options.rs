// src/preflight/options.rs

//! Option-only preflights.
//!
//! `erc_warnings` and `ignore_unconnected` carry no work of their own: their
//! configured value is read by the ERC/DRC checks through the shared-option
//! lookup. They still live in the registry so the `[preflight]` table stays
//! the single place all toggles are declared and type-checked.

use std::path::PathBuf;

use crate::errors::{KicheckError, Result};
use crate::preflight::{OptionValue, PreflightCheck, RunContext};

pub const ERC_WARNINGS: &str = "erc_warnings";
pub const IGNORE_UNCONNECTED: &str = "ignore_unconnected";

/// A boolean toggle exported as a shared option.
pub struct OptionFlag {
    name: &'static str,
    value: bool,
}

impl OptionFlag {
    fn from_value(
        name: &'static str,
        value: &toml::Value,
    ) -> Result<Box<dyn PreflightCheck>> {
        let value = value.as_bool().ok_or_else(|| {
            KicheckError::Config(format!("`{name}` must be boolean"))
        })?;
        Ok(Box::new(Self { name, value }))
    }

    pub fn erc_warnings(
        _name: &str,
        value: &toml::Value,
    ) -> Result<Box<dyn PreflightCheck>> {
        Self::from_value(ERC_WARNINGS, value)
    }

    pub fn ignore_unconnected(
        _name: &str,
        value: &toml::Value,
    ) -> Result<Box<dyn PreflightCheck>> {
        Self::from_value(IGNORE_UNCONNECTED, value)
    }
}

impl PreflightCheck for OptionFlag {
    fn name(&self) -> &'static str {
        self.name
    }

    /// Never executed; only the exported option matters.
    fn enabled(&self) -> bool {
        false
    }

    fn shared_options(&self) -> Vec<(&'static str, OptionValue)> {
        vec![(self.name, OptionValue::Bool(self.value))]
    }

    fn targets(&self, _ctx: &RunContext<'_>) -> Result<Vec<PathBuf>> {
        Ok(Vec::new())
    }

    fn run(&self, _ctx: &RunContext<'_>) -> Result<()> {
        Ok(())
    }
}
