// src/preflight/registry.rs

//! Explicit registry of preflight check types.
//!
//! The registry is populated at process start by [`PreflightRegistry::builtin`],
//! which lists every check constructor in order. No import-time side effects:
//! registration order is explicit and testable, and it is the order checks
//! execute in.

use std::collections::BTreeMap;

use crate::errors::{KicheckError, Result};
use crate::preflight::{drc, erc, options, OptionValue, PreflightCheck, SharedOptions};

/// Builds one check instance from its configured TOML value.
///
/// The factory validates the value's type and fails with a configuration
/// error otherwise; a failed factory registers no check.
pub type CheckFactory = fn(&str, &toml::Value) -> Result<Box<dyn PreflightCheck>>;

/// Registry of declared check types, keyed by name.
pub struct PreflightRegistry {
    factories: Vec<(&'static str, CheckFactory)>,
}

impl PreflightRegistry {
    pub fn new() -> Self {
        Self { factories: Vec::new() }
    }

    /// All built-in checks, in execution order.
    pub fn builtin() -> Self {
        let mut reg = Self::new();
        // Option-only preflights first so their values are available to
        // every check that reads them.
        reg.register(options::ERC_WARNINGS, options::OptionFlag::erc_warnings);
        reg.register(
            options::IGNORE_UNCONNECTED,
            options::OptionFlag::ignore_unconnected,
        );
        reg.register(erc::RunErc::NAME, erc::RunErc::from_value);
        reg.register(drc::RunDrc::NAME, drc::RunDrc::from_value);
        reg
    }

    /// Declare a check type. Registration order is execution order.
    pub fn register(&mut self, name: &'static str, factory: CheckFactory) {
        debug_assert!(
            self.factories.iter().all(|(n, _)| *n != name),
            "duplicate preflight registration: {name}"
        );
        self.factories.push((name, factory));
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.factories.iter().any(|(n, _)| *n == name)
    }

    /// Instantiate every configured check, preserving registration order.
    ///
    /// Unknown keys in the `[preflight]` table are configuration errors.
    pub fn configure(
        &self,
        table: &BTreeMap<String, toml::Value>,
    ) -> Result<ConfiguredChecks> {
        if let Some(unknown) = table.keys().find(|k| !self.is_registered(k)) {
            return Err(KicheckError::Config(format!(
                "unknown preflight `{unknown}`"
            )));
        }

        let mut checks: Vec<Box<dyn PreflightCheck>> = Vec::new();
        for (name, factory) in &self.factories {
            if let Some(value) = table.get(*name) {
                checks.push(factory(name, value)?);
            }
        }

        let mut shared = SharedOptions::default();
        for check in &checks {
            for (name, value) in check.shared_options() {
                shared.insert(name, value);
            }
        }

        Ok(ConfiguredChecks { checks, shared })
    }
}

impl Default for PreflightRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// The checks built for one run, plus the options they export.
pub struct ConfiguredChecks {
    pub checks: Vec<Box<dyn PreflightCheck>>,
    pub shared: SharedOptions,
}

impl std::fmt::Debug for ConfiguredChecks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfiguredChecks")
            .field(
                "checks",
                &self.checks.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .field("shared", &self.shared)
            .finish()
    }
}


impl ConfiguredChecks {
    /// Look up an option declared by any configured check.
    pub fn shared_option(&self, name: &str) -> Option<&OptionValue> {
        self.shared.get(name)
    }

    /// Drop checks by name (CLI `--skip`).
    pub fn skip(&mut self, names: &[String]) {
        self.checks
            .retain(|c| !names.iter().any(|n| n == c.name()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(pairs: &[(&str, toml::Value)]) -> BTreeMap<String, toml::Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn configure_preserves_registration_order() {
        let reg = PreflightRegistry::builtin();
        let configured = reg
            .configure(&table(&[
                ("run_drc", toml::Value::Boolean(true)),
                ("run_erc", toml::Value::Boolean(true)),
            ]))
            .unwrap();
        let names: Vec<_> = configured.checks.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["run_erc", "run_drc"]);
    }

    #[test]
    fn unknown_preflight_is_rejected() {
        let reg = PreflightRegistry::builtin();
        let err = reg
            .configure(&table(&[("run_the_thing", toml::Value::Boolean(true))]))
            .unwrap_err();
        assert!(err.to_string().contains("run_the_thing"));
    }

    #[test]
    fn non_boolean_value_registers_no_check() {
        let reg = PreflightRegistry::builtin();
        let err = reg
            .configure(&table(&[(
                "run_erc",
                toml::Value::String("yes".to_string()),
            )]))
            .unwrap_err();
        assert!(matches!(err, KicheckError::Config(_)));
        assert!(err.to_string().contains("must be boolean"));
    }

    #[test]
    fn shared_option_is_visible_across_checks() {
        let reg = PreflightRegistry::builtin();
        let configured = reg
            .configure(&table(&[
                ("erc_warnings", toml::Value::Boolean(true)),
                ("run_erc", toml::Value::Boolean(true)),
            ]))
            .unwrap();
        assert_eq!(
            configured.shared_option("erc_warnings"),
            Some(&OptionValue::Bool(true))
        );
        assert!(configured.shared.get_bool("erc_warnings"));
        assert!(!configured.shared.get_bool("ignore_unconnected"));
    }

    #[test]
    fn option_only_checks_are_not_enabled_for_execution() {
        let reg = PreflightRegistry::builtin();
        let configured = reg
            .configure(&table(&[("erc_warnings", toml::Value::Boolean(true))]))
            .unwrap();
        assert!(configured.checks.iter().all(|c| !c.enabled()));
    }

    #[test]
    fn skip_removes_checks_by_name() {
        let reg = PreflightRegistry::builtin();
        let mut configured = reg
            .configure(&table(&[
                ("run_erc", toml::Value::Boolean(true)),
                ("run_drc", toml::Value::Boolean(true)),
            ]))
            .unwrap();
        configured.skip(&["run_erc".to_string()]);
        let names: Vec<_> = configured.checks.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["run_drc"]);
    }
}
