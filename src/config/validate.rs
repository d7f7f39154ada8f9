// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{KicheckError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = KicheckError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(raw: &RawConfigFile) -> Result<()> {
    validate_global(raw)?;
    validate_tools(raw)?;
    Ok(())
}

fn validate_global(raw: &RawConfigFile) -> Result<()> {
    if let Some(pattern) = raw.global.output.as_deref() {
        if pattern.trim().is_empty() {
            return Err(KicheckError::Config(
                "[global].output must not be empty (omit it to use the default pattern)"
                    .to_string(),
            ));
        }
    }
    if let Some(dir) = raw.global.dir.as_deref() {
        if dir.trim().is_empty() {
            return Err(KicheckError::Config(
                "[global].dir must not be empty (omit it to disable the subdirectory)"
                    .to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_tools(raw: &RawConfigFile) -> Result<()> {
    for (command, tool) in raw.tools.iter() {
        if tool.max_attempts == 0 {
            return Err(KicheckError::Config(format!(
                "[tools.{command}].max_attempts must be >= 1 (got 0)"
            )));
        }
        if let Some(max) = tool.findings_max {
            if !(1..=127).contains(&max) {
                return Err(KicheckError::Config(format!(
                    "[tools.{command}].findings_max must be in 1..=127 (got {max})"
                )));
            }
        }
        if let Some(bad) = tool.retry_on.iter().find(|c| **c <= 0) {
            return Err(KicheckError::Config(format!(
                "[tools.{command}].retry_on must list positive exit codes (got {bad})"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::RawConfigFile;

    fn parse(toml_text: &str) -> Result<ConfigFile> {
        let raw: RawConfigFile = toml::from_str(toml_text).expect("valid TOML");
        ConfigFile::try_from(raw)
    }

    #[test]
    fn empty_config_is_valid() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg.output_pattern(), "%f-%i.%x");
        assert!(cfg.global.use_dir_for_preflights);
    }

    #[test]
    fn rejects_zero_max_attempts() {
        let err = parse("[tools.eeschema_do]\nmax_attempts = 0\n").unwrap_err();
        assert!(matches!(err, KicheckError::Config(_)));
        assert!(err.to_string().contains("max_attempts"));
    }

    #[test]
    fn rejects_empty_output_pattern() {
        let err = parse("[global]\noutput = \"\"\n").unwrap_err();
        assert!(err.to_string().contains("[global].output"));
    }

    #[test]
    fn rejects_out_of_range_findings_max() {
        let err = parse("[tools.pcbnew_do]\nfindings_max = 200\n").unwrap_err();
        assert!(err.to_string().contains("findings_max"));
    }

    #[test]
    fn rejects_non_positive_retry_codes() {
        let err = parse("[tools.eeschema_do]\nretry_on = [0]\n").unwrap_err();
        assert!(err.to_string().contains("retry_on"));
    }

    #[test]
    fn tool_section_defaults_to_single_attempt() {
        let cfg = parse("").unwrap();
        let tool = cfg.tool_section("eeschema_do");
        assert_eq!(tool.max_attempts, 1);
        assert!(tool.retry_on.is_empty());
        assert_eq!(tool.findings_max, None);
    }
}
