// src/exec/runner.rs

//! Production command runner built on `std::process::Command`.

use std::ffi::OsString;
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::errors::{KicheckError, Result};
use crate::exec::{display_argv, CommandRunner};

/// Runs external tools synchronously, capturing their output.
///
/// Execution is deliberately blocking: checks run one at a time and later
/// checks may depend on files produced by earlier ones.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, argv: &[OsString]) -> Result<i32> {
        let (program, args) = argv.split_first().ok_or_else(|| {
            KicheckError::Config("empty command line".to_string())
        })?;

        info!(cmd = %display_argv(argv), "executing");

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| KicheckError::Exec {
                command: program.to_string_lossy().into_owned(),
                source,
            })?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            debug!(target: "kicheck::child", "stdout: {line}");
        }
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            debug!(target: "kicheck::child", "stderr: {line}");
        }

        Ok(raw_status(&output.status))
    }
}

/// Collapse an `ExitStatus` to the raw integer convention used throughout:
/// non-negative exit codes as-is, death by signal as `-(signal)`.
fn raw_status(status: &std::process::ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    status.code().unwrap_or(-1)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<OsString> {
        vec![
            OsString::from("sh"),
            OsString::from("-c"),
            OsString::from(script),
        ]
    }

    #[test]
    fn captures_plain_exit_codes() {
        let runner = ProcessRunner::new();
        assert_eq!(runner.run(&sh("exit 0")).unwrap(), 0);
        assert_eq!(runner.run(&sh("exit 7")).unwrap(), 7);
    }

    #[test]
    fn exit_255_is_reported_raw() {
        // The shell can't return a negative status; 255 reaches the
        // classifier untouched and decodes there as signal 1.
        let runner = ProcessRunner::new();
        assert_eq!(runner.run(&sh("exit 255")).unwrap(), 255);
    }

    #[test]
    fn signal_death_is_negative() {
        let runner = ProcessRunner::new();
        let status = runner.run(&sh("kill -9 $$")).unwrap();
        assert_eq!(status, -9);
    }

    #[test]
    fn unknown_program_is_an_exec_error() {
        let runner = ProcessRunner::new();
        let err = runner
            .run(&[OsString::from("kicheck-no-such-binary")])
            .unwrap_err();
        assert!(matches!(err, KicheckError::Exec { .. }));
    }
}
