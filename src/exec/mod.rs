// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`runner`] owns the production [`ProcessRunner`] built on
//!   `std::process::Command`.
//! - [`status`] classifies raw exit statuses.
//! - This module provides the [`CommandRunner`] trait the checks talk to
//!   (tests swap in fakes that never spawn anything) and the bounded
//!   retry loop around it.

pub mod runner;
pub mod status;

use std::ffi::OsString;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::ToolSection;
use crate::errors::Result;
use crate::exec::status::ExitConvention;

pub use runner::ProcessRunner;
pub use status::{classify, RunOutcome};

/// Trait abstracting how an external command is executed.
///
/// Production code uses [`ProcessRunner`]; tests provide implementations
/// that return scripted statuses without spawning processes.
pub trait CommandRunner {
    /// Run the command synchronously and return its raw exit status.
    ///
    /// Death by signal is reported as `-(signal)`.
    fn run(&self, argv: &[OsString]) -> Result<i32>;
}

/// Bounded synchronous retry policy.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles after each failed attempt.
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Default policy: most EDA CLI failures are deterministic, so retry
    /// only when a check explicitly opts in.
    pub fn single() -> Self {
        Self { max_attempts: 1, backoff: Duration::ZERO }
    }

    pub fn from_tool_section(section: &ToolSection) -> Self {
        Self {
            max_attempts: section.max_attempts.max(1),
            backoff: Duration::from_millis(section.backoff_ms),
        }
    }
}

/// Run `argv`, retrying statuses the tool's convention deems transient.
///
/// Returns the status of the last attempt regardless of outcome.
pub fn exec_with_retry(
    runner: &dyn CommandRunner,
    argv: &[OsString],
    policy: &RetryPolicy,
    convention: &ExitConvention,
) -> Result<i32> {
    let mut backoff = policy.backoff;
    let mut status = runner.run(argv)?;
    for attempt in 2..=policy.max_attempts {
        if !convention.is_retryable(status) {
            break;
        }
        warn!(
            status,
            attempt,
            of = policy.max_attempts,
            "transient tool failure, retrying"
        );
        if !backoff.is_zero() {
            thread::sleep(backoff);
            backoff *= 2;
        }
        status = runner.run(argv)?;
    }
    debug!(status, "command finished");
    Ok(status)
}

/// Forward the orchestrator's verbosity to a child tool (`-v` per level),
/// so child diagnostics match parent verbosity. Appended last on purpose.
pub fn add_verbose_flags(argv: &mut Vec<OsString>, verbosity: u8) {
    for _ in 0..verbosity {
        argv.push(OsString::from("-v"));
    }
}

/// Render an argv for logs.
pub fn display_argv(argv: &[OsString]) -> String {
    argv.iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Returns a scripted sequence of statuses and records call counts.
    struct ScriptedRunner {
        statuses: RefCell<Vec<i32>>,
    }

    impl ScriptedRunner {
        fn new(mut statuses: Vec<i32>) -> Self {
            statuses.reverse();
            Self { statuses: RefCell::new(statuses) }
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, _argv: &[OsString]) -> Result<i32> {
            Ok(self.statuses.borrow_mut().pop().expect("script exhausted"))
        }
    }

    fn argv() -> Vec<OsString> {
        vec![OsString::from("eeschema_do"), OsString::from("run_erc")]
    }

    #[test]
    fn single_attempt_never_retries() {
        let runner = ScriptedRunner::new(vec![3, 0]);
        let conv = ExitConvention { findings_max: None, retry_on: vec![3] };
        let status =
            exec_with_retry(&runner, &argv(), &RetryPolicy::single(), &conv).unwrap();
        assert_eq!(status, 3);
        assert_eq!(runner.statuses.borrow().len(), 1);
    }

    #[test]
    fn retries_transient_code_until_success() {
        let runner = ScriptedRunner::new(vec![3, 3, 0]);
        let conv = ExitConvention { findings_max: None, retry_on: vec![3] };
        let policy = RetryPolicy { max_attempts: 3, backoff: Duration::ZERO };
        let status = exec_with_retry(&runner, &argv(), &policy, &conv).unwrap();
        assert_eq!(status, 0);
        assert!(runner.statuses.borrow().is_empty());
    }

    #[test]
    fn last_status_wins_when_attempts_run_out() {
        let runner = ScriptedRunner::new(vec![3, 3, 3]);
        let conv = ExitConvention { findings_max: None, retry_on: vec![3] };
        let policy = RetryPolicy { max_attempts: 3, backoff: Duration::ZERO };
        let status = exec_with_retry(&runner, &argv(), &policy, &conv).unwrap();
        assert_eq!(status, 3);
    }

    #[test]
    fn non_retryable_failure_stops_immediately() {
        let runner = ScriptedRunner::new(vec![255, 0]);
        let conv = ExitConvention { findings_max: None, retry_on: vec![3] };
        let policy = RetryPolicy { max_attempts: 3, backoff: Duration::ZERO };
        let status = exec_with_retry(&runner, &argv(), &policy, &conv).unwrap();
        assert_eq!(status, 255);
        assert_eq!(runner.statuses.borrow().len(), 1);
    }

    #[test]
    fn verbose_flags_append_per_level() {
        let mut cmd = argv();
        add_verbose_flags(&mut cmd, 2);
        assert_eq!(cmd.len(), 4);
        assert_eq!(cmd[2], OsString::from("-v"));
        assert_eq!(cmd[3], OsString::from("-v"));
    }
}
