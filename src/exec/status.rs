// src/exec/status.rs

//! Exit-status classification.
//!
//! External tools report through their exit status. Values above 127 are
//! signal-style encodings (a child that died from SIGKILL surfaces as 247
//! through some shells, or as a negative value from the runner directly);
//! both spellings decode to the same signal number here.

use crate::config::ToolSection;

/// Structured interpretation of a raw exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    /// The tool ran and reported this many rule findings via its exit code.
    Findings(u32),
    /// The tool returned an error code of its own.
    ToolError(i32),
    /// The process died from this signal.
    Signalled(i32),
}

/// Classify a raw exit status without any tool-specific knowledge.
///
/// Pure and total for every `i32`:
/// 1. status > 127 remaps to `status - 256`;
/// 2. negative values decode to `Signalled(-value)`;
/// 3. zero is `Success`;
/// 4. everything else is `ToolError`.
pub fn classify(raw: i32) -> RunOutcome {
    let value = if raw > 127 { raw - 256 } else { raw };
    if value < 0 {
        RunOutcome::Signalled(-value)
    } else if value == 0 {
        RunOutcome::Success
    } else {
        RunOutcome::ToolError(value)
    }
}

/// Tool-specific exit-code convention.
///
/// The ERC/DRC tool family uses "exit code = number of findings" for small
/// positive codes. Which codes mean that, and which codes are transient and
/// worth retrying, differs per tool, so this comes from `[tools.<command>]`
/// rather than being hard-coded.
#[derive(Debug, Clone, Default)]
pub struct ExitConvention {
    pub findings_max: Option<i32>,
    pub retry_on: Vec<i32>,
}

impl ExitConvention {
    pub fn from_tool_section(section: &ToolSection) -> Self {
        Self {
            findings_max: section.findings_max,
            retry_on: section.retry_on.clone(),
        }
    }

    /// [`classify`], refined: positive codes within the findings range are
    /// reported findings, not crashes.
    pub fn classify(&self, raw: i32) -> RunOutcome {
        match classify(raw) {
            RunOutcome::ToolError(code) => match self.findings_max {
                Some(max) if code <= max => RunOutcome::Findings(code as u32),
                _ => RunOutcome::ToolError(code),
            },
            other => other,
        }
    }

    /// Whether this status is a known transient failure.
    pub fn is_retryable(&self, raw: i32) -> bool {
        match classify(raw) {
            RunOutcome::ToolError(code) => self.retry_on.contains(&code),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_success() {
        assert_eq!(classify(0), RunOutcome::Success);
    }

    #[test]
    fn positive_codes_are_tool_errors() {
        assert_eq!(classify(1), RunOutcome::ToolError(1));
        assert_eq!(classify(127), RunOutcome::ToolError(127));
    }

    #[test]
    fn high_statuses_decode_as_signals() {
        assert_eq!(classify(255), RunOutcome::Signalled(1));
        assert_eq!(classify(200), RunOutcome::Signalled(56));
        assert_eq!(classify(128), RunOutcome::Signalled(128));
    }

    #[test]
    fn negative_statuses_decode_as_signals() {
        assert_eq!(classify(-1), RunOutcome::Signalled(1));
        assert_eq!(classify(-9), RunOutcome::Signalled(9));
    }

    #[test]
    fn high_and_negative_spellings_agree() {
        // 200 and -56 are the same death by signal 56.
        assert_eq!(classify(200), classify(-56));
    }

    #[test]
    fn findings_refinement_respects_the_cap() {
        let conv = ExitConvention { findings_max: Some(50), retry_on: vec![] };
        assert_eq!(conv.classify(3), RunOutcome::Findings(3));
        assert_eq!(conv.classify(50), RunOutcome::Findings(50));
        assert_eq!(conv.classify(51), RunOutcome::ToolError(51));
        assert_eq!(conv.classify(255), RunOutcome::Signalled(1));
        assert_eq!(conv.classify(0), RunOutcome::Success);
    }

    #[test]
    fn without_convention_no_code_is_a_finding() {
        let conv = ExitConvention::default();
        assert_eq!(conv.classify(3), RunOutcome::ToolError(3));
    }

    #[test]
    fn retryable_only_matches_plain_error_codes() {
        let conv = ExitConvention { findings_max: None, retry_on: vec![3] };
        assert!(conv.is_retryable(3));
        assert!(!conv.is_retryable(4));
        assert!(!conv.is_retryable(-3));
        assert!(!conv.is_retryable(0));
    }
}
