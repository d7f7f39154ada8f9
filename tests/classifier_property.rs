// tests/classifier_property.rs

//! Properties of the exit-status classifier.

use kicheck::exec::{classify, RunOutcome};
use proptest::prelude::*;

proptest! {
    /// Total, deterministic, and matching the remap rule over the whole
    /// range a child process can produce.
    #[test]
    fn classification_matches_the_remap_rule(raw in -128i32..=255) {
        let remapped = if raw > 127 { raw - 256 } else { raw };
        let expected = if remapped < 0 {
            RunOutcome::Signalled(-remapped)
        } else if remapped == 0 {
            RunOutcome::Success
        } else {
            RunOutcome::ToolError(remapped)
        };
        prop_assert_eq!(classify(raw), expected);
    }

    /// The high-byte spelling and the negative spelling of a signal death
    /// classify identically.
    #[test]
    fn signal_spellings_agree(status in 128i32..=255) {
        prop_assert_eq!(classify(status), classify(status - 256));
    }
}

#[test]
fn documented_examples() {
    assert_eq!(classify(200), RunOutcome::Signalled(56));
    assert_eq!(classify(200), classify(-56));
    assert_eq!(classify(255), RunOutcome::Signalled(1));
    // classify(x) == classify(x - 256) does NOT hold in general:
    assert_ne!(classify(0), classify(-256));
}
