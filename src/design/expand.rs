// src/design/expand.rs

//! Naming-pattern expansion.
//!
//! Patterns use `%`-tokens: `%f` is the design base name, `%i` the check's
//! id, `%x` its extension and `%%` a literal percent sign. Unknown tokens
//! are kept verbatim so a typo shows up in the produced file name instead
//! of silently vanishing.

use tracing::warn;

use crate::design::DesignHandle;

/// Expand `template` against the design context and a check's id/extension.
///
/// Pure: no filesystem access, no global state.
pub fn expand_pattern(
    template: &str,
    expand_id: &str,
    expand_ext: &str,
    design: &DesignHandle,
) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut chars = template.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('f') => out.push_str(&design.name),
            Some('i') => out.push_str(expand_id),
            Some('x') => out.push_str(expand_ext),
            Some('%') => out.push('%'),
            Some(other) => {
                warn!(token = %format!("%{other}"), "unknown pattern token kept verbatim");
                out.push('%');
                out.push(other);
            }
            None => out.push('%'),
        }
    }
    out
}
