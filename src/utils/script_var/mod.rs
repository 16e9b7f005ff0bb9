use std::ops::Range;

use lazy_static::lazy_static;
use regex::Regex;

// Matches `var <identifier> = "<value>";`, capturing the identifier and the quoted value.
const PATTERN: &str = r#"var ([A-Za-z_$][A-Za-z0-9_$]*)\s*=\s*"(.*?)";"#;

lazy_static! {
    pub static ref SCRIPT_VAR_RE: Regex = Regex::new(PATTERN).unwrap();
}

/// Byte range of the value of the first `var <name> = "...";` assignment.
fn value_range(script: &str, name: &str) -> Option<Range<usize>> {
    SCRIPT_VAR_RE
        .captures_iter(script)
        .find(|captures| captures.get(1).map(|m| m.as_str()) == Some(name))
        .and_then(|captures| captures.get(2))
        .map(|value| value.range())
}

/// Returns the value of the first assignment to `name`, or `None` when the script never assigns it.
pub fn find_script_var(script: &str, name: &str) -> Option<String> {
    value_range(script, name).map(|range| script[range].to_string())
}

/// Rewrites the value of the first assignment to `name`, leaving every other byte untouched.
///
/// A script without such an assignment is returned unchanged.
pub fn replace_script_var(script: &str, name: &str, value: &str) -> String {
    match value_range(script, name) {
        Some(range) => {
            let mut replaced = script.to_string();
            replaced.replace_range(range, value);

            replaced
        }
        None => {
            tracing::debug!("No `var {}` assignment found, leaving script untouched", name);

            script.to_string()
        }
    }
}
