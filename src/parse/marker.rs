use std::sync::LazyLock;

use regex::Regex;

use crate::model::TaskMarker;

/// Leading `[ ]` / `[x]` marker. Interior whitespace is optional and the `x`
/// is case-insensitive, so `[]`, `[ x ]` and `[X]` all qualify.
static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[\s*([xX]?)\s*\]\s*").expect("marker regex is valid"));

/// Parse a title into a task marker. Returns `None` when the title does not
/// start with a marker, which means the entry is not a task.
pub fn parse_marker(title: &str) -> Option<TaskMarker> {
    let caps = MARKER_RE.captures(title)?;
    let checked = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
    let rest = &title[caps.get(0)?.end()..];
    Some(TaskMarker::new(checked, rest.trim()))
}

/// Build the canonical marker-prefixed title
pub fn format_marker(checked: bool, text: &str) -> String {
    if checked {
        format!("[x] {}", text)
    } else {
        format!("[ ] {}", text)
    }
}
