use serde::{Deserialize, Serialize};

/// A task marker parsed from an entry title: `[ ] text` or `[x] text`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMarker {
    /// Whether the marker is `[x]`
    pub checked: bool,
    /// Title text after the marker, trimmed
    pub text: String,
}

impl TaskMarker {
    pub fn new(checked: bool, text: impl Into<String>) -> Self {
        TaskMarker {
            checked,
            text: text.into(),
        }
    }

    /// The same task with its checked state flipped
    pub fn toggled(&self) -> Self {
        TaskMarker {
            checked: !self.checked,
            text: self.text.clone(),
        }
    }

    /// Canonical marker-prefixed title, e.g. `[x] Buy milk`
    pub fn to_title(&self) -> String {
        crate::parse::format_marker(self.checked, &self.text)
    }
}

/// The glyph drawn inside a checkbox affordance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Glyph {
    Checked,
    Unchecked,
}

impl Glyph {
    pub fn for_state(checked: bool) -> Self {
        if checked {
            Glyph::Checked
        } else {
            Glyph::Unchecked
        }
    }

    /// Terminal rendering of the glyph
    pub fn symbol(self) -> &'static str {
        match self {
            Glyph::Checked => "☑",
            Glyph::Unchecked => "☐",
        }
    }
}
