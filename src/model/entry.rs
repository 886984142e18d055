use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identity of a node in the host document.
///
/// Identities are never reused: when the host re-renders an entry it hands
/// out a fresh id, so anything keyed by a stale id simply stops matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which layout the host used for an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Spans a whole day; the editor opens from a click on its title
    AllDay,
    /// Placed in the time grid; the editor opens from a click on the cell
    Timed,
}

/// A calendar entry as seen by the engine: a host node plus its layout kind.
/// The engine never owns the node; it only annotates and reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryRef {
    pub node: NodeId,
    pub kind: EntryKind,
}

impl EntryRef {
    pub fn new(node: NodeId, kind: EntryKind) -> Self {
        EntryRef { node, kind }
    }
}

/// Axis-aligned box of a node in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Point used for simulated clicks: a little inside the left edge,
    /// vertically centered
    pub fn click_point(&self) -> (f64, f64) {
        (self.left + 10.0, self.top + self.height / 2.0)
    }
}
