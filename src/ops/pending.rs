use std::collections::HashMap;

use tokio::task::AbortHandle;

use crate::model::NodeId;
use crate::parse::format_marker;

/// Per-entry edit state between a toggle and the save that persists it.
#[derive(Debug, Default)]
pub struct PendingEdit {
    /// Marker-prefixed title waiting to be written to the host
    pending_title: Option<String>,
    /// Title as it was before the current burst of toggles
    baseline: Option<String>,
    /// Running debounce timer and the token it was armed with
    timer: Option<(u64, AbortHandle)>,
}

impl PendingEdit {
    fn is_empty(&self) -> bool {
        self.pending_title.is_none() && self.baseline.is_none() && self.timer.is_none()
    }

    fn cancel_timer(&mut self) {
        if let Some((_, handle)) = self.timer.take() {
            handle.abort();
        }
    }
}

/// What the caller must do after a toggle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// State differs from the baseline: (re)start the debounce timer with
    /// `token` and save `new_title` when it fires
    Commit { new_title: String, token: u64 },
    /// Toggled back to the baseline: nothing to save
    Revert,
}

/// Pending edits keyed by entry identity.
///
/// Holds no host nodes, only their ids. Entries the host has replaced are
/// dropped by [`PendingEdits::evict_missing`] on every re-scan.
#[derive(Debug, Default)]
pub struct PendingEdits {
    edits: HashMap<NodeId, PendingEdit>,
    next_token: u64,
}

impl PendingEdits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one toggle of `entry` from `was_checked` to its opposite.
    ///
    /// The first toggle of a burst captures the baseline. A toggle that lands
    /// back on the baseline cancels the timer and forgets the entry; anything
    /// else supersedes the previous timer.
    pub fn record_toggle(&mut self, entry: NodeId, was_checked: bool, text: &str) -> ToggleOutcome {
        let new_title = format_marker(!was_checked, text);
        let edit = self.edits.entry(entry).or_default();
        let baseline = edit
            .baseline
            .get_or_insert_with(|| format_marker(was_checked, text));

        if *baseline == new_title {
            edit.cancel_timer();
            self.edits.remove(&entry);
            return ToggleOutcome::Revert;
        }

        edit.pending_title = Some(new_title.clone());
        edit.cancel_timer();
        self.next_token += 1;
        ToggleOutcome::Commit {
            new_title,
            token: self.next_token,
        }
    }

    /// Attach the debounce timer started for `token`. A timer for a token
    /// that has since been superseded is aborted straight away.
    pub fn attach_timer(&mut self, entry: NodeId, token: u64, handle: AbortHandle) {
        match self.edits.get_mut(&entry) {
            Some(edit) if token == self.next_token && edit.pending_title.is_some() => {
                edit.cancel_timer();
                edit.timer = Some((token, handle));
            }
            _ => handle.abort(),
        }
    }

    /// The debounce timer for `token` elapsed. Ends the burst (baseline and
    /// timer are dropped) and returns the title still awaiting persistence.
    /// Returns `None` for a superseded timer.
    pub fn fire(&mut self, entry: NodeId, token: u64) -> Option<String> {
        let edit = self.edits.get_mut(&entry)?;
        if !matches!(edit.timer, Some((t, _)) if t == token) {
            return None;
        }
        edit.timer = None;
        edit.baseline = None;
        let title = edit.pending_title.clone();
        if edit.is_empty() {
            self.edits.remove(&entry);
        }
        title
    }

    pub fn pending_title(&self, entry: NodeId) -> Option<&str> {
        self.edits.get(&entry)?.pending_title.as_deref()
    }

    /// Consume the pending title, as the click interceptor does before saving
    pub fn take_pending_title(&mut self, entry: NodeId) -> Option<String> {
        let edit = self.edits.get_mut(&entry)?;
        let title = edit.pending_title.take();
        if edit.is_empty() {
            self.edits.remove(&entry);
        }
        title
    }

    pub fn baseline(&self, entry: NodeId) -> Option<&str> {
        self.edits.get(&entry)?.baseline.as_deref()
    }

    pub fn has_timer(&self, entry: NodeId) -> bool {
        self.edits.get(&entry).is_some_and(|e| e.timer.is_some())
    }

    /// Drop every association whose entry is no longer live, aborting its
    /// timer. Returns how many were dropped.
    pub fn evict_missing(&mut self, is_live: impl Fn(NodeId) -> bool) -> usize {
        let before = self.edits.len();
        self.edits.retain(|id, edit| {
            if is_live(*id) {
                true
            } else {
                edit.cancel_timer();
                false
            }
        });
        before - self.edits.len()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}
