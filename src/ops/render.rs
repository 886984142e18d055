use std::collections::HashSet;

use crate::host::Host;
use crate::model::{Appearance, Config, EntryKind, EntryRef, Glyph, NodeId, Selectors};
use crate::parse::parse_marker;

/// `data-*` key marking an entry that has been given an affordance
pub const PROCESSED_KEY: &str = "task-processed";
/// `data-*` key holding an affordance's checked state
pub const CHECKED_KEY: &str = "checked";

/// What rendering did to one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Title carries no marker and no affordance exists: not a task
    NotATask,
    /// An affordance was attached for the first time
    Inserted,
    /// The host put a marker back into an already-rendered entry
    Refreshed,
    /// Already rendered and the host has not touched the title since
    Settled,
}

/// Result of a full re-scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Every entry node seen, task or not
    pub entries: HashSet<NodeId>,
    pub inserted: usize,
    pub refreshed: usize,
    pub settled: usize,
}

impl ScanReport {
    pub fn tasks(&self) -> usize {
        self.inserted + self.refreshed + self.settled
    }
}

/// Render every all-day entry, then every timed entry
pub fn scan(host: &mut dyn Host, config: &Config) -> ScanReport {
    let mut report = ScanReport::default();
    for kind in [EntryKind::AllDay, EntryKind::Timed] {
        for node in host.query_all(config.selectors.entry(kind)) {
            report.entries.insert(node);
            match render_entry(host, config, node) {
                RenderOutcome::Inserted => report.inserted += 1,
                RenderOutcome::Refreshed => report.refreshed += 1,
                RenderOutcome::Settled => report.settled += 1,
                RenderOutcome::NotATask => {}
            }
        }
    }
    report
}

/// Make sure a task entry shows exactly one affordance matching its marker,
/// with the marker stripped from the displayed title. Only differing values
/// are written, so rendering an unchanged entry again leaves the host alone.
pub fn render_entry(host: &mut dyn Host, config: &Config, entry: NodeId) -> RenderOutcome {
    let sel = &config.selectors;
    let Some(title) = locate_title(host, sel, entry) else {
        return RenderOutcome::NotATask;
    };
    let existing = host.query(Some(entry), &sel.affordance());

    let raw = host.text(title).unwrap_or_default();
    let Some(marker) = parse_marker(raw.trim()) else {
        return match existing {
            Some(_) => RenderOutcome::Settled,
            None => RenderOutcome::NotATask,
        };
    };

    // Host re-rendered the title text under an affordance we already attached
    if let Some(affordance) = existing {
        host.set_text(title, &marker.text);
        show_checked(host, &config.appearance, title, affordance, marker.checked);
        return RenderOutcome::Refreshed;
    }

    host.set_data(entry, PROCESSED_KEY, "true");
    let affordance = host.create_element("span", &sel.affordance_class);
    host.insert_before(affordance, title);
    host.set_text(title, &marker.text);
    show_checked(host, &config.appearance, title, affordance, marker.checked);
    RenderOutcome::Inserted
}

/// Title element of an entry: all-day title first, then timed
pub fn locate_title(host: &dyn Host, sel: &Selectors, entry: NodeId) -> Option<NodeId> {
    sel.titles()
        .iter()
        .find_map(|title_sel| host.query(Some(entry), title_sel))
}

/// The entry containing `node`, if any
pub fn entry_containing(host: &dyn Host, sel: &Selectors, node: NodeId) -> Option<EntryRef> {
    host.closest(node, &sel.all_day_entry)
        .map(|n| EntryRef::new(n, EntryKind::AllDay))
        .or_else(|| {
            host.closest(node, &sel.timed_entry)
                .map(|n| EntryRef::new(n, EntryKind::Timed))
        })
}

pub fn is_checked(host: &dyn Host, affordance: NodeId) -> bool {
    host.data(affordance, CHECKED_KEY).as_deref() == Some("true")
}

/// Glyph, checked flag and title style for a checked state
pub fn show_checked(
    host: &mut dyn Host,
    appearance: &Appearance,
    title: NodeId,
    affordance: NodeId,
    checked: bool,
) {
    host.set_glyph(affordance, Glyph::for_state(checked));
    host.set_data(affordance, CHECKED_KEY, if checked { "true" } else { "false" });
    if checked {
        host.set_style(title, "text-decoration", "line-through", false);
        host.set_style(title, "opacity", &appearance.checked_opacity, false);
    } else {
        host.set_style(title, "text-decoration", "none", false);
        host.set_style(title, "opacity", "1", false);
    }
}

/// Fade the entry while its toggle waits to be saved
pub fn dim_entry(host: &mut dyn Host, appearance: &Appearance, entry: NodeId) {
    host.set_style(entry, "transition", &appearance.pending_transition, false);
    host.set_style(entry, "opacity", &appearance.pending_opacity, false);
}

/// Back to the neutral look, with whatever transition the host defines
pub fn clear_dim(host: &mut dyn Host, entry: NodeId) {
    host.remove_style(entry, "opacity");
    host.remove_style(entry, "transition");
}

/// Back to full opacity without animating the fade
pub fn restore_entry_instantly(host: &mut dyn Host, entry: NodeId) {
    host.set_style(entry, "transition", "none", true);
    host.set_style(entry, "opacity", "1", true);
    host.reflow(entry);
    host.remove_style(entry, "transition");
    host.remove_style(entry, "opacity");
}
