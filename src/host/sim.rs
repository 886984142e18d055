//! An in-memory calendar document implementing [`Host`].
//!
//! It behaves the way the real host does where the engine is sensitive to it:
//! every re-render replaces entry nodes with fresh identities, a click on an
//! entry opens an event popover, the popover's edit button opens an edit
//! modal, the title input only reports a new value to the "framework" when an
//! input/change event arrives and the DOM value differs from the tracked one,
//! and saving writes the title back to the stored event and re-renders.

use std::collections::{BTreeMap, HashMap};
use std::fmt::{self, Write as _};

use chrono::{NaiveDate, NaiveTime};
use indexmap::IndexMap;
use tokio::sync::mpsc;

use super::selector::{Element, Selector};
use super::{FieldEvent, Host, HostEvent, MutationRecord, PointerEvent, PointerKind};
use crate::model::{EntryKind, Glyph, NodeId, Rect, Selectors};

const ENTRY_HEIGHT: f64 = 22.0;
const ENTRY_WIDTH: f64 = 240.0;
const TITLE_INDENT: f64 = 18.0;

/// Identity of a stored calendar event (stable across re-renders)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(pub u32);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event-{}", self.0)
    }
}

/// An event as persisted by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub title: String,
    pub date: NaiveDate,
    /// `None` for all-day events
    pub start: Option<NaiveTime>,
}

impl CalendarEvent {
    pub fn kind(&self) -> EntryKind {
        if self.start.is_some() {
            EntryKind::Timed
        } else {
            EntryKind::AllDay
        }
    }
}

/// Host UI elements that can be left out to simulate a changed or slow host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Quirks {
    pub omit_edit_trigger: bool,
    pub omit_title_input: bool,
    pub omit_save_control: bool,
}

/// Things the host did, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostAction {
    Pointer { node: NodeId, kind: PointerKind },
    Activated { node: NodeId },
    PopoverOpened { event: EventId },
    ModalOpened { event: EventId },
    Saved { event: EventId, title: String },
    Rendered { entries: usize },
}

/// Inspection view of one rendered entry
#[derive(Debug, Clone, PartialEq)]
pub struct EntryView {
    pub node: NodeId,
    pub event: EventId,
    pub kind: EntryKind,
    pub start: Option<NaiveTime>,
    pub glyph: Option<Glyph>,
    pub title: String,
    pub struck: bool,
    pub title_opacity: Option<String>,
    pub entry_opacity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StyleValue {
    value: String,
    important: bool,
}

#[derive(Debug, Clone, Default)]
struct SimNode {
    tag: String,
    id_attr: Option<String>,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    data: BTreeMap<String, String>,
    style: BTreeMap<String, StyleValue>,
    text: String,
    glyph: Option<Glyph>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    rect: Option<Rect>,
    event: Option<EventId>,
    /// DOM value of an input
    value: String,
    /// Value last observed by the host's framework
    tracked_value: String,
}

impl Element for SimNode {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn id_attr(&self) -> Option<&str> {
        self.id_attr.as_deref()
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone)]
struct Popover {
    node: NodeId,
    event: EventId,
}

#[derive(Debug, Clone)]
struct Modal {
    node: NodeId,
    event: EventId,
    draft: String,
}

/// In-memory calendar document
pub struct SimHost {
    selectors: Selectors,
    nodes: HashMap<NodeId, SimNode>,
    root: NodeId,
    grid: NodeId,
    next_node: u64,
    next_event: u32,
    events: IndexMap<EventId, CalendarEvent>,
    stylesheets: IndexMap<String, String>,
    popover: Option<Popover>,
    modal: Option<Modal>,
    notifier: Option<mpsc::UnboundedSender<HostEvent>>,
    pub quirks: Quirks,
    journal: Vec<HostAction>,
    mutations: usize,
}

impl SimHost {
    /// An empty calendar addressed by `selectors`
    pub fn new(selectors: Selectors) -> Self {
        let mut host = SimHost {
            selectors,
            nodes: HashMap::new(),
            root: NodeId(0),
            grid: NodeId(0),
            next_node: 0,
            next_event: 0,
            events: IndexMap::new(),
            stylesheets: IndexMap::new(),
            popover: None,
            modal: None,
            notifier: None,
            quirks: Quirks::default(),
            journal: Vec::new(),
            mutations: 0,
        };
        host.root = host.alloc("body", &[]);
        host.grid = host.alloc("div", &["calendar-grid"]);
        host.append(host.root, host.grid);
        host
    }

    /// A calendar pre-filled with a few events, used by the demo
    pub fn sample(selectors: Selectors) -> Self {
        let mut host = SimHost::new(selectors);
        let day = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap_or_default();
        let at = |h, m| NaiveTime::from_hms_opt(h, m, 0);
        host.add_event("[ ] Pay rent", day, None);
        host.add_event("Team offsite", day, None);
        host.add_event("[x] Book flights", day, None);
        host.add_event("[ ] Standup notes", day, at(9, 30));
        host.add_event("Lunch with Sam", day, at(12, 0));
        host.add_event("[ ] Review pull requests", day, at(14, 0));
        host.add_event("[X]   Send invoice", day, at(16, 30));
        host.render_calendar();
        host
    }

    /// Route all future notifications to a new channel
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<HostEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.notifier = Some(tx);
        rx
    }

    /// Store an event. It becomes visible on the next [`render_calendar`].
    ///
    /// [`render_calendar`]: SimHost::render_calendar
    pub fn add_event(
        &mut self,
        title: &str,
        date: NaiveDate,
        start: Option<NaiveTime>,
    ) -> EventId {
        let id = EventId(self.next_event);
        self.next_event += 1;
        self.events.insert(
            id,
            CalendarEvent {
                title: title.to_string(),
                date,
                start,
            },
        );
        id
    }

    pub fn event(&self, id: EventId) -> Option<&CalendarEvent> {
        self.events.get(&id)
    }

    pub fn events(&self) -> impl Iterator<Item = (EventId, &CalendarEvent)> {
        self.events.iter().map(|(id, ev)| (*id, ev))
    }

    /// Replace every entry node with a freshly built one, as the host does
    /// whenever its own state changes
    pub fn render_calendar(&mut self) {
        for child in std::mem::take(&mut self.node_mut_or_default(self.grid).children) {
            self.drop_subtree(child);
        }

        let mut ordered: Vec<(EventId, CalendarEvent)> = self
            .events
            .iter()
            .map(|(id, ev)| (*id, ev.clone()))
            .collect();
        ordered.sort_by_key(|(_, ev)| (ev.start.is_some(), ev.start));

        let count = ordered.len();
        for (row, (id, ev)) in ordered.into_iter().enumerate() {
            let (entry_class, title_class) = match ev.kind() {
                EntryKind::AllDay => (
                    class_of(&self.selectors.all_day_entry),
                    class_of(&self.selectors.all_day_title),
                ),
                EntryKind::Timed => (
                    class_of(&self.selectors.timed_entry),
                    class_of(&self.selectors.timed_title),
                ),
            };
            let top = row as f64 * ENTRY_HEIGHT;
            let entry = self.alloc("div", &[entry_class.as_str()]);
            let title = self.alloc("span", &[title_class.as_str()]);
            if let Some(node) = self.nodes.get_mut(&entry) {
                node.event = Some(id);
                node.rect = Some(Rect {
                    left: 0.0,
                    top,
                    width: ENTRY_WIDTH,
                    height: ENTRY_HEIGHT,
                });
            }
            if let Some(node) = self.nodes.get_mut(&title) {
                node.text = ev.title.clone();
                node.rect = Some(Rect {
                    left: TITLE_INDENT,
                    top,
                    width: ENTRY_WIDTH - TITLE_INDENT,
                    height: ENTRY_HEIGHT,
                });
            }
            self.append(entry, title);
            self.append(self.grid, entry);
        }

        self.journal.push(HostAction::Rendered { entries: count });
        self.notify_mutation(MutationRecord::child_list(self.grid, count));
    }

    /// A user click on `node`. Clicks on an affordance go to its listener
    /// unless its pointer events are disabled, in which case they fall
    /// through to the element underneath.
    pub fn user_click(&mut self, node: NodeId) {
        let affordance = self.selectors.affordance();
        if let Some(aff) = self.closest(node, &affordance) {
            let disabled = self
                .style(aff, "pointer-events")
                .is_some_and(|v| v == "none");
            if !disabled {
                self.send(HostEvent::AffordanceClick { affordance: aff });
                return;
            }
            if let Some(parent) = self.nodes.get(&aff).and_then(|n| n.parent) {
                self.click(parent);
            }
            return;
        }
        self.click(node);
    }

    /// A user click on empty calendar space, which dismisses the popover
    pub fn click_background(&mut self) {
        self.click(self.grid);
    }

    /// Everything the host did so far
    pub fn journal(&self) -> &[HostAction] {
        &self.journal
    }

    /// Titles written by the host's save path, in order
    pub fn saves(&self) -> Vec<(EventId, String)> {
        self.journal
            .iter()
            .filter_map(|a| match a {
                HostAction::Saved { event, title } => Some((*event, title.clone())),
                _ => None,
            })
            .collect()
    }

    /// Number of document mutations so far (of every kind)
    pub fn mutation_count(&self) -> usize {
        self.mutations
    }

    pub fn has_stylesheet(&self, id: &str) -> bool {
        self.stylesheets.contains_key(id)
    }

    pub fn popover_open(&self) -> bool {
        self.popover.is_some()
    }

    pub fn modal_open(&self) -> bool {
        self.modal.is_some()
    }

    /// Overlays exist but are hidden by an injected stylesheet
    pub fn overlays_hidden(&self) -> bool {
        let hidden_by = |css: &String| {
            self.selectors
                .overlays
                .iter()
                .any(|sel| css.contains(sel.as_str()))
        };
        self.stylesheets.values().any(hidden_by)
    }

    /// Entry node currently showing `event`
    pub fn entry_for(&self, event: EventId) -> Option<NodeId> {
        self.walk(self.grid)
            .into_iter()
            .find(|id| self.nodes.get(id).is_some_and(|n| n.event == Some(event)))
    }

    /// Snapshot of every rendered entry in document order
    pub fn entry_views(&self) -> Vec<EntryView> {
        let mut views = Vec::new();
        for &entry in self.nodes.get(&self.grid).map_or(&[][..], |n| n.children.as_slice()) {
            let Some(node) = self.nodes.get(&entry) else {
                continue;
            };
            let Some(event) = node.event else {
                continue;
            };
            let kind = self
                .events
                .get(&event)
                .map_or(EntryKind::AllDay, CalendarEvent::kind);
            let affordance = self.query(Some(entry), &self.selectors.affordance());
            let title = self
                .selectors
                .titles()
                .iter()
                .find_map(|sel| self.query(Some(entry), sel));
            let title_node = title.and_then(|t| self.nodes.get(&t));
            views.push(EntryView {
                node: entry,
                event,
                kind,
                start: self.events.get(&event).and_then(|e| e.start),
                glyph: affordance.and_then(|a| self.nodes.get(&a)).and_then(|n| n.glyph),
                title: title_node.map(|n| n.text.clone()).unwrap_or_default(),
                struck: title_node
                    .and_then(|n| n.style.get("text-decoration"))
                    .is_some_and(|s| s.value == "line-through"),
                title_opacity: title_node
                    .and_then(|n| n.style.get("opacity"))
                    .map(|s| s.value.clone()),
                entry_opacity: node.style.get("opacity").map(|s| s.value.clone()),
            });
        }
        views
    }

    /// Deterministic text rendering of the whole document
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_node(self.root, 0, &mut out);
        for (id, css) in &self.stylesheets {
            let _ = writeln!(out, "<style id={id}> {css}");
        }
        out
    }

    fn dump_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let _ = write!(out, "{}<{}", "  ".repeat(depth), node.tag);
        if let Some(i) = &node.id_attr {
            let _ = write!(out, " id={i}");
        }
        if !node.classes.is_empty() {
            let _ = write!(out, " class={}", node.classes.join("."));
        }
        for (k, v) in &node.attrs {
            let _ = write!(out, " {k}={v:?}");
        }
        for (k, v) in &node.data {
            let _ = write!(out, " data-{k}={v:?}");
        }
        for (k, v) in &node.style {
            let bang = if v.important { " !important" } else { "" };
            let _ = write!(out, " style:{k}={}{bang}", v.value);
        }
        if let Some(glyph) = node.glyph {
            let _ = write!(out, " glyph={}", glyph.symbol());
        }
        let _ = write!(out, ">");
        if !node.text.is_empty() {
            let _ = write!(out, " {:?}", node.text);
        }
        out.push('\n');
        for child in &node.children {
            self.dump_node(*child, depth + 1, out);
        }
    }

    // -----------------------------------------------------------------------
    // Host-side click handling
    // -----------------------------------------------------------------------

    fn click(&mut self, target: NodeId) {
        if !self.is_attached(target) {
            return;
        }
        // Document-level capture listeners see the click first
        self.send(HostEvent::Click { target });

        if self.matches_selector(target, &self.selectors.edit_trigger) {
            self.open_modal();
            return;
        }
        if self.matches_selector(target, &self.selectors.save_control) {
            self.commit_modal();
            return;
        }
        let entry = self
            .closest(target, &self.selectors.all_day_entry)
            .or_else(|| self.closest(target, &self.selectors.timed_entry));
        match entry.and_then(|e| self.nodes.get(&e)).and_then(|n| n.event) {
            Some(event) => self.open_popover(event),
            None => {
                let in_overlay = self.popover.as_ref().is_some_and(|p| self.contains(p.node, target))
                    || self.modal.as_ref().is_some_and(|m| self.contains(m.node, target));
                if !in_overlay {
                    self.close_popover();
                }
            }
        }
    }

    fn open_popover(&mut self, event: EventId) {
        self.close_popover();
        let popover = self.alloc("div", &["eventpopover"]);
        if !self.quirks.omit_edit_trigger {
            let edit = self.alloc_from_selector("button", &self.selectors.edit_trigger.clone());
            self.append(popover, edit);
        }
        self.append(self.root, popover);
        self.popover = Some(Popover {
            node: popover,
            event,
        });
        self.journal.push(HostAction::PopoverOpened { event });
        self.notify_mutation(MutationRecord::child_list(self.root, 1));
    }

    fn close_popover(&mut self) {
        if let Some(p) = self.popover.take() {
            self.detach(p.node);
        }
    }

    fn open_modal(&mut self) {
        let Some(event) = self.popover.as_ref().map(|p| p.event) else {
            return;
        };
        self.close_popover();
        let title = self
            .events
            .get(&event)
            .map(|e| e.title.clone())
            .unwrap_or_default();

        let modal = self.alloc("div", &["modal-two"]);
        if let Some(node) = self.nodes.get_mut(&modal) {
            node.attrs.insert("role".into(), "dialog".into());
        }
        if !self.quirks.omit_title_input {
            let input = self.alloc_from_selector("input", &self.selectors.title_input.clone());
            if let Some(node) = self.nodes.get_mut(&input) {
                node.value = title.clone();
                node.tracked_value = title.clone();
            }
            self.append(modal, input);
        }
        if !self.quirks.omit_save_control {
            let save = self.alloc_from_selector("button", &self.selectors.save_control.clone());
            self.append(modal, save);
        }
        self.append(self.root, modal);
        self.modal = Some(Modal {
            node: modal,
            event,
            draft: title,
        });
        self.journal.push(HostAction::ModalOpened { event });
        self.notify_mutation(MutationRecord::child_list(self.root, 1));
    }

    fn commit_modal(&mut self) {
        let Some(modal) = self.modal.take() else {
            return;
        };
        self.detach(modal.node);
        if let Some(ev) = self.events.get_mut(&modal.event)
            && ev.title != modal.draft
        {
            ev.title = modal.draft.clone();
            self.journal.push(HostAction::Saved {
                event: modal.event,
                title: modal.draft,
            });
        }
        self.render_calendar();
    }

    // -----------------------------------------------------------------------
    // Tree plumbing
    // -----------------------------------------------------------------------

    fn alloc(&mut self, tag: &str, classes: &[&str]) -> NodeId {
        self.next_node += 1;
        let id = NodeId(self.next_node);
        self.nodes.insert(
            id,
            SimNode {
                tag: tag.to_string(),
                classes: classes
                    .iter()
                    .filter(|c| !c.is_empty())
                    .map(|c| c.to_string())
                    .collect(),
                ..SimNode::default()
            },
        );
        id
    }

    /// Allocate an element that satisfies `selector`
    fn alloc_from_selector(&mut self, default_tag: &str, selector: &str) -> NodeId {
        let parsed = Selector::parse(selector).unwrap_or_default();
        let tag = parsed.tag.clone().unwrap_or_else(|| default_tag.to_string());
        let classes: Vec<&str> = parsed.classes.iter().map(String::as_str).collect();
        let id = self.alloc(&tag, &classes);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.id_attr = parsed.id.clone();
            for (k, v) in parsed.attrs {
                node.attrs.insert(k, v.unwrap_or_default());
            }
        }
        id
    }

    fn append(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(child);
        }
    }

    fn detach(&mut self, node: NodeId) {
        let parent = self.nodes.get(&node).and_then(|n| n.parent);
        if let Some(parent) = parent
            && let Some(p) = self.nodes.get_mut(&parent)
        {
            p.children.retain(|c| *c != node);
            self.drop_subtree(node);
            self.notify_mutation(MutationRecord::child_list(parent, 0));
        }
    }

    fn drop_subtree(&mut self, node: NodeId) {
        if let Some(removed) = self.nodes.remove(&node) {
            for child in removed.children {
                self.drop_subtree(child);
            }
        }
    }

    fn node_mut_or_default(&mut self, id: NodeId) -> &mut SimNode {
        self.nodes.entry(id).or_default()
    }

    /// Descendants of `scope` in document order, excluding `scope`
    fn walk(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self
            .nodes
            .get(&scope)
            .map(|n| n.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(node) = self.nodes.get(&id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(&id).and_then(|n| n.parent);
        }
        false
    }

    fn matches_selector(&self, node: NodeId, selector: &str) -> bool {
        match (Selector::parse(selector), self.nodes.get(&node)) {
            (Ok(sel), Some(n)) => sel.matches(n),
            _ => false,
        }
    }

    fn parse_or_warn(selector: &str) -> Option<Selector> {
        match Selector::parse(selector) {
            Ok(sel) => Some(sel),
            Err(e) => {
                tracing::warn!("unsupported selector {:?}: {}", selector, e);
                None
            }
        }
    }

    fn send(&self, event: HostEvent) {
        if let Some(tx) = &self.notifier {
            let _ = tx.send(event);
        }
    }

    fn notify_mutation(&mut self, record: MutationRecord) {
        self.mutations += 1;
        self.send(HostEvent::Mutated(record));
    }
}

/// Class name named by a single-class selector such as `.calendar-eventcell`
fn class_of(selector: &str) -> String {
    Selector::parse(selector)
        .ok()
        .and_then(|s| s.classes.into_iter().next())
        .unwrap_or_default()
}

impl Host for SimHost {
    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        let Some(sel) = Self::parse_or_warn(selector) else {
            return Vec::new();
        };
        self.walk(self.root)
            .into_iter()
            .filter(|id| self.nodes.get(id).is_some_and(|n| sel.matches(n)))
            .collect()
    }

    fn query(&self, scope: Option<NodeId>, selector: &str) -> Option<NodeId> {
        let sel = Self::parse_or_warn(selector)?;
        self.walk(scope.unwrap_or(self.root))
            .into_iter()
            .find(|id| self.nodes.get(id).is_some_and(|n| sel.matches(n)))
    }

    fn closest(&self, node: NodeId, selector: &str) -> Option<NodeId> {
        let sel = Self::parse_or_warn(selector)?;
        let mut current = Some(node);
        while let Some(id) = current {
            let n = self.nodes.get(&id)?;
            if sel.matches(n) {
                return Some(id);
            }
            current = n.parent;
        }
        None
    }

    fn is_attached(&self, node: NodeId) -> bool {
        self.contains(self.root, node)
    }

    fn text(&self, node: NodeId) -> Option<String> {
        self.nodes.get(&node).map(|n| n.text.clone())
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        let Some(n) = self.nodes.get_mut(&node) else {
            return;
        };
        if n.text != text {
            n.text = text.to_string();
            self.notify_mutation(MutationRecord::child_list(node, 1));
        }
    }

    fn data(&self, node: NodeId, key: &str) -> Option<String> {
        self.nodes.get(&node).and_then(|n| n.data.get(key).cloned())
    }

    fn set_data(&mut self, node: NodeId, key: &str, value: &str) {
        let Some(n) = self.nodes.get_mut(&node) else {
            return;
        };
        if n.data.get(key).map(String::as_str) != Some(value) {
            n.data.insert(key.to_string(), value.to_string());
            self.notify_mutation(MutationRecord::attributes(node));
        }
    }

    fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.nodes
            .get(&node)
            .and_then(|n| n.style.get(property))
            .map(|s| s.value.clone())
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str, important: bool) {
        let Some(n) = self.nodes.get_mut(&node) else {
            return;
        };
        let new = StyleValue {
            value: value.to_string(),
            important,
        };
        if n.style.get(property) != Some(&new) {
            n.style.insert(property.to_string(), new);
            self.notify_mutation(MutationRecord::attributes(node));
        }
    }

    fn remove_style(&mut self, node: NodeId, property: &str) {
        if let Some(n) = self.nodes.get_mut(&node)
            && n.style.remove(property).is_some()
        {
            self.notify_mutation(MutationRecord::attributes(node));
        }
    }

    fn reflow(&mut self, _node: NodeId) {}

    fn create_element(&mut self, tag: &str, class: &str) -> NodeId {
        self.alloc(tag, &[class])
    }

    fn insert_before(&mut self, node: NodeId, reference: NodeId) {
        let Some(parent) = self.nodes.get(&reference).and_then(|n| n.parent) else {
            return;
        };
        if !self.nodes.contains_key(&node) {
            return;
        }
        let old_parent = self.nodes.get(&node).and_then(|n| n.parent);
        if let Some(old) = old_parent
            && let Some(p) = self.nodes.get_mut(&old)
        {
            p.children.retain(|c| *c != node);
        }
        if let Some(p) = self.nodes.get_mut(&parent) {
            let pos = p
                .children
                .iter()
                .position(|c| *c == reference)
                .unwrap_or(p.children.len());
            p.children.insert(pos, node);
        }
        if let Some(n) = self.nodes.get_mut(&node) {
            n.parent = Some(parent);
        }
        self.notify_mutation(MutationRecord::child_list(parent, 1));
    }

    fn set_glyph(&mut self, node: NodeId, glyph: Glyph) {
        let Some(n) = self.nodes.get_mut(&node) else {
            return;
        };
        if n.glyph != Some(glyph) {
            n.glyph = Some(glyph);
            self.notify_mutation(MutationRecord::child_list(node, 1));
        }
    }

    fn bounding_rect(&self, node: NodeId) -> Option<Rect> {
        self.nodes.get(&node).and_then(|n| n.rect)
    }

    fn dispatch_pointer(&mut self, node: NodeId, event: PointerEvent) {
        if !self.is_attached(node) {
            return;
        }
        self.journal.push(HostAction::Pointer {
            node,
            kind: event.kind,
        });
        if event.kind == PointerKind::Click {
            self.click(node);
        }
    }

    fn activate(&mut self, node: NodeId) {
        if !self.is_attached(node) {
            return;
        }
        self.journal.push(HostAction::Activated { node });
        self.click(node);
    }

    fn set_value_native(&mut self, node: NodeId, value: &str) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.value = value.to_string();
        }
    }

    fn dispatch_field_event(&mut self, node: NodeId, _event: FieldEvent) {
        let Some(n) = self.nodes.get_mut(&node) else {
            return;
        };
        // The framework only reacts when the DOM value moved away from the
        // value it last saw
        if n.value == n.tracked_value {
            return;
        }
        n.tracked_value = n.value.clone();
        let value = n.value.clone();
        if let Some(modal) = &mut self.modal
            && self
                .nodes
                .get(&modal.node)
                .is_some_and(|m| m.children.contains(&node))
        {
            modal.draft = value;
        }
    }

    fn add_stylesheet(&mut self, id: &str, css: &str) {
        self.stylesheets.insert(id.to_string(), css.to_string());
        self.notify_mutation(MutationRecord::child_list(self.root, 1));
    }

    fn remove_stylesheet(&mut self, id: &str) {
        if self.stylesheets.shift_remove(id).is_some() {
            self.notify_mutation(MutationRecord::child_list(self.root, 0));
        }
    }
}

impl SimHost {
    /// Write an input's value the way the host framework itself would,
    /// updating its tracked value too. Later input events see no change.
    pub fn set_value_tracked(&mut self, node: NodeId, value: &str) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.value = value.to_string();
            n.tracked_value = value.to_string();
        }
    }
}
