//! The boundary to the host calendar application.
//!
//! The engine never touches the host document directly. Everything it reads
//! or writes goes through [`Host`], addressed by the selector strings in
//! [`crate::model::Selectors`]; everything the host wants the engine to know
//! arrives as a [`HostEvent`].

pub mod selector;
pub mod sim;

use crate::model::{Glyph, NodeId, Rect};

pub use sim::SimHost;

/// Operations the engine needs from the host document.
///
/// Writes to a node that is no longer attached are ignored, because the host
/// may replace any entry between two calls.
pub trait Host: Send + 'static {
    /// All attached nodes matching `selector`, in document order
    fn query_all(&self, selector: &str) -> Vec<NodeId>;
    /// First node matching `selector` inside `scope` (excluding `scope`
    /// itself), or anywhere in the document when `scope` is `None`
    fn query(&self, scope: Option<NodeId>, selector: &str) -> Option<NodeId>;
    /// Nearest ancestor-or-self of `node` matching `selector`
    fn closest(&self, node: NodeId, selector: &str) -> Option<NodeId>;
    fn is_attached(&self, node: NodeId) -> bool;

    /// Text content of a node
    fn text(&self, node: NodeId) -> Option<String>;
    fn set_text(&mut self, node: NodeId, text: &str);

    /// `data-*` attribute
    fn data(&self, node: NodeId, key: &str) -> Option<String>;
    fn set_data(&mut self, node: NodeId, key: &str, value: &str);

    /// Inline style property
    fn style(&self, node: NodeId, property: &str) -> Option<String>;
    fn set_style(&mut self, node: NodeId, property: &str, value: &str, important: bool);
    fn remove_style(&mut self, node: NodeId, property: &str);
    /// Force the host to apply pending style changes before the next write
    fn reflow(&mut self, node: NodeId);

    /// Create a detached element carrying `class`
    fn create_element(&mut self, tag: &str, class: &str) -> NodeId;
    /// Insert `node` as the previous sibling of `reference`
    fn insert_before(&mut self, node: NodeId, reference: NodeId);
    fn set_glyph(&mut self, node: NodeId, glyph: Glyph);

    fn bounding_rect(&self, node: NodeId) -> Option<Rect>;
    /// Dispatch a synthetic pointer event at viewport coordinates
    fn dispatch_pointer(&mut self, node: NodeId, event: PointerEvent);
    /// Activate a control as if by `element.click()`
    fn activate(&mut self, node: NodeId);
    /// Write an input's value through the native setter, bypassing any
    /// framework value tracking
    fn set_value_native(&mut self, node: NodeId, value: &str);
    fn dispatch_field_event(&mut self, node: NodeId, event: FieldEvent);

    fn add_stylesheet(&mut self, id: &str, css: &str);
    fn remove_stylesheet(&mut self, id: &str);
}

/// Notifications pushed from the host to the engine
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// The document changed
    Mutated(MutationRecord),
    /// A click reached the document (capture phase, before host handlers)
    Click { target: NodeId },
    /// A checkbox affordance was clicked; the click does not reach the host
    AffordanceClick { affordance: NodeId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    ChildList,
    CharacterData,
    Attributes,
}

/// One observed document change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationRecord {
    pub kind: MutationKind,
    pub target: NodeId,
    pub added_nodes: usize,
}

impl MutationRecord {
    pub fn child_list(target: NodeId, added_nodes: usize) -> Self {
        MutationRecord {
            kind: MutationKind::ChildList,
            target,
            added_nodes,
        }
    }

    pub fn character_data(target: NodeId) -> Self {
        MutationRecord {
            kind: MutationKind::CharacterData,
            target,
            added_nodes: 0,
        }
    }

    pub fn attributes(target: NodeId) -> Self {
        MutationRecord {
            kind: MutationKind::Attributes,
            target,
            added_nodes: 0,
        }
    }

    /// Whether this change can invalidate rendered affordances
    pub fn requires_rescan(&self) -> bool {
        self.added_nodes > 0
            || matches!(
                self.kind,
                MutationKind::ChildList | MutationKind::CharacterData
            )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Up,
    Click,
}

/// Synthetic primary-button pointer event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub x: f64,
    pub y: f64,
}

impl PointerEvent {
    /// Full press sequence at one point: down, up, click
    pub fn press_sequence(x: f64, y: f64) -> [PointerEvent; 3] {
        [PointerKind::Down, PointerKind::Up, PointerKind::Click].map(|kind| PointerEvent {
            kind,
            x,
            y,
        })
    }
}

/// Field-level notification telling the host framework a value changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEvent {
    Input,
    Change,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualifying_mutations() {
        let node = NodeId(1);
        assert!(MutationRecord::child_list(node, 0).requires_rescan());
        assert!(MutationRecord::child_list(node, 2).requires_rescan());
        assert!(MutationRecord::character_data(node).requires_rescan());
        assert!(!MutationRecord::attributes(node).requires_rescan());
    }

    #[test]
    fn test_press_sequence_order() {
        let kinds: Vec<PointerKind> = PointerEvent::press_sequence(1.0, 2.0)
            .iter()
            .map(|e| e.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![PointerKind::Down, PointerKind::Up, PointerKind::Click]
        );
    }
}
