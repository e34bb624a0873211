// SPDX-License-Identifier: MIT OR Apache-2.0
//! Selection tracking for nodes and reroute pins.
//!
//! The selector subscribes to graph notifications so that removed entities
//! drop out of the selection without the view layer having to intervene.

use crate::event::{GraphEvent, GraphObserver};
use crate::node::NodeId;
use crate::reroute::WaypointId;
use indexmap::IndexSet;
use parking_lot::Mutex;
use std::sync::Arc;

/// Anything the user can select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectableId {
    /// A node
    Node(NodeId),
    /// A reroute pin
    Waypoint(WaypointId),
}

impl From<NodeId> for SelectableId {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

impl From<WaypointId> for SelectableId {
    fn from(id: WaypointId) -> Self {
        Self::Waypoint(id)
    }
}

/// How a new pick combines with the current selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectMode {
    /// Replace current selection
    #[default]
    Exclusive,
    /// Add to current selection (modifier held)
    Accumulate,
}

/// Currently selected entities
#[derive(Debug, Clone, Default)]
pub struct Selector {
    selected: IndexSet<SelectableId>,
    accumulating: bool,
}

impl Selector {
    /// Create a new empty selector
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a selector behind a shared handle, ready to subscribe to a graph
    pub fn shared() -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Select an entity
    ///
    /// Re-selecting an entity moves it to the primary position.
    pub fn select(&mut self, id: impl Into<SelectableId>, mode: SelectMode) {
        let id = id.into();
        if mode == SelectMode::Exclusive {
            self.selected.clear();
        }
        self.selected.shift_remove(&id);
        self.selected.insert(id);
    }

    /// Set whether the accumulation modifier is held
    pub fn set_accumulating(&mut self, held: bool) {
        self.accumulating = held;
    }

    /// Mode implied by the modifier state
    pub fn mode(&self) -> SelectMode {
        if self.accumulating {
            SelectMode::Accumulate
        } else {
            SelectMode::Exclusive
        }
    }

    /// Select using the mode implied by the modifier state
    pub fn pick(&mut self, id: impl Into<SelectableId>) {
        let mode = self.mode();
        self.select(id, mode);
    }

    /// Remove an entity from the selection
    pub fn unselect(&mut self, id: impl Into<SelectableId>) -> bool {
        self.selected.shift_remove(&id.into())
    }

    /// Clear the selection
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Check if an entity is selected
    pub fn contains(&self, id: impl Into<SelectableId>) -> bool {
        self.selected.contains(&id.into())
    }

    /// Check if the selection is empty
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Get the number of selected entities
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Iterate over selected entities, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &SelectableId> {
        self.selected.iter()
    }

    /// Get the primary (most recently selected) entity
    pub fn primary(&self) -> Option<&SelectableId> {
        self.selected.last()
    }
}

impl GraphObserver for Selector {
    fn on_event(&mut self, event: &GraphEvent) {
        let removed = match event {
            GraphEvent::NodeRemoved(id) => SelectableId::Node(*id),
            GraphEvent::WaypointRemoved(id) => SelectableId::Waypoint(*id),
            _ => return,
        };
        if self.selected.shift_remove(&removed) {
            tracing::trace!(?removed, "dropped removed entity from selection");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusive_replaces() {
        let (x, y) = (NodeId::new(), NodeId::new());
        let mut selector = Selector::new();
        selector.select(y, SelectMode::Exclusive);
        selector.select(x, SelectMode::Exclusive);

        assert_eq!(selector.len(), 1);
        assert!(selector.contains(x));
        assert!(!selector.contains(y));
    }

    #[test]
    fn test_accumulate_adds() {
        let (x, y) = (NodeId::new(), NodeId::new());
        let mut selector = Selector::new();
        selector.select(y, SelectMode::Exclusive);
        selector.select(x, SelectMode::Accumulate);

        assert_eq!(selector.len(), 2);
        assert!(selector.contains(x) && selector.contains(y));
        assert_eq!(selector.primary(), Some(&SelectableId::Node(x)));
    }

    #[test]
    fn test_pick_follows_modifier() {
        let (x, y) = (NodeId::new(), WaypointId::new());
        let mut selector = Selector::new();
        selector.pick(x);
        selector.set_accumulating(true);
        selector.pick(y);
        assert_eq!(selector.len(), 2);

        selector.set_accumulating(false);
        selector.pick(y);
        assert_eq!(selector.iter().copied().collect::<Vec<_>>(), [SelectableId::Waypoint(y)]);
    }

    #[test]
    fn test_reselect_moves_to_primary() {
        let (x, y) = (NodeId::new(), NodeId::new());
        let mut selector = Selector::new();
        selector.select(x, SelectMode::Accumulate);
        selector.select(y, SelectMode::Accumulate);
        selector.select(x, SelectMode::Accumulate);
        assert_eq!(selector.primary(), Some(&SelectableId::Node(x)));
        assert_eq!(selector.len(), 2);
    }

    #[test]
    fn test_removal_events_prune_selection() {
        let node = NodeId::new();
        let pin = WaypointId::new();
        let other = NodeId::new();
        let mut selector = Selector::new();
        selector.select(node, SelectMode::Accumulate);
        selector.select(pin, SelectMode::Accumulate);
        selector.select(other, SelectMode::Accumulate);

        selector.on_event(&GraphEvent::NodeRemoved(node));
        selector.on_event(&GraphEvent::WaypointRemoved(pin));

        assert_eq!(selector.iter().copied().collect::<Vec<_>>(), [SelectableId::Node(other)]);
        assert!(selector.unselect(other));
        assert!(selector.is_empty());
    }
}
