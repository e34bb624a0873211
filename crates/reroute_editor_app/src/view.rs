// SPDX-License-Identifier: MIT OR Apache-2.0
//! View layer: the editor-side state that sits on top of the graph model.
//!
//! The view owns everything the model does not care about:
//! - Node placement and bring-to-front stacking order
//! - A mirror of each connection's reroute path, kept in sync from events
//! - The selector, subscribed to the graph
//!
//! User gestures arrive as [`Gesture`] values and are translated into model
//! operations. Rendering and hit-testing happen elsewhere; by the time a
//! gesture reaches this module its targets are already resolved to IDs.

use indexmap::IndexMap;
use parking_lot::Mutex;
use reroute_editor_graph::{
    ConnectionId, Graph, GraphEvent, GraphObserver, Missing, NodeId, Point, Result, SelectableId,
    Selector, SubscriptionId, WaypointId,
};
use std::sync::Arc;

/// Something the user can open a context menu on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextTarget {
    /// A node
    Node(NodeId),
    /// A connection
    Connection(ConnectionId),
    /// A reroute pin
    Waypoint(WaypointId),
}

/// A resolved user gesture
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    /// Drag from an output socket and release over an input socket
    ConnectSockets {
        /// Source node and output port
        from: (NodeId, String),
        /// Target node and input port
        to: (NodeId, String),
    },
    /// Drag on a connection's path to create a reroute pin
    BendConnection {
        /// Connection being bent
        connection: ConnectionId,
        /// Where the pin is dropped
        at: Point,
        /// Path index for the pin; `None` appends
        index: Option<usize>,
    },
    /// Drag a reroute pin
    DragWaypoint {
        /// Dragged pin
        waypoint: WaypointId,
        /// Horizontal offset
        dx: f32,
        /// Vertical offset
        dy: f32,
    },
    /// Drag a node
    DragNode {
        /// Dragged node
        node: NodeId,
        /// Horizontal offset
        dx: f32,
        /// Vertical offset
        dy: f32,
    },
    /// Press on a node or pin
    PointerDown(SelectableId),
    /// Press on empty canvas
    BackgroundClick,
    /// Context-menu delete
    ContextMenu(ContextTarget),
    /// Delete everything selected
    DeleteSelected,
    /// Accumulation modifier (Ctrl) pressed or released
    ModifierChanged(bool),
}

/// What a gesture produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// A connection was created
    Connected(ConnectionId),
    /// A reroute pin was created
    PinAdded(WaypointId),
    /// Entities were removed
    Removed(usize),
    /// State changed without creating anything
    Updated,
}

/// Mirrored routing and placement state
#[derive(Debug, Default)]
struct ViewState {
    /// Unsnapped node positions in graph space; drags accumulate here
    positions: IndexMap<NodeId, Point>,
    /// Node stacking order, bottom first
    order: Vec<NodeId>,
    /// Reroute pins per connection, in path order
    paths: IndexMap<ConnectionId, Vec<(WaypointId, Point)>>,
}

impl ViewState {
    fn bring_to_front(&mut self, node: NodeId) {
        if let Some(index) = self.order.iter().position(|&n| n == node) {
            let node = self.order.remove(index);
            self.order.push(node);
        }
    }

    fn pin_mut(&mut self, waypoint: WaypointId) -> Option<&mut (WaypointId, Point)> {
        self.paths
            .values_mut()
            .flat_map(|path| path.iter_mut())
            .find(|(id, _)| *id == waypoint)
    }
}

impl GraphObserver for ViewState {
    fn on_event(&mut self, event: &GraphEvent) {
        match event {
            GraphEvent::NodeAdded(node) => {
                self.positions.entry(node.id).or_default();
                self.order.push(node.id);
            }
            GraphEvent::NodeRemoved(id) => {
                self.positions.shift_remove(id);
                self.order.retain(|n| n != id);
            }
            GraphEvent::ConnectionAdded(connection) => {
                self.paths.insert(connection.id, Vec::new());
            }
            GraphEvent::ConnectionRemoved(id) => {
                self.paths.shift_remove(id);
            }
            GraphEvent::WaypointAdded {
                connection,
                index,
                waypoint,
            } => {
                if let Some(path) = self.paths.get_mut(connection) {
                    let at = (*index).min(path.len());
                    path.insert(at, (waypoint.id, waypoint.position));
                }
            }
            GraphEvent::WaypointMoved { waypoint, position } => {
                if let Some(pin) = self.pin_mut(*waypoint) {
                    pin.1 = *position;
                }
            }
            GraphEvent::WaypointRemoved(id) => {
                for path in self.paths.values_mut() {
                    path.retain(|(pin, _)| pin != id);
                }
            }
            GraphEvent::ControlChanged { .. } => {}
        }
    }
}

/// Editor view attached to one graph
#[derive(Debug)]
pub struct ViewLayer {
    state: Arc<Mutex<ViewState>>,
    selector: Arc<Mutex<Selector>>,
    subscriptions: [SubscriptionId; 2],
    /// Grid size for node snapping; `None` disables snapping
    pub snap_size: Option<f32>,
}

impl ViewLayer {
    /// Create a view and subscribe it (and its selector) to `graph`
    ///
    /// Nodes already in the graph are adopted at the origin.
    pub fn attach(graph: &mut Graph) -> Self {
        let mut state = ViewState::default();
        for node in graph.nodes() {
            state.positions.insert(node.id, Point::default());
            state.order.push(node.id);
        }
        for connection in graph.connections(None) {
            let pins = graph
                .waypoints(connection.id)
                .unwrap_or_default()
                .iter()
                .map(|w| (w.id, w.position))
                .collect();
            state.paths.insert(connection.id, pins);
        }

        let state = Arc::new(Mutex::new(state));
        let selector = Selector::shared();
        let subscriptions = [
            graph.subscribe(Arc::clone(&state)),
            graph.subscribe(Arc::clone(&selector)),
        ];
        tracing::debug!(nodes = graph.node_count(), "view attached");
        Self {
            state,
            selector,
            subscriptions,
            snap_size: None,
        }
    }

    /// Unsubscribe from the graph
    pub fn detach(self, graph: &mut Graph) {
        for id in self.subscriptions {
            graph.unsubscribe(id);
        }
        tracing::debug!("view detached");
    }

    /// Shared selector handle
    pub fn selector(&self) -> Arc<Mutex<Selector>> {
        Arc::clone(&self.selector)
    }

    /// Check if an entity is selected
    pub fn is_selected(&self, id: impl Into<SelectableId>) -> bool {
        self.selector.lock().contains(id)
    }

    /// Set a node's absolute position
    pub fn place_node(&self, node: NodeId, position: Point) {
        let mut state = self.state.lock();
        if let Some(slot) = state.positions.get_mut(&node) {
            *slot = position;
        }
    }

    /// Move a node by an offset
    ///
    /// Offsets add up on the unsnapped position, so a run of drags smaller
    /// than one grid cell still moves the node once they cross a cell edge.
    pub fn translate_node(&self, node: NodeId, dx: f32, dy: f32) -> bool {
        let mut state = self.state.lock();
        match state.positions.get_mut(&node) {
            Some(position) => {
                *position = position.translated(dx, dy);
                true
            }
            None => false,
        }
    }

    /// A node's position, snapped to the grid when snapping is on
    pub fn node_position(&self, node: NodeId) -> Option<Point> {
        let raw = self.state.lock().positions.get(&node).copied()?;
        Some(self.snap(raw))
    }

    /// Node stacking order, bottom first
    pub fn node_order(&self) -> Vec<NodeId> {
        self.state.lock().order.clone()
    }

    /// Mirrored reroute path of a connection
    pub fn path(&self, connection: ConnectionId) -> Option<Vec<Point>> {
        self.state
            .lock()
            .paths
            .get(&connection)
            .map(|pins| pins.iter().map(|(_, p)| *p).collect())
    }

    fn snap(&self, position: Point) -> Point {
        match self.snap_size {
            Some(size) if size > 0.0 => Point::new(
                (position.x / size).round() * size,
                (position.y / size).round() * size,
            ),
            _ => position,
        }
    }

    /// Apply a gesture to the graph
    pub fn handle(&self, graph: &mut Graph, gesture: Gesture) -> Result<GestureOutcome> {
        tracing::trace!(?gesture, "gesture");
        match gesture {
            Gesture::ConnectSockets { from, to } => {
                let id = graph.add_connection(from.0, &from.1, to.0, &to.1)?;
                Ok(GestureOutcome::Connected(id))
            }
            Gesture::BendConnection {
                connection,
                at,
                index,
            } => {
                let id = graph.add_waypoint(connection, at, index)?;
                self.selector.lock().pick(id);
                Ok(GestureOutcome::PinAdded(id))
            }
            Gesture::DragWaypoint { waypoint, dx, dy } => {
                graph.translate_waypoint(waypoint, dx, dy)?;
                Ok(GestureOutcome::Updated)
            }
            Gesture::DragNode { node, dx, dy } => {
                if !self.translate_node(node, dx, dy) {
                    return Err(Missing::Node(node).into());
                }
                Ok(GestureOutcome::Updated)
            }
            Gesture::PointerDown(target) => {
                let exists = match target {
                    SelectableId::Node(id) => graph.node(id).is_some(),
                    SelectableId::Waypoint(id) => graph.waypoint(id).is_some(),
                };
                if !exists {
                    return Err(missing(target).into());
                }
                if let SelectableId::Node(id) = target {
                    self.state.lock().bring_to_front(id);
                }
                self.selector.lock().pick(target);
                Ok(GestureOutcome::Updated)
            }
            Gesture::BackgroundClick => {
                self.selector.lock().clear();
                Ok(GestureOutcome::Updated)
            }
            Gesture::ContextMenu(target) => {
                match target {
                    ContextTarget::Node(id) => graph.remove_node(id)?,
                    ContextTarget::Connection(id) => graph.remove_connection(id)?,
                    ContextTarget::Waypoint(id) => graph.remove_waypoint(id)?,
                }
                Ok(GestureOutcome::Removed(1))
            }
            Gesture::DeleteSelected => {
                let targets: Vec<SelectableId> = self.selector.lock().iter().copied().collect();
                let mut removed = 0;
                for target in targets {
                    // An earlier node removal may already have taken this pin
                    let result = match target {
                        SelectableId::Node(id) => graph.remove_node(id),
                        SelectableId::Waypoint(id) if graph.waypoint(id).is_some() => {
                            graph.remove_waypoint(id)
                        }
                        SelectableId::Waypoint(_) => continue,
                    };
                    result?;
                    removed += 1;
                }
                Ok(GestureOutcome::Removed(removed))
            }
            Gesture::ModifierChanged(held) => {
                self.selector.lock().set_accumulating(held);
                Ok(GestureOutcome::Updated)
            }
        }
    }
}

fn missing(target: SelectableId) -> Missing {
    match target {
        SelectableId::Node(id) => Missing::Node(id),
        SelectableId::Waypoint(id) => Missing::Waypoint(id),
    }
}
