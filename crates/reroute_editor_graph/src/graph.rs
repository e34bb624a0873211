// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes, connections and reroute waypoints.

use crate::connection::{Connection, ConnectionId};
use crate::event::{GraphEvent, GraphObserver, SubscriptionId};
use crate::node::{ControlKind, ControlValue, Node, NodeId};
use crate::port::SocketKind;
use crate::reroute::{Point, Reroutes, Waypoint, WaypointId};
use indexmap::IndexMap;
use std::fmt;

/// Result type for graph operations
pub type Result<T> = std::result::Result<T, GraphError>;

/// A node graph
///
/// Every mutating operation validates first and mutates second, so a failed
/// call leaves the graph and its observers untouched. Successful mutations are
/// reported to subscribers before the call returns.
#[derive(Default)]
pub struct Graph {
    /// Nodes in the graph
    nodes: IndexMap<NodeId, Node>,
    /// Connections between nodes
    connections: IndexMap<ConnectionId, Connection>,
    /// Waypoints per connection
    reroutes: Reroutes,
    /// Change subscribers
    observers: Vec<(SubscriptionId, Box<dyn GraphObserver>)>,
    next_subscription: u64,
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("nodes", &self.nodes.len())
            .field("connections", &self.connections.len())
            .field("waypoints", &self.reroutes.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Graph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a change observer
    ///
    /// The observer must not call back into this graph while handling an
    /// event; see the [`event`](crate::event) module.
    pub fn subscribe(&mut self, observer: impl GraphObserver + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Detach an observer. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    fn emit(&mut self, event: GraphEvent) {
        tracing::trace!(event = event.name(), observers = self.observers.len(), "dispatch");
        for (_, observer) in &mut self.observers {
            observer.on_event(&event);
        }
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, node: Node) -> Result<NodeId> {
        let id = node.id;
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateId(id));
        }
        tracing::debug!(node = %id, label = %node.label, "node added");
        self.nodes.insert(id, node.clone());
        self.emit(GraphEvent::NodeAdded(node));
        Ok(id)
    }

    /// Remove a node, its connections and their waypoints
    pub fn remove_node(&mut self, node_id: NodeId) -> Result<()> {
        if !self.nodes.contains_key(&node_id) {
            return Err(Missing::Node(node_id).into());
        }
        self.detach_node(node_id);
        Ok(())
    }

    /// Remove every node (and with them every connection and waypoint)
    pub fn clear(&mut self) {
        let ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        for id in ids {
            self.detach_node(id);
        }
    }

    /// Cascade-remove a node known to be present
    fn detach_node(&mut self, node_id: NodeId) {
        let incident: Vec<ConnectionId> = self
            .connections
            .values()
            .filter(|c| c.involves_node(node_id))
            .map(|c| c.id)
            .collect();
        for connection_id in incident {
            self.detach_connection(connection_id);
        }
        self.nodes.shift_remove(&node_id);
        tracing::debug!(node = %node_id, "node removed");
        self.emit(GraphEvent::NodeRemoved(node_id));
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get all nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Set the value of a node control
    pub fn set_control_value(
        &mut self,
        node_id: NodeId,
        key: &str,
        value: ControlValue,
    ) -> Result<()> {
        let node = self
            .nodes
            .get_mut(&node_id)
            .ok_or(GraphError::NotFound(Missing::Node(node_id)))?;
        let control = node.controls.get_mut(key).ok_or_else(|| Missing::Control {
            node: node_id,
            key: key.to_string(),
        })?;
        if control.readonly {
            return Err(GraphError::ReadOnlyControl {
                node: node_id,
                key: key.to_string(),
            });
        }
        if control.kind != value.kind() {
            return Err(GraphError::ControlTypeMismatch {
                expected: control.kind,
                found: value.kind(),
            });
        }
        control.value = value.clone();
        tracing::debug!(node = %node_id, key, "control changed");
        self.emit(GraphEvent::ControlChanged {
            node: node_id,
            key: key.to_string(),
            value,
        });
        Ok(())
    }

    /// Connect an output port to an input port
    ///
    /// Identical endpoint pairs may be connected more than once; each call
    /// yields a new connection.
    pub fn add_connection(
        &mut self,
        source: NodeId,
        source_output: &str,
        target: NodeId,
        target_input: &str,
    ) -> Result<ConnectionId> {
        let source_node = self.nodes.get(&source).ok_or(Missing::Node(source))?;
        let target_node = self.nodes.get(&target).ok_or(Missing::Node(target))?;

        let output = source_node
            .output(source_output)
            .ok_or_else(|| Missing::Output {
                node: source,
                key: source_output.to_string(),
            })?;
        let input = target_node
            .input(target_input)
            .ok_or_else(|| Missing::Input {
                node: target,
                key: target_input.to_string(),
            })?;

        if !output.can_connect(input) {
            return Err(GraphError::IncompatibleSocket {
                output: output.kind().clone(),
                input: input.kind().clone(),
            });
        }

        let connection = Connection::new(source, source_output, target, target_input);
        let id = connection.id;
        tracing::debug!(
            connection = %id,
            source = %source,
            source_output,
            target = %target,
            target_input,
            "connection added"
        );
        self.connections.insert(id, connection.clone());
        self.reroutes.track(id);
        self.emit(GraphEvent::ConnectionAdded(connection));
        Ok(id)
    }

    /// Remove a connection and its waypoints
    pub fn remove_connection(&mut self, connection_id: ConnectionId) -> Result<()> {
        if !self.connections.contains_key(&connection_id) {
            return Err(Missing::Connection(connection_id).into());
        }
        self.detach_connection(connection_id);
        Ok(())
    }

    /// Remove a connection known to exist, emitting waypoint removals first
    fn detach_connection(&mut self, connection_id: ConnectionId) {
        for waypoint in self.reroutes.untrack(connection_id) {
            self.emit(GraphEvent::WaypointRemoved(waypoint.id));
        }
        self.connections.shift_remove(&connection_id);
        tracing::debug!(connection = %connection_id, "connection removed");
        self.emit(GraphEvent::ConnectionRemoved(connection_id));
    }

    /// Get a connection by ID
    pub fn connection(&self, connection_id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&connection_id)
    }

    /// Get connections in creation order, optionally only those touching a node
    pub fn connections(&self, node: Option<NodeId>) -> impl Iterator<Item = &Connection> {
        self.connections
            .values()
            .filter(move |c| node.map_or(true, |id| c.involves_node(id)))
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Insert a waypoint into a connection's path
    ///
    /// `index` of `None` (or past the end) appends.
    pub fn add_waypoint(
        &mut self,
        connection_id: ConnectionId,
        position: Point,
        index: Option<usize>,
    ) -> Result<WaypointId> {
        let (index, waypoint) = self
            .reroutes
            .insert(connection_id, position, index)
            .ok_or(Missing::Connection(connection_id))?;
        tracing::debug!(
            connection = %connection_id,
            waypoint = %waypoint.id,
            index,
            x = position.x,
            y = position.y,
            "waypoint added"
        );
        self.emit(GraphEvent::WaypointAdded {
            connection: connection_id,
            index,
            waypoint,
        });
        Ok(waypoint.id)
    }

    /// Move a waypoint to an absolute position
    pub fn move_waypoint(&mut self, waypoint_id: WaypointId, position: Point) -> Result<()> {
        self.reroutes
            .set_position(waypoint_id, position)
            .ok_or(Missing::Waypoint(waypoint_id))?;
        tracing::debug!(waypoint = %waypoint_id, x = position.x, y = position.y, "waypoint moved");
        self.emit(GraphEvent::WaypointMoved {
            waypoint: waypoint_id,
            position,
        });
        Ok(())
    }

    /// Move a waypoint by a relative offset
    pub fn translate_waypoint(&mut self, waypoint_id: WaypointId, dx: f32, dy: f32) -> Result<()> {
        let current = self
            .reroutes
            .get(waypoint_id)
            .ok_or(Missing::Waypoint(waypoint_id))?
            .position;
        self.move_waypoint(waypoint_id, current.translated(dx, dy))
    }

    /// Remove a single waypoint
    pub fn remove_waypoint(&mut self, waypoint_id: WaypointId) -> Result<()> {
        self.reroutes
            .remove(waypoint_id)
            .ok_or(Missing::Waypoint(waypoint_id))?;
        tracing::debug!(waypoint = %waypoint_id, "waypoint removed");
        self.emit(GraphEvent::WaypointRemoved(waypoint_id));
        Ok(())
    }

    /// Get a waypoint by ID
    pub fn waypoint(&self, waypoint_id: WaypointId) -> Option<&Waypoint> {
        self.reroutes.get(waypoint_id)
    }

    /// Connection owning a waypoint
    pub fn waypoint_owner(&self, waypoint_id: WaypointId) -> Option<ConnectionId> {
        self.reroutes.owner(waypoint_id)
    }

    /// Waypoints of a connection in path order; `None` if the connection is absent
    pub fn waypoints(&self, connection_id: ConnectionId) -> Option<&[Waypoint]> {
        self.reroutes.path(connection_id)
    }

    /// Get the total number of waypoints
    pub fn waypoint_count(&self) -> usize {
        self.reroutes.len()
    }
}

/// What an operation failed to find
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Missing {
    /// Node
    Node(NodeId),
    /// Output port on a node
    Output {
        /// Node that was searched
        node: NodeId,
        /// Port name
        key: String,
    },
    /// Input port on a node
    Input {
        /// Node that was searched
        node: NodeId,
        /// Port name
        key: String,
    },
    /// Control on a node
    Control {
        /// Node that was searched
        node: NodeId,
        /// Control name
        key: String,
    },
    /// Connection
    Connection(ConnectionId),
    /// Waypoint
    Waypoint(WaypointId),
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(id) => write!(f, "node {id}"),
            Self::Output { node, key } => write!(f, "output '{key}' on node {node}"),
            Self::Input { node, key } => write!(f, "input '{key}' on node {node}"),
            Self::Control { node, key } => write!(f, "control '{key}' on node {node}"),
            Self::Connection(id) => write!(f, "connection {id}"),
            Self::Waypoint(id) => write!(f, "waypoint {id}"),
        }
    }
}

/// Error from a graph operation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// A node with this ID is already registered
    #[error("Duplicate node id: {0}")]
    DuplicateId(NodeId),

    /// Referenced entity does not exist
    #[error("Not found: {0}")]
    NotFound(Missing),

    /// Output and input socket kinds differ
    #[error("Incompatible sockets: output {output} cannot feed input {input}")]
    IncompatibleSocket {
        /// Output socket kind
        output: SocketKind,
        /// Input socket kind
        input: SocketKind,
    },

    /// Control does not accept edits
    #[error("Control '{key}' on node {node} is read-only")]
    ReadOnlyControl {
        /// Owning node
        node: NodeId,
        /// Control name
        key: String,
    },

    /// Value variant does not match the control kind
    #[error("Control expects {expected:?}, got {found:?}")]
    ControlTypeMismatch {
        /// Kind of the control
        expected: ControlKind,
        /// Kind of the rejected value
        found: ControlKind,
    },
}

impl From<Missing> for GraphError {
    fn from(missing: Missing) -> Self {
        Self::NotFound(missing)
    }
}
