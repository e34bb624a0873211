// SPDX-License-Identifier: MIT OR Apache-2.0
//! Change notifications emitted by the graph model.
//!
//! Observers are called synchronously, in subscription order, once per
//! applied mutation and before the mutating call returns.
//!
//! Handlers must not re-enter the graph. [`GraphObserver::on_event`] gets only
//! `&GraphEvent`, but a handler can still capture a shared handle to the graph
//! (for example an `Arc<Mutex<Graph>>`). Reading or mutating through such a
//! handle during a notification is unsupported: the caller already holds the
//! lock, so a `parking_lot` mutex deadlocks. Queue follow-up work and apply it
//! after the mutating call returns.

use crate::connection::{Connection, ConnectionId};
use crate::node::{ControlValue, Node, NodeId};
use crate::reroute::{Point, Waypoint, WaypointId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A change applied to the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GraphEvent {
    /// A node was registered
    NodeAdded(Node),
    /// A node was removed, after all of its connections
    NodeRemoved(NodeId),
    /// A connection was created
    ConnectionAdded(Connection),
    /// A connection was removed, after all of its waypoints
    ConnectionRemoved(ConnectionId),
    /// A waypoint was inserted into a connection's path
    WaypointAdded {
        /// Owning connection
        connection: ConnectionId,
        /// Position of the new waypoint in the path
        index: usize,
        /// The new waypoint
        waypoint: Waypoint,
    },
    /// A waypoint changed position
    WaypointMoved {
        /// Moved waypoint
        waypoint: WaypointId,
        /// New absolute position
        position: Point,
    },
    /// A waypoint was removed
    WaypointRemoved(WaypointId),
    /// A node control received a new value
    ControlChanged {
        /// Owning node
        node: NodeId,
        /// Control name
        key: String,
        /// New value
        value: ControlValue,
    },
}

impl GraphEvent {
    /// Short event name, used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::NodeAdded(_) => "node_added",
            Self::NodeRemoved(_) => "node_removed",
            Self::ConnectionAdded(_) => "connection_added",
            Self::ConnectionRemoved(_) => "connection_removed",
            Self::WaypointAdded { .. } => "waypoint_added",
            Self::WaypointMoved { .. } => "waypoint_moved",
            Self::WaypointRemoved(_) => "waypoint_removed",
            Self::ControlChanged { .. } => "control_changed",
        }
    }
}

/// Receiver of graph change notifications
pub trait GraphObserver {
    /// Handle a single change
    fn on_event(&mut self, event: &GraphEvent);
}

impl<T: GraphObserver> GraphObserver for Arc<Mutex<T>> {
    fn on_event(&mut self, event: &GraphEvent) {
        self.lock().on_event(event);
    }
}

/// Adapter turning a closure into an observer
pub struct FnObserver<F>(pub F);

impl<F: FnMut(&GraphEvent)> GraphObserver for FnObserver<F> {
    fn on_event(&mut self, event: &GraphEvent) {
        (self.0)(event);
    }
}

/// Handle returned by `Graph::subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

/// Observer that stores every event it receives
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<GraphEvent>,
}

impl EventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events in delivery order
    pub fn events(&self) -> &[GraphEvent] {
        &self.events
    }

    /// Names of recorded events in delivery order
    pub fn names(&self) -> Vec<&'static str> {
        self.events.iter().map(GraphEvent::name).collect()
    }

    /// Take all recorded events, leaving the log empty
    pub fn drain(&mut self) -> Vec<GraphEvent> {
        std::mem::take(&mut self.events)
    }
}

impl GraphObserver for EventLog {
    fn on_event(&mut self, event: &GraphEvent) {
        self.events.push(event.clone());
    }
}
