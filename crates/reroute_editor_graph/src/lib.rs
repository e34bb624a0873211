// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node graph model for the reroute editor.
//!
//! This crate owns the editable graph behind a visual node editor, with no
//! knowledge of how it is drawn:
//! - Nodes with named input/output ports and text/number controls
//! - Socket kinds checked on connect
//! - Parallel connections between the same pair of ports
//! - Reroute waypoints attached to connections
//! - Synchronous change notifications for a view layer
//! - Selection that follows entity removal
//!
//! ## Architecture
//!
//! [`Graph`] is a single-threaded, in-memory store. Every mutation is
//! validated before it is applied and is reported to [`GraphObserver`]s in
//! order. A view layer subscribes, renders, and calls back into the graph in
//! response to user gestures. Sharing across threads is left to the caller.

pub mod port;
pub mod node;
pub mod connection;
pub mod reroute;
pub mod event;
pub mod graph;
pub mod selection;

pub use node::{ControlKind, ControlValue, InputControl, Node, NodeId};
pub use port::{PortDirection, Socket, SocketKind};
pub use connection::{Connection, ConnectionId};
pub use reroute::{Point, Waypoint, WaypointId};
pub use event::{EventLog, FnObserver, GraphEvent, GraphObserver, SubscriptionId};
pub use graph::{Graph, GraphError, Missing, Result};
pub use selection::{SelectMode, SelectableId, Selector};
