// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection (edge) definitions for the graph.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a new random connection ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A directed edge from an output port to an input port
///
/// Endpoints are referenced by ID only. Two connections with identical
/// endpoints are still distinct edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Source node ID
    pub source: NodeId,
    /// Output port name on the source node
    pub source_output: String,
    /// Target node ID
    pub target: NodeId,
    /// Input port name on the target node
    pub target_input: String,
}

impl Connection {
    /// Create a new connection
    pub fn new(
        source: NodeId,
        source_output: impl Into<String>,
        target: NodeId,
        target_input: impl Into<String>,
    ) -> Self {
        Self {
            id: ConnectionId::new(),
            source,
            source_output: source_output.into(),
            target,
            target_input: target_input.into(),
        }
    }

    /// Check if this connection involves a specific node
    pub fn involves_node(&self, node_id: NodeId) -> bool {
        self.source == node_id || self.target == node_id
    }

    /// Check if two connections join the same pair of ports
    pub fn same_endpoints(&self, other: &Connection) -> bool {
        self.source == other.source
            && self.source_output == other.source_output
            && self.target == other.target
            && self.target_input == other.target_input
    }
}
