// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the graph model.

use crate::port::{PortDirection, Socket};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Input type of a control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlKind {
    /// Free text field
    Text,
    /// Numeric field
    Number,
}

/// Value held by a control
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ControlValue {
    /// Text
    Text(String),
    /// Number
    Number(f64),
}

impl ControlValue {
    /// The control kind that can hold this value
    pub fn kind(&self) -> ControlKind {
        match self {
            Self::Text(_) => ControlKind::Text,
            Self::Number(_) => ControlKind::Number,
        }
    }
}

/// An editable field embedded in a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputControl {
    /// Field type
    pub kind: ControlKind,
    /// Current value
    pub value: ControlValue,
    /// Whether the view layer may edit the value
    pub readonly: bool,
}

impl InputControl {
    /// Create an empty text control
    pub fn text() -> Self {
        Self {
            kind: ControlKind::Text,
            value: ControlValue::Text(String::new()),
            readonly: false,
        }
    }

    /// Create a numeric control initialised to zero
    pub fn number() -> Self {
        Self {
            kind: ControlKind::Number,
            value: ControlValue::Number(0.0),
            readonly: false,
        }
    }

    /// Set the initial value. The control kind follows the value.
    pub fn with_value(mut self, value: ControlValue) -> Self {
        self.kind = value.kind();
        self.value = value;
        self
    }

    /// Mark as read-only
    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }
}

/// A node instance in the graph
///
/// Nodes own their ports and controls. Ports are keyed by name and keep
/// insertion order; an input and an output may share a name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Display label
    pub label: String,
    /// Controls by name
    pub controls: IndexMap<String, InputControl>,
    /// Input sockets by port name
    pub inputs: IndexMap<String, Socket>,
    /// Output sockets by port name
    pub outputs: IndexMap<String, Socket>,
}

impl Node {
    /// Create a new node with a random ID and no ports
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            label: label.into(),
            controls: IndexMap::new(),
            inputs: IndexMap::new(),
            outputs: IndexMap::new(),
        }
    }

    /// Use an explicit ID instead of the generated one
    pub fn with_id(mut self, id: NodeId) -> Self {
        self.id = id;
        self
    }

    /// Add a control, replacing any control with the same name
    pub fn add_control(mut self, key: impl Into<String>, control: InputControl) -> Self {
        self.controls.insert(key.into(), control);
        self
    }

    /// Add an input port
    pub fn add_input(mut self, key: impl Into<String>, socket: Socket) -> Self {
        self.inputs.insert(key.into(), socket);
        self
    }

    /// Add an output port
    pub fn add_output(mut self, key: impl Into<String>, socket: Socket) -> Self {
        self.outputs.insert(key.into(), socket);
        self
    }

    /// Get an input socket by port name
    pub fn input(&self, key: &str) -> Option<&Socket> {
        self.inputs.get(key)
    }

    /// Get an output socket by port name
    pub fn output(&self, key: &str) -> Option<&Socket> {
        self.outputs.get(key)
    }

    /// Get a port's socket by direction and name
    pub fn port(&self, direction: PortDirection, key: &str) -> Option<&Socket> {
        match direction {
            PortDirection::Input => self.input(key),
            PortDirection::Output => self.output(key),
        }
    }

    /// Get a control by name
    pub fn control(&self, key: &str) -> Option<&InputControl> {
        self.controls.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::SocketKind;

    #[test]
    fn test_builder_keeps_port_order() {
        let node = Node::new("Mix")
            .add_input("left", Socket::new(SocketKind::Number))
            .add_input("right", Socket::new(SocketKind::Number))
            .add_output("out", Socket::new(SocketKind::Number));

        let names: Vec<_> = node.inputs.keys().map(String::as_str).collect();
        assert_eq!(names, ["left", "right"]);
        assert!(node.port(PortDirection::Output, "out").is_some());
        assert!(node.port(PortDirection::Input, "out").is_none());
    }

    #[test]
    fn test_control_kind_follows_value() {
        let control = InputControl::text().with_value(ControlValue::Number(2.5));
        assert_eq!(control.kind, ControlKind::Number);
        assert!(!control.readonly);
        assert!(InputControl::number().readonly().readonly);
    }

    #[test]
    fn test_fresh_nodes_get_distinct_ids() {
        assert_ne!(Node::new("A").id, Node::new("A").id);
    }
}
