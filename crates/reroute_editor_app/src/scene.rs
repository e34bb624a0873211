// SPDX-License-Identifier: MIT OR Apache-2.0
//! Startup scene configuration.
//!
//! A scene file lists the nodes, connections and reroute pins the editor
//! starts with. Nodes are referred to by a local key; the graph assigns the
//! real IDs while the scene is built.

use crate::view::ViewLayer;
use reroute_editor_graph::{
    ConnectionId, ControlValue, Graph, GraphError, InputControl, Node, NodeId, Point,
    PortDirection, Socket, SocketKind, WaypointId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Current scene format version
pub const SCENE_FORMAT_VERSION: u32 = 1;

/// Scene loading and building errors
#[derive(Debug, Error)]
pub enum SceneError {
    /// Scene file could not be read
    #[error("Failed to read scene: {0}")]
    Io(#[from] std::io::Error),

    /// Scene file is not valid RON
    #[error("Failed to parse scene: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Scene file could not be written
    #[error("Failed to serialize scene: {0}")]
    Serialize(#[from] ron::Error),

    /// Scene was written by a newer editor
    #[error("Scene version {found} is newer than supported version {}", SCENE_FORMAT_VERSION)]
    UnsupportedVersion {
        /// Version found in the file
        found: u32,
    },

    /// A connection refers to a node key that the scene does not define
    #[error("Unknown node key: {0}")]
    UnknownNode(String),

    /// The same node key is defined twice
    #[error("Duplicate node key: {0}")]
    DuplicateKey(String),

    /// A connection names a port its node does not define
    #[error("Node {node} has no {direction} port {port}")]
    UnknownPort {
        /// Node key
        node: String,
        /// Port name
        port: String,
        /// `input` or `output`
        direction: &'static str,
    },

    /// The graph rejected an operation
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Result type for scene operations
pub type Result<T> = std::result::Result<T, SceneError>;

/// A control on a scene node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSpec {
    /// Control name
    pub key: String,
    /// Initial value; its variant picks the control kind
    pub value: ControlValue,
    /// Whether the control is read-only
    #[serde(default)]
    pub readonly: bool,
}

/// A port on a scene node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortSpec {
    /// Port name
    pub key: String,
    /// Socket kind
    pub socket: SocketKind,
}

/// A node in the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Key used by connections in this file
    pub key: String,
    /// Display label
    pub label: String,
    /// Controls
    #[serde(default)]
    pub controls: Vec<ControlSpec>,
    /// Input ports
    #[serde(default)]
    pub inputs: Vec<PortSpec>,
    /// Output ports
    #[serde(default)]
    pub outputs: Vec<PortSpec>,
    /// Initial position in graph space
    #[serde(default)]
    pub position: [f32; 2],
}

impl NodeSpec {
    fn to_node(&self) -> Node {
        let mut node = Node::new(self.label.clone());
        for control in &self.controls {
            let mut input = InputControl::text().with_value(control.value.clone());
            input.readonly = control.readonly;
            node = node.add_control(control.key.clone(), input);
        }
        for port in &self.inputs {
            node = node.add_input(port.key.clone(), Socket::new(port.socket.clone()));
        }
        for port in &self.outputs {
            node = node.add_output(port.key.clone(), Socket::new(port.socket.clone()));
        }
        node
    }
}

/// A connection in the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionSpec {
    /// Source node key and output port
    pub from: (String, String),
    /// Target node key and input port
    pub to: (String, String),
    /// Reroute pins in path order
    #[serde(default)]
    pub waypoints: Vec<[f32; 2]>,
}

/// Startup scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Format version
    pub version: u32,
    /// Nodes, added in order
    pub nodes: Vec<NodeSpec>,
    /// Connections, added in order after all nodes
    #[serde(default)]
    pub connections: Vec<ConnectionSpec>,
}

/// IDs assigned while building a scene
#[derive(Debug, Clone, Default)]
pub struct SceneHandles {
    /// Node IDs by scene key
    pub nodes: HashMap<String, NodeId>,
    /// Connection IDs in scene order
    pub connections: Vec<ConnectionId>,
    /// Waypoint IDs per connection, in scene order
    pub waypoints: Vec<Vec<WaypointId>>,
}

impl SceneConfig {
    /// The built-in demo: two nodes joined twice, each link bent by one pin
    pub fn sample() -> Self {
        let socket = SocketKind::Custom("socket".to_string());
        let text = |key: &str| ControlSpec {
            key: key.to_string(),
            value: ControlValue::Text(String::new()),
            readonly: false,
        };
        let port = |key: &str| PortSpec {
            key: key.to_string(),
            socket: socket.clone(),
        };
        let link = |waypoint: [f32; 2]| ConnectionSpec {
            from: ("A".to_string(), "a".to_string()),
            to: ("B".to_string(), "b".to_string()),
            waypoints: vec![waypoint],
        };

        Self {
            version: SCENE_FORMAT_VERSION,
            nodes: vec![
                NodeSpec {
                    key: "A".to_string(),
                    label: "A".to_string(),
                    controls: vec![text("a")],
                    inputs: Vec::new(),
                    outputs: vec![port("a")],
                    position: [0.0, 0.0],
                },
                NodeSpec {
                    key: "B".to_string(),
                    label: "B".to_string(),
                    controls: vec![text("b")],
                    inputs: vec![port("b")],
                    outputs: Vec::new(),
                    position: [400.0, 0.0],
                },
            ],
            connections: vec![link([300.0, -50.0]), link([300.0, 200.0])],
        }
    }

    /// Parse a scene from RON text
    pub fn from_ron(content: &str) -> Result<Self> {
        let scene: SceneConfig = ron::from_str(content)?;
        if scene.version > SCENE_FORMAT_VERSION {
            return Err(SceneError::UnsupportedVersion {
                found: scene.version,
            });
        }
        Ok(scene)
    }

    /// Load a scene from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Check everything the graph would reject before building
    ///
    /// Node keys must be unique, and every connection must join an existing
    /// output to an existing input of the same socket kind.
    pub fn validate(&self) -> Result<()> {
        let mut nodes: HashMap<&str, &NodeSpec> = HashMap::new();
        for node in &self.nodes {
            if nodes.insert(node.key.as_str(), node).is_some() {
                return Err(SceneError::DuplicateKey(node.key.clone()));
            }
        }
        let lookup = |key: &String| {
            nodes
                .get(key.as_str())
                .copied()
                .ok_or_else(|| SceneError::UnknownNode(key.clone()))
        };
        for conn in &self.connections {
            let (source, target) = (lookup(&conn.from.0)?, lookup(&conn.to.0)?);
            let output = find_port(&source.outputs, &conn.from, PortDirection::Output)?;
            let input = find_port(&target.inputs, &conn.to, PortDirection::Input)?;
            if output.socket != input.socket {
                return Err(GraphError::IncompatibleSocket {
                    output: output.socket.clone(),
                    input: input.socket.clone(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Populate a graph and place its nodes in the view
    ///
    /// The whole scene is validated first, so a rejected scene adds nothing.
    pub fn build(&self, graph: &mut Graph, view: &ViewLayer) -> Result<SceneHandles> {
        self.validate()?;
        let mut handles = SceneHandles::default();

        for spec in &self.nodes {
            let id = graph.add_node(spec.to_node())?;
            view.place_node(id, Point::from(spec.position));
            handles.nodes.insert(spec.key.clone(), id);
        }

        for spec in &self.connections {
            let source = self.resolve(&handles, &spec.from.0)?;
            let target = self.resolve(&handles, &spec.to.0)?;
            let id = graph.add_connection(source, &spec.from.1, target, &spec.to.1)?;
            let mut pins = Vec::with_capacity(spec.waypoints.len());
            for &point in &spec.waypoints {
                pins.push(graph.add_waypoint(id, Point::from(point), None)?);
            }
            handles.connections.push(id);
            handles.waypoints.push(pins);
        }

        tracing::info!(
            nodes = handles.nodes.len(),
            connections = handles.connections.len(),
            "scene built"
        );
        Ok(handles)
    }

    fn resolve(&self, handles: &SceneHandles, key: &str) -> Result<NodeId> {
        handles
            .nodes
            .get(key)
            .copied()
            .ok_or_else(|| SceneError::UnknownNode(key.to_string()))
    }
}

fn find_port<'a>(
    ports: &'a [PortSpec],
    (node, port): &(String, String),
    direction: PortDirection,
) -> Result<&'a PortSpec> {
    ports
        .iter()
        .find(|p| &p.key == port)
        .ok_or_else(|| SceneError::UnknownPort {
            node: node.clone(),
            port: port.clone(),
            direction: direction.name(),
        })
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::sample()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_builds_demo_graph() {
        let mut graph = Graph::new();
        let view = ViewLayer::attach(&mut graph);
        let handles = SceneConfig::sample().build(&mut graph, &view).unwrap();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.connection_count(), 2);
        assert_eq!(graph.waypoint_count(), 2);

        let (c1, c2) = (handles.connections[0], handles.connections[1]);
        assert_ne!(c1, c2);
        assert_eq!(
            graph.waypoints(c1).unwrap()[0].position,
            Point::new(300.0, -50.0)
        );
        assert_eq!(
            graph.waypoints(c2).unwrap()[0].position,
            Point::new(300.0, 200.0)
        );
        assert_eq!(view.node_position(handles.nodes["B"]), Some(Point::new(400.0, 0.0)));
    }

    #[test]
    fn test_ron_round_trip() {
        let sample = SceneConfig::sample();
        let ron = sample.to_ron().unwrap();
        assert_eq!(SceneConfig::from_ron(&ron).unwrap(), sample);
    }

    #[test]
    fn test_newer_version_rejected() {
        let mut scene = SceneConfig::sample();
        scene.version = SCENE_FORMAT_VERSION + 1;
        let ron = scene.to_ron().unwrap();
        assert!(matches!(
            SceneConfig::from_ron(&ron),
            Err(SceneError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn test_unknown_key_rejected_before_mutation() {
        let mut scene = SceneConfig::sample();
        scene.connections[0].to.0 = "Z".to_string();

        let mut graph = Graph::new();
        let view = ViewLayer::attach(&mut graph);
        assert!(matches!(
            scene.build(&mut graph, &view),
            Err(SceneError::UnknownNode(key)) if key == "Z"
        ));
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn test_incompatible_socket_surfaces_graph_error() {
        let mut scene = SceneConfig::sample();
        scene.nodes[1].inputs[0].socket = SocketKind::Number;

        let mut graph = Graph::new();
        let view = ViewLayer::attach(&mut graph);
        assert!(matches!(
            scene.build(&mut graph, &view),
            Err(SceneError::Graph(GraphError::IncompatibleSocket { .. }))
        ));
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.connection_count(), 0);
    }

    #[test]
    fn test_unknown_port_leaves_graph_empty() {
        let mut scene = SceneConfig::sample();
        scene.connections[1].to.1 = "nope".to_string();

        let mut graph = Graph::new();
        let view = ViewLayer::attach(&mut graph);
        let err = scene.build(&mut graph, &view).unwrap_err();
        assert!(matches!(
            &err,
            SceneError::UnknownPort { node, port, direction: "input" }
                if node == "B" && port == "nope"
        ));
        assert_eq!(err.to_string(), "Node B has no input port nope");
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.connection_count(), 0);
        assert!(view.node_order().is_empty());

        scene.connections[1].to.1 = "b".to_string();
        scene.connections[0].from.1 = "z".to_string();
        assert!(matches!(
            scene.validate(),
            Err(SceneError::UnknownPort { direction: "output", .. })
        ));
    }

    #[test]
    fn test_minimal_file_uses_defaults() {
        let scene = SceneConfig::from_ron(
            r#"(version: 1, nodes: [(key: "solo", label: "Solo")])"#,
        )
        .unwrap();
        assert!(scene.connections.is_empty());
        assert!(scene.nodes[0].controls.is_empty());
        assert_eq!(scene.nodes[0].position, [0.0, 0.0]);
    }
}
