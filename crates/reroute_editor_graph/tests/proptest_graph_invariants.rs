// SPDX-License-Identifier: MIT OR Apache-2.0
//! Property-based invariant tests for the graph model.
//!
//! These tests drive random operation sequences and check that:
//!
//! 1. No reachable state contains an orphaned connection or waypoint.
//! 2. Adding then removing a connection restores the connection set.
//! 3. Connecting sockets of different kinds fails and changes nothing.
//! 4. A selector subscribed to the graph never holds a removed entity.

use parking_lot::Mutex;
use proptest::prelude::*;
use reroute_editor_graph::{
    Connection, Graph, GraphError, Node, NodeId, Point, SelectMode, SelectableId, Selector,
    Socket, SocketKind, WaypointId,
};
use std::sync::Arc;

// ── Helpers ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    AddNode,
    RemoveNode(usize),
    Connect(usize, usize),
    Disconnect(usize),
    AddWaypoint(usize, i16, i16, Option<usize>),
    MoveWaypoint(usize, i16, i16),
    RemoveWaypoint(usize),
    Select(usize, bool),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::AddNode),
        1 => any::<usize>().prop_map(Op::RemoveNode),
        4 => (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::Connect(a, b)),
        1 => any::<usize>().prop_map(Op::Disconnect),
        3 => (any::<usize>(), any::<i16>(), any::<i16>(), proptest::option::of(0usize..4))
            .prop_map(|(c, x, y, at)| Op::AddWaypoint(c, x, y, at)),
        2 => (any::<usize>(), any::<i16>(), any::<i16>())
            .prop_map(|(w, x, y)| Op::MoveWaypoint(w, x, y)),
        1 => any::<usize>().prop_map(Op::RemoveWaypoint),
        2 => (any::<usize>(), any::<bool>()).prop_map(|(i, acc)| Op::Select(i, acc)),
    ]
}

fn node() -> Node {
    Node::new("n")
        .add_input("in", Socket::custom("socket"))
        .add_output("out", Socket::custom("socket"))
}

fn pick<T: Copy>(items: &[T], index: usize) -> Option<T> {
    if items.is_empty() {
        None
    } else {
        Some(items[index % items.len()])
    }
}

fn all_waypoints(graph: &Graph) -> Vec<WaypointId> {
    graph
        .connections(None)
        .flat_map(|c| graph.waypoints(c.id).unwrap_or_default())
        .map(|w| w.id)
        .collect()
}

fn apply(graph: &mut Graph, selector: &Arc<Mutex<Selector>>, op: &Op) {
    let nodes: Vec<NodeId> = graph.node_ids().collect();
    let connections: Vec<_> = graph.connections(None).map(|c| c.id).collect();
    let waypoints = all_waypoints(graph);

    match *op {
        Op::AddNode => {
            graph.add_node(node()).unwrap();
        }
        Op::RemoveNode(i) => {
            if let Some(id) = pick(&nodes, i) {
                graph.remove_node(id).unwrap();
            }
        }
        Op::Connect(a, b) => {
            if let (Some(a), Some(b)) = (pick(&nodes, a), pick(&nodes, b)) {
                graph.add_connection(a, "out", b, "in").unwrap();
            }
        }
        Op::Disconnect(i) => {
            if let Some(id) = pick(&connections, i) {
                graph.remove_connection(id).unwrap();
            }
        }
        Op::AddWaypoint(i, x, y, at) => {
            if let Some(id) = pick(&connections, i) {
                graph
                    .add_waypoint(id, Point::new(f32::from(x), f32::from(y)), at)
                    .unwrap();
            }
        }
        Op::MoveWaypoint(i, x, y) => {
            if let Some(id) = pick(&waypoints, i) {
                graph
                    .move_waypoint(id, Point::new(f32::from(x), f32::from(y)))
                    .unwrap();
            }
        }
        Op::RemoveWaypoint(i) => {
            if let Some(id) = pick(&waypoints, i) {
                graph.remove_waypoint(id).unwrap();
            }
        }
        Op::Select(i, accumulate) => {
            let mode = if accumulate {
                SelectMode::Accumulate
            } else {
                SelectMode::Exclusive
            };
            let mut targets: Vec<SelectableId> = nodes.iter().map(|&n| n.into()).collect();
            targets.extend(waypoints.iter().map(|&w| SelectableId::from(w)));
            if let Some(id) = pick(&targets, i) {
                selector.lock().select(id, mode);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 1. No orphans, selection stays consistent
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn no_orphans_after_random_ops(ops in proptest::collection::vec(op_strategy(), 1..60)) {
        let mut graph = Graph::new();
        let selector = Selector::shared();
        graph.subscribe(Arc::clone(&selector));

        for op in &ops {
            apply(&mut graph, &selector, op);

            for conn in graph.connections(None) {
                prop_assert!(graph.node(conn.source).is_some(), "dangling source after {:?}", op);
                prop_assert!(graph.node(conn.target).is_some(), "dangling target after {:?}", op);
            }
            let reachable = all_waypoints(&graph);
            prop_assert_eq!(reachable.len(), graph.waypoint_count());
            for id in reachable {
                let owner = graph.waypoint_owner(id);
                prop_assert!(owner.and_then(|c| graph.connection(c)).is_some());
            }
            for selected in selector.lock().iter() {
                let alive = match *selected {
                    SelectableId::Node(id) => graph.node(id).is_some(),
                    SelectableId::Waypoint(id) => graph.waypoint(id).is_some(),
                };
                prop_assert!(alive, "selector kept removed {:?}", selected);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Connect/disconnect round-trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn connect_disconnect_round_trip(
        node_count in 1usize..6,
        existing in proptest::collection::vec((any::<usize>(), any::<usize>()), 0..8),
        a in any::<usize>(),
        b in any::<usize>(),
    ) {
        let mut graph = Graph::new();
        let nodes: Vec<NodeId> = (0..node_count)
            .map(|_| graph.add_node(node()).unwrap())
            .collect();
        for (s, t) in existing {
            graph
                .add_connection(nodes[s % node_count], "out", nodes[t % node_count], "in")
                .unwrap();
        }

        let before: Vec<Connection> = graph.connections(None).cloned().collect();
        let id = graph
            .add_connection(nodes[a % node_count], "out", nodes[b % node_count], "in")
            .unwrap();
        prop_assert!(before.iter().all(|c| c.id != id));
        graph.remove_connection(id).unwrap();
        let after: Vec<Connection> = graph.connections(None).cloned().collect();

        prop_assert_eq!(before, after);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Incompatible sockets never mutate
// ═════════════════════════════════════════════════════════════════════════

fn kind_strategy() -> impl Strategy<Value = SocketKind> {
    prop_oneof![
        Just(SocketKind::Flow),
        Just(SocketKind::Number),
        Just(SocketKind::Text),
        Just(SocketKind::Boolean),
        "[a-c]{1,2}".prop_map(SocketKind::Custom),
    ]
}

proptest! {
    #[test]
    fn socket_kinds_gate_connections(output in kind_strategy(), input in kind_strategy()) {
        let mut graph = Graph::new();
        let a = graph
            .add_node(Node::new("A").add_output("out", Socket::new(output.clone())))
            .unwrap();
        let b = graph
            .add_node(Node::new("B").add_input("in", Socket::new(input.clone())))
            .unwrap();

        let result = graph.add_connection(a, "out", b, "in");
        if output == input {
            prop_assert!(result.is_ok());
            prop_assert_eq!(graph.connection_count(), 1);
        } else {
            prop_assert_eq!(result, Err(GraphError::IncompatibleSocket { output, input }));
            prop_assert_eq!(graph.connection_count(), 0);
        }
    }
}
