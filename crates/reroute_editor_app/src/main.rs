// SPDX-License-Identifier: MIT OR Apache-2.0
//! Reroute Editor - node graph demo with rerouted connections
//!
//! Builds the startup scene into a graph model, attaches a view layer and
//! reports the resulting graph. Usage:
//!
//! ```text
//! reroute_editor [SCENE.ron]
//! reroute_editor --print-sample
//! ```
//!
//! Without a scene file the built-in sample is used: two nodes joined by two
//! parallel connections, each bent by a reroute pin.

use reroute_editor_app::scene::{SceneConfig, SceneError};
use reroute_editor_app::view::ViewLayer;
use reroute_editor_graph::Graph;
use std::path::Path;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn run(args: &[String]) -> Result<(), SceneError> {
    let scene = match args.first().map(String::as_str) {
        Some("--print-sample") => {
            println!("{}", SceneConfig::sample().to_ron()?);
            return Ok(());
        }
        Some(path) => {
            tracing::info!("Loading scene from {path}");
            SceneConfig::load(Path::new(path))?
        }
        None => SceneConfig::sample(),
    };

    let mut graph = Graph::new();
    let view = ViewLayer::attach(&mut graph);
    let handles = scene.build(&mut graph, &view)?;

    for node in graph.nodes() {
        let position = view.node_position(node.id).unwrap_or_default();
        tracing::info!(
            node = %node.id,
            label = %node.label,
            x = position.x,
            y = position.y,
            "node"
        );
    }
    for (index, connection) in handles.connections.iter().enumerate() {
        let path = view.path(*connection).unwrap_or_default();
        tracing::info!(connection = %connection, index, pins = ?path, "connection");
    }

    view.detach(&mut graph);
    Ok(())
}

fn main() {
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in ["reroute_editor_app=debug", "reroute_editor_graph=info"] {
        if let Ok(directive) = directive.parse() {
            env_filter = env_filter.add_directive(directive);
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Reroute Editor v{}", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = run(&args) {
        tracing::error!("Reroute Editor failed: {e}");
        std::process::exit(1);
    }
}
