// SPDX-License-Identifier: MIT OR Apache-2.0
//! Reroute editor application layer.
//!
//! - [`scene`]: RON startup scene, built into a graph through its public API
//! - [`view`]: view layer mirroring the graph and turning gestures into edits

pub mod scene;
pub mod view;
