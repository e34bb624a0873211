// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection rerouting: ordered waypoints along a connection's path.
//!
//! Waypoints are purely visual. They never change graph topology, but they
//! live and die with the connection that owns them.

use crate::connection::ConnectionId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a waypoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WaypointId(pub Uuid);

impl WaypointId {
    /// Create a new random waypoint ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WaypointId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WaypointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A point in graph space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f32,
    /// Vertical coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Offset by a delta
    pub fn translated(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl From<[f32; 2]> for Point {
    fn from([x, y]: [f32; 2]) -> Self {
        Self::new(x, y)
    }
}

/// A routing point on a connection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Unique waypoint ID
    pub id: WaypointId,
    /// Position in graph space
    pub position: Point,
}

/// Waypoint sets for every connection in a graph
///
/// Every tracked connection has an entry, possibly empty. A reverse index maps
/// each waypoint back to its owner so lookups by [`WaypointId`] stay O(1).
#[derive(Debug, Clone, Default)]
pub(crate) struct Reroutes {
    paths: HashMap<ConnectionId, Vec<Waypoint>>,
    owners: HashMap<WaypointId, ConnectionId>,
}

impl Reroutes {
    /// Start tracking an empty path for a connection
    pub fn track(&mut self, connection: ConnectionId) {
        self.paths.entry(connection).or_default();
    }

    /// Stop tracking a connection, returning its waypoints in path order
    pub fn untrack(&mut self, connection: ConnectionId) -> Vec<Waypoint> {
        let removed = self.paths.remove(&connection).unwrap_or_default();
        for waypoint in &removed {
            self.owners.remove(&waypoint.id);
        }
        removed
    }

    /// Waypoints of a tracked connection
    pub fn path(&self, connection: ConnectionId) -> Option<&[Waypoint]> {
        self.paths.get(&connection).map(Vec::as_slice)
    }

    /// Owner of a waypoint
    pub fn owner(&self, waypoint: WaypointId) -> Option<ConnectionId> {
        self.owners.get(&waypoint).copied()
    }

    /// Look up a waypoint
    pub fn get(&self, waypoint: WaypointId) -> Option<&Waypoint> {
        let owner = self.owner(waypoint)?;
        self.paths.get(&owner)?.iter().find(|w| w.id == waypoint)
    }

    /// Insert a waypoint. An index past the end appends.
    ///
    /// Returns the index used and the new waypoint, or `None` when the
    /// connection is not tracked.
    pub fn insert(
        &mut self,
        connection: ConnectionId,
        position: Point,
        index: Option<usize>,
    ) -> Option<(usize, Waypoint)> {
        let path = self.paths.get_mut(&connection)?;
        let waypoint = Waypoint {
            id: WaypointId::new(),
            position,
        };
        let at = index.map_or(path.len(), |i| i.min(path.len()));
        path.insert(at, waypoint);
        self.owners.insert(waypoint.id, connection);
        Some((at, waypoint))
    }

    /// Move a waypoint in place, keeping its position in the path
    pub fn set_position(&mut self, waypoint: WaypointId, position: Point) -> Option<Waypoint> {
        let owner = self.owner(waypoint)?;
        let entry = self
            .paths
            .get_mut(&owner)?
            .iter_mut()
            .find(|w| w.id == waypoint)?;
        entry.position = position;
        Some(*entry)
    }

    /// Remove a single waypoint; the rest keep their relative order
    pub fn remove(&mut self, waypoint: WaypointId) -> Option<Waypoint> {
        let owner = self.owners.remove(&waypoint)?;
        let path = self.paths.get_mut(&owner)?;
        let index = path.iter().position(|w| w.id == waypoint)?;
        Some(path.remove(index))
    }

    /// Total number of waypoints
    pub fn len(&self) -> usize {
        self.owners.len()
    }
}
