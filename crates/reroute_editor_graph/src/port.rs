// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sockets and port directions.
//!
//! A port is a named attachment point on a node. Each port holds exactly one
//! [`Socket`], and the socket's [`SocketKind`] decides what the port may be
//! connected to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    /// Input port
    Input,
    /// Output port
    Output,
}

impl PortDirection {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
        }
    }
}

/// Kind of data a socket carries
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SocketKind {
    /// Execution/control flow
    Flow,
    /// Numeric value
    Number,
    /// Text value
    Text,
    /// Boolean value
    Boolean,
    /// User-defined kind, matched by label
    Custom(String),
}

impl SocketKind {
    /// Check if an output of this kind can feed an input of `other` kind
    pub fn is_compatible(&self, other: &SocketKind) -> bool {
        self == other
    }
}

impl fmt::Display for SocketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flow => f.write_str("flow"),
            Self::Number => f.write_str("number"),
            Self::Text => f.write_str("text"),
            Self::Boolean => f.write_str("boolean"),
            Self::Custom(label) => write!(f, "custom:{label}"),
        }
    }
}

/// A typed connection point. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Socket {
    kind: SocketKind,
}

impl Socket {
    /// Create a new socket of the given kind
    pub fn new(kind: SocketKind) -> Self {
        Self { kind }
    }

    /// Create a socket with a custom label
    pub fn custom(label: impl Into<String>) -> Self {
        Self::new(SocketKind::Custom(label.into()))
    }

    /// The socket kind
    pub fn kind(&self) -> &SocketKind {
        &self.kind
    }

    /// Check if a connection from this (output) socket to `input` is valid
    pub fn can_connect(&self, input: &Socket) -> bool {
        self.kind.is_compatible(&input.kind)
    }
}
