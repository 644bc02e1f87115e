//! Workflow node types.
//!
//! The canvas knows two kinds of node:
//! - Note nodes carry annotations and can feed other nodes
//! - Action nodes schedule a notification and only accept input

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use waypost_core::NodeId;

/// The kind of a workflow node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Plain annotation point with notes, files and links.
    Note,
    /// Scheduling trigger that delivers a notification.
    Action,
}

impl NodeKind {
    /// Returns the lowercase name, also used as the id prefix.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Action => "action",
        }
    }

    /// Returns the label given to freshly placed nodes.
    #[must_use]
    pub const fn default_label(&self) -> &'static str {
        match self {
            Self::Note => "Note Node",
            Self::Action => "Action Node",
        }
    }

    /// Returns whether nodes of this kind expose an output handle.
    ///
    /// Action nodes are terminal: they can be connected to but never from.
    #[must_use]
    pub const fn has_output(&self) -> bool {
        matches!(self, Self::Note)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            // "custom" is the canvas's name for note nodes.
            "note" | "custom" => Ok(Self::Note),
            "action" => Ok(Self::Action),
            other => Err(format!("unknown node kind '{other}'")),
        }
    }
}

/// Canvas position of a node. Layout only; the core never reads it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A node on the workflow canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier.
    pub id: NodeId,
    /// Note or action.
    pub kind: NodeKind,
    /// Human-readable label.
    pub label: String,
    /// Canvas position.
    #[serde(default)]
    pub position: Position,
}

impl Node {
    /// Creates a node of `kind` with a freshly generated id and the default
    /// label.
    #[must_use]
    pub fn new(kind: NodeKind, position: Position) -> Self {
        Self::with_id(NodeId::generate(kind.as_str()), kind, position)
    }

    /// Creates a node with an explicit id.
    #[must_use]
    pub fn with_id(id: NodeId, kind: NodeKind, position: Position) -> Self {
        Self {
            id,
            kind,
            label: kind.default_label().to_string(),
            position,
        }
    }

    /// Replaces the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn is_action(&self) -> bool {
        self.kind == NodeKind::Action
    }
}
