//! Error types for the scheduler crate.
//!
//! - `NotifierError`: rejected transitions of a single notifier
//! - `NotificationError`: failures of the notification surface
//! - `WorkbenchError`: lookups across the graph, wrapping the above

use crate::state::NotifierPhase;
use chrono::{DateTime, Utc};
use std::fmt;
use waypost_core::NodeId;
use waypost_store::StoreError;

/// Errors from notifier transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierError {
    /// Arm was requested before any time was picked.
    NothingScheduled { node_id: NodeId },
    /// The picked time is not after the current time.
    ScheduledTimeNotInFuture {
        node_id: NodeId,
        scheduled: DateTime<Utc>,
        now: DateTime<Utc>,
    },
    /// The action is not allowed in the current phase.
    InvalidTransition {
        node_id: NodeId,
        from: NotifierPhase,
        action: &'static str,
    },
    /// A date or time input could not be turned into an instant.
    InvalidScheduledTime { input: String, reason: String },
    /// Persisting the schedule state failed.
    Store(StoreError),
}

impl fmt::Display for NotifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NothingScheduled { node_id } => {
                write!(f, "no time picked for action node {node_id}")
            }
            Self::ScheduledTimeNotInFuture {
                node_id,
                scheduled,
                now,
            } => {
                write!(
                    f,
                    "scheduled time {scheduled} for {node_id} is not after the current time {now}"
                )
            }
            Self::InvalidTransition {
                node_id,
                from,
                action,
            } => {
                write!(f, "cannot {action} action node {node_id} while {from}")
            }
            Self::InvalidScheduledTime { input, reason } => {
                write!(f, "invalid scheduled time '{input}': {reason}")
            }
            Self::Store(e) => write!(f, "failed to persist schedule: {e}"),
        }
    }
}

impl std::error::Error for NotifierError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for NotifierError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

/// Errors from the notification surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    /// The platform refused or failed to show the notification.
    DeliveryFailed { reason: String },
}

impl fmt::Display for NotificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeliveryFailed { reason } => write!(f, "notification delivery failed: {reason}"),
        }
    }
}

impl std::error::Error for NotificationError {}

/// Errors from workbench operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkbenchError {
    /// Node with the given ID was not found in the graph.
    NodeNotFound { node_id: NodeId },
    /// The node exists but cannot be scheduled.
    NotAnActionNode { node_id: NodeId },
    /// A notifier rejected the operation.
    Notifier(NotifierError),
}

impl fmt::Display for WorkbenchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeNotFound { node_id } => write!(f, "node not found: {node_id}"),
            Self::NotAnActionNode { node_id } => {
                write!(f, "node {node_id} is not an action node")
            }
            Self::Notifier(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for WorkbenchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Notifier(e) => Some(e),
            _ => None,
        }
    }
}

impl From<NotifierError> for WorkbenchError {
    fn from(e: NotifierError) -> Self {
        Self::Notifier(e)
    }
}
