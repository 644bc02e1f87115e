//! Schedule state of action nodes.

use crate::error::NotifierError;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use waypost_core::NodeId;
use waypost_store::{KeyValueStore, StorageKey, StoreError, load_json, save_json};

/// Persisted schedule of an action node, stored under `action-<id>`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleState {
    /// The picked instant, if any.
    #[serde(default)]
    pub scheduled_time: Option<DateTime<Utc>>,
    /// Whether a timer was running when the state was written.
    #[serde(default)]
    pub is_scheduled: bool,
}

impl ScheduleState {
    /// Loads the state of `node_id`. Absent and malformed entries are `None`.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S, node_id: &NodeId) -> Option<Self> {
        load_json(store, &StorageKey::schedule(node_id))
    }

    /// Stores the state of `node_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot persist the state.
    pub fn save<S: KeyValueStore + ?Sized>(
        &self,
        store: &mut S,
        node_id: &NodeId,
    ) -> Result<(), StoreError> {
        save_json(store, &StorageKey::schedule(node_id), self)
    }
}

/// Lifecycle phase of a notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifierPhase {
    /// No time chosen.
    Idle,
    /// Time chosen, no timer running.
    Pending,
    /// Timer running.
    Armed,
    /// Notification delivered (or suppressed by permission).
    Fired,
}

impl fmt::Display for NotifierPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Pending => "pending",
            Self::Armed => "armed",
            Self::Fired => "fired",
        };
        f.write_str(name)
    }
}

/// Combines a `YYYY-MM-DD` date and an `HH:MM` (or `HH:MM:SS`) time in the
/// local timezone into an instant.
///
/// # Errors
///
/// Returns an error if either input is blank or malformed, or if the
/// local time does not exist (skipped by a DST change).
pub fn parse_local_schedule(date: &str, time: &str) -> Result<DateTime<Utc>, NotifierError> {
    parse_schedule_in(date, time, &Local)
}

/// Same as [`parse_local_schedule`] for an explicit timezone.
///
/// # Errors
///
/// See [`parse_local_schedule`].
pub fn parse_schedule_in<Tz: TimeZone>(
    date: &str,
    time: &str,
    tz: &Tz,
) -> Result<DateTime<Utc>, NotifierError> {
    let (date, time) = (date.trim(), time.trim());
    let input = format!("{date}T{time}");
    let invalid = |reason: String| NotifierError::InvalidScheduledTime {
        input: input.clone(),
        reason,
    };

    if date.is_empty() || time.is_empty() {
        return Err(invalid("both a date and a time are required".to_string()));
    }

    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|e| invalid(e.to_string()))?;
    let clock = NaiveTime::parse_from_str(time, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
        .map_err(|e| invalid(e.to_string()))?;

    tz.from_local_datetime(&NaiveDateTime::new(day, clock))
        .earliest()
        .map(|at| at.with_timezone(&Utc))
        .ok_or_else(|| invalid("time does not exist in the local timezone".to_string()))
}
