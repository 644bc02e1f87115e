//! Scheduled notifications for action nodes.
//!
//! This crate provides:
//!
//! - **Schedule State**: the persisted time and armed flag of an action node
//! - **Notifier**: the Idle/Pending/Armed/Fired state machine per action node
//! - **Timers**: one-shot timers with cancellation handles
//! - **Notifications**: the platform surface a fired schedule delivers to
//! - **Workbench**: the event loop routing timer expiries to notifiers

pub mod error;
pub mod notification;
pub mod notifier;
pub mod state;
pub mod timer;
pub mod workbench;

pub use error::{NotificationError, NotifierError, WorkbenchError};
pub use notification::{Notification, NotificationSurface, NotificationTemplate, Permission};
pub use notifier::{Delivery, FireReport, ScheduledNotifier};
pub use state::{NotifierPhase, ScheduleState, parse_local_schedule, parse_schedule_in};
pub use timer::{Timer, TimerExpiry, TimerHandle, TokioTimer};
pub use workbench::{RunOutcome, Workbench};
