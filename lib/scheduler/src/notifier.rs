//! Scheduled notifier state machine.
//!
//! One notifier per action node moves through
//! `Idle -> Pending -> Armed -> Fired`:
//!
//! - `pick` records a time and moves to `Pending` from any phase. Picking
//!   while `Armed` cancels the running timer first.
//! - `arm` starts a timer when the picked time lies in the future.
//! - `cancel` stops a running timer and returns to `Pending`.
//! - `fire` runs on timer expiry: it resolves the upstream chain, composes
//!   the summary and hands the notification to the surface.
//!
//! Every transition writes the node's `ScheduleState`. `fire` finishes all
//! of its awaiting before it touches the notifier, so dropping its future
//! leaves the schedule armed.

use crate::error::NotifierError;
use crate::notification::{Notification, NotificationSurface, NotificationTemplate, Permission};
use crate::state::{NotifierPhase, ScheduleState};
use crate::timer::{Timer, TimerExpiry, TimerHandle};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use waypost_core::NodeId;
use waypost_store::{KeyValueStore, StoreError};
use waypost_workflow::{WorkflowGraph, compose_summary};

/// How a fired notification was handled by the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The surface showed the notification.
    Delivered,
    /// Permission was not granted; nothing was shown.
    NotPermitted(Permission),
    /// The surface failed to show the notification.
    Failed(String),
}

/// Outcome of a fired schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FireReport {
    pub node_id: NodeId,
    pub notification: Notification,
    pub delivery: Delivery,
    /// Set when the fired state could not be written. The store still
    /// holds the armed state in that case.
    pub store_error: Option<StoreError>,
}

/// State machine of one action node's schedule.
#[derive(Debug)]
pub struct ScheduledNotifier {
    node_id: NodeId,
    phase: NotifierPhase,
    scheduled_time: Option<DateTime<Utc>>,
    generation: u64,
    timer: Option<TimerHandle>,
}

impl ScheduledNotifier {
    /// Creates an idle notifier.
    #[must_use]
    pub fn new(node_id: NodeId) -> Self {
        Self {
            node_id,
            phase: NotifierPhase::Idle,
            scheduled_time: None,
            generation: 0,
            timer: None,
        }
    }

    /// Rebuilds a notifier from its persisted state.
    ///
    /// A stored time comes back as `Pending`. Timers do not survive a
    /// reload, so a state written while armed also comes back `Pending`.
    pub fn restore<S: KeyValueStore + ?Sized>(node_id: NodeId, store: &S) -> Self {
        let mut notifier = Self::new(node_id);
        if let Some(state) = ScheduleState::load(store, &notifier.node_id) {
            if state.is_scheduled {
                warn!(node_id = %notifier.node_id, "schedule was armed before reload; timer not restored");
            }
            if let Some(at) = state.scheduled_time {
                notifier.scheduled_time = Some(at);
                notifier.phase = NotifierPhase::Pending;
            }
        }
        notifier
    }

    /// Restores a notifier for an owner that will drive it, rewriting a
    /// leftover armed flag as `isScheduled=false` since no timer survived.
    pub fn take_over<S: KeyValueStore + ?Sized>(node_id: NodeId, store: &mut S) -> Self {
        let notifier = Self::restore(node_id, &*store);
        let stale = ScheduleState::load(&*store, &notifier.node_id).is_some_and(|s| s.is_scheduled);
        if stale {
            let cleared = ScheduleState {
                scheduled_time: notifier.scheduled_time,
                is_scheduled: false,
            };
            if let Err(e) = cleared.save(store, &notifier.node_id) {
                warn!(node_id = %notifier.node_id, error = %e, "failed to clear stale armed flag");
            }
        }
        notifier
    }

    #[must_use]
    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    #[must_use]
    pub fn phase(&self) -> NotifierPhase {
        self.phase
    }

    #[must_use]
    pub fn scheduled_time(&self) -> Option<DateTime<Utc>> {
        self.scheduled_time
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.phase == NotifierPhase::Armed
    }

    /// Records `at` as the scheduled time.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be persisted; the notifier is
    /// left unchanged in that case.
    pub fn pick<S: KeyValueStore + ?Sized>(
        &mut self,
        at: DateTime<Utc>,
        store: &mut S,
    ) -> Result<(), NotifierError> {
        ScheduleState {
            scheduled_time: Some(at),
            is_scheduled: false,
        }
        .save(store, &self.node_id)?;

        if let Some(handle) = self.timer.take() {
            info!(node_id = %self.node_id, "re-pick cancels the running timer");
            handle.cancel();
            self.generation += 1;
        }

        self.scheduled_time = Some(at);
        self.phase = NotifierPhase::Pending;
        debug!(node_id = %self.node_id, scheduled = %at, "time picked");
        Ok(())
    }

    /// Starts the timer for the picked time. Returns the delay.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the notifier unchanged, if:
    /// - No time was picked
    /// - The notifier is already armed or has fired
    /// - The picked time is not after `now`
    /// - The state cannot be persisted
    pub fn arm<S, T>(
        &mut self,
        now: DateTime<Utc>,
        timer: &T,
        store: &mut S,
    ) -> Result<Duration, NotifierError>
    where
        S: KeyValueStore + ?Sized,
        T: Timer + ?Sized,
    {
        match self.phase {
            NotifierPhase::Pending => {}
            NotifierPhase::Idle => {
                return Err(NotifierError::NothingScheduled {
                    node_id: self.node_id.clone(),
                });
            }
            from => {
                return Err(NotifierError::InvalidTransition {
                    node_id: self.node_id.clone(),
                    from,
                    action: "arm",
                });
            }
        }

        let Some(at) = self.scheduled_time else {
            return Err(NotifierError::NothingScheduled {
                node_id: self.node_id.clone(),
            });
        };
        let not_in_future = || NotifierError::ScheduledTimeNotInFuture {
            node_id: self.node_id.clone(),
            scheduled: at,
            now,
        };
        if at <= now {
            return Err(not_in_future());
        }
        let delay = (at - now).to_std().map_err(|_| not_in_future())?;

        ScheduleState {
            scheduled_time: Some(at),
            is_scheduled: true,
        }
        .save(store, &self.node_id)?;

        self.generation += 1;
        let expiry = TimerExpiry {
            node_id: self.node_id.clone(),
            generation: self.generation,
        };
        self.timer = Some(timer.start(expiry, delay));
        self.phase = NotifierPhase::Armed;
        info!(node_id = %self.node_id, scheduled = %at, delay_secs = delay.as_secs(), "schedule armed");
        Ok(delay)
    }

    /// Stops the running timer and returns to `Pending`.
    ///
    /// # Errors
    ///
    /// Returns an error if the notifier is not armed or the state cannot be
    /// persisted.
    pub fn cancel<S: KeyValueStore + ?Sized>(&mut self, store: &mut S) -> Result<(), NotifierError> {
        if self.phase != NotifierPhase::Armed {
            return Err(NotifierError::InvalidTransition {
                node_id: self.node_id.clone(),
                from: self.phase,
                action: "cancel",
            });
        }

        ScheduleState {
            scheduled_time: self.scheduled_time,
            is_scheduled: false,
        }
        .save(store, &self.node_id)?;

        if let Some(handle) = self.timer.take() {
            handle.cancel();
        }
        self.generation += 1;
        self.phase = NotifierPhase::Pending;
        info!(node_id = %self.node_id, "schedule cancelled");
        Ok(())
    }

    /// Returns whether `expiry` belongs to the currently running timer.
    #[must_use]
    pub fn accepts(&self, expiry: &TimerExpiry) -> bool {
        self.phase == NotifierPhase::Armed
            && expiry.node_id == self.node_id
            && expiry.generation == self.generation
    }

    /// Handles a timer expiry.
    ///
    /// Returns `None` for an expiry of a cancelled or superseded timer.
    /// Otherwise the permission is settled and the notification handed to
    /// the surface before the notifier moves to `Fired`, whatever the
    /// surface does with it. A failure to persist the fired state is logged
    /// and carried in the report.
    #[instrument(skip_all, fields(node_id = %self.node_id, generation = expiry.generation))]
    pub async fn fire<S, N>(
        &mut self,
        expiry: &TimerExpiry,
        graph: &WorkflowGraph,
        store: &mut S,
        surface: &N,
        template: &NotificationTemplate,
    ) -> Option<FireReport>
    where
        S: KeyValueStore + ?Sized,
        N: NotificationSurface + ?Sized,
    {
        if !self.accepts(expiry) {
            debug!(phase = %self.phase, current = self.generation, "ignoring stale expiry");
            return None;
        }

        let chain = graph.resolve_chain(&self.node_id);
        let body = compose_summary(&chain, &*store);
        let notification = template.render(&self.node_id, body);

        let mut permission = surface.permission();
        if permission == Permission::Default {
            permission = surface.request_permission().await;
        }

        let delivery = if permission == Permission::Granted {
            match surface.notify(&notification).await {
                Ok(()) => Delivery::Delivered,
                Err(e) => {
                    warn!(error = %e, "notification not shown");
                    Delivery::Failed(e.to_string())
                }
            }
        } else {
            info!(permission = %permission, "notification suppressed");
            Delivery::NotPermitted(permission)
        };

        self.timer = None;
        self.phase = NotifierPhase::Fired;
        let store_error = ScheduleState {
            scheduled_time: self.scheduled_time,
            is_scheduled: false,
        }
        .save(store, &self.node_id)
        .err();
        if let Some(e) = &store_error {
            error!(error = %e, "fired state not persisted");
        }

        info!(steps = chain.len(), "schedule fired");
        Some(FireReport {
            node_id: self.node_id.clone(),
            notification,
            delivery,
            store_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::recording::RecordingSurface;
    use crate::error::NotificationError;
    use crate::timer::manual::ManualTimer;
    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use std::path::PathBuf;
    use waypost_store::MemoryStore;
    use waypost_workflow::{AnnotationStore, Node, NodeKind, Position};

    /// Store whose writes start failing once `failing` is set.
    #[derive(Debug, Default)]
    struct FlakyStore {
        inner: MemoryStore,
        failing: bool,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Option<String> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
            if self.failing {
                return Err(StoreError::Io {
                    path: PathBuf::from("store.json"),
                    reason: "disk full".to_string(),
                });
            }
            self.inner.set(key, value)
        }

        fn keys(&self) -> Vec<String> {
            self.inner.keys()
        }
    }

    /// Surface that never answers a permission request.
    struct UnansweredSurface;

    #[async_trait]
    impl NotificationSurface for UnansweredSurface {
        fn permission(&self) -> Permission {
            Permission::Default
        }

        async fn request_permission(&self) -> Permission {
            std::future::pending().await
        }

        async fn notify(&self, _: &Notification) -> Result<(), NotificationError> {
            Ok(())
        }
    }

    struct Fixture {
        graph: WorkflowGraph,
        store: MemoryStore,
        timer: ManualTimer,
        template: NotificationTemplate,
        action: NodeId,
    }

    /// `intro -> details -> action`, with notes on `intro` only.
    fn fixture() -> Fixture {
        let mut graph = WorkflowGraph::new();
        let mut store = MemoryStore::new();
        let intro = NodeId::new("intro");
        let details = NodeId::new("details");
        let action = NodeId::new("act");

        graph
            .add_node(Node::with_id(intro.clone(), NodeKind::Note, Position::default()))
            .unwrap();
        graph
            .add_node(Node::with_id(details.clone(), NodeKind::Note, Position::default()))
            .unwrap();
        graph
            .add_node(Node::with_id(action.clone(), NodeKind::Action, Position::default()))
            .unwrap();
        graph.connect(&intro, &details).unwrap();
        graph.connect(&details, &action).unwrap();

        store
            .edit_annotation(&intro, |r| r.set_notes("hi"))
            .unwrap();

        Fixture {
            graph,
            store,
            timer: ManualTimer::new(),
            template: NotificationTemplate::default(),
            action,
        }
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-10-18T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn new_notifier_is_idle() {
        let notifier = ScheduledNotifier::new(NodeId::new("act"));
        assert_eq!(notifier.phase(), NotifierPhase::Idle);
        assert!(notifier.scheduled_time().is_none());
    }

    #[test]
    fn pick_persists_pending_state() {
        let mut f = fixture();
        let mut notifier = ScheduledNotifier::new(f.action.clone());
        let at = now() + ChronoDuration::hours(1);

        notifier.pick(at, &mut f.store).unwrap();

        assert_eq!(notifier.phase(), NotifierPhase::Pending);
        assert_eq!(
            ScheduleState::load(&f.store, &f.action),
            Some(ScheduleState {
                scheduled_time: Some(at),
                is_scheduled: false
            })
        );
    }

    #[test]
    fn arming_in_the_past_is_rejected_without_transition() {
        let mut f = fixture();
        let mut notifier = ScheduledNotifier::new(f.action.clone());
        notifier
            .pick(now() - ChronoDuration::seconds(1), &mut f.store)
            .unwrap();

        let err = notifier.arm(now(), &f.timer, &mut f.store).unwrap_err();

        assert!(matches!(err, NotifierError::ScheduledTimeNotInFuture { .. }));
        assert_eq!(notifier.phase(), NotifierPhase::Pending);
        assert_eq!(f.timer.started_count(), 0);
        assert!(!ScheduleState::load(&f.store, &f.action).unwrap().is_scheduled);
    }

    #[test]
    fn arming_at_exactly_now_is_rejected() {
        let mut f = fixture();
        let mut notifier = ScheduledNotifier::new(f.action.clone());
        notifier.pick(now(), &mut f.store).unwrap();

        assert!(notifier.arm(now(), &f.timer, &mut f.store).is_err());
        assert_eq!(f.timer.started_count(), 0);
    }

    #[test]
    fn arming_without_pick_is_rejected() {
        let mut f = fixture();
        let mut notifier = ScheduledNotifier::new(f.action.clone());

        let err = notifier.arm(now(), &f.timer, &mut f.store).unwrap_err();
        assert!(matches!(err, NotifierError::NothingScheduled { .. }));
    }

    #[test]
    fn arming_twice_is_rejected() {
        let mut f = fixture();
        let mut notifier = ScheduledNotifier::new(f.action.clone());
        notifier
            .pick(now() + ChronoDuration::minutes(5), &mut f.store)
            .unwrap();
        notifier.arm(now(), &f.timer, &mut f.store).unwrap();

        let err = notifier.arm(now(), &f.timer, &mut f.store).unwrap_err();
        assert!(matches!(
            err,
            NotifierError::InvalidTransition {
                from: NotifierPhase::Armed,
                ..
            }
        ));
        assert_eq!(f.timer.started_count(), 1);
    }

    #[tokio::test]
    async fn armed_schedule_fires_with_summary() {
        let mut f = fixture();
        let surface = RecordingSurface::granted();
        let mut notifier = ScheduledNotifier::new(f.action.clone());
        notifier
            .pick(now() + ChronoDuration::hours(1), &mut f.store)
            .unwrap();

        let delay = notifier.arm(now(), &f.timer, &mut f.store).unwrap();
        assert_eq!(delay, Duration::from_secs(3600));
        assert_eq!(notifier.phase(), NotifierPhase::Armed);
        assert!(ScheduleState::load(&f.store, &f.action).unwrap().is_scheduled);

        let expiry = f.timer.live().pop().expect("timer started");
        let report = notifier
            .fire(&expiry, &f.graph, &mut f.store, &surface, &f.template)
            .await
            .expect("expiry accepted");

        let expected = compose_summary(&f.graph.resolve_chain(&f.action), &f.store);
        assert_eq!(expected, "Step 1:\nNotes: hi\n\nStep 2:");
        assert_eq!(report.notification.body, expected);
        assert_eq!(report.notification.tag, "act");
        assert_eq!(report.delivery, Delivery::Delivered);
        assert_eq!(report.store_error, None);
        assert_eq!(surface.shown(), vec![report.notification.clone()]);
        assert_eq!(notifier.phase(), NotifierPhase::Fired);
        assert!(!ScheduleState::load(&f.store, &f.action).unwrap().is_scheduled);
    }

    #[tokio::test]
    async fn repick_while_armed_cancels_prior_timer() {
        let mut f = fixture();
        let surface = RecordingSurface::granted();
        let mut notifier = ScheduledNotifier::new(f.action.clone());
        notifier
            .pick(now() + ChronoDuration::hours(1), &mut f.store)
            .unwrap();
        notifier.arm(now(), &f.timer, &mut f.store).unwrap();

        notifier
            .pick(now() + ChronoDuration::hours(2), &mut f.store)
            .unwrap();
        assert_eq!(notifier.phase(), NotifierPhase::Pending);
        assert!(f.timer.live().is_empty());

        notifier.arm(now(), &f.timer, &mut f.store).unwrap();
        assert_eq!(
            f.timer.delays(),
            vec![Duration::from_secs(3600), Duration::from_secs(7200)]
        );

        // The first timer's message may still be in flight.
        let stale = f.timer.all()[0].clone();
        let outcome = notifier
            .fire(&stale, &f.graph, &mut f.store, &surface, &f.template)
            .await;
        assert!(outcome.is_none());
        assert_eq!(notifier.phase(), NotifierPhase::Armed);
        assert!(surface.shown().is_empty());
    }

    #[tokio::test]
    async fn cancel_returns_to_pending_and_ignores_expiry() {
        let mut f = fixture();
        let surface = RecordingSurface::granted();
        let mut notifier = ScheduledNotifier::new(f.action.clone());
        notifier
            .pick(now() + ChronoDuration::hours(1), &mut f.store)
            .unwrap();
        notifier.arm(now(), &f.timer, &mut f.store).unwrap();
        let expiry = f.timer.all()[0].clone();

        notifier.cancel(&mut f.store).unwrap();

        assert_eq!(notifier.phase(), NotifierPhase::Pending);
        assert!(f.timer.live().is_empty());
        assert!(!ScheduleState::load(&f.store, &f.action).unwrap().is_scheduled);
        let outcome = notifier
            .fire(&expiry, &f.graph, &mut f.store, &surface, &f.template)
            .await;
        assert!(outcome.is_none());
    }

    #[test]
    fn cancel_requires_armed() {
        let mut f = fixture();
        let mut notifier = ScheduledNotifier::new(f.action.clone());
        assert!(matches!(
            notifier.cancel(&mut f.store),
            Err(NotifierError::InvalidTransition { action: "cancel", .. })
        ));
    }

    #[tokio::test]
    async fn denied_permission_still_fires() {
        let mut f = fixture();
        let surface = RecordingSurface::new(Permission::Denied, Permission::Denied);
        let mut notifier = ScheduledNotifier::new(f.action.clone());
        notifier
            .pick(now() + ChronoDuration::minutes(1), &mut f.store)
            .unwrap();
        notifier.arm(now(), &f.timer, &mut f.store).unwrap();

        let expiry = f.timer.live().pop().unwrap();
        let report = notifier
            .fire(&expiry, &f.graph, &mut f.store, &surface, &f.template)
            .await
            .unwrap();

        assert_eq!(report.delivery, Delivery::NotPermitted(Permission::Denied));
        assert_eq!(notifier.phase(), NotifierPhase::Fired);
        assert!(surface.shown().is_empty());
        assert_eq!(surface.requests(), 0);
    }

    #[tokio::test]
    async fn default_permission_is_requested_once() {
        let mut f = fixture();
        let surface = RecordingSurface::new(Permission::Default, Permission::Granted);
        let mut notifier = ScheduledNotifier::new(f.action.clone());
        notifier
            .pick(now() + ChronoDuration::minutes(1), &mut f.store)
            .unwrap();
        notifier.arm(now(), &f.timer, &mut f.store).unwrap();

        let expiry = f.timer.live().pop().unwrap();
        let report = notifier
            .fire(&expiry, &f.graph, &mut f.store, &surface, &f.template)
            .await
            .unwrap();

        assert_eq!(surface.requests(), 1);
        assert_eq!(report.delivery, Delivery::Delivered);
    }

    #[tokio::test]
    async fn fired_notifier_can_be_picked_again() {
        let mut f = fixture();
        let surface = RecordingSurface::granted();
        let mut notifier = ScheduledNotifier::new(f.action.clone());
        notifier
            .pick(now() + ChronoDuration::minutes(1), &mut f.store)
            .unwrap();
        notifier.arm(now(), &f.timer, &mut f.store).unwrap();
        let expiry = f.timer.live().pop().unwrap();
        notifier
            .fire(&expiry, &f.graph, &mut f.store, &surface, &f.template)
            .await;

        assert!(notifier.arm(now(), &f.timer, &mut f.store).is_err());
        notifier
            .pick(now() + ChronoDuration::minutes(5), &mut f.store)
            .unwrap();
        assert!(notifier.arm(now(), &f.timer, &mut f.store).is_ok());
    }

    #[test]
    fn restore_brings_back_pending_without_timer() {
        let mut f = fixture();
        let at = now() + ChronoDuration::hours(1);
        let mut notifier = ScheduledNotifier::new(f.action.clone());
        notifier.pick(at, &mut f.store).unwrap();
        notifier.arm(now(), &f.timer, &mut f.store).unwrap();
        drop(notifier);

        let restored = ScheduledNotifier::restore(f.action.clone(), &f.store);

        assert_eq!(restored.phase(), NotifierPhase::Pending);
        assert_eq!(restored.scheduled_time(), Some(at));
        assert!(!restored.is_armed());
    }

    #[test]
    fn restore_without_state_is_idle() {
        let f = fixture();
        let restored = ScheduledNotifier::restore(f.action.clone(), &f.store);
        assert_eq!(restored.phase(), NotifierPhase::Idle);
    }

    #[tokio::test]
    async fn failed_save_still_delivers_and_reports() {
        let f = fixture();
        let surface = RecordingSurface::granted();
        let mut store = FlakyStore {
            inner: f.store.clone(),
            failing: false,
        };
        let mut notifier = ScheduledNotifier::new(f.action.clone());
        notifier
            .pick(now() + ChronoDuration::minutes(1), &mut store)
            .unwrap();
        notifier.arm(now(), &f.timer, &mut store).unwrap();
        store.failing = true;

        let expiry = f.timer.live().pop().unwrap();
        let report = notifier
            .fire(&expiry, &f.graph, &mut store, &surface, &f.template)
            .await
            .expect("expiry accepted");

        assert_eq!(report.delivery, Delivery::Delivered);
        assert!(matches!(report.store_error, Some(StoreError::Io { .. })));
        assert_eq!(surface.shown().len(), 1);
        assert_eq!(notifier.phase(), NotifierPhase::Fired);
        assert!(ScheduleState::load(&store, &f.action).unwrap().is_scheduled);
    }

    #[tokio::test(start_paused = true)]
    async fn fire_dropped_while_asking_permission_stays_armed() {
        let mut f = fixture();
        let mut notifier = ScheduledNotifier::new(f.action.clone());
        notifier
            .pick(now() + ChronoDuration::minutes(1), &mut f.store)
            .unwrap();
        notifier.arm(now(), &f.timer, &mut f.store).unwrap();
        let expiry = f.timer.live().pop().unwrap();
        let surface = UnansweredSurface;

        let firing = notifier.fire(&expiry, &f.graph, &mut f.store, &surface, &f.template);
        let waited = tokio::time::timeout(Duration::from_secs(5), firing).await;
        assert!(waited.is_err());

        assert_eq!(notifier.phase(), NotifierPhase::Armed);
        assert!(notifier.accepts(&expiry));
        assert!(ScheduleState::load(&f.store, &f.action).unwrap().is_scheduled);
        notifier.cancel(&mut f.store).unwrap();
        assert!(!ScheduleState::load(&f.store, &f.action).unwrap().is_scheduled);
    }

    #[test]
    fn take_over_clears_stale_armed_flag() {
        let mut f = fixture();
        let at = now() + ChronoDuration::hours(1);
        let mut notifier = ScheduledNotifier::new(f.action.clone());
        notifier.pick(at, &mut f.store).unwrap();
        notifier.arm(now(), &f.timer, &mut f.store).unwrap();
        drop(notifier);

        let observed = ScheduledNotifier::restore(f.action.clone(), &f.store);
        assert_eq!(observed.phase(), NotifierPhase::Pending);
        assert!(ScheduleState::load(&f.store, &f.action).unwrap().is_scheduled);

        let owned = ScheduledNotifier::take_over(f.action.clone(), &mut f.store);
        assert_eq!(owned.phase(), NotifierPhase::Pending);
        assert_eq!(
            ScheduleState::load(&f.store, &f.action),
            Some(ScheduleState {
                scheduled_time: Some(at),
                is_scheduled: false
            })
        );
    }
}
