//! Workbench: owns the graph, the store and every notifier.
//!
//! Timers post [`TimerExpiry`] messages on a channel; the workbench is the
//! single receiver and the only place notifiers are mutated, so expiries
//! are handled one at a time against a consistent graph and store.
//!
//! Other processes may edit the workflow while schedules wait. A graph
//! reload hook, when set, is consulted before each accepted expiry so the
//! summary is composed from the current graph.

use crate::error::WorkbenchError;
use crate::notification::{NotificationSurface, NotificationTemplate};
use crate::notifier::{FireReport, ScheduledNotifier};
use crate::state::{NotifierPhase, ScheduleState};
use crate::timer::{Timer, TimerExpiry};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, info, warn};
use waypost_core::NodeId;
use waypost_store::KeyValueStore;
use waypost_workflow::{Node, WorkflowGraph};

type GraphReload = Box<dyn FnMut() -> Option<WorkflowGraph>>;

/// Result of [`Workbench::run_until_idle`].
#[derive(Debug, Default)]
pub struct RunOutcome {
    /// Schedules fired during the run, in firing order.
    pub reports: Vec<FireReport>,
    /// Whether the shutdown future ended the run.
    pub interrupted: bool,
}

/// Event-loop owner of a workflow and its schedules.
pub struct Workbench<S, N, T> {
    graph: WorkflowGraph,
    store: S,
    surface: N,
    timer: T,
    template: NotificationTemplate,
    notifiers: HashMap<NodeId, ScheduledNotifier>,
    reload: Option<GraphReload>,
}

impl<S, N, T> Workbench<S, N, T>
where
    S: KeyValueStore,
    N: NotificationSurface,
    T: Timer,
{
    /// Creates a workbench, restoring the schedule of every action node
    /// found in `store`. Armed flags left by an earlier session are
    /// cleared, since their timers are gone.
    pub fn new(graph: WorkflowGraph, mut store: S, surface: N, timer: T) -> Self {
        let notifiers = graph
            .action_nodes()
            .map(|node| {
                let notifier = ScheduledNotifier::take_over(node.id.clone(), &mut store);
                (node.id.clone(), notifier)
            })
            .collect();

        Self {
            graph,
            store,
            surface,
            timer,
            template: NotificationTemplate::default(),
            notifiers,
            reload: None,
        }
    }

    #[must_use]
    pub fn with_template(mut self, template: NotificationTemplate) -> Self {
        self.template = template;
        self
    }

    /// Sets a hook returning the latest graph. It runs before each accepted
    /// expiry; `None` keeps the graph already held.
    #[must_use]
    pub fn with_graph_reload(
        mut self,
        reload: impl FnMut() -> Option<WorkflowGraph> + 'static,
    ) -> Self {
        self.reload = Some(Box::new(reload));
        self
    }

    pub fn graph(&self) -> &WorkflowGraph {
        &self.graph
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn surface(&self) -> &N {
        &self.surface
    }

    /// Records a scheduled time for an action node.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is missing or not an action node, or if
    /// the state cannot be persisted.
    pub fn pick(&mut self, node_id: &NodeId, at: DateTime<Utc>) -> Result<(), WorkbenchError> {
        let store = &mut self.store;
        let notifier = Self::lookup(&self.graph, &mut self.notifiers, &mut *store, node_id)?;
        notifier.pick(at, store)?;
        Ok(())
    }

    /// Arms the picked time of an action node. Returns the timer delay.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is missing or not an action node, or if
    /// the notifier rejects arming (see [`ScheduledNotifier::arm`]).
    pub fn arm(&mut self, node_id: &NodeId, now: DateTime<Utc>) -> Result<Duration, WorkbenchError> {
        let store = &mut self.store;
        let notifier = Self::lookup(&self.graph, &mut self.notifiers, &mut *store, node_id)?;
        Ok(notifier.arm(now, &self.timer, store)?)
    }

    /// Picks `at` and arms it in one step.
    ///
    /// # Errors
    ///
    /// See [`Workbench::pick`] and [`Workbench::arm`]. A time that is not in
    /// the future stays picked but unarmed.
    pub fn schedule(
        &mut self,
        node_id: &NodeId,
        at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Duration, WorkbenchError> {
        self.pick(node_id, at)?;
        self.arm(node_id, now)
    }

    /// Cancels the running timer of an action node.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is missing, not an action node, or not
    /// armed.
    pub fn cancel(&mut self, node_id: &NodeId) -> Result<(), WorkbenchError> {
        let store = &mut self.store;
        let notifier = Self::lookup(&self.graph, &mut self.notifiers, &mut *store, node_id)?;
        notifier.cancel(store)?;
        Ok(())
    }

    /// Cancels every running timer. Returns how many were cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let mut cancelled = 0;
        for notifier in self.notifiers.values_mut().filter(|n| n.is_armed()) {
            match notifier.cancel(&mut self.store) {
                Ok(()) => cancelled += 1,
                Err(e) => error!(node_id = %notifier.node_id(), error = %e, "failed to cancel schedule"),
            }
        }
        cancelled
    }

    /// Removes a node from the graph, cancelling its schedule first.
    pub fn remove_node(&mut self, node_id: &NodeId) -> Option<Node> {
        if let Some(mut notifier) = self.notifiers.remove(node_id) {
            if notifier.is_armed() {
                if let Err(e) = notifier.cancel(&mut self.store) {
                    warn!(node_id = %node_id, error = %e, "failed to persist cancelled schedule");
                }
            }
        }
        self.graph.remove_node(node_id)
    }

    /// Current phase of an action node, `None` for unknown or non-action
    /// nodes.
    #[must_use]
    pub fn phase(&self, node_id: &NodeId) -> Option<NotifierPhase> {
        if let Some(notifier) = self.notifiers.get(node_id) {
            return Some(notifier.phase());
        }
        self.graph
            .node(node_id)
            .filter(|node| node.is_action())
            .map(|_| NotifierPhase::Idle)
    }

    /// Persisted schedule state of a node.
    #[must_use]
    pub fn schedule_state(&self, node_id: &NodeId) -> Option<ScheduleState> {
        ScheduleState::load(&self.store, node_id)
    }

    #[must_use]
    pub fn armed_count(&self) -> usize {
        self.notifiers.values().filter(|n| n.is_armed()).count()
    }

    /// Arms every pending schedule whose time is after `now`. Pending
    /// schedules already in the past are left pending. Returns the armed
    /// node ids.
    pub fn rearm_pending(&mut self, now: DateTime<Utc>) -> Vec<NodeId> {
        let mut armed = Vec::new();
        for notifier in self
            .notifiers
            .values_mut()
            .filter(|n| n.phase() == NotifierPhase::Pending)
        {
            match notifier.arm(now, &self.timer, &mut self.store) {
                Ok(_) => armed.push(notifier.node_id().clone()),
                Err(e) => warn!(node_id = %notifier.node_id(), error = %e, "pending schedule not armed"),
            }
        }
        armed.sort();
        armed
    }

    /// Routes a timer expiry to its notifier.
    ///
    /// Returns `None` for expiries of cancelled, superseded or removed
    /// schedules.
    pub async fn handle_expiry(&mut self, expiry: &TimerExpiry) -> Option<FireReport> {
        let accepted = self
            .notifiers
            .get(&expiry.node_id)
            .is_some_and(|n| n.accepts(expiry));
        if accepted {
            self.reload_graph();
        }

        let Some(notifier) = self.notifiers.get_mut(&expiry.node_id) else {
            debug!(node_id = %expiry.node_id, "expiry for unknown node");
            return None;
        };
        notifier
            .fire(
                expiry,
                &self.graph,
                &mut self.store,
                &self.surface,
                &self.template,
            )
            .await
    }

    /// Receives and handles expiries until no schedule is armed, the
    /// channel closes or `shutdown` completes.
    ///
    /// Only the wait for the next expiry races `shutdown`; an expiry that
    /// was received is always handled to the end.
    pub async fn run_until_idle<F>(
        &mut self,
        expiries: &mut UnboundedReceiver<TimerExpiry>,
        shutdown: F,
    ) -> RunOutcome
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut outcome = RunOutcome::default();
        while self.armed_count() > 0 {
            let received = tokio::select! {
                received = expiries.recv() => received,
                () = &mut shutdown => {
                    outcome.interrupted = true;
                    break;
                }
            };
            let Some(expiry) = received else {
                warn!("timer channel closed with schedules still armed");
                break;
            };
            if let Some(report) = self.handle_expiry(&expiry).await {
                outcome.reports.push(report);
            }
        }
        info!(
            fired = outcome.reports.len(),
            interrupted = outcome.interrupted,
            "stopped waiting for schedules"
        );
        outcome
    }

    fn reload_graph(&mut self) {
        if let Some(graph) = self.reload.as_mut().and_then(|reload| reload()) {
            debug!(nodes = graph.node_count(), "graph reloaded");
            self.graph = graph;
        }
    }

    fn lookup<'a>(
        graph: &WorkflowGraph,
        notifiers: &'a mut HashMap<NodeId, ScheduledNotifier>,
        store: &mut S,
        node_id: &NodeId,
    ) -> Result<&'a mut ScheduledNotifier, WorkbenchError> {
        let node = graph
            .node(node_id)
            .ok_or_else(|| WorkbenchError::NodeNotFound {
                node_id: node_id.clone(),
            })?;
        if !node.is_action() {
            return Err(WorkbenchError::NotAnActionNode {
                node_id: node_id.clone(),
            });
        }
        Ok(notifiers
            .entry(node_id.clone())
            .or_insert_with(|| ScheduledNotifier::take_over(node_id.clone(), store)))
    }
}
