//! Command execution.
//!
//! Each command loads the workspace, applies its change, saves what it
//! touched and returns the text to print.

use crate::cli::{Cli, Command, NodeCommand, ScheduleArgs};
use crate::config::CliConfig;
use crate::error::CliError;
use crate::surface::TerminalSurface;
use crate::workspace::{Workspace, load_graph};
use chrono::{Local, Utc};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};
use waypost_core::NodeId;
use waypost_scheduler::{
    Delivery, FireReport, NotifierPhase, ScheduledNotifier, TimerExpiry, TokioTimer, Workbench,
    parse_local_schedule,
};
use waypost_store::JsonFileStore;
use waypost_workflow::{AnnotationStore, Node, Position, WorkflowGraph, compose_summary};

type CommandResult = waypost_core::Result<String, CliError>;

type CliWorkbench = Workbench<JsonFileStore, TerminalSurface, TokioTimer>;

/// Runs `cli` and returns its output.
///
/// # Errors
///
/// Returns an error if configuration, the workspace or the command fails.
pub async fn execute(cli: Cli) -> CommandResult {
    let data_dir = cli.global.data_dir;
    let config = CliConfig::load(&data_dir).map_err(|e| CliError::Config {
        reason: e.to_string(),
    })?;
    let mut workspace = Workspace::open(&data_dir)?;

    match cli.command {
        Command::Node(command) => node(&mut workspace, command),
        Command::Connect { source, target } => {
            let edge_id = workspace
                .graph_mut()
                .connect(&source, &target)
                .map_err(CliError::from)?;
            workspace.save_graph()?;
            Ok(format!("connected {source} -> {target} ({edge_id})"))
        }
        Command::Disconnect { edge_id } => {
            let edge = workspace
                .graph_mut()
                .disconnect(&edge_id)
                .map_err(CliError::from)?;
            workspace.save_graph()?;
            Ok(format!("disconnected {} -> {}", edge.source, edge.target))
        }
        Command::Lock => set_locked(&mut workspace, true),
        Command::Unlock => set_locked(&mut workspace, false),
        Command::Note { node_id, text } => {
            require_node(workspace.graph(), &node_id)?;
            let extract = config.annotations.extract_links;
            let record = workspace
                .store_mut()
                .edit_annotation(&node_id, |record| {
                    record.set_notes(text);
                    if extract {
                        record.absorb_links_from_notes();
                    }
                })
                .map_err(CliError::from)?;
            Ok(format!(
                "notes saved for {node_id} ({} link(s))",
                record.links.len()
            ))
        }
        Command::Attach { node_id, files } => {
            require_node(workspace.graph(), &node_id)?;
            let record = workspace
                .store_mut()
                .edit_annotation(&node_id, |record| record.add_files(files))
                .map_err(CliError::from)?;
            Ok(format!("{node_id} has {} file(s)", record.files.len()))
        }
        Command::Link { node_id, url } => {
            require_node(workspace.graph(), &node_id)?;
            let record = workspace
                .store_mut()
                .edit_annotation(&node_id, |record| record.add_link(url))
                .map_err(CliError::from)?;
            Ok(format!("{node_id} has {} link(s)", record.links.len()))
        }
        Command::Show { node_id } => show(&workspace, &node_id),
        Command::Chain { node_id } => {
            require_node(workspace.graph(), &node_id)?;
            let chain = workspace.graph().resolve_chain(&node_id);
            if chain.is_empty() {
                return Ok(format!("nothing feeds {node_id}"));
            }
            Ok(chain
                .iter()
                .enumerate()
                .map(|(index, node)| format!("{}. {} ({})", index + 1, node.id, node.label))
                .collect::<Vec<_>>()
                .join("\n"))
        }
        Command::Summary { node_id } => {
            require_node(workspace.graph(), &node_id)?;
            let chain = workspace.graph().resolve_chain(&node_id);
            Ok(compose_summary(&chain, workspace.store()))
        }
        Command::Schedule(args) => schedule(workspace, &config, args).await,
        Command::Status => Ok(status(&workspace)),
        Command::Run => run(workspace, &config).await,
    }
}

fn node(workspace: &mut Workspace, command: NodeCommand) -> CommandResult {
    match command {
        NodeCommand::Add {
            kind,
            id,
            label,
            x,
            y,
        } => {
            let position = Position::new(x, y);
            let mut node = match id {
                Some(id) => Node::with_id(id, kind, position),
                None => Node::new(kind, position),
            };
            if let Some(label) = label {
                node = node.with_label(label);
            }
            let node_id = workspace
                .graph_mut()
                .add_node(node)
                .map_err(CliError::from)?;
            workspace.save_graph()?;
            Ok(node_id.to_string())
        }
        NodeCommand::Remove { node_id } => {
            let removed = workspace
                .graph_mut()
                .remove_node(&node_id)
                .ok_or_else(|| CliError::UnknownNode {
                    node_id: node_id.clone(),
                })?;
            workspace.save_graph()?;
            Ok(format!("removed {} ({})", removed.id, removed.label))
        }
        NodeCommand::List => {
            let graph = workspace.graph();
            let mut lines: Vec<String> = graph
                .nodes()
                .map(|node| format!("{}\t{}\t{}", node.id, node.kind, node.label))
                .collect();
            lines.extend(
                graph
                    .edges()
                    .into_iter()
                    .map(|edge| format!("{}\t{} -> {}", edge.id, edge.source, edge.target)),
            );
            if graph.is_locked() {
                lines.push("(locked)".to_string());
            }
            Ok(lines.join("\n"))
        }
    }
}

fn set_locked(workspace: &mut Workspace, locked: bool) -> CommandResult {
    workspace.graph_mut().set_locked(locked);
    workspace.save_graph()?;
    Ok(if locked { "locked" } else { "unlocked" }.to_string())
}

fn require_node<'a>(graph: &'a WorkflowGraph, node_id: &NodeId) -> Result<&'a Node, CliError> {
    graph.node(node_id).ok_or_else(|| CliError::UnknownNode {
        node_id: node_id.clone(),
    })
}

fn show(workspace: &Workspace, node_id: &NodeId) -> CommandResult {
    let node = require_node(workspace.graph(), node_id)?;
    let mut lines = vec![format!("{} ({}): {}", node.id, node.kind, node.label)];

    if let Some(record) = workspace.store().annotation(node_id) {
        if !record.notes.trim().is_empty() {
            lines.push(format!("Notes: {}", record.notes.trim()));
        }
        lines.extend(record.files.iter().map(|file| format!("File: {}", file.name)));
        lines.extend(record.links.iter().map(|link| format!("Link: {link}")));
    }
    if node.is_action() {
        let notifier = ScheduledNotifier::restore(node_id.clone(), workspace.store());
        lines.push(format!("Schedule: {}", describe(&notifier)));
    }
    Ok(lines.join("\n"))
}

fn describe(notifier: &ScheduledNotifier) -> String {
    match notifier.scheduled_time() {
        Some(at) => format!(
            "{} at {}",
            notifier.phase(),
            at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        ),
        None => notifier.phase().to_string(),
    }
}

fn status(workspace: &Workspace) -> String {
    let lines: Vec<String> = workspace
        .graph()
        .action_nodes()
        .map(|node| {
            let notifier = ScheduledNotifier::restore(node.id.clone(), workspace.store());
            let past = notifier.scheduled_time().is_some_and(|at| at <= Utc::now());
            let mut line = format!("{}\t{}\t{}", node.id, node.label, describe(&notifier));
            if past && notifier.phase() == NotifierPhase::Pending {
                line.push_str(" (past)");
            }
            line
        })
        .collect();
    if lines.is_empty() {
        return "no action nodes".to_string();
    }
    lines.join("\n")
}

fn workbench(workspace: Workspace, config: &CliConfig) -> (CliWorkbench, UnboundedReceiver<TimerExpiry>) {
    let (timer, expiries) = TokioTimer::channel();
    let graph_path = workspace.graph_path();
    let (graph, store) = workspace.into_parts();
    let surface = TerminalSurface::new(
        config.notification.permission,
        config.notification.prompt_timeout(),
    );
    let bench = Workbench::new(graph, store, surface, timer)
        .with_template(config.notification.template())
        .with_graph_reload(move || match load_graph(&graph_path) {
            Ok(graph) => Some(graph),
            Err(e) => {
                warn!(error = %e, "keeping the loaded graph");
                None
            }
        });
    (bench, expiries)
}

async fn schedule(workspace: Workspace, config: &CliConfig, args: ScheduleArgs) -> CommandResult {
    let at = parse_local_schedule(&args.date, &args.time).map_err(CliError::InvalidTime)?;
    let (mut bench, mut expiries) = workbench(workspace, config);

    bench.pick(&args.node_id, at).map_err(CliError::from)?;
    let local = at.with_timezone(&Local).format("%Y-%m-%d %H:%M");
    if args.detach {
        return Ok(format!("{} scheduled for {local}", args.node_id));
    }

    bench.arm(&args.node_id, Utc::now()).map_err(CliError::from)?;
    info!(node_id = %args.node_id, at = %local, "waiting for schedule; Ctrl-C cancels");
    wait(&mut bench, &mut expiries).await
}

async fn run(workspace: Workspace, config: &CliConfig) -> CommandResult {
    let (mut bench, mut expiries) = workbench(workspace, config);

    let armed = bench.rearm_pending(Utc::now());
    if armed.is_empty() {
        return Ok("no pending schedules".to_string());
    }
    info!(armed = armed.len(), "waiting for schedules; Ctrl-C cancels");
    wait(&mut bench, &mut expiries).await
}

async fn wait(
    bench: &mut CliWorkbench,
    expiries: &mut UnboundedReceiver<TimerExpiry>,
) -> CommandResult {
    let outcome = bench.run_until_idle(expiries, interrupted()).await;

    let mut lines: Vec<String> = outcome.reports.iter().map(report_line).collect();
    if outcome.interrupted {
        let cancelled = bench.cancel_all();
        warn!(cancelled, "interrupted");
        lines.push(format!("cancelled {cancelled} schedule(s)"));
    }
    Ok(lines.join("\n"))
}

/// Completes on Ctrl-C. Never completes when the signal cannot be watched.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot watch for Ctrl-C; waiting for timers only");
        std::future::pending::<()>().await;
    }
}

fn report_line(report: &FireReport) -> String {
    let line = match &report.delivery {
        Delivery::Delivered => format!("fired {}", report.node_id),
        Delivery::NotPermitted(permission) => {
            format!("fired {} (not shown, permission {permission})", report.node_id)
        }
        Delivery::Failed(reason) => format!("fired {} (not shown: {reason})", report.node_id),
    };
    match &report.store_error {
        Some(e) => format!("{line} (state not saved: {e})"),
        None => line,
    }
}
